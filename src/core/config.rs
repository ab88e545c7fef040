//! Configuration management with layered hierarchy

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::core::Shop;

pub const DEFAULT_USERNAME: &str = "admin";
pub const DEFAULT_PASSWORD: &str = "admin";
pub const DEFAULT_CURRENCY: &str = "₽";
pub const DEFAULT_LOW_STOCK_THRESHOLD: i64 = 2;
pub const DEFAULT_SHOP_NAME: &str = "Autoservice";

/// Autoservice configuration with layered hierarchy
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Login name for the sign-in gate
    pub username: Option<String>,

    pub password: Option<String>,

    /// Working database snapshot
    pub database: Option<PathBuf>,

    /// Currency suffix for money values
    pub currency: Option<String>,

    /// Dashboard low-stock threshold
    pub low_stock_threshold: Option<i64>,

    /// Default output format
    pub default_format: Option<String>,

    /// Heading of printed documents
    pub shop_name: Option<String>,
}

impl Config {
    /// Load configuration from all sources, merging in priority order
    pub fn load() -> Self {
        let shop_config = Shop::discover().ok().map(|shop| shop.config_path());
        Self::load_from(Self::global_config_path().as_deref(), shop_config.as_deref())
    }

    /// Merge defaults, the given config files and the environment
    pub fn load_from(global: Option<&Path>, shop: Option<&Path>) -> Self {
        let mut config = Config::default();

        // 1. Built-in defaults (resolved by the accessors)

        // 2. Global user config (~/.config/autoservice/config.yaml)
        // 3. Shop config (.autoservice/config.yaml)
        for path in [global, shop].into_iter().flatten() {
            if let Some(layer) = Self::read_file(path) {
                config.merge(layer);
            }
        }

        // 4. Environment variables
        if let Ok(user) = std::env::var("AUTOSERVICE_USER") {
            config.username = Some(user);
        }
        if let Ok(password) = std::env::var("AUTOSERVICE_PASSWORD") {
            config.password = Some(password);
        }
        if let Ok(db) = std::env::var("AUTOSERVICE_DB") {
            config.database = Some(PathBuf::from(db));
        }

        config
    }

    fn read_file(path: &Path) -> Option<Config> {
        if !path.exists() {
            return None;
        }
        let contents = std::fs::read_to_string(path).ok()?;
        match serde_yml::from_str::<Config>(&contents) {
            Ok(config) => Some(config),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable config");
                None
            }
        }
    }

    /// Get the path to the global config file
    fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "autoservice")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Merge another config into this one (other takes precedence)
    fn merge(&mut self, other: Config) {
        if other.username.is_some() {
            self.username = other.username;
        }
        if other.password.is_some() {
            self.password = other.password;
        }
        if other.database.is_some() {
            self.database = other.database;
        }
        if other.currency.is_some() {
            self.currency = other.currency;
        }
        if other.low_stock_threshold.is_some() {
            self.low_stock_threshold = other.low_stock_threshold;
        }
        if other.default_format.is_some() {
            self.default_format = other.default_format;
        }
        if other.shop_name.is_some() {
            self.shop_name = other.shop_name;
        }
    }

    pub fn username(&self) -> &str {
        self.username.as_deref().unwrap_or(DEFAULT_USERNAME)
    }

    pub fn password(&self) -> &str {
        self.password.as_deref().unwrap_or(DEFAULT_PASSWORD)
    }

    pub fn currency(&self) -> &str {
        self.currency.as_deref().unwrap_or(DEFAULT_CURRENCY)
    }

    pub fn shop_name(&self) -> &str {
        self.shop_name.as_deref().unwrap_or(DEFAULT_SHOP_NAME)
    }

    pub fn low_stock_threshold(&self) -> i64 {
        self.low_stock_threshold
            .unwrap_or(DEFAULT_LOW_STOCK_THRESHOLD)
    }

    /// Money with two decimals and the currency suffix
    pub fn money(&self, amount: f64) -> String {
        let currency = self.currency();
        if currency.is_empty() {
            format!("{:.2}", amount)
        } else {
            format!("{:.2} {}", amount, currency)
        }
    }

    /// Check a login against the configured credentials
    pub fn accepts_login(&self, username: &str, password: &str) -> bool {
        username == self.username() && password == self.password()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.username(), "admin");
        assert!(config.accepts_login("admin", "admin"));
        assert!(!config.accepts_login("admin", "hunter2"));
        assert_eq!(config.low_stock_threshold(), 2);
        assert_eq!(config.money(1100.0), "1100.00 ₽");
    }

    #[test]
    fn test_shop_layer_overrides_global() {
        let tmp = tempdir().unwrap();
        let global = tmp.path().join("global.yaml");
        let shop = tmp.path().join("shop.yaml");
        std::fs::write(&global, "currency: USD\nlow_stock_threshold: 5\n").unwrap();
        std::fs::write(&shop, "currency: EUR\n").unwrap();

        let config = Config::load_from(Some(&global), Some(&shop));
        assert_eq!(config.currency(), "EUR");
        assert_eq!(config.low_stock_threshold(), 5);
    }

    #[test]
    fn test_broken_layer_is_skipped() {
        let tmp = tempdir().unwrap();
        let shop = tmp.path().join("shop.yaml");
        std::fs::write(&shop, "low_stock_threshold: [not a number").unwrap();

        let config = Config::load_from(None, Some(&shop));
        assert_eq!(config.low_stock_threshold(), 2);
    }

    #[test]
    fn test_empty_currency() {
        let config = Config {
            currency: Some(String::new()),
            ..Config::default()
        };
        assert_eq!(config.money(5.5), "5.50");
    }
}
