//! Shop directory discovery and structure

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the per-shop directory
pub const SHOP_DIR: &str = ".autoservice";

/// Default working snapshot inside the shop directory
pub const DATABASE_FILE: &str = "autoservice.db";

/// A workshop directory (parent of .autoservice/)
#[derive(Debug)]
pub struct Shop {
    root: PathBuf,
}

impl Shop {
    /// Find the shop root by walking up from the current directory
    pub fn discover() -> Result<Self, ShopDirError> {
        let current =
            std::env::current_dir().map_err(|e| ShopDirError::IoError(e.to_string()))?;
        Self::discover_from(&current)
    }

    /// Find the shop root by walking up from the given directory
    pub fn discover_from(start: &Path) -> Result<Self, ShopDirError> {
        let mut current = start
            .canonicalize()
            .map_err(|e| ShopDirError::IoError(e.to_string()))?;

        loop {
            if current.join(SHOP_DIR).is_dir() {
                return Ok(Self { root: current });
            }

            if !current.pop() {
                return Err(ShopDirError::NotFound {
                    searched_from: start.to_path_buf(),
                });
            }
        }
    }

    /// Create `.autoservice/` with a default config at `path`
    ///
    /// With `force`, an existing config is rewritten; the database file is
    /// never touched here.
    pub fn init(path: &Path, force: bool) -> Result<Self, ShopDirError> {
        let root = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());

        let dir = root.join(SHOP_DIR);
        if dir.exists() && !force {
            return Err(ShopDirError::AlreadyExists(root));
        }

        std::fs::create_dir_all(&dir).map_err(|e| ShopDirError::IoError(e.to_string()))?;
        std::fs::write(dir.join("config.yaml"), Self::default_config())
            .map_err(|e| ShopDirError::IoError(e.to_string()))?;

        Ok(Self { root })
    }

    fn default_config() -> &'static str {
        r#"# Autoservice shop configuration

# Login for the interactive shell and one-shot commands
# username: admin
# password: admin

# Working database snapshot, relative to the shop root
# database: .autoservice/autoservice.db

# Heading of printed work orders
# shop_name: Autoservice

# Currency suffix for money columns
# currency: "₽"

# Parts at or below this quantity show up on the dashboard
# low_stock_threshold: 2

# Default output format (auto, yaml, tsv, json, csv, md, id)
# default_format: auto
"#
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The .autoservice directory
    pub fn shop_dir(&self) -> PathBuf {
        self.root.join(SHOP_DIR)
    }

    pub fn config_path(&self) -> PathBuf {
        self.shop_dir().join("config.yaml")
    }

    /// Working snapshot path, honouring a configured override
    pub fn database_path(&self, configured: Option<&Path>) -> PathBuf {
        match configured {
            Some(path) if path.is_absolute() => path.to_path_buf(),
            Some(path) => self.root.join(path),
            None => self.shop_dir().join(DATABASE_FILE),
        }
    }
}

/// Errors that can occur while locating or creating a shop
#[derive(Debug, Error)]
pub enum ShopDirError {
    #[error("not an autoservice shop (searched from {searched_from:?}). Run 'autoservice init' to create one.")]
    NotFound { searched_from: PathBuf },

    #[error("autoservice shop already exists at {0:?}")]
    AlreadyExists(PathBuf),

    #[error("IO error: {0}")]
    IoError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_shop_init_creates_structure() {
        let tmp = tempdir().unwrap();
        let shop = Shop::init(tmp.path(), false).unwrap();

        assert!(shop.shop_dir().is_dir());
        assert!(shop.config_path().exists());
        assert_eq!(shop.database_path(None), shop.shop_dir().join(DATABASE_FILE));
    }

    #[test]
    fn test_shop_init_fails_if_exists() {
        let tmp = tempdir().unwrap();
        Shop::init(tmp.path(), false).unwrap();

        let err = Shop::init(tmp.path(), false).unwrap_err();
        assert!(matches!(err, ShopDirError::AlreadyExists(_)));
        assert!(Shop::init(tmp.path(), true).is_ok());
    }

    #[test]
    fn test_shop_discover_from_subdirectory() {
        let tmp = tempdir().unwrap();
        Shop::init(tmp.path(), false).unwrap();

        let subdir = tmp.path().join("invoices/2024");
        std::fs::create_dir_all(&subdir).unwrap();

        let shop = Shop::discover_from(&subdir).unwrap();
        assert_eq!(
            shop.root().canonicalize().unwrap(),
            tmp.path().canonicalize().unwrap()
        );
    }

    #[test]
    fn test_shop_discover_fails_without_dir() {
        let tmp = tempdir().unwrap();
        let err = Shop::discover_from(tmp.path()).unwrap_err();
        assert!(matches!(err, ShopDirError::NotFound { .. }));
    }

    #[test]
    fn test_relative_database_override() {
        let tmp = tempdir().unwrap();
        let shop = Shop::init(tmp.path(), false).unwrap();
        assert_eq!(
            shop.database_path(Some(Path::new("data/shop.db"))),
            shop.root().join("data/shop.db")
        );
    }
}
