//! Shared plumbing for one-shot commands
//!
//! A [`Session`] is the terminal equivalent of one page load: the shop's
//! working snapshot is imported into a fresh in-memory [`App`], the
//! configured user is signed in, and on [`Session::finish`] the snapshot is
//! exported back when an action changed the data.

use console::style;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::store::ExportStats;
use crate::core::{Action, App, Config, Record, Reply, Shop};

pub struct Session {
    app: App,
    db_path: PathBuf,
    loaded: bool,
    dirty: bool,
}

impl Session {
    /// Open the working database of the current shop (or `--db`) as the
    /// configured user
    pub fn open(global: &GlobalOpts) -> Result<Self> {
        let config = Config::load();
        let db_path = resolve_db_path(global, &config)?;
        Self::open_at(db_path, config)
    }

    pub(crate) fn open_at(db_path: PathBuf, config: Config) -> Result<Self> {
        let username = config.username().to_string();
        let password = config.password().to_string();

        let mut session = Self::start_at(db_path, config)?;
        session.sign_in(username, password)?;
        Ok(session)
    }

    /// A signed-out session; the working file loads on first sign-in
    pub fn start(global: &GlobalOpts) -> Result<Self> {
        let config = Config::load();
        let db_path = resolve_db_path(global, &config)?;
        Self::start_at(db_path, config)
    }

    fn start_at(db_path: PathBuf, config: Config) -> Result<Self> {
        Ok(Self {
            app: App::new(config)?,
            db_path,
            loaded: false,
            dirty: false,
        })
    }

    pub fn sign_in(&mut self, username: String, password: String) -> Result<()> {
        self.app.dispatch(Action::Login { username, password })?;
        if !self.loaded {
            if self.db_path.exists() {
                self.app.dispatch(Action::Import(self.db_path.clone()))?;
            } else {
                debug!(path = %self.db_path.display(), "no working database yet, starting empty");
            }
            self.loaded = true;
        }
        Ok(())
    }

    pub fn app(&self) -> &App {
        &self.app
    }

    pub fn config(&self) -> &Config {
        self.app.config()
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    /// Whether changes are waiting to be written to the working file
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Resolve `--format auto` against the configured default
    pub fn format(&self, global: &GlobalOpts) -> OutputFormat {
        global.format.resolve(self.config().default_format.as_deref())
    }

    pub fn dispatch(&mut self, action: Action) -> Result<Reply> {
        let mutates = action.mutates();
        let reply = self.app.dispatch(action)?;
        self.dirty |= mutates;
        Ok(reply)
    }

    /// Dispatch an action that must answer with a saved record id
    pub fn save(&mut self, action: Action) -> Result<i64> {
        match self.dispatch(action)? {
            Reply::Saved(record) => Ok(record_id(record)),
            other => Err(miette::miette!("unexpected reply: {:?}", other)),
        }
    }

    /// Write the database over the working file
    pub fn persist(&mut self) -> Result<ExportStats> {
        let path = self.db_path.clone();
        match self.app.dispatch(Action::Export(path))? {
            Reply::Exported(stats) => {
                self.dirty = false;
                Ok(stats)
            }
            other => Err(miette::miette!("unexpected reply: {:?}", other)),
        }
    }

    /// Persist changes back to the working snapshot
    pub fn finish(mut self) -> Result<()> {
        if self.dirty {
            self.persist()?;
        }
        Ok(())
    }
}

/// The working snapshot: `--db`, else the shop's (configured) database
pub fn resolve_db_path(global: &GlobalOpts, config: &Config) -> Result<PathBuf> {
    if let Some(path) = &global.db {
        return Ok(path.clone());
    }
    match Shop::discover() {
        Ok(shop) => Ok(shop.database_path(config.database.as_deref())),
        Err(e) => match &config.database {
            Some(path) => Ok(path.clone()),
            None => Err(miette::miette!("{}", e)),
        },
    }
}

pub fn record_id(record: Record) -> i64 {
    match record {
        Record::Client(id) | Record::Car(id) | Record::Order(id) | Record::Part(id) => id,
    }
}

/// Report a created or updated record
pub fn print_saved(global: &GlobalOpts, verb: &str, entity: &str, id: i64) {
    if global.format == OutputFormat::Id {
        println!("{}", id);
    } else if !global.quiet {
        println!(
            "{} {} {} {}",
            style("✓").green(),
            verb,
            entity,
            style(id).cyan()
        );
    }
}

/// Serialize a record for `--format json|yaml`; false for other formats
pub fn print_structured<T: Serialize>(value: &T, format: OutputFormat) -> Result<bool> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(value).into_diagnostic()?);
            Ok(true)
        }
        OutputFormat::Yaml => {
            print!("{}", serde_yml::to_string(value).into_diagnostic()?);
            Ok(true)
        }
        _ => Ok(false),
    }
}

/// Ask before a destructive step; non-interactive runs proceed
pub fn confirm(prompt: &str, force: bool) -> Result<bool> {
    if force || !console::Term::stderr().is_term() {
        return Ok(true);
    }
    dialoguer::Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()
        .into_diagnostic()
}

pub fn section(title: &str) {
    println!("{}", style("─".repeat(60)).dim());
    println!("{}", style(title).bold());
    println!("{}", style("─".repeat(60)).dim());
}
