//! Error taxonomy for workshop operations
//!
//! Every error here is recoverable at the point of the user action; the
//! interactive shell reports it and keeps running.

use miette::Diagnostic;
use rusqlite::ffi;
use thiserror::Error;

/// Errors produced by the store, the application state machine and rendering
#[derive(Debug, Error, Diagnostic)]
pub enum ShopError {
    /// Input rejected before touching storage
    #[error("invalid {field}: {message}")]
    #[diagnostic(code(autoservice::validation))]
    Validation {
        field: &'static str,
        message: String,
    },

    /// A UNIQUE constraint rejected the write
    #[error("a record with the same {field} already exists")]
    #[diagnostic(
        code(autoservice::duplicate),
        help("{field} must be unique; change it or edit the existing record")
    )]
    Duplicate { field: String },

    /// A RESTRICT foreign key refused the delete
    #[error("{entity} #{id} is used by existing orders and cannot be deleted")]
    #[diagnostic(code(autoservice::in_use))]
    InUse { entity: &'static str, id: i64 },

    #[error("{entity} #{id} not found")]
    #[diagnostic(code(autoservice::not_found))]
    NotFound { entity: &'static str, id: i64 },

    #[error("not enough \"{part}\" in stock: {available} available, {requested} requested")]
    #[diagnostic(code(autoservice::insufficient_stock))]
    InsufficientStock {
        part: String,
        available: i64,
        requested: i64,
    },

    /// The order-save unit of work was rolled back
    #[error("order was not saved: {0}")]
    #[diagnostic(code(autoservice::order_save))]
    OrderSave(#[source] Box<ShopError>),

    #[error("database file could not be loaded: {0}")]
    #[diagnostic(
        code(autoservice::import),
        help("the file may be damaged or not an autoservice database; the current data was kept")
    )]
    ImportFailed(String),

    #[error("sign in first")]
    #[diagnostic(code(autoservice::not_signed_in))]
    NotSignedIn,

    #[error("wrong username or password")]
    #[diagnostic(code(autoservice::credentials))]
    InvalidCredentials,

    #[error("no {0} selected")]
    #[diagnostic(code(autoservice::no_selection))]
    NoSelection(&'static str),

    #[error("template error: {0}")]
    #[diagnostic(code(autoservice::template))]
    Template(String),

    #[error(transparent)]
    #[diagnostic(code(autoservice::database))]
    Database(#[from] rusqlite::Error),

    #[error(transparent)]
    #[diagnostic(code(autoservice::io))]
    Io(#[from] std::io::Error),
}

impl ShopError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        ShopError::Validation {
            field,
            message: message.into(),
        }
    }

    /// Innermost error, looking through `OrderSave`
    pub fn root_cause(&self) -> &ShopError {
        match self {
            ShopError::OrderSave(inner) => inner.root_cause(),
            other => other,
        }
    }

    /// Name of the input field the user should correct, if any
    pub fn field(&self) -> Option<&str> {
        match self.root_cause() {
            ShopError::Validation { field, .. } => Some(field),
            ShopError::Duplicate { field } => Some(field.as_str()),
            _ => None,
        }
    }
}

/// Column name of a UNIQUE constraint violation, if `err` is one
///
/// SQLite reports these as `UNIQUE constraint failed: table.column`.
pub(crate) fn unique_violation(err: &rusqlite::Error) -> Option<String> {
    match err {
        rusqlite::Error::SqliteFailure(code, message)
            if code.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE =>
        {
            let column = message
                .as_deref()
                .and_then(|m| m.rsplit('.').next())
                .map(|c| c.trim().to_string())
                .unwrap_or_else(|| "value".to_string());
            Some(column)
        }
        _ => None,
    }
}

/// Whether `err` is a foreign-key failure
///
/// Immediate violations come back as `SQLITE_CONSTRAINT_FOREIGNKEY`, but a
/// refused `ON DELETE RESTRICT` is raised through SQLite's internal trigger
/// and carries `SQLITE_CONSTRAINT_TRIGGER` with the same message.
pub(crate) fn foreign_key_violation(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(code, message) => match code.extended_code {
            ffi::SQLITE_CONSTRAINT_FOREIGNKEY => true,
            ffi::SQLITE_CONSTRAINT_TRIGGER => message
                .as_deref()
                .is_some_and(|m| m.contains("FOREIGN KEY constraint failed")),
            _ => false,
        },
        _ => false,
    }
}

pub type ShopResult<T> = Result<T, ShopError>;
