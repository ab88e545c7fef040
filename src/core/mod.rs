//! Core module - storage, session state and the composition root

pub mod app;
pub mod config;
pub mod error;
pub mod print;
pub mod shop;
pub mod state;
pub mod store;
pub mod views;

pub use app::{Action, App, EditForm, Reply};
pub use config::Config;
pub use error::{ShopError, ShopResult};
pub use print::{DocumentFormat, DocumentRenderer};
pub use shop::{Shop, ShopDirError};
pub use state::{AppState, Record, SearchScope, View};
pub use store::Store;
