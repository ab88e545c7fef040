//! CLI command implementations

pub mod utils;

pub mod car;
pub mod client;
pub mod completions;
pub mod dashboard;
pub mod db;
pub mod init;
pub mod order;
pub mod part;
pub mod report;
pub mod shell;
