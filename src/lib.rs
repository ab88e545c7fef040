//! Autoservice: workshop management for a car repair shop
//!
//! Clients, their cars, repair orders and the parts inventory live in an
//! embedded SQLite database held in memory; snapshots are exported to and
//! imported from a single database file.

pub mod cli;
pub mod core;
pub mod entities;
