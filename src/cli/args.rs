//! CLI argument definitions

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::cli::commands::{
    car::CarCommands, client::ClientCommands, completions::CompletionsArgs,
    dashboard::DashboardArgs, db::DbCommands, init::InitArgs, order::OrderCommands,
    part::PartCommands, report::ReportCommands, shell::ShellArgs,
};

#[derive(Parser)]
#[command(name = "autoservice")]
#[command(author, version, about = "Car workshop management: clients, cars, repair orders and parts stock")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Debug, Clone)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "auto")]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Show debug logging on stderr
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Database file to work on (default: the shop's snapshot)
    #[arg(long, global = true, env = "AUTOSERVICE_DB")]
    pub db: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new workshop in a directory
    Init(InitArgs),

    /// Client management
    #[command(subcommand)]
    Client(ClientCommands),

    /// Car management
    #[command(subcommand)]
    Car(CarCommands),

    /// Repair order management
    #[command(subcommand)]
    Order(OrderCommands),

    /// Parts inventory management
    #[command(subcommand)]
    Part(PartCommands),

    /// Show the workshop dashboard
    Dashboard(DashboardArgs),

    /// Revenue and service history reports
    #[command(subcommand)]
    Report(ReportCommands),

    /// Database snapshot management (export, import, status, query)
    #[command(subcommand)]
    Db(DbCommands),

    /// Interactive session with sign-in and page navigation
    Shell(ShellArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Debug, Clone, Copy, Default, ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
    /// Auto-detect based on context (tsv for lists, text for show)
    #[default]
    Auto,
    /// YAML format
    Yaml,
    /// Tab-separated values (for lists)
    Tsv,
    /// JSON format
    Json,
    /// CSV format
    Csv,
    /// Markdown table
    Md,
    /// Just record ids, one per line
    Id,
}

impl OutputFormat {
    /// Resolve `auto` against the configured default format
    pub fn resolve(self, configured: Option<&str>) -> Self {
        match self {
            OutputFormat::Auto => configured
                .and_then(|name| OutputFormat::from_str(name, true).ok())
                .filter(|f| *f != OutputFormat::Auto)
                .unwrap_or(OutputFormat::Tsv),
            other => other,
        }
    }
}
