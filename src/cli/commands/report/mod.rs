//! `autoservice report` command - Revenue and service history reports

mod history;
mod revenue;

use clap::Subcommand;
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use crate::cli::GlobalOpts;

pub use history::HistoryArgs;
pub use revenue::RevenueArgs;
pub(crate) use revenue::render as render_revenue;

#[derive(Subcommand, Debug)]
pub enum ReportCommands {
    /// Delivered-order revenue over a date range
    Revenue(RevenueArgs),

    /// Service history of a client or a car
    History(HistoryArgs),
}

pub fn run(cmd: ReportCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        ReportCommands::Revenue(args) => revenue::run(args, global),
        ReportCommands::History(args) => history::run(args, global),
    }
}

/// Write report content to a file or stdout
pub(crate) fn write_output(content: &str, output_path: Option<PathBuf>) -> Result<()> {
    match output_path {
        Some(path) => {
            let file = File::create(&path).into_diagnostic()?;
            let mut writer = BufWriter::new(file);
            writer.write_all(content.as_bytes()).into_diagnostic()?;
            println!("Report written to: {}", path.display());
        }
        None => {
            print!("{}", content);
        }
    }
    Ok(())
}
