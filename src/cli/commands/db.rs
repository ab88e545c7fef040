//! `autoservice db` command - Database snapshots

use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use std::path::PathBuf;
use tabled::{builder::Builder, settings::Style};

use crate::cli::commands::utils::{confirm, print_structured, Session};
use crate::cli::helpers::escape_csv;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::store::TableCount;
use crate::core::{Action, Reply};

#[derive(Subcommand, Debug)]
pub enum DbCommands {
    /// Write a complete copy of the database to a file
    Export(ExportArgs),

    /// Replace the working database with a file, after checking it
    Import(ImportArgs),

    /// Show the working file and row counts
    Status,

    /// Run a read-only SQL query
    Query(QueryArgs),
}

#[derive(clap::Args, Debug)]
pub struct ExportArgs {
    /// Destination file
    pub path: PathBuf,
}

#[derive(clap::Args, Debug)]
pub struct ImportArgs {
    /// Database file to load
    pub path: PathBuf,

    /// Skip the confirmation prompt
    #[arg(long)]
    pub force: bool,
}

#[derive(clap::Args, Debug)]
pub struct QueryArgs {
    /// SQL statement (SELECT only)
    pub sql: String,
}

pub fn run(cmd: DbCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        DbCommands::Export(args) => run_export(args, global),
        DbCommands::Import(args) => run_import(args, global),
        DbCommands::Status => run_status(global),
        DbCommands::Query(args) => run_query(args, global),
    }
}

fn run_export(args: ExportArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;
    let stats = match session.dispatch(Action::Export(args.path))? {
        Reply::Exported(stats) => stats,
        other => return Err(miette::miette!("unexpected reply: {:?}", other)),
    };

    if print_structured(&stats, session.format(global))? {
        return Ok(());
    }
    if !global.quiet {
        println!(
            "{} Exported database to {}",
            style("✓").green(),
            style(stats.path.display()).cyan()
        );
        println!("   {} bytes, sha256 {}", stats.bytes, style(&stats.sha256).dim());
    }
    Ok(())
}

fn run_import(args: ImportArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;

    let prompt = format!(
        "Replace {} with {}?",
        session.db_path().display(),
        args.path.display()
    );
    if session.db_path().exists() && !confirm(&prompt, args.force)? {
        println!("Cancelled.");
        return Ok(());
    }

    session.dispatch(Action::Import(args.path.clone()))?;
    let counts = session.app().store().table_counts()?;
    let working = session.db_path().to_path_buf();
    session.finish()?;

    if !global.quiet {
        println!(
            "{} Imported {} into {}",
            style("✓").green(),
            style(args.path.display()).cyan(),
            style(working.display()).dim()
        );
        for count in counts {
            println!("   {:<12} {}", count.table, count.rows);
        }
    }
    Ok(())
}

#[derive(Serialize)]
struct Status {
    path: PathBuf,
    exists: bool,
    bytes: Option<u64>,
    tables: Vec<TableCount>,
}

fn run_status(global: &GlobalOpts) -> Result<()> {
    let session = Session::open(global)?;
    let path = session.db_path().to_path_buf();
    let bytes = std::fs::metadata(&path).ok().map(|m| m.len());
    let status = Status {
        exists: bytes.is_some(),
        bytes,
        tables: session.app().store().table_counts()?,
        path,
    };

    if print_structured(&status, session.format(global))? {
        return Ok(());
    }

    println!("{}: {}", style("Database").bold(), style(status.path.display()).cyan());
    match status.bytes {
        Some(bytes) => println!("{}: {} bytes", style("Size").bold(), bytes),
        None => println!("{}: not written yet", style("Size").bold()),
    }
    println!();
    let mut builder = Builder::default();
    builder.push_record(["Table", "Rows"]);
    for count in &status.tables {
        builder.push_record([count.table.clone(), count.rows.to_string()]);
    }
    println!("{}", builder.build().with(Style::markdown()));
    Ok(())
}

fn run_query(args: QueryArgs, global: &GlobalOpts) -> Result<()> {
    let session = Session::open(global)?;
    let (columns, rows) = session.app().store().query_raw(&args.sql)?;

    match session.format(global) {
        OutputFormat::Json | OutputFormat::Yaml => {
            let records: Vec<serde_json::Map<String, serde_json::Value>> = rows
                .iter()
                .map(|row| {
                    columns
                        .iter()
                        .cloned()
                        .zip(row.iter().cloned().map(serde_json::Value::String))
                        .collect()
                })
                .collect();
            print_structured(&records, session.format(global))?;
        }
        OutputFormat::Csv => {
            println!("{}", columns.iter().map(|c| escape_csv(c)).collect::<Vec<_>>().join(","));
            for row in &rows {
                println!("{}", row.iter().map(|v| escape_csv(v)).collect::<Vec<_>>().join(","));
            }
        }
        OutputFormat::Tsv => {
            println!("{}", columns.join("\t"));
            for row in &rows {
                println!("{}", row.join("\t"));
            }
        }
        _ => {
            let mut builder = Builder::default();
            builder.push_record(columns);
            for row in rows {
                builder.push_record(row);
            }
            println!("{}", builder.build().with(Style::markdown()));
        }
    }
    Ok(())
}
