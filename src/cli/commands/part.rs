//! `autoservice part` command - Parts inventory management

use clap::Subcommand;
use console::style;
use csv::{ReaderBuilder, StringRecord};
use miette::{IntoDiagnostic, Result};
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use crate::cli::commands::utils::{confirm, print_saved, print_structured, section, Session};
use crate::cli::table::{CellValue, ColumnDef, TableFormatter, TableRow};
use crate::cli::GlobalOpts;
use crate::core::app::EditForm;
use crate::core::views;
use crate::core::{Action, Record, Reply, SearchScope};
use crate::entities::{InventoryPart, PartForm};

#[derive(Subcommand, Debug)]
pub enum PartCommands {
    /// List stocked parts
    List(ListArgs),

    /// Add a part to the inventory
    New(NewArgs),

    /// Update a part's details or stock
    Edit(EditArgs),

    /// Delete a part that no order references
    Delete(DeleteArgs),

    /// Bulk-load parts from a CSV file (name,article,quantity,price)
    Import(ImportArgs),
}

pub(crate) const PART_COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("id", "ID", 6),
    ColumnDef::new("name", "NAME", 32),
    ColumnDef::new("article", "ARTICLE", 16),
    ColumnDef::new("quantity", "QTY", 8),
    ColumnDef::new("price", "PRICE", 12),
    ColumnDef::new("value", "VALUE", 14),
];

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Case-insensitive search over name and article
    #[arg(long, short = 's')]
    pub search: Option<String>,

    /// Only parts at or below the low-stock threshold
    #[arg(long)]
    pub low: bool,
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    #[arg(long, short = 'n')]
    pub name: String,

    /// Article number (must be unique)
    #[arg(long, short = 'a')]
    pub article: Option<String>,

    /// Units on hand
    #[arg(long, default_value_t = 0)]
    pub quantity: i64,

    /// Unit price
    #[arg(long, short = 'p')]
    pub price: f64,
}

#[derive(clap::Args, Debug)]
pub struct EditArgs {
    /// Part id
    pub id: i64,

    #[arg(long, short = 'n')]
    pub name: Option<String>,

    #[arg(long, short = 'a')]
    pub article: Option<String>,

    /// Set units on hand
    #[arg(long, conflicts_with = "restock")]
    pub quantity: Option<i64>,

    /// Add units to the current stock
    #[arg(long)]
    pub restock: Option<i64>,

    #[arg(long, short = 'p')]
    pub price: Option<f64>,
}

#[derive(clap::Args, Debug)]
pub struct DeleteArgs {
    /// Part id
    pub id: i64,

    /// Skip the confirmation prompt
    #[arg(long)]
    pub force: bool,
}

#[derive(clap::Args, Debug)]
pub struct ImportArgs {
    /// CSV file with a header row
    pub file: PathBuf,

    /// Validate and report without saving anything
    #[arg(long)]
    pub dry_run: bool,

    /// Continue importing after errors (default: stop on first error)
    #[arg(long)]
    pub skip_errors: bool,

    /// Update the part with a matching article instead of failing
    #[arg(long)]
    pub update: bool,
}

pub fn run(cmd: PartCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        PartCommands::List(args) => run_list(args, global),
        PartCommands::New(args) => run_new(args, global),
        PartCommands::Edit(args) => run_edit(args, global),
        PartCommands::Delete(args) => run_delete(args, global),
        PartCommands::Import(args) => run_import(args, global),
    }
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;
    if let Some(term) = args.search {
        session.dispatch(Action::Search {
            scope: SearchScope::Parts,
            term,
        })?;
    }

    let view = views::inventory(session.app())?;
    let threshold = view.low_stock_threshold;
    let parts: Vec<InventoryPart> = view
        .parts
        .into_iter()
        .filter(|p| !args.low || p.quantity <= threshold)
        .collect();

    let format = session.format(global);
    if print_structured(&parts, format)? {
        return Ok(());
    }

    let rows = parts.iter().map(|p| part_row(p, threshold));
    TableFormatter::new(PART_COLUMNS, "part").output(rows, format);
    Ok(())
}

pub(crate) fn part_row(part: &InventoryPart, threshold: i64) -> TableRow {
    TableRow::new(part.id)
        .cell("id", CellValue::Id(part.id))
        .cell("name", CellValue::Text(part.name.clone()))
        .cell("article", CellValue::opt_text(part.article.as_deref()))
        .cell("quantity", CellValue::Stock(part.quantity, threshold))
        .cell("price", CellValue::Money(part.price))
        .cell("value", CellValue::Money(part.stock_value()))
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;
    let id = session.save(Action::SubmitPart(PartForm::new(
        &args.name,
        args.article,
        args.quantity,
        args.price,
    )))?;
    session.finish()?;

    print_saved(global, "Created", "part", id);
    Ok(())
}

fn run_edit(args: EditArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;
    let mut form = match session.dispatch(Action::Edit(Record::Part(args.id)))? {
        Reply::Editing(EditForm::Part(form)) => form,
        other => return Err(miette::miette!("unexpected reply: {:?}", other)),
    };

    if let Some(name) = args.name {
        form.name = name;
    }
    if args.article.is_some() {
        form.article = args.article;
    }
    if let Some(quantity) = args.quantity {
        form.quantity = quantity;
    }
    if let Some(units) = args.restock {
        form.quantity += units;
    }
    if let Some(price) = args.price {
        form.price = price;
    }

    let id = session.save(Action::SubmitPart(form))?;
    session.finish()?;

    print_saved(global, "Updated", "part", id);
    Ok(())
}

fn run_delete(args: DeleteArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;
    let part = session.app().store().get_part(args.id)?;

    if !confirm(&format!("Delete part {}?", part.name), args.force)? {
        println!("Cancelled.");
        return Ok(());
    }

    session.dispatch(Action::Delete(Record::Part(args.id)))?;
    session.finish()?;

    if !global.quiet {
        println!(
            "{} Deleted part {} ({})",
            style("✓").green(),
            style(args.id).cyan(),
            part.name
        );
    }
    Ok(())
}

/// Import statistics
#[derive(Debug, Default, PartialEq)]
struct ImportStats {
    rows_processed: usize,
    created: usize,
    updated: usize,
    errors: usize,
}

fn run_import(args: ImportArgs, global: &GlobalOpts) -> Result<()> {
    if !args.file.exists() {
        return Err(miette::miette!("File not found: {}", args.file.display()));
    }

    let mut session = Session::open(global)?;
    if !global.quiet {
        println!(
            "{} Importing parts from {}{}",
            style("→").blue(),
            style(args.file.display()).yellow(),
            if args.dry_run {
                style(" (dry run)").dim().to_string()
            } else {
                String::new()
            }
        );
    }

    let file = File::open(&args.file).into_diagnostic()?;
    let stats = import_parts(&mut session, BufReader::new(file), &args)?;

    if !global.quiet {
        println!();
        section("Import Summary");
        println!("  Rows processed: {}", style(stats.rows_processed).cyan());
        println!("  Parts created:  {}", style(stats.created).green());
        if stats.updated > 0 {
            println!("  Parts updated:  {}", style(stats.updated).yellow());
        }
        if stats.errors > 0 {
            println!("  Errors:         {}", style(stats.errors).red());
        }
    }

    if args.dry_run {
        if !global.quiet {
            println!();
            println!("{}", style("Dry run complete. Nothing was saved.").yellow());
        }
        return Ok(());
    }

    session.finish()
}

/// Apply every CSV row to the session's in-memory database
///
/// Nothing reaches the working file until the caller finishes the session,
/// so an aborted import leaves it untouched.
fn import_parts<R: std::io::Read>(
    session: &mut Session,
    reader: R,
    args: &ImportArgs,
) -> Result<ImportStats> {
    let mut stats = ImportStats::default();
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers().into_diagnostic()?.clone();
    let header_map = build_header_map(&headers);
    if !header_map.contains_key("name") {
        return Err(miette::miette!("CSV header must contain a 'name' column"));
    }

    for (row_idx, result) in rdr.records().enumerate() {
        let row_num = row_idx + 2;
        stats.rows_processed += 1;

        let outcome = result
            .map_err(|e| miette::miette!("CSV parse error: {}", e))
            .and_then(|record| import_row(session, &record, &header_map, args.update));

        match outcome {
            Ok(RowOutcome::Created) => stats.created += 1,
            Ok(RowOutcome::Updated) => stats.updated += 1,
            Err(e) => {
                eprintln!("{} Row {}: {}", style("✗").red(), row_num, e);
                stats.errors += 1;
                if !args.skip_errors {
                    return Err(miette::miette!("Import stopped at row {}: {}", row_num, e));
                }
            }
        }
    }

    Ok(stats)
}

enum RowOutcome {
    Created,
    Updated,
}

fn import_row(
    session: &mut Session,
    record: &StringRecord,
    header_map: &HashMap<String, usize>,
    update: bool,
) -> Result<RowOutcome> {
    let name = get_field(record, header_map, "name").unwrap_or_default();
    let article = get_field(record, header_map, "article");
    let quantity = match get_field(record, header_map, "quantity") {
        Some(q) => q
            .parse::<i64>()
            .map_err(|_| miette::miette!("invalid quantity '{}'", q))?,
        None => 0,
    };
    let price = match get_field(record, header_map, "price") {
        Some(p) => p
            .replace(',', ".")
            .parse::<f64>()
            .map_err(|_| miette::miette!("invalid price '{}'", p))?,
        None => 0.0,
    };
    let form = PartForm::new(&name, article, quantity, price);

    let existing = match (&form.article, update) {
        (Some(article), true) => session.app().store().part_by_article(article)?,
        _ => None,
    };
    match existing {
        Some(part) => {
            session.dispatch(Action::Edit(Record::Part(part.id)))?;
            if let Err(e) = session.save(Action::SubmitPart(form)) {
                // Leave the part form in create mode for the next row
                session.dispatch(Action::CancelEdit)?;
                return Err(e);
            }
            Ok(RowOutcome::Updated)
        }
        None => {
            session.save(Action::SubmitPart(form))?;
            Ok(RowOutcome::Created)
        }
    }
}

/// Build a map from header name to column index
fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(i, h)| (h.trim().to_lowercase(), i))
        .collect()
}

/// Get a non-empty field value from a CSV record
fn get_field(
    record: &StringRecord,
    header_map: &HashMap<String, usize>,
    field: &str,
) -> Option<String> {
    header_map
        .get(field)
        .and_then(|&idx| record.get(idx))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
