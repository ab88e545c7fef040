//! `autoservice order` command - Repair orders and work-order printing

use chrono::NaiveDate;
use clap::Subcommand;
use console::style;
use miette::{IntoDiagnostic, Result};
use std::path::PathBuf;

use crate::cli::commands::utils::{confirm, print_saved, print_structured, section, Session};
use crate::cli::helpers::{parse_date, parse_part_line, today};
use crate::cli::table::{CellValue, ColumnDef, TableFormatter, TableRow};
use crate::cli::GlobalOpts;
use crate::core::app::EditForm;
use crate::core::store::OrderSummary;
use crate::core::views;
use crate::core::{Action, DocumentFormat, DocumentRenderer, Record, Reply, SearchScope};
use crate::entities::{lines_total, OrderForm, OrderSort, OrderStatus, StatusFilter};

#[derive(Subcommand, Debug)]
pub enum OrderCommands {
    /// List a car's orders
    List(ListArgs),

    /// Show an order with its part lines
    Show(ShowArgs),

    /// Open a repair order for a car, taking parts from stock
    New(NewArgs),

    /// Change an order's fields or part lines
    Edit(EditArgs),

    /// Delete an order, returning its parts to stock
    Delete(DeleteArgs),

    /// Print a car's work-order history
    Print(PrintArgs),
}

pub(crate) const ORDER_COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("id", "ID", 6),
    ColumnDef::new("date", "DATE", 18),
    ColumnDef::new("description", "DESCRIPTION", 36),
    ColumnDef::new("status", "STATUS", 12),
    ColumnDef::new("labor", "LABOR", 12),
    ColumnDef::new("parts", "PARTS", 12),
    ColumnDef::new("total", "TOTAL", 12),
];

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Car id
    #[arg(long, short = 'c')]
    pub car: i64,

    /// Case-insensitive search over description and part names
    #[arg(long, short = 's')]
    pub search: Option<String>,

    /// Status filter (all, new, in_progress, ready, delivered)
    #[arg(long, default_value = "all")]
    pub status: StatusFilter,

    /// Sort (date_desc, date_asc, cost_desc, cost_asc)
    #[arg(long, default_value = "date_desc")]
    pub sort: OrderSort,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Order id
    pub id: i64,
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Car id
    #[arg(long, short = 'c')]
    pub car: i64,

    /// Work description
    #[arg(long, short = 'd')]
    pub description: String,

    /// Labor cost
    #[arg(long, short = 'l', default_value_t = 0.0)]
    pub labor: f64,

    /// Order status (new, in_progress, ready, delivered)
    #[arg(long, default_value = "new")]
    pub status: OrderStatus,

    /// Part taken from stock as PART_ID:QTY (repeatable)
    #[arg(long = "part", short = 'p', value_parser = parse_part_line)]
    pub parts: Vec<(i64, i64)>,
}

#[derive(clap::Args, Debug)]
pub struct EditArgs {
    /// Order id
    pub id: i64,

    #[arg(long, short = 'd')]
    pub description: Option<String>,

    #[arg(long, short = 'l')]
    pub labor: Option<f64>,

    #[arg(long)]
    pub status: Option<OrderStatus>,

    /// Add units of a part as PART_ID:QTY (repeatable)
    #[arg(long = "part", short = 'p', value_parser = parse_part_line)]
    pub parts: Vec<(i64, i64)>,

    /// Drop a part line by part id (repeatable)
    #[arg(long = "remove-part")]
    pub remove_parts: Vec<i64>,

    /// Drop every current part line before adding
    #[arg(long)]
    pub clear_parts: bool,
}

#[derive(clap::Args, Debug)]
pub struct DeleteArgs {
    /// Order id
    pub id: i64,

    /// Skip the confirmation prompt
    #[arg(long)]
    pub force: bool,
}

#[derive(clap::Args, Debug)]
pub struct PrintArgs {
    /// Car id
    pub car: i64,

    /// Document template (default: from the output extension, else html)
    #[arg(long, short = 't', value_enum)]
    pub template: Option<DocumentFormat>,

    /// Write the document to a file instead of stdout
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Print date (YYYY-MM-DD, default today)
    #[arg(long, value_parser = parse_date)]
    pub date: Option<NaiveDate>,
}

pub fn run(cmd: OrderCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        OrderCommands::List(args) => run_list(args, global),
        OrderCommands::Show(args) => run_show(args, global),
        OrderCommands::New(args) => run_new(args, global),
        OrderCommands::Edit(args) => run_edit(args, global),
        OrderCommands::Delete(args) => run_delete(args, global),
        OrderCommands::Print(args) => run_print(args, global),
    }
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;
    session.dispatch(Action::SelectCar(Some(args.car)))?;
    if let Some(term) = args.search {
        session.dispatch(Action::Search {
            scope: SearchScope::Orders,
            term,
        })?;
    }
    session.dispatch(Action::FilterOrders(args.status))?;
    session.dispatch(Action::SortOrders(args.sort))?;

    let orders = views::workspace(session.app())?.orders;
    let format = session.format(global);
    if print_structured(&orders, format)? {
        return Ok(());
    }

    let rows = orders.iter().map(order_row);
    TableFormatter::new(ORDER_COLUMNS, "order").output(rows, format);
    Ok(())
}

pub(crate) fn order_row(summary: &OrderSummary) -> TableRow {
    let order = &summary.order;
    TableRow::new(order.id)
        .cell("id", CellValue::Id(order.id))
        .cell("date", CellValue::DateTime(order.created_at))
        .cell("description", CellValue::Text(order.description.clone()))
        .cell("status", CellValue::Status(order.status))
        .cell("labor", CellValue::Money(order.labor_cost))
        .cell("parts", CellValue::Money(summary.parts_total))
        .cell("total", CellValue::Money(summary.total()))
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let session = Session::open(global)?;
    let store = session.app().store();
    let order = store.get_order(args.id)?;
    let lines = store.order_lines(args.id)?;
    let car = store.get_car(order.car_id)?;
    let format = session.format(global);

    #[derive(serde::Serialize)]
    struct OrderDetail<'a> {
        order: &'a crate::entities::Order,
        lines: &'a [crate::entities::PartLine],
        parts_total: f64,
        total: f64,
    }
    let parts_total = lines_total(&lines);
    let detail = OrderDetail {
        order: &order,
        lines: &lines,
        parts_total,
        total: order.labor_cost + parts_total,
    };
    if print_structured(&detail, format)? {
        return Ok(());
    }

    let config = session.config();
    section(&format!("Order {}", style(order.id).cyan()));
    println!("{}: {} [{}]", style("Car").bold(), car.title(), style(car.id).cyan());
    println!("{}: {}", style("Date").bold(), order.created_at.format("%Y-%m-%d %H:%M"));
    println!("{}: {}", style("Status").bold(), order.status.label());
    println!("{}: {}", style("Description").bold(), style(&order.description).yellow());
    println!();
    println!("{} ({}):", style("Parts").bold(), lines.len());
    for line in &lines {
        println!(
            "  • [{}] {}  {} x {} = {}",
            style(line.part_id).cyan(),
            line.name,
            line.quantity,
            config.money(line.price),
            config.money(line.total())
        );
    }
    println!();
    println!("{}: {}", style("Labor").bold(), config.money(order.labor_cost));
    println!("{}: {}", style("Parts").bold(), config.money(parts_total));
    println!(
        "{}: {}",
        style("Total").bold(),
        style(config.money(detail.total)).green()
    );
    Ok(())
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;
    session.dispatch(Action::SelectCar(Some(args.car)))?;
    for (part_id, quantity) in args.parts {
        session.dispatch(Action::AddPartToOrder { part_id, quantity })?;
    }

    let id = session.save(Action::SubmitOrder(OrderForm::new(
        &args.description,
        args.labor,
        args.status,
    )))?;
    session.finish()?;

    print_saved(global, "Created", "order", id);
    Ok(())
}

fn run_edit(args: EditArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;
    let mut form = match session.dispatch(Action::Edit(Record::Order(args.id)))? {
        Reply::Editing(EditForm::Order(form)) => form,
        other => return Err(miette::miette!("unexpected reply: {:?}", other)),
    };

    let mut dropped: Vec<i64> = args.remove_parts;
    if args.clear_parts {
        dropped.extend(session.app().state().order_parts().iter().map(|l| l.part_id));
    }
    for part_id in dropped {
        session.dispatch(Action::RemovePartFromOrder(part_id))?;
    }
    for (part_id, quantity) in args.parts {
        session.dispatch(Action::AddPartToOrder { part_id, quantity })?;
    }

    if let Some(description) = args.description {
        form.description = description;
    }
    if let Some(labor) = args.labor {
        form.labor_cost = labor;
    }
    if let Some(status) = args.status {
        form.status = status;
    }

    let id = session.save(Action::SubmitOrder(form))?;
    session.finish()?;

    print_saved(global, "Updated", "order", id);
    Ok(())
}

fn run_delete(args: DeleteArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;
    let order = session.app().store().get_order(args.id)?;

    let prompt = format!(
        "Delete order {} ({})? Its parts go back to stock",
        order.id, order.description
    );
    if !confirm(&prompt, args.force)? {
        println!("Cancelled.");
        return Ok(());
    }

    session.dispatch(Action::Delete(Record::Order(args.id)))?;
    session.finish()?;

    if !global.quiet {
        println!(
            "{} Deleted order {}",
            style("✓").green(),
            style(args.id).cyan()
        );
    }
    Ok(())
}

fn run_print(args: PrintArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;
    session.dispatch(Action::SelectCar(Some(args.car)))?;
    let printed_on = args.date.unwrap_or_else(today);

    let doc = match session.dispatch(Action::PrintOrders { printed_on })? {
        Reply::Document(doc) => doc,
        other => return Err(miette::miette!("unexpected reply: {:?}", other)),
    };

    let template = args.template.unwrap_or_else(|| {
        match args.output.as_ref().and_then(|p| p.extension()) {
            Some(ext) if ext == "txt" => DocumentFormat::Text,
            _ => DocumentFormat::Html,
        }
    });
    let rendered = DocumentRenderer::new()?.render(&doc, template, session.config())?;

    match args.output {
        Some(path) => {
            std::fs::write(&path, rendered).into_diagnostic()?;
            if !global.quiet {
                println!(
                    "{} Wrote {} order(s) for {} to {}",
                    style("✓").green(),
                    doc.orders.len(),
                    doc.car.title(),
                    style(path.display()).cyan()
                );
            }
        }
        None => print!("{}", rendered),
    }
    Ok(())
}
