//! `autoservice car` command - Vehicle management

use clap::Subcommand;
use console::style;
use miette::Result;

use crate::cli::commands::order::{order_row, ORDER_COLUMNS};
use crate::cli::commands::utils::{confirm, print_saved, print_structured, section, Session};
use crate::cli::table::{CellValue, ColumnDef, TableFormatter, TableRow};
use crate::cli::GlobalOpts;
use crate::core::app::EditForm;
use crate::core::views;
use crate::core::{Action, Record, Reply, SearchScope};
use crate::entities::{Car, CarForm};

#[derive(Subcommand, Debug)]
pub enum CarCommands {
    /// List a client's cars
    List(ListArgs),

    /// Show a car with its orders
    Show(ShowArgs),

    /// Register a car for a client
    New(NewArgs),

    /// Update a car's details
    Edit(EditArgs),

    /// Delete a car together with its orders
    Delete(DeleteArgs),
}

pub(crate) const CAR_COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("id", "ID", 6),
    ColumnDef::new("brand", "BRAND", 16),
    ColumnDef::new("model", "MODEL", 20),
    ColumnDef::new("vin", "VIN", 20),
];

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Owner's client id
    #[arg(long, short = 'c')]
    pub client: i64,

    /// Case-insensitive search over brand, model and VIN
    #[arg(long, short = 's')]
    pub search: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Car id
    pub id: i64,
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Owner's client id
    #[arg(long, short = 'c')]
    pub client: i64,

    #[arg(long, short = 'b')]
    pub brand: String,

    #[arg(long, short = 'm')]
    pub model: String,

    /// Vehicle identification number (must be unique)
    #[arg(long)]
    pub vin: String,
}

#[derive(clap::Args, Debug)]
pub struct EditArgs {
    /// Car id
    pub id: i64,

    #[arg(long, short = 'b')]
    pub brand: Option<String>,

    #[arg(long, short = 'm')]
    pub model: Option<String>,

    #[arg(long)]
    pub vin: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct DeleteArgs {
    /// Car id
    pub id: i64,

    /// Skip the confirmation prompt
    #[arg(long)]
    pub force: bool,
}

pub fn run(cmd: CarCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        CarCommands::List(args) => run_list(args, global),
        CarCommands::Show(args) => run_show(args, global),
        CarCommands::New(args) => run_new(args, global),
        CarCommands::Edit(args) => run_edit(args, global),
        CarCommands::Delete(args) => run_delete(args, global),
    }
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;
    session.dispatch(Action::SelectClient(Some(args.client)))?;
    if let Some(term) = args.search {
        session.dispatch(Action::Search {
            scope: SearchScope::Cars,
            term,
        })?;
    }

    let cars = views::workspace(session.app())?.cars;
    let format = session.format(global);
    if print_structured(&cars, format)? {
        return Ok(());
    }

    let rows = cars.iter().map(car_row);
    TableFormatter::new(CAR_COLUMNS, "car").output(rows, format);
    Ok(())
}

pub(crate) fn car_row(car: &Car) -> TableRow {
    TableRow::new(car.id)
        .cell("id", CellValue::Id(car.id))
        .cell("brand", CellValue::Text(car.brand.clone()))
        .cell("model", CellValue::Text(car.model.clone()))
        .cell("vin", CellValue::Text(car.vin.clone()))
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;
    session.dispatch(Action::SelectCar(Some(args.id)))?;
    let view = views::workspace(session.app())?;
    let format = session.format(global);

    let (Some(car), Some(owner)) = (&view.car, &view.client) else {
        return Err(miette::miette!("car {} is not selected", args.id));
    };

    #[derive(serde::Serialize)]
    struct CarDetail<'a> {
        car: &'a Car,
        owner: &'a crate::entities::Client,
        orders: &'a [crate::core::store::OrderSummary],
    }
    let detail = CarDetail {
        car,
        owner,
        orders: &view.orders,
    };
    if print_structured(&detail, format)? {
        return Ok(());
    }

    section(&format!("Car {}", style(car.id).cyan()));
    println!("{}: {}", style("Vehicle").bold(), style(car.title()).yellow());
    println!("{}: {}", style("VIN").bold(), car.vin);
    println!(
        "{}: {} [{}]",
        style("Owner").bold(),
        owner.full_name,
        style(owner.id).cyan()
    );
    println!();

    let rows = view.orders.iter().map(order_row);
    TableFormatter::new(ORDER_COLUMNS, "order").output(rows, format);
    Ok(())
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;
    session.dispatch(Action::SelectClient(Some(args.client)))?;
    let id = session.save(Action::SubmitCar(CarForm::new(
        &args.brand,
        &args.model,
        &args.vin,
    )))?;
    session.finish()?;

    print_saved(global, "Created", "car", id);
    Ok(())
}

fn run_edit(args: EditArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;
    let mut form = match session.dispatch(Action::Edit(Record::Car(args.id)))? {
        Reply::Editing(EditForm::Car(form)) => form,
        other => return Err(miette::miette!("unexpected reply: {:?}", other)),
    };

    if let Some(brand) = args.brand {
        form.brand = brand;
    }
    if let Some(model) = args.model {
        form.model = model;
    }
    if let Some(vin) = args.vin {
        form.vin = vin;
    }

    let id = session.save(Action::SubmitCar(form))?;
    session.finish()?;

    print_saved(global, "Updated", "car", id);
    Ok(())
}

fn run_delete(args: DeleteArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;
    let car = session.app().store().get_car(args.id)?;

    let prompt = format!(
        "Delete {} ({}) with all its orders? Sold parts go back to stock",
        car.title(),
        car.vin
    );
    if !confirm(&prompt, args.force)? {
        println!("Cancelled.");
        return Ok(());
    }

    session.dispatch(Action::Delete(Record::Car(args.id)))?;
    session.finish()?;

    if !global.quiet {
        println!(
            "{} Deleted car {} ({})",
            style("✓").green(),
            style(args.id).cyan(),
            car.title()
        );
    }
    Ok(())
}
