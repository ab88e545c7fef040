//! `autoservice client` command - Client management

use clap::Subcommand;
use console::style;
use miette::Result;

use crate::cli::commands::utils::{confirm, print_saved, print_structured, section, Session};
use crate::cli::table::{CellValue, ColumnDef, TableFormatter, TableRow};
use crate::cli::GlobalOpts;
use crate::core::app::EditForm;
use crate::core::views;
use crate::core::{Action, Record, Reply, SearchScope};
use crate::entities::{Client, ClientForm};

#[derive(Subcommand, Debug)]
pub enum ClientCommands {
    /// List clients
    List(ListArgs),

    /// Show a client with their cars and service history
    Show(ShowArgs),

    /// Register a new client
    New(NewArgs),

    /// Update a client's details
    Edit(EditArgs),

    /// Delete a client together with their cars and orders
    Delete(DeleteArgs),
}

/// Column definitions for client list output
pub(crate) const CLIENT_COLUMNS: &[ColumnDef] = &[
    ColumnDef::new("id", "ID", 6),
    ColumnDef::new("name", "NAME", 32),
    ColumnDef::new("phone", "PHONE", 20),
    ColumnDef::new("email", "EMAIL", 32),
];

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Case-insensitive search over name, phone and email
    #[arg(long, short = 's')]
    pub search: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Client id
    pub id: i64,
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Full name
    #[arg(long, short = 'n')]
    pub name: String,

    /// Phone number
    #[arg(long, short = 'p')]
    pub phone: String,

    /// Email address (must be unique)
    #[arg(long, short = 'e')]
    pub email: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct EditArgs {
    /// Client id
    pub id: i64,

    #[arg(long, short = 'n')]
    pub name: Option<String>,

    #[arg(long, short = 'p')]
    pub phone: Option<String>,

    #[arg(long, short = 'e', conflicts_with = "clear_email")]
    pub email: Option<String>,

    /// Remove the stored email address
    #[arg(long)]
    pub clear_email: bool,
}

#[derive(clap::Args, Debug)]
pub struct DeleteArgs {
    /// Client id
    pub id: i64,

    /// Skip the confirmation prompt
    #[arg(long)]
    pub force: bool,
}

pub fn run(cmd: ClientCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        ClientCommands::List(args) => run_list(args, global),
        ClientCommands::Show(args) => run_show(args, global),
        ClientCommands::New(args) => run_new(args, global),
        ClientCommands::Edit(args) => run_edit(args, global),
        ClientCommands::Delete(args) => run_delete(args, global),
    }
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;
    if let Some(term) = args.search {
        session.dispatch(Action::Search {
            scope: SearchScope::Clients,
            term,
        })?;
    }

    let clients = views::workspace(session.app())?.clients;
    let format = session.format(global);
    if print_structured(&clients, format)? {
        return Ok(());
    }

    let rows = clients.iter().map(client_row);
    TableFormatter::new(CLIENT_COLUMNS, "client").output(rows, format);
    Ok(())
}

pub(crate) fn client_row(client: &Client) -> TableRow {
    TableRow::new(client.id)
        .cell("id", CellValue::Id(client.id))
        .cell("name", CellValue::Text(client.full_name.clone()))
        .cell("phone", CellValue::Text(client.phone.clone()))
        .cell("email", CellValue::opt_text(client.email.as_deref()))
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;
    session.dispatch(Action::SelectClient(Some(args.id)))?;
    let view = views::workspace(session.app())?;
    let format = session.format(global);

    let Some(client) = &view.client else {
        return Err(miette::miette!("client {} is not selected", args.id));
    };

    #[derive(serde::Serialize)]
    struct ClientDetail<'a> {
        client: &'a Client,
        cars: &'a [crate::entities::Car],
        history: &'a [crate::core::store::HistoryEntry],
    }
    let detail = ClientDetail {
        client,
        cars: &view.cars,
        history: &view.client_history,
    };
    if print_structured(&detail, format)? {
        return Ok(());
    }

    let config = session.config();
    section(&format!("Client {}", style(client.id).cyan()));
    println!("{}: {}", style("Name").bold(), style(&client.full_name).yellow());
    println!("{}: {}", style("Phone").bold(), client.phone);
    if let Some(email) = &client.email {
        println!("{}: {}", style("Email").bold(), email);
    }

    println!();
    println!("{} ({}):", style("Cars").bold(), view.cars.len());
    for car in &view.cars {
        println!("  • [{}] {}  VIN {}", style(car.id).cyan(), car.title(), car.vin);
    }

    println!();
    println!("{} ({}):", style("Service history").bold(), view.client_history.len());
    for entry in &view.client_history {
        println!(
            "  • #{} {}  {}  {}  {}  {}",
            entry.order_id,
            entry.created_at.format("%Y-%m-%d"),
            entry.car,
            entry.description,
            entry.status.label(),
            config.money(entry.total())
        );
    }
    Ok(())
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;
    let id = session.save(Action::SubmitClient(ClientForm::new(
        &args.name,
        &args.phone,
        args.email,
    )))?;
    session.finish()?;

    print_saved(global, "Created", "client", id);
    Ok(())
}

fn run_edit(args: EditArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;
    let mut form = match session.dispatch(Action::Edit(Record::Client(args.id)))? {
        Reply::Editing(EditForm::Client(form)) => form,
        other => return Err(miette::miette!("unexpected reply: {:?}", other)),
    };

    if let Some(name) = args.name {
        form.full_name = name;
    }
    if let Some(phone) = args.phone {
        form.phone = phone;
    }
    if args.clear_email {
        form.email = None;
    } else if args.email.is_some() {
        form.email = args.email;
    }

    let id = session.save(Action::SubmitClient(form))?;
    session.finish()?;

    print_saved(global, "Updated", "client", id);
    Ok(())
}

fn run_delete(args: DeleteArgs, global: &GlobalOpts) -> Result<()> {
    let mut session = Session::open(global)?;
    let client = session.app().store().get_client(args.id)?;

    let prompt = format!(
        "Delete {} with all cars and orders? Sold parts go back to stock",
        client.full_name
    );
    if !confirm(&prompt, args.force)? {
        println!("Cancelled.");
        return Ok(());
    }

    session.dispatch(Action::Delete(Record::Client(args.id)))?;
    session.finish()?;

    if !global.quiet {
        println!(
            "{} Deleted client {} ({})",
            style("✓").green(),
            style(args.id).cyan(),
            client.full_name
        );
    }
    Ok(())
}
