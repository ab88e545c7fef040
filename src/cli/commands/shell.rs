//! `autoservice shell` command - Interactive workshop session
//!
//! The shell keeps one [`Session`] alive: sign in once, move between the
//! dashboard, workspace, inventory and reports pages, and compose orders
//! part by part. Changes stay in memory until saved to the working file.

use chrono::{Datelike, NaiveDate};
use console::style;
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input, Password, Select};
use miette::{IntoDiagnostic, Result};
use std::path::PathBuf;

use crate::cli::commands::car::{car_row, CAR_COLUMNS};
use crate::cli::commands::client::{client_row, CLIENT_COLUMNS};
use crate::cli::commands::dashboard;
use crate::cli::commands::order::{order_row, ORDER_COLUMNS};
use crate::cli::commands::part::{part_row, PART_COLUMNS};
use crate::cli::commands::report::render_revenue;
use crate::cli::commands::utils::Session;
use crate::cli::helpers::{parse_date, today};
use crate::cli::table::{TableConfig, TableFormatter};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::app::EditForm;
use crate::core::views;
use crate::core::{
    Action, AppState, DocumentFormat, DocumentRenderer, Record, Reply, SearchScope, ShopError,
    View,
};
use crate::entities::{
    CarForm, ClientForm, OrderForm, OrderSort, OrderStatus, PartForm, StatusFilter,
};

const LOGIN_ATTEMPTS: usize = 3;

#[derive(clap::Args, Debug)]
pub struct ShellArgs {
    /// Login name (prompted when omitted)
    #[arg(long, short = 'u')]
    pub user: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuItem {
    Go(View),
    SearchClients,
    SelectClient,
    NewClient,
    EditClient,
    DeleteClient,
    SearchCars,
    SelectCar,
    NewCar,
    EditCar,
    DeleteCar,
    SearchOrders,
    FilterOrders,
    SortOrders,
    AddPart,
    RemovePart,
    SaveOrder,
    EditOrder,
    DeleteOrder,
    PrintOrders,
    CancelEdit,
    SearchParts,
    NewPart,
    EditPart,
    DeletePart,
    RevenueReport,
    Export,
    Import,
    Save,
    Logout,
    Quit,
}

impl MenuItem {
    fn label(&self) -> String {
        let text = match self {
            MenuItem::Go(view) => return format!("Go to {}", view.title()),
            MenuItem::SearchClients => "Search clients",
            MenuItem::SelectClient => "Select client",
            MenuItem::NewClient => "New client",
            MenuItem::EditClient => "Edit client",
            MenuItem::DeleteClient => "Delete client",
            MenuItem::SearchCars => "Search cars",
            MenuItem::SelectCar => "Select car",
            MenuItem::NewCar => "New car",
            MenuItem::EditCar => "Edit car",
            MenuItem::DeleteCar => "Delete car",
            MenuItem::SearchOrders => "Search orders",
            MenuItem::FilterOrders => "Filter orders by status",
            MenuItem::SortOrders => "Sort orders",
            MenuItem::AddPart => "Add part to order",
            MenuItem::RemovePart => "Remove part from order",
            MenuItem::SaveOrder => "Save order",
            MenuItem::EditOrder => "Edit order",
            MenuItem::DeleteOrder => "Delete order",
            MenuItem::PrintOrders => "Print work orders",
            MenuItem::CancelEdit => "Cancel editing",
            MenuItem::SearchParts => "Search parts",
            MenuItem::NewPart => "New part",
            MenuItem::EditPart => "Edit part",
            MenuItem::DeletePart => "Delete part",
            MenuItem::RevenueReport => "Revenue report",
            MenuItem::Export => "Export database to file",
            MenuItem::Import => "Import database from file",
            MenuItem::Save => "Save to working file",
            MenuItem::Logout => "Log out",
            MenuItem::Quit => "Quit",
        };
        text.to_string()
    }
}

/// The actions offered on the current page
fn menu(state: &AppState) -> Vec<MenuItem> {
    use MenuItem::*;

    let mut items = Vec::new();
    match state.view() {
        View::Dashboard => {}
        View::Workspace => {
            items.extend([SearchClients, SelectClient, NewClient]);
            if state.selected_client().is_some() {
                items.extend([EditClient, DeleteClient, SearchCars, SelectCar, NewCar]);
            }
            if state.selected_car().is_some() {
                items.extend([EditCar, DeleteCar, SearchOrders, FilterOrders, SortOrders]);
                items.push(AddPart);
                if !state.order_parts().is_empty() {
                    items.push(RemovePart);
                }
                items.extend([SaveOrder, EditOrder, DeleteOrder, PrintOrders]);
            }
            let editing = state.editing();
            if editing.client.is_some() || editing.car.is_some() || editing.order.is_some() {
                items.push(CancelEdit);
            }
        }
        View::Inventory => {
            items.extend([SearchParts, NewPart, EditPart, DeletePart]);
            if state.editing().part.is_some() {
                items.push(CancelEdit);
            }
        }
        View::Reports => items.push(RevenueReport),
    }

    items.extend(
        View::ALL
            .iter()
            .filter(|v| **v != state.view())
            .map(|v| Go(*v)),
    );
    items.extend([Export, Import, Save, Logout, Quit]);
    items
}

struct Shell {
    session: Session,
    theme: ColorfulTheme,
    /// Scalar fields of the order loaded for editing
    order_form: Option<OrderForm>,
}

pub fn run(args: ShellArgs, global: &GlobalOpts) -> Result<()> {
    let mut shell = Shell {
        session: Session::start(global)?,
        theme: ColorfulTheme::default(),
        order_form: None,
    };

    println!(
        "{} {}",
        style(shell.session.config().shop_name()).bold(),
        style(shell.session.db_path().display()).dim()
    );
    if !shell.login(args.user.clone())? {
        return Ok(());
    }

    loop {
        println!();
        if let Err(e) = shell.render_page() {
            eprintln!("{} {:?}", style("✗").red(), e);
        }

        let items = menu(shell.session.app().state());
        let labels: Vec<String> = items.iter().map(MenuItem::label).collect();
        let choice = Select::with_theme(&shell.theme)
            .with_prompt(shell.session.app().state().view().title())
            .items(&labels)
            .default(0)
            .interact_opt()
            .into_diagnostic()?;

        match choice.map(|i| items[i]) {
            Some(MenuItem::Quit) | None => {
                shell.offer_save()?;
                return Ok(());
            }
            Some(MenuItem::Logout) => {
                shell.session.dispatch(Action::Logout)?;
                shell.order_form = None;
                if !shell.login(None)? {
                    shell.offer_save()?;
                    return Ok(());
                }
            }
            Some(item) => {
                if let Err(e) = shell.handle(item) {
                    eprintln!("{} {:?}", style("✗").red(), e);
                }
            }
        }
    }
}

impl Shell {
    /// Ask for credentials until they are accepted or attempts run out
    fn login(&mut self, user: Option<String>) -> Result<bool> {
        for attempt in 1..=LOGIN_ATTEMPTS {
            let mut input = Input::<String>::with_theme(&self.theme).with_prompt("Username");
            if let Some(name) = &user {
                input = input.with_initial_text(name.clone());
            }
            let username = input.interact_text().into_diagnostic()?;
            let password = Password::with_theme(&self.theme)
                .with_prompt("Password")
                .allow_empty_password(true)
                .interact()
                .into_diagnostic()?;

            match self.session.sign_in(username, password) {
                Ok(()) => return Ok(true),
                Err(e) => {
                    let bad_login = matches!(
                        e.downcast_ref::<ShopError>(),
                        Some(ShopError::InvalidCredentials)
                    );
                    if !bad_login {
                        return Err(e);
                    }
                    eprintln!(
                        "{} Invalid username or password ({} of {})",
                        style("✗").red(),
                        attempt,
                        LOGIN_ATTEMPTS
                    );
                }
            }
        }
        Ok(false)
    }

    fn offer_save(&mut self) -> Result<()> {
        if !self.session.is_dirty() {
            return Ok(());
        }
        let prompt = format!("Save changes to {}?", self.session.db_path().display());
        let save = Confirm::with_theme(&self.theme)
            .with_prompt(prompt)
            .default(true)
            .interact()
            .into_diagnostic()?;
        if save {
            let stats = self.session.persist()?;
            println!("{} Saved {} bytes", style("✓").green(), stats.bytes);
        }
        Ok(())
    }

    fn render_page(&self) -> Result<()> {
        let app = self.session.app();
        let state = app.state();
        let config = app.config();

        println!("{}", style(format!("== {} ==", state.view().title())).bold());
        match state.view() {
            View::Dashboard => {
                let view = views::dashboard(app, today())?;
                print!("{}", dashboard::render(&view, config));
            }
            View::Workspace => {
                let view = views::workspace(app)?;
                println!("{}", style("Clients").bold());
                TableFormatter::new(CLIENT_COLUMNS, "client")
                    .with_config(TableConfig::for_pipe())
                    .output(view.clients.iter().map(client_row), OutputFormat::Tsv);

                if let Some(client) = &view.client {
                    println!();
                    println!(
                        "{} {}  {}  {}",
                        style("Client:").bold(),
                        style(&client.full_name).yellow(),
                        client.phone,
                        client.email.as_deref().unwrap_or("")
                    );
                    let billed: f64 = view.client_history.iter().map(|e| e.total()).sum();
                    println!(
                        "  {} order(s) on record, {} billed",
                        view.client_history.len(),
                        config.money(billed)
                    );
                    TableFormatter::new(CAR_COLUMNS, "car")
                        .with_config(TableConfig::for_pipe())
                        .output(view.cars.iter().map(car_row), OutputFormat::Tsv);
                }

                if let Some(car) = &view.car {
                    println!();
                    println!(
                        "{} {} ({})  sort: {}  status: {}",
                        style("Car:").bold(),
                        style(car.title()).yellow(),
                        car.vin,
                        view.order_sort,
                        view.order_filter
                    );
                    TableFormatter::new(ORDER_COLUMNS, "order")
                        .with_config(TableConfig::for_pipe())
                        .output(view.orders.iter().map(order_row), OutputFormat::Tsv);

                    println!();
                    let heading = match view.editing.order {
                        Some(id) => format!("Editing order {}", id),
                        None => "New order".to_string(),
                    };
                    println!("{}", style(heading).bold());
                    for line in &view.order_parts {
                        println!(
                            "  • [{}] {}  {} x {} = {}",
                            line.part_id,
                            line.name,
                            line.quantity,
                            config.money(line.price),
                            config.money(line.total())
                        );
                    }
                    println!("  Parts: {}", config.money(view.order_parts_total));
                }
            }
            View::Inventory => {
                let view = views::inventory(app)?;
                let threshold = view.low_stock_threshold;
                TableFormatter::new(PART_COLUMNS, "part")
                    .with_config(TableConfig::for_pipe())
                    .output(
                        view.parts.iter().map(|p| part_row(p, threshold)),
                        OutputFormat::Tsv,
                    );
                println!(
                    "  {} unit(s) in stock, worth {}",
                    view.total_units,
                    config.money(view.stock_value)
                );
            }
            View::Reports => {
                println!("Choose 'Revenue report' to total delivered orders over a period.");
            }
        }
        Ok(())
    }

    fn handle(&mut self, item: MenuItem) -> Result<()> {
        match item {
            MenuItem::Go(view) => {
                self.session.dispatch(Action::Navigate(view))?;
            }
            MenuItem::SearchClients => self.search(SearchScope::Clients)?,
            MenuItem::SearchCars => self.search(SearchScope::Cars)?,
            MenuItem::SearchOrders => self.search(SearchScope::Orders)?,
            MenuItem::SearchParts => self.search(SearchScope::Parts)?,
            MenuItem::SelectClient => {
                let clients = views::workspace(self.session.app())?.clients;
                let labels = clients
                    .iter()
                    .map(|c| format!("{}  {}", c.full_name, c.phone))
                    .collect();
                if let Some(choice) = self.pick("Client", labels)? {
                    let id = choice.map(|i| clients[i].id);
                    self.session.dispatch(Action::SelectClient(id))?;
                }
            }
            MenuItem::SelectCar => {
                let cars = views::workspace(self.session.app())?.cars;
                let labels = cars
                    .iter()
                    .map(|c| format!("{}  {}", c.title(), c.vin))
                    .collect();
                if let Some(choice) = self.pick("Car", labels)? {
                    let id = choice.map(|i| cars[i].id);
                    self.session.dispatch(Action::SelectCar(id))?;
                }
            }
            MenuItem::NewClient => {
                let form = self.client_form(ClientForm::default())?;
                let id = self.session.save(Action::SubmitClient(form))?;
                self.saved("client", id);
            }
            MenuItem::EditClient => {
                if let Some(id) = self.session.app().state().selected_client() {
                    if let Reply::Editing(EditForm::Client(form)) =
                        self.session.dispatch(Action::Edit(Record::Client(id)))?
                    {
                        let form = self.client_form(form)?;
                        let id = self.session.save(Action::SubmitClient(form))?;
                        self.saved("client", id);
                    }
                }
            }
            MenuItem::DeleteClient => {
                if let Some(id) = self.session.app().state().selected_client() {
                    self.delete(Record::Client(id), "this client with all cars and orders")?;
                }
            }
            MenuItem::NewCar => {
                let form = self.car_form(CarForm::default())?;
                let id = self.session.save(Action::SubmitCar(form))?;
                self.saved("car", id);
            }
            MenuItem::EditCar => {
                if let Some(id) = self.session.app().state().selected_car() {
                    if let Reply::Editing(EditForm::Car(form)) =
                        self.session.dispatch(Action::Edit(Record::Car(id)))?
                    {
                        let form = self.car_form(form)?;
                        let id = self.session.save(Action::SubmitCar(form))?;
                        self.saved("car", id);
                    }
                }
            }
            MenuItem::DeleteCar => {
                if let Some(id) = self.session.app().state().selected_car() {
                    self.delete(Record::Car(id), "this car with all its orders")?;
                }
            }
            MenuItem::FilterOrders => {
                let mut labels = vec!["All statuses".to_string()];
                labels.extend(OrderStatus::ALL.iter().map(|s| s.label().to_string()));
                let choice = self.select("Status", &labels, 0)?;
                let filter = match choice.checked_sub(1) {
                    Some(i) => StatusFilter::Only(OrderStatus::ALL[i]),
                    None => StatusFilter::All,
                };
                self.session.dispatch(Action::FilterOrders(filter))?;
            }
            MenuItem::SortOrders => {
                let labels: Vec<String> =
                    OrderSort::ALL.iter().map(|s| s.label().to_string()).collect();
                let choice = self.select("Sort", &labels, 0)?;
                self.session
                    .dispatch(Action::SortOrders(OrderSort::ALL[choice]))?;
            }
            MenuItem::AddPart => {
                let parts = views::inventory(self.session.app())?.parts;
                let config = self.session.config();
                let labels = parts
                    .iter()
                    .map(|p| {
                        format!(
                            "{}  ({} in stock, {})",
                            p.name,
                            p.quantity,
                            config.money(p.price)
                        )
                    })
                    .collect();
                if let Some(Some(i)) = self.pick("Part", labels)? {
                    let quantity = Input::<i64>::with_theme(&self.theme)
                        .with_prompt("Quantity")
                        .default(1)
                        .interact_text()
                        .into_diagnostic()?;
                    self.session.dispatch(Action::AddPartToOrder {
                        part_id: parts[i].id,
                        quantity,
                    })?;
                }
            }
            MenuItem::RemovePart => {
                let lines = self.session.app().state().order_parts().to_vec();
                let labels = lines
                    .iter()
                    .map(|l| format!("{} x{}", l.name, l.quantity))
                    .collect();
                if let Some(Some(i)) = self.pick("Remove", labels)? {
                    self.session
                        .dispatch(Action::RemovePartFromOrder(lines[i].part_id))?;
                }
            }
            MenuItem::EditOrder => {
                let orders = views::workspace(self.session.app())?.orders;
                let labels = orders
                    .iter()
                    .map(|o| {
                        format!(
                            "#{} {}  {}",
                            o.order.id,
                            o.order.created_at.format("%Y-%m-%d"),
                            o.order.description
                        )
                    })
                    .collect();
                if let Some(Some(i)) = self.pick("Order", labels)? {
                    if let Reply::Editing(EditForm::Order(form)) = self
                        .session
                        .dispatch(Action::Edit(Record::Order(orders[i].order.id)))?
                    {
                        self.order_form = Some(form);
                    }
                }
            }
            MenuItem::SaveOrder => {
                let initial = match self.session.app().state().editing().order {
                    Some(_) => self.order_form.clone().unwrap_or_default(),
                    None => OrderForm::default(),
                };
                let form = self.order_form_prompt(initial)?;
                let id = self.session.save(Action::SubmitOrder(form))?;
                self.order_form = None;
                self.saved("order", id);
            }
            MenuItem::DeleteOrder => {
                let orders = views::workspace(self.session.app())?.orders;
                let labels = orders
                    .iter()
                    .map(|o| format!("#{} {}", o.order.id, o.order.description))
                    .collect();
                if let Some(Some(i)) = self.pick("Order", labels)? {
                    self.delete(
                        Record::Order(orders[i].order.id),
                        "this order (its parts go back to stock)",
                    )?;
                }
            }
            MenuItem::PrintOrders => self.print_orders()?,
            MenuItem::CancelEdit => {
                self.session.dispatch(Action::CancelEdit)?;
                self.order_form = None;
            }
            MenuItem::NewPart => {
                let form = self.part_form(PartForm::default())?;
                let id = self.session.save(Action::SubmitPart(form))?;
                self.saved("part", id);
            }
            MenuItem::EditPart => {
                let parts = views::inventory(self.session.app())?.parts;
                let labels = parts.iter().map(|p| p.name.clone()).collect();
                if let Some(Some(i)) = self.pick("Part", labels)? {
                    if let Reply::Editing(EditForm::Part(form)) =
                        self.session.dispatch(Action::Edit(Record::Part(parts[i].id)))?
                    {
                        let form = self.part_form(form)?;
                        let id = self.session.save(Action::SubmitPart(form))?;
                        self.saved("part", id);
                    }
                }
            }
            MenuItem::DeletePart => {
                let parts = views::inventory(self.session.app())?.parts;
                let labels = parts.iter().map(|p| p.name.clone()).collect();
                if let Some(Some(i)) = self.pick("Part", labels)? {
                    self.delete(Record::Part(parts[i].id), "this part")?;
                }
            }
            MenuItem::RevenueReport => {
                let now = today();
                let month_start = now.with_day(1).unwrap_or(now);
                let from = self.date("From", month_start)?;
                let to = self.date("To", now)?;
                if let Reply::Report(report) =
                    self.session.dispatch(Action::GenerateReport { from, to })?
                {
                    print!("{}", render_revenue(&report, self.session.config(), true));
                }
            }
            MenuItem::Export => {
                let path = self.path("Export to", "autoservice-backup.db")?;
                if let Reply::Exported(stats) = self.session.dispatch(Action::Export(path))? {
                    println!(
                        "{} Exported {} bytes to {} (sha256 {})",
                        style("✓").green(),
                        stats.bytes,
                        style(stats.path.display()).cyan(),
                        style(&stats.sha256).dim()
                    );
                }
            }
            MenuItem::Import => {
                let path = self.path("Import from", "autoservice-backup.db")?;
                self.session.dispatch(Action::Import(path))?;
                self.order_form = None;
                println!(
                    "{} Database loaded. Save to make it the working file.",
                    style("✓").green()
                );
            }
            MenuItem::Save => {
                let stats = self.session.persist()?;
                println!(
                    "{} Saved {} bytes to {}",
                    style("✓").green(),
                    stats.bytes,
                    style(stats.path.display()).cyan()
                );
            }
            MenuItem::Logout | MenuItem::Quit => {}
        }
        Ok(())
    }

    fn saved(&self, entity: &str, id: i64) {
        println!("{} Saved {} {}", style("✓").green(), entity, style(id).cyan());
    }

    fn search(&mut self, scope: SearchScope) -> Result<()> {
        let current = self.session.app().state().search(scope).to_string();
        let term = Input::<String>::with_theme(&self.theme)
            .with_prompt("Search (empty shows all)")
            .with_initial_text(current)
            .allow_empty(true)
            .interact_text()
            .into_diagnostic()?;
        self.session.dispatch(Action::Search { scope, term })?;
        Ok(())
    }

    fn delete(&mut self, record: Record, what: &str) -> Result<()> {
        let confirmed = Confirm::with_theme(&self.theme)
            .with_prompt(format!("Delete {}?", what))
            .default(false)
            .interact()
            .into_diagnostic()?;
        if confirmed {
            self.session.dispatch(Action::Delete(record))?;
            println!("{} Deleted", style("✓").green());
        }
        Ok(())
    }

    fn print_orders(&mut self) -> Result<()> {
        let Some(car) = self.session.app().state().selected_car() else {
            return Err(ShopError::NoSelection("car").into());
        };
        let printed_on = today();
        let doc = match self.session.dispatch(Action::PrintOrders { printed_on })? {
            Reply::Document(doc) => doc,
            other => return Err(miette::miette!("unexpected reply: {:?}", other)),
        };

        let formats = ["HTML".to_string(), "Plain text".to_string()];
        let format = match self.select("Format", &formats, 0)? {
            0 => DocumentFormat::Html,
            _ => DocumentFormat::Text,
        };
        let default_name = format!("work-orders-car-{}.{}", car, format.extension());
        let path = self.path("Write to", &default_name)?;

        let rendered = DocumentRenderer::new()?.render(&doc, format, self.session.config())?;
        std::fs::write(&path, rendered).into_diagnostic()?;
        println!(
            "{} Wrote {} order(s) to {}",
            style("✓").green(),
            doc.orders.len(),
            style(path.display()).cyan()
        );
        Ok(())
    }

    // Prompts

    fn select(&self, prompt: &str, labels: &[String], default: usize) -> Result<usize> {
        Select::with_theme(&self.theme)
            .with_prompt(prompt)
            .items(labels)
            .default(default)
            .interact()
            .into_diagnostic()
    }

    /// Pick an entry or "(none)": `None` when the prompt is dismissed,
    /// `Some(None)` for the empty choice
    fn pick(&self, prompt: &str, mut labels: Vec<String>) -> Result<Option<Option<usize>>> {
        labels.push("(none)".to_string());
        let choice = Select::with_theme(&self.theme)
            .with_prompt(prompt)
            .items(&labels)
            .default(0)
            .interact_opt()
            .into_diagnostic()?;
        Ok(choice.map(|i| (i + 1 < labels.len()).then_some(i)))
    }

    fn text(&self, prompt: &str, initial: &str, allow_empty: bool) -> Result<String> {
        Input::<String>::with_theme(&self.theme)
            .with_prompt(prompt)
            .with_initial_text(initial)
            .allow_empty(allow_empty)
            .interact_text()
            .into_diagnostic()
    }

    fn amount(&self, prompt: &str, initial: f64) -> Result<f64> {
        Input::<f64>::with_theme(&self.theme)
            .with_prompt(prompt)
            .default(initial)
            .interact_text()
            .into_diagnostic()
    }

    fn date(&self, prompt: &str, initial: NaiveDate) -> Result<NaiveDate> {
        let raw = self.text(prompt, &initial.to_string(), false)?;
        parse_date(&raw).map_err(|e| miette::miette!("{}", e))
    }

    fn path(&self, prompt: &str, initial: &str) -> Result<PathBuf> {
        Ok(PathBuf::from(self.text(prompt, initial, false)?))
    }

    fn client_form(&self, form: ClientForm) -> Result<ClientForm> {
        let name = self.text("Full name", &form.full_name, false)?;
        let phone = self.text("Phone", &form.phone, false)?;
        let email = self.text("Email", form.email.as_deref().unwrap_or(""), true)?;
        Ok(ClientForm::new(&name, &phone, Some(email)))
    }

    fn car_form(&self, form: CarForm) -> Result<CarForm> {
        let brand = self.text("Brand", &form.brand, false)?;
        let model = self.text("Model", &form.model, false)?;
        let vin = self.text("VIN", &form.vin, false)?;
        Ok(CarForm::new(&brand, &model, &vin))
    }

    fn part_form(&self, form: PartForm) -> Result<PartForm> {
        let name = self.text("Name", &form.name, false)?;
        let article = self.text("Article", form.article.as_deref().unwrap_or(""), true)?;
        let quantity = Input::<i64>::with_theme(&self.theme)
            .with_prompt("Quantity")
            .default(form.quantity)
            .interact_text()
            .into_diagnostic()?;
        let price = self.amount("Price", form.price)?;
        Ok(PartForm::new(&name, Some(article), quantity, price))
    }

    fn order_form_prompt(&self, form: OrderForm) -> Result<OrderForm> {
        let description = self.text("Description", &form.description, false)?;
        let labor = self.amount("Labor cost", form.labor_cost)?;
        let labels: Vec<String> = OrderStatus::ALL
            .iter()
            .map(|s| s.label().to_string())
            .collect();
        let current = OrderStatus::ALL
            .iter()
            .position(|s| *s == form.status)
            .unwrap_or(0);
        let status = OrderStatus::ALL[self.select("Status", &labels, current)?];
        Ok(OrderForm::new(&description, labor, status))
    }
}
