//! The composition root: one store, one session state, one configuration
//!
//! Every user action is a variant of [`Action`] and goes through
//! [`App::dispatch`], which checks the sign-in gate, applies the storage
//! call and the state update, and answers with a [`Reply`] for the front end
//! to render.

use std::path::PathBuf;

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::core::error::{ShopError, ShopResult};
use crate::core::state::{AppState, Record, SearchScope, View};
use crate::core::store::{ExportStats, PrintDocument, RevenueReport, Store};
use crate::core::Config;
use crate::entities::{
    CarForm, ClientForm, OrderDraft, OrderForm, OrderSort, PartForm, PartLine, StatusFilter,
};

/// Everything a user can do
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Login { username: String, password: String },
    Logout,
    Navigate(View),
    SelectClient(Option<i64>),
    SelectCar(Option<i64>),
    /// Load a record into its form
    Edit(Record),
    /// Leave every form in create mode and drop the part buffer
    CancelEdit,
    Delete(Record),
    AddPartToOrder { part_id: i64, quantity: i64 },
    RemovePartFromOrder(i64),
    SubmitClient(ClientForm),
    SubmitCar(CarForm),
    SubmitPart(PartForm),
    SubmitOrder(OrderForm),
    Search { scope: SearchScope, term: String },
    SortOrders(OrderSort),
    FilterOrders(StatusFilter),
    GenerateReport { from: NaiveDate, to: NaiveDate },
    /// Print the selected car's order history
    PrintOrders { printed_on: NaiveDate },
    Export(PathBuf),
    Import(PathBuf),
}

impl Action {
    /// Short name for logs
    pub fn name(&self) -> &'static str {
        match self {
            Action::Login { .. } => "login",
            Action::Logout => "logout",
            Action::Navigate(_) => "navigate",
            Action::SelectClient(_) => "select_client",
            Action::SelectCar(_) => "select_car",
            Action::Edit(_) => "edit",
            Action::CancelEdit => "cancel_edit",
            Action::Delete(_) => "delete",
            Action::AddPartToOrder { .. } => "add_part",
            Action::RemovePartFromOrder(_) => "remove_part",
            Action::SubmitClient(_) => "submit_client",
            Action::SubmitCar(_) => "submit_car",
            Action::SubmitPart(_) => "submit_part",
            Action::SubmitOrder(_) => "submit_order",
            Action::Search { .. } => "search",
            Action::SortOrders(_) => "sort_orders",
            Action::FilterOrders(_) => "filter_orders",
            Action::GenerateReport { .. } => "report",
            Action::PrintOrders { .. } => "print",
            Action::Export(_) => "export",
            Action::Import(_) => "import",
        }
    }

    /// Whether a successful run changes the database
    pub fn mutates(&self) -> bool {
        matches!(
            self,
            Action::Delete(_)
                | Action::SubmitClient(_)
                | Action::SubmitCar(_)
                | Action::SubmitPart(_)
                | Action::SubmitOrder(_)
                | Action::Import(_)
        )
    }
}

/// A record's current values, loaded for editing
#[derive(Debug, Clone, PartialEq)]
pub enum EditForm {
    Client(ClientForm),
    Car(CarForm),
    Order(OrderForm),
    Part(PartForm),
}

/// What an action produced
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// State changed; re-render
    Updated,
    Saved(Record),
    Deleted(Record),
    Editing(EditForm),
    Report(RevenueReport),
    Document(PrintDocument),
    Exported(ExportStats),
    Imported,
}

pub struct App {
    store: Store,
    state: AppState,
    config: Config,
}

impl App {
    /// Start a session on an empty in-memory database
    pub fn new(config: Config) -> ShopResult<Self> {
        Ok(Self::with_store(Store::open_in_memory()?, config))
    }

    pub fn with_store(store: Store, config: Config) -> Self {
        Self {
            store,
            state: AppState::new(),
            config,
        }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run one action to completion
    pub fn dispatch(&mut self, action: Action) -> ShopResult<Reply> {
        let name = action.name();
        debug!(action = name, "dispatch");
        let result = self.handle(action);
        if let Err(e) = &result {
            warn!(action = name, error = %e, "action rejected");
        }
        result
    }

    fn handle(&mut self, action: Action) -> ShopResult<Reply> {
        if !self.state.is_signed_in() && !matches!(action, Action::Login { .. }) {
            return Err(ShopError::NotSignedIn);
        }

        match action {
            Action::Login { username, password } => {
                if !self.config.accepts_login(&username, &password) {
                    return Err(ShopError::InvalidCredentials);
                }
                info!(user = %username, "signed in");
                self.state.sign_in(username);
                Ok(Reply::Updated)
            }
            Action::Logout => {
                self.state.sign_out();
                Ok(Reply::Updated)
            }
            Action::Navigate(view) => {
                self.state.navigate(view);
                Ok(Reply::Updated)
            }
            Action::SelectClient(id) => {
                if let Some(id) = id {
                    self.store.get_client(id)?;
                }
                self.state.select_client(id);
                Ok(Reply::Updated)
            }
            Action::SelectCar(id) => {
                match id {
                    Some(id) => {
                        let car = self.store.get_car(id)?;
                        if self.state.selected_client() != Some(car.client_id) {
                            self.state.select_client(Some(car.client_id));
                        }
                        self.state.select_car(Some(id));
                    }
                    None => self.state.select_car(None),
                }
                Ok(Reply::Updated)
            }
            Action::Edit(record) => self.edit(record),
            Action::CancelEdit => {
                self.state.reset_editing();
                Ok(Reply::Updated)
            }
            Action::Delete(record) => self.delete(record),
            Action::AddPartToOrder { part_id, quantity } => self.add_part(part_id, quantity),
            Action::RemovePartFromOrder(part_id) => {
                self.state.remove_part(part_id);
                Ok(Reply::Updated)
            }
            Action::SubmitClient(form) => {
                let id = match self.state.editing().client {
                    Some(id) => {
                        self.store.update_client(id, &form)?;
                        id
                    }
                    None => self.store.create_client(&form)?,
                };
                self.state.reset_editing();
                Ok(Reply::Saved(Record::Client(id)))
            }
            Action::SubmitCar(form) => {
                let id = match self.state.editing().car {
                    Some(id) => {
                        self.store.update_car(id, &form)?;
                        id
                    }
                    None => {
                        let client = self
                            .state
                            .selected_client()
                            .ok_or(ShopError::NoSelection("client"))?;
                        self.store.create_car(client, &form)?
                    }
                };
                self.state.reset_editing();
                Ok(Reply::Saved(Record::Car(id)))
            }
            Action::SubmitPart(form) => {
                let id = match self.state.editing().part {
                    Some(id) => {
                        self.store.update_part(id, &form)?;
                        id
                    }
                    None => self.store.create_part(&form)?,
                };
                self.state.reset_editing();
                Ok(Reply::Saved(Record::Part(id)))
            }
            Action::SubmitOrder(form) => self.submit_order(form),
            Action::Search { scope, term } => {
                self.state.set_search(scope, term);
                Ok(Reply::Updated)
            }
            Action::SortOrders(sort) => {
                self.state.set_order_sort(sort);
                Ok(Reply::Updated)
            }
            Action::FilterOrders(filter) => {
                self.state.set_order_filter(filter);
                Ok(Reply::Updated)
            }
            Action::GenerateReport { from, to } => {
                Ok(Reply::Report(self.store.revenue_report(from, to)?))
            }
            Action::PrintOrders { printed_on } => {
                let car = self
                    .state
                    .selected_car()
                    .ok_or(ShopError::NoSelection("car"))?;
                Ok(Reply::Document(self.store.print_document(car, printed_on)?))
            }
            Action::Export(path) => Ok(Reply::Exported(self.store.export(&path)?)),
            Action::Import(path) => {
                // The current store stays in place unless the file loads cleanly
                self.store = Store::import(&path)?;
                self.state.reset_for_new_database();
                Ok(Reply::Imported)
            }
        }
    }

    fn edit(&mut self, record: Record) -> ShopResult<Reply> {
        let form = match record {
            Record::Client(id) => {
                let client = self.store.get_client(id)?;
                self.state.set_editing(record);
                EditForm::Client(ClientForm::from(&client))
            }
            Record::Car(id) => {
                let car = self.store.get_car(id)?;
                if self.state.selected_client() != Some(car.client_id) {
                    self.state.select_client(Some(car.client_id));
                }
                self.state.set_editing(record);
                EditForm::Car(CarForm::from(&car))
            }
            Record::Order(id) => {
                let order = self.store.get_order(id)?;
                if self.state.selected_car() != Some(order.car_id) {
                    let car = self.store.get_car(order.car_id)?;
                    if self.state.selected_client() != Some(car.client_id) {
                        self.state.select_client(Some(car.client_id));
                    }
                    self.state.select_car(Some(car.id));
                }
                let lines = self.store.order_lines(id)?;
                self.state.begin_order_edit(id, lines);
                EditForm::Order(OrderForm::from(&order))
            }
            Record::Part(id) => {
                let part = self.store.get_part(id)?;
                self.state.set_editing(record);
                EditForm::Part(PartForm::from(&part))
            }
        };
        Ok(Reply::Editing(form))
    }

    fn delete(&mut self, record: Record) -> ShopResult<Reply> {
        match record {
            Record::Client(id) => self.store.delete_client(id)?,
            Record::Car(id) => self.store.delete_car(id)?,
            Record::Order(id) => self.store.delete_order(id)?,
            Record::Part(id) => {
                self.store.delete_part(id)?;
                self.state.remove_part(id);
            }
        }
        self.state.forget(record);
        info!(record = ?record, "deleted");
        Ok(Reply::Deleted(record))
    }

    /// Buffer a part for the order being composed
    ///
    /// The request is checked against the part's stock plus what the order
    /// under edit already holds of it.
    fn add_part(&mut self, part_id: i64, quantity: i64) -> ShopResult<Reply> {
        if quantity < 1 {
            return Err(ShopError::validation("quantity", "must be at least 1"));
        }
        if self.state.selected_car().is_none() {
            return Err(ShopError::NoSelection("car"));
        }

        let part = self.store.get_part(part_id)?;
        let held = match self.state.editing().order {
            Some(order) => self.store.allocated_quantity(order, part_id)?,
            None => 0,
        };
        let available = part.quantity + held;
        let requested = self.state.buffered_quantity(part_id) + quantity;
        if requested > available {
            return Err(ShopError::InsufficientStock {
                part: part.name,
                available,
                requested,
            });
        }

        self.state
            .add_part(PartLine::new(part.id, part.name, quantity, part.price));
        Ok(Reply::Updated)
    }

    fn submit_order(&mut self, form: OrderForm) -> ShopResult<Reply> {
        let editing = self.state.editing().order;
        let car_id = match editing {
            Some(id) => self.store.get_order(id)?.car_id,
            None => self
                .state
                .selected_car()
                .ok_or(ShopError::NoSelection("car"))?,
        };

        let draft = OrderDraft::new(car_id, &form).editing(editing);
        let lines = self.state.order_parts().to_vec();
        let id = self.store.save_order(&draft, &lines)?;

        info!(order = id, lines = lines.len(), "order saved");
        self.state.reset_editing();
        Ok(Reply::Saved(Record::Order(id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::OrderStatus;
    use tempfile::tempdir;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn signed_in() -> App {
        let mut app = App::new(Config::default()).unwrap();
        app.dispatch(Action::Login {
            username: "admin".into(),
            password: "admin".into(),
        })
        .unwrap();
        app
    }

    fn saved(reply: Reply) -> i64 {
        match reply {
            Reply::Saved(Record::Client(id))
            | Reply::Saved(Record::Car(id))
            | Reply::Saved(Record::Order(id))
            | Reply::Saved(Record::Part(id)) => id,
            other => panic!("expected a saved record, got {:?}", other),
        }
    }

    fn stock(app: &App, part: i64) -> i64 {
        app.store().get_part(part).unwrap().quantity
    }

    /// Ivanov with a Lada (VIN X1) selected and an oil filter in stock
    fn ivanov(app: &mut App) -> (i64, i64, i64) {
        let client = saved(
            app.dispatch(Action::SubmitClient(ClientForm::new(
                "Ivanov",
                "+7 900 000-00-00",
                None,
            )))
            .unwrap(),
        );
        app.dispatch(Action::SelectClient(Some(client))).unwrap();
        let car = saved(
            app.dispatch(Action::SubmitCar(CarForm::new("Lada", "Vesta", "X1")))
                .unwrap(),
        );
        app.dispatch(Action::SelectCar(Some(car))).unwrap();
        let part = saved(
            app.dispatch(Action::SubmitPart(PartForm::new("Oil filter", None, 10, 300.0)))
                .unwrap(),
        );
        (client, car, part)
    }

    #[test]
    fn test_actions_require_sign_in() {
        let mut app = App::new(Config::default()).unwrap();
        let err = app.dispatch(Action::Navigate(View::Inventory)).unwrap_err();
        assert!(matches!(err, ShopError::NotSignedIn));

        let err = app
            .dispatch(Action::Login {
                username: "admin".into(),
                password: "wrong".into(),
            })
            .unwrap_err();
        assert!(matches!(err, ShopError::InvalidCredentials));
        assert!(!app.state().is_signed_in());
    }

    #[test]
    fn test_order_scenario_stock_print_and_dashboard() {
        let mut app = signed_in();
        let (client, car, part) = ivanov(&mut app);
        assert!(app.store().client_history(client).unwrap().is_empty());

        app.dispatch(Action::AddPartToOrder {
            part_id: part,
            quantity: 2,
        })
        .unwrap();
        let order = saved(
            app.dispatch(Action::SubmitOrder(OrderForm::new(
                "Oil change",
                500.0,
                OrderStatus::InProgress,
            )))
            .unwrap(),
        );
        assert_eq!(stock(&app, part), 8);
        assert!(app.state().order_parts().is_empty());

        let doc = match app
            .dispatch(Action::PrintOrders {
                printed_on: date("2024-06-02"),
            })
            .unwrap()
        {
            Reply::Document(doc) => doc,
            other => panic!("unexpected reply {:?}", other),
        };
        assert_eq!(doc.car.id, car);
        assert_eq!(doc.orders[0].total, 1100.0);

        let dash = app.store().dashboard(date("2024-06-02"), 2).unwrap();
        assert_eq!(dash.in_progress, 1);

        // Edit the order and drop its only part
        app.dispatch(Action::Edit(Record::Order(order))).unwrap();
        assert_eq!(app.state().buffered_quantity(part), 2);
        app.dispatch(Action::RemovePartFromOrder(part)).unwrap();
        app.dispatch(Action::SubmitOrder(OrderForm::new(
            "Oil change",
            500.0,
            OrderStatus::InProgress,
        )))
        .unwrap();
        assert_eq!(stock(&app, part), 10);

        app.dispatch(Action::SelectCar(Some(car))).unwrap();
        let doc = match app
            .dispatch(Action::PrintOrders {
                printed_on: date("2024-06-02"),
            })
            .unwrap()
        {
            Reply::Document(doc) => doc,
            other => panic!("unexpected reply {:?}", other),
        };
        assert_eq!(doc.orders[0].total, 500.0);
        assert_eq!(doc.orders.len(), 1);
    }

    #[test]
    fn test_add_part_respects_stock_and_held_units() {
        let mut app = signed_in();
        let (_, _, part) = ivanov(&mut app);

        app.dispatch(Action::AddPartToOrder { part_id: part, quantity: 6 })
            .unwrap();
        let err = app
            .dispatch(Action::AddPartToOrder { part_id: part, quantity: 5 })
            .unwrap_err();
        assert!(matches!(
            err,
            ShopError::InsufficientStock { available: 10, requested: 11, .. }
        ));
        assert_eq!(app.state().buffered_quantity(part), 6);

        let order = saved(
            app.dispatch(Action::SubmitOrder(OrderForm::new("Service", 0.0, OrderStatus::New)))
                .unwrap(),
        );
        assert_eq!(stock(&app, part), 4);

        // While editing, the order's own six units count as available
        app.dispatch(Action::Edit(Record::Order(order))).unwrap();
        app.dispatch(Action::AddPartToOrder { part_id: part, quantity: 4 })
            .unwrap();
        assert_eq!(app.state().buffered_quantity(part), 10);
    }

    #[test]
    fn test_add_part_needs_a_car() {
        let mut app = signed_in();
        let part = saved(
            app.dispatch(Action::SubmitPart(PartForm::new("Bulb", None, 3, 50.0)))
                .unwrap(),
        );
        let err = app
            .dispatch(Action::AddPartToOrder { part_id: part, quantity: 1 })
            .unwrap_err();
        assert!(matches!(err, ShopError::NoSelection("car")));
    }

    #[test]
    fn test_failed_submit_keeps_buffer() {
        let mut app = signed_in();
        let (_, _, part) = ivanov(&mut app);
        app.dispatch(Action::AddPartToOrder { part_id: part, quantity: 1 })
            .unwrap();

        let err = app
            .dispatch(Action::SubmitOrder(OrderForm::new(" ", 100.0, OrderStatus::New)))
            .unwrap_err();
        assert_eq!(err.field(), Some("description"));
        assert_eq!(app.state().buffered_quantity(part), 1);
        assert_eq!(stock(&app, part), 10);
    }

    #[test]
    fn test_edit_client_then_submit_updates() {
        let mut app = signed_in();
        let (client, _, _) = ivanov(&mut app);

        let reply = app.dispatch(Action::Edit(Record::Client(client))).unwrap();
        let mut form = match reply {
            Reply::Editing(EditForm::Client(form)) => form,
            other => panic!("unexpected reply {:?}", other),
        };
        form.email = Some("ivanov@example.com".into());
        app.dispatch(Action::SubmitClient(form)).unwrap();

        assert_eq!(
            app.store().get_client(client).unwrap().email.as_deref(),
            Some("ivanov@example.com")
        );
        assert_eq!(app.state().editing().client, None);
        assert_eq!(app.store().list_clients().unwrap().len(), 1);
    }

    #[test]
    fn test_deleting_client_restores_stock_and_selection() {
        let mut app = signed_in();
        let (client, _, part) = ivanov(&mut app);
        app.dispatch(Action::AddPartToOrder { part_id: part, quantity: 3 })
            .unwrap();
        app.dispatch(Action::SubmitOrder(OrderForm::new("Oil", 100.0, OrderStatus::Ready)))
            .unwrap();
        assert_eq!(stock(&app, part), 7);

        app.dispatch(Action::Delete(Record::Client(client))).unwrap();
        assert_eq!(stock(&app, part), 10);
        assert_eq!(app.state().selected_client(), None);
        assert_eq!(app.state().selected_car(), None);
    }

    #[test]
    fn test_order_edit_follows_its_car() {
        let mut app = signed_in();
        let (_, lada, part) = ivanov(&mut app);
        app.dispatch(Action::AddPartToOrder { part_id: part, quantity: 2 })
            .unwrap();
        let order = saved(
            app.dispatch(Action::SubmitOrder(OrderForm::new("Oil", 500.0, OrderStatus::New)))
                .unwrap(),
        );
        let kia = saved(
            app.dispatch(Action::SubmitCar(CarForm::new("Kia", "Rio", "X2")))
                .unwrap(),
        );

        // Loading the order selects its car, so removing another car
        // leaves the edit usable
        app.dispatch(Action::SelectCar(Some(kia))).unwrap();
        app.dispatch(Action::Edit(Record::Order(order))).unwrap();
        assert_eq!(app.state().selected_car(), Some(lada));
        app.dispatch(Action::Delete(Record::Car(kia))).unwrap();
        assert_eq!(app.state().editing().order, Some(order));
        app.dispatch(Action::SubmitOrder(OrderForm::new("Oil", 600.0, OrderStatus::New)))
            .unwrap();
        assert_eq!(app.store().get_order(order).unwrap().labor_cost, 600.0);
        assert_eq!(stock(&app, part), 8);

        // Removing the order's own car drops the edit and its buffer
        app.dispatch(Action::Edit(Record::Order(order))).unwrap();
        app.dispatch(Action::Delete(Record::Car(lada))).unwrap();
        assert_eq!(app.state().editing().order, None);
        assert!(app.state().order_parts().is_empty());
        assert_eq!(stock(&app, part), 10);
    }

    #[test]
    fn test_deleting_sold_part_is_refused() {
        let mut app = signed_in();
        let (_, _, part) = ivanov(&mut app);
        app.dispatch(Action::AddPartToOrder { part_id: part, quantity: 1 })
            .unwrap();
        app.dispatch(Action::SubmitOrder(OrderForm::new("Oil", 100.0, OrderStatus::New)))
            .unwrap();

        let err = app.dispatch(Action::Delete(Record::Part(part))).unwrap_err();
        assert!(matches!(err, ShopError::InUse { .. }));
        assert_eq!(stock(&app, part), 9);
    }

    #[test]
    fn test_import_resets_state_but_keeps_login() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("shop.db");

        let mut app = signed_in();
        let (_, _, part) = ivanov(&mut app);
        app.dispatch(Action::Export(path.clone())).unwrap();
        app.dispatch(Action::AddPartToOrder { part_id: part, quantity: 1 })
            .unwrap();
        app.dispatch(Action::Search {
            scope: SearchScope::Clients,
            term: "iv".into(),
        })
        .unwrap();

        app.dispatch(Action::Import(path)).unwrap();
        assert!(app.state().is_signed_in());
        assert_eq!(app.state().selected_client(), None);
        assert!(app.state().order_parts().is_empty());
        assert_eq!(app.state().search(SearchScope::Clients), "");
        assert_eq!(app.store().list_clients().unwrap().len(), 1);
    }

    #[test]
    fn test_failed_import_keeps_current_database() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("junk.db");
        std::fs::write(&path, "not a database file ".repeat(200)).unwrap();

        let mut app = signed_in();
        let (client, _, _) = ivanov(&mut app);
        let err = app.dispatch(Action::Import(path)).unwrap_err();
        assert!(matches!(err, ShopError::ImportFailed(_)));
        assert_eq!(app.state().selected_client(), Some(client));
        assert_eq!(app.store().list_clients().unwrap().len(), 1);
    }

    #[test]
    fn test_car_needs_selected_client() {
        let mut app = signed_in();
        let err = app
            .dispatch(Action::SubmitCar(CarForm::new("Lada", "Niva", "V1")))
            .unwrap_err();
        assert!(matches!(err, ShopError::NoSelection("client")));
    }

    #[test]
    fn test_mutating_actions() {
        assert!(Action::Delete(Record::Part(1)).mutates());
        assert!(Action::SubmitOrder(OrderForm::default()).mutates());
        assert!(!Action::SelectCar(Some(1)).mutates());
        assert!(!Action::Export(PathBuf::from("x.db")).mutates());
    }

    #[test]
    fn test_report_action() {
        let mut app = signed_in();
        let reply = app
            .dispatch(Action::GenerateReport {
                from: date("2024-01-01"),
                to: date("2024-12-31"),
            })
            .unwrap();
        assert!(matches!(reply, Reply::Report(r) if r.total == 0.0));
    }
}
