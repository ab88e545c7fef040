//! Page view models
//!
//! Pure reads of the store and the session state; the front ends only
//! format what these return.

use chrono::NaiveDate;
use serde::Serialize;

use crate::core::app::App;
use crate::core::error::ShopResult;
use crate::core::state::{EditTargets, SearchScope};
use crate::core::store::{Dashboard, HistoryEntry, OrderSummary};
use crate::entities::{Car, Client, InventoryPart, OrderSort, PartLine, StatusFilter};

#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub today: NaiveDate,
    #[serde(flatten)]
    pub dashboard: Dashboard,
}

/// Clients, the selected client's cars and history, the selected car's
/// orders and the order being composed
#[derive(Debug, Clone, Serialize)]
pub struct WorkspaceView {
    pub clients: Vec<Client>,
    pub client: Option<Client>,
    pub client_history: Vec<HistoryEntry>,
    pub cars: Vec<Car>,
    pub car: Option<Car>,
    pub orders: Vec<OrderSummary>,
    pub order_sort: String,
    pub order_filter: String,
    pub order_parts: Vec<PartLine>,
    pub order_parts_total: f64,
    pub editing: EditTargets,
}

#[derive(Debug, Clone, Serialize)]
pub struct InventoryView {
    pub parts: Vec<InventoryPart>,
    pub total_units: i64,
    pub stock_value: f64,
    pub low_stock_threshold: i64,
}

pub fn dashboard(app: &App, today: NaiveDate) -> ShopResult<DashboardView> {
    let dashboard = app
        .store()
        .dashboard(today, app.config().low_stock_threshold())?;
    Ok(DashboardView { today, dashboard })
}

pub fn workspace(app: &App) -> ShopResult<WorkspaceView> {
    let store = app.store();
    let state = app.state();

    let clients = store.find_clients(state.search(SearchScope::Clients))?;
    let client = state
        .selected_client()
        .map(|id| store.get_client(id))
        .transpose()?;

    let (cars, client_history) = match &client {
        Some(c) => (
            store.find_cars(c.id, state.search(SearchScope::Cars))?,
            store.client_history(c.id)?,
        ),
        None => (Vec::new(), Vec::new()),
    };

    let car = state.selected_car().map(|id| store.get_car(id)).transpose()?;
    let orders = match &car {
        Some(c) => store.find_orders(
            c.id,
            state.search(SearchScope::Orders),
            state.order_filter(),
            state.order_sort(),
        )?,
        None => Vec::new(),
    };

    Ok(WorkspaceView {
        clients,
        client,
        client_history,
        cars,
        car,
        orders,
        order_sort: sort_label(state.order_sort()),
        order_filter: filter_label(state.order_filter()),
        order_parts: state.order_parts().to_vec(),
        order_parts_total: state.order_parts_total(),
        editing: state.editing().clone(),
    })
}

pub fn inventory(app: &App) -> ShopResult<InventoryView> {
    let parts = app
        .store()
        .find_parts(app.state().search(SearchScope::Parts))?;
    Ok(InventoryView {
        total_units: parts.iter().map(|p| p.quantity).sum(),
        stock_value: parts.iter().map(InventoryPart::stock_value).sum(),
        low_stock_threshold: app.config().low_stock_threshold(),
        parts,
    })
}

fn sort_label(sort: OrderSort) -> String {
    sort.label().to_string()
}

fn filter_label(filter: StatusFilter) -> String {
    match filter {
        StatusFilter::All => "All statuses".to_string(),
        StatusFilter::Only(status) => status.label().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::app::{Action, Reply};
    use crate::core::state::Record;
    use crate::core::Config;
    use crate::entities::{CarForm, ClientForm, OrderForm, OrderStatus, PartForm};

    fn app_with_data() -> App {
        let mut app = App::new(Config::default()).unwrap();
        app.dispatch(Action::Login {
            username: "admin".into(),
            password: "admin".into(),
        })
        .unwrap();
        for (name, phone) in [("Ivanov", "+7 900 000-00-00"), ("Petrov", "+7 900 000-00-01")] {
            app.dispatch(Action::SubmitClient(ClientForm::new(name, phone, None)))
                .unwrap();
        }
        app
    }

    #[test]
    fn test_workspace_without_selection() {
        let app = app_with_data();
        let view = workspace(&app).unwrap();
        assert_eq!(view.clients.len(), 2);
        assert!(view.client.is_none());
        assert!(view.cars.is_empty());
        assert!(view.orders.is_empty());
        assert_eq!(view.order_filter, "All statuses");
    }

    #[test]
    fn test_workspace_applies_search_and_selection() {
        let mut app = app_with_data();
        app.dispatch(Action::Search {
            scope: SearchScope::Clients,
            term: "petr".into(),
        })
        .unwrap();
        let view = workspace(&app).unwrap();
        assert_eq!(view.clients.len(), 1);

        let petrov = view.clients[0].id;
        app.dispatch(Action::SelectClient(Some(petrov))).unwrap();
        let car = match app
            .dispatch(Action::SubmitCar(CarForm::new("Kia", "Rio", "K1")))
            .unwrap()
        {
            Reply::Saved(Record::Car(id)) => id,
            other => panic!("unexpected reply {:?}", other),
        };
        app.dispatch(Action::SelectCar(Some(car))).unwrap();
        app.dispatch(Action::SubmitOrder(OrderForm::new("Wash", 200.0, OrderStatus::New)))
            .unwrap();

        let view = workspace(&app).unwrap();
        assert_eq!(view.client.as_ref().map(|c| c.full_name.as_str()), Some("Petrov"));
        assert_eq!(view.cars.len(), 1);
        assert_eq!(view.orders.len(), 1);
        assert_eq!(view.client_history.len(), 1);
    }

    #[test]
    fn test_inventory_totals() {
        let mut app = app_with_data();
        app.dispatch(Action::SubmitPart(PartForm::new("Bulb", None, 4, 50.0)))
            .unwrap();
        app.dispatch(Action::SubmitPart(PartForm::new("Fuse", None, 10, 5.0)))
            .unwrap();
        let view = inventory(&app).unwrap();
        assert_eq!(view.total_units, 14);
        assert_eq!(view.stock_value, 250.0);
    }
}
