//! Session state: sign-in, current page, selection, edit targets and the
//! part buffer of the order being composed
//!
//! Fields are private; every change goes through a named operation so the
//! selection rules hold everywhere.

use serde::Serialize;

use crate::entities::{lines_total, OrderSort, PartLine, StatusFilter};

/// The four pages of the workshop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum View {
    #[default]
    Dashboard,
    Workspace,
    Inventory,
    Reports,
}

impl View {
    pub const ALL: [View; 4] = [View::Dashboard, View::Workspace, View::Inventory, View::Reports];

    pub fn title(&self) -> &'static str {
        match self {
            View::Dashboard => "Dashboard",
            View::Workspace => "Workspace",
            View::Inventory => "Inventory",
            View::Reports => "Reports",
        }
    }
}

impl std::fmt::Display for View {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.title())
    }
}

/// A record addressed by kind and id
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Record {
    Client(i64),
    Car(i64),
    Order(i64),
    Part(i64),
}

/// Which list a search term applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchScope {
    Clients,
    Cars,
    Orders,
    Parts,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SearchTerms {
    pub clients: String,
    pub cars: String,
    pub orders: String,
    pub parts: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EditTargets {
    pub client: Option<i64>,
    pub car: Option<i64>,
    pub order: Option<i64>,
    pub part: Option<i64>,
}

#[derive(Debug, Clone, Default)]
pub struct AppState {
    user: Option<String>,
    view: View,
    client: Option<i64>,
    car: Option<i64>,
    editing: EditTargets,
    order_parts: Vec<PartLine>,
    search: SearchTerms,
    order_sort: OrderSort,
    order_filter: StatusFilter,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    // Accessors

    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    pub fn is_signed_in(&self) -> bool {
        self.user.is_some()
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn selected_client(&self) -> Option<i64> {
        self.client
    }

    pub fn selected_car(&self) -> Option<i64> {
        self.car
    }

    pub fn editing(&self) -> &EditTargets {
        &self.editing
    }

    /// Part lines of the order being composed
    pub fn order_parts(&self) -> &[PartLine] {
        &self.order_parts
    }

    pub fn order_parts_total(&self) -> f64 {
        lines_total(&self.order_parts)
    }

    /// Units of `part_id` already in the buffer
    pub fn buffered_quantity(&self, part_id: i64) -> i64 {
        self.order_parts
            .iter()
            .filter(|l| l.part_id == part_id)
            .map(|l| l.quantity)
            .sum()
    }

    pub fn search(&self, scope: SearchScope) -> &str {
        match scope {
            SearchScope::Clients => &self.search.clients,
            SearchScope::Cars => &self.search.cars,
            SearchScope::Orders => &self.search.orders,
            SearchScope::Parts => &self.search.parts,
        }
    }

    pub fn order_sort(&self) -> OrderSort {
        self.order_sort
    }

    pub fn order_filter(&self) -> StatusFilter {
        self.order_filter
    }

    // Updates

    pub fn sign_in(&mut self, user: impl Into<String>) {
        self.user = Some(user.into());
    }

    pub fn sign_out(&mut self) {
        *self = Self::default();
    }

    pub fn navigate(&mut self, view: View) {
        self.view = view;
    }

    /// Choose a client; drops the car selection, any order in progress and
    /// the car and order search terms
    pub fn select_client(&mut self, client: Option<i64>) {
        self.client = client;
        self.car = None;
        self.editing.car = None;
        self.editing.order = None;
        self.order_parts.clear();
        self.search.cars.clear();
        self.search.orders.clear();
    }

    /// Choose a car; drops any order in progress
    pub fn select_car(&mut self, car: Option<i64>) {
        self.car = car;
        self.editing.order = None;
        self.order_parts.clear();
        self.search.orders.clear();
    }

    /// Mark a record as the edit target of its form
    ///
    /// Editing an order replaces the buffer with `lines`; use
    /// [`AppState::begin_order_edit`] for that.
    pub fn set_editing(&mut self, record: Record) {
        match record {
            Record::Client(id) => self.editing.client = Some(id),
            Record::Car(id) => self.editing.car = Some(id),
            Record::Order(id) => self.editing.order = Some(id),
            Record::Part(id) => self.editing.part = Some(id),
        }
    }

    pub fn begin_order_edit(&mut self, order_id: i64, lines: Vec<PartLine>) {
        self.editing.order = Some(order_id);
        self.order_parts = lines;
    }

    /// Forget every edit target and empty the part buffer
    pub fn reset_editing(&mut self) {
        self.editing = EditTargets::default();
        self.order_parts.clear();
    }

    /// Clear the edit target of one form if it points at `record`
    pub fn forget(&mut self, record: Record) {
        match record {
            Record::Client(id) => {
                if self.client == Some(id) {
                    self.select_client(None);
                }
                if self.editing.client == Some(id) {
                    self.editing.client = None;
                }
            }
            Record::Car(id) => {
                if self.car == Some(id) {
                    self.select_car(None);
                }
                if self.editing.car == Some(id) {
                    self.editing.car = None;
                }
            }
            Record::Order(id) => {
                if self.editing.order == Some(id) {
                    self.editing.order = None;
                    self.order_parts.clear();
                }
            }
            Record::Part(id) => {
                if self.editing.part == Some(id) {
                    self.editing.part = None;
                }
            }
        }
    }

    /// Add a line to the buffer, merging with an existing line for the part
    pub fn add_part(&mut self, line: PartLine) {
        match self
            .order_parts
            .iter_mut()
            .find(|l| l.part_id == line.part_id)
        {
            Some(existing) => existing.quantity += line.quantity,
            None => self.order_parts.push(line),
        }
    }

    /// Remove a part's line from the buffer; returns whether it was there
    pub fn remove_part(&mut self, part_id: i64) -> bool {
        let before = self.order_parts.len();
        self.order_parts.retain(|l| l.part_id != part_id);
        self.order_parts.len() != before
    }

    pub fn set_search(&mut self, scope: SearchScope, term: impl Into<String>) {
        let term = term.into();
        match scope {
            SearchScope::Clients => self.search.clients = term,
            SearchScope::Cars => self.search.cars = term,
            SearchScope::Orders => self.search.orders = term,
            SearchScope::Parts => self.search.parts = term,
        }
    }

    pub fn set_order_sort(&mut self, sort: OrderSort) {
        self.order_sort = sort;
    }

    pub fn set_order_filter(&mut self, filter: StatusFilter) {
        self.order_filter = filter;
    }

    /// A different database was loaded: keep only the sign-in and the page
    pub fn reset_for_new_database(&mut self) {
        let user = self.user.take();
        let view = self.view;
        *self = Self {
            user,
            view,
            ..Self::default()
        };
    }
}
