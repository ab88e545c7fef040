//! Repair order entity types

use chrono::NaiveDateTime;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};

use super::{matches_search, non_negative_amount, required};
use crate::core::error::ShopError;

/// Storage format of `orders.created_at`
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Order lifecycle status
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    New,
    InProgress,
    Ready,
    Delivered,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 4] = [
        OrderStatus::New,
        OrderStatus::InProgress,
        OrderStatus::Ready,
        OrderStatus::Delivered,
    ];

    /// Token stored in the database
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::New => "new",
            OrderStatus::InProgress => "in_progress",
            OrderStatus::Ready => "ready",
            OrderStatus::Delivered => "delivered",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            OrderStatus::New => "New",
            OrderStatus::InProgress => "In progress",
            OrderStatus::Ready => "Ready",
            OrderStatus::Delivered => "Delivered",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['-', ' '], "_").as_str() {
            "new" => Ok(OrderStatus::New),
            "in_progress" | "inprogress" => Ok(OrderStatus::InProgress),
            "ready" => Ok(OrderStatus::Ready),
            "delivered" => Ok(OrderStatus::Delivered),
            _ => Err(format!(
                "Unknown order status: {} (expected new, in_progress, ready or delivered)",
                s
            )),
        }
    }
}

impl ToSql for OrderStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for OrderStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|e: String| FromSqlError::Other(e.into()))
    }
}

/// Status filter for order lists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Only(OrderStatus),
}

impl StatusFilter {
    pub fn accepts(&self, status: OrderStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Only(wanted) => *wanted == status,
        }
    }
}

impl std::str::FromStr for StatusFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            Ok(StatusFilter::All)
        } else {
            s.parse().map(StatusFilter::Only)
        }
    }
}

impl std::fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StatusFilter::All => write!(f, "all"),
            StatusFilter::Only(status) => write!(f, "{}", status.as_str()),
        }
    }
}

/// Sort orders for order lists; cost means the order total
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderSort {
    #[default]
    DateDesc,
    DateAsc,
    CostDesc,
    CostAsc,
}

impl OrderSort {
    pub const ALL: [OrderSort; 4] = [
        OrderSort::DateDesc,
        OrderSort::DateAsc,
        OrderSort::CostDesc,
        OrderSort::CostAsc,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderSort::DateDesc => "date_desc",
            OrderSort::DateAsc => "date_asc",
            OrderSort::CostDesc => "cost_desc",
            OrderSort::CostAsc => "cost_asc",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            OrderSort::DateDesc => "Newest first",
            OrderSort::DateAsc => "Oldest first",
            OrderSort::CostDesc => "Most expensive first",
            OrderSort::CostAsc => "Cheapest first",
        }
    }
}

impl std::fmt::Display for OrderSort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for OrderSort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "date_desc" => Ok(OrderSort::DateDesc),
            "date_asc" => Ok(OrderSort::DateAsc),
            "cost_desc" => Ok(OrderSort::CostDesc),
            "cost_asc" => Ok(OrderSort::CostAsc),
            _ => Err(format!(
                "Unknown sort: {} (expected date_desc, date_asc, cost_desc or cost_asc)",
                s
            )),
        }
    }
}

/// A stored repair order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    pub car_id: i64,
    pub description: String,
    pub labor_cost: f64,
    pub status: OrderStatus,
    pub created_at: NaiveDateTime,
}

/// One part line of an order: what was taken from stock and at what price
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartLine {
    pub part_id: i64,
    /// Display name, not persisted on the line itself
    pub name: String,
    pub quantity: i64,
    /// Unit price at the time of sale
    pub price: f64,
}

impl PartLine {
    pub fn new(part_id: i64, name: impl Into<String>, quantity: i64, price: f64) -> Self {
        Self {
            part_id,
            name: name.into(),
            quantity,
            price,
        }
    }

    pub fn total(&self) -> f64 {
        self.quantity as f64 * self.price
    }

    pub fn validate(&self) -> Result<(), ShopError> {
        if self.quantity < 1 {
            return Err(ShopError::validation(
                "quantity",
                format!("\"{}\" needs at least one unit", self.name),
            ));
        }
        non_negative_amount("price", self.price)
    }
}

/// Sum of quantity x price over a set of lines
pub fn lines_total(lines: &[PartLine]) -> f64 {
    lines.iter().map(PartLine::total).sum()
}

/// Scalar order fields as entered in the order form
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderForm {
    pub description: String,
    pub labor_cost: f64,
    pub status: OrderStatus,
}

impl OrderForm {
    pub fn new(description: &str, labor_cost: f64, status: OrderStatus) -> Self {
        Self {
            description: description.trim().to_string(),
            labor_cost,
            status,
        }
    }
}

impl From<&Order> for OrderForm {
    fn from(order: &Order) -> Self {
        Self {
            description: order.description.clone(),
            labor_cost: order.labor_cost,
            status: order.status,
        }
    }
}

/// Everything the order-save transaction needs besides the part lines
#[derive(Debug, Clone, PartialEq)]
pub struct OrderDraft {
    /// `None` creates a new order
    pub id: Option<i64>,
    pub car_id: i64,
    pub description: String,
    pub labor_cost: f64,
    pub status: OrderStatus,
    /// Creation time for new orders; defaults to now
    pub created_at: Option<NaiveDateTime>,
}

impl OrderDraft {
    pub fn new(car_id: i64, form: &OrderForm) -> Self {
        Self {
            id: None,
            car_id,
            description: form.description.clone(),
            labor_cost: form.labor_cost,
            status: form.status,
            created_at: None,
        }
    }

    pub fn editing(mut self, id: Option<i64>) -> Self {
        self.id = id;
        self
    }

    pub fn created_at(mut self, at: NaiveDateTime) -> Self {
        self.created_at = Some(at);
        self
    }

    pub fn validate(&self) -> Result<(), ShopError> {
        required("description", &self.description)?;
        non_negative_amount("labor cost", self.labor_cost)
    }
}

impl Order {
    pub fn matches(&self, term: &str, part_names: &[String]) -> bool {
        matches_search(
            term,
            std::iter::once(self.description.as_str()).chain(part_names.iter().map(String::as_str)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parse_tokens_and_labels() {
        assert_eq!("in_progress".parse::<OrderStatus>(), Ok(OrderStatus::InProgress));
        assert_eq!("In progress".parse::<OrderStatus>(), Ok(OrderStatus::InProgress));
        assert_eq!("DELIVERED".parse::<OrderStatus>(), Ok(OrderStatus::Delivered));
        assert!("lost".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_status_roundtrip_through_sqlite() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        let status: OrderStatus = conn
            .query_row("SELECT ?1", [OrderStatus::Ready], |row| row.get(0))
            .unwrap();
        assert_eq!(status, OrderStatus::Ready);
    }

    #[test]
    fn test_status_filter() {
        assert!(StatusFilter::All.accepts(OrderStatus::New));
        let only_ready: StatusFilter = "ready".parse().unwrap();
        assert!(only_ready.accepts(OrderStatus::Ready));
        assert!(!only_ready.accepts(OrderStatus::Delivered));
        assert_eq!("all".parse::<StatusFilter>(), Ok(StatusFilter::All));
    }

    #[test]
    fn test_sort_parse() {
        assert_eq!("cost-asc".parse::<OrderSort>(), Ok(OrderSort::CostAsc));
        assert_eq!(OrderSort::default(), OrderSort::DateDesc);
        assert!("price".parse::<OrderSort>().is_err());
    }

    #[test]
    fn test_part_line_validation() {
        assert!(PartLine::new(1, "Filter", 1, 0.0).validate().is_ok());
        assert_eq!(
            PartLine::new(1, "Filter", 0, 10.0)
                .validate()
                .unwrap_err()
                .field(),
            Some("quantity")
        );
    }

    #[test]
    fn test_lines_total() {
        let lines = vec![
            PartLine::new(1, "Filter", 2, 300.0),
            PartLine::new(2, "Oil", 1, 1200.5),
        ];
        assert_eq!(lines_total(&lines), 1800.5);
        assert_eq!(lines_total(&[]), 0.0);
    }

    #[test]
    fn test_draft_validation() {
        let form = OrderForm::new("  ", 100.0, OrderStatus::New);
        assert!(OrderDraft::new(1, &form).validate().is_err());
        let form = OrderForm::new("Oil change", -1.0, OrderStatus::New);
        assert_eq!(
            OrderDraft::new(1, &form).validate().unwrap_err().field(),
            Some("labor cost")
        );
    }

    #[test]
    fn test_order_search_includes_part_names() {
        let order = Order {
            id: 1,
            car_id: 1,
            description: "Oil change".to_string(),
            labor_cost: 500.0,
            status: OrderStatus::New,
            created_at: NaiveDateTime::parse_from_str("2024-05-01 10:00:00", TIMESTAMP_FORMAT)
                .unwrap(),
        };
        assert!(order.matches("OIL", &[]));
        assert!(order.matches("filter", &["Oil filter".to_string()]));
        assert!(!order.matches("brake", &["Oil filter".to_string()]));
    }
}
