//! Store result types
//!
//! Read models assembled from several tables: order summaries, history
//! entries, dashboard aggregates, reports and the print document.

use std::path::PathBuf;

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::entities::{Car, Client, InventoryPart, Order, OrderStatus, PartLine};

/// An order with its part lines folded into totals
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderSummary {
    pub order: Order,
    pub parts_total: f64,
    pub part_names: Vec<String>,
}

impl OrderSummary {
    /// Labor plus parts
    pub fn total(&self) -> f64 {
        self.order.labor_cost + self.parts_total
    }
}

/// One line of an order history (client, car, dashboard, reports)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryEntry {
    pub order_id: i64,
    pub created_at: NaiveDateTime,
    pub car_id: i64,
    /// "Brand Model"
    pub car: String,
    pub description: String,
    pub status: OrderStatus,
    pub labor_cost: f64,
    pub parts_total: f64,
}

impl HistoryEntry {
    pub fn total(&self) -> f64 {
        self.labor_cost + self.parts_total
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClientRevenue {
    pub client_id: i64,
    pub full_name: String,
    pub revenue: f64,
}

/// Dashboard aggregates
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub in_progress: i64,
    pub ready: i64,
    /// Delivered revenue for orders created in the current month
    pub month_revenue: f64,
    pub month_start: NaiveDate,
    pub recent_orders: Vec<HistoryEntry>,
    pub top_clients: Vec<ClientRevenue>,
    pub low_stock: Vec<InventoryPart>,
}

/// Delivered revenue over a date range
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RevenueReport {
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub orders: Vec<HistoryEntry>,
    pub labor_total: f64,
    pub parts_total: f64,
    pub total: f64,
}

impl RevenueReport {
    pub fn order_count(&self) -> usize {
        self.orders.len()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrintedOrder {
    pub order: Order,
    pub lines: Vec<PartLine>,
    pub parts_total: f64,
    pub total: f64,
}

/// Full order history of one vehicle, ready for printing
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrintDocument {
    pub printed_on: NaiveDate,
    pub client: Client,
    pub car: Car,
    pub orders: Vec<PrintedOrder>,
    pub grand_total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportStats {
    pub path: PathBuf,
    pub bytes: u64,
    pub sha256: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableCount {
    pub table: String,
    pub rows: i64,
}
