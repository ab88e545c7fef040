//! Dashboard aggregates, revenue reports, histories and the print document

use chrono::{Datelike, Months, NaiveDate, NaiveTime};
use rusqlite::params;

use super::queries::{order_from_row, part_from_row, timestamp, ORDER_COLUMNS, PART_COLUMNS};
use super::{
    ClientRevenue, Dashboard, HistoryEntry, PrintDocument, PrintedOrder, RevenueReport, Store,
};
use crate::core::error::{ShopError, ShopResult};
use crate::entities::{lines_total, OrderStatus, TIMESTAMP_FORMAT};

/// Orders joined with their car title and parts total
const HISTORY_SELECT: &str = "\
    SELECT o.id, o.created_at, c.id, c.brand || ' ' || c.model, o.description, o.status, \
           o.labor_cost, \
           COALESCE((SELECT SUM(op.quantity * op.price_at_sale) \
                     FROM order_parts op WHERE op.order_id = o.id), 0) \
    FROM orders o JOIN cars c ON c.id = o.car_id";

/// Parts revenue of an order, usable inside aggregate queries over `o`
const ORDER_PARTS_SUM: &str = "COALESCE((SELECT SUM(op.quantity * op.price_at_sale) \
     FROM order_parts op WHERE op.order_id = o.id), 0)";

const RECENT_ORDERS: usize = 5;
const TOP_CLIENTS: usize = 5;

fn history_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<HistoryEntry> {
    Ok(HistoryEntry {
        order_id: row.get(0)?,
        created_at: timestamp(row, 1)?,
        car_id: row.get(2)?,
        car: row.get(3)?,
        description: row.get(4)?,
        status: row.get(5)?,
        labor_cost: row.get(6)?,
        parts_total: row.get(7)?,
    })
}

/// Stored timestamp of midnight on `date`
fn day_start(date: NaiveDate) -> String {
    date.and_time(NaiveTime::MIN)
        .format(TIMESTAMP_FORMAT)
        .to_string()
}

impl Store {
    fn count_status(&self, status: OrderStatus) -> ShopResult<i64> {
        Ok(self.conn.query_row(
            "SELECT COUNT(*) FROM orders WHERE status = ?1",
            [status],
            |row| row.get(0),
        )?)
    }

    /// Dashboard figures as of `today`
    ///
    /// Monthly revenue counts delivered orders created in `today`'s calendar
    /// month. Parts at or below `low_stock_threshold` are listed separately.
    pub fn dashboard(&self, today: NaiveDate, low_stock_threshold: i64) -> ShopResult<Dashboard> {
        let month_start = today.with_day(1).unwrap_or(today);
        let next_month = month_start
            .checked_add_months(Months::new(1))
            .unwrap_or(NaiveDate::MAX);

        let month_revenue: f64 = self.conn.query_row(
            &format!(
                "SELECT COALESCE(SUM(o.labor_cost + {}), 0) FROM orders o \
                 WHERE o.status = ?1 AND o.created_at >= ?2 AND o.created_at < ?3",
                ORDER_PARTS_SUM
            ),
            params![
                OrderStatus::Delivered,
                day_start(month_start),
                day_start(next_month)
            ],
            |row| row.get(0),
        )?;

        let recent_orders = self.query(
            &format!(
                "{} ORDER BY o.created_at DESC, o.id DESC LIMIT {}",
                HISTORY_SELECT, RECENT_ORDERS
            ),
            [],
            history_from_row,
        )?;

        let top_clients = self.query(
            &format!(
                "SELECT cl.id, cl.full_name, SUM(o.labor_cost + {}) AS revenue \
                 FROM orders o \
                 JOIN cars c ON c.id = o.car_id \
                 JOIN clients cl ON cl.id = c.client_id \
                 WHERE o.status = ?1 \
                 GROUP BY cl.id \
                 ORDER BY revenue DESC, cl.full_name COLLATE NOCASE \
                 LIMIT {}",
                ORDER_PARTS_SUM, TOP_CLIENTS
            ),
            [OrderStatus::Delivered],
            |row| {
                Ok(ClientRevenue {
                    client_id: row.get(0)?,
                    full_name: row.get(1)?,
                    revenue: row.get(2)?,
                })
            },
        )?;

        let low_stock = self.query(
            &format!(
                "SELECT {} FROM inventory WHERE quantity <= ?1 \
                 ORDER BY quantity, name COLLATE NOCASE",
                PART_COLUMNS
            ),
            [low_stock_threshold],
            part_from_row,
        )?;

        Ok(Dashboard {
            in_progress: self.count_status(OrderStatus::InProgress)?,
            ready: self.count_status(OrderStatus::Ready)?,
            month_revenue,
            month_start,
            recent_orders,
            top_clients,
            low_stock,
        })
    }

    /// Delivered revenue for orders created between `from` and `to`, inclusive
    pub fn revenue_report(&self, from: NaiveDate, to: NaiveDate) -> ShopResult<RevenueReport> {
        if from > to {
            return Err(ShopError::validation(
                "date range",
                format!("start {} is after end {}", from, to),
            ));
        }
        let end = to.succ_opt().unwrap_or(NaiveDate::MAX);

        let orders = self.query(
            &format!(
                "{} WHERE o.status = ?1 AND o.created_at >= ?2 AND o.created_at < ?3 \
                 ORDER BY o.created_at, o.id",
                HISTORY_SELECT
            ),
            params![OrderStatus::Delivered, day_start(from), day_start(end)],
            history_from_row,
        )?;

        let labor_total: f64 = orders.iter().map(|o| o.labor_cost).sum();
        let parts_total: f64 = orders.iter().map(|o| o.parts_total).sum();
        Ok(RevenueReport {
            from,
            to,
            orders,
            labor_total,
            parts_total,
            total: labor_total + parts_total,
        })
    }

    /// Every order on every car of a client, newest first
    pub fn client_history(&self, client_id: i64) -> ShopResult<Vec<HistoryEntry>> {
        self.get_client(client_id)?;
        self.query(
            &format!(
                "{} WHERE c.client_id = ?1 ORDER BY o.created_at DESC, o.id DESC",
                HISTORY_SELECT
            ),
            [client_id],
            history_from_row,
        )
    }

    pub fn car_history(&self, car_id: i64) -> ShopResult<Vec<HistoryEntry>> {
        self.get_car(car_id)?;
        self.query(
            &format!(
                "{} WHERE o.car_id = ?1 ORDER BY o.created_at DESC, o.id DESC",
                HISTORY_SELECT
            ),
            [car_id],
            history_from_row,
        )
    }

    /// Full order history of a car with lines and totals
    pub fn print_document(&self, car_id: i64, printed_on: NaiveDate) -> ShopResult<PrintDocument> {
        let car = self.get_car(car_id)?;
        let client = self.get_client(car.client_id)?;

        let orders = self.query(
            &format!(
                "SELECT {} FROM orders WHERE car_id = ?1 ORDER BY created_at DESC, id DESC",
                ORDER_COLUMNS
            ),
            [car_id],
            order_from_row,
        )?;

        let orders = orders
            .into_iter()
            .map(|order| {
                let lines = self.order_lines(order.id)?;
                let parts_total = lines_total(&lines);
                Ok(PrintedOrder {
                    total: order.labor_cost + parts_total,
                    order,
                    lines,
                    parts_total,
                })
            })
            .collect::<ShopResult<Vec<_>>>()?;

        let grand_total = orders.iter().map(|o| o.total).sum();
        Ok(PrintDocument {
            printed_on,
            client,
            car,
            orders,
            grand_total,
        })
    }
}
