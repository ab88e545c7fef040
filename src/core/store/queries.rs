//! Read-side queries for clients, cars, orders and inventory

use std::collections::HashMap;

use chrono::NaiveDateTime;
use rusqlite::{params, OptionalExtension, Row};

use super::{OrderSummary, Store};
use crate::core::error::{ShopError, ShopResult};
use crate::entities::{
    Car, Client, InventoryPart, Order, OrderSort, PartLine, StatusFilter, TIMESTAMP_FORMAT,
};

pub(super) const CLIENT_COLUMNS: &str = "id, full_name, phone, email";
pub(super) const CAR_COLUMNS: &str = "id, client_id, brand, model, vin";
pub(super) const ORDER_COLUMNS: &str = "id, car_id, description, labor_cost, status, created_at";
pub(super) const PART_COLUMNS: &str = "id, name, article, quantity, price";

pub(super) fn client_from_row(row: &Row<'_>) -> rusqlite::Result<Client> {
    Ok(Client {
        id: row.get(0)?,
        full_name: row.get(1)?,
        phone: row.get(2)?,
        email: row.get(3)?,
    })
}

pub(super) fn car_from_row(row: &Row<'_>) -> rusqlite::Result<Car> {
    Ok(Car {
        id: row.get(0)?,
        client_id: row.get(1)?,
        brand: row.get(2)?,
        model: row.get(3)?,
        vin: row.get(4)?,
    })
}

pub(super) fn order_from_row(row: &Row<'_>) -> rusqlite::Result<Order> {
    Ok(Order {
        id: row.get(0)?,
        car_id: row.get(1)?,
        description: row.get(2)?,
        labor_cost: row.get(3)?,
        status: row.get(4)?,
        created_at: timestamp(row, 5)?,
    })
}

pub(super) fn part_from_row(row: &Row<'_>) -> rusqlite::Result<InventoryPart> {
    Ok(InventoryPart {
        id: row.get(0)?,
        name: row.get(1)?,
        article: row.get(2)?,
        quantity: row.get(3)?,
        price: row.get(4)?,
    })
}

/// Parse a stored `created_at` column
pub(super) fn timestamp(row: &Row<'_>, idx: usize) -> rusqlite::Result<NaiveDateTime> {
    let text: String = row.get(idx)?;
    NaiveDateTime::parse_from_str(&text, TIMESTAMP_FORMAT).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

impl Store {
    pub fn get_client(&self, id: i64) -> ShopResult<Client> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM clients WHERE id = ?1", CLIENT_COLUMNS),
                [id],
                client_from_row,
            )
            .optional()?
            .ok_or(ShopError::NotFound {
                entity: "client",
                id,
            })
    }

    pub fn list_clients(&self) -> ShopResult<Vec<Client>> {
        self.query(
            &format!(
                "SELECT {} FROM clients ORDER BY full_name COLLATE NOCASE, id",
                CLIENT_COLUMNS
            ),
            [],
            client_from_row,
        )
    }

    /// Clients whose name, phone or email contains `term`
    pub fn find_clients(&self, term: &str) -> ShopResult<Vec<Client>> {
        Ok(self
            .list_clients()?
            .into_iter()
            .filter(|c| c.matches(term))
            .collect())
    }

    pub fn get_car(&self, id: i64) -> ShopResult<Car> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM cars WHERE id = ?1", CAR_COLUMNS),
                [id],
                car_from_row,
            )
            .optional()?
            .ok_or(ShopError::NotFound { entity: "car", id })
    }

    pub fn cars_for_client(&self, client_id: i64) -> ShopResult<Vec<Car>> {
        self.query(
            &format!(
                "SELECT {} FROM cars WHERE client_id = ?1 \
                 ORDER BY brand COLLATE NOCASE, model COLLATE NOCASE, id",
                CAR_COLUMNS
            ),
            [client_id],
            car_from_row,
        )
    }

    pub fn find_cars(&self, client_id: i64, term: &str) -> ShopResult<Vec<Car>> {
        Ok(self
            .cars_for_client(client_id)?
            .into_iter()
            .filter(|c| c.matches(term))
            .collect())
    }

    /// Owner of a car
    pub fn client_of_car(&self, car_id: i64) -> ShopResult<Client> {
        let car = self.get_car(car_id)?;
        self.get_client(car.client_id)
    }

    pub fn get_order(&self, id: i64) -> ShopResult<Order> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM orders WHERE id = ?1", ORDER_COLUMNS),
                [id],
                order_from_row,
            )
            .optional()?
            .ok_or(ShopError::NotFound {
                entity: "order",
                id,
            })
    }

    /// Saved part lines of an order, with their price at sale
    pub fn order_lines(&self, order_id: i64) -> ShopResult<Vec<PartLine>> {
        self.query(
            "SELECT op.part_id, i.name, op.quantity, op.price_at_sale \
             FROM order_parts op JOIN inventory i ON i.id = op.part_id \
             WHERE op.order_id = ?1 ORDER BY i.name COLLATE NOCASE, op.part_id",
            [order_id],
            |row| {
                Ok(PartLine {
                    part_id: row.get(0)?,
                    name: row.get(1)?,
                    quantity: row.get(2)?,
                    price: row.get(3)?,
                })
            },
        )
    }

    /// Orders of a car with parts totals and part names, newest first
    pub fn orders_for_car(&self, car_id: i64) -> ShopResult<Vec<OrderSummary>> {
        let orders = self.query(
            &format!(
                "SELECT {} FROM orders WHERE car_id = ?1 ORDER BY created_at DESC, id DESC",
                ORDER_COLUMNS
            ),
            [car_id],
            order_from_row,
        )?;

        let mut lines: HashMap<i64, (f64, Vec<String>)> = HashMap::new();
        let rows = self.query(
            "SELECT op.order_id, i.name, op.quantity * op.price_at_sale \
             FROM order_parts op \
             JOIN inventory i ON i.id = op.part_id \
             JOIN orders o ON o.id = op.order_id \
             WHERE o.car_id = ?1 ORDER BY i.name COLLATE NOCASE",
            [car_id],
            |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, f64>(2)?,
                ))
            },
        )?;
        for (order_id, name, amount) in rows {
            let entry = lines.entry(order_id).or_default();
            entry.0 += amount;
            entry.1.push(name);
        }

        Ok(orders
            .into_iter()
            .map(|order| {
                let (parts_total, part_names) = lines.remove(&order.id).unwrap_or_default();
                OrderSummary {
                    order,
                    parts_total,
                    part_names,
                }
            })
            .collect())
    }

    /// Orders of a car after search, status filter and sort
    pub fn find_orders(
        &self,
        car_id: i64,
        term: &str,
        filter: StatusFilter,
        sort: OrderSort,
    ) -> ShopResult<Vec<OrderSummary>> {
        let mut orders: Vec<OrderSummary> = self
            .orders_for_car(car_id)?
            .into_iter()
            .filter(|s| filter.accepts(s.order.status))
            .filter(|s| s.order.matches(term, &s.part_names))
            .collect();

        match sort {
            OrderSort::DateDesc => orders.sort_by(|a, b| {
                b.order
                    .created_at
                    .cmp(&a.order.created_at)
                    .then(b.order.id.cmp(&a.order.id))
            }),
            OrderSort::DateAsc => orders.sort_by(|a, b| {
                a.order
                    .created_at
                    .cmp(&b.order.created_at)
                    .then(a.order.id.cmp(&b.order.id))
            }),
            OrderSort::CostDesc => orders.sort_by(|a, b| b.total().total_cmp(&a.total())),
            OrderSort::CostAsc => orders.sort_by(|a, b| a.total().total_cmp(&b.total())),
        }

        Ok(orders)
    }

    pub fn get_part(&self, id: i64) -> ShopResult<InventoryPart> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM inventory WHERE id = ?1", PART_COLUMNS),
                [id],
                part_from_row,
            )
            .optional()?
            .ok_or(ShopError::NotFound { entity: "part", id })
    }

    pub fn list_parts(&self) -> ShopResult<Vec<InventoryPart>> {
        self.query(
            &format!(
                "SELECT {} FROM inventory ORDER BY name COLLATE NOCASE, id",
                PART_COLUMNS
            ),
            [],
            part_from_row,
        )
    }

    pub fn find_parts(&self, term: &str) -> ShopResult<Vec<InventoryPart>> {
        Ok(self
            .list_parts()?
            .into_iter()
            .filter(|p| p.matches(term))
            .collect())
    }

    /// Part looked up by its article code
    pub fn part_by_article(&self, article: &str) -> ShopResult<Option<InventoryPart>> {
        Ok(self
            .conn
            .query_row(
                &format!("SELECT {} FROM inventory WHERE article = ?1", PART_COLUMNS),
                [article],
                part_from_row,
            )
            .optional()?)
    }

    /// Units of `part_id` currently allocated to `order_id`
    pub fn allocated_quantity(&self, order_id: i64, part_id: i64) -> ShopResult<i64> {
        Ok(self.conn.query_row(
            "SELECT COALESCE(SUM(quantity), 0) FROM order_parts \
             WHERE order_id = ?1 AND part_id = ?2",
            params![order_id, part_id],
            |row| row.get(0),
        )?)
    }
}
