//! The order-save unit of work
//!
//! An order and its part lines are written in one transaction. Editing an
//! order first returns every unit its old lines hold back to stock, drops
//! those lines, and then applies the new lines as if the order were new.
//! Each decrement is preceded by a sufficiency check, so stock never goes
//! negative mid-transaction; the schema's CHECK constraints back this up.

use chrono::{Local, NaiveDateTime};
use rusqlite::{params, OptionalExtension, Transaction};
use tracing::{debug, warn};

use super::writes::restore_order_stock;
use super::Store;
use crate::core::error::{foreign_key_violation, ShopError, ShopResult};
use crate::entities::{OrderDraft, PartLine, TIMESTAMP_FORMAT};

/// Wall-clock time in the local zone, the same clock report dates use
pub(crate) fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

impl Store {
    /// Persist an order and its full set of part lines atomically
    ///
    /// Returns the order id. On any failure nothing is written and the
    /// cause is wrapped in [`ShopError::OrderSave`].
    pub fn save_order(&mut self, draft: &OrderDraft, lines: &[PartLine]) -> ShopResult<i64> {
        draft.validate()?;
        for line in lines {
            line.validate()?;
        }

        let tx = self.conn.transaction()?;
        debug!(order = ?draft.id, car = draft.car_id, lines = lines.len(), "order save begin");

        match apply_order(&tx, draft, lines) {
            Ok(id) => {
                tx.commit()?;
                debug!(order = id, "order save committed");
                Ok(id)
            }
            Err(e) => {
                // Dropping the transaction rolls it back
                drop(tx);
                warn!(order = ?draft.id, error = %e, "order save rolled back");
                Err(ShopError::OrderSave(Box::new(e)))
            }
        }
    }
}

fn apply_order(tx: &Transaction<'_>, draft: &OrderDraft, lines: &[PartLine]) -> ShopResult<i64> {
    let order_id = match draft.id {
        Some(id) => {
            let changed = tx.execute(
                "UPDATE orders SET car_id = ?1, description = ?2, labor_cost = ?3, status = ?4 \
                 WHERE id = ?5",
                params![draft.car_id, draft.description, draft.labor_cost, draft.status, id],
            )?;
            if changed == 0 {
                return Err(ShopError::NotFound { entity: "order", id });
            }
            restore_order_stock(tx, id)?;
            tx.execute("DELETE FROM order_parts WHERE order_id = ?1", [id])?;
            id
        }
        None => {
            let created_at = draft
                .created_at
                .unwrap_or_else(now)
                .format(TIMESTAMP_FORMAT)
                .to_string();
            tx.execute(
                "INSERT INTO orders (car_id, description, labor_cost, status, created_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    draft.car_id,
                    draft.description,
                    draft.labor_cost,
                    draft.status,
                    created_at
                ],
            )
            .map_err(|e| {
                if foreign_key_violation(&e) {
                    ShopError::NotFound {
                        entity: "car",
                        id: draft.car_id,
                    }
                } else {
                    ShopError::Database(e)
                }
            })?;
            tx.last_insert_rowid()
        }
    };

    for line in lines {
        let (name, available): (String, i64) = tx
            .query_row(
                "SELECT name, quantity FROM inventory WHERE id = ?1",
                [line.part_id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?
            .ok_or(ShopError::NotFound {
                entity: "part",
                id: line.part_id,
            })?;
        if available < line.quantity {
            return Err(ShopError::InsufficientStock {
                part: name,
                available,
                requested: line.quantity,
            });
        }

        tx.execute(
            "INSERT INTO order_parts (order_id, part_id, quantity, price_at_sale) \
             VALUES (?1, ?2, ?3, ?4)",
            params![order_id, line.part_id, line.quantity, line.price],
        )?;
        tx.execute(
            "UPDATE inventory SET quantity = quantity - ?1 WHERE id = ?2",
            params![line.quantity, line.part_id],
        )?;
    }

    Ok(order_id)
}
