//! Client, car and part writes, and the stock-restoring deletes

use rusqlite::{params, Connection};
use tracing::debug;

use super::Store;
use crate::core::error::{foreign_key_violation, unique_violation, ShopError, ShopResult};
use crate::entities::{CarForm, ClientForm, PartForm};

/// Which orders a delete takes with it
#[derive(Debug, Clone, Copy)]
enum OrderScope {
    Order,
    Car,
    Client,
}

impl OrderScope {
    /// Subquery selecting the affected order ids, bound to `?1`
    fn order_ids(self) -> &'static str {
        match self {
            OrderScope::Order => "SELECT id FROM orders WHERE id = ?1",
            OrderScope::Car => "SELECT id FROM orders WHERE car_id = ?1",
            OrderScope::Client => {
                "SELECT o.id FROM orders o JOIN cars c ON c.id = o.car_id WHERE c.client_id = ?1"
            }
        }
    }
}

/// Return every unit allocated to the scoped orders back to stock
fn restore_stock(conn: &Connection, scope: OrderScope, id: i64) -> rusqlite::Result<usize> {
    let ids = scope.order_ids();
    conn.execute(
        &format!(
            "UPDATE inventory SET quantity = quantity + ( \
                 SELECT SUM(op.quantity) FROM order_parts op \
                 WHERE op.part_id = inventory.id AND op.order_id IN ({ids}) \
             ) \
             WHERE id IN (SELECT op.part_id FROM order_parts op WHERE op.order_id IN ({ids}))"
        ),
        [id],
    )
}

pub(super) fn restore_order_stock(conn: &Connection, order_id: i64) -> rusqlite::Result<usize> {
    restore_stock(conn, OrderScope::Order, order_id)
}

/// Map a failed insert/update to the user-facing error
fn write_error(err: rusqlite::Error) -> ShopError {
    match unique_violation(&err) {
        Some(field) => ShopError::Duplicate { field },
        None => ShopError::Database(err),
    }
}

fn expect_row(changed: usize, entity: &'static str, id: i64) -> ShopResult<()> {
    if changed == 0 {
        return Err(ShopError::NotFound { entity, id });
    }
    Ok(())
}

impl Store {
    pub fn create_client(&self, form: &ClientForm) -> ShopResult<i64> {
        form.validate()?;
        self.conn
            .execute(
                "INSERT INTO clients (full_name, phone, email) VALUES (?1, ?2, ?3)",
                params![form.full_name, form.phone, form.email],
            )
            .map_err(write_error)?;
        let id = self.conn.last_insert_rowid();
        debug!(id, "created client");
        Ok(id)
    }

    pub fn update_client(&self, id: i64, form: &ClientForm) -> ShopResult<()> {
        form.validate()?;
        let changed = self
            .conn
            .execute(
                "UPDATE clients SET full_name = ?1, phone = ?2, email = ?3 WHERE id = ?4",
                params![form.full_name, form.phone, form.email, id],
            )
            .map_err(write_error)?;
        expect_row(changed, "client", id)
    }

    pub fn create_car(&self, client_id: i64, form: &CarForm) -> ShopResult<i64> {
        form.validate()?;
        self.conn
            .execute(
                "INSERT INTO cars (client_id, brand, model, vin) VALUES (?1, ?2, ?3, ?4)",
                params![client_id, form.brand, form.model, form.vin],
            )
            .map_err(|e| {
                if foreign_key_violation(&e) {
                    ShopError::NotFound {
                        entity: "client",
                        id: client_id,
                    }
                } else {
                    write_error(e)
                }
            })?;
        let id = self.conn.last_insert_rowid();
        debug!(id, client_id, "created car");
        Ok(id)
    }

    pub fn update_car(&self, id: i64, form: &CarForm) -> ShopResult<()> {
        form.validate()?;
        let changed = self
            .conn
            .execute(
                "UPDATE cars SET brand = ?1, model = ?2, vin = ?3 WHERE id = ?4",
                params![form.brand, form.model, form.vin, id],
            )
            .map_err(write_error)?;
        expect_row(changed, "car", id)
    }

    pub fn create_part(&self, form: &PartForm) -> ShopResult<i64> {
        form.validate()?;
        self.conn
            .execute(
                "INSERT INTO inventory (name, article, quantity, price) VALUES (?1, ?2, ?3, ?4)",
                params![form.name, form.article, form.quantity, form.price],
            )
            .map_err(write_error)?;
        let id = self.conn.last_insert_rowid();
        debug!(id, "created part");
        Ok(id)
    }

    /// Direct stock adjustment: the form's quantity replaces the stock level
    pub fn update_part(&self, id: i64, form: &PartForm) -> ShopResult<()> {
        form.validate()?;
        let changed = self
            .conn
            .execute(
                "UPDATE inventory SET name = ?1, article = ?2, quantity = ?3, price = ?4 \
                 WHERE id = ?5",
                params![form.name, form.article, form.quantity, form.price, id],
            )
            .map_err(write_error)?;
        expect_row(changed, "part", id)
    }

    /// Delete an inventory part; refused while any order line references it
    pub fn delete_part(&self, id: i64) -> ShopResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM inventory WHERE id = ?1", [id])
            .map_err(|e| {
                if foreign_key_violation(&e) {
                    ShopError::InUse { entity: "part", id }
                } else {
                    ShopError::Database(e)
                }
            })?;
        expect_row(changed, "part", id)
    }

    pub fn delete_order(&mut self, id: i64) -> ShopResult<()> {
        self.delete_with_orders(OrderScope::Order, "orders", "order", id)
    }

    /// Delete a car with all its orders
    pub fn delete_car(&mut self, id: i64) -> ShopResult<()> {
        self.delete_with_orders(OrderScope::Car, "cars", "car", id)
    }

    /// Delete a client with all their cars and orders
    pub fn delete_client(&mut self, id: i64) -> ShopResult<()> {
        self.delete_with_orders(OrderScope::Client, "clients", "client", id)
    }

    fn delete_with_orders(
        &mut self,
        scope: OrderScope,
        table: &'static str,
        entity: &'static str,
        id: i64,
    ) -> ShopResult<()> {
        let tx = self.conn.transaction()?;
        let restored = restore_stock(&tx, scope, id)?;
        let changed = tx.execute(&format!("DELETE FROM {} WHERE id = ?1", table), [id])?;
        expect_row(changed, entity, id)?;
        tx.commit()?;
        debug!(entity, id, restored_parts = restored, "deleted with cascade");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{OrderDraft, OrderForm, OrderStatus, PartLine};

    fn stock(store: &Store, part: i64) -> i64 {
        store.get_part(part).unwrap().quantity
    }

    #[test]
    fn test_duplicate_email_reports_field() {
        let store = Store::open_in_memory().unwrap();
        let form = ClientForm::new("Ivanov", "+7 900 000-00-00", Some("i@shop.ru".into()));
        store.create_client(&form).unwrap();
        let err = store
            .create_client(&ClientForm::new("Petrov", "+7 900 000-00-01", Some("i@shop.ru".into())))
            .unwrap_err();
        assert!(matches!(err, ShopError::Duplicate { ref field } if field == "email"));
    }

    #[test]
    fn test_clients_without_email_do_not_collide() {
        let store = Store::open_in_memory().unwrap();
        store
            .create_client(&ClientForm::new("A", "+7 900 000-00-00", Some(" ".into())))
            .unwrap();
        store
            .create_client(&ClientForm::new("B", "+7 900 000-00-01", None))
            .unwrap();
        assert_eq!(store.list_clients().unwrap().len(), 2);
    }

    #[test]
    fn test_duplicate_vin_and_article() {
        let store = Store::open_in_memory().unwrap();
        let client = store
            .create_client(&ClientForm::new("A", "+7 900 000-00-00", None))
            .unwrap();
        store.create_car(client, &CarForm::new("Lada", "Niva", "V1")).unwrap();
        let err = store
            .create_car(client, &CarForm::new("Lada", "Vesta", "V1"))
            .unwrap_err();
        assert_eq!(err.field(), Some("vin"));

        store
            .create_part(&PartForm::new("Bulb", Some("H4".into()), 1, 90.0))
            .unwrap();
        let err = store
            .create_part(&PartForm::new("Bulb 2", Some("H4".into()), 1, 90.0))
            .unwrap_err();
        assert_eq!(err.field(), Some("article"));
    }

    #[test]
    fn test_car_for_missing_client() {
        let store = Store::open_in_memory().unwrap();
        let err = store
            .create_car(7, &CarForm::new("Lada", "Niva", "V1"))
            .unwrap_err();
        assert!(matches!(err, ShopError::NotFound { entity: "client", id: 7 }));
    }

    #[test]
    fn test_update_missing_rows() {
        let store = Store::open_in_memory().unwrap();
        let err = store
            .update_part(3, &PartForm::new("Bulb", None, 1, 1.0))
            .unwrap_err();
        assert!(matches!(err, ShopError::NotFound { entity: "part", id: 3 }));
    }

    #[test]
    fn test_delete_client_cascades_and_restores_stock() {
        let mut store = Store::open_in_memory().unwrap();
        let client = store
            .create_client(&ClientForm::new("Ivanov", "+7 900 000-00-00", None))
            .unwrap();
        let first = store.create_car(client, &CarForm::new("Lada", "Vesta", "X1")).unwrap();
        let second = store.create_car(client, &CarForm::new("Kia", "Rio", "X2")).unwrap();
        let part = store
            .create_part(&PartForm::new("Oil filter", None, 10, 300.0))
            .unwrap();

        let form = OrderForm::new("Oil change", 500.0, OrderStatus::New);
        store
            .save_order(&OrderDraft::new(first, &form), &[PartLine::new(part, "Oil filter", 2, 300.0)])
            .unwrap();
        store
            .save_order(&OrderDraft::new(second, &form), &[PartLine::new(part, "Oil filter", 3, 300.0)])
            .unwrap();
        assert_eq!(stock(&store, part), 5);

        store.delete_client(client).unwrap();

        assert_eq!(stock(&store, part), 10);
        let counts = store.table_counts().unwrap();
        for table in ["clients", "cars", "orders", "order_parts"] {
            let count = counts.iter().find(|c| c.table == table).unwrap();
            assert_eq!(count.rows, 0, "{} should be empty", table);
        }
    }

    #[test]
    fn test_delete_car_keeps_other_cars_allocations() {
        let mut store = Store::open_in_memory().unwrap();
        let client = store
            .create_client(&ClientForm::new("Ivanov", "+7 900 000-00-00", None))
            .unwrap();
        let first = store.create_car(client, &CarForm::new("Lada", "Vesta", "X1")).unwrap();
        let second = store.create_car(client, &CarForm::new("Kia", "Rio", "X2")).unwrap();
        let part = store.create_part(&PartForm::new("Bulb", None, 10, 50.0)).unwrap();

        let form = OrderForm::new("Bulbs", 100.0, OrderStatus::New);
        store
            .save_order(&OrderDraft::new(first, &form), &[PartLine::new(part, "Bulb", 2, 50.0)])
            .unwrap();
        store
            .save_order(&OrderDraft::new(second, &form), &[PartLine::new(part, "Bulb", 3, 50.0)])
            .unwrap();

        store.delete_car(first).unwrap();
        assert_eq!(stock(&store, part), 7);
        assert!(store.get_car(second).is_ok());
    }

    #[test]
    fn test_delete_referenced_part_is_refused() {
        let mut store = Store::open_in_memory().unwrap();
        let client = store
            .create_client(&ClientForm::new("Ivanov", "+7 900 000-00-00", None))
            .unwrap();
        let car = store.create_car(client, &CarForm::new("Lada", "Vesta", "X1")).unwrap();
        let part = store.create_part(&PartForm::new("Bulb", None, 10, 50.0)).unwrap();
        let order = store
            .save_order(
                &OrderDraft::new(car, &OrderForm::new("Bulbs", 0.0, OrderStatus::New)),
                &[PartLine::new(part, "Bulb", 4, 50.0)],
            )
            .unwrap();

        let err = store.delete_part(part).unwrap_err();
        assert!(matches!(err, ShopError::InUse { entity: "part", .. }));
        assert_eq!(stock(&store, part), 6);
        assert_eq!(store.order_lines(order).unwrap().len(), 1);

        store.delete_order(order).unwrap();
        assert_eq!(stock(&store, part), 10);
        store.delete_part(part).unwrap();
    }

    #[test]
    fn test_delete_missing_order_changes_nothing() {
        let mut store = Store::open_in_memory().unwrap();
        assert!(matches!(
            store.delete_order(9),
            Err(ShopError::NotFound { entity: "order", id: 9 })
        ));
    }
}
