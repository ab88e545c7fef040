//! Database schema initialization

use super::{Store, SCHEMA_VERSION};
use crate::core::error::ShopResult;

impl Store {
    /// Create the five workshop tables
    pub(super) fn init_schema(&self) -> ShopResult<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS clients (
                id INTEGER PRIMARY KEY,
                full_name TEXT NOT NULL,
                phone TEXT NOT NULL,
                email TEXT UNIQUE
            );

            CREATE TABLE IF NOT EXISTS cars (
                id INTEGER PRIMARY KEY,
                client_id INTEGER NOT NULL,
                brand TEXT NOT NULL,
                model TEXT NOT NULL,
                vin TEXT NOT NULL UNIQUE,
                FOREIGN KEY (client_id) REFERENCES clients(id) ON DELETE CASCADE
            );
            CREATE INDEX IF NOT EXISTS idx_cars_client ON cars(client_id);

            CREATE TABLE IF NOT EXISTS orders (
                id INTEGER PRIMARY KEY,
                car_id INTEGER NOT NULL,
                description TEXT NOT NULL,
                labor_cost REAL NOT NULL DEFAULT 0 CHECK (labor_cost >= 0),
                status TEXT NOT NULL
                    CHECK (status IN ('new', 'in_progress', 'ready', 'delivered')),
                created_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%d %H:%M:%S', 'now')),
                FOREIGN KEY (car_id) REFERENCES cars(id) ON DELETE CASCADE
            );
            CREATE INDEX IF NOT EXISTS idx_orders_car ON orders(car_id);
            CREATE INDEX IF NOT EXISTS idx_orders_status ON orders(status);
            CREATE INDEX IF NOT EXISTS idx_orders_created ON orders(created_at);

            CREATE TABLE IF NOT EXISTS inventory (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                article TEXT UNIQUE,
                quantity INTEGER NOT NULL CHECK (quantity >= 0),
                price REAL NOT NULL CHECK (price >= 0)
            );

            -- Sale history: parts may not be deleted while a line references them
            CREATE TABLE IF NOT EXISTS order_parts (
                order_id INTEGER NOT NULL,
                part_id INTEGER NOT NULL,
                quantity INTEGER NOT NULL CHECK (quantity >= 1),
                price_at_sale REAL NOT NULL CHECK (price_at_sale >= 0),
                PRIMARY KEY (order_id, part_id),
                FOREIGN KEY (order_id) REFERENCES orders(id) ON DELETE CASCADE,
                FOREIGN KEY (part_id) REFERENCES inventory(id) ON DELETE RESTRICT
            );
            CREATE INDEX IF NOT EXISTS idx_order_parts_part ON order_parts(part_id);
            "#,
        )?;

        self.conn
            .pragma_update(None, "user_version", SCHEMA_VERSION)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_version_recorded() {
        let store = Store::open_in_memory().unwrap();
        let version: i32 = store
            .conn
            .query_row("PRAGMA user_version", [], |row| row.get(0))
            .unwrap();
        assert_eq!(version, SCHEMA_VERSION);
    }

    #[test]
    fn test_negative_stock_rejected_by_schema() {
        let store = Store::open_in_memory().unwrap();
        let result = store.conn.execute(
            "INSERT INTO inventory (name, quantity, price) VALUES ('Bolt', -1, 1.0)",
            [],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_init_schema_is_idempotent() {
        let store = Store::open_in_memory().unwrap();
        store.init_schema().unwrap();
        assert_eq!(store.table_counts().unwrap().len(), 5);
    }
}
