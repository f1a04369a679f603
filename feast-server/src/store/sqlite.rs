//! SQLite store
//!
//! Runtime-bound queries over a WAL-mode pool. Money columns are TEXT
//! decimal strings; status columns are TEXT codes; session ids are
//! TEXT UUIDs.

use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteRow, SqliteSynchronous,
};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use shared::models::{
    NewOrderItem, NewPayment, Order, OrderItem, OrderItemStatus, OrderStatus, Product,
    SessionStatus, Table, TableSession, TableStatus,
};
use shared::util::IdGenerator;

use super::{NewOrder, Store, StoreError, StoreResult};

/// SQLite-backed [`Store`]
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
    ids: Arc<IdGenerator>,
}

impl SqliteStore {
    /// Open (creating if missing) the database at `db_path` and run
    /// migrations.
    pub async fn new(db_path: &str, ids: Arc<IdGenerator>) -> StoreResult<Self> {
        let options = SqliteConnectOptions::from_str(&format!("sqlite:{db_path}"))
            .map_err(|e| StoreError::Validation(format!("Invalid database path: {e}")))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .pragma("foreign_keys", "ON");

        Self::connect(options, 5, ids).await
    }

    /// Open an in-memory database (single connection so every query
    /// sees the same data). Used by tests.
    pub async fn open_in_memory(ids: Arc<IdGenerator>) -> StoreResult<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| StoreError::Validation(e.to_string()))?
            .pragma("foreign_keys", "ON");

        Self::connect(options, 1, ids).await
    }

    async fn connect(
        options: SqliteConnectOptions,
        max_connections: u32,
        ids: Arc<IdGenerator>,
    ) -> StoreResult<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await
            .map_err(|e| StoreError::Database(format!("Failed to open database: {e}")))?;

        // busy_timeout: 写冲突时等待 5s 而非立即失败
        sqlx::query("PRAGMA busy_timeout = 5000;")
            .execute(&pool)
            .await
            .map_err(|e| StoreError::Database(format!("Failed to set busy_timeout: {e}")))?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| StoreError::Database(format!("Failed to apply migrations: {e}")))?;
        tracing::info!("Database migrations applied");

        Ok(Self { pool, ids })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

// ==================== Row mapping ====================

fn parse_decimal(raw: &str) -> StoreResult<Decimal> {
    Decimal::from_str(raw).map_err(|e| StoreError::Database(format!("Bad decimal '{raw}': {e}")))
}

fn parse_uuid(raw: &str) -> StoreResult<Uuid> {
    Uuid::parse_str(raw).map_err(|e| StoreError::Database(format!("Bad uuid '{raw}': {e}")))
}

fn map_table(row: &SqliteRow) -> StoreResult<Table> {
    let status: String = row.try_get("status")?;
    Ok(Table {
        id: row.try_get("id")?,
        table_number: row.try_get("table_number")?,
        seats: row.try_get("seats")?,
        status: TableStatus::from_code(&status)
            .ok_or_else(|| StoreError::Database(format!("Unknown table status '{status}'")))?,
    })
}

fn map_session(row: &SqliteRow) -> StoreResult<TableSession> {
    let session_id: String = row.try_get("session_id")?;
    let status: String = row.try_get("status")?;
    let started_at: DateTime<Utc> = row.try_get("started_at")?;
    Ok(TableSession {
        session_id: parse_uuid(&session_id)?,
        table_id: row.try_get("table_id")?,
        table_number: row.try_get("table_number")?,
        status: SessionStatus::from_code(&status)
            .ok_or_else(|| StoreError::Database(format!("Unknown session status '{status}'")))?,
        started_at,
        order_id: row.try_get("order_id")?,
    })
}

fn map_order(row: &SqliteRow) -> StoreResult<Order> {
    let session_id: String = row.try_get("session_id")?;
    let status: String = row.try_get("status")?;
    let created_at: DateTime<Utc> = row.try_get("created_at")?;
    Ok(Order {
        id: row.try_get("id")?,
        table_id: row.try_get("table_id")?,
        order_number: row.try_get("order_number")?,
        session_id: parse_uuid(&session_id)?,
        status: OrderStatus::from_code(&status)
            .ok_or_else(|| StoreError::Database(format!("Unknown order status '{status}'")))?,
        created_at,
    })
}

fn map_order_item(row: &SqliteRow) -> StoreResult<OrderItem> {
    let status: String = row.try_get("status")?;
    let price: String = row.try_get("price")?;
    let created_at: DateTime<Utc> = row.try_get("created_at")?;
    Ok(OrderItem {
        id: row.try_get("id")?,
        order_id: row.try_get("order_id")?,
        product_id: row.try_get("product_id")?,
        status: OrderItemStatus::from_code(&status)
            .ok_or_else(|| StoreError::Database(format!("Unknown item status '{status}'")))?,
        product_name: row.try_get("product_name")?,
        product_name_en: row.try_get("product_name_en")?,
        price: parse_decimal(&price)?,
        quantity: row.try_get("quantity")?,
        note: row.try_get("note")?,
        image: row.try_get("image")?,
        created_at,
    })
}

fn map_product(row: &SqliteRow) -> StoreResult<Product> {
    let price: String = row.try_get("price")?;
    Ok(Product {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        name_en: row.try_get("name_en")?,
        price: parse_decimal(&price)?,
        image: row.try_get("image")?,
        category_id: row.try_get("category_id")?,
        is_available: row.try_get("is_available")?,
    })
}

const ORDER_ITEM_COLUMNS: &str = "id, order_id, product_id, status, product_name, \
     product_name_en, price, quantity, note, image, created_at";

#[async_trait]
impl Store for SqliteStore {
    // ==================== Tables ====================

    async fn get_table(&self, table_id: i64) -> StoreResult<Table> {
        let row = sqlx::query("SELECT id, table_number, seats, status FROM tables WHERE id = ?")
            .bind(table_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("Table {table_id}")))?;
        map_table(&row)
    }

    async fn is_table_available_or_reserved(&self, table_id: i64) -> StoreResult<bool> {
        let table = self.get_table(table_id).await?;
        Ok(table.status.accepts_new_session())
    }

    async fn get_table_number(&self, table_id: i64) -> StoreResult<i32> {
        let row = sqlx::query("SELECT table_number FROM tables WHERE id = ?")
            .bind(table_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("Table {table_id}")))?;
        Ok(row.try_get("table_number")?)
    }

    async fn update_table_status(&self, table_id: i64, status: TableStatus) -> StoreResult<()> {
        let result = sqlx::query("UPDATE tables SET status = ? WHERE id = ?")
            .bind(status.as_code())
            .bind(table_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("Table {table_id}")));
        }
        Ok(())
    }

    // ==================== Table sessions ====================

    async fn create_table_session(&self, session: &TableSession) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO table_sessions \
                 (session_id, table_id, table_number, status, started_at, order_id) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(session.session_id.to_string())
        .bind(session.table_id)
        .bind(session.table_number)
        .bind(session.status.as_code())
        .bind(session.started_at)
        .bind(session.order_id)
        .execute(&mut *tx)
        .await?;

        sqlx::query("UPDATE tables SET status = ? WHERE id = ?")
            .bind(TableStatus::Occupied.as_code())
            .bind(session.table_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn get_table_session(&self, session_id: &Uuid) -> StoreResult<TableSession> {
        let row = sqlx::query(
            "SELECT session_id, table_id, table_number, status, started_at, order_id \
             FROM table_sessions WHERE session_id = ?",
        )
        .bind(session_id.to_string())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::NotFound(format!("Session {session_id}")))?;
        map_session(&row)
    }

    async fn close_table_session(&self, session_id: &Uuid) -> StoreResult<()> {
        let result = sqlx::query("UPDATE table_sessions SET status = ? WHERE session_id = ?")
            .bind(SessionStatus::Closed.as_code())
            .bind(session_id.to_string())
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("Session {session_id}")));
        }
        Ok(())
    }

    async fn record_session_extension(&self, session_id: &Uuid, minutes: i64) -> StoreResult<()> {
        let result = sqlx::query(
            "UPDATE table_sessions SET extended_minutes = extended_minutes + ? \
             WHERE session_id = ?",
        )
        .bind(minutes)
        .bind(session_id.to_string())
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("Session {session_id}")));
        }
        Ok(())
    }

    async fn total_session_extension(&self, session_id: &Uuid) -> StoreResult<i64> {
        let row = sqlx::query("SELECT extended_minutes FROM table_sessions WHERE session_id = ?")
            .bind(session_id.to_string())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("Session {session_id}")))?;
        Ok(row.try_get("extended_minutes")?)
    }

    // ==================== Orders ====================

    async fn create_order(&self, order: &NewOrder, items: &[NewOrderItem]) -> StoreResult<i64> {
        let mut tx = self.pool.begin().await?;
        let order_id = self.ids.generate();
        let now = Utc::now();

        sqlx::query(
            "INSERT INTO orders (id, table_id, order_number, session_id, status, created_at) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(order_id)
        .bind(order.table_id)
        .bind(&order.order_number)
        .bind(order.session_id.to_string())
        .bind(OrderStatus::Open.as_code())
        .bind(now)
        .execute(&mut *tx)
        .await?;

        for item in items {
            sqlx::query(
                "INSERT INTO order_items \
                     (id, order_id, product_id, status, product_name, product_name_en, \
                      price, quantity, note, image, created_at) \
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(self.ids.generate())
            .bind(order_id)
            .bind(item.product_id)
            .bind(OrderItemStatus::Pending.as_code())
            .bind(&item.product_name)
            .bind(&item.product_name_en)
            .bind(item.price.to_string())
            .bind(item.quantity)
            .bind(&item.note)
            .bind(&item.image)
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }

        sqlx::query("UPDATE tables SET status = ? WHERE id = ?")
            .bind(TableStatus::Ordered.as_code())
            .bind(order.table_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(order_id)
    }

    async fn get_order(&self, order_id: i64) -> StoreResult<Order> {
        let row = sqlx::query(
            "SELECT id, table_id, order_number, session_id, status, created_at \
             FROM orders WHERE id = ?",
        )
        .bind(order_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::NotFound(format!("Order {order_id}")))?;
        map_order(&row)
    }

    async fn get_order_by_session(&self, session_id: &Uuid) -> StoreResult<Option<Order>> {
        let row = sqlx::query(
            "SELECT id, table_id, order_number, session_id, status, created_at \
             FROM orders WHERE session_id = ?",
        )
        .bind(session_id.to_string())
        .fetch_optional(&self.pool)
        .await?;
        row.map(|r| map_order(&r)).transpose()
    }

    async fn update_order_status(&self, order_id: i64, status: OrderStatus) -> StoreResult<()> {
        let result = sqlx::query("UPDATE orders SET status = ? WHERE id = ?")
            .bind(status.as_code())
            .bind(order_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("Order {order_id}")));
        }
        Ok(())
    }

    // ==================== Order items ====================

    async fn create_order_items(
        &self,
        order_id: i64,
        items: &[NewOrderItem],
    ) -> StoreResult<Vec<i64>> {
        let mut tx = self.pool.begin().await?;
        let now = Utc::now();
        let mut ids = Vec::with_capacity(items.len());

        for item in items {
            let item_id = self.ids.generate();
            sqlx::query(
                "INSERT INTO order_items \
                     (id, order_id, product_id, status, product_name, product_name_en, \
                      price, quantity, note, image, created_at) \
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(item_id)
            .bind(order_id)
            .bind(item.product_id)
            .bind(OrderItemStatus::Pending.as_code())
            .bind(&item.product_name)
            .bind(&item.product_name_en)
            .bind(item.price.to_string())
            .bind(item.quantity)
            .bind(&item.note)
            .bind(&item.image)
            .bind(now)
            .execute(&mut *tx)
            .await?;
            ids.push(item_id);
        }

        tx.commit().await?;
        Ok(ids)
    }

    async fn get_order_item(&self, item_id: i64) -> StoreResult<OrderItem> {
        let row = sqlx::query(&format!(
            "SELECT {ORDER_ITEM_COLUMNS} FROM order_items WHERE id = ?"
        ))
        .bind(item_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::NotFound(format!("Order item {item_id}")))?;
        map_order_item(&row)
    }

    async fn get_order_items(&self, order_id: i64) -> StoreResult<Vec<OrderItem>> {
        let rows = sqlx::query(&format!(
            "SELECT {ORDER_ITEM_COLUMNS} FROM order_items WHERE order_id = ? ORDER BY id"
        ))
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(map_order_item).collect()
    }

    async fn get_order_items_by_ids(&self, item_ids: &[i64]) -> StoreResult<Vec<OrderItem>> {
        if item_ids.is_empty() {
            return Ok(Vec::new());
        }
        let placeholders = vec!["?"; item_ids.len()].join(", ");
        let sql = format!(
            "SELECT {ORDER_ITEM_COLUMNS} FROM order_items WHERE id IN ({placeholders}) ORDER BY id"
        );
        let mut query = sqlx::query(&sql);
        for id in item_ids {
            query = query.bind(*id);
        }
        let rows = query.fetch_all(&self.pool).await?;
        rows.iter().map(map_order_item).collect()
    }

    async fn get_order_items_page(
        &self,
        order_id: i64,
        limit: i64,
        offset: i64,
    ) -> StoreResult<Vec<OrderItem>> {
        let rows = sqlx::query(&format!(
            "SELECT {ORDER_ITEM_COLUMNS} FROM order_items \
             WHERE order_id = ? ORDER BY id LIMIT ? OFFSET ?"
        ))
        .bind(order_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(map_order_item).collect()
    }

    async fn count_order_items(&self, order_id: i64) -> StoreResult<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS cnt FROM order_items WHERE order_id = ?")
            .bind(order_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.try_get("cnt")?)
    }

    async fn update_order_item_status(
        &self,
        item_id: i64,
        status: OrderItemStatus,
    ) -> StoreResult<()> {
        let result = sqlx::query("UPDATE order_items SET status = ? WHERE id = ?")
            .bind(status.as_code())
            .bind(item_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("Order item {item_id}")));
        }
        Ok(())
    }

    async fn has_unfinished_items(&self, order_id: i64) -> StoreResult<bool> {
        let row = sqlx::query(
            "SELECT EXISTS(\
                 SELECT 1 FROM order_items \
                 WHERE order_id = ? AND status NOT IN ('SERVED', 'CANCELLED')\
             ) AS unfinished",
        )
        .bind(order_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.try_get("unfinished")?)
    }

    async fn get_table_id_by_order(&self, order_id: i64) -> StoreResult<i64> {
        let row = sqlx::query("SELECT table_id FROM orders WHERE id = ?")
            .bind(order_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("Order {order_id}")))?;
        Ok(row.try_get("table_id")?)
    }

    async fn get_or_create_order_sequence(&self, day: NaiveDate) -> StoreResult<i32> {
        let row = sqlx::query(
            "INSERT INTO order_sequences (day, value) VALUES (?, 1) \
             ON CONFLICT (day) DO UPDATE SET value = value + 1 \
             RETURNING value",
        )
        .bind(day.format("%Y-%m-%d").to_string())
        .fetch_one(&self.pool)
        .await?;
        Ok(row.try_get("value")?)
    }

    // ==================== Products ====================

    async fn get_product(&self, product_id: i64) -> StoreResult<Product> {
        let row = sqlx::query(
            "SELECT id, name, name_en, price, image, category_id, is_available \
             FROM products WHERE id = ?",
        )
        .bind(product_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::NotFound(format!("Product {product_id}")))?;
        map_product(&row)
    }

    async fn list_products(&self, limit: i64, offset: i64) -> StoreResult<Vec<Product>> {
        let rows = sqlx::query(
            "SELECT id, name, name_en, price, image, category_id, is_available \
             FROM products ORDER BY id LIMIT ? OFFSET ?",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(map_product).collect()
    }

    async fn count_products(&self) -> StoreResult<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS cnt FROM products")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.try_get("cnt")?)
    }

    // ==================== Payments ====================

    async fn create_payment(&self, payment: &NewPayment) -> StoreResult<i64> {
        let payment_id = self.ids.generate();
        sqlx::query(
            "INSERT INTO payments \
                 (id, order_id, method, note, amount, transaction_id, ref_code, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(payment_id)
        .bind(payment.order_id)
        .bind(&payment.method)
        .bind(&payment.note)
        .bind(payment.amount.to_string())
        .bind(&payment.transaction_id)
        .bind(&payment.ref_code)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;
        Ok(payment_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    async fn open_store() -> SqliteStore {
        let ids = Arc::new(IdGenerator::new(9).unwrap());
        SqliteStore::open_in_memory(ids).await.unwrap()
    }

    /// Seed a category, two products and one available table.
    async fn seed(store: &SqliteStore) {
        sqlx::query("INSERT INTO categories (id, name, name_en) VALUES (1, 'อาหารจานหลัก', 'Mains')")
            .execute(store.pool())
            .await
            .unwrap();
        for (id, name, name_en, price) in [
            (101_i64, "ข้าวผัดกะเพรา", "Basil Fried Rice", "85.00"),
            (102_i64, "ต้มยำกุ้ง", "Tom Yum Goong", "150.00"),
        ] {
            sqlx::query(
                "INSERT INTO products (id, name, name_en, price, category_id, is_available) \
                 VALUES (?, ?, ?, ?, 1, 1)",
            )
            .bind(id)
            .bind(name)
            .bind(name_en)
            .bind(price)
            .execute(store.pool())
            .await
            .unwrap();
        }
        sqlx::query("INSERT INTO tables (id, table_number, seats, status) VALUES (5, 12, 4, 'AVAILABLE')")
            .execute(store.pool())
            .await
            .unwrap();
    }

    fn item(product_id: i64, price: &str, quantity: i32) -> NewOrderItem {
        NewOrderItem {
            product_id,
            product_name: "p".into(),
            product_name_en: "p".into(),
            price: Decimal::from_str(price).unwrap(),
            quantity,
            note: None,
            image: None,
        }
    }

    fn new_order(session_id: Uuid) -> NewOrder {
        NewOrder {
            table_id: 5,
            order_number: "FS-20250520-0001".into(),
            session_id,
        }
    }

    #[tokio::test]
    async fn file_backed_store_opens_and_migrates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("feast.db");
        let ids = Arc::new(IdGenerator::new(2).unwrap());
        let store = SqliteStore::new(path.to_str().unwrap(), ids).await.unwrap();
        assert_eq!(store.count_products().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn create_order_persists_order_items_and_flips_table() {
        let store = open_store().await;
        seed(&store).await;

        let session_id = Uuid::new_v4();
        let order_id = store
            .create_order(
                &new_order(session_id),
                &[item(101, "85.00", 2), item(102, "150.00", 1)],
            )
            .await
            .unwrap();

        let order = store.get_order(order_id).await.unwrap();
        assert_eq!(order.session_id, session_id);
        assert_eq!(order.status, OrderStatus::Open);

        let items = store.get_order_items(order_id).await.unwrap();
        assert_eq!(items.len(), 2);
        assert!(items.windows(2).all(|w| w[0].id < w[1].id));
        assert_eq!(items[0].price, Decimal::from_str("85.00").unwrap());

        let table = store.get_table(5).await.unwrap();
        assert_eq!(table.status, TableStatus::Ordered);
    }

    #[tokio::test]
    async fn create_order_is_atomic_on_item_failure() {
        let store = open_store().await;
        seed(&store).await;

        let session_id = Uuid::new_v4();
        // Second item references a product that does not exist; the FK
        // violation must roll back the order row inserted before it.
        let result = store
            .create_order(
                &new_order(session_id),
                &[item(101, "85.00", 1), item(999, "1.00", 1)],
            )
            .await;
        assert!(result.is_err());

        let order = store.get_order_by_session(&session_id).await.unwrap();
        assert!(order.is_none(), "order row survived a failed transaction");

        let row = sqlx::query("SELECT COUNT(*) AS cnt FROM order_items")
            .fetch_one(store.pool())
            .await
            .unwrap();
        let count: i64 = row.try_get("cnt").unwrap();
        assert_eq!(count, 0, "item rows survived a failed transaction");

        // Table status untouched.
        let table = store.get_table(5).await.unwrap();
        assert_eq!(table.status, TableStatus::Available);
    }

    #[tokio::test]
    async fn duplicate_session_order_is_rejected() {
        let store = open_store().await;
        seed(&store).await;

        let session_id = Uuid::new_v4();
        store
            .create_order(&new_order(session_id), &[item(101, "85.00", 1)])
            .await
            .unwrap();

        let result = store
            .create_order(&new_order(session_id), &[item(102, "150.00", 1)])
            .await;
        assert!(matches!(result, Err(StoreError::Duplicate(_))));
    }

    #[tokio::test]
    async fn order_sequence_increments_per_day() {
        let store = open_store().await;
        let day = NaiveDate::from_ymd_opt(2025, 5, 20).unwrap();
        assert_eq!(store.get_or_create_order_sequence(day).await.unwrap(), 1);
        assert_eq!(store.get_or_create_order_sequence(day).await.unwrap(), 2);

        let other = NaiveDate::from_ymd_opt(2025, 5, 21).unwrap();
        assert_eq!(store.get_or_create_order_sequence(other).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn session_rows_round_trip_and_close() {
        let store = open_store().await;
        seed(&store).await;

        let session = TableSession {
            session_id: Uuid::new_v4(),
            table_id: 5,
            table_number: 12,
            status: SessionStatus::Active,
            started_at: Utc::now(),
            order_id: None,
        };
        store.create_table_session(&session).await.unwrap();

        let table = store.get_table(5).await.unwrap();
        assert_eq!(table.status, TableStatus::Occupied);

        let loaded = store.get_table_session(&session.session_id).await.unwrap();
        assert_eq!(loaded.table_id, 5);
        assert_eq!(loaded.status, SessionStatus::Active);

        store.close_table_session(&session.session_id).await.unwrap();
        let closed = store.get_table_session(&session.session_id).await.unwrap();
        assert_eq!(closed.status, SessionStatus::Closed);
    }

    #[tokio::test]
    async fn unfinished_items_tracks_terminal_statuses() {
        let store = open_store().await;
        seed(&store).await;

        let session_id = Uuid::new_v4();
        let order_id = store
            .create_order(
                &new_order(session_id),
                &[item(101, "85.00", 1), item(102, "150.00", 1)],
            )
            .await
            .unwrap();
        assert!(store.has_unfinished_items(order_id).await.unwrap());

        let items = store.get_order_items(order_id).await.unwrap();
        store
            .update_order_item_status(items[0].id, OrderItemStatus::Served)
            .await
            .unwrap();
        assert!(store.has_unfinished_items(order_id).await.unwrap());

        store
            .update_order_item_status(items[1].id, OrderItemStatus::Cancelled)
            .await
            .unwrap();
        assert!(!store.has_unfinished_items(order_id).await.unwrap());
    }
}
