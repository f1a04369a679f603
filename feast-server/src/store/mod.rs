//! Relational store
//!
//! The workflow consumes the [`Store`] trait; [`SqliteStore`] is the
//! durable implementation. Everything the session and order workflows
//! persist goes through this seam, which keeps the store swappable and
//! lets tests inject failures.

#[cfg(test)]
pub mod mock;
mod sqlite;

pub use sqlite::SqliteStore;

use async_trait::async_trait;
use chrono::NaiveDate;
use shared::error::{AppError, ErrorCode};
use shared::models::{
    NewOrderItem, NewPayment, Order, OrderItem, OrderItemStatus, OrderStatus, Product, Table,
    TableSession, TableStatus,
};
use thiserror::Error;
use uuid::Uuid;

/// Store error types
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => StoreError::NotFound("row".to_string()),
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                StoreError::Duplicate(db.message().to_string())
            }
            _ => StoreError::Database(err.to_string()),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(msg) => AppError::with_message(ErrorCode::NotFound, msg),
            StoreError::Duplicate(msg) => AppError::conflict(msg),
            StoreError::Database(msg) => AppError::repository(msg),
            StoreError::Validation(msg) => AppError::validation(msg),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Order row ready for persistence
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub table_id: i64,
    pub order_number: String,
    pub session_id: Uuid,
}

/// Durable persistence operations consumed by the workflows
#[async_trait]
pub trait Store: Send + Sync {
    // ==================== Tables ====================

    async fn get_table(&self, table_id: i64) -> StoreResult<Table>;

    async fn is_table_available_or_reserved(&self, table_id: i64) -> StoreResult<bool>;

    async fn get_table_number(&self, table_id: i64) -> StoreResult<i32>;

    async fn update_table_status(&self, table_id: i64, status: TableStatus) -> StoreResult<()>;

    // ==================== Table sessions ====================

    /// Persist a session and flip its table to Occupied, atomically.
    async fn create_table_session(&self, session: &TableSession) -> StoreResult<()>;

    async fn get_table_session(&self, session_id: &Uuid) -> StoreResult<TableSession>;

    /// Mark the durable session row closed.
    async fn close_table_session(&self, session_id: &Uuid) -> StoreResult<()>;

    async fn record_session_extension(&self, session_id: &Uuid, minutes: i64) -> StoreResult<()>;

    /// Total minutes this session has already been extended by.
    async fn total_session_extension(&self, session_id: &Uuid) -> StoreResult<i64>;

    // ==================== Orders ====================

    /// Atomic create-order transaction: insert the order row, insert
    /// every item row with a freshly generated id and snapshotted
    /// product data, flip the table to Ordered. All-or-nothing.
    async fn create_order(&self, order: &NewOrder, items: &[NewOrderItem]) -> StoreResult<i64>;

    async fn get_order(&self, order_id: i64) -> StoreResult<Order>;

    async fn get_order_by_session(&self, session_id: &Uuid) -> StoreResult<Option<Order>>;

    async fn update_order_status(&self, order_id: i64, status: OrderStatus) -> StoreResult<()>;

    // ==================== Order items ====================

    /// Append items to an existing order; returns the new item ids.
    async fn create_order_items(
        &self,
        order_id: i64,
        items: &[NewOrderItem],
    ) -> StoreResult<Vec<i64>>;

    async fn get_order_item(&self, item_id: i64) -> StoreResult<OrderItem>;

    async fn get_order_items(&self, order_id: i64) -> StoreResult<Vec<OrderItem>>;

    async fn get_order_items_by_ids(&self, item_ids: &[i64]) -> StoreResult<Vec<OrderItem>>;

    async fn get_order_items_page(
        &self,
        order_id: i64,
        limit: i64,
        offset: i64,
    ) -> StoreResult<Vec<OrderItem>>;

    async fn count_order_items(&self, order_id: i64) -> StoreResult<i64>;

    async fn update_order_item_status(
        &self,
        item_id: i64,
        status: OrderItemStatus,
    ) -> StoreResult<()>;

    /// Whether any item of the order is still in a non-terminal status.
    async fn has_unfinished_items(&self, order_id: i64) -> StoreResult<bool>;

    async fn get_table_id_by_order(&self, order_id: i64) -> StoreResult<i64>;

    /// Allocate the next per-day order sequence value (atomic
    /// upsert-with-increment; first call of a day yields 1).
    async fn get_or_create_order_sequence(&self, day: NaiveDate) -> StoreResult<i32>;

    // ==================== Products ====================

    async fn get_product(&self, product_id: i64) -> StoreResult<Product>;

    async fn list_products(&self, limit: i64, offset: i64) -> StoreResult<Vec<Product>>;

    async fn count_products(&self) -> StoreResult<i64>;

    // ==================== Payments ====================

    async fn create_payment(&self, payment: &NewPayment) -> StoreResult<i64>;
}
