//! Test-only store wrapper with switchable failure points.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use shared::models::{
    NewOrderItem, NewPayment, Order, OrderItem, OrderItemStatus, OrderStatus, Product, Table,
    TableSession, TableStatus,
};

use super::{NewOrder, Store, StoreError, StoreResult};

/// Delegates every call to the inner store unless the matching failure
/// switch is on, in which case it returns a database error.
pub struct FlakyStore {
    inner: Arc<dyn Store>,
    create_table_session_fails: AtomicBool,
    close_table_session_fails: AtomicBool,
    count_order_items_fails: AtomicBool,
    get_order_items_page_fails: AtomicBool,
}

impl FlakyStore {
    pub fn new(inner: Arc<dyn Store>) -> Self {
        Self {
            inner,
            create_table_session_fails: AtomicBool::new(false),
            close_table_session_fails: AtomicBool::new(false),
            count_order_items_fails: AtomicBool::new(false),
            get_order_items_page_fails: AtomicBool::new(false),
        }
    }

    pub fn fail_create_table_session(&self) {
        self.create_table_session_fails.store(true, Ordering::SeqCst);
    }

    pub fn fail_close_table_session(&self) {
        self.close_table_session_fails.store(true, Ordering::SeqCst);
    }

    pub fn fail_count_order_items(&self) {
        self.count_order_items_fails.store(true, Ordering::SeqCst);
    }

    pub fn fail_get_order_items_page(&self) {
        self.get_order_items_page_fails.store(true, Ordering::SeqCst);
    }

    fn tripped(&self, flag: &AtomicBool, op: &str) -> StoreResult<()> {
        if flag.load(Ordering::SeqCst) {
            return Err(StoreError::Database(format!("injected failure: {op}")));
        }
        Ok(())
    }
}

#[async_trait]
impl Store for FlakyStore {
    async fn get_table(&self, table_id: i64) -> StoreResult<Table> {
        self.inner.get_table(table_id).await
    }

    async fn is_table_available_or_reserved(&self, table_id: i64) -> StoreResult<bool> {
        self.inner.is_table_available_or_reserved(table_id).await
    }

    async fn get_table_number(&self, table_id: i64) -> StoreResult<i32> {
        self.inner.get_table_number(table_id).await
    }

    async fn update_table_status(&self, table_id: i64, status: TableStatus) -> StoreResult<()> {
        self.inner.update_table_status(table_id, status).await
    }

    async fn create_table_session(&self, session: &TableSession) -> StoreResult<()> {
        self.tripped(&self.create_table_session_fails, "create_table_session")?;
        self.inner.create_table_session(session).await
    }

    async fn get_table_session(&self, session_id: &Uuid) -> StoreResult<TableSession> {
        self.inner.get_table_session(session_id).await
    }

    async fn close_table_session(&self, session_id: &Uuid) -> StoreResult<()> {
        self.tripped(&self.close_table_session_fails, "close_table_session")?;
        self.inner.close_table_session(session_id).await
    }

    async fn record_session_extension(&self, session_id: &Uuid, minutes: i64) -> StoreResult<()> {
        self.inner.record_session_extension(session_id, minutes).await
    }

    async fn total_session_extension(&self, session_id: &Uuid) -> StoreResult<i64> {
        self.inner.total_session_extension(session_id).await
    }

    async fn create_order(&self, order: &NewOrder, items: &[NewOrderItem]) -> StoreResult<i64> {
        self.inner.create_order(order, items).await
    }

    async fn get_order(&self, order_id: i64) -> StoreResult<Order> {
        self.inner.get_order(order_id).await
    }

    async fn get_order_by_session(&self, session_id: &Uuid) -> StoreResult<Option<Order>> {
        self.inner.get_order_by_session(session_id).await
    }

    async fn update_order_status(&self, order_id: i64, status: OrderStatus) -> StoreResult<()> {
        self.inner.update_order_status(order_id, status).await
    }

    async fn create_order_items(
        &self,
        order_id: i64,
        items: &[NewOrderItem],
    ) -> StoreResult<Vec<i64>> {
        self.inner.create_order_items(order_id, items).await
    }

    async fn get_order_item(&self, item_id: i64) -> StoreResult<OrderItem> {
        self.inner.get_order_item(item_id).await
    }

    async fn get_order_items(&self, order_id: i64) -> StoreResult<Vec<OrderItem>> {
        self.inner.get_order_items(order_id).await
    }

    async fn get_order_items_by_ids(&self, item_ids: &[i64]) -> StoreResult<Vec<OrderItem>> {
        self.inner.get_order_items_by_ids(item_ids).await
    }

    async fn get_order_items_page(
        &self,
        order_id: i64,
        limit: i64,
        offset: i64,
    ) -> StoreResult<Vec<OrderItem>> {
        self.tripped(&self.get_order_items_page_fails, "get_order_items_page")?;
        self.inner.get_order_items_page(order_id, limit, offset).await
    }

    async fn count_order_items(&self, order_id: i64) -> StoreResult<i64> {
        self.tripped(&self.count_order_items_fails, "count_order_items")?;
        self.inner.count_order_items(order_id).await
    }

    async fn update_order_item_status(
        &self,
        item_id: i64,
        status: OrderItemStatus,
    ) -> StoreResult<()> {
        self.inner.update_order_item_status(item_id, status).await
    }

    async fn has_unfinished_items(&self, order_id: i64) -> StoreResult<bool> {
        self.inner.has_unfinished_items(order_id).await
    }

    async fn get_table_id_by_order(&self, order_id: i64) -> StoreResult<i64> {
        self.inner.get_table_id_by_order(order_id).await
    }

    async fn get_or_create_order_sequence(&self, day: NaiveDate) -> StoreResult<i32> {
        self.inner.get_or_create_order_sequence(day).await
    }

    async fn get_product(&self, product_id: i64) -> StoreResult<Product> {
        self.inner.get_product(product_id).await
    }

    async fn list_products(&self, limit: i64, offset: i64) -> StoreResult<Vec<Product>> {
        self.inner.list_products(limit, offset).await
    }

    async fn count_products(&self) -> StoreResult<i64> {
        self.inner.count_products().await
    }

    async fn create_payment(&self, payment: &NewPayment) -> StoreResult<i64> {
        self.inner.create_payment(payment).await
    }
}
