use std::sync::Arc;

use chrono::Utc;
use dashmap::DashMap;
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{info, warn};
use uuid::Uuid;

use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{
    NewOrderItem, Order, OrderItem, OrderItemRequest, OrderItemStatus, TableSession, TableStatus,
};
use shared::response::PageResponse;

use crate::cache::{CacheError, SessionCache};
use crate::events::ItemProducer;
use crate::store::{NewOrder, Store, StoreError};

use super::number::format_order_number;

/// An order together with (a slice of) its items
#[derive(Debug, Clone, Serialize)]
pub struct OrderWithItems {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
}

/// Order workflow
///
/// Enforces at-most-one order per table session: a per-session mutex
/// serializes the check-create-attach sequence in this process, and the
/// unique index on the order's session id backstops it across
/// processes. The create pipeline is strictly sequential: resolve day,
/// allocate order number, run the create transaction, attach the order
/// id to the cached session, fetch the committed items back, publish.
pub struct OrderWorkflow {
    store: Arc<dyn Store>,
    cache: Arc<dyn SessionCache>,
    producer: ItemProducer,
    session_locks: DashMap<Uuid, Arc<Mutex<()>>>,
}

impl OrderWorkflow {
    pub fn new(store: Arc<dyn Store>, cache: Arc<dyn SessionCache>, producer: ItemProducer) -> Self {
        Self {
            store,
            cache,
            producer,
            session_locks: DashMap::new(),
        }
    }

    fn session_lock(&self, session_id: &Uuid) -> Arc<Mutex<()>> {
        self.session_locks
            .entry(*session_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Submit an order for the caller's session
    /// (`ACTIVE(no order) → ACTIVE(order attached)`).
    ///
    /// Idempotent once attached: a session that already carries an
    /// order id turns the submission into an item append against the
    /// existing order.
    pub async fn submit(
        &self,
        session_id: &Uuid,
        items: &[OrderItemRequest],
    ) -> AppResult<OrderWithItems> {
        let lock = self.session_lock(session_id);
        let _guard = lock.lock().await;

        let session = self.live_session(session_id).await?;
        if let Some(order_id) = session.order_id {
            let rows = self.resolve_items(items).await?;
            return self.append_resolved(order_id, rows).await;
        }

        let rows = self.resolve_items(items).await?;

        let day = Utc::now().date_naive();
        let sequence = self.store.get_or_create_order_sequence(day).await?;
        let order_number = format_order_number(day, sequence);

        let new_order = NewOrder {
            table_id: session.table_id,
            order_number,
            session_id: *session_id,
        };

        let order_id = match self.store.create_order(&new_order, &rows).await {
            Ok(id) => id,
            Err(StoreError::Duplicate(_)) => {
                // Another writer won the unique-index race; fold this
                // submission into the order it created.
                let existing = self
                    .store
                    .get_order_by_session(session_id)
                    .await?
                    .ok_or_else(|| {
                        AppError::internal("duplicate order reported but no order row found")
                    })?;
                return self.append_resolved(existing.id, rows).await;
            }
            Err(e) => return Err(e.into()),
        };

        // Best-effort: the durable write is the record; a failed cache
        // update is logged and repaired on the next cache-miss read.
        if let Err(e) = self.cache.update_order_id(session_id, order_id).await {
            warn!(%session_id, order_id, error = %e,
                "Failed to attach order id to cached session");
        }

        // Publish exactly what was committed.
        let committed = self.store.get_order_items(order_id).await?;
        self.producer.publish_batch(&committed);

        let order = self.store.get_order(order_id).await?;
        info!(order_id, order_number = %order.order_number, %session_id, "Order created");

        Ok(OrderWithItems {
            order,
            items: committed,
        })
    }

    /// Append items to the session's existing order (intra-state).
    pub async fn add_items(
        &self,
        session_id: &Uuid,
        items: &[OrderItemRequest],
    ) -> AppResult<OrderWithItems> {
        let lock = self.session_lock(session_id);
        let _guard = lock.lock().await;

        let order_id = self.attached_order_id(session_id).await?;
        let rows = self.resolve_items(items).await?;
        self.append_resolved(order_id, rows).await
    }

    /// The session's current order with all of its items.
    pub async fn current_order(&self, session_id: &Uuid) -> AppResult<OrderWithItems> {
        let order_id = self.attached_order_id(session_id).await?;
        let order = self.store.get_order(order_id).await?;
        let items = self.store.get_order_items(order_id).await?;
        Ok(OrderWithItems { order, items })
    }

    /// One page of the session's order items, joined with the total
    /// count. Both reads run concurrently; either failure fails the
    /// whole operation and no partial result is returned.
    pub async fn list_items(
        &self,
        session_id: &Uuid,
        page: i64,
        page_size: i64,
    ) -> AppResult<PageResponse<OrderItem>> {
        let order_id = self.attached_order_id(session_id).await?;

        let limit = page_size.clamp(1, 100);
        let offset = (page.max(1) - 1) * limit;

        let (total, rows) = tokio::try_join!(
            async {
                self.store
                    .count_order_items(order_id)
                    .await
                    .map_err(AppError::from)
            },
            async {
                self.store
                    .get_order_items_page(order_id, limit, offset)
                    .await
                    .map_err(AppError::from)
            },
        )?;

        Ok(PageResponse::new(total, limit, rows))
    }

    /// Transition one item to a terminal status and recompute the
    /// table's state.
    ///
    /// The item must belong to the session's order. After every
    /// mutation the "all items terminal" predicate is re-evaluated;
    /// when it flips, the table moves to FoodServed. The recomputation
    /// is cheap and idempotent, so running it on every transition is
    /// fine.
    pub async fn update_item_status(
        &self,
        session_id: &Uuid,
        item_id: i64,
        status: OrderItemStatus,
    ) -> AppResult<OrderItem> {
        if !status.is_terminal() {
            return Err(AppError::validation("target status must be served or cancelled"));
        }

        let order_id = self.attached_order_id(session_id).await?;

        let item = self.store.get_order_item(item_id).await.map_err(|e| match e {
            StoreError::NotFound(_) => AppError::new(ErrorCode::OrderItemNotFound),
            other => other.into(),
        })?;
        if item.order_id != order_id {
            return Err(AppError::with_message(
                ErrorCode::OrderItemNotFound,
                format!("Item {} does not belong to order {}", item_id, order_id),
            ));
        }

        if item.status == status {
            return Ok(item);
        }
        if item.status.is_terminal() {
            return Err(AppError::business_rule(format!(
                "Item {} is already {}",
                item_id,
                item.status.as_code()
            )));
        }

        self.store.update_order_item_status(item_id, status).await?;

        if !self.store.has_unfinished_items(order_id).await? {
            let table_id = self.store.get_table_id_by_order(order_id).await?;
            self.store
                .update_table_status(table_id, TableStatus::FoodServed)
                .await?;
            info!(order_id, table_id, "All items terminal; table marked food-served");
        }

        self.store.get_order_item(item_id).await.map_err(Into::into)
    }

    // ==================== Internals ====================

    /// The caller's session as the cache sees it; a missing entry means
    /// the session is no longer valid for ordering.
    async fn live_session(&self, session_id: &Uuid) -> AppResult<TableSession> {
        self.cache
            .get_session(session_id)
            .await
            .map_err(|e| match e {
                CacheError::NotFound(_) | CacheError::Expired(_) => {
                    AppError::new(ErrorCode::SessionExpired)
                }
                other => other.into(),
            })
    }

    /// Order id attached to the session, with a durable fallback for
    /// the window where the cache update after create was lost.
    async fn attached_order_id(&self, session_id: &Uuid) -> AppResult<i64> {
        let session = self.live_session(session_id).await?;
        if let Some(order_id) = session.order_id {
            return Ok(order_id);
        }
        match self.store.get_order_by_session(session_id).await? {
            Some(order) => Ok(order.id),
            None => Err(AppError::new(ErrorCode::InvalidOrderId)),
        }
    }

    /// Resolve every requested product and snapshot its current name,
    /// price and image into a persistable row.
    async fn resolve_items(&self, items: &[OrderItemRequest]) -> AppResult<Vec<NewOrderItem>> {
        if items.is_empty() {
            return Err(AppError::new(ErrorCode::EmptyOrderItems));
        }

        let mut rows = Vec::with_capacity(items.len());
        for request in items {
            if request.quantity <= 0 {
                return Err(AppError::validation(format!(
                    "Quantity for product {} must be positive",
                    request.product_id
                )));
            }

            let product = self
                .store
                .get_product(request.product_id)
                .await
                .map_err(|e| match e {
                    StoreError::NotFound(_) => AppError::with_message(
                        ErrorCode::ProductNotFound,
                        format!("Product {} not found", request.product_id),
                    ),
                    other => other.into(),
                })?;
            if !product.is_available {
                return Err(AppError::with_message(
                    ErrorCode::ProductUnavailable,
                    format!("Product {} is not available", product.name_en),
                ));
            }

            rows.push(NewOrderItem {
                product_id: product.id,
                product_name: product.name,
                product_name_en: product.name_en,
                price: product.price,
                quantity: request.quantity,
                note: request.note.clone(),
                image: product.image,
            });
        }
        Ok(rows)
    }

    async fn append_resolved(
        &self,
        order_id: i64,
        rows: Vec<NewOrderItem>,
    ) -> AppResult<OrderWithItems> {
        let ids = self.store.create_order_items(order_id, &rows).await?;

        if self.store.has_unfinished_items(order_id).await? {
            let table_id = self.store.get_table_id_by_order(order_id).await?;
            self.store
                .update_table_status(table_id, TableStatus::WaitingToBeServed)
                .await?;
        }

        let created = self.store.get_order_items_by_ids(&ids).await?;
        self.producer.publish_batch(&created);

        let order = self.store.get_order(order_id).await?;
        info!(order_id, appended = created.len(), "Order items added");

        Ok(OrderWithItems {
            order,
            items: created,
        })
    }
}
