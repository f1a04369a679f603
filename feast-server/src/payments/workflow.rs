use std::sync::Arc;

use chrono::Utc;
use rand::Rng;
use rand::distributions::Alphanumeric;
use rust_decimal::Decimal;
use tracing::info;
use uuid::Uuid;

use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{
    NewPayment, OrderItemStatus, OrderStatus, PAYMENT_METHODS, Payment, TableStatus,
};

use crate::sessions::SessionWorkflow;
use crate::store::{Store, StoreError};

/// Payment settlement
///
/// The terminal trigger of the table-session state machine: a
/// successful settlement completes the order, flips the table to
/// cleaning and closes the session.
pub struct PaymentWorkflow {
    store: Arc<dyn Store>,
    sessions: Arc<SessionWorkflow>,
}

impl PaymentWorkflow {
    pub fn new(store: Arc<dyn Store>, sessions: Arc<SessionWorkflow>) -> Self {
        Self { store, sessions }
    }

    /// Settle an order.
    ///
    /// Allowed only when no item is unfinished. The amount is the sum
    /// over *served* items (cancelled items are free), computed here
    /// and never taken from the client.
    pub async fn settle(
        &self,
        order_id: i64,
        method: &str,
        note: Option<String>,
    ) -> AppResult<Payment> {
        if order_id == 0 {
            return Err(AppError::new(ErrorCode::InvalidOrderId));
        }
        if !PAYMENT_METHODS.contains(&method) {
            return Err(AppError::with_message(
                ErrorCode::PaymentMethodUnsupported,
                format!("Payment method '{}' is not supported", method),
            ));
        }

        let order = self.store.get_order(order_id).await.map_err(|e| match e {
            StoreError::NotFound(_) => AppError::new(ErrorCode::OrderNotFound),
            other => other.into(),
        })?;
        if order.status.is_terminal() {
            return Err(AppError::new(ErrorCode::OrderAlreadyCompleted));
        }
        if self.store.has_unfinished_items(order_id).await? {
            return Err(AppError::new(ErrorCode::PaymentNotAllowed));
        }

        let items = self.store.get_order_items(order_id).await?;
        let amount: Decimal = items
            .iter()
            .filter(|item| item.status == OrderItemStatus::Served)
            .map(|item| item.price * Decimal::from(item.quantity))
            .sum();

        let new_payment = NewPayment {
            order_id,
            method: method.to_string(),
            note,
            amount,
            transaction_id: Uuid::new_v4().to_string(),
            ref_code: ref_code(),
        };
        let payment_id = self.store.create_payment(&new_payment).await?;

        self.store
            .update_order_status(order_id, OrderStatus::Completed)
            .await?;
        self.store
            .update_table_status(order.table_id, TableStatus::Cleaning)
            .await?;

        // The order reached a terminal status; the session goes with it.
        self.sessions.close(&order.session_id).await?;

        info!(
            order_id,
            payment_id,
            amount = %new_payment.amount,
            method = %new_payment.method,
            "Order settled"
        );

        Ok(Payment {
            id: payment_id,
            order_id,
            method: new_payment.method,
            note: new_payment.note,
            amount: new_payment.amount,
            transaction_id: new_payment.transaction_id,
            ref_code: new_payment.ref_code,
            created_at: Utc::now(),
        })
    }
}

/// Short human-readable payment reference.
fn ref_code() -> String {
    let code: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(8)
        .map(char::from)
        .collect();
    code.to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use shared::models::{OrderItemRequest, SessionStatus};
    use shared::util::IdGenerator;

    use crate::cache::{MemoryCache, SessionCache};
    use crate::events::{EventChannel, ItemProducer};
    use crate::orders::OrderWorkflow;
    use crate::sessions::SessionConfig;
    use crate::store::SqliteStore;

    struct Harness {
        store: Arc<SqliteStore>,
        cache: Arc<MemoryCache>,
        sessions: Arc<SessionWorkflow>,
        orders: OrderWorkflow,
        payments: PaymentWorkflow,
    }

    async fn harness() -> Harness {
        let ids = Arc::new(IdGenerator::new(8).unwrap());
        let store = Arc::new(SqliteStore::open_in_memory(ids).await.unwrap());

        sqlx::query("INSERT INTO categories (id, name, name_en) VALUES (1, 'ของหวาน', 'Desserts')")
            .execute(store.pool())
            .await
            .unwrap();
        for (id, price) in [(201_i64, "40.00"), (202, "55.00")] {
            sqlx::query(
                "INSERT INTO products (id, name, name_en, price, category_id, is_available) \
                 VALUES (?, 'ข้าวเหนียวมะม่วง', 'Mango Sticky Rice', ?, 1, 1)",
            )
            .bind(id)
            .bind(price)
            .execute(store.pool())
            .await
            .unwrap();
        }
        sqlx::query(
            "INSERT INTO tables (id, table_number, seats, status) VALUES (1, 3, 2, 'AVAILABLE')",
        )
        .execute(store.pool())
        .await
        .unwrap();

        let cache = Arc::new(MemoryCache::new());
        let sessions = Arc::new(SessionWorkflow::new(
            store.clone(),
            cache.clone(),
            SessionConfig {
                duration: Duration::from_secs(60 * 60),
                extension_cap_minutes: 60,
                frontend_base_url: "http://localhost:5173".into(),
            },
        ));
        let orders = OrderWorkflow::new(
            store.clone(),
            cache.clone(),
            ItemProducer::new(Arc::new(EventChannel::new(16))),
        );
        let payments = PaymentWorkflow::new(store.clone(), sessions.clone());

        Harness {
            store,
            cache,
            sessions,
            orders,
            payments,
        }
    }

    fn request(product_id: i64, quantity: i32) -> OrderItemRequest {
        OrderItemRequest {
            product_id,
            quantity,
            note: None,
        }
    }

    /// Open a session and create an order with two items; returns
    /// (session_id, order_id, item_ids).
    async fn order_with_items(h: &Harness) -> (Uuid, i64, Vec<i64>) {
        let session_id = h.sessions.open(1, 2).await.unwrap().session.session_id;
        let created = h
            .orders
            .submit(&session_id, &[request(201, 2), request(202, 1)])
            .await
            .unwrap();
        let ids = created.items.iter().map(|i| i.id).collect();
        (session_id, created.order.id, ids)
    }

    #[tokio::test]
    async fn settle_rejects_unfinished_orders() {
        let h = harness().await;
        let (_session, order_id, item_ids) = order_with_items(&h).await;

        let err = h.payments.settle(order_id, "CASH", None).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::PaymentNotAllowed);

        // One served, one still pending: still rejected.
        h.store
            .update_order_item_status(item_ids[0], OrderItemStatus::Served)
            .await
            .unwrap();
        let err = h.payments.settle(order_id, "CASH", None).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::PaymentNotAllowed);
    }

    #[tokio::test]
    async fn settle_charges_served_items_and_closes_the_session() {
        let h = harness().await;
        let (session_id, order_id, item_ids) = order_with_items(&h).await;

        // 2 × 40.00 served, 1 × 55.00 cancelled.
        h.store
            .update_order_item_status(item_ids[0], OrderItemStatus::Served)
            .await
            .unwrap();
        h.store
            .update_order_item_status(item_ids[1], OrderItemStatus::Cancelled)
            .await
            .unwrap();

        let payment = h
            .payments
            .settle(order_id, "CREDIT_CARD", Some("tip included".into()))
            .await
            .unwrap();
        assert_eq!(payment.amount.to_string(), "80.00");
        assert_eq!(payment.ref_code.len(), 8);
        assert!(Uuid::parse_str(&payment.transaction_id).is_ok());

        // Order completed, table cleaning.
        let order = h.store.get_order(order_id).await.unwrap();
        assert_eq!(order.status, OrderStatus::Completed);
        let table = h.store.get_table(1).await.unwrap();
        assert_eq!(table.status, TableStatus::Cleaning);

        // Session gone from cache, closed durably.
        assert!(h.cache.get_session(&session_id).await.is_err());
        let durable = h.store.get_table_session(&session_id).await.unwrap();
        assert_eq!(durable.status, SessionStatus::Closed);

        // Settling again is rejected.
        let err = h.payments.settle(order_id, "CASH", None).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::OrderAlreadyCompleted);
    }

    #[tokio::test]
    async fn settle_validates_inputs() {
        let h = harness().await;

        let err = h.payments.settle(0, "CASH", None).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidOrderId);

        let err = h.payments.settle(1, "BARTER", None).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::PaymentMethodUnsupported);

        let err = h.payments.settle(12345, "CASH", None).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::OrderNotFound);
    }

    #[test]
    fn ref_codes_are_short_and_uppercase() {
        let code = ref_code();
        assert_eq!(code.len(), 8);
        assert_eq!(code, code.to_uppercase());
    }
}
