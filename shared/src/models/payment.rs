//! Payment Model

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Supported payment method codes
pub const PAYMENT_METHODS: &[&str] = &["CASH", "CREDIT_CARD", "PROMPT_PAY"];

/// Payment entity
///
/// Created only when every order item is terminal; `amount` is computed
/// server-side from served items, never taken from the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    pub id: i64,
    pub order_id: i64,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub amount: Decimal,
    pub transaction_id: String,
    pub ref_code: String,
    pub created_at: DateTime<Utc>,
}

/// Payment row ready for persistence
#[derive(Debug, Clone)]
pub struct NewPayment {
    pub order_id: i64,
    pub method: String,
    pub note: Option<String>,
    pub amount: Decimal,
    pub transaction_id: String,
    pub ref_code: String,
}
