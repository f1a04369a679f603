//! Dining Table Model

use serde::{Deserialize, Serialize};

/// Table lifecycle status
///
/// Mutated only by the session/order workflow in response to
/// session/order/order-item events, never directly by a client.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TableStatus {
    Available,
    Reserved,
    Occupied,
    Ordered,
    WaitingToBeServed,
    FoodServed,
    WaitingForPayment,
    Cleaning,
}

impl TableStatus {
    /// Storage / wire code
    pub fn as_code(&self) -> &'static str {
        match self {
            Self::Available => "AVAILABLE",
            Self::Reserved => "RESERVED",
            Self::Occupied => "OCCUPIED",
            Self::Ordered => "ORDERED",
            Self::WaitingToBeServed => "WAITING_TO_BE_SERVED",
            Self::FoodServed => "FOOD_SERVED",
            Self::WaitingForPayment => "WAITING_FOR_PAYMENT",
            Self::Cleaning => "CLEANING",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        let status = match code {
            "AVAILABLE" => Self::Available,
            "RESERVED" => Self::Reserved,
            "OCCUPIED" => Self::Occupied,
            "ORDERED" => Self::Ordered,
            "WAITING_TO_BE_SERVED" => Self::WaitingToBeServed,
            "FOOD_SERVED" => Self::FoodServed,
            "WAITING_FOR_PAYMENT" => Self::WaitingForPayment,
            "CLEANING" => Self::Cleaning,
            _ => return None,
        };
        Some(status)
    }

    /// A session may only be opened on a table in one of these states.
    pub fn accepts_new_session(&self) -> bool {
        matches!(self, Self::Available | Self::Reserved)
    }
}

/// Dining table entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Table {
    pub id: i64,
    /// Human-facing table number printed on the physical table
    pub table_number: i32,
    pub seats: i32,
    pub status: TableStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_round_trip() {
        for status in [
            TableStatus::Available,
            TableStatus::Reserved,
            TableStatus::Occupied,
            TableStatus::Ordered,
            TableStatus::WaitingToBeServed,
            TableStatus::FoodServed,
            TableStatus::WaitingForPayment,
            TableStatus::Cleaning,
        ] {
            assert_eq!(TableStatus::from_code(status.as_code()), Some(status));
        }
        assert_eq!(TableStatus::from_code("BOGUS"), None);
    }

    #[test]
    fn only_available_and_reserved_accept_sessions() {
        assert!(TableStatus::Available.accepts_new_session());
        assert!(TableStatus::Reserved.accepts_new_session());
        assert!(!TableStatus::Occupied.accepts_new_session());
        assert!(!TableStatus::Cleaning.accepts_new_session());
    }
}
