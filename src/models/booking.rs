use std::fmt;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::models::hotel::RoomType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
}

impl BookingStatus {
    /// Status transitions are one-way out of `Cancelled`; pending and
    /// confirmed may be swapped by an operator. Same-state updates are
    /// accepted as no-ops.
    pub fn can_transition(self, to: BookingStatus) -> bool {
        use BookingStatus::*;
        match (self, to) {
            (from, to) if from == to => true,
            (Confirmed, Cancelled) => true,
            (Pending, Confirmed) | (Confirmed, Pending) => true,
            _ => false,
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Cancelled => "cancelled",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: i64,
    pub user_id: i64,
    pub hotel_id: i64,
    pub room_type: RoomType,
    pub check_in: chrono::NaiveDateTime,
    pub check_out: chrono::NaiveDateTime,
    pub guests: i64,
    pub total_price: f64,
    pub status: BookingStatus,
    pub created_at: chrono::NaiveDateTime,
}

/// Booking row joined with the snapshot of its hotel that listings display.
#[derive(Debug, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct BookingWithHotel {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub booking: Booking,
    pub hotel_name: String,
    pub hotel_city: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateBooking {
    pub hotel_id: i64,
    pub room_type: RoomType,
    pub check_in: chrono::NaiveDateTime,
    pub check_out: chrono::NaiveDateTime,
    #[validate(range(min = 1))]
    pub guests: i64,
}

#[derive(Debug, Deserialize)]
pub struct UpdateBookingStatus {
    pub status: BookingStatus,
}

#[cfg(test)]
mod tests {
    use super::BookingStatus::*;

    #[test]
    fn cancelled_is_terminal() {
        assert!(!Cancelled.can_transition(Confirmed));
        assert!(!Cancelled.can_transition(Pending));
        assert!(Cancelled.can_transition(Cancelled));
    }

    #[test]
    fn operator_can_swap_pending_and_confirmed() {
        assert!(Pending.can_transition(Confirmed));
        assert!(Confirmed.can_transition(Pending));
    }

    #[test]
    fn confirmed_can_be_cancelled() {
        assert!(Confirmed.can_transition(Cancelled));
        assert!(Confirmed.can_transition(Confirmed));
    }
}
