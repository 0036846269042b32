use chrono::NaiveDateTime;
use serde::Serialize;
use sqlx::{Executor, Sqlite, SqlitePool};

use crate::errors::ApiError;
use crate::models::hotel::{RoomClass, RoomType};

/// Occupancy of one room class over a date range. `available` is clamped to
/// zero for callers; the raw `booked` count is kept for diagnostics.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomAvailability {
    pub total_rooms: i64,
    pub booked: i64,
    pub available: i64,
}

pub async fn room_class<'e, E>(
    db: E,
    hotel_id: i64,
    room_type: RoomType,
) -> Result<Option<RoomClass>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as("SELECT * FROM hotel_rooms WHERE hotel_id = ? AND room_type = ?")
        .bind(hotel_id)
        .bind(room_type)
        .fetch_optional(db)
        .await
}

/// Counts non-cancelled reservations whose half-open `[check_in, check_out)`
/// range overlaps the requested one. Two ranges overlap iff
/// `a.check_in < b.check_out AND a.check_out > b.check_in`, so a stay ending
/// exactly when another begins does not conflict.
pub async fn overlapping_count<'e, E>(
    db: E,
    hotel_id: i64,
    room_type: RoomType,
    check_in: NaiveDateTime,
    check_out: NaiveDateTime,
) -> Result<i64, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_scalar(
        r#"
        SELECT COUNT(*) FROM bookings
        WHERE hotel_id = ?
          AND room_type = ?
          AND status <> 'cancelled'
          AND check_in < ?
          AND check_out > ?
        "#,
    )
    .bind(hotel_id)
    .bind(room_type)
    .bind(check_out)
    .bind(check_in)
    .fetch_one(db)
    .await
}

/// Derives how many rooms of `room_type` are free over
/// `[check_in, check_out)`. Read-only; always recomputed from live ledger
/// state, never from a cached counter.
pub async fn check(
    pool: &SqlitePool,
    hotel_id: i64,
    room_type: RoomType,
    check_in: NaiveDateTime,
    check_out: NaiveDateTime,
) -> Result<RoomAvailability, ApiError> {
    if check_in >= check_out {
        return Err(ApiError::InvalidInput(
            "Check-out must be after check-in".to_string(),
        ));
    }

    let room = room_class(pool, hotel_id, room_type)
        .await?
        .ok_or(ApiError::NotFound("Room type"))?;

    let booked = overlapping_count(pool, hotel_id, room_type, check_in, check_out).await?;

    if booked > room.total_rooms {
        // Ledger already holds more overlapping bookings than inventory,
        // e.g. from a historical race. Flagged, not auto-corrected.
        log::warn!(
            "hotel {} room type {} over capacity: {} booked, {} total",
            hotel_id,
            room_type,
            booked,
            room.total_rooms
        );
    }

    Ok(RoomAvailability {
        total_rooms: room.total_rooms,
        booked,
        available: (room.total_rooms - booked).max(0),
    })
}
