use chrono::NaiveDateTime;
use sqlx::SqlitePool;

use crate::auth::Identity;
use crate::errors::ApiError;
use crate::inventory::availability;
use crate::models::booking::{Booking, BookingStatus, CreateBooking};
use crate::models::hotel::Hotel;

const SECS_PER_DAY: i64 = 24 * 60 * 60;

/// Nights charged for a stay: the span rounded up to whole days, so a
/// 2.5-day stay is billed as 3 nights.
pub fn nights(check_in: NaiveDateTime, check_out: NaiveDateTime) -> i64 {
    let secs = (check_out - check_in).num_seconds();
    (secs + SECS_PER_DAY - 1) / SECS_PER_DAY
}

pub fn total_price(price_per_night: f64, check_in: NaiveDateTime, check_out: NaiveDateTime) -> f64 {
    price_per_night * nights(check_in, check_out) as f64
}

/// Creates a confirmed reservation if the room class still has capacity over
/// the requested range.
///
/// The pre-check rejects obviously full ranges, but the commit itself does
/// not trust it: the insert re-counts overlapping bookings in the same
/// statement and writes nothing when the count has reached `total_rooms`.
/// Two concurrent calls for the same hotel, room type and overlapping range
/// therefore cannot both commit past capacity. Everything runs in one
/// transaction, so a failure at any step leaves no partial state.
pub async fn create_booking(
    pool: &SqlitePool,
    identity: Identity,
    req: &CreateBooking,
) -> Result<(Booking, Hotel), ApiError> {
    let mut tx = pool.begin().await?;

    let hotel: Hotel = sqlx::query_as("SELECT * FROM hotels WHERE id = ?")
        .bind(req.hotel_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(ApiError::NotFound("Hotel"))?;

    let room = availability::room_class(&mut *tx, req.hotel_id, req.room_type)
        .await?
        .ok_or(ApiError::NotFound("Room type"))?;

    if identity.is_admin() {
        return Err(ApiError::Forbidden("Admins cannot create bookings"));
    }

    if req.check_in >= req.check_out {
        return Err(ApiError::InvalidInput(
            "Check-out must be after check-in".to_string(),
        ));
    }

    if req.guests < 1 {
        return Err(ApiError::InvalidInput(
            "At least one guest is required".to_string(),
        ));
    }

    let booked = availability::overlapping_count(
        &mut *tx,
        req.hotel_id,
        req.room_type,
        req.check_in,
        req.check_out,
    )
    .await?;
    if room.total_rooms - booked <= 0 {
        return Err(ApiError::CapacityExceeded);
    }

    let total_price = total_price(room.price_per_night, req.check_in, req.check_out);

    let inserted: Option<(i64, NaiveDateTime)> = sqlx::query_as(
        r#"
        INSERT INTO bookings
            (user_id, hotel_id, room_type, check_in, check_out, guests, total_price, status)
        SELECT ?1, ?2, ?3, ?4, ?5, ?6, ?7, 'confirmed'
        WHERE (
            SELECT COUNT(*) FROM bookings
            WHERE hotel_id = ?2
              AND room_type = ?3
              AND status <> 'cancelled'
              AND check_in < ?5
              AND check_out > ?4
        ) < ?8
        RETURNING id, created_at
        "#,
    )
    .bind(identity.user_id)
    .bind(req.hotel_id)
    .bind(req.room_type)
    .bind(req.check_in)
    .bind(req.check_out)
    .bind(req.guests)
    .bind(total_price)
    .bind(room.total_rooms)
    .fetch_optional(&mut *tx)
    .await?;

    let (id, created_at) = inserted.ok_or(ApiError::CapacityExceeded)?;

    tx.commit().await?;

    Ok((
        Booking {
            id,
            user_id: identity.user_id,
            hotel_id: req.hotel_id,
            room_type: req.room_type,
            check_in: req.check_in,
            check_out: req.check_out,
            guests: req.guests,
            total_price,
            status: BookingStatus::Confirmed,
            created_at,
        },
        hotel,
    ))
}

/// Transitions a reservation's status. Cancellation is soft: the row stays
/// in the ledger and simply stops counting toward occupancy, so no separate
/// inventory-release step exists.
pub async fn set_status(
    pool: &SqlitePool,
    booking_id: i64,
    status: BookingStatus,
) -> Result<Booking, ApiError> {
    let mut tx = pool.begin().await?;

    let booking: Booking = sqlx::query_as("SELECT * FROM bookings WHERE id = ?")
        .bind(booking_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(ApiError::NotFound("Booking"))?;

    if !booking.status.can_transition(status) {
        return Err(ApiError::InvalidInput(format!(
            "Cannot change a {} booking to {}",
            booking.status, status
        )));
    }

    sqlx::query("UPDATE bookings SET status = ? WHERE id = ?")
        .bind(status)
        .bind(booking_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    Ok(Booking { status, ..booking })
}
