use actix_web::{web, HttpResponse};
use serde::Serialize;
use sqlx::{FromRow, SqlitePool};
use validator::Validate;

use crate::auth::Identity;
use crate::errors::ApiError;
use crate::inventory::booking;
use crate::models::booking::{BookingStatus, BookingWithHotel, CreateBooking, UpdateBookingStatus};

/// Books a room through the transaction coordinator. Operator accounts are
/// barred from booking for themselves.
pub async fn create_booking(
    pool: web::Data<SqlitePool>,
    identity: Identity,
    body: web::Json<CreateBooking>,
) -> Result<HttpResponse, ApiError> {
    body.validate()?;

    let (created, hotel) = booking::create_booking(pool.get_ref(), identity, &body).await?;

    Ok(HttpResponse::Created().json(serde_json::json!({
        "message": "Booking confirmed",
        "booking": created,
        "hotel": hotel,
    })))
}

/// Reservation history, newest first. Users may only see their own; admins
/// may see anyone's.
pub async fn get_user_bookings(
    pool: web::Data<SqlitePool>,
    identity: Identity,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let user_id = path.into_inner();
    if !identity.is_admin() && identity.user_id != user_id {
        return Err(ApiError::Forbidden("Not authorized to view these bookings"));
    }

    let bookings: Vec<BookingWithHotel> = sqlx::query_as(
        r#"
        SELECT b.*, COALESCE(h.name, '') AS hotel_name, COALESCE(h.city, '') AS hotel_city
        FROM bookings b
        LEFT JOIN hotels h ON h.id = b.hotel_id
        WHERE b.user_id = ?
        ORDER BY b.created_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool.get_ref())
    .await?;

    Ok(HttpResponse::Ok().json(bookings))
}

pub async fn get_all_bookings(
    pool: web::Data<SqlitePool>,
    identity: Identity,
) -> Result<HttpResponse, ApiError> {
    identity.require_admin()?;

    let bookings: Vec<BookingWithHotel> = sqlx::query_as(
        r#"
        SELECT b.*, COALESCE(h.name, '') AS hotel_name, COALESCE(h.city, '') AS hotel_city
        FROM bookings b
        LEFT JOIN hotels h ON h.id = b.hotel_id
        ORDER BY b.created_at DESC
        "#,
    )
    .fetch_all(pool.get_ref())
    .await?;

    Ok(HttpResponse::Ok().json(bookings))
}

#[derive(Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
struct AnalyticsOverview {
    total_bookings: i64,
    total_revenue: f64,
    avg_booking_value: f64,
}

#[derive(Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
struct HotelRevenue {
    hotel_name: String,
    city: String,
    bookings: i64,
    revenue: f64,
}

/// Confirmed-only revenue aggregates. Read-only scan of the ledger; does not
/// touch the booking path.
pub async fn get_analytics(
    pool: web::Data<SqlitePool>,
    identity: Identity,
) -> Result<HttpResponse, ApiError> {
    identity.require_admin()?;

    let overview: AnalyticsOverview = sqlx::query_as(
        r#"
        SELECT COUNT(*) AS total_bookings,
               CAST(COALESCE(SUM(total_price), 0) AS REAL) AS total_revenue,
               CAST(COALESCE(AVG(total_price), 0) AS REAL) AS avg_booking_value
        FROM bookings
        WHERE status = 'confirmed'
        "#,
    )
    .fetch_one(pool.get_ref())
    .await?;

    let by_hotel: Vec<HotelRevenue> = sqlx::query_as(
        r#"
        SELECT COALESCE(h.name, '') AS hotel_name,
               COALESCE(h.city, '') AS city,
               COUNT(*) AS bookings,
               CAST(SUM(b.total_price) AS REAL) AS revenue
        FROM bookings b
        LEFT JOIN hotels h ON h.id = b.hotel_id
        WHERE b.status = 'confirmed'
        GROUP BY b.hotel_id
        ORDER BY revenue DESC
        "#,
    )
    .fetch_all(pool.get_ref())
    .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "overview": overview,
        "byHotel": by_hotel,
    })))
}

pub async fn update_booking_status(
    pool: web::Data<SqlitePool>,
    identity: Identity,
    path: web::Path<i64>,
    body: web::Json<UpdateBookingStatus>,
) -> Result<HttpResponse, ApiError> {
    identity.require_admin()?;

    let updated = booking::set_status(pool.get_ref(), path.into_inner(), body.status).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Booking updated",
        "booking": updated,
    })))
}

/// Soft-cancels a booking; the row stays in the ledger and immediately stops
/// counting toward occupancy.
pub async fn cancel_booking(
    pool: web::Data<SqlitePool>,
    identity: Identity,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    identity.require_admin()?;

    let cancelled =
        booking::set_status(pool.get_ref(), path.into_inner(), BookingStatus::Cancelled).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Booking cancelled",
        "booking": cancelled,
    })))
}
