use std::collections::HashSet;

use actix_web::{web, HttpResponse};
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::{FromRow, SqlitePool};
use validator::Validate;

use crate::auth::Identity;
use crate::errors::ApiError;
use crate::inventory::availability;
use crate::models::hotel::{CreateHotel, Hotel, HotelDetails, RoomClass, RoomClassInput, RoomType};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HotelSearch {
    pub city: String,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RoomSearchResult {
    #[serde(flatten)]
    room: RoomClass,
    available_rooms: i64,
    is_available: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HotelSearchResult {
    #[serde(flatten)]
    hotel: Hotel,
    rooms: Vec<RoomSearchResult>,
    has_availability: bool,
}

/// City search with a date range: every hotel in the city is checked room
/// class by room class, and only hotels with at least one free room class
/// are returned. Advisory only; booking re-checks at commit time.
pub async fn search_hotels(
    pool: web::Data<SqlitePool>,
    params: web::Query<HotelSearch>,
) -> Result<HttpResponse, ApiError> {
    if params.check_in >= params.check_out {
        return Err(ApiError::InvalidInput(
            "Check-out must be after check-in".to_string(),
        ));
    }
    let check_in = params.check_in.and_time(NaiveTime::MIN);
    let check_out = params.check_out.and_time(NaiveTime::MIN);

    // LIKE is case-insensitive in SQLite.
    let hotels: Vec<Hotel> = sqlx::query_as("SELECT * FROM hotels WHERE city LIKE ?")
        .bind(format!("%{}%", params.city))
        .fetch_all(pool.get_ref())
        .await?;

    let mut results = Vec::new();
    for hotel in hotels {
        let rooms: Vec<RoomClass> = sqlx::query_as("SELECT * FROM hotel_rooms WHERE hotel_id = ?")
            .bind(hotel.id)
            .fetch_all(pool.get_ref())
            .await?;

        let mut annotated = Vec::with_capacity(rooms.len());
        for room in rooms {
            let booked = availability::overlapping_count(
                pool.get_ref(),
                hotel.id,
                room.room_type,
                check_in,
                check_out,
            )
            .await?;
            let available_rooms = (room.total_rooms - booked).max(0);
            annotated.push(RoomSearchResult {
                room,
                available_rooms,
                is_available: available_rooms > 0,
            });
        }

        if annotated.iter().any(|r| r.is_available) {
            results.push(HotelSearchResult {
                hotel,
                rooms: annotated,
                has_availability: true,
            });
        }
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "hotels": results,
        "count": results.len(),
    })))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityQuery {
    pub room_type: RoomType,
    pub date: NaiveDate,
}

#[derive(FromRow)]
struct RoomWithHotel {
    hotel_id: i64,
    hotel_name: String,
    hotel_city: String,
    price_per_night: f64,
    total_rooms: i64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HotelAvailability {
    hotel_name: String,
    hotel_city: String,
    room_type: RoomType,
    available_rooms: i64,
    total_rooms: i64,
    price_per_night: f64,
    available: bool,
}

/// Single-day availability for one room type across all hotels that carry
/// it. The day is the half-open range `[date, date + 1)`.
pub async fn check_availability(
    pool: web::Data<SqlitePool>,
    params: web::Query<AvailabilityQuery>,
) -> Result<HttpResponse, ApiError> {
    let check_in = params.date.and_time(NaiveTime::MIN);
    let check_out = (params.date + chrono::Duration::days(1)).and_time(NaiveTime::MIN);

    let rooms: Vec<RoomWithHotel> = sqlx::query_as(
        r#"
        SELECT r.hotel_id, h.name AS hotel_name, h.city AS hotel_city,
               r.price_per_night, r.total_rooms
        FROM hotel_rooms r
        JOIN hotels h ON h.id = r.hotel_id
        WHERE r.room_type = ?
        "#,
    )
    .bind(params.room_type)
    .fetch_all(pool.get_ref())
    .await?;

    let mut hotels = Vec::with_capacity(rooms.len());
    for room in rooms {
        let booked = availability::overlapping_count(
            pool.get_ref(),
            room.hotel_id,
            params.room_type,
            check_in,
            check_out,
        )
        .await?;
        let available_rooms = (room.total_rooms - booked).max(0);
        hotels.push(HotelAvailability {
            hotel_name: room.hotel_name,
            hotel_city: room.hotel_city,
            room_type: params.room_type,
            available_rooms,
            total_rooms: room.total_rooms,
            price_per_night: room.price_per_night,
            available: available_rooms > 0,
        });
    }

    let available_count = hotels.iter().filter(|h| h.available).count();

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "roomType": params.room_type,
        "date": params.date,
        "totalHotels": hotels.len(),
        "availableCount": available_count,
        "available": available_count > 0,
        "hotels": hotels,
    })))
}

pub async fn get_hotel_by_id(
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    let id = path.into_inner();
    let details = fetch_hotel_details(pool.get_ref(), id).await?;
    Ok(HttpResponse::Ok().json(details))
}

pub async fn create_hotel(
    pool: web::Data<SqlitePool>,
    identity: Identity,
    body: web::Json<CreateHotel>,
) -> Result<HttpResponse, ApiError> {
    identity.require_admin()?;
    body.validate()?;
    ensure_unique_room_types(&body.rooms)?;

    let mut tx = pool.begin().await?;

    let hotel: Hotel = sqlx::query_as(
        "INSERT INTO hotels (name, city, address, description, rating) VALUES (?, ?, ?, ?, ?) RETURNING *",
    )
    .bind(&body.name)
    .bind(&body.city)
    .bind(&body.address)
    .bind(&body.description)
    .bind(body.rating)
    .fetch_one(&mut *tx)
    .await?;

    let mut rooms = Vec::with_capacity(body.rooms.len());
    for input in &body.rooms {
        rooms.push(insert_room(&mut tx, hotel.id, input).await?);
    }

    tx.commit().await?;

    Ok(HttpResponse::Created().json(serde_json::json!({
        "message": "Hotel created",
        "hotel": HotelDetails { hotel, rooms },
    })))
}

/// Replaces the hotel's fields and its entire room-class list. Room classes
/// have no lifecycle of their own, so the list is swapped wholesale.
pub async fn update_hotel(
    pool: web::Data<SqlitePool>,
    identity: Identity,
    path: web::Path<i64>,
    body: web::Json<CreateHotel>,
) -> Result<HttpResponse, ApiError> {
    identity.require_admin()?;
    body.validate()?;
    ensure_unique_room_types(&body.rooms)?;

    let id = path.into_inner();
    let mut tx = pool.begin().await?;

    let hotel: Hotel = sqlx::query_as(
        "UPDATE hotels SET name = ?, city = ?, address = ?, description = ?, rating = ? WHERE id = ? RETURNING *",
    )
    .bind(&body.name)
    .bind(&body.city)
    .bind(&body.address)
    .bind(&body.description)
    .bind(body.rating)
    .bind(id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or(ApiError::NotFound("Hotel"))?;

    sqlx::query("DELETE FROM hotel_rooms WHERE hotel_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    let mut rooms = Vec::with_capacity(body.rooms.len());
    for input in &body.rooms {
        rooms.push(insert_room(&mut tx, id, input).await?);
    }

    tx.commit().await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Hotel updated",
        "hotel": HotelDetails { hotel, rooms },
    })))
}

pub async fn delete_hotel(
    pool: web::Data<SqlitePool>,
    identity: Identity,
    path: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
    identity.require_admin()?;
    let id = path.into_inner();

    let result = sqlx::query("DELETE FROM hotels WHERE id = ?")
        .bind(id)
        .execute(pool.get_ref())
        .await?;
    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound("Hotel"));
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Hotel deleted",
        "id": id,
    })))
}

pub async fn get_all_hotels(
    pool: web::Data<SqlitePool>,
    identity: Identity,
) -> Result<HttpResponse, ApiError> {
    identity.require_admin()?;

    let hotels: Vec<Hotel> = sqlx::query_as("SELECT * FROM hotels ORDER BY id")
        .fetch_all(pool.get_ref())
        .await?;

    let mut details = Vec::with_capacity(hotels.len());
    for hotel in hotels {
        let rooms: Vec<RoomClass> = sqlx::query_as("SELECT * FROM hotel_rooms WHERE hotel_id = ?")
            .bind(hotel.id)
            .fetch_all(pool.get_ref())
            .await?;
        details.push(HotelDetails { hotel, rooms });
    }

    Ok(HttpResponse::Ok().json(details))
}

pub async fn get_cities(pool: web::Data<SqlitePool>) -> Result<HttpResponse, ApiError> {
    let cities: Vec<String> = sqlx::query_scalar("SELECT DISTINCT city FROM hotels ORDER BY city")
        .fetch_all(pool.get_ref())
        .await?;
    Ok(HttpResponse::Ok().json(cities))
}

async fn fetch_hotel_details(pool: &SqlitePool, id: i64) -> Result<HotelDetails, ApiError> {
    let hotel: Hotel = sqlx::query_as("SELECT * FROM hotels WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(ApiError::NotFound("Hotel"))?;

    let rooms: Vec<RoomClass> = sqlx::query_as("SELECT * FROM hotel_rooms WHERE hotel_id = ?")
        .bind(id)
        .fetch_all(pool)
        .await?;

    Ok(HotelDetails { hotel, rooms })
}

async fn insert_room(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    hotel_id: i64,
    input: &RoomClassInput,
) -> Result<RoomClass, ApiError> {
    let room: RoomClass = sqlx::query_as(
        r#"
        INSERT INTO hotel_rooms (hotel_id, room_type, capacity, price_per_night, total_rooms, amenities)
        VALUES (?, ?, ?, ?, ?, ?)
        RETURNING *
        "#,
    )
    .bind(hotel_id)
    .bind(input.room_type)
    .bind(input.capacity)
    .bind(input.price_per_night)
    .bind(input.total_rooms)
    .bind(Json(input.amenities.clone()))
    .fetch_one(&mut **tx)
    .await?;
    Ok(room)
}

fn ensure_unique_room_types(rooms: &[RoomClassInput]) -> Result<(), ApiError> {
    let mut seen = HashSet::new();
    for room in rooms {
        if !seen.insert(room.room_type) {
            return Err(ApiError::InvalidInput(format!(
                "Duplicate room type {}",
                room.room_type
            )));
        }
    }
    Ok(())
}
