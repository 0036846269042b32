#![allow(dead_code)]

use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::types::Json;
use sqlx::SqlitePool;

use hotel_booking_api::auth::{Identity, Role};
use hotel_booking_api::models::hotel::RoomType;

/// Fresh in-memory database with migrations applied. A single connection
/// keeps every statement on the same in-memory store.
pub async fn test_pool() -> SqlitePool {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .unwrap()
        .foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .unwrap();
    sqlx::migrate!("./migrations").run(&pool).await.unwrap();
    pool
}

/// Inserts a hotel with the given `(room_type, total_rooms, price_per_night)`
/// room classes and returns its id.
pub async fn seed_hotel(
    pool: &SqlitePool,
    name: &str,
    city: &str,
    rooms: &[(RoomType, i64, f64)],
) -> i64 {
    let hotel_id: i64 = sqlx::query_scalar(
        "INSERT INTO hotels (name, city, address) VALUES (?, ?, '1 Main St') RETURNING id",
    )
    .bind(name)
    .bind(city)
    .fetch_one(pool)
    .await
    .unwrap();

    for &(room_type, total_rooms, price_per_night) in rooms {
        sqlx::query(
            r#"
            INSERT INTO hotel_rooms (hotel_id, room_type, capacity, price_per_night, total_rooms, amenities)
            VALUES (?, ?, 2, ?, ?, ?)
            "#,
        )
        .bind(hotel_id)
        .bind(room_type)
        .bind(price_per_night)
        .bind(total_rooms)
        .bind(Json(Vec::<String>::new()))
        .execute(pool)
        .await
        .unwrap();
    }

    hotel_id
}

pub fn guest(user_id: i64) -> Identity {
    Identity {
        user_id,
        role: Role::User,
    }
}

pub fn admin(user_id: i64) -> Identity {
    Identity {
        user_id,
        role: Role::Admin,
    }
}

/// Midnight at the start of `yyyy-mm-dd`.
pub fn day(s: &str) -> NaiveDateTime {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .unwrap()
        .and_time(NaiveTime::MIN)
}
