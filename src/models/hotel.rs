use std::fmt;

use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use validator::Validate;

/// Room category within a hotel. Stored as text and matched by value against
/// booking records rather than by foreign key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(rename_all = "PascalCase")]
pub enum RoomType {
    Single,
    Double,
    Suite,
    Deluxe,
}

impl fmt::Display for RoomType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RoomType::Single => "Single",
            RoomType::Double => "Double",
            RoomType::Suite => "Suite",
            RoomType::Deluxe => "Deluxe",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Hotel {
    pub id: i64,
    pub name: String,
    pub city: String,
    pub address: String,
    pub description: String,
    pub rating: f64,
    pub created_at: chrono::NaiveDateTime,
}

/// A room class row. Owned by its hotel: written only through hotel-level
/// create/update, removed with the hotel.
#[derive(Debug, Serialize, Deserialize, Clone, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct RoomClass {
    pub id: i64,
    pub hotel_id: i64,
    pub room_type: RoomType,
    pub capacity: i64,
    pub price_per_night: f64,
    pub total_rooms: i64,
    pub amenities: Json<Vec<String>>,
}

/// Hotel plus its room classes, the shape the catalog endpoints return.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HotelDetails {
    #[serde(flatten)]
    pub hotel: Hotel,
    pub rooms: Vec<RoomClass>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RoomClassInput {
    pub room_type: RoomType,
    #[validate(range(min = 1))]
    pub capacity: i64,
    #[validate(range(min = 0.0))]
    pub price_per_night: f64,
    #[validate(range(min = 1))]
    pub total_rooms: i64,
    #[serde(default)]
    pub amenities: Vec<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateHotel {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(length(min = 1))]
    pub city: String,
    #[validate(length(min = 1))]
    pub address: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_rating")]
    #[validate(range(min = 0.0, max = 5.0))]
    pub rating: f64,
    #[serde(default)]
    #[validate]
    pub rooms: Vec<RoomClassInput>,
}

fn default_rating() -> f64 {
    4.0
}
