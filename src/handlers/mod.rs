use actix_web::{web, HttpResponse};
use sqlx::SqlitePool;

use crate::db;

pub mod bookings;
pub mod hotels;

pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/api", web::get().to(health))
        .service(
            web::scope("/api/hotels")
                .route("/search", web::get().to(hotels::search_hotels))
                .route(
                    "/availability/check",
                    web::get().to(hotels::check_availability),
                )
                .route("/admin/all", web::get().to(hotels::get_all_hotels))
                .route("/autocomplete/cities", web::get().to(hotels::get_cities))
                .route("", web::post().to(hotels::create_hotel))
                .route("/{id}", web::get().to(hotels::get_hotel_by_id))
                .route("/{id}", web::put().to(hotels::update_hotel))
                .route("/{id}", web::delete().to(hotels::delete_hotel)),
        )
        .service(
            web::scope("/api/bookings")
                .route("", web::post().to(bookings::create_booking))
                .route("", web::get().to(bookings::get_all_bookings))
                .route("/admin/analytics", web::get().to(bookings::get_analytics))
                .route("/user/{user_id}", web::get().to(bookings::get_user_bookings))
                .route("/{id}", web::put().to(bookings::update_booking_status))
                .route("/{id}", web::delete().to(bookings::cancel_booking)),
        );
}

async fn health(pool: web::Data<SqlitePool>) -> HttpResponse {
    if db::health_check(pool.get_ref()).await {
        HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
    } else {
        HttpResponse::ServiceUnavailable().json(serde_json::json!({ "status": "unavailable" }))
    }
}
