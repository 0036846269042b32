use actix_web::{middleware, web, App, HttpServer};
use dotenv::dotenv;
use env_logger::Env;

use hotel_booking_api::auth::AuthConfig;
use hotel_booking_api::{db, handlers};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Initialize logger and environment
    dotenv().ok();
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    log::info!("Connecting to database...");
    let pool = db::connect(&database_url)
        .await
        .expect("Failed to create pool");

    log::info!("Running migrations...");
    db::migrate(&pool).await.expect("Failed to run migrations");

    log::info!("Starting server at http://localhost:8080");

    let pool_data = web::Data::new(pool.clone());
    let auth_data = web::Data::new(AuthConfig::from_env());

    HttpServer::new(move || {
        App::new()
            .app_data(pool_data.clone())
            .app_data(auth_data.clone())
            .wrap(middleware::Logger::default())
            .configure(handlers::routes)
    })
    .bind(("127.0.0.1", 8080))?
    .run()
    .await?;

    pool.close().await;
    Ok(())
}
