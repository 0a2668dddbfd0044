use std::net::SocketAddr;

use axum::{
    http::{HeaderValue, Method},
    routing::{delete, get, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, Level};

mod auth;
mod db;
mod domain;
mod rest;

use db::DbConnection;
use rest::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .init();

    let jwt_secret = std::env::var("JWT_SECRET")
        .map_err(|_| anyhow::anyhow!("JWT_SECRET must be set in the environment"))?;

    info!("Setting up database");
    let db = DbConnection::init().await?;

    let state = AppState::new(db, jwt_secret);

    // CORS setup to allow the frontend to make requests
    let cors = CorsLayer::new()
        .allow_origin("http://localhost:8080".parse::<HeaderValue>()?)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/pets", get(rest::list_pets).post(rest::create_pet))
        .route(
            "/pets/:id",
            get(rest::get_pet).put(rest::update_pet).delete(rest::delete_pet),
        )
        .route("/pets/:id/recommended-vaccines", get(rest::recommended_vaccines))
        .route(
            "/pets/:id/vaccinations",
            post(rest::record_vaccination),
        )
        .route("/pets/:id/vaccination-history", get(rest::vaccination_history))
        .route("/vaccinations/:id", delete(rest::delete_vaccination))
        .route(
            "/vaccine-schedules",
            get(rest::list_schedules).post(rest::create_schedule),
        )
        .route(
            "/vaccine-schedules/:id",
            put(rest::update_schedule).delete(rest::delete_schedule),
        )
        .route("/notifications", get(rest::notification_feed))
        .route("/notifications/alerts", get(rest::notification_alerts))
        .route("/notifications/:id/read", put(rest::mark_notification_read))
        .with_state(state);

    let app = Router::new().nest("/api", api_routes).layer(cors);

    // Start the server
    let addr = SocketAddr::from(([127, 0, 0, 1], 3000));
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
