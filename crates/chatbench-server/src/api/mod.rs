pub mod chat;
pub mod error;
pub mod presets;
pub mod state;

pub use error::ApiError;
pub use state::AppState;

use axum::{
    Json, Router,
    http::{Method, header},
    routing::{get, post},
};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};

#[derive(Serialize)]
struct Health {
    status: String,
}

async fn health() -> Json<Health> {
    Json(Health {
        status: "chatbench is working!".to_string(),
    })
}

pub fn build_router(state: AppState) -> Router {
    // The browser front-end is served from another origin.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/health", get(health))
        .route(
            "/presets",
            get(presets::list_presets).post(presets::create_preset),
        )
        .route(
            "/presets/{id}",
            get(presets::get_preset)
                .put(presets::update_preset)
                .delete(presets::delete_preset),
        )
        .route("/trigger", post(chat::trigger))
        .route("/events", get(chat::events))
        .route("/abort", post(chat::abort))
        .layer(cors)
        .with_state(state)
}
