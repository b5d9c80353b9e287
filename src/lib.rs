//! NeoHealth backend: accounts, daily health records, trend estimates and an AI chat assistant.

use std::any::Any;

use axum::{response::IntoResponse, response::Response, routing::get, Router};
use tower_http::{catch_panic::CatchPanicLayer, cors::CorsLayer, trace::TraceLayer};

pub mod accounts;
pub mod chat;
pub mod config;
pub mod error;
pub mod models;
pub mod records;
pub mod reference;
pub mod routes;
pub mod sanitize;
pub mod sentiment;
pub mod state;
pub mod store;
pub mod trend;

pub use config::AppConfig;
pub use error::ApiError;
pub use state::AppState;

/// Full HTTP application with the catch-all panic handler outermost.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(routes::auth::routes(state.clone()))
        .merge(routes::health::routes(state.clone()))
        .merge(routes::chat::routes(state))
        .route("/health", get(|| async { "✅ Backend up" }))
        .fallback(|| async { ApiError::NotFound("No such route".into()) })
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .layer(CatchPanicLayer::custom(handle_panic))
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };
    ApiError::Internal(format!("handler panicked: {detail}")).into_response()
}
