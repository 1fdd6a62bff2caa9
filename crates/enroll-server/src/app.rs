//! Router Assembly

use axum::Router;
use axum::routing::{get, post, put};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers::{
    checkout, confirm_payment, health_check, inscricao, verificar_email, webhook,
};
use crate::state::AppState;

/// Build the full application router over the given state
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/health", get(health_check))
        .route("/api/verificar-email", get(verificar_email))
        .route("/api/inscricao", post(inscricao))
        .route("/api/checkout", post(checkout))
        .route("/webhook", post(webhook))
        .route("/api/confirm-payment/{transaction_id}", put(confirm_payment))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
