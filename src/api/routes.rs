//! HTTP API route definitions.

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::handlers::{
    create_alert, create_prediction, get_odds, get_prediction, get_whale, health, list_predictions,
    list_whales, place_bet, prometheus_metrics, resolve_prediction, service_health, AppState,
};

/// Create the API router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health endpoints
        .route("/health", get(health))
        .route("/api/health", get(service_health))
        .route("/metrics", get(prometheus_metrics))
        // Whales
        .route("/api/whales", get(list_whales))
        .route("/api/whales/:address", get(get_whale))
        // Predictions
        .route("/api/predictions", get(list_predictions))
        .route("/api/predictions/create", post(create_prediction))
        .route("/api/predictions/:id", get(get_prediction))
        .route("/api/predictions/:id/odds", get(get_odds))
        .route("/api/predictions/:id/bet", post(place_bet))
        .route("/api/predictions/:id/resolve", post(resolve_prediction))
        // Alerts
        .route("/api/alerts/create", post(create_alert))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
