//! HTTP API handlers.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use metrics_exporter_prometheus::PrometheusHandle;
use rust_decimal::Decimal;
use serde::Serialize;

use super::error::ApiError;
use crate::alerts::{Alert, AlertRegistry, CreateAlert};
use crate::market::{
    Bet, CreateMarket, Market, MarketManager, MarketSummary, Odds, OddsSnapshot, PlaceBet,
    ResolveMarket, Winner,
};
use crate::metrics;
use crate::whales::{Whale, WhaleDetail, WhaleDirectory};

/// Application state shared with handlers.
#[derive(Clone)]
pub struct AppState {
    /// Market engine.
    pub markets: Arc<MarketManager>,
    /// Whale facts.
    pub whales: Arc<dyn WhaleDirectory>,
    /// Alert store.
    pub alerts: Arc<AlertRegistry>,
    /// Prometheus render handle, if a recorder is installed.
    pub prometheus: Option<PrometheusHandle>,
}

impl AppState {
    /// Create new app state.
    pub fn new(markets: MarketManager, whales: impl WhaleDirectory + 'static) -> Self {
        Self {
            markets: Arc::new(markets),
            whales: Arc::new(whales),
            alerts: Arc::new(AlertRegistry::new()),
            prometheus: None,
        }
    }

    /// Attach a Prometheus render handle.
    pub fn with_prometheus(mut self, handle: PrometheusHandle) -> Self {
        self.prometheus = Some(handle);
        self
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Status: "ok".
    pub status: &'static str,
}

/// Service description and counters.
#[derive(Debug, Serialize)]
pub struct ServiceHealthResponse {
    /// Status: "ok".
    pub status: &'static str,
    /// Service name.
    pub skill: &'static str,
    /// Crate version.
    pub version: &'static str,
    /// Chain the whales live on.
    pub chain: &'static str,
    /// One-line description.
    pub description: &'static str,
    /// Counters.
    pub stats: ServiceStats,
}

/// Counters in the service health response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceStats {
    /// Whales in the directory.
    pub tracked_whales: usize,
    /// Predictions accepting bets.
    pub active_predictions: usize,
    /// All predictions.
    pub total_predictions: usize,
    /// Resolved predictions.
    pub resolved_predictions: usize,
    /// Registered alerts.
    pub alerts: usize,
}

/// Whale listing.
#[derive(Debug, Serialize)]
pub struct WhaleListResponse {
    /// Tracked whales.
    pub whales: Vec<Whale>,
    /// Number of whales.
    pub count: usize,
}

/// Created prediction.
#[derive(Debug, Serialize)]
pub struct CreatePredictionResponse {
    /// Always true.
    pub success: bool,
    /// The new prediction.
    pub prediction: Market,
    /// Confirmation text.
    pub message: String,
}

/// Open prediction listing.
#[derive(Debug, Serialize)]
pub struct PredictionListResponse {
    /// Open predictions with totals.
    pub predictions: Vec<MarketSummary>,
    /// Number of open predictions.
    pub count: usize,
}

/// Placed bet.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceBetResponse {
    /// Always true.
    pub success: bool,
    /// The recorded bet.
    pub bet: Bet,
    /// Total pool after the bet.
    pub total_pool: Decimal,
    /// Odds after the bet.
    pub current_odds: BTreeMap<String, Odds>,
}

/// Resolved prediction.
#[derive(Debug, Serialize)]
pub struct ResolveResponse {
    /// Always true.
    pub success: bool,
    /// The resolved prediction.
    pub prediction: Market,
    /// Winning bets with payouts.
    pub winners: Vec<Winner>,
    /// Summary text.
    pub message: String,
}

/// Created alert.
#[derive(Debug, Serialize)]
pub struct CreateAlertResponse {
    /// Always true.
    pub success: bool,
    /// The new alert.
    pub alert: Alert,
    /// Confirmation text.
    pub message: String,
}

/// Health check handler - always returns 200.
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse { status: "ok" })
}

/// Service health handler - description plus counters.
pub async fn service_health(State(state): State<AppState>) -> impl IntoResponse {
    let markets = state.markets.stats();

    Json(ServiceHealthResponse {
        status: "ok",
        skill: "Whale-Shadow-Tracker",
        version: env!("CARGO_PKG_VERSION"),
        chain: "Solana",
        description: "Track whale wallets and predict their next moves",
        stats: ServiceStats {
            tracked_whales: state.whales.len(),
            active_predictions: markets.open,
            total_predictions: markets.total,
            resolved_predictions: markets.resolved,
            alerts: state.alerts.len(),
        },
    })
}

/// Prometheus exposition handler - 404 when no recorder is installed.
pub async fn prometheus_metrics(State(state): State<AppState>) -> impl IntoResponse {
    match &state.prometheus {
        Some(handle) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            handle.render(),
        )
            .into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

/// List tracked whales.
pub async fn list_whales(State(state): State<AppState>) -> impl IntoResponse {
    let whales = state.whales.list();
    let count = whales.len();
    Json(WhaleListResponse { whales, count })
}

/// Whale details by address.
pub async fn get_whale(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<Json<WhaleDetail>, ApiError> {
    state
        .whales
        .detail(&address)
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Whale".to_string()))
}

/// Create a prediction on a whale's next move.
pub async fn create_prediction(
    State(state): State<AppState>,
    payload: Result<Json<CreateMarket>, JsonRejection>,
) -> Result<Json<CreatePredictionResponse>, ApiError> {
    let Json(mut request) = payload?;
    let start = Instant::now();

    if request.whale_alias.is_none() {
        request.whale_alias = request
            .whale_address
            .as_deref()
            .and_then(|address| state.whales.alias(address));
    }

    let result = state.markets.create(request);
    metrics::record_http_latency(start, "create_prediction");

    Ok(Json(CreatePredictionResponse {
        success: true,
        prediction: result?,
        message: "Whale watch prediction created!".to_string(),
    }))
}

/// List open predictions.
pub async fn list_predictions(State(state): State<AppState>) -> impl IntoResponse {
    let predictions = state.markets.list_open();
    let count = predictions.len();
    Json(PredictionListResponse { predictions, count })
}

/// Prediction by id.
pub async fn get_prediction(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Market>, ApiError> {
    Ok(Json(state.markets.get(&id)?))
}

/// Current odds of a prediction.
pub async fn get_odds(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<OddsSnapshot>, ApiError> {
    Ok(Json(state.markets.odds(&id)?))
}

/// Place a bet on a prediction.
pub async fn place_bet(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<PlaceBet>, JsonRejection>,
) -> Result<Json<PlaceBetResponse>, ApiError> {
    let Json(request) = payload?;
    let start = Instant::now();
    let result = state.markets.place_bet(&id, request);
    metrics::record_http_latency(start, "place_bet");

    let receipt = result?;
    Ok(Json(PlaceBetResponse {
        success: true,
        bet: receipt.bet,
        total_pool: receipt.total_pool,
        current_odds: receipt.current_odds,
    }))
}

/// Resolve a prediction once the whale has moved.
pub async fn resolve_prediction(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<ResolveMarket>, JsonRejection>,
) -> Result<Json<ResolveResponse>, ApiError> {
    let Json(request) = payload?;
    let start = Instant::now();
    let result = state.markets.resolve(&id, request);
    metrics::record_http_latency(start, "resolve_prediction");

    let resolved = result?;
    let actual_move = resolved
        .prediction
        .result
        .as_ref()
        .map(|r| r.actual_move.clone())
        .unwrap_or_default();
    let message = format!(
        "Whale moved! {} - {} winners!",
        actual_move,
        resolved.winners.len()
    );

    Ok(Json(ResolveResponse {
        success: true,
        prediction: resolved.prediction,
        winners: resolved.winners,
        message,
    }))
}

/// Register an alert on whale activity.
pub async fn create_alert(
    State(state): State<AppState>,
    payload: Result<Json<CreateAlert>, JsonRejection>,
) -> Result<Json<CreateAlertResponse>, ApiError> {
    let Json(request) = payload?;
    let alert = state.alerts.create(request)?;

    Ok(Json(CreateAlertResponse {
        success: true,
        alert,
        message: "Alert created! You will be notified when whale moves.".to_string(),
    }))
}
