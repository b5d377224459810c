//! Integration tests for the prediction market engine and HTTP API.
//!
//! Run with: cargo test --test integration

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::{json, Value};
use tower::ServiceExt;

use whale_shadow::api::{create_router, AppState};
use whale_shadow::market::{
    CreateMarket, MarketManager, MarketSettings, MarketStatus, PlaceBet,
    ResolveMarket, DEFAULT_OPTIONS,
};
use whale_shadow::whales::StaticWhaleDirectory;
use whale_shadow::MarketError;

const WHALE: &str = "Wha1e444444444444444444444444444444444444444";

async fn post(state: &AppState, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();

    let response = create_router(state.clone()).oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn get(state: &AppState, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();

    let response = create_router(state.clone()).oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

/// Create, bet twice, resolve: one winner paid 2.5x.
#[tokio::test]
async fn full_prediction_lifecycle_over_http() {
    let state = AppState::new(
        MarketManager::new(MarketSettings::default()),
        StaticWhaleDirectory::seeded(),
    );

    let (status, created) = post(
        &state,
        "/api/predictions/create",
        json!({ "whaleAddress": WHALE }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(created["prediction"]["whaleAlias"], "Mysterious Accumulator");
    assert_eq!(created["prediction"]["status"], "open");
    assert_eq!(created["prediction"]["options"], json!(DEFAULT_OPTIONS));
    let id = created["prediction"]["id"].as_str().unwrap().to_string();

    let (status, first) = post(
        &state,
        &format!("/api/predictions/{id}/bet"),
        json!({ "agentId": "agentA", "predictedMove": "buy", "amount": 300, "reasoning": "accumulating" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["bet"]["predictedMove"], "BUY");
    assert_eq!(first["currentOdds"]["BUY"], "1.00");
    assert_eq!(first["currentOdds"]["SELL"], "N/A");

    let (status, second) = post(
        &state,
        &format!("/api/predictions/{id}/bet"),
        json!({ "agentId": "agentB", "predictedMove": "SELL", "amount": 200 }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["totalPool"], "500");

    let (_, listed) = get(&state, "/api/predictions").await;
    assert_eq!(listed["count"], 1);
    assert_eq!(listed["predictions"][0]["participantCount"], 2);

    let (status, resolved) = post(
        &state,
        &format!("/api/predictions/{id}/resolve"),
        json!({ "actualMove": "BUY", "txSignature": "5xWhaleTx" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(resolved["prediction"]["status"], "resolved");
    assert_eq!(resolved["prediction"]["result"]["actualMove"], "BUY");
    assert_eq!(resolved["prediction"]["result"]["txSignature"], "5xWhaleTx");
    assert_eq!(
        resolved["winners"],
        json!([{ "agentId": "agentA", "bet": "300", "payout": "750.00" }])
    );
    assert_eq!(resolved["message"], "Whale moved! BUY - 1 winners!");

    let (status, _) = post(
        &state,
        &format!("/api/predictions/{id}/bet"),
        json!({ "agentId": "late", "predictedMove": "BUY", "amount": 1 }),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, listed) = get(&state, "/api/predictions").await;
    assert_eq!(listed["count"], 0);
}

/// Parallel bets on one market never lose a pool increment.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_bets_keep_pool_consistent() {
    let manager = Arc::new(MarketManager::new(MarketSettings::default()));
    let market = manager.create(CreateMarket::for_whale(WHALE)).unwrap();

    let mut handles = Vec::new();
    for task in 0..8 {
        let manager = Arc::clone(&manager);
        let id = market.id.clone();
        handles.push(tokio::spawn(async move {
            for i in 0..50 {
                let option = DEFAULT_OPTIONS[(task + i) % DEFAULT_OPTIONS.len()];
                manager
                    .place_bet(&id, PlaceBet::new(format!("agent-{task}-{i}"), option, dec!(1.5)))
                    .unwrap();
                tokio::task::yield_now().await;
            }
        }));
    }

    let reader = {
        let manager = Arc::clone(&manager);
        let id = market.id.clone();
        tokio::spawn(async move {
            for _ in 0..200 {
                let snapshot = manager.get(&id).unwrap();
                assert!(snapshot.ledger.is_consistent());
                tokio::task::yield_now().await;
            }
        })
    };

    for handle in handles {
        handle.await.unwrap();
    }
    reader.await.unwrap();

    let market = manager.get(&market.id).unwrap();
    assert_eq!(market.participant_count(), 400);
    assert_eq!(market.total_pool(), dec!(600));
    assert!(market.ledger.is_consistent());
}

/// Racing resolutions: exactly one wins, the rest see AlreadyResolved.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_resolutions_resolve_exactly_once() {
    let manager = Arc::new(MarketManager::new(MarketSettings::default()));
    let market = manager.create(CreateMarket::for_whale(WHALE)).unwrap();
    manager
        .place_bet(&market.id, PlaceBet::new("agentA", "HOLD", dec!(10)))
        .unwrap();

    let mut handles = Vec::new();
    for option in DEFAULT_OPTIONS.iter().cycle().take(12) {
        let option = *option;
        let manager = Arc::clone(&manager);
        let id = market.id.clone();
        handles.push(tokio::spawn(async move {
            manager.resolve(&id, ResolveMarket::new(option))
        }));
    }

    let mut resolved = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => resolved += 1,
            Err(MarketError::AlreadyResolved { .. }) => {}
            Err(e) => panic!("unexpected error: {e}"),
        }
    }

    assert_eq!(resolved, 1);
    let market = manager.get(&market.id).unwrap();
    assert_eq!(market.status, MarketStatus::Resolved);
    assert!(market.result.is_some());
}

/// A failed operation on one market leaves other markets untouched.
#[test]
fn failures_are_isolated_per_market() {
    let manager = MarketManager::new(MarketSettings::default());
    let a = manager.create(CreateMarket::for_whale(WHALE)).unwrap();
    let b = manager.create(CreateMarket::for_whale(WHALE)).unwrap();
    manager
        .place_bet(&b.id, PlaceBet::new("agentB", "SELL", dec!(20)))
        .unwrap();
    let b_before = manager.get(&b.id).unwrap();

    assert!(manager
        .place_bet(&a.id, PlaceBet::new("agentA", "NOPE", dec!(5)))
        .is_err());
    manager.resolve(&a.id, ResolveMarket::new("BUY")).unwrap();
    assert!(manager.resolve(&a.id, ResolveMarket::new("BUY")).is_err());

    assert_eq!(manager.get(&b.id).unwrap(), b_before);
    assert_eq!(manager.get(&b.id).unwrap().total_pool(), dec!(20));
    assert_eq!(manager.get(&a.id).unwrap().total_pool(), Decimal::ZERO);
}
