//! Prediction markets on whale moves.
//!
//! This module handles:
//! - Market, bet and resolution records
//! - Pool accounting per market
//! - Display odds
//! - Winner selection and payouts
//! - The keyed market store
//! - Market lifecycle (create, bet, resolve, list)

pub mod demo;
pub mod ledger;
pub mod lifecycle;
pub mod odds;
pub mod payout;
pub mod registry;
pub mod types;

pub use demo::{seed_demo, DEMO_MARKET_ID};
pub use ledger::{PoolLedger, MAX_POOL, MAX_STAKE_SCALE};
pub use lifecycle::{MarketManager, MarketSettings, UNKNOWN_WHALE_ALIAS};
pub use odds::{compute_odds, Odds};
pub use payout::{compute_winners, PayoutModel};
pub use registry::MarketRegistry;
pub use types::{
    Bet, BetReceipt, CreateMarket, Market, MarketStats, MarketStatus, MarketSummary,
    OddsSnapshot, PlaceBet, Resolution, ResolveMarket, ResolvedMarket, Winner, DEFAULT_OPTIONS,
};
