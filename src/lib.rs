//! Whale-move prediction markets.
//!
//! Agents open a prediction on what a tracked whale wallet does next, other
//! agents stake on discrete outcomes, and an operator resolves the prediction
//! against the observed move.
//!
//! # Pools and odds
//!
//! Every stake lands in its option's pool. Display odds are total pool over
//! option pool:
//!
//! ```text
//! BUY:             500  -> 850 / 500 = 1.70
//! SELL:            200  -> 850 / 200 = 4.25
//! TRANSFER_TO_CEX: 100  -> 850 / 100 = 8.50
//! HOLD:             50  -> 850 /  50 = 17.00
//! ─────────────────────
//! Total:           850
//! ```
//!
//! Winners are paid a flat 2.5x of their stake by default (not market
//! accurate), or a pari-mutuel share of the whole pool when configured.
//!
//! # Modules
//!
//! - [`config`]: Configuration loading from environment
//! - [`error`]: Unified error types
//! - [`market`]: Pool ledger, odds, payouts, registry and lifecycle
//! - [`whales`]: Tracked whale directory
//! - [`alerts`]: Whale activity alert registrations
//! - [`api`]: HTTP API
//! - [`metrics`]: Prometheus metrics
//! - [`utils`]: Utility functions

pub mod alerts;
pub mod api;
pub mod config;
pub mod error;
pub mod market;
pub mod metrics;
pub mod utils;
pub mod whales;

pub use config::Config;
pub use error::{MarketError, Result, ServiceError};
