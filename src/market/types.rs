//! Prediction market records and request/response types.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use time::OffsetDateTime;

use super::ledger::PoolLedger;
use super::odds::Odds;

/// Canonical outcome options for a whale-move prediction.
pub const DEFAULT_OPTIONS: [&str; 4] = ["BUY", "SELL", "TRANSFER_TO_CEX", "HOLD"];

/// Lifecycle state of a market.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum MarketStatus {
    /// Accepting bets.
    #[default]
    #[strum(serialize = "open")]
    Open,
    /// Terminal. No bets, no further resolution.
    #[strum(serialize = "resolved")]
    Resolved,
}

/// One agent's stake on one outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bet {
    /// Bet ID.
    pub id: String,
    /// Agent that placed the bet.
    pub agent_id: String,
    /// Uppercased option label.
    pub predicted_move: String,
    /// Stake, always positive.
    pub amount: Decimal,
    /// Free-text reasoning (empty if none given).
    pub reasoning: String,
    /// Placement time.
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

/// Declared outcome of a resolved market.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resolution {
    /// Uppercased actual move.
    pub actual_move: String,
    /// External transaction reference, if any.
    pub tx_signature: Option<String>,
    /// Resolution time.
    #[serde(with = "time::serde::rfc3339")]
    pub resolved_at: OffsetDateTime,
}

/// A prediction about what a tracked whale does next.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Market {
    /// Market ID.
    pub id: String,
    /// Tracked wallet address.
    pub whale_address: String,
    /// Human-readable whale alias.
    pub whale_alias: String,
    /// Question text.
    pub question: String,
    /// Option set, pools and bets.
    #[serde(flatten)]
    pub ledger: PoolLedger,
    /// Lifecycle state.
    pub status: MarketStatus,
    /// Timeframe label (e.g., "24h").
    pub timeframe: String,
    /// Creation time.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// Expiry time (creation + market duration).
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,
    /// Set once, on resolution.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Resolution>,
}

impl Market {
    /// Check if the market still accepts bets and resolution.
    pub fn is_open(&self) -> bool {
        self.status == MarketStatus::Open
    }

    /// Check if the expiry time has passed at `now`.
    pub fn is_expired_at(&self, now: OffsetDateTime) -> bool {
        now >= self.expires_at
    }

    /// Check if the expiry time has passed.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(OffsetDateTime::now_utc())
    }

    /// Sum of all pools.
    pub fn total_pool(&self) -> Decimal {
        self.ledger.total()
    }

    /// Number of bets placed.
    pub fn participant_count(&self) -> usize {
        self.ledger.bets().len()
    }
}

/// Listing entry for an open market.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketSummary {
    /// The market itself.
    #[serde(flatten)]
    pub market: Market,
    /// Sum of all pools.
    pub total_pool: Decimal,
    /// Number of bets placed.
    pub participant_count: usize,
    /// Whether expiry has passed (advisory unless expiry is enforced).
    pub expired: bool,
}

impl From<Market> for MarketSummary {
    fn from(market: Market) -> Self {
        Self {
            total_pool: market.total_pool(),
            participant_count: market.participant_count(),
            expired: market.is_expired(),
            market,
        }
    }
}

/// A winning bet and its payout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Winner {
    /// Winning agent.
    pub agent_id: String,
    /// Original stake.
    pub bet: Decimal,
    /// Amount credited, two decimal places.
    pub payout: Decimal,
}

/// Result of a successful bet placement.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BetReceipt {
    /// The recorded bet.
    pub bet: Bet,
    /// Total pool after the bet.
    pub total_pool: Decimal,
    /// Odds snapshot after the bet.
    pub current_odds: BTreeMap<String, Odds>,
}

/// Odds snapshot for a market.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OddsSnapshot {
    /// Total pool.
    pub total_pool: Decimal,
    /// Display odds per option.
    pub current_odds: BTreeMap<String, Odds>,
}

/// Result of a successful resolution.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedMarket {
    /// The market after resolution.
    pub prediction: Market,
    /// Winning bets with payouts, in bet order.
    pub winners: Vec<Winner>,
}

/// Market counts for health reporting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MarketStats {
    /// All markets.
    pub total: usize,
    /// Markets accepting bets.
    pub open: usize,
    /// Resolved markets.
    pub resolved: usize,
}

/// Request to create a market.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMarket {
    /// Tracked wallet address (required).
    pub whale_address: Option<String>,
    /// Whale alias; filled from the whale directory by the API layer.
    #[serde(default)]
    pub whale_alias: Option<String>,
    /// Question; defaults to a prompt about the whale.
    #[serde(default)]
    pub question: Option<String>,
    /// Option labels; defaults to [`DEFAULT_OPTIONS`].
    #[serde(default)]
    pub options: Option<Vec<String>>,
    /// Timeframe label; defaults to the configured timeframe.
    #[serde(default)]
    pub timeframe: Option<String>,
}

impl CreateMarket {
    /// Create a request for the given whale with all defaults.
    pub fn for_whale(address: impl Into<String>) -> Self {
        Self {
            whale_address: Some(address.into()),
            ..Self::default()
        }
    }

    /// Set the whale alias.
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.whale_alias = Some(alias.into());
        self
    }

    /// Set the question.
    pub fn with_question(mut self, question: impl Into<String>) -> Self {
        self.question = Some(question.into());
        self
    }

    /// Set the option labels.
    pub fn with_options<S: Into<String>>(mut self, options: impl IntoIterator<Item = S>) -> Self {
        self.options = Some(options.into_iter().map(Into::into).collect());
        self
    }
}

/// Request to place a bet.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceBet {
    /// Betting agent (required).
    pub agent_id: Option<String>,
    /// Predicted move, case-insensitive (required).
    pub predicted_move: Option<String>,
    /// Positive stake (required).
    pub amount: Option<Decimal>,
    /// Free-text reasoning.
    #[serde(default)]
    pub reasoning: Option<String>,
}

impl PlaceBet {
    /// Create a bet request.
    pub fn new(agent_id: impl Into<String>, predicted_move: impl Into<String>, amount: Decimal) -> Self {
        Self {
            agent_id: Some(agent_id.into()),
            predicted_move: Some(predicted_move.into()),
            amount: Some(amount),
            reasoning: None,
        }
    }

    /// Attach reasoning.
    pub fn with_reasoning(mut self, reasoning: impl Into<String>) -> Self {
        self.reasoning = Some(reasoning.into());
        self
    }
}

/// Request to resolve a market.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveMarket {
    /// Observed move, case-insensitive (required).
    pub actual_move: Option<String>,
    /// External transaction reference.
    #[serde(default)]
    pub tx_signature: Option<String>,
}

impl ResolveMarket {
    /// Create a resolution request.
    pub fn new(actual_move: impl Into<String>) -> Self {
        Self {
            actual_move: Some(actual_move.into()),
            tx_signature: None,
        }
    }

    /// Attach the transaction reference.
    pub fn with_tx_signature(mut self, signature: impl Into<String>) -> Self {
        self.tx_signature = Some(signature.into());
        self
    }
}

/// Uppercase and trim an option label.
pub fn normalize_option(label: &str) -> String {
    label.trim().to_uppercase()
}
