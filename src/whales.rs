//! Tracked whale wallets.
//!
//! The market engine only needs an address-to-alias lookup; the directory
//! also serves the whale listing endpoints.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;
use time::OffsetDateTime;

/// A tracked wallet.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Whale {
    /// Wallet address.
    pub address: String,
    /// Human-readable alias.
    pub alias: String,
    /// Token balance.
    pub balance: Decimal,
    /// Token symbol.
    pub token: String,
    /// Last observed activity.
    #[serde(with = "time::serde::rfc3339")]
    pub last_activity: OffsetDateTime,
    /// Most recent moves, oldest first.
    #[serde(rename = "last5Moves")]
    pub recent_moves: Vec<String>,
    /// Average trade size.
    pub avg_trade_size: Decimal,
    /// Historical prediction accuracy (e.g., "72%").
    pub accuracy: String,
    /// Agents following this whale.
    pub followers: u64,
}

/// One observed on-chain transaction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WhaleTransaction {
    /// Move kind, e.g. "BUY" or "TRANSFER".
    #[serde(rename = "type")]
    pub kind: String,
    /// Token amount.
    pub amount: Decimal,
    /// Token symbol.
    pub token: String,
    /// Counterparty label for transfers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    /// When the transaction was seen.
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

/// Behavioral read on a whale.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WhaleAnalysis {
    pub trend: String,
    /// Percent.
    pub confidence: u8,
    pub next_move_predict: String,
    pub risk_level: String,
}

/// Whale with recent transactions and analysis.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WhaleDetail {
    #[serde(flatten)]
    pub whale: Whale,
    pub recent_transactions: Vec<WhaleTransaction>,
    pub analysis: WhaleAnalysis,
}

/// Source of whale facts.
pub trait WhaleDirectory: Send + Sync {
    /// All tracked whales.
    fn list(&self) -> Vec<Whale>;

    /// A whale by address.
    fn lookup(&self, address: &str) -> Option<Whale>;

    /// Whale with transactions and analysis.
    ///
    /// No chain feed is wired in, so the default returns fixed sample records.
    fn detail(&self, address: &str) -> Option<WhaleDetail> {
        self.lookup(address)
            .map(|whale| sample_detail(whale, OffsetDateTime::now_utc()))
    }

    /// Alias for an address, if tracked.
    fn alias(&self, address: &str) -> Option<String> {
        self.lookup(address).map(|w| w.alias)
    }

    /// Number of tracked whales.
    fn len(&self) -> usize {
        self.list().len()
    }
}

fn sample_detail(whale: Whale, now: OffsetDateTime) -> WhaleDetail {
    let token = whale.token.clone();

    WhaleDetail {
        whale,
        recent_transactions: vec![
            WhaleTransaction {
                kind: "BUY".to_string(),
                amount: dec!(50000),
                token: token.clone(),
                to: None,
                timestamp: now - time::Duration::hours(1),
            },
            WhaleTransaction {
                kind: "TRANSFER".to_string(),
                amount: dec!(10000),
                token,
                to: Some("Exchange".to_string()),
                timestamp: now - time::Duration::hours(2),
            },
        ],
        analysis: WhaleAnalysis {
            trend: "Accumulating".to_string(),
            confidence: 78,
            next_move_predict: "Likely BUY within 24h".to_string(),
            risk_level: "Medium".to_string(),
        },
    }
}

/// Fixed, in-memory whale directory.
#[derive(Debug, Clone, Default)]
pub struct StaticWhaleDirectory {
    whales: BTreeMap<String, Whale>,
    order: Vec<String>,
}

impl StaticWhaleDirectory {
    /// Create a directory from a list of whales. Later duplicates replace earlier ones.
    pub fn new(whales: impl IntoIterator<Item = Whale>) -> Self {
        let mut directory = Self::default();
        for whale in whales {
            if !directory.whales.contains_key(&whale.address) {
                directory.order.push(whale.address.clone());
            }
            directory.whales.insert(whale.address.clone(), whale);
        }
        directory
    }

    /// The four reference whales.
    pub fn seeded() -> Self {
        let now = OffsetDateTime::now_utc();
        let whale = |address: &str,
                     alias: &str,
                     balance: Decimal,
                     idle: time::Duration,
                     moves: [&str; 5],
                     avg_trade_size: Decimal,
                     accuracy: &str,
                     followers: u64| Whale {
            address: address.to_string(),
            alias: alias.to_string(),
            balance,
            token: "SOL".to_string(),
            last_activity: now - idle,
            recent_moves: moves.iter().map(|m| m.to_string()).collect(),
            avg_trade_size,
            accuracy: accuracy.to_string(),
            followers,
        };

        Self::new([
            whale(
                "Wha1e111111111111111111111111111111111111111",
                "SOL Mega Whale",
                dec!(2500000),
                time::Duration::hours(1),
                ["BUY", "HOLD", "BUY", "SELL", "BUY"],
                dec!(50000),
                "72%",
                1234,
            ),
            whale(
                "Wha1e222222222222222222222222222222222222222",
                "DeFi Degen",
                dec!(890000),
                time::Duration::minutes(30),
                ["SELL", "SELL", "BUY", "SELL", "BUY"],
                dec!(25000),
                "65%",
                567,
            ),
            whale(
                "Wha1e333333333333333333333333333333333333333",
                "NFT Flipper King",
                dec!(450000),
                time::Duration::hours(2),
                ["BUY", "BUY", "BUY", "SELL", "HOLD"],
                dec!(15000),
                "58%",
                890,
            ),
            whale(
                "Wha1e444444444444444444444444444444444444444",
                "Mysterious Accumulator",
                dec!(5000000),
                time::Duration::minutes(5),
                ["BUY", "BUY", "BUY", "BUY", "BUY"],
                dec!(100000),
                "85%",
                3456,
            ),
        ])
    }
}

impl WhaleDirectory for StaticWhaleDirectory {
    fn list(&self) -> Vec<Whale> {
        self.order
            .iter()
            .filter_map(|address| self.whales.get(address).cloned())
            .collect()
    }

    fn lookup(&self, address: &str) -> Option<Whale> {
        self.whales.get(address).cloned()
    }

    fn len(&self) -> usize {
        self.whales.len()
    }
}
