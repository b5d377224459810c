//! Per-market pool accounting.
//!
//! The pool map is a cache of the bet list: every mutation goes through
//! [`PoolLedger::record`], which appends the bet and bumps its pool in the
//! same `&mut` borrow.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Serialize;

use super::types::{normalize_option, Bet};
use crate::error::MarketError;

/// Largest total stake one market may hold (10^15).
///
/// Keeps every pool, total and odds ratio well inside `Decimal` range.
pub const MAX_POOL: Decimal = Decimal::from_parts(2_764_472_320, 232_830, 0, false, 0);

/// Most decimal places a stake may carry.
pub const MAX_STAKE_SCALE: u32 = 8;

/// Option set, per-option pools and the bet list of one market.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PoolLedger {
    /// Option labels in creation order.
    options: Vec<String>,
    /// Accumulated stake per option. Keys always equal `options`.
    pools: BTreeMap<String, Decimal>,
    /// Bets in placement order.
    bets: Vec<Bet>,
}

impl PoolLedger {
    /// Create an empty ledger over the given option labels.
    ///
    /// Labels are uppercased and de-duplicated (first occurrence wins).
    pub fn new<S: AsRef<str>>(options: impl IntoIterator<Item = S>) -> Result<Self, MarketError> {
        let mut labels: Vec<String> = Vec::new();

        for raw in options {
            let label = normalize_option(raw.as_ref());
            if label.is_empty() {
                return Err(MarketError::InvalidArgument(
                    "option labels must not be blank".to_string(),
                ));
            }
            if !labels.contains(&label) {
                labels.push(label);
            }
        }

        if labels.is_empty() {
            return Err(MarketError::InvalidArgument(
                "at least one option is required".to_string(),
            ));
        }

        let pools = labels
            .iter()
            .map(|label| (label.clone(), Decimal::ZERO))
            .collect();

        Ok(Self {
            options: labels,
            pools,
            bets: Vec::new(),
        })
    }

    /// Option labels in creation order.
    pub fn options(&self) -> &[String] {
        &self.options
    }

    /// Accumulated stake per option.
    pub fn pools(&self) -> &BTreeMap<String, Decimal> {
        &self.pools
    }

    /// Bets in placement order.
    pub fn bets(&self) -> &[Bet] {
        &self.bets
    }

    /// Stake on a single option (zero for unknown labels).
    pub fn pool(&self, option: &str) -> Decimal {
        self.pools.get(option).copied().unwrap_or_default()
    }

    /// Sum of all pools.
    pub fn total(&self) -> Decimal {
        self.pools.values().copied().sum()
    }

    /// Normalize a caller-supplied move and check it against the option set.
    pub fn resolve_option(&self, raw: &str) -> Result<String, MarketError> {
        let option = normalize_option(raw);
        if self.pools.contains_key(&option) {
            Ok(option)
        } else {
            Err(MarketError::InvalidOption {
                option,
                allowed: self.options.clone(),
            })
        }
    }

    /// Append a bet and add its stake to the matching pool.
    ///
    /// The market total never exceeds [`MAX_POOL`]. On error nothing is modified.
    pub fn record(&mut self, bet: Bet) -> Result<(), MarketError> {
        check_stake(bet.amount)?;

        let fits = self
            .total()
            .checked_add(bet.amount)
            .is_some_and(|total| total <= MAX_POOL);
        if !fits {
            return Err(MarketError::InvalidArgument(format!(
                "total pool would exceed {}",
                MAX_POOL
            )));
        }

        let Some(pool) = self.pools.get_mut(&bet.predicted_move) else {
            return Err(MarketError::InvalidOption {
                option: bet.predicted_move,
                allowed: self.options.clone(),
            });
        };

        // pool <= total <= MAX_POOL, so this cannot overflow
        *pool += bet.amount;
        self.bets.push(bet);
        Ok(())
    }

    /// Bets placed on the given (normalized) option.
    pub fn bets_on<'a>(&'a self, option: &'a str) -> impl Iterator<Item = &'a Bet> + 'a {
        self.bets.iter().filter(move |b| b.predicted_move == option)
    }

    /// Check that every pool equals the sum of its bets.
    pub fn is_consistent(&self) -> bool {
        self.pools.iter().all(|(option, pool)| {
            let staked: Decimal = self.bets_on(option).map(|b| b.amount).sum();
            staked == *pool
        }) && self.bets.iter().all(|b| self.pools.contains_key(&b.predicted_move))
    }
}

/// Check a stake before it reaches any pool.
pub fn check_stake(amount: Decimal) -> Result<(), MarketError> {
    if amount <= Decimal::ZERO {
        return Err(MarketError::InvalidArgument(
            "amount must be positive".to_string(),
        ));
    }
    if amount > MAX_POOL {
        return Err(MarketError::InvalidArgument(format!(
            "amount must not exceed {}",
            MAX_POOL
        )));
    }
    if amount.normalize().scale() > MAX_STAKE_SCALE {
        return Err(MarketError::InvalidArgument(format!(
            "amount supports at most {} decimal places",
            MAX_STAKE_SCALE
        )));
    }
    Ok(())
}
