//! Display odds derived from pool state.
//!
//! Odds are an inverse-proportion display metric (total pool / option pool),
//! recomputed on demand and never stored. They are not a payout formula.

use std::collections::BTreeMap;
use std::fmt;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Serialize, Serializer};

use super::ledger::PoolLedger;

/// Display odds for one option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Odds {
    /// Total pool divided by option pool, two decimal places.
    Multiplier(Decimal),
    /// Option has no stake yet.
    NotApplicable,
}

impl fmt::Display for Odds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Odds::Multiplier(m) => write!(f, "{}", m),
            Odds::NotApplicable => f.write_str("N/A"),
        }
    }
}

impl Serialize for Odds {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Round to two decimal places (half away from zero) with a fixed scale of 2.
pub fn to_cents(value: Decimal) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded
}

/// Odds for a single pool value given the total.
///
/// A ratio outside `Decimal` range has no meaningful display value and is
/// reported as not applicable.
pub fn odds_for(total: Decimal, pool: Decimal) -> Odds {
    if pool <= Decimal::ZERO {
        return Odds::NotApplicable;
    }

    total
        .checked_div(pool)
        .map_or(Odds::NotApplicable, |ratio| Odds::Multiplier(to_cents(ratio)))
}

/// Compute display odds for every option of a ledger.
pub fn compute_odds(ledger: &PoolLedger) -> BTreeMap<String, Odds> {
    let total = ledger.total();

    ledger
        .pools()
        .iter()
        .map(|(option, pool)| (option.clone(), odds_for(total, *pool)))
        .collect()
}
