//! Winner selection and payout computation.

use rust_decimal::Decimal;

use super::ledger::PoolLedger;
use super::odds::to_cents;
use super::types::Winner;
use crate::error::MarketError;

/// How winners are paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayoutModel {
    /// Every winner receives `stake * multiplier`, regardless of pool balance.
    ///
    /// Not market-accurate: total payouts can exceed or fall short of the pool.
    Flat {
        /// Stake multiplier (2.5 by default).
        multiplier: Decimal,
    },
    /// Winners split the whole pool in proportion to their stake.
    Parimutuel,
}

impl PayoutModel {
    /// The default flat 2.5x model.
    pub const DEFAULT_MULTIPLIER: Decimal = Decimal::from_parts(25, 0, 0, false, 1);

    /// Largest flat multiplier accepted from configuration.
    pub const MAX_MULTIPLIER: Decimal = Decimal::from_parts(1000, 0, 0, false, 0);

    /// Payout for a single winning stake, or `None` if it leaves `Decimal` range.
    pub fn payout(
        &self,
        stake: Decimal,
        total_pool: Decimal,
        winning_pool: Decimal,
    ) -> Option<Decimal> {
        let amount = match self {
            PayoutModel::Flat { multiplier } => stake.checked_mul(*multiplier)?,
            PayoutModel::Parimutuel => {
                if winning_pool.is_zero() {
                    Decimal::ZERO
                } else {
                    stake.checked_div(winning_pool)?.checked_mul(total_pool)?
                }
            }
        };
        Some(to_cents(amount))
    }
}

impl Default for PayoutModel {
    fn default() -> Self {
        PayoutModel::Flat {
            multiplier: Self::DEFAULT_MULTIPLIER,
        }
    }
}

/// Collect the winning bets for `actual_move` with their payouts, in bet order.
pub fn compute_winners(
    ledger: &PoolLedger,
    actual_move: &str,
    model: PayoutModel,
) -> Result<Vec<Winner>, MarketError> {
    let total_pool = ledger.total();
    let winning_pool = ledger.pool(actual_move);

    ledger
        .bets_on(actual_move)
        .map(|bet| {
            let payout = model
                .payout(bet.amount, total_pool, winning_pool)
                .ok_or_else(|| {
                    MarketError::InvalidArgument(format!(
                        "payout for bet {} is out of range",
                        bet.id
                    ))
                })?;

            Ok(Winner {
                agent_id: bet.agent_id.clone(),
                bet: bet.amount,
                payout,
            })
        })
        .collect()
}
