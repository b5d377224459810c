//! Demo prediction seeded at startup.

use rust_decimal_macros::dec;
use tracing::info;

use super::lifecycle::MarketManager;
use super::types::{CreateMarket, Market, PlaceBet};
use crate::error::Result;

/// Fixed id of the demo prediction.
pub const DEMO_MARKET_ID: &str = "demo-whale-prediction";

/// Whale the demo prediction is about.
pub const DEMO_WHALE_ADDRESS: &str = "Wha1e444444444444444444444444444444444444444";

/// Create the demo prediction and place its bets through the normal ledger.
///
/// Resulting pools: BUY 500, SELL 200, TRANSFER_TO_CEX 100, HOLD 50.
pub fn seed_demo(manager: &MarketManager) -> Result<Market> {
    manager.create_with_id(
        DEMO_MARKET_ID,
        CreateMarket::for_whale(DEMO_WHALE_ADDRESS).with_alias("Mysterious Accumulator"),
    )?;

    let bets = [
        PlaceBet::new("whale-follower", "BUY", dec!(300))
            .with_reasoning("Pattern shows accumulation"),
        PlaceBet::new("contrarian-bot", "SELL", dec!(200))
            .with_reasoning("Too much buying, due for profit take"),
        PlaceBet::new("momentum-bot", "BUY", dec!(200)).with_reasoning("Five buys in a row"),
        PlaceBet::new("cex-watcher", "TRANSFER_TO_CEX", dec!(100))
            .with_reasoning("Exchange deposits ticking up"),
        PlaceBet::new("patient-holder", "HOLD", dec!(50)).with_reasoning("Whales sit tight"),
    ];

    for bet in bets {
        manager.place_bet(DEMO_MARKET_ID, bet)?;
    }

    let market = manager.get(DEMO_MARKET_ID)?;
    info!(id = %market.id, total_pool = %market.total_pool(), "Demo prediction seeded");
    Ok(market)
}
