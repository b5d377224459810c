//! Market lifecycle: creation, bet placement, resolution and listing.

use std::sync::Arc;

use time::OffsetDateTime;
use tracing::{debug, info, instrument};

use super::ledger::{check_stake, PoolLedger};
use super::odds::compute_odds;
use super::payout::{compute_winners, PayoutModel};
use super::registry::MarketRegistry;
use super::types::{
    Bet, BetReceipt, CreateMarket, Market, MarketStats, MarketStatus, MarketSummary,
    OddsSnapshot, PlaceBet, Resolution, ResolveMarket, ResolvedMarket, DEFAULT_OPTIONS,
};
use crate::error::MarketError;
use crate::metrics;

/// Alias used when the whale directory does not know the address.
pub const UNKNOWN_WHALE_ALIAS: &str = "Unknown Whale";

/// Engine settings.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketSettings {
    /// How winners are paid.
    pub payout: PayoutModel,
    /// Time from creation until expiry.
    pub market_duration: time::Duration,
    /// Timeframe label when the caller gives none.
    pub default_timeframe: String,
    /// Reject bets after expiry.
    pub enforce_expiry: bool,
}

impl Default for MarketSettings {
    fn default() -> Self {
        Self {
            payout: PayoutModel::default(),
            market_duration: time::Duration::hours(24),
            default_timeframe: "24h".to_string(),
            enforce_expiry: false,
        }
    }
}

/// Owns market creation, state transitions and payout computation.
#[derive(Debug, Clone)]
pub struct MarketManager {
    registry: Arc<MarketRegistry>,
    settings: MarketSettings,
}

impl MarketManager {
    /// Create a manager over a fresh, empty registry.
    pub fn new(settings: MarketSettings) -> Self {
        Self::with_registry(Arc::new(MarketRegistry::new()), settings)
    }

    /// Create a manager over an existing registry.
    pub fn with_registry(registry: Arc<MarketRegistry>, settings: MarketSettings) -> Self {
        Self { registry, settings }
    }

    /// The underlying registry.
    pub fn registry(&self) -> &MarketRegistry {
        &self.registry
    }

    /// Engine settings.
    pub fn settings(&self) -> &MarketSettings {
        &self.settings
    }

    /// Create a new open market with a fresh id.
    #[instrument(skip(self, request), fields(whale = ?request.whale_address))]
    pub fn create(&self, request: CreateMarket) -> Result<Market, MarketError> {
        let now = OffsetDateTime::now_utc();

        loop {
            let market = self.build(new_id(8), request.clone(), now)?;
            if self.registry.insert_new(market.clone()) {
                metrics::inc_markets_created();
                info!(id = %market.id, alias = %market.whale_alias, "Prediction created");
                return Ok(market);
            }
            debug!(id = %market.id, "Market id collision, regenerating");
        }
    }

    /// Create a market under a fixed id, replacing any market with that id.
    pub fn create_with_id(
        &self,
        id: impl Into<String>,
        request: CreateMarket,
    ) -> Result<Market, MarketError> {
        let market = self.build(id.into(), request, OffsetDateTime::now_utc())?;
        self.registry.insert(market.clone());
        metrics::inc_markets_created();
        info!(id = %market.id, alias = %market.whale_alias, "Prediction created");
        Ok(market)
    }

    fn build(
        &self,
        id: String,
        request: CreateMarket,
        now: OffsetDateTime,
    ) -> Result<Market, MarketError> {
        let whale_address = non_blank(request.whale_address)
            .ok_or_else(|| MarketError::InvalidArgument("whaleAddress required".to_string()))?;

        let ledger = match request.options {
            Some(options) => PoolLedger::new(options)?,
            None => PoolLedger::new(DEFAULT_OPTIONS)?,
        };

        let timeframe =
            non_blank(request.timeframe).unwrap_or_else(|| self.settings.default_timeframe.clone());

        let whale_alias = non_blank(request.whale_alias);
        let question = non_blank(request.question).unwrap_or_else(|| match &whale_alias {
            Some(alias) => format!("What will {} do in the next {}?", alias, timeframe),
            None => "What will this whale do next?".to_string(),
        });

        Ok(Market {
            id,
            whale_address,
            whale_alias: whale_alias.unwrap_or_else(|| UNKNOWN_WHALE_ALIAS.to_string()),
            question,
            ledger,
            status: MarketStatus::Open,
            timeframe,
            created_at: now,
            expires_at: now + self.settings.market_duration,
            result: None,
        })
    }

    /// Snapshot of a market.
    pub fn get(&self, id: &str) -> Result<Market, MarketError> {
        self.registry.get(id).ok_or_else(|| not_found(id))
    }

    /// Place a bet on an open market.
    ///
    /// The bet append and pool increment happen under the market's exclusive
    /// guard, so readers never see one without the other.
    #[instrument(skip(self, request), fields(agent = ?request.agent_id))]
    pub fn place_bet(&self, id: &str, request: PlaceBet) -> Result<BetReceipt, MarketError> {
        let _timer = metrics::timer_place_bet();
        let now = OffsetDateTime::now_utc();
        let enforce_expiry = self.settings.enforce_expiry;

        let receipt = self
            .registry
            .update(id, |market| {
                if !market.is_open() || (enforce_expiry && market.is_expired_at(now)) {
                    return Err(MarketError::MarketClosed { id: market.id.clone() });
                }

                let (Some(agent_id), Some(predicted_move), Some(amount)) = (
                    non_blank(request.agent_id),
                    non_blank(request.predicted_move),
                    request.amount,
                ) else {
                    return Err(MarketError::InvalidArgument(
                        "agentId, predictedMove, and amount required".to_string(),
                    ));
                };

                check_stake(amount)?;

                let predicted_move = market.ledger.resolve_option(&predicted_move)?;

                let bet = Bet {
                    id: new_id(4),
                    agent_id,
                    predicted_move,
                    amount,
                    reasoning: request.reasoning.unwrap_or_default(),
                    timestamp: now,
                };
                market.ledger.record(bet.clone())?;

                Ok(BetReceipt {
                    bet,
                    total_pool: market.ledger.total(),
                    current_odds: compute_odds(&market.ledger),
                })
            })
            .ok_or_else(|| not_found(id))??;

        metrics::inc_bets_placed();
        info!(
            market = %id,
            bet = %receipt.bet.id,
            predicted_move = %receipt.bet.predicted_move,
            amount = %receipt.bet.amount,
            total_pool = %receipt.total_pool,
            "Bet placed"
        );

        Ok(receipt)
    }

    /// Resolve an open market against the observed move and compute winners.
    ///
    /// Resolution is terminal: a second call fails with `AlreadyResolved` and
    /// leaves the first result untouched.
    #[instrument(skip(self, request), fields(actual_move = ?request.actual_move))]
    pub fn resolve(&self, id: &str, request: ResolveMarket) -> Result<ResolvedMarket, MarketError> {
        let payout = self.settings.payout;

        let resolved = self
            .registry
            .update(id, |market| {
                if market.status == MarketStatus::Resolved {
                    return Err(MarketError::AlreadyResolved { id: market.id.clone() });
                }

                let actual_move = non_blank(request.actual_move)
                    .ok_or_else(|| MarketError::InvalidArgument("actualMove required".to_string()))?;
                let actual_move = market.ledger.resolve_option(&actual_move)?;

                let winners = compute_winners(&market.ledger, &actual_move, payout)?;

                market.result = Some(Resolution {
                    actual_move,
                    tx_signature: non_blank(request.tx_signature),
                    resolved_at: OffsetDateTime::now_utc(),
                });
                market.status = MarketStatus::Resolved;

                Ok(ResolvedMarket {
                    prediction: market.clone(),
                    winners,
                })
            })
            .ok_or_else(|| not_found(id))??;

        metrics::inc_markets_resolved();
        info!(
            market = %id,
            winners = resolved.winners.len(),
            total_pool = %resolved.prediction.total_pool(),
            "Prediction resolved"
        );

        Ok(resolved)
    }

    /// Open markets with pool totals and participant counts, in creation order.
    pub fn list_open(&self) -> Vec<MarketSummary> {
        self.registry
            .filter(Market::is_open)
            .into_iter()
            .map(MarketSummary::from)
            .collect()
    }

    /// Current display odds for a market.
    pub fn odds(&self, id: &str) -> Result<OddsSnapshot, MarketError> {
        self.registry
            .view(id, |market| OddsSnapshot {
                total_pool: market.ledger.total(),
                current_odds: compute_odds(&market.ledger),
            })
            .ok_or_else(|| not_found(id))
    }

    /// Market counts.
    pub fn stats(&self) -> MarketStats {
        let open = self.registry.count(Market::is_open);
        let total = self.registry.len();

        MarketStats {
            total,
            open,
            resolved: total.saturating_sub(open),
        }
    }
}

fn not_found(id: &str) -> MarketError {
    MarketError::NotFound { id: id.to_string() }
}

/// Trimmed value, or `None` if missing or blank.
fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Byte positions of a v4 UUID that carry no version or variant bits.
const UUID_RANDOM_BYTES: [usize; 14] = [0, 1, 2, 3, 4, 5, 7, 9, 10, 11, 12, 13, 14, 15];

/// Random hex id of `bytes` bytes (at most 14).
pub fn new_id(bytes: usize) -> String {
    let uuid = uuid::Uuid::new_v4();
    let raw = uuid.as_bytes();
    let random: Vec<u8> = UUID_RANDOM_BYTES
        .iter()
        .take(bytes)
        .map(|&i| raw[i])
        .collect();
    hex::encode(random)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::ledger::MAX_POOL;
    use crate::market::odds::Odds;
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    const WHALE: &str = "Wha1e444444444444444444444444444444444444444";

    fn manager() -> MarketManager {
        MarketManager::new(MarketSettings::default())
    }

    fn open_market(manager: &MarketManager) -> Market {
        manager.create(CreateMarket::for_whale(WHALE)).unwrap()
    }

    #[test]
    fn create_applies_defaults() {
        let manager = manager();
        let market = open_market(&manager);

        assert_eq!(market.id.len(), 16);
        assert_eq!(market.whale_alias, UNKNOWN_WHALE_ALIAS);
        assert_eq!(market.question, "What will this whale do next?");
        assert_eq!(market.ledger.options(), &DEFAULT_OPTIONS);
        assert!(market.ledger.pools().values().all(|v| v.is_zero()));
        assert!(market.ledger.bets().is_empty());
        assert_eq!(market.status, MarketStatus::Open);
        assert_eq!(market.timeframe, "24h");
        assert_eq!(market.expires_at - market.created_at, time::Duration::hours(24));
        assert!(market.result.is_none());
        assert_eq!(manager.get(&market.id).unwrap(), market);
    }

    #[test]
    fn create_uses_alias_and_custom_options() {
        let manager = manager();
        let market = manager
            .create(
                CreateMarket::for_whale(WHALE)
                    .with_alias("Mysterious Accumulator")
                    .with_options(["stake", "unstake"]),
            )
            .unwrap();

        assert_eq!(market.question, "What will Mysterious Accumulator do in the next 24h?");
        assert_eq!(market.ledger.options(), &["STAKE", "UNSTAKE"]);
    }

    #[test]
    fn create_requires_whale_address() {
        let manager = manager();

        let err = manager.create(CreateMarket::default()).unwrap_err();
        assert!(matches!(err, MarketError::InvalidArgument(_)));

        let err = manager.create(CreateMarket::for_whale("   ")).unwrap_err();
        assert!(matches!(err, MarketError::InvalidArgument(_)));
        assert!(manager.registry().is_empty());
    }

    #[test]
    fn place_bet_updates_pool_and_returns_odds() {
        let manager = manager();
        let market = open_market(&manager);

        manager
            .place_bet(&market.id, PlaceBet::new("agentA", "BUY", dec!(300)))
            .unwrap();
        let receipt = manager
            .place_bet(
                &market.id,
                PlaceBet::new("agentB", "sell", dec!(200)).with_reasoning("profit take"),
            )
            .unwrap();

        assert_eq!(receipt.bet.predicted_move, "SELL");
        assert_eq!(receipt.bet.reasoning, "profit take");
        assert_eq!(receipt.total_pool, dec!(500));
        assert_eq!(receipt.current_odds["BUY"], Odds::Multiplier(dec!(1.67)));
        assert_eq!(receipt.current_odds["SELL"], Odds::Multiplier(dec!(2.50)));
        assert_eq!(receipt.current_odds["HOLD"], Odds::NotApplicable);

        let stored = manager.get(&market.id).unwrap();
        assert_eq!(stored.participant_count(), 2);
        assert!(stored.ledger.is_consistent());
    }

    #[test]
    fn total_pool_is_sum_of_stakes() {
        let manager = manager();
        let market = open_market(&manager);
        let amounts = [dec!(1), dec!(2.5), dec!(10), dec!(0.01), dec!(99)];

        for (i, amount) in amounts.iter().enumerate() {
            let option = DEFAULT_OPTIONS[i % DEFAULT_OPTIONS.len()];
            manager
                .place_bet(&market.id, PlaceBet::new(format!("agent{i}"), option, *amount))
                .unwrap();
        }

        let expected: Decimal = amounts.iter().copied().sum();
        assert_eq!(manager.get(&market.id).unwrap().total_pool(), expected);
    }

    #[test]
    fn place_bet_validates_arguments() {
        let manager = manager();
        let market = open_market(&manager);

        let missing_agent = PlaceBet {
            agent_id: None,
            ..PlaceBet::new("x", "BUY", dec!(1))
        };
        let missing_amount = PlaceBet {
            amount: None,
            ..PlaceBet::new("x", "BUY", dec!(1))
        };

        for request in [
            missing_agent,
            missing_amount,
            PlaceBet::new("x", "", dec!(1)),
            PlaceBet::new("x", "BUY", Decimal::ZERO),
            PlaceBet::new("x", "BUY", dec!(-3)),
        ] {
            let err = manager.place_bet(&market.id, request).unwrap_err();
            assert!(matches!(err, MarketError::InvalidArgument(_)), "{err:?}");
        }

        let err = manager
            .place_bet(&market.id, PlaceBet::new("x", "moon", dec!(1)))
            .unwrap_err();
        assert!(matches!(err, MarketError::InvalidOption { ref option, .. } if option == "MOON"));

        let stored = manager.get(&market.id).unwrap();
        assert!(stored.ledger.bets().is_empty());
        assert_eq!(stored.ledger.pools().len(), 4);
    }

    #[test]
    fn place_bet_on_unknown_market_is_not_found() {
        let err = manager()
            .place_bet("nope", PlaceBet::new("a", "BUY", dec!(1)))
            .unwrap_err();
        assert_eq!(err, MarketError::NotFound { id: "nope".to_string() });
    }

    #[test]
    fn resolve_pays_flat_multiplier_to_winners() {
        let manager = manager();
        let market = open_market(&manager);
        manager
            .place_bet(&market.id, PlaceBet::new("agentA", "BUY", dec!(300)))
            .unwrap();
        manager
            .place_bet(&market.id, PlaceBet::new("agentB", "SELL", dec!(200)))
            .unwrap();

        let resolved = manager
            .resolve(&market.id, ResolveMarket::new("buy").with_tx_signature("5xSig"))
            .unwrap();

        assert_eq!(resolved.prediction.status, MarketStatus::Resolved);
        assert_eq!(resolved.winners.len(), 1);
        assert_eq!(resolved.winners[0].agent_id, "agentA");
        assert_eq!(resolved.winners[0].bet, dec!(300));
        assert_eq!(resolved.winners[0].payout, dec!(750.00));

        let result = resolved.prediction.result.unwrap();
        assert_eq!(result.actual_move, "BUY");
        assert_eq!(result.tx_signature.as_deref(), Some("5xSig"));
    }

    #[test]
    fn bets_after_resolution_are_rejected_without_side_effects() {
        let manager = manager();
        let market = open_market(&manager);
        manager
            .place_bet(&market.id, PlaceBet::new("agentA", "BUY", dec!(300)))
            .unwrap();
        manager.resolve(&market.id, ResolveMarket::new("SELL")).unwrap();
        let before = manager.get(&market.id).unwrap();

        let err = manager
            .place_bet(&market.id, PlaceBet::new("agentB", "SELL", dec!(50)))
            .unwrap_err();

        assert_eq!(err, MarketError::MarketClosed { id: market.id.clone() });
        assert_eq!(manager.get(&market.id).unwrap(), before);
    }

    #[test]
    fn second_resolution_is_rejected_and_keeps_first_result() {
        let manager = manager();
        let market = open_market(&manager);
        let first = manager.resolve(&market.id, ResolveMarket::new("HOLD")).unwrap();

        let err = manager.resolve(&market.id, ResolveMarket::new("BUY")).unwrap_err();

        assert_eq!(err, MarketError::AlreadyResolved { id: market.id.clone() });
        assert_eq!(manager.get(&market.id).unwrap().result, first.prediction.result);
    }

    #[test]
    fn resolve_validates_actual_move() {
        let manager = manager();
        let market = open_market(&manager);

        assert!(matches!(
            manager.resolve(&market.id, ResolveMarket::default()),
            Err(MarketError::InvalidArgument(_))
        ));
        assert!(matches!(
            manager.resolve(&market.id, ResolveMarket::new("moon")),
            Err(MarketError::InvalidOption { .. })
        ));
        assert!(manager.get(&market.id).unwrap().is_open());
        assert!(matches!(
            manager.resolve("nope", ResolveMarket::new("BUY")),
            Err(MarketError::NotFound { .. })
        ));
    }

    #[test]
    fn parimutuel_settings_split_the_pool() {
        let manager = MarketManager::new(MarketSettings {
            payout: PayoutModel::Parimutuel,
            ..MarketSettings::default()
        });
        let market = open_market(&manager);
        manager
            .place_bet(&market.id, PlaceBet::new("agentA", "BUY", dec!(300)))
            .unwrap();
        manager
            .place_bet(&market.id, PlaceBet::new("agentB", "SELL", dec!(200)))
            .unwrap();

        let resolved = manager.resolve(&market.id, ResolveMarket::new("BUY")).unwrap();

        assert_eq!(resolved.winners[0].payout, dec!(500.00));
    }

    #[test]
    fn enforced_expiry_closes_expired_markets() {
        let manager = MarketManager::new(MarketSettings {
            market_duration: time::Duration::ZERO,
            enforce_expiry: true,
            ..MarketSettings::default()
        });
        let market = open_market(&manager);

        let err = manager
            .place_bet(&market.id, PlaceBet::new("agentA", "BUY", dec!(1)))
            .unwrap_err();
        assert!(matches!(err, MarketError::MarketClosed { .. }));
    }

    #[test]
    fn advisory_expiry_still_accepts_bets() {
        let manager = MarketManager::new(MarketSettings {
            market_duration: time::Duration::ZERO,
            ..MarketSettings::default()
        });
        let market = open_market(&manager);

        assert!(manager
            .place_bet(&market.id, PlaceBet::new("agentA", "BUY", dec!(1)))
            .is_ok());
        assert!(manager.list_open()[0].expired);
    }

    #[test]
    fn list_open_skips_resolved_and_keeps_creation_order() {
        let manager = manager();
        let first = open_market(&manager);
        let second = open_market(&manager);
        let third = open_market(&manager);
        manager
            .place_bet(&third.id, PlaceBet::new("agentA", "HOLD", dec!(40)))
            .unwrap();
        manager.resolve(&second.id, ResolveMarket::new("BUY")).unwrap();

        let open = manager.list_open();

        let ids: Vec<&str> = open.iter().map(|s| s.market.id.as_str()).collect();
        assert_eq!(ids, vec![first.id.as_str(), third.id.as_str()]);
        assert_eq!(open[1].total_pool, dec!(40));
        assert_eq!(open[1].participant_count, 1);
        assert_eq!(
            manager.stats(),
            MarketStats {
                total: 3,
                open: 2,
                resolved: 1
            }
        );
    }

    #[test]
    fn odds_on_demand() {
        let manager = manager();
        let market = open_market(&manager);
        manager
            .place_bet(&market.id, PlaceBet::new("agentA", "BUY", dec!(10)))
            .unwrap();

        let snapshot = manager.odds(&market.id).unwrap();
        assert_eq!(snapshot.total_pool, dec!(10));
        assert_eq!(snapshot.current_odds["BUY"], Odds::Multiplier(dec!(1.00)));
        assert!(manager.odds("nope").is_err());
    }

    #[test]
    fn new_id_is_hex_of_requested_length() {
        let id = new_id(4);
        assert_eq!(id.len(), 8);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(new_id(8), new_id(8));
    }

    #[test]
    fn new_id_skips_uuid_version_nibble() {
        let ids: Vec<String> = (0..64).map(|_| new_id(8)).collect();

        assert!(ids.iter().all(|id| id.len() == 16));
        assert!(ids.iter().any(|id| &id[12..13] != "4"));
        assert_eq!(new_id(32).len(), 28);
    }

    #[test]
    fn oversized_bet_is_rejected_and_market_stays_usable() {
        let manager = manager();
        let market = open_market(&manager);
        let other = open_market(&manager);
        let huge = dec!(50000000000000000000000000000);

        assert!(matches!(
            manager.place_bet(&market.id, PlaceBet::new("a", "BUY", huge)),
            Err(MarketError::InvalidArgument(_))
        ));

        manager
            .place_bet(&market.id, PlaceBet::new("a", "BUY", MAX_POOL))
            .unwrap();
        assert!(matches!(
            manager.place_bet(&market.id, PlaceBet::new("b", "SELL", dec!(1))),
            Err(MarketError::InvalidArgument(_))
        ));

        let market_now = manager.get(&market.id).unwrap();
        assert_eq!(market_now.participant_count(), 1);
        assert_eq!(market_now.total_pool(), MAX_POOL);
        assert_eq!(manager.list_open().len(), 2);
        assert!(manager.odds(&other.id).is_ok());

        let resolved = manager.resolve(&market.id, ResolveMarket::new("BUY")).unwrap();
        assert_eq!(resolved.winners[0].payout, MAX_POOL * dec!(2.5));
        assert_eq!(manager.list_open().len(), 1);
    }
}
