//! Application configuration loaded from environment variables.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::error::{Result, ServiceError};
use crate::market::{MarketSettings, PayoutModel};

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // === Market Parameters ===
    /// Payout model: "flat" or "parimutuel".
    #[serde(default = "default_payout_model")]
    pub payout_model: String,

    /// Stake multiplier paid to winners under the flat model (e.g., 2.5).
    #[serde(default = "default_payout_multiplier")]
    pub payout_multiplier: Decimal,

    /// Seconds from creation until a market expires.
    #[serde(default = "default_market_duration")]
    pub market_duration_secs: u64,

    /// Timeframe label used when the caller gives none.
    #[serde(default = "default_timeframe")]
    pub default_timeframe: String,

    /// Reject bets on markets past their expiry.
    #[serde(default)]
    pub enforce_expiry: bool,

    /// Seed the demo prediction at startup.
    #[serde(default = "default_true")]
    pub seed_demo: bool,

    // === Server Configuration ===
    /// HTTP server port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub rust_log: String,

    /// Enable verbose logging.
    #[serde(default)]
    pub verbose: bool,
}

fn default_payout_model() -> String {
    "flat".to_string()
}

fn default_payout_multiplier() -> Decimal {
    Decimal::new(25, 1) // 2.5
}

fn default_market_duration() -> u64 {
    86_400 // 24h
}

fn default_timeframe() -> String {
    "24h".to_string()
}

fn default_true() -> bool {
    true
}

fn default_port() -> u16 {
    3022
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            payout_model: default_payout_model(),
            payout_multiplier: default_payout_multiplier(),
            market_duration_secs: default_market_duration(),
            default_timeframe: default_timeframe(),
            enforce_expiry: false,
            seed_demo: default_true(),
            port: default_port(),
            rust_log: default_log_level(),
            verbose: false,
        }
    }
}

impl Config {
    /// Load configuration from environment, reading .env file first.
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();
        Ok(envy::from_env()?)
    }

    /// Check if the configuration is valid.
    pub fn validate(&self) -> Result<()> {
        self.payout_kind()?;

        if self.payout_multiplier <= Decimal::ZERO {
            return Err(invalid("PAYOUT_MULTIPLIER must be positive"));
        }

        if self.payout_multiplier > PayoutModel::MAX_MULTIPLIER {
            return Err(invalid(format!(
                "PAYOUT_MULTIPLIER must not exceed {}",
                PayoutModel::MAX_MULTIPLIER
            )));
        }

        if self.market_duration_secs == 0 {
            return Err(invalid("MARKET_DURATION_SECS must be at least 1"));
        }

        if self.default_timeframe.trim().is_empty() {
            return Err(invalid("DEFAULT_TIMEFRAME must not be empty"));
        }

        Ok(())
    }

    /// Parse the configured payout model name.
    fn payout_kind(&self) -> Result<PayoutKind> {
        PayoutKind::from_str(self.payout_model.trim()).map_err(|_| {
            invalid(format!(
                "PAYOUT_MODEL must be flat or parimutuel, got {}",
                self.payout_model
            ))
        })
    }

    /// Build the market engine settings.
    pub fn market_settings(&self) -> Result<MarketSettings> {
        self.validate()?;

        let payout = match self.payout_kind()? {
            PayoutKind::Flat => PayoutModel::Flat {
                multiplier: self.payout_multiplier,
            },
            PayoutKind::Parimutuel => PayoutModel::Parimutuel,
        };

        Ok(MarketSettings {
            payout,
            market_duration: time::Duration::seconds(self.market_duration_secs as i64),
            default_timeframe: self.default_timeframe.trim().to_string(),
            enforce_expiry: self.enforce_expiry,
        })
    }
}

fn invalid(message: impl Into<String>) -> ServiceError {
    ServiceError::InvalidConfig(message.into())
}

/// Payout model names accepted in `PAYOUT_MODEL`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::EnumString)]
enum PayoutKind {
    #[strum(serialize = "flat", serialize = "FLAT")]
    Flat,
    #[strum(
        serialize = "parimutuel",
        serialize = "pari-mutuel",
        serialize = "PARIMUTUEL"
    )]
    Parimutuel,
}
