//! Unified error types for the prediction market service.

use thiserror::Error;

/// Unified error type for the service.
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Configuration loading error.
    #[error("configuration error: {0}")]
    Config(#[from] envy::Error),

    /// Invalid configuration values.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Prediction market error.
    #[error("market error: {0}")]
    Market(#[from] MarketError),
}

/// Prediction market errors.
///
/// All of these are caller misuse, never transient: retrying the same
/// request yields the same error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MarketError {
    /// A required field is missing or malformed.
    #[error("{0}")]
    InvalidArgument(String),

    /// No market with the given id.
    #[error("prediction {id} not found")]
    NotFound {
        /// The unknown market id.
        id: String,
    },

    /// Bet attempted on a market that no longer accepts bets.
    #[error("prediction {id} is closed")]
    MarketClosed {
        /// The closed market id.
        id: String,
    },

    /// Second resolution attempt.
    #[error("prediction {id} is already resolved")]
    AlreadyResolved {
        /// The resolved market id.
        id: String,
    },

    /// Move is not one of the market's options.
    #[error("unknown option {option}, expected one of [{}]", .allowed.join(", "))]
    InvalidOption {
        /// The rejected (normalized) option.
        option: String,
        /// The market's option set.
        allowed: Vec<String>,
    },
}

impl MarketError {
    /// Short machine-readable label, used for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            MarketError::InvalidArgument(_) => "invalid_argument",
            MarketError::NotFound { .. } => "not_found",
            MarketError::MarketClosed { .. } => "market_closed",
            MarketError::AlreadyResolved { .. } => "already_resolved",
            MarketError::InvalidOption { .. } => "invalid_option",
        }
    }
}

/// Alert registration errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AlertError {
    /// A required field is missing or malformed.
    #[error("{0}")]
    InvalidArgument(String),
}

/// Convenient Result type alias.
pub type Result<T> = std::result::Result<T, ServiceError>;
