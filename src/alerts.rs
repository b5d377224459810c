//! Whale activity alert registrations.
//!
//! Alerts are stored only; nothing watches the chain, so `triggered` stays
//! false.

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tracing::info;

use crate::error::AlertError;
use crate::market::lifecycle::new_id;
use crate::market::types::normalize_option;
use crate::metrics;

/// Triggers used when the caller gives none.
pub const DEFAULT_TRIGGERS: [&str; 3] = ["BUY", "SELL", "LARGE_TRANSFER"];

/// A registered alert.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    /// Alert ID.
    pub id: String,
    /// Agent to notify.
    pub agent_id: String,
    /// Watched whale.
    pub whale_address: String,
    /// Uppercased move types that fire the alert.
    pub trigger_on: Vec<String>,
    /// Callback URL.
    pub notify_url: Option<String>,
    /// Registration time.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// Whether the alert has fired.
    pub triggered: bool,
}

/// Request to register an alert.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAlert {
    /// Agent to notify (required).
    pub agent_id: Option<String>,
    /// Watched whale (required).
    pub whale_address: Option<String>,
    /// Move types; defaults to [`DEFAULT_TRIGGERS`].
    #[serde(default)]
    pub trigger_on: Option<Vec<String>>,
    /// Callback URL.
    #[serde(default)]
    pub notify_url: Option<String>,
}

/// In-memory alert store.
#[derive(Debug, Default)]
pub struct AlertRegistry {
    alerts: DashMap<String, Alert>,
}

impl AlertRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new alert.
    pub fn create(&self, request: CreateAlert) -> Result<Alert, AlertError> {
        let required = |value: Option<String>, name: &str| {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or_else(|| AlertError::InvalidArgument(format!("{} required", name)))
        };

        let agent_id = required(request.agent_id, "agentId")?;
        let whale_address = required(request.whale_address, "whaleAddress")?;

        let mut trigger_on: Vec<String> = Vec::new();
        for trigger in request.trigger_on.into_iter().flatten() {
            let trigger = normalize_option(&trigger);
            if !trigger.is_empty() && !trigger_on.contains(&trigger) {
                trigger_on.push(trigger);
            }
        }
        if trigger_on.is_empty() {
            trigger_on = DEFAULT_TRIGGERS.iter().map(|t| t.to_string()).collect();
        }

        let alert = Alert {
            id: new_id(6),
            agent_id,
            whale_address,
            trigger_on,
            notify_url: request.notify_url.filter(|u| !u.trim().is_empty()),
            created_at: OffsetDateTime::now_utc(),
            triggered: false,
        };

        self.alerts.insert(alert.id.clone(), alert.clone());
        metrics::inc_alerts_created();
        info!(id = %alert.id, whale = %alert.whale_address, "Alert created");

        Ok(alert)
    }

    /// An alert by id.
    pub fn get(&self, id: &str) -> Option<Alert> {
        self.alerts.get(id).map(|a| a.clone())
    }

    /// Number of alerts.
    pub fn len(&self) -> usize {
        self.alerts.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.alerts.is_empty()
    }
}
