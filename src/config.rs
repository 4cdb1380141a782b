//! Flow configuration.
//!
//! Values come from an optional JSON file, then `PAYER_FLOW_*` environment
//! variables, then validation.

use crate::error::{FlowError, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FlowConfig {
    /// Failed verifications allowed before the flow is blocked.
    pub max_attempts: u32,
    /// How long a stored verification lets a returning payer skip KYC.
    pub validity_window_days: i64,
    /// Upper bound for each verifier or bank call.
    pub external_call_timeout_ms: u64,
    /// Lifetime of the desktop QR handoff page.
    pub handoff_timeout_minutes: i64,
    /// Base URL encoded in the desktop QR code.
    pub handoff_base_url: String,
    pub simulator: SimulatorConfig,
}

/// Substrings that make the simulated verifier reject a record.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SimulatorConfig {
    pub name_triggers: Vec<String>,
    pub postal_triggers: Vec<String>,
    pub address_markers: Vec<String>,
    pub latency_ms: u64,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            validity_window_days: 180,
            external_call_timeout_ms: 30_000,
            handoff_timeout_minutes: 10,
            handoff_base_url: "https://pay.example.com/flow".to_string(),
            simulator: SimulatorConfig::default(),
        }
    }
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            name_triggers: vec!["fail".to_string(), "bob".to_string()],
            postal_triggers: vec!["fail".to_string()],
            address_markers: vec!["mismatch".to_string()],
            latency_ms: 0,
        }
    }
}

impl FlowConfig {
    /// Loads the file (if any), applies environment overrides and validates.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Applies `PAYER_FLOW_*` overrides from the given lookup.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup("PAYER_FLOW_MAX_ATTEMPTS") {
            self.max_attempts = parse_var("PAYER_FLOW_MAX_ATTEMPTS", &value)?;
        }
        if let Some(value) = lookup("PAYER_FLOW_VALIDITY_WINDOW_DAYS") {
            self.validity_window_days = parse_var("PAYER_FLOW_VALIDITY_WINDOW_DAYS", &value)?;
        }
        if let Some(value) = lookup("PAYER_FLOW_EXTERNAL_CALL_TIMEOUT_MS") {
            self.external_call_timeout_ms =
                parse_var("PAYER_FLOW_EXTERNAL_CALL_TIMEOUT_MS", &value)?;
        }
        if let Some(value) = lookup("PAYER_FLOW_HANDOFF_TIMEOUT_MINUTES") {
            self.handoff_timeout_minutes =
                parse_var("PAYER_FLOW_HANDOFF_TIMEOUT_MINUTES", &value)?;
        }
        if let Some(value) = lookup("PAYER_FLOW_SIMULATOR_LATENCY_MS") {
            self.simulator.latency_ms = parse_var("PAYER_FLOW_SIMULATOR_LATENCY_MS", &value)?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_attempts == 0 {
            return Err(FlowError::ValidationError(
                "maxAttempts must be at least 1".to_string(),
            ));
        }
        if self.validity_window_days < 0 {
            return Err(FlowError::ValidationError(
                "validityWindowDays cannot be negative".to_string(),
            ));
        }
        if chrono::Duration::try_days(self.validity_window_days).is_none() {
            return Err(FlowError::ValidationError(format!(
                "validityWindowDays is out of range: {}",
                self.validity_window_days
            )));
        }
        if self.external_call_timeout_ms == 0 {
            return Err(FlowError::ValidationError(
                "externalCallTimeoutMs must be positive".to_string(),
            ));
        }
        if self.handoff_timeout_minutes <= 0 {
            return Err(FlowError::ValidationError(
                "handoffTimeoutMinutes must be positive".to_string(),
            ));
        }
        if chrono::Duration::try_minutes(self.handoff_timeout_minutes).is_none() {
            return Err(FlowError::ValidationError(format!(
                "handoffTimeoutMinutes is out of range: {}",
                self.handoff_timeout_minutes
            )));
        }
        Ok(())
    }

    /// Saturates at the largest representable duration; `validate` rejects
    /// values that would need to.
    pub fn validity_window(&self) -> chrono::Duration {
        chrono::Duration::try_days(self.validity_window_days).unwrap_or(chrono::Duration::MAX)
    }

    pub fn external_call_timeout(&self) -> Duration {
        Duration::from_millis(self.external_call_timeout_ms)
    }

    pub fn handoff_timeout(&self) -> chrono::Duration {
        chrono::Duration::try_minutes(self.handoff_timeout_minutes).unwrap_or(chrono::Duration::MAX)
    }
}

fn parse_var<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value.trim().parse().map_err(|_| {
        FlowError::ValidationError(format!("{} has an invalid value: {}", key, value))
    })
}
