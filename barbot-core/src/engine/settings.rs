//! Resolved per-instance engine settings.

use serde::{Deserialize, Serialize};

/// Immutable settings of one engine instance, resolved from configuration once
/// at startup. Volume is already in instrument units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineSettings {
    pub label: String,
    pub volume_units: f64,
    pub stop_loss_pips: f64,
    pub take_profit_pips: f64,
}

impl EngineSettings {
    pub fn new(
        label: impl Into<String>,
        volume_units: f64,
        stop_loss_pips: f64,
        take_profit_pips: f64,
    ) -> Self {
        Self {
            label: label.into(),
            volume_units,
            stop_loss_pips,
            take_profit_pips,
        }
    }
}
