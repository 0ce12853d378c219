use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Instrument metadata needed to turn lots and pips into native units.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SymbolSpec {
    pub name: String,
    /// Instrument units per lot (100 000 for a standard FX lot).
    #[serde(default = "default_lot_size")]
    pub lot_size: f64,
    /// Price distance of one pip.
    #[serde(default = "default_pip_size")]
    pub pip_size: f64,
    /// Smallest tradable volume increment, in units.
    #[serde(default = "default_volume_step")]
    pub volume_step: f64,
}

fn default_lot_size() -> f64 {
    100_000.0
}

fn default_pip_size() -> f64 {
    0.0001
}

fn default_volume_step() -> f64 {
    1_000.0
}

impl Default for SymbolSpec {
    fn default() -> Self {
        Self {
            name: "EURUSD".into(),
            lot_size: default_lot_size(),
            pip_size: default_pip_size(),
            volume_step: default_volume_step(),
        }
    }
}

impl SymbolSpec {
    pub fn validate(&self) -> Result<(), SymbolError> {
        for (field, value) in [
            ("lot_size", self.lot_size),
            ("pip_size", self.pip_size),
            ("volume_step", self.volume_step),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(SymbolError::NonPositive { field, value });
            }
        }
        Ok(())
    }

    /// Convert lots to instrument units, rounded down to the volume step.
    ///
    /// Fails when the rounded volume is zero: the order could never be placed.
    pub fn lots_to_units(&self, lots: f64) -> Result<f64, SymbolError> {
        let units = lots * self.lot_size;
        // Tolerate float noise like 0.01 * 100_000 = 999.9999999
        let steps = (units / self.volume_step + 1e-9).floor();
        let rounded = steps * self.volume_step;
        if !(rounded.is_finite() && rounded > 0.0) {
            return Err(SymbolError::VolumeBelowStep {
                lots,
                units,
                volume_step: self.volume_step,
            });
        }
        Ok(rounded)
    }

    /// Price distance covered by `pips`.
    pub fn pips_to_price(&self, pips: f64) -> f64 {
        pips * self.pip_size
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum SymbolError {
    #[error("{field} must be positive, got {value}")]
    NonPositive { field: &'static str, value: f64 },

    #[error("{lots} lots is {units} units, below the volume step {volume_step}")]
    VolumeBelowStep {
        lots: f64,
        units: f64,
        volume_step: f64,
    },
}
