//! Accelerator Oscillator: Awesome Oscillator minus its own 5-bar SMA.
//!
//! Measures acceleration of momentum. Crosses zero ahead of the AO and is the
//! default series for the zero-crossing rule.

use super::awesome::{AwesomeOscillator, AO_SLOW_PERIOD};
use super::{rolling_mean, Indicator};
use crate::domain::Bar;

pub const AC_SMOOTHING_PERIOD: usize = 5;

#[derive(Debug, Clone, Default)]
pub struct AcceleratorOscillator {
    awesome: AwesomeOscillator,
}

impl AcceleratorOscillator {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Indicator for AcceleratorOscillator {
    fn name(&self) -> &str {
        "accelerator_oscillator"
    }

    fn lookback(&self) -> usize {
        (AO_SLOW_PERIOD - 1) + (AC_SMOOTHING_PERIOD - 1)
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let ao = self.awesome.compute(bars);
        let smoothed = rolling_mean(&ao, AC_SMOOTHING_PERIOD);
        ao.iter().zip(&smoothed).map(|(a, s)| a - s).collect()
    }
}
