//! Awesome Oscillator: SMA(5) of the median price minus SMA(34) of the median price.

use super::{rolling_mean, Indicator, PriceSource};
use crate::domain::Bar;

pub const AO_FAST_PERIOD: usize = 5;
pub const AO_SLOW_PERIOD: usize = 34;

#[derive(Debug, Clone, Default)]
pub struct AwesomeOscillator;

impl AwesomeOscillator {
    pub fn new() -> Self {
        Self
    }
}

impl Indicator for AwesomeOscillator {
    fn name(&self) -> &str {
        "awesome_oscillator"
    }

    fn lookback(&self) -> usize {
        AO_SLOW_PERIOD - 1
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let median = PriceSource::Median.series(bars);
        let fast = rolling_mean(&median, AO_FAST_PERIOD);
        let slow = rolling_mean(&median, AO_SLOW_PERIOD);
        fast.iter().zip(&slow).map(|(f, s)| f - s).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_bars, DEFAULT_EPSILON};

    #[test]
    fn flat_prices_give_zero() {
        let bars = make_bars(&[50.0; 40]);
        let ao = AwesomeOscillator::new().compute(&bars);
        assert!(ao[32].is_nan());
        for v in &ao[33..] {
            assert_approx(*v, 0.0, DEFAULT_EPSILON);
        }
    }

    #[test]
    fn rising_prices_give_positive_ao() {
        let closes: Vec<f64> = (0..40).map(|i| 100.0 + i as f64).collect();
        let ao = AwesomeOscillator::new().compute(&make_bars(&closes));
        assert!(ao[39] > 0.0);
    }
}
