//! Weighted Moving Average (WMA).
//!
//! Linearly weighted mean: the newest bar in the window has weight `period`,
//! the oldest weight 1. Lookback: period - 1.

use super::{Indicator, PriceSource};
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct Wma {
    period: usize,
    source: PriceSource,
    name: String,
}

impl Wma {
    pub fn new(source: PriceSource, period: usize) -> Self {
        // callers validate periods; `EngineConfig::validate` rejects 0
        debug_assert!(period >= 1, "WMA period must be >= 1");
        Self {
            period,
            source,
            name: format!("wma_{}_{period}", source.as_str()),
        }
    }
}

impl Indicator for Wma {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period.saturating_sub(1)
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let prices = self.source.series(bars);
        let n = prices.len();
        let mut result = vec![f64::NAN; n];
        if n < self.period {
            return result;
        }

        let denominator = (self.period * (self.period + 1)) as f64 / 2.0;
        for i in (self.period - 1)..n {
            let window = &prices[(i + 1 - self.period)..=i];
            // NaN in the window propagates through the sum
            let weighted: f64 = window
                .iter()
                .enumerate()
                .map(|(k, p)| (k + 1) as f64 * p)
                .sum();
            result[i] = weighted / denominator;
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_bars, DEFAULT_EPSILON};

    #[test]
    fn wma_3_basic() {
        let bars = make_bars(&[1.0, 2.0, 3.0, 4.0]);
        let result = Wma::new(PriceSource::Close, 3).compute(&bars);

        assert!(result[0].is_nan());
        assert!(result[1].is_nan());
        // (1*1 + 2*2 + 3*3) / 6 = 14/6
        assert_approx(result[2], 14.0 / 6.0, DEFAULT_EPSILON);
        // (1*2 + 2*3 + 3*4) / 6 = 20/6
        assert_approx(result[3], 20.0 / 6.0, DEFAULT_EPSILON);
    }

    #[test]
    fn wma_weights_recent_more_than_sma() {
        let bars = make_bars(&[10.0, 10.0, 10.0, 20.0]);
        let wma = Wma::new(PriceSource::Close, 4).compute(&bars);
        // SMA would be 12.5; WMA = (10+20+30+80)/10 = 14
        assert_approx(wma[3], 14.0, DEFAULT_EPSILON);
    }

    #[test]
    fn wma_nan_propagates() {
        let mut bars = make_bars(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        bars[2].close = f64::NAN;
        let result = Wma::new(PriceSource::Close, 2).compute(&bars);
        assert!(result[2].is_nan());
        assert!(result[3].is_nan());
        assert!(!result[4].is_nan());
    }
}
