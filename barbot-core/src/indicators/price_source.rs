//! Which bar price an indicator reads.

use crate::domain::Bar;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceSource {
    Open,
    High,
    Low,
    #[default]
    Close,
    /// (high + low) / 2
    Median,
    /// (high + low + close) / 3
    Typical,
    /// (high + low + 2 * close) / 4
    Weighted,
}

impl PriceSource {
    pub fn price(self, bar: &Bar) -> f64 {
        match self {
            Self::Open => bar.open,
            Self::High => bar.high,
            Self::Low => bar.low,
            Self::Close => bar.close,
            Self::Median => bar.median(),
            Self::Typical => bar.typical(),
            Self::Weighted => bar.weighted_close(),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::High => "high",
            Self::Low => "low",
            Self::Close => "close",
            Self::Median => "median",
            Self::Typical => "typical",
            Self::Weighted => "weighted",
        }
    }

    pub fn series(self, bars: &[Bar]) -> Vec<f64> {
        bars.iter().map(|b| self.price(b)).collect()
    }
}
