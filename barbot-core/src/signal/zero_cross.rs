//! Zero-crossing rule for a single oscillator series.
//!
//! Opens Buy when the oscillator crosses above zero and Sell when it crosses
//! below. Each open position is closed as soon as momentum turns against it:
//! a Buy when the oscillator falls, a Sell when it rises.

use super::{ClosePolicy, Direction, SignalRule};
use crate::domain::{Position, TradeSide};
use crate::series::{SeriesError, SignalSource};

#[derive(Debug, Clone)]
pub struct ZeroCrossRule<S> {
    source: S,
}

impl<S: SignalSource> ZeroCrossRule<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// (lag 0, lag 1)
    fn latest_pair(&self) -> Result<(f64, f64), SeriesError> {
        Ok((self.source.value_at(0)?, self.source.value_at(1)?))
    }
}

impl<S: SignalSource> SignalRule for ZeroCrossRule<S> {
    fn name(&self) -> &str {
        "zero_cross"
    }

    fn close_policy(&self) -> ClosePolicy {
        ClosePolicy::OnReversal
    }

    fn evaluate_open(&self) -> Result<Option<Direction>, SeriesError> {
        let (current, previous) = self.latest_pair()?;
        if current > 0.0 && previous <= 0.0 {
            Ok(Some(Direction::Up))
        } else if current < 0.0 && previous >= 0.0 {
            Ok(Some(Direction::Down))
        } else {
            Ok(None)
        }
    }

    fn evaluate_close(&self, position: &Position) -> Result<bool, SeriesError> {
        let (current, previous) = self.latest_pair()?;
        Ok(match position.side {
            TradeSide::Buy => current < previous,
            TradeSide::Sell => current > previous,
        })
    }
}
