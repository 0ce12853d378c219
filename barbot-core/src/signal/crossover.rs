//! Dual-series crossover rule: fast series crossing a slow series.
//!
//! Fires Up when the fast series crosses above the slow series and Down when
//! it crosses below. The crossing is both the exit and the entry trigger:
//! there is no per-position reversal test.

use super::{ClosePolicy, Direction, SignalRule};
use crate::series::{SeriesError, SignalSource};

/// Crossover of two independent series.
///
/// The periods behind `fast` and `slow` are not compared here; a "fast"
/// series built with the longer period is accepted as configured.
#[derive(Debug, Clone)]
pub struct CrossoverRule<F, S> {
    fast: F,
    slow: S,
}

impl<F: SignalSource, S: SignalSource> CrossoverRule<F, S> {
    pub fn new(fast: F, slow: S) -> Self {
        Self { fast, slow }
    }
}

impl<F: SignalSource, S: SignalSource> SignalRule for CrossoverRule<F, S> {
    fn name(&self) -> &str {
        "crossover"
    }

    fn close_policy(&self) -> ClosePolicy {
        ClosePolicy::OppositeOnEntry
    }

    fn evaluate_open(&self) -> Result<Option<Direction>, SeriesError> {
        let fast_now = self.fast.value_at(0)?;
        let fast_prev = self.fast.value_at(1)?;
        let slow_now = self.slow.value_at(0)?;
        let slow_prev = self.slow.value_at(1)?;

        if fast_now > slow_now && fast_prev <= slow_prev {
            Ok(Some(Direction::Up))
        } else if fast_now < slow_now && fast_prev >= slow_prev {
            Ok(Some(Direction::Down))
        } else {
            Ok(None)
        }
    }
}
