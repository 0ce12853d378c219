//! Signal rules, the predicate half of the decision engine.
//!
//! A rule reads lag-0 and lag-1 values from its signal sources and answers two
//! questions: should a position be opened this bar, and should a given open
//! position be closed. Rules never see the order gateway and never hold state
//! between bars; everything they need is in the sources.

pub mod crossover;
pub mod zero_cross;

pub use crossover::CrossoverRule;
pub use zero_cross::ZeroCrossRule;

use crate::domain::{Position, TradeSide};
use crate::series::SeriesError;
use serde::{Deserialize, Serialize};

/// Direction of a crossing event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    /// Side of the position this direction opens.
    pub fn side(self) -> TradeSide {
        match self {
            Self::Up => TradeSide::Buy,
            Self::Down => TradeSide::Sell,
        }
    }
}

/// How a rule exits positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClosePolicy {
    /// Every owned position is tested with `evaluate_close` on every bar.
    OnReversal,
    /// No per-position test. An entry signal closes every owned position on
    /// the opposite side before the new one is opened.
    OppositeOnEntry,
}

/// Trait for signal rules.
pub trait SignalRule: Send + Sync {
    /// Human-readable name (e.g., "zero_cross").
    fn name(&self) -> &str;

    fn close_policy(&self) -> ClosePolicy;

    /// Crossing direction on the current bar, `Ok(None)` when nothing crossed.
    fn evaluate_open(&self) -> Result<Option<Direction>, SeriesError>;

    /// Whether `position` should be closed this bar.
    ///
    /// Only consulted under `ClosePolicy::OnReversal`.
    fn evaluate_close(&self, _position: &Position) -> Result<bool, SeriesError> {
        Ok(false)
    }
}

impl<R: SignalRule + ?Sized> SignalRule for Box<R> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn close_policy(&self) -> ClosePolicy {
        (**self).close_policy()
    }

    fn evaluate_open(&self) -> Result<Option<Direction>, SeriesError> {
        (**self).evaluate_open()
    }

    fn evaluate_close(&self, position: &Position) -> Result<bool, SeriesError> {
        (**self).evaluate_close(position)
    }
}

/// Rule that never signals. Used where a test needs an engine but no entries.
pub struct NullRule;

impl SignalRule for NullRule {
    fn name(&self) -> &str {
        "null"
    }

    fn close_policy(&self) -> ClosePolicy {
        ClosePolicy::OppositeOnEntry
    }

    fn evaluate_open(&self) -> Result<Option<Direction>, SeriesError> {
        Ok(None)
    }
}
