//! Indicator samples: append-only per-bar series queried by lag.
//!
//! An `IndicatorSample` is the write side, owned by whoever computes the
//! indicator. The engine only ever holds a `SampleReader`, which can query
//! values by lag but never append.

use serde::{Deserialize, Serialize};
use std::sync::{Arc, PoisonError, RwLock};
use thiserror::Error;

/// Errors from series access.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[serde(tag = "error", rename_all = "snake_case")]
pub enum SeriesError {
    #[error("lag {lag} needs {} bars, only {available} recorded", .lag + 1)]
    InsufficientHistory { lag: usize, available: usize },

    #[error("refusing to append non-finite value {value}")]
    NonFinite { value: f64 },
}

/// Read-only lag query over one indicator series.
///
/// Lag 0 is the most recent closed bar, lag 1 the bar before it.
pub trait SignalSource: Send + Sync {
    fn value_at(&self, lag: usize) -> Result<f64, SeriesError>;
}

impl<S: SignalSource + ?Sized> SignalSource for Box<S> {
    fn value_at(&self, lag: usize) -> Result<f64, SeriesError> {
        (**self).value_at(lag)
    }
}

/// Append-only series of finite values, one per closed bar.
#[derive(Debug, Clone, Default)]
pub struct IndicatorSample {
    values: Arc<RwLock<Vec<f64>>>,
}

impl IndicatorSample {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a sample from existing history, oldest first.
    pub fn from_values(values: &[f64]) -> Result<Self, SeriesError> {
        let sample = Self::new();
        for &v in values {
            sample.append(v)?;
        }
        Ok(sample)
    }

    /// Record the value for a newly closed bar.
    pub fn append(&self, value: f64) -> Result<(), SeriesError> {
        if !value.is_finite() {
            return Err(SeriesError::NonFinite { value });
        }
        self.values
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(value);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.values.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// A read-only handle sharing this sample's history.
    pub fn reader(&self) -> SampleReader {
        SampleReader {
            values: Arc::clone(&self.values),
        }
    }
}

/// Read-only view of an `IndicatorSample`. Sees values appended after it was created.
#[derive(Debug, Clone)]
pub struct SampleReader {
    values: Arc<RwLock<Vec<f64>>>,
}

impl SignalSource for SampleReader {
    fn value_at(&self, lag: usize) -> Result<f64, SeriesError> {
        let values = self.values.read().unwrap_or_else(PoisonError::into_inner);
        let available = values.len();
        if lag >= available {
            return Err(SeriesError::InsufficientHistory { lag, available });
        }
        Ok(values[available - 1 - lag])
    }
}
