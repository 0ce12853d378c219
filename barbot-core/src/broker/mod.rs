//! Broker-side collaborators: the position book and the order gateway.
//!
//! The engine reads positions through `PositionBook` and issues commands
//! through `OrderGateway`. Both are injected at construction so the engine can
//! run against the in-memory `PaperBroker` or any platform adapter.

pub mod paper;

pub use paper::{CloseReason, ClosedPosition, PaperBroker, SharedBroker};

use crate::domain::{CloseCommand, OpenCommand, Position, PositionId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors reported by an order gateway.
///
/// Never fatal to the engine: the outcome is recorded and the next bar is
/// evaluated from scratch.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "error", rename_all = "snake_case")]
pub enum GatewayError {
    #[error("open rejected: {reason}")]
    OrderRejected { reason: String },

    #[error("close of position {position_id} rejected: {reason}")]
    CloseRejected {
        position_id: PositionId,
        reason: String,
    },
}

/// Read access to open positions.
pub trait PositionBook: Send + Sync {
    /// All open positions whose label equals `label` exactly.
    ///
    /// Called on every evaluation; implementations must not serve a stale snapshot.
    fn open_positions(&self, label: &str) -> Vec<Position>;
}

/// Command access to the execution venue.
pub trait OrderGateway: Send + Sync {
    /// Place a market order. Returns the id of the resulting position.
    fn open(&mut self, command: &OpenCommand) -> Result<PositionId, GatewayError>;

    /// Close a position. Closing an already-closed position is an error, not a panic.
    fn close(&mut self, command: &CloseCommand) -> Result<(), GatewayError>;
}

impl<B: PositionBook + ?Sized> PositionBook for Box<B> {
    fn open_positions(&self, label: &str) -> Vec<Position> {
        (**self).open_positions(label)
    }
}

impl<G: OrderGateway + ?Sized> OrderGateway for Box<G> {
    fn open(&mut self, command: &OpenCommand) -> Result<PositionId, GatewayError> {
        (**self).open(command)
    }

    fn close(&mut self, command: &CloseCommand) -> Result<(), GatewayError> {
        (**self).close(command)
    }
}
