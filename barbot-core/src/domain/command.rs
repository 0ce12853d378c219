//! Trade commands emitted by the decision engine.
//!
//! Commands are intents. The engine hands them to the order gateway and
//! records the outcome, it never retries or waits on them.

use super::ids::PositionId;
use super::position::TradeSide;
use serde::{Deserialize, Serialize};

/// Open a market position with fixed protective distances.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenCommand {
    pub side: TradeSide,
    /// Volume in instrument units (already converted from lots).
    pub volume: f64,
    pub stop_loss_pips: f64,
    pub take_profit_pips: f64,
    pub label: String,
}

/// Close an open position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloseCommand {
    pub position_id: PositionId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum TradeCommand {
    Open(OpenCommand),
    Close(CloseCommand),
}

impl TradeCommand {
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Open(_))
    }

    pub fn is_close(&self) -> bool {
        matches!(self, Self::Close(_))
    }

    /// Side of an open command, `None` for closes.
    pub fn open_side(&self) -> Option<TradeSide> {
        match self {
            Self::Open(cmd) => Some(cmd.side),
            Self::Close(_) => None,
        }
    }
}

impl From<OpenCommand> for TradeCommand {
    fn from(cmd: OpenCommand) -> Self {
        Self::Open(cmd)
    }
}

impl From<CloseCommand> for TradeCommand {
    fn from(cmd: CloseCommand) -> Self {
        Self::Close(cmd)
    }
}
