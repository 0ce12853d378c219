//! Per-bar decision record returned by the engine.

use crate::domain::{PositionId, TradeCommand, TradeSide};
use crate::series::SeriesError;
use serde::{Deserialize, Serialize};

/// What the gateway said about one command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CommandOutcome {
    /// Accepted. Opens carry the id of the new position.
    Accepted { position_id: Option<PositionId> },
    Rejected { reason: String },
}

impl CommandOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssuedCommand {
    pub command: TradeCommand,
    pub outcome: CommandOutcome,
}

/// Everything the engine did on one bar, in issue order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BarDecision {
    pub commands: Vec<IssuedCommand>,
    /// Set when the bar could not be evaluated. No command is issued then.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skipped: Option<SeriesError>,
}

impl BarDecision {
    pub fn skipped(reason: SeriesError) -> Self {
        Self {
            commands: Vec::new(),
            skipped: Some(reason),
        }
    }

    pub fn is_skipped(&self) -> bool {
        self.skipped.is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub(crate) fn record(&mut self, command: TradeCommand, outcome: CommandOutcome) {
        self.commands.push(IssuedCommand { command, outcome });
    }

    pub fn closes(&self) -> impl Iterator<Item = &IssuedCommand> {
        self.commands.iter().filter(|c| c.command.is_close())
    }

    pub fn opens(&self) -> impl Iterator<Item = &IssuedCommand> {
        self.commands.iter().filter(|c| c.command.is_open())
    }

    /// Side of the open command issued this bar, if any.
    pub fn opened_side(&self) -> Option<TradeSide> {
        self.commands.iter().find_map(|c| c.command.open_side())
    }
}
