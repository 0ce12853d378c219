//! The bar-close decision engine.
//!
//! One evaluation per closed bar, in two phases:
//! 1. Read phase: signal direction, owned positions, positions to close.
//!    Any unreadable lag aborts the bar here, before a command is issued.
//! 2. Command phase: every close, then at most one open.

use tracing::{debug, info, warn};

use super::decision::{BarDecision, CommandOutcome};
use super::settings::EngineSettings;
use crate::broker::{OrderGateway, PositionBook};
use crate::domain::{CloseCommand, OpenCommand, Position, PositionId, TradeCommand};
use crate::series::SeriesError;
use crate::signal::{ClosePolicy, Direction, SignalRule};

/// Decision engine parameterised by its signal rule and broker collaborators.
///
/// Holds no memory between bars. Position state is re-read from the book on
/// every call to `on_bar_closed`.
pub struct DecisionEngine<R, P, G> {
    rule: R,
    positions: P,
    gateway: G,
    settings: EngineSettings,
}

impl<R, P, G> DecisionEngine<R, P, G>
where
    R: SignalRule,
    P: PositionBook,
    G: OrderGateway,
{
    pub fn new(rule: R, positions: P, gateway: G, settings: EngineSettings) -> Self {
        Self {
            rule,
            positions,
            gateway,
            settings,
        }
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Evaluate the bar that just closed and issue the resulting commands.
    ///
    /// Never fails: an unreadable signal skips the bar, and gateway rejections
    /// are recorded in the returned decision.
    pub fn on_bar_closed(&mut self) -> BarDecision {
        let label = self.settings.label.as_str();
        let (direction, to_close) = match self.plan() {
            Ok(plan) => plan,
            Err(reason) => {
                debug!(label, rule = self.rule.name(), %reason, "bar skipped");
                return BarDecision::skipped(reason);
            }
        };

        let mut decision = BarDecision::default();

        for position_id in to_close {
            let command = CloseCommand { position_id };
            let outcome = match self.gateway.close(&command) {
                Ok(()) => {
                    info!(label, position_id = %command.position_id, "position closed");
                    CommandOutcome::Accepted { position_id: None }
                }
                Err(err) => {
                    warn!(label, position_id = %command.position_id, error = %err, "close rejected");
                    CommandOutcome::Rejected {
                        reason: err.to_string(),
                    }
                }
            };
            decision.record(TradeCommand::Close(command), outcome);
        }

        if let Some(direction) = direction {
            let command = self.open_command(direction);
            let outcome = match self.gateway.open(&command) {
                Ok(position_id) => {
                    info!(label, side = %command.side, %position_id, volume = command.volume, "position opened");
                    CommandOutcome::Accepted {
                        position_id: Some(position_id),
                    }
                }
                Err(err) => {
                    warn!(label, side = %command.side, error = %err, "open rejected");
                    CommandOutcome::Rejected {
                        reason: err.to_string(),
                    }
                }
            };
            decision.record(TradeCommand::Open(command), outcome);
        }

        decision
    }

    /// Read phase: entry direction and the ids to close, in book order.
    fn plan(&self) -> Result<(Option<Direction>, Vec<PositionId>), SeriesError> {
        let direction = self.rule.evaluate_open()?;
        let owned = self.positions.open_positions(&self.settings.label);

        let to_close = match self.rule.close_policy() {
            ClosePolicy::OnReversal => {
                let mut ids = Vec::new();
                for position in &owned {
                    if self.rule.evaluate_close(position)? {
                        ids.push(position.id.clone());
                    }
                }
                ids
            }
            ClosePolicy::OppositeOnEntry => match direction {
                Some(direction) => {
                    let exit_side = direction.side().opposite();
                    owned
                        .iter()
                        .filter(|p| p.side == exit_side)
                        .map(|p: &Position| p.id.clone())
                        .collect()
                }
                None => Vec::new(),
            },
        };

        if direction.is_some() || !to_close.is_empty() {
            debug!(
                label = self.settings.label.as_str(),
                rule = self.rule.name(),
                ?direction,
                owned = owned.len(),
                closing = to_close.len(),
                "signal read"
            );
        }
        Ok((direction, to_close))
    }

    fn open_command(&self, direction: Direction) -> OpenCommand {
        OpenCommand {
            side: direction.side(),
            volume: self.settings.volume_units,
            stop_loss_pips: self.settings.stop_loss_pips,
            take_profit_pips: self.settings.take_profit_pips,
            label: self.settings.label.clone(),
        }
    }
}
