//! In-memory paper broker.
//!
//! Fills market orders at the last marked close, keeps positions in insertion
//! order, and closes positions whose stop-loss or take-profit level is touched
//! by a later bar's range. No slippage, no partial fills, no commissions.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{GatewayError, OrderGateway, PositionBook};
use crate::domain::{Bar, CloseCommand, OpenCommand, Position, PositionId, SymbolSpec, TradeSide};

/// Why a position left the book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CloseReason {
    Command,
    StopLoss,
    TakeProfit,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClosedPosition {
    pub position: Position,
    pub exit_price: f64,
    pub reason: CloseReason,
}

#[derive(Debug, Clone)]
pub struct PaperBroker {
    symbol: SymbolSpec,
    positions: Vec<Position>,
    closed: Vec<ClosedPosition>,
    next_id: u64,
    mark: Option<f64>,
    reject_next_open: Option<String>,
    reject_next_close: Option<String>,
}

impl PaperBroker {
    pub fn new(symbol: SymbolSpec) -> Self {
        Self {
            symbol,
            positions: Vec::new(),
            closed: Vec::new(),
            next_id: 1,
            mark: None,
            reject_next_open: None,
            reject_next_close: None,
        }
    }

    pub fn symbol(&self) -> &SymbolSpec {
        &self.symbol
    }

    /// Set the price market orders fill at.
    pub fn set_mark(&mut self, price: f64) {
        self.mark = Some(price);
    }

    pub fn mark_price(&self) -> Option<f64> {
        self.mark
    }

    /// Add a position opened outside the engine (manual trade, restart recovery).
    pub fn insert_position(&mut self, position: Position) {
        self.positions.push(position);
    }

    /// Every open position regardless of label.
    pub fn positions(&self) -> &[Position] {
        &self.positions
    }

    pub fn closed(&self) -> &[ClosedPosition] {
        &self.closed
    }

    /// Make the next `open` call fail with `reason`.
    pub fn reject_next_open(&mut self, reason: impl Into<String>) {
        self.reject_next_open = Some(reason.into());
    }

    /// Make the next `close` call fail with `reason`.
    pub fn reject_next_close(&mut self, reason: impl Into<String>) {
        self.reject_next_close = Some(reason.into());
    }

    /// Advance to a newly closed bar.
    ///
    /// Positions whose protective level lies inside the bar's range are closed
    /// at that level. When both levels are inside the range the stop-loss wins.
    /// The mark then moves to the bar's close.
    pub fn mark(&mut self, bar: &Bar) -> Vec<ClosedPosition> {
        let mut hit = Vec::new();
        let mut still_open = Vec::with_capacity(self.positions.len());

        for position in self.positions.drain(..) {
            match protective_exit(&position, bar) {
                Some((exit_price, reason)) => {
                    debug!(
                        position_id = %position.id,
                        label = %position.label,
                        ?reason,
                        exit_price,
                        "protective level touched"
                    );
                    hit.push(ClosedPosition {
                        position,
                        exit_price,
                        reason,
                    });
                }
                None => still_open.push(position),
            }
        }

        self.positions = still_open;
        self.closed.extend(hit.iter().cloned());
        self.mark = Some(bar.close);
        hit
    }
}

fn protective_exit(position: &Position, bar: &Bar) -> Option<(f64, CloseReason)> {
    let (stop_hit, target_hit) = match position.side {
        TradeSide::Buy => (
            position.stop_loss.filter(|&sl| bar.low <= sl),
            position.take_profit.filter(|&tp| bar.high >= tp),
        ),
        TradeSide::Sell => (
            position.stop_loss.filter(|&sl| bar.high >= sl),
            position.take_profit.filter(|&tp| bar.low <= tp),
        ),
    };
    stop_hit
        .map(|p| (p, CloseReason::StopLoss))
        .or_else(|| target_hit.map(|p| (p, CloseReason::TakeProfit)))
}

fn rejected(reason: impl Into<String>) -> GatewayError {
    GatewayError::OrderRejected {
        reason: reason.into(),
    }
}

impl PositionBook for PaperBroker {
    fn open_positions(&self, label: &str) -> Vec<Position> {
        self.positions
            .iter()
            .filter(|p| p.label == label)
            .cloned()
            .collect()
    }
}

impl OrderGateway for PaperBroker {
    fn open(&mut self, command: &OpenCommand) -> Result<PositionId, GatewayError> {
        if let Some(reason) = self.reject_next_open.take() {
            return Err(rejected(reason));
        }
        if !(command.volume.is_finite() && command.volume > 0.0) {
            return Err(rejected(format!("volume must be positive, got {}", command.volume)));
        }
        if !(command.stop_loss_pips > 0.0 && command.take_profit_pips > 0.0) {
            return Err(rejected("protective distances must be positive"));
        }
        let entry_price = self.mark.ok_or_else(|| rejected("no market price yet"))?;

        let sign = command.side.sign();
        let stop_distance = self.symbol.pips_to_price(command.stop_loss_pips);
        let target_distance = self.symbol.pips_to_price(command.take_profit_pips);

        let id = PositionId::from(self.next_id);
        self.next_id += 1;
        self.positions.push(Position {
            id: id.clone(),
            symbol: self.symbol.name.clone(),
            side: command.side,
            volume: command.volume,
            label: command.label.clone(),
            entry_price,
            stop_loss: Some(entry_price - sign * stop_distance),
            take_profit: Some(entry_price + sign * target_distance),
        });
        Ok(id)
    }

    fn close(&mut self, command: &CloseCommand) -> Result<(), GatewayError> {
        let close_rejected = |reason: String| GatewayError::CloseRejected {
            position_id: command.position_id.clone(),
            reason,
        };
        if let Some(reason) = self.reject_next_close.take() {
            return Err(close_rejected(reason));
        }
        let index = self
            .positions
            .iter()
            .position(|p| p.id == command.position_id)
            .ok_or_else(|| close_rejected("position is not open".into()))?;

        let position = self.positions.remove(index);
        let exit_price = self.mark.unwrap_or(position.entry_price);
        self.closed.push(ClosedPosition {
            position,
            exit_price,
            reason: CloseReason::Command,
        });
        Ok(())
    }
}

/// Cloneable handle to one `PaperBroker`.
///
/// Lets the engine own a position book and a gateway that are the same broker,
/// while the replay driver keeps a third handle to mark bars.
#[derive(Debug, Clone)]
pub struct SharedBroker {
    inner: Arc<Mutex<PaperBroker>>,
}

impl SharedBroker {
    pub fn new(broker: PaperBroker) -> Self {
        Self {
            inner: Arc::new(Mutex::new(broker)),
        }
    }

    /// Lock the broker. A poisoned lock is recovered; broker state is always consistent
    /// between method calls.
    pub fn lock(&self) -> MutexGuard<'_, PaperBroker> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn mark(&self, bar: &Bar) -> Vec<ClosedPosition> {
        self.lock().mark(bar)
    }
}

impl PositionBook for SharedBroker {
    fn open_positions(&self, label: &str) -> Vec<Position> {
        self.lock().open_positions(label)
    }
}

impl OrderGateway for SharedBroker {
    fn open(&mut self, command: &OpenCommand) -> Result<PositionId, GatewayError> {
        self.lock().open(command)
    }

    fn close(&mut self, command: &CloseCommand) -> Result<(), GatewayError> {
        self.lock().close(command)
    }
}
