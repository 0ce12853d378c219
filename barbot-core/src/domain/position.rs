use super::ids::PositionId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Trade direction of a position or order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradeSide {
    Buy,
    Sell,
}

impl TradeSide {
    pub fn opposite(self) -> Self {
        match self {
            Self::Buy => Self::Sell,
            Self::Sell => Self::Buy,
        }
    }

    /// +1.0 for Buy, -1.0 for Sell.
    pub fn sign(self) -> f64 {
        match self {
            Self::Buy => 1.0,
            Self::Sell => -1.0,
        }
    }
}

impl fmt::Display for TradeSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buy => write!(f, "buy"),
            Self::Sell => write!(f, "sell"),
        }
    }
}

/// An open position as reported by the position book.
///
/// Owned by the broker side. The engine enumerates and closes positions but
/// never mutates their fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub id: PositionId,
    pub symbol: String,
    pub side: TradeSide,
    /// Volume in instrument units.
    pub volume: f64,
    pub label: String,
    pub entry_price: f64,
    pub stop_loss: Option<f64>,
    pub take_profit: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn position(side: TradeSide) -> Position {
        Position {
            id: PositionId::from(1),
            symbol: "EURUSD".into(),
            side,
            volume: 1000.0,
            label: "test".into(),
            entry_price: 1.1000,
            stop_loss: None,
            take_profit: None,
        }
    }

    #[test]
    fn opposite_side() {
        assert_eq!(TradeSide::Buy.opposite(), TradeSide::Sell);
        assert_eq!(TradeSide::Sell.opposite(), TradeSide::Buy);
    }

    #[test]
    fn side_serializes_snake_case() {
        let json = serde_json::to_value(position(TradeSide::Sell)).unwrap();
        assert_eq!(json["side"], "sell");
        assert_eq!(json["label"], "test");
    }
}
