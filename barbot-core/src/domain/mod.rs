//! Domain types for barbot

pub mod bar;
pub mod command;
pub mod ids;
pub mod position;
pub mod symbol;

pub use bar::Bar;
pub use command::{CloseCommand, OpenCommand, TradeCommand};
pub use ids::{ConfigHash, PositionId};
pub use position::{Position, TradeSide};
pub use symbol::{SymbolError, SymbolSpec};
