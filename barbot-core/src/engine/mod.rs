//! Decision engine: turns each closed bar into trade commands.
//!
//! Indicator history lives in the signal sources and open positions live in
//! the position book; the engine keeps neither. Per bar it:
//!
//! 1. Reads the rule's entry direction and the positions it owns
//! 2. Closes positions the rule's close policy selects
//! 3. Opens at most one new position

pub mod decision;
pub mod decision_engine;
pub mod settings;

pub use decision::{BarDecision, CommandOutcome, IssuedCommand};
pub use decision_engine::DecisionEngine;
pub use settings::EngineSettings;
