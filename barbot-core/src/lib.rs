//! Barbot Core — bar-close trading decision engine.
//!
//! This crate contains:
//! - Domain types (bars, positions, trade commands, symbol specs)
//! - Indicator series with lag-indexed reads
//! - Signal rules: oscillator zero-crossing and two-average crossover
//! - The decision engine, run once per closed bar
//! - A paper broker and a bar replay driver
//! - TOML configuration and a factory wiring config into a running engine

pub mod broker;
pub mod config;
pub mod domain;
pub mod engine;
pub mod factory;
pub mod indicators;
pub mod replay;
pub mod series;
pub mod signal;

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: core types are Send + Sync.
    ///
    /// The host may deliver bar-close events from a worker thread.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        // Domain types
        require_send::<domain::Bar>();
        require_sync::<domain::Bar>();
        require_send::<domain::Position>();
        require_sync::<domain::Position>();
        require_send::<domain::TradeCommand>();
        require_sync::<domain::TradeCommand>();
        require_send::<domain::SymbolSpec>();
        require_sync::<domain::SymbolSpec>();
        require_send::<domain::PositionId>();
        require_sync::<domain::PositionId>();
        require_send::<domain::ConfigHash>();
        require_sync::<domain::ConfigHash>();

        // Series
        require_send::<series::IndicatorSample>();
        require_sync::<series::IndicatorSample>();
        require_send::<series::SampleReader>();
        require_sync::<series::SampleReader>();

        // Rules
        require_send::<signal::ZeroCrossRule<series::SampleReader>>();
        require_sync::<signal::ZeroCrossRule<series::SampleReader>>();
        require_send::<signal::CrossoverRule<series::SampleReader, series::SampleReader>>();
        require_sync::<signal::CrossoverRule<series::SampleReader, series::SampleReader>>();
        require_send::<signal::NullRule>();
        require_sync::<signal::NullRule>();

        // Broker and engine
        require_send::<broker::PaperBroker>();
        require_sync::<broker::PaperBroker>();
        require_send::<broker::SharedBroker>();
        require_sync::<broker::SharedBroker>();
        require_send::<engine::BarDecision>();
        require_sync::<engine::BarDecision>();
        require_send::<factory::ConfiguredEngine>();
        require_sync::<factory::ConfiguredEngine>();
        require_send::<config::EngineConfig>();
        require_sync::<config::EngineConfig>();
    }

    /// Architecture contract: rules read indicator history only.
    ///
    /// `evaluate_open` takes no bar data and no position book, so a rule cannot
    /// consult prices beyond what its sources have recorded, nor decide entries
    /// from open positions.
    #[test]
    fn signal_rule_entry_sees_no_positions() {
        fn _check_trait_object_builds(
            rule: &dyn signal::SignalRule,
        ) -> Result<Option<signal::Direction>, series::SeriesError> {
            rule.evaluate_open()
        }
    }

    /// Architecture contract: the engine reaches the host only through the
    /// position book and the order gateway.
    #[test]
    fn engine_is_generic_over_host_seams() {
        fn _check_engine_builds<P: broker::PositionBook, G: broker::OrderGateway>(
            positions: P,
            gateway: G,
        ) -> engine::DecisionEngine<signal::NullRule, P, G> {
            engine::DecisionEngine::new(
                signal::NullRule,
                positions,
                gateway,
                engine::EngineSettings::new("contract", 1000.0, 10.0, 10.0),
            )
        }
    }
}
