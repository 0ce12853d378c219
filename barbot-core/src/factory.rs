//! Turns an `EngineConfig` into a runnable engine plus the
//! indicator feeds that keep its signal sources current.

use tracing::info;

use crate::broker::SharedBroker;
use crate::config::{ConfigError, EngineConfig, MaConfig, MaKind, Oscillator, SignalConfig};
use crate::engine::DecisionEngine;
use crate::indicators::{AcceleratorOscillator, AwesomeOscillator, Indicator, Sma, Wma};
use crate::series::{IndicatorSample, SampleReader};
use crate::signal::{CrossoverRule, SignalRule, ZeroCrossRule};

/// Engine built from configuration and backed by a paper broker.
pub type ConfiguredEngine = DecisionEngine<Box<dyn SignalRule>, SharedBroker, SharedBroker>;

/// An indicator paired with the sample it writes into.
///
/// The feed is the only writer of its sample; the rule built alongside it
/// holds a reader.
pub struct IndicatorFeed {
    indicator: Box<dyn Indicator>,
    sample: IndicatorSample,
}

impl IndicatorFeed {
    pub fn new(indicator: Box<dyn Indicator>) -> Self {
        Self {
            indicator,
            sample: IndicatorSample::new(),
        }
    }

    pub fn name(&self) -> &str {
        self.indicator.name()
    }

    pub fn indicator(&self) -> &dyn Indicator {
        self.indicator.as_ref()
    }

    pub fn sample(&self) -> &IndicatorSample {
        &self.sample
    }

    pub fn reader(&self) -> SampleReader {
        self.sample.reader()
    }
}

/// Create a moving average indicator from its config.
///
/// The period must be non-zero; `EngineConfig::validate` guarantees this for
/// every config that reaches `create_engine`.
pub fn create_ma(config: &MaConfig) -> Box<dyn Indicator> {
    match config.kind {
        MaKind::Wma => Box::new(Wma::new(config.source, config.period)),
        MaKind::Sma => Box::new(Sma::new(config.source, config.period)),
    }
}

/// Create the signal rule and the feeds it reads from.
///
/// Feed order: the oscillator for zero-cross, `[fast, slow]` for crossover.
/// Periods must already be validated (non-zero).
pub fn create_rule(config: &SignalConfig) -> (Box<dyn SignalRule>, Vec<IndicatorFeed>) {
    match config {
        SignalConfig::ZeroCross { oscillator } => {
            let indicator: Box<dyn Indicator> = match oscillator {
                Oscillator::Accelerator => Box::new(AcceleratorOscillator::new()),
                Oscillator::Awesome => Box::new(AwesomeOscillator::new()),
            };
            let feed = IndicatorFeed::new(indicator);
            let rule = ZeroCrossRule::new(feed.reader());
            (Box::new(rule), vec![feed])
        }
        SignalConfig::Crossover { fast, slow } => {
            let fast_feed = IndicatorFeed::new(create_ma(fast));
            let slow_feed = IndicatorFeed::new(create_ma(slow));
            let rule = CrossoverRule::new(fast_feed.reader(), slow_feed.reader());
            (Box::new(rule), vec![fast_feed, slow_feed])
        }
    }
}

/// Validate `config` and build an engine whose position book and gateway are `broker`.
pub fn create_engine(
    config: &EngineConfig,
    broker: &SharedBroker,
) -> Result<(ConfiguredEngine, Vec<IndicatorFeed>), ConfigError> {
    let settings = config.settings()?;
    let (rule, feeds) = create_rule(&config.signal);
    let fingerprint = config.fingerprint();

    info!(
        label = settings.label.as_str(),
        rule = rule.name(),
        volume_units = settings.volume_units,
        stop_loss_pips = settings.stop_loss_pips,
        take_profit_pips = settings.take_profit_pips,
        fingerprint = fingerprint.short(),
        "engine configured"
    );

    let engine = DecisionEngine::new(rule, broker.clone(), broker.clone(), settings);
    Ok((engine, feeds))
}
