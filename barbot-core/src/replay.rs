//! Bar replay. Drives a configured engine over a bar series with a paper broker.
//!
//! Per bar, in order:
//! 1. Mark the broker: protective levels touched by the bar close positions
//! 2. Append the bar's indicator values to each feed's sample
//! 3. Call the engine once
//!
//! Void bars are dropped before anything else, so indicators and samples only
//! ever see real bars and lag n means the same bar for every feed. Indicators
//! are then precomputed once over the real bars; they are causal, so the value
//! appended at bar t depends on bars 0..=t only.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::broker::{ClosedPosition, PaperBroker, SharedBroker};
use crate::config::{ConfigError, EngineConfig};
use crate::domain::{Bar, Position};
use crate::engine::BarDecision;
use crate::factory::{create_engine, ConfiguredEngine, IndicatorFeed};
use crate::series::SeriesError;

/// What happened on one replayed bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayStep {
    pub bar_index: usize,
    pub date: NaiveDate,
    /// Positions closed by stop-loss / take-profit before the engine ran.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub protective_closes: Vec<ClosedPosition>,
    pub decision: BarDecision,
}

/// Result of a replay: per-bar steps plus the final broker state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReplayReport {
    pub steps: Vec<ReplayStep>,
    pub open_positions: Vec<Position>,
    pub closed_positions: Vec<ClosedPosition>,
    pub skipped_bars: usize,
}

impl ReplayReport {
    pub fn open_count(&self) -> usize {
        self.steps.iter().map(|s| s.decision.opens().count()).sum()
    }

    pub fn close_count(&self) -> usize {
        self.steps.iter().map(|s| s.decision.closes().count()).sum()
    }

    /// Steps where a command was issued or a protective level closed a position.
    pub fn active_steps(&self) -> impl Iterator<Item = &ReplayStep> {
        self.steps
            .iter()
            .filter(|s| !s.decision.is_empty() || !s.protective_closes.is_empty())
    }
}

pub struct Replay {
    engine: ConfiguredEngine,
    feeds: Vec<IndicatorFeed>,
    broker: SharedBroker,
}

impl Replay {
    /// Build an engine for `config` on a fresh paper broker.
    pub fn from_config(config: &EngineConfig) -> Result<Self, ConfigError> {
        let broker = SharedBroker::new(PaperBroker::new(config.symbol.clone()));
        let (engine, feeds) = create_engine(config, &broker)?;
        Ok(Self {
            engine,
            feeds,
            broker,
        })
    }

    /// Replay `bars`, oldest first.
    pub fn run(self, bars: &[Bar]) -> Result<ReplayReport, SeriesError> {
        let Self {
            mut engine,
            feeds,
            broker,
        } = self;

        let mut bar_indices = Vec::with_capacity(bars.len());
        let mut live = Vec::with_capacity(bars.len());
        for (t, bar) in bars.iter().enumerate() {
            if bar.is_void() {
                debug!(bar_index = t, date = %bar.date, "void bar skipped");
                continue;
            }
            bar_indices.push(t);
            live.push(bar.clone());
        }

        let series: Vec<Vec<f64>> = feeds
            .iter()
            .map(|feed| feed.indicator().compute(&live))
            .collect();

        let mut report = ReplayReport::default();

        for (k, (&t, bar)) in bar_indices.iter().zip(&live).enumerate() {
            let protective_closes = broker.mark(bar);

            for (feed, values) in feeds.iter().zip(&series) {
                let value = values[k];
                // warm-up values are never recorded
                if value.is_finite() {
                    feed.sample().append(value)?;
                }
            }

            let decision = engine.on_bar_closed();
            if decision.is_skipped() {
                report.skipped_bars += 1;
            }
            report.steps.push(ReplayStep {
                bar_index: t,
                date: bar.date,
                protective_closes,
                decision,
            });
        }

        let book = broker.lock();
        report.open_positions = book.positions().to_vec();
        report.closed_positions = book.closed().to_vec();
        drop(book);

        info!(
            bars = bars.len(),
            opens = report.open_count(),
            closes = report.close_count(),
            skipped = report.skipped_bars,
            "replay finished"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SignalConfig;
    use crate::domain::TradeSide;

    fn wave_bars(n: usize) -> Vec<Bar> {
        let base = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        (0..n)
            .map(|i| {
                let close = 1.1000 + (i as f64 * 0.15).sin() * 0.0050;
                Bar {
                    date: base + chrono::Duration::days(i as i64),
                    open: close,
                    high: close + 0.0002,
                    low: close - 0.0002,
                    close,
                    volume: 100,
                }
            })
            .collect()
    }

    fn wide_stops(signal: SignalConfig) -> EngineConfig {
        EngineConfig {
            stop_loss_pips: 100.0,
            take_profit_pips: 100.0,
            signal,
            ..EngineConfig::default()
        }
    }

    #[test]
    fn warmup_bars_are_skipped() {
        let report = Replay::from_config(&EngineConfig::default())
            .unwrap()
            .run(&wave_bars(30))
            .unwrap();
        // accelerator needs 38 bars before its first value
        assert_eq!(report.skipped_bars, 30);
        assert_eq!(report.open_count(), 0);
    }

    #[test]
    fn zero_cross_replay_trades_a_wave() {
        let report = Replay::from_config(&wide_stops(SignalConfig::default()))
            .unwrap()
            .run(&wave_bars(200))
            .unwrap();
        assert!(report.open_count() > 0);
        for step in &report.steps {
            assert!(step.decision.opens().count() <= 1);
        }
    }

    #[test]
    fn crossover_replay_alternates_sides() {
        let report = Replay::from_config(&wide_stops(SignalConfig::default_crossover()))
            .unwrap()
            .run(&wave_bars(200))
            .unwrap();
        let sides: Vec<TradeSide> = report
            .steps
            .iter()
            .filter_map(|s| s.decision.opened_side())
            .collect();
        assert!(sides.len() >= 2);
        for pair in sides.windows(2) {
            assert_ne!(pair[0], pair[1], "crossings must alternate");
        }
        // never holding both sides at once
        assert!(report.open_positions.len() <= 1);
    }

    #[test]
    fn active_steps_include_protective_closes() {
        let config = EngineConfig {
            stop_loss_pips: 1.0,
            take_profit_pips: 1.0,
            signal: SignalConfig::default_crossover(),
            ..EngineConfig::default()
        };
        let report = Replay::from_config(&config)
            .unwrap()
            .run(&wave_bars(200))
            .unwrap();
        let active: Vec<usize> = report.active_steps().map(|s| s.bar_index).collect();
        assert!(!active.is_empty());
        assert!(report
            .steps
            .iter()
            .filter(|s| !s.protective_closes.is_empty())
            .all(|s| active.contains(&s.bar_index)));
    }

    #[test]
    fn void_bars_produce_no_step() {
        let mut bars = wave_bars(50);
        bars[45].close = f64::NAN;
        let report = Replay::from_config(&EngineConfig::default())
            .unwrap()
            .run(&bars)
            .unwrap();
        assert_eq!(report.steps.len(), 49);
        assert!(report.steps.iter().all(|s| s.bar_index != 45));
    }
}
