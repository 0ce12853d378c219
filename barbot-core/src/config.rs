//! Engine configuration: TOML in, validated settings out.
//!
//! Every range check happens here, before an engine exists. The engine itself
//! never re-validates.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{ConfigHash, SymbolError, SymbolSpec};
use crate::engine::EngineSettings;
use crate::indicators::PriceSource;

pub const MIN_PIPS: f64 = 1.0;
pub const MAX_PIPS: f64 = 100.0;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("misconfiguration: {0}")]
    Misconfiguration(String),

    #[error("read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

impl From<SymbolError> for ConfigError {
    fn from(err: SymbolError) -> Self {
        Self::Misconfiguration(err.to_string())
    }
}

/// Oscillator read by the zero-cross rule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Oscillator {
    #[default]
    Accelerator,
    Awesome,
}

/// Moving average flavour for the crossover rule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaKind {
    #[default]
    Wma,
    Sma,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaConfig {
    #[serde(default)]
    pub source: PriceSource,
    pub period: usize,
    #[serde(default)]
    pub kind: MaKind,
}

impl MaConfig {
    pub fn new(source: PriceSource, period: usize, kind: MaKind) -> Self {
        Self {
            source,
            period,
            kind,
        }
    }
}

fn default_fast() -> MaConfig {
    MaConfig::new(PriceSource::Close, 9, MaKind::Wma)
}

fn default_slow() -> MaConfig {
    MaConfig::new(PriceSource::Close, 20, MaKind::Wma)
}

/// Which rule drives the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SignalConfig {
    /// Oscillator crossing zero; positions close on momentum reversal.
    ZeroCross {
        #[serde(default)]
        oscillator: Oscillator,
    },
    /// Fast series crossing slow series; opposite positions close on entry.
    Crossover {
        #[serde(default = "default_fast")]
        fast: MaConfig,
        #[serde(default = "default_slow")]
        slow: MaConfig,
    },
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self::ZeroCross {
            oscillator: Oscillator::default(),
        }
    }
}

impl SignalConfig {
    /// Crossover with the default 9/20 weighted averages of the close.
    pub fn default_crossover() -> Self {
        Self::Crossover {
            fast: default_fast(),
            slow: default_slow(),
        }
    }

    /// Label used when the config does not set one.
    pub fn default_label(&self) -> &'static str {
        match self {
            Self::ZeroCross {
                oscillator: Oscillator::Accelerator,
            } => "AcceleratorOscillatorSample",
            Self::ZeroCross {
                oscillator: Oscillator::Awesome,
            } => "AwesomeOscillatorSample",
            Self::Crossover { fast, .. } => match fast.kind {
                MaKind::Wma => "WeightedMovingAverageSample",
                MaKind::Sma => "SimpleMovingAverageSample",
            },
        }
    }
}

fn default_volume_lots() -> f64 {
    0.01
}

fn default_pips() -> f64 {
    10.0
}

/// Per-instance configuration, immutable once the engine is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    #[serde(default)]
    pub symbol: SymbolSpec,
    #[serde(default = "default_volume_lots")]
    pub volume_lots: f64,
    #[serde(default = "default_pips")]
    pub stop_loss_pips: f64,
    #[serde(default = "default_pips")]
    pub take_profit_pips: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default)]
    pub signal: SignalConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            symbol: SymbolSpec::default(),
            volume_lots: default_volume_lots(),
            stop_loss_pips: default_pips(),
            take_profit_pips: default_pips(),
            label: None,
            signal: SignalConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Load and validate a config from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate a config from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn label(&self) -> &str {
        self.label
            .as_deref()
            .unwrap_or_else(|| self.signal.default_label())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.volume_lots.is_finite() && self.volume_lots > 0.0) {
            return Err(ConfigError::Misconfiguration(format!(
                "volume_lots must be positive, got {}",
                self.volume_lots
            )));
        }
        check_pips("stop_loss_pips", self.stop_loss_pips)?;
        check_pips("take_profit_pips", self.take_profit_pips)?;

        if self.label().trim().is_empty() {
            return Err(ConfigError::Misconfiguration("label must not be empty".into()));
        }

        if let SignalConfig::Crossover { fast, slow } = &self.signal {
            for (name, ma) in [("fast", fast), ("slow", slow)] {
                if ma.period == 0 {
                    return Err(ConfigError::Misconfiguration(format!(
                        "{name} period must be at least 1"
                    )));
                }
            }
        }

        self.symbol.validate()?;
        self.symbol.lots_to_units(self.volume_lots)?;
        Ok(())
    }

    /// Legal but suspicious settings. Reported, never rejected.
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if let SignalConfig::Crossover { fast, slow } = &self.signal {
            if fast.period > slow.period {
                warnings.push(format!(
                    "fast period {} is longer than slow period {}",
                    fast.period, slow.period
                ));
            }
            if fast == slow {
                warnings.push("fast and slow averages are identical and can never cross".into());
            }
        }
        warnings
    }

    /// Validate and resolve the engine settings: label, and volume in units.
    pub fn settings(&self) -> Result<EngineSettings, ConfigError> {
        self.validate()?;
        Ok(EngineSettings::new(
            self.label(),
            self.symbol.lots_to_units(self.volume_lots)?,
            self.stop_loss_pips,
            self.take_profit_pips,
        ))
    }

    /// Content hash of the config, stable across runs.
    pub fn fingerprint(&self) -> ConfigHash {
        // Plain data with derived Serialize: JSON encoding cannot fail.
        let json = serde_json::to_string(self).expect("EngineConfig must serialize");
        ConfigHash::from_bytes(json.as_bytes())
    }
}

fn check_pips(field: &str, value: f64) -> Result<(), ConfigError> {
    if (MIN_PIPS..=MAX_PIPS).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::Misconfiguration(format!(
            "{field} must be within {MIN_PIPS}..={MAX_PIPS}, got {value}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_gives_defaults() {
        let config = EngineConfig::from_toml("").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.label(), "AcceleratorOscillatorSample");

        let settings = config.settings().unwrap();
        assert_eq!(settings.volume_units, 1_000.0);
        assert_eq!(settings.stop_loss_pips, 10.0);
        assert_eq!(settings.take_profit_pips, 10.0);
    }

    #[test]
    fn crossover_defaults_to_9_20_wma() {
        let config = EngineConfig::from_toml(
            r#"
            [signal]
            type = "crossover"
            "#,
        )
        .unwrap();
        assert_eq!(config.signal, SignalConfig::default_crossover());
        assert_eq!(config.label(), "WeightedMovingAverageSample");
    }

    #[test]
    fn full_crossover_config_parses() {
        let config = EngineConfig::from_toml(
            r#"
            volume_lots = 0.1
            stop_loss_pips = 25
            take_profit_pips = 50
            label = "gbp-cross"

            [symbol]
            name = "GBPUSD"

            [signal]
            type = "crossover"
            fast = { source = "typical", period = 5, kind = "sma" }
            slow = { source = "close", period = 50 }
            "#,
        )
        .unwrap();
        assert_eq!(config.label(), "gbp-cross");
        assert_eq!(config.symbol.name, "GBPUSD");
        match &config.signal {
            SignalConfig::Crossover { fast, slow } => {
                assert_eq!(fast.source, PriceSource::Typical);
                assert_eq!(fast.kind, MaKind::Sma);
                assert_eq!(slow.kind, MaKind::Wma);
                assert_eq!(slow.period, 50);
            }
            other => panic!("expected crossover, got {other:?}"),
        }
        assert_eq!(config.settings().unwrap().volume_units, 10_000.0);
    }

    #[test]
    fn pips_out_of_range_rejected() {
        for toml in ["stop_loss_pips = 0", "take_profit_pips = 101", "stop_loss_pips = 0.5"] {
            let err = EngineConfig::from_toml(toml).unwrap_err();
            assert!(matches!(err, ConfigError::Misconfiguration(_)), "{toml}: {err}");
        }
        assert!(EngineConfig::from_toml("stop_loss_pips = 100").is_ok());
        assert!(EngineConfig::from_toml("take_profit_pips = 1").is_ok());
    }

    #[test]
    fn non_positive_volume_rejected() {
        assert!(EngineConfig::from_toml("volume_lots = 0").is_err());
        assert!(EngineConfig::from_toml("volume_lots = -0.01").is_err());
        // below one volume step
        assert!(EngineConfig::from_toml("volume_lots = 0.001").is_err());
    }

    #[test]
    fn zero_period_rejected() {
        let err = EngineConfig::from_toml(
            r#"
            [signal]
            type = "crossover"
            fast = { period = 0 }
            "#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("fast period"));
    }

    #[test]
    fn empty_label_rejected() {
        assert!(EngineConfig::from_toml(r#"label = "  ""#).is_err());
    }

    #[test]
    fn unknown_fields_and_types_rejected() {
        assert!(matches!(
            EngineConfig::from_toml("volume = 1"),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            EngineConfig::from_toml("[signal]\ntype = \"rsi\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn fast_longer_than_slow_is_a_warning_not_an_error() {
        let config = EngineConfig::from_toml(
            r#"
            [signal]
            type = "crossover"
            fast = { period = 30 }
            slow = { period = 10 }
            "#,
        )
        .unwrap();
        let warnings = config.warnings();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("longer"));
    }

    #[test]
    fn identical_averages_warn() {
        let config = EngineConfig {
            signal: SignalConfig::Crossover {
                fast: default_fast(),
                slow: default_fast(),
            },
            ..EngineConfig::default()
        };
        assert!(config.warnings().iter().any(|w| w.contains("identical")));
        assert!(EngineConfig::default().warnings().is_empty());
    }

    #[test]
    fn fingerprint_tracks_content() {
        let a = EngineConfig::default();
        let mut b = EngineConfig::default();
        assert_eq!(a.fingerprint(), b.fingerprint());
        b.stop_loss_pips = 20.0;
        assert_ne!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn missing_file_is_read_error() {
        let err = EngineConfig::from_file(Path::new("/nonexistent/barbot.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
