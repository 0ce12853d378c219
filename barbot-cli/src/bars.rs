//! CSV bar loading.
//!
//! Expected header: `date,open,high,low,close[,volume]`, dates as YYYY-MM-DD,
//! rows oldest first.

use std::path::Path;

use anyhow::{bail, Context, Result};
use barbot_core::domain::Bar;
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::{debug, warn};

#[derive(Debug, Deserialize)]
struct BarRecord {
    date: NaiveDate,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    volume: Option<u64>,
}

impl From<BarRecord> for Bar {
    fn from(record: BarRecord) -> Self {
        Bar {
            date: record.date,
            open: record.open,
            high: record.high,
            low: record.low,
            close: record.close,
            volume: record.volume.unwrap_or(0),
        }
    }
}

pub fn load_bars(path: &Path) -> Result<Vec<Bar>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("open bars file {}", path.display()))?;
    read_bars(&mut reader).with_context(|| format!("read bars from {}", path.display()))
}

fn read_bars<R: std::io::Read>(reader: &mut csv::Reader<R>) -> Result<Vec<Bar>> {
    let mut bars: Vec<Bar> = Vec::new();
    for (row, record) in reader.deserialize::<BarRecord>().enumerate() {
        let bar: Bar = record.with_context(|| format!("row {}", row + 1))?.into();

        if let Some(prev) = bars.last() {
            if bar.date <= prev.date {
                bail!(
                    "row {}: date {} is not after {}; bars must be oldest first",
                    row + 1,
                    bar.date,
                    prev.date
                );
            }
        }
        if !bar.is_void() && !bar.is_sane() {
            warn!(row = row + 1, date = %bar.date, "bar fails OHLC sanity check");
        }
        bars.push(bar);
    }
    debug!(count = bars.len(), "bars loaded");
    Ok(bars)
}
