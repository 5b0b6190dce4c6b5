use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::DateTime;
use serde::Deserialize;

use crate::feed::{select_range, select_recent, BarFeed};
use crate::model::{Bar, Timeframe};

pub const DEFAULT_FILENAME_TEMPLATE: &str = "{symbol}_{timeframe}.csv";

/// Directory of per-symbol, per-timeframe CSV files.
///
/// Files are re-read on every fetch so an external writer (or the watcher)
/// can keep them current.
#[derive(Debug, Clone)]
pub struct CsvFeed {
    dir: PathBuf,
    filename_template: String,
}

#[derive(Debug, Deserialize)]
struct CsvRow {
    time: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    #[serde(default)]
    tick_volume: u64,
    #[serde(default)]
    spread: i64,
    #[serde(default)]
    real_volume: u64,
}

impl CsvFeed {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self::with_template(dir, DEFAULT_FILENAME_TEMPLATE)
    }

    pub fn with_template(dir: impl Into<PathBuf>, filename_template: &str) -> Self {
        Self {
            dir: dir.into(),
            filename_template: filename_template.to_string(),
        }
    }

    pub fn path_for(&self, symbol: &str, timeframe: Timeframe) -> PathBuf {
        self.dir
            .join(render_filename(&self.filename_template, symbol, timeframe))
    }

    /// Whole series for a symbol, sorted oldest-first. Missing files read as empty.
    pub fn load_series(&self, symbol: &str, timeframe: Timeframe) -> Result<Vec<Bar>> {
        let path = self.path_for(symbol, timeframe);
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No bar file for series");
            return Ok(Vec::new());
        }
        let mut bars = read_bars(&path)?;
        bars.sort_by_key(|b| b.time);
        Ok(bars)
    }
}

impl BarFeed for CsvFeed {
    fn fetch_recent_bars(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        count: usize,
    ) -> Result<Vec<Bar>> {
        let series = self.load_series(symbol, timeframe)?;
        Ok(select_recent(&series, count))
    }

    fn fetch_bars_in_range(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        from: i64,
        to: i64,
    ) -> Result<Vec<Bar>> {
        let series = self.load_series(symbol, timeframe)?;
        Ok(select_range(&series, from, to))
    }
}

pub fn render_filename(template: &str, symbol: &str, timeframe: Timeframe) -> String {
    template
        .replace("{symbol}", symbol)
        .replace("{timeframe}", timeframe.code())
}

/// Read every row of a bar file. Errors name the file and line.
pub fn read_bars(path: &Path) -> Result<Vec<Bar>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open {}", path.display()))?;

    let mut bars = Vec::new();
    for (idx, row) in reader.deserialize::<CsvRow>().enumerate() {
        // header is line 1
        let line = idx + 2;
        let row = row.with_context(|| format!("{}:{}: malformed bar row", path.display(), line))?;
        let time = parse_time(&row.time)
            .with_context(|| format!("{}:{}: bad time column", path.display(), line))?;
        bars.push(Bar {
            time,
            open: row.open,
            high: row.high,
            low: row.low,
            close: row.close,
            tick_volume: row.tick_volume,
            spread: row.spread,
            real_volume: row.real_volume,
        });
    }
    Ok(bars)
}

/// Epoch seconds, RFC 3339, or `YYYY-MM-DD HH:MM:SS+HH:MM`.
pub fn parse_time(raw: &str) -> Result<i64> {
    let raw = raw.trim();
    if let Ok(secs) = raw.parse::<i64>() {
        return Ok(secs);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.timestamp());
    }
    if let Ok(dt) = DateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%:z") {
        return Ok(dt.timestamp());
    }
    bail!("unrecognised timestamp '{}'", raw)
}
