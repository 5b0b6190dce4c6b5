use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;

use crate::error::validate_symbol;
use crate::export::{export_csv, OutputZone};
use crate::feed::csv_file::{render_filename, DEFAULT_FILENAME_TEMPLATE};
use crate::feed::BarFeed;
use crate::model::Timeframe;

#[derive(Debug, Clone)]
pub struct WatchSettings {
    pub out_dir: PathBuf,
    pub filename_template: String,
    pub zone: OutputZone,
    pub bars_to_keep: usize,
    pub full_refresh_on_close: bool,
    pub poll_interval: Duration,
}

impl Default for WatchSettings {
    fn default() -> Self {
        Self {
            out_dir: PathBuf::from("data/live"),
            filename_template: DEFAULT_FILENAME_TEMPLATE.to_string(),
            zone: OutputZone::Utc,
            bars_to_keep: 200,
            full_refresh_on_close: false,
            poll_interval: Duration::from_millis(500),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BarClosed {
    pub timeframe: Timeframe,
    pub time: i64,
    pub full_refresh: bool,
}

/// Polls a feed and mirrors each newly closed bar into per-timeframe CSV files.
pub struct BarCloseWatcher<F: BarFeed> {
    feed: F,
    symbol: String,
    timeframes: Vec<Timeframe>,
    settings: WatchSettings,
    last_closed: HashMap<Timeframe, i64>,
}

impl<F: BarFeed> BarCloseWatcher<F> {
    pub fn new(
        feed: F,
        symbol: &str,
        timeframes: Vec<Timeframe>,
        settings: WatchSettings,
    ) -> Result<Self> {
        let symbol = validate_symbol(symbol)?.to_string();
        Ok(Self {
            feed,
            symbol,
            timeframes,
            settings,
            last_closed: HashMap::new(),
        })
    }

    pub fn output_path(&self, timeframe: Timeframe) -> PathBuf {
        self.settings.out_dir.join(render_filename(
            &self.settings.filename_template,
            &self.symbol,
            timeframe,
        ))
    }

    pub fn last_closed(&self, timeframe: Timeframe) -> Option<i64> {
        self.last_closed.get(&timeframe).copied()
    }

    /// Create missing output files from recent history and seed close times.
    pub fn prime(&mut self) -> Result<()> {
        for tf in self.timeframes.clone() {
            let path = self.output_path(tf);
            if !path.exists() {
                self.write_snapshot(tf, &path)?;
            }
            match self.feed.fetch_recent_bars(&self.symbol, tf, 2) {
                Ok(bars) => {
                    if let Some(last) = bars.last() {
                        self.last_closed.insert(tf, last.time);
                    }
                }
                Err(e) => {
                    tracing::warn!(
                        symbol = %self.symbol,
                        timeframe = %tf,
                        error = %e,
                        "Failed to seed last closed bar"
                    );
                }
            }
        }
        Ok(())
    }

    /// One pass over every timeframe. Returns the bars that closed since the last pass.
    pub fn poll_once(&mut self) -> Result<Vec<BarClosed>> {
        let mut closed = Vec::new();
        for tf in self.timeframes.clone() {
            let bars = match self.feed.fetch_recent_bars(&self.symbol, tf, 2) {
                Ok(bars) if bars.len() >= 2 => bars,
                Ok(_) => continue,
                Err(e) => {
                    tracing::warn!(
                        symbol = %self.symbol,
                        timeframe = %tf,
                        error = %e,
                        "Poll failed"
                    );
                    continue;
                }
            };
            let latest = bars[bars.len() - 1];

            let Some(previous) = self.last_closed(tf) else {
                self.last_closed.insert(tf, latest.time);
                continue;
            };
            if latest.time <= previous {
                continue;
            }

            let path = self.output_path(tf);
            if self.settings.full_refresh_on_close {
                self.write_snapshot(tf, &path)?;
            } else {
                export_csv(&[latest], &path, self.settings.zone, true)?;
            }
            self.last_closed.insert(tf, latest.time);
            tracing::info!(
                symbol = %self.symbol,
                timeframe = %tf,
                time = latest.time,
                full_refresh = self.settings.full_refresh_on_close,
                "Bar closed"
            );
            closed.push(BarClosed {
                timeframe: tf,
                time: latest.time,
                full_refresh: self.settings.full_refresh_on_close,
            });
        }
        Ok(closed)
    }

    /// Prime, then poll until `shutdown` turns true or its sender is dropped.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) -> Result<()> {
        self.prime()?;
        tracing::info!(
            symbol = %self.symbol,
            timeframes = ?self.timeframes,
            "Watching for closed bars"
        );

        let mut ticker = tokio::time::interval(self.settings.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            let stopping = *shutdown.borrow();
            if stopping {
                break;
            }
            tokio::select! {
                _ = ticker.tick() => {
                    self.poll_once()?;
                }
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }
        tracing::info!(symbol = %self.symbol, "Watcher stopped");
        Ok(())
    }

    fn write_snapshot(&self, tf: Timeframe, path: &Path) -> Result<()> {
        let bars = self
            .feed
            .fetch_recent_bars(&self.symbol, tf, self.settings.bars_to_keep)?;
        export_csv(&bars, path, self.settings.zone, false)
    }
}
