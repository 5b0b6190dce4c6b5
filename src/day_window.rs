//! Previous-day boundary detection.
//!
//! The newest bar in a sample defines the current local day. The resolver
//! walks back from it, locks onto the first different day, and turns that
//! day into a native-time window.

use crate::clock::{local_day_start, DayKey};
use crate::error::{validate_symbol, RangeError};
use crate::feed::BarFeed;
use crate::model::{Bar, DayWindow, Timeframe};

pub const DEFAULT_SAMPLE_BARS: usize = 400;

/// Periodicity the core reads.
pub const CORE_TIMEFRAME: Timeframe = Timeframe::M15;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    SeekingPreviousDay,
    InPreviousDayRun { day: DayKey, anchor: i64 },
    Done { anchor: i64 },
}

impl ScanState {
    fn step(self, current: DayKey, key: DayKey, time: i64) -> Self {
        match self {
            Self::SeekingPreviousDay if key == current => self,
            Self::SeekingPreviousDay => Self::InPreviousDayRun { day: key, anchor: time },
            Self::InPreviousDayRun { day, .. } if key == day => {
                Self::InPreviousDayRun { day, anchor: time }
            }
            Self::InPreviousDayRun { anchor, .. } => Self::Done { anchor },
            Self::Done { .. } => self,
        }
    }

    fn anchor(self) -> Option<i64> {
        match self {
            Self::SeekingPreviousDay => None,
            Self::InPreviousDayRun { anchor, .. } | Self::Done { anchor } => Some(anchor),
        }
    }
}

/// Native time of a bar inside the most recent completed local day of `bars`
/// (oldest-first). The anchor is the last bar visited in that day's run,
/// which is its chronologically earliest bar since the walk goes newest to
/// oldest. `Ok(None)` when only the current day is present.
pub fn previous_day_anchor(bars: &[Bar]) -> Result<Option<i64>, String> {
    let Some(newest) = bars.last() else {
        return Ok(None);
    };
    let current = day_key(newest.time)?;

    let mut state = ScanState::SeekingPreviousDay;
    for bar in bars.iter().rev() {
        state = state.step(current, day_key(bar.time)?, bar.time);
        if matches!(state, ScanState::Done { .. }) {
            break;
        }
    }
    Ok(state.anchor())
}

fn day_key(time: i64) -> Result<DayKey, String> {
    DayKey::of(time).ok_or_else(|| format!("bar time {} is out of range", time))
}

/// Resolves the previous local day's window from a bar feed.
pub struct DayWindowResolver<F: BarFeed> {
    feed: F,
    sample_bars: usize,
}

impl<F: BarFeed> DayWindowResolver<F> {
    pub fn new(feed: F) -> Self {
        Self {
            feed,
            sample_bars: DEFAULT_SAMPLE_BARS,
        }
    }

    /// Sample the last `sample_bars` bars instead of the default 400.
    /// A zero sample is rejected as `InvalidArgument`, matching config validation.
    pub fn with_sample_size(feed: F, sample_bars: usize) -> Result<Self, RangeError> {
        if sample_bars == 0 {
            return Err(RangeError::InvalidArgument(
                "sample size must be at least one bar".to_string(),
            ));
        }
        Ok(Self { feed, sample_bars })
    }

    pub fn sample_bars(&self) -> usize {
        self.sample_bars
    }

    pub fn resolve_previous_day_window(&self, symbol: &str) -> Result<DayWindow, RangeError> {
        let symbol = validate_symbol(symbol)?;
        let bars = self
            .feed
            .fetch_recent_bars(symbol, CORE_TIMEFRAME, self.sample_bars)
            .map_err(|e| RangeError::from_feed(symbol, e))?;
        if bars.is_empty() {
            return Err(RangeError::unavailable(symbol, "feed returned no bars"));
        }

        let anchor = previous_day_anchor(&bars)
            .map_err(|reason| RangeError::unavailable(symbol, reason))?
            .ok_or_else(|| RangeError::InsufficientHistory {
                symbol: symbol.to_string(),
                sampled: bars.len(),
            })?;
        let start = local_day_start(anchor).ok_or_else(|| {
            RangeError::unavailable(symbol, format!("bar time {} is out of range", anchor))
        })?;
        let window = DayWindow::from_start(start);

        tracing::debug!(
            symbol,
            sampled = bars.len(),
            anchor,
            start = window.start,
            end = window.end,
            "Resolved previous day window"
        );
        Ok(window)
    }
}
