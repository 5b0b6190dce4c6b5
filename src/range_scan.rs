use crate::day_window::{DayWindowResolver, CORE_TIMEFRAME};
use crate::error::{validate_symbol, RangeError};
use crate::feed::BarFeed;
use crate::model::{DayWindow, RangeResult};

/// High/low extrema over a closed time range.
pub struct RangeScanner<F: BarFeed> {
    feed: F,
}

impl<F: BarFeed> RangeScanner<F> {
    pub fn new(feed: F) -> Self {
        Self { feed }
    }

    pub fn scan_high_low(&self, symbol: &str, from: i64, to: i64) -> Result<RangeResult, RangeError> {
        let symbol = validate_symbol(symbol)?;
        if from > to {
            return Err(RangeError::InvalidArgument(format!(
                "range start {} is after end {}",
                from, to
            )));
        }

        let bars = self
            .feed
            .fetch_bars_in_range(symbol, CORE_TIMEFRAME, from, to)
            .map_err(|e| RangeError::from_feed(symbol, e))?;
        let range = RangeResult::from_bars(&bars).ok_or_else(|| {
            RangeError::unavailable(symbol, format!("no bars between {} and {}", from, to))
        })?;

        tracing::debug!(
            symbol,
            from,
            to,
            high = range.high,
            low = range.low,
            bars = range.bar_count,
            "Scanned high/low"
        );
        Ok(range)
    }

    pub fn scan_window(&self, symbol: &str, window: DayWindow) -> Result<RangeResult, RangeError> {
        self.scan_high_low(symbol, window.start, window.end)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PreviousDayRange {
    pub window: DayWindow,
    pub range: RangeResult,
}

/// Resolve the previous local day from the last `sample_bars` bars and scan its
/// high/low from the same feed.
pub fn previous_day_range<F: BarFeed>(
    feed: &F,
    symbol: &str,
    sample_bars: usize,
) -> Result<PreviousDayRange, RangeError> {
    let window = DayWindowResolver::with_sample_size(feed, sample_bars)?
        .resolve_previous_day_window(symbol)?;
    let range = RangeScanner::new(feed).scan_window(symbol, window)?;
    Ok(PreviousDayRange { window, range })
}
