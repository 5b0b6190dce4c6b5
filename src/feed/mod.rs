pub mod csv_file;
pub mod memory;

use anyhow::Result;

use crate::model::{Bar, Timeframe};

pub use csv_file::CsvFeed;
pub use memory::MemoryFeed;

/// Source of historical bars. Every returned series is ordered oldest-first.
pub trait BarFeed {
    /// Up to `count` most recent bars, newest last.
    fn fetch_recent_bars(&self, symbol: &str, timeframe: Timeframe, count: usize)
        -> Result<Vec<Bar>>;

    /// Every bar whose time lies in `[from, to]`.
    fn fetch_bars_in_range(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        from: i64,
        to: i64,
    ) -> Result<Vec<Bar>>;
}

impl<F: BarFeed + ?Sized> BarFeed for &F {
    fn fetch_recent_bars(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        count: usize,
    ) -> Result<Vec<Bar>> {
        (**self).fetch_recent_bars(symbol, timeframe, count)
    }

    fn fetch_bars_in_range(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        from: i64,
        to: i64,
    ) -> Result<Vec<Bar>> {
        (**self).fetch_bars_in_range(symbol, timeframe, from, to)
    }
}

/// Tail of a sorted series.
pub(crate) fn select_recent(series: &[Bar], count: usize) -> Vec<Bar> {
    let skip = series.len().saturating_sub(count);
    series[skip..].to_vec()
}

/// Inclusive time slice of a sorted series.
pub(crate) fn select_range(series: &[Bar], from: i64, to: i64) -> Vec<Bar> {
    if from > to {
        return Vec::new();
    }
    let lo = series.partition_point(|b| b.time < from);
    let hi = series.partition_point(|b| b.time <= to);
    series[lo..hi].to_vec()
}
