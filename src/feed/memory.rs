use std::collections::HashMap;

use anyhow::Result;

use crate::feed::{select_range, select_recent, BarFeed};
use crate::model::{Bar, Timeframe};

/// In-memory series keyed by symbol and timeframe.
#[derive(Debug, Clone, Default)]
pub struct MemoryFeed {
    series: HashMap<(String, Timeframe), Vec<Bar>>,
}

impl MemoryFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the series for `symbol`/`timeframe`. Bars are sorted by time.
    pub fn insert(&mut self, symbol: &str, timeframe: Timeframe, mut bars: Vec<Bar>) {
        bars.sort_by_key(|b| b.time);
        self.series.insert((symbol.to_string(), timeframe), bars);
    }

    pub fn with_series(mut self, symbol: &str, timeframe: Timeframe, bars: Vec<Bar>) -> Self {
        self.insert(symbol, timeframe, bars);
        self
    }

    /// Append one bar, keeping the series sorted.
    pub fn push(&mut self, symbol: &str, timeframe: Timeframe, bar: Bar) {
        let series = self
            .series
            .entry((symbol.to_string(), timeframe))
            .or_default();
        let at = series.partition_point(|b| b.time <= bar.time);
        series.insert(at, bar);
    }

    fn get(&self, symbol: &str, timeframe: Timeframe) -> &[Bar] {
        self.series
            .get(&(symbol.to_string(), timeframe))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

impl BarFeed for MemoryFeed {
    fn fetch_recent_bars(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        count: usize,
    ) -> Result<Vec<Bar>> {
        Ok(select_recent(self.get(symbol, timeframe), count))
    }

    fn fetch_bars_in_range(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        from: i64,
        to: i64,
    ) -> Result<Vec<Bar>> {
        Ok(select_range(self.get(symbol, timeframe), from, to))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_series_is_empty() {
        let feed = MemoryFeed::new();
        assert!(feed
            .fetch_recent_bars("EURUSD", Timeframe::M15, 10)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn series_are_sorted_and_isolated_by_timeframe() {
        let mut feed = MemoryFeed::new().with_series(
            "EURUSD",
            Timeframe::M15,
            vec![
                Bar::ohlc(1_800, 1.0, 1.0, 1.0, 1.0),
                Bar::ohlc(0, 1.0, 1.0, 1.0, 1.0),
            ],
        );
        feed.push("EURUSD", Timeframe::M15, Bar::ohlc(900, 1.0, 1.0, 1.0, 1.0));

        let times: Vec<i64> = feed
            .fetch_recent_bars("EURUSD", Timeframe::M15, 10)
            .unwrap()
            .iter()
            .map(|b| b.time)
            .collect();
        assert_eq!(times, vec![0, 900, 1_800]);
        assert!(feed
            .fetch_bars_in_range("EURUSD", Timeframe::H1, 0, 10_000)
            .unwrap()
            .is_empty());
    }
}
