/// One fixed-interval OHLC bar as delivered by a feed.
///
/// `time` is the bar open time in native UTC epoch seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bar {
    pub time: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub tick_volume: u64,
    pub spread: i64,
    pub real_volume: u64,
}

impl Bar {
    /// Price-only bar with zeroed volume columns.
    pub fn ohlc(time: i64, open: f64, high: f64, low: f64, close: f64) -> Self {
        Self {
            time,
            open,
            high,
            low,
            close,
            tick_volume: 0,
            spread: 0,
            real_volume: 0,
        }
    }
}

/// Extrema over a run of bars. Only ever built from at least one bar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeResult {
    pub high: f64,
    pub low: f64,
    pub bar_count: usize,
}

impl RangeResult {
    /// Seed from the first bar and fold the rest; `None` for an empty slice.
    pub fn from_bars(bars: &[Bar]) -> Option<Self> {
        let (first, rest) = bars.split_first()?;
        let (high, low) = rest
            .iter()
            .fold((first.high, first.low), |(hi, lo), b| {
                (hi.max(b.high), lo.min(b.low))
            });
        Some(Self {
            high,
            low,
            bar_count: bars.len(),
        })
    }
}
