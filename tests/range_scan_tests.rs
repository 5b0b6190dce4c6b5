use day_range::clock::SECS_PER_DAY;
use day_range::day_window::DEFAULT_SAMPLE_BARS;
use day_range::feed::MemoryFeed;
use day_range::model::{Bar, DayWindow, Timeframe};
use day_range::{previous_day_range, RangeError, RangeScanner};

const PREV_DAY: i64 = 1_710_104_400;
const STEP: i64 = 900;

fn hl(time: i64, high: f64, low: f64) -> Bar {
    Bar::ohlc(time, (high + low) / 2.0, high, low, (high + low) / 2.0)
}

fn feed_with(bars: Vec<Bar>) -> MemoryFeed {
    MemoryFeed::new().with_series("XAUUSD", Timeframe::M15, bars)
}

#[test]
fn scans_high_and_low_of_window() {
    let feed = feed_with(vec![
        hl(PREV_DAY, 10.0, 9.0),
        hl(PREV_DAY + STEP, 12.0, 8.0),
        hl(PREV_DAY + 2 * STEP, 11.0, 9.5),
    ]);
    let window = DayWindow::from_start(PREV_DAY);
    let r = RangeScanner::new(&feed)
        .scan_high_low("XAUUSD", window.start, window.end)
        .unwrap();
    assert!((r.high - 12.0).abs() < f64::EPSILON);
    assert!((r.low - 8.0).abs() < f64::EPSILON);
    assert_eq!(r.bar_count, 3);
}

#[test]
fn range_bounds_are_inclusive() {
    let feed = feed_with(vec![
        hl(PREV_DAY - STEP, 50.0, 1.0),
        hl(PREV_DAY, 10.0, 9.0),
        hl(PREV_DAY + STEP, 11.0, 9.0),
        hl(PREV_DAY + 2 * STEP, 60.0, 2.0),
    ]);
    let scanner = RangeScanner::new(&feed);

    let r = scanner
        .scan_high_low("XAUUSD", PREV_DAY, PREV_DAY + STEP)
        .unwrap();
    assert_eq!(r.bar_count, 2);
    assert!((r.high - 11.0).abs() < f64::EPSILON);
    assert!((r.low - 9.0).abs() < f64::EPSILON);

    let single = scanner.scan_high_low("XAUUSD", PREV_DAY, PREV_DAY).unwrap();
    assert_eq!(single.bar_count, 1);
}

#[test]
fn inverted_range_is_invalid() {
    let feed = feed_with(vec![hl(PREV_DAY, 10.0, 9.0)]);
    assert!(matches!(
        RangeScanner::new(&feed).scan_high_low("XAUUSD", PREV_DAY + 1, PREV_DAY),
        Err(RangeError::InvalidArgument(_))
    ));
}

#[test]
fn empty_symbol_is_invalid() {
    let feed = feed_with(vec![hl(PREV_DAY, 10.0, 9.0)]);
    assert!(matches!(
        RangeScanner::new(&feed).scan_high_low("", PREV_DAY, PREV_DAY + 10),
        Err(RangeError::InvalidArgument(_))
    ));
}

#[test]
fn empty_range_is_data_unavailable() {
    let feed = feed_with(vec![hl(PREV_DAY, 10.0, 9.0)]);
    let err = RangeScanner::new(&feed)
        .scan_high_low("XAUUSD", PREV_DAY + 1, PREV_DAY + STEP - 1)
        .unwrap_err();
    assert!(matches!(err, RangeError::DataUnavailable { .. }));

    let err = RangeScanner::new(&feed)
        .scan_high_low("GBPUSD", PREV_DAY, PREV_DAY + SECS_PER_DAY)
        .unwrap_err();
    assert!(matches!(err, RangeError::DataUnavailable { .. }));
}

#[test]
fn low_never_exceeds_high_and_count_matches_feed() {
    let bars: Vec<Bar> = (0..96)
        .map(|i| {
            let base = 100.0 + ((i * 37) % 11) as f64;
            hl(PREV_DAY + i * STEP, base + 0.5, base - 0.5)
        })
        .collect();
    let feed = feed_with(bars);
    let window = DayWindow::from_start(PREV_DAY);
    let scanner = RangeScanner::new(&feed);
    let r = scanner.scan_window("XAUUSD", window).unwrap();
    assert!(r.low <= r.high);
    assert_eq!(r.bar_count, 96);
    assert_eq!(scanner.scan_window("XAUUSD", window).unwrap(), r);
}

#[test]
/// Extremes on neighbouring days must not leak into the previous-day range.
fn previous_day_range_composes_resolver_and_scanner() {
    let mut bars = Vec::new();
    for i in 0..96 {
        bars.push(hl(PREV_DAY - SECS_PER_DAY + i * STEP, 500.0, 1.0));
    }
    for i in 0..96 {
        let high = if i == 40 { 120.0 } else { 110.0 };
        let low = if i == 70 { 90.0 } else { 100.0 };
        bars.push(hl(PREV_DAY + i * STEP, high, low));
    }
    for i in 0..20 {
        bars.push(hl(PREV_DAY + SECS_PER_DAY + i * STEP, 900.0, 0.5));
    }
    let feed = feed_with(bars);

    let prev = previous_day_range(&feed, "XAUUSD", DEFAULT_SAMPLE_BARS).unwrap();
    assert_eq!(prev.window, DayWindow::from_start(PREV_DAY));
    assert!((prev.range.high - 120.0).abs() < f64::EPSILON);
    assert!((prev.range.low - 90.0).abs() < f64::EPSILON);
    assert_eq!(prev.range.bar_count, 96);
}

#[test]
/// The sample size reaches the resolver: 20 bars only cover the current day.
fn previous_day_range_honours_sample_size() {
    let mut bars = Vec::new();
    for i in 0..96 {
        bars.push(hl(PREV_DAY + i * STEP, 110.0, 100.0));
    }
    for i in 0..20 {
        bars.push(hl(PREV_DAY + SECS_PER_DAY + i * STEP, 900.0, 0.5));
    }
    let feed = feed_with(bars);

    assert_eq!(
        previous_day_range(&feed, "XAUUSD", 20),
        Err(RangeError::InsufficientHistory {
            symbol: "XAUUSD".to_string(),
            sampled: 20,
        })
    );
    let prev = previous_day_range(&feed, "XAUUSD", 21).unwrap();
    assert_eq!(prev.window, DayWindow::from_start(PREV_DAY));
    assert_eq!(prev.range.bar_count, 96);
    assert!(matches!(
        previous_day_range(&feed, "XAUUSD", 0),
        Err(RangeError::InvalidArgument(_))
    ));
}

#[test]
fn previous_day_range_propagates_resolver_errors() {
    let feed = feed_with(vec![hl(PREV_DAY, 10.0, 9.0)]);
    assert!(matches!(
        previous_day_range(&feed, "XAUUSD", DEFAULT_SAMPLE_BARS),
        Err(RangeError::InsufficientHistory { .. })
    ));
    assert!(matches!(
        previous_day_range(&feed, "", DEFAULT_SAMPLE_BARS),
        Err(RangeError::InvalidArgument(_))
    ));
}
