pub mod clock;
pub mod config;
pub mod day_window;
pub mod error;
pub mod export;
pub mod feed;
pub mod model;
pub mod range_scan;
pub mod watcher;

pub use day_window::DayWindowResolver;
pub use error::RangeError;
pub use feed::BarFeed;
pub use range_scan::{previous_day_range, PreviousDayRange, RangeScanner};
