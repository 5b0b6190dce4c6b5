pub mod bar;
pub mod timeframe;
pub mod window;

pub use bar::{Bar, RangeResult};
pub use timeframe::Timeframe;
pub use window::DayWindow;
