use crate::clock::SECS_PER_DAY;

/// Closed `[start, end]` interval of native timestamps covering one local day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayWindow {
    pub start: i64,
    pub end: i64,
}

impl DayWindow {
    pub fn from_start(start: i64) -> Self {
        Self {
            start,
            end: start + SECS_PER_DAY - 1,
        }
    }

    pub fn contains(&self, ts: i64) -> bool {
        ts >= self.start && ts <= self.end
    }

    /// The local day immediately after this one.
    pub fn following(&self) -> Self {
        Self::from_start(self.start + SECS_PER_DAY)
    }
}
