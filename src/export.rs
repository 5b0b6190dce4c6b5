use std::fs::OpenOptions;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::Serialize;

use crate::model::Bar;

pub const CSV_COLUMNS: [&str; 8] = [
    "time",
    "open",
    "high",
    "low",
    "close",
    "tick_volume",
    "spread",
    "real_volume",
];

/// Zone used to render the `time` column of exported files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputZone {
    Utc,
    Named(Tz),
}

impl OutputZone {
    /// `UTC` in any case, or an IANA name such as `Asia/Bangkok`.
    pub fn parse(name: &str) -> Result<Self> {
        let name = name.trim();
        if name.is_empty() || name.eq_ignore_ascii_case("utc") {
            return Ok(Self::Utc);
        }
        name.parse::<Tz>()
            .map(Self::Named)
            .map_err(|e| anyhow!("unknown timezone '{}': {}", name, e))
    }

    /// RFC 3339 rendering of a native timestamp in this zone.
    pub fn format(&self, native_ts: i64) -> Result<String> {
        let utc: DateTime<Utc> = DateTime::from_timestamp(native_ts, 0)
            .with_context(|| format!("timestamp {} is out of range", native_ts))?;
        Ok(match self {
            Self::Utc => utc.to_rfc3339(),
            Self::Named(tz) => utc.with_timezone(tz).to_rfc3339(),
        })
    }
}

#[derive(Serialize)]
struct ExportRow {
    time: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    tick_volume: u64,
    spread: i64,
    real_volume: u64,
}

/// Write `bars` to `path`. With `append`, rows go after the existing content
/// and the header is only written when the file did not exist yet.
pub fn export_csv(bars: &[Bar], path: &Path, zone: OutputZone, append: bool) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }

    let append = append && path.exists();
    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .append(append)
        .truncate(!append)
        .open(path)
        .with_context(|| format!("failed to open {}", path.display()))?;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(file);
    if !append {
        writer.write_record(CSV_COLUMNS)?;
    }
    for bar in bars {
        writer.serialize(ExportRow {
            time: zone.format(bar.time)?,
            open: bar.open,
            high: bar.high,
            low: bar.low,
            close: bar.close,
            tick_volume: bar.tick_volume,
            spread: bar.spread,
            real_volume: bar.real_volume,
        })?;
    }
    writer
        .flush()
        .with_context(|| format!("failed to write {}", path.display()))?;

    tracing::debug!(path = %path.display(), rows = bars.len(), append, "Exported bars");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utc_zone_parses_case_insensitively() {
        assert_eq!(OutputZone::parse("utc").unwrap(), OutputZone::Utc);
        assert_eq!(OutputZone::parse("UTC").unwrap(), OutputZone::Utc);
        assert!(matches!(
            OutputZone::parse("Asia/Bangkok").unwrap(),
            OutputZone::Named(_)
        ));
        assert!(OutputZone::parse("Mars/Olympus").is_err());
    }

    #[test]
    fn format_renders_offset() {
        assert_eq!(
            OutputZone::Utc.format(1_710_104_400).unwrap(),
            "2024-03-10T21:00:00+00:00"
        );
        let bangkok = OutputZone::parse("Asia/Bangkok").unwrap();
        assert_eq!(
            bangkok.format(1_710_104_400).unwrap(),
            "2024-03-11T04:00:00+07:00"
        );
    }
}
