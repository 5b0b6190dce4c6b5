use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use crate::day_window::DEFAULT_SAMPLE_BARS;
use crate::export::OutputZone;
use crate::feed::csv_file::DEFAULT_FILENAME_TEMPLATE;
use crate::feed::CsvFeed;
use crate::model::timeframe::parse_timeframe_list;
use crate::model::Timeframe;
use crate::watcher::WatchSettings;

pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";
pub const CONFIG_PATH_ENV: &str = "DAY_RANGE_CONFIG";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub feed: FeedConfig,
    #[serde(default)]
    pub report: ReportConfig,
    #[serde(default)]
    pub export: ExportConfig,
    #[serde(default)]
    pub watch: WatchConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    pub data_dir: PathBuf,
    #[serde(default = "default_filename_template")]
    pub filename_template: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReportConfig {
    #[serde(default = "default_sample_bars")]
    pub sample_bars: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExportConfig {
    pub timeframe: String,
    pub bars: usize,
    pub timezone: String,
    pub output: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WatchConfig {
    pub timeframes: Vec<String>,
    pub bars_to_keep: usize,
    pub out_dir: PathBuf,
    pub timezone: String,
    pub poll_ms: u64,
    #[serde(default)]
    pub full_refresh_on_close: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    #[serde(default)]
    pub json: bool,
}

fn default_filename_template() -> String {
    DEFAULT_FILENAME_TEMPLATE.to_string()
}

fn default_sample_bars() -> usize {
    DEFAULT_SAMPLE_BARS
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            filename_template: default_filename_template(),
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            sample_bars: default_sample_bars(),
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            timeframe: "M1".to_string(),
            bars: 100,
            timezone: "UTC".to_string(),
            output: PathBuf::from("data/ohlcv.csv"),
        }
    }
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            timeframes: vec!["M15".to_string()],
            bars_to_keep: 200,
            out_dir: PathBuf::from("data/live"),
            timezone: "UTC".to_string(),
            poll_ms: 500,
            full_refresh_on_close: false,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl FeedConfig {
    pub fn csv_feed(&self) -> CsvFeed {
        CsvFeed::with_template(self.data_dir.clone(), &self.filename_template)
    }
}

impl ExportConfig {
    pub fn timeframe(&self) -> Result<Timeframe> {
        self.timeframe.parse()
    }
}

impl WatchConfig {
    pub fn timeframes(&self) -> Result<Vec<Timeframe>> {
        parse_timeframe_list(&self.timeframes.join(","))
    }

    pub fn settings(&self, filename_template: &str) -> Result<WatchSettings> {
        Ok(WatchSettings {
            out_dir: self.out_dir.clone(),
            filename_template: filename_template.to_string(),
            zone: OutputZone::parse(&self.timezone)?,
            bars_to_keep: self.bars_to_keep.max(2),
            full_refresh_on_close: self.full_refresh_on_close,
            poll_interval: Duration::from_millis(self.poll_ms.max(1)),
        })
    }
}

impl Config {
    /// Load from `$DAY_RANGE_CONFIG`, else `config/default.toml`.
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let path = std::env::var(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));
        Self::load_from_path(&path)
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let config_str = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let config: Config = toml::from_str(&config_str)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.report.sample_bars == 0 {
            bail!("report.sample_bars must be > 0");
        }
        self.export
            .timeframe()
            .context("export.timeframe is invalid")?;
        OutputZone::parse(&self.export.timezone).context("export.timezone is invalid")?;
        self.watch
            .timeframes()
            .context("watch.timeframes is invalid")?;
        OutputZone::parse(&self.watch.timezone).context("watch.timezone is invalid")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_full_toml() {
        let toml_str = r#"
[feed]
data_dir = "bars"
filename_template = "{symbol}-{timeframe}.csv"

[report]
sample_bars = 500

[export]
timeframe = "h1"
bars = 250
timezone = "Asia/Bangkok"
output = "out/eurusd.csv"

[watch]
timeframes = ["M15", "1H"]
bars_to_keep = 300
out_dir = "live"
timezone = "UTC"
poll_ms = 250
full_refresh_on_close = true

[logging]
level = "debug"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        config.validate().unwrap();
        assert_eq!(config.feed.data_dir, PathBuf::from("bars"));
        assert_eq!(config.report.sample_bars, 500);
        assert_eq!(config.export.timeframe().unwrap(), Timeframe::H1);
        assert_eq!(
            config.watch.timeframes().unwrap(),
            vec![Timeframe::M15, Timeframe::H1]
        );
        let settings = config.watch.settings(&config.feed.filename_template).unwrap();
        assert!(settings.full_refresh_on_close);
        assert_eq!(settings.poll_interval, Duration::from_millis(250));
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn missing_sections_fall_back_to_defaults() {
        let config: Config = toml::from_str("").unwrap();
        config.validate().unwrap();
        assert_eq!(config.report.sample_bars, DEFAULT_SAMPLE_BARS);
        assert_eq!(config.feed.filename_template, DEFAULT_FILENAME_TEMPLATE);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn validate_rejects_bad_values() {
        let mut config = Config::default();
        config.report.sample_bars = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.export.timezone = "Nowhere/Land".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.watch.timeframes = vec!["M7".to_string()];
        assert!(config.validate().is_err());
    }
}
