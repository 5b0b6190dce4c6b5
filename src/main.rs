use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::sync::watch;

use day_range::config::Config;
use day_range::export::{export_csv, OutputZone};
use day_range::feed::{BarFeed, CsvFeed};
use day_range::model::timeframe::parse_timeframe_list;
use day_range::model::Timeframe;
use day_range::watcher::BarCloseWatcher;
use day_range::{previous_day_range, RangeScanner};

#[derive(Parser)]
#[command(
    name = "day-range",
    version,
    about = "Previous trading-day window and high/low range over 15-minute bars"
)]
struct Cli {
    /// Config file (defaults to $DAY_RANGE_CONFIG or config/default.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve the previous local day and print its high/low
    PrevDay { symbol: String },
    /// High/low over an explicit range of epoch seconds
    Range {
        symbol: String,
        #[arg(long)]
        from: i64,
        #[arg(long)]
        to: i64,
    },
    /// Write recent bars to a CSV file in a chosen timezone
    Export(ExportArgs),
    /// Append each newly closed bar to per-timeframe files until Ctrl-C
    Watch {
        symbol: String,
        /// Comma separated timeframes, e.g. M15,H1
        #[arg(long)]
        timeframes: Option<String>,
    },
}

#[derive(Parser)]
struct ExportArgs {
    symbol: String,
    /// Timeframe code such as M1, H1, D1
    #[arg(long)]
    timeframe: Option<String>,
    /// Number of recent bars to export
    #[arg(long)]
    bars: Option<usize>,
    /// IANA timezone used when writing timestamps
    #[arg(long)]
    timezone: Option<String>,
    /// Destination CSV file
    #[arg(long)]
    output: Option<PathBuf>,
    /// Append rows instead of rewriting the file
    #[arg(long, default_value_t = false)]
    append: bool,
}

fn load_config(path: Option<&PathBuf>) -> Result<Config> {
    match path {
        Some(p) => {
            dotenvy::dotenv().ok();
            Config::load_from_path(p)
        }
        None => Config::load(),
    }
}

fn init_tracing(level: &str, json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.with_ansi(false).json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref())?;
    init_tracing(&config.logging.level, config.logging.json);

    let feed = config.feed.csv_feed();
    tracing::debug!(data_dir = %config.feed.data_dir.display(), "Using CSV bar feed");

    match cli.command {
        Commands::PrevDay { symbol } => {
            let prev = previous_day_range(&feed, &symbol, config.report.sample_bars)?;
            println!(
                "{} previous day [{} .. {}] high={} low={} bars={}",
                symbol.trim(),
                prev.window.start,
                prev.window.end,
                prev.range.high,
                prev.range.low,
                prev.range.bar_count
            );
        }
        Commands::Range { symbol, from, to } => {
            let range = RangeScanner::new(&feed).scan_high_low(&symbol, from, to)?;
            println!(
                "{} [{} .. {}] high={} low={} bars={}",
                symbol.trim(),
                from,
                to,
                range.high,
                range.low,
                range.bar_count
            );
        }
        Commands::Export(args) => run_export(&config, &feed, args)?,
        Commands::Watch { symbol, timeframes } => {
            let timeframes = match timeframes {
                Some(list) => parse_timeframe_list(&list)?,
                None => config.watch.timeframes()?,
            };
            run_watch(&config, feed, &symbol, timeframes).await?;
        }
    }
    Ok(())
}

fn run_export(config: &Config, feed: &CsvFeed, args: ExportArgs) -> Result<()> {
    let timeframe: Timeframe = match args.timeframe {
        Some(tf) => tf.parse()?,
        None => config.export.timeframe()?,
    };
    let zone = OutputZone::parse(args.timezone.as_deref().unwrap_or(&config.export.timezone))?;
    let bars_wanted = args.bars.unwrap_or(config.export.bars);
    let output = args.output.unwrap_or_else(|| config.export.output.clone());

    let symbol = args.symbol.trim();
    let bars = feed
        .fetch_recent_bars(symbol, timeframe, bars_wanted)
        .with_context(|| format!("failed to read {} {} bars", symbol, timeframe))?;
    export_csv(&bars, &output, zone, args.append)?;
    println!(
        "Saved {} bars for {} {} -> {}",
        bars.len(),
        symbol,
        timeframe,
        output.display()
    );
    Ok(())
}

async fn run_watch(
    config: &Config,
    feed: CsvFeed,
    symbol: &str,
    timeframes: Vec<Timeframe>,
) -> Result<()> {
    let settings = config.watch.settings(&config.feed.filename_template)?;
    let watcher = BarCloseWatcher::new(feed, symbol, timeframes, settings)?;
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Ctrl-C received, stopping watcher");
            let _ = shutdown_tx.send(true);
        }
    });

    watcher.run(shutdown_rx).await
}
