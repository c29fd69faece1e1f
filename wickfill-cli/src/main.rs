//! Wickfill CLI — fetch and run commands.
//!
//! Commands:
//! - `fetch` — download OHLCV candles from an exchange and save as CSV
//! - `run` — execute a backtest from a TOML config file or inline flags
//! - `strategies` — list the registered strategy ids

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use wickfill_core::config::RunConfig;
use wickfill_core::domain::Candle;
use wickfill_core::strategy::{StrategyParams, StrategyRegistry};
use wickfill_core::{backtest, PerformanceReport};
use wickfill_data::canonicalize::canonicalize;
use wickfill_data::ingest;
use wickfill_data::{HistoricalFeed, OhlcvRequest};

#[derive(Parser)]
#[command(name = "wickfill", about = "Wickfill CLI — wick-fill backtesting engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download OHLCV candles from an exchange and save them as CSV.
    Fetch {
        /// Unified symbol (e.g., BTC/USDT).
        #[arg(default_value = "BTC/USDT")]
        symbol: String,

        /// Candle timeframe (e.g., 1m, 1h, 1d).
        #[arg(long, default_value = "1h")]
        timeframe: String,

        /// Earliest candle date (YYYY-MM-DD). Defaults to 2023-01-01.
        #[arg(long)]
        since: Option<String>,

        /// Maximum number of candles.
        #[arg(long, default_value_t = 500)]
        limit: usize,

        /// Exchange id. Only binance is supported.
        #[arg(long, default_value = "binance")]
        exchange: String,

        /// Output CSV path.
        #[arg(long, default_value = "candles.csv")]
        output: PathBuf,
    },
    /// Execute a backtest from a TOML config file or inline flags.
    Run {
        /// Path to a TOML config file ([strategy], [account], [costs]).
        #[arg(long)]
        config: Option<PathBuf>,

        /// Strategy id (ignores --config when set).
        #[arg(long)]
        strategy: Option<String>,

        /// Strategy parameter override, repeatable (e.g., --param wick_threshold=0.6).
        #[arg(long = "param", value_name = "KEY=VALUE")]
        params: Vec<String>,

        /// Starting capital.
        #[arg(long, default_value_t = 10_000.0)]
        capital: f64,

        /// Proportional fee per fill.
        #[arg(long, default_value_t = 0.001)]
        fee: f64,

        /// Proportional slippage per fill.
        #[arg(long, default_value_t = 0.001)]
        slippage: f64,

        /// Candle CSV to backtest on. Without it, candles come from the exchange.
        #[arg(long)]
        data: Option<PathBuf>,

        /// Symbol to fetch when --data is not given.
        #[arg(long, default_value = "BTC/USDT")]
        symbol: String,

        /// Timeframe to fetch when --data is not given.
        #[arg(long, default_value = "1h")]
        timeframe: String,

        /// Earliest candle date (YYYY-MM-DD) when fetching.
        #[arg(long)]
        since: Option<String>,

        /// Maximum candles when fetching.
        #[arg(long, default_value_t = 500)]
        limit: usize,

        /// Exchange to fetch from.
        #[arg(long, default_value = "binance")]
        exchange: String,

        /// Write the closed trades to this CSV path.
        #[arg(long)]
        trades: Option<PathBuf>,

        /// Print the report as JSON instead of the text summary.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// List the registered strategy ids.
    Strategies,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Fetch {
            symbol,
            timeframe,
            since,
            limit,
            exchange,
            output,
        } => run_fetch(&symbol, &timeframe, since.as_deref(), limit, &exchange, &output),
        Commands::Run {
            config,
            strategy,
            params,
            capital,
            fee,
            slippage,
            data,
            symbol,
            timeframe,
            since,
            limit,
            exchange,
            trades,
            json,
        } => run_backtest_cmd(RunArgs {
            config,
            strategy,
            params,
            capital,
            fee,
            slippage,
            data,
            symbol,
            timeframe,
            since,
            limit,
            exchange,
            trades,
            json,
        }),
        Commands::Strategies => {
            for name in StrategyRegistry::with_builtins().names() {
                println!("{name}");
            }
            Ok(())
        }
    }
}

fn run_fetch(
    symbol: &str,
    timeframe: &str,
    since: Option<&str>,
    limit: usize,
    exchange: &str,
    output: &Path,
) -> Result<()> {
    let mut request = OhlcvRequest::new(symbol, timeframe).limit(limit);
    if let Some(date) = since {
        request = request.since(parse_since_ms(date)?);
    }

    let mut feed = HistoricalFeed::for_exchange(exchange)?;
    let series = feed.fetch_historical(&request, true);
    if series.is_empty() {
        bail!("no candles fetched for {symbol}");
    }

    ingest::write_candles(output, &series)?;
    println!("Saved {} candles to {}", series.len(), output.display());
    Ok(())
}

struct RunArgs {
    config: Option<PathBuf>,
    strategy: Option<String>,
    params: Vec<String>,
    capital: f64,
    fee: f64,
    slippage: f64,
    data: Option<PathBuf>,
    symbol: String,
    timeframe: String,
    since: Option<String>,
    limit: usize,
    exchange: String,
    trades: Option<PathBuf>,
    json: bool,
}

fn run_backtest_cmd(args: RunArgs) -> Result<()> {
    if args.config.is_some() && args.strategy.is_some() {
        bail!("--config and --strategy are mutually exclusive");
    }

    let config = if let Some(path) = &args.config {
        RunConfig::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?
    } else {
        build_config_from_flags(&args)?
    };

    let series = load_series(&args)?;
    if series.is_empty() {
        bail!("no candles to backtest");
    }

    let (report, trade_list) = backtest(
        &config.strategy.name,
        &series,
        &config.strategy.params,
        config.account.initial_capital,
        config.costs.fee_rate,
        config.costs.slippage_rate,
    )?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_summary(&config.strategy.name, &series, &report);
    }

    if let Some(path) = &args.trades {
        ingest::export_trades(path, &trade_list)?;
        println!("Trades saved to: {}", path.display());
    }

    Ok(())
}

fn build_config_from_flags(args: &RunArgs) -> Result<RunConfig> {
    let mut params = StrategyParams::new();
    for raw in &args.params {
        let (key, value) = raw
            .split_once('=')
            .with_context(|| format!("bad --param '{raw}', expected KEY=VALUE"))?;
        let value: f64 = value
            .parse()
            .with_context(|| format!("bad --param value in '{raw}'"))?;
        params = params.set(key, value);
    }

    let strategy = args.strategy.clone().unwrap_or_else(|| "wick_fill".into());
    // Route through TOML so flags and config files share one parse path.
    let toml_str = format!(
        r#"[strategy]
name = "{strategy}"

[account]
initial_capital = {capital:?}

[costs]
fee_rate = {fee:?}
slippage_rate = {slippage:?}
"#,
        capital = args.capital,
        fee = args.fee,
        slippage = args.slippage,
    );
    let mut config = RunConfig::from_toml(&toml_str)?;
    config.strategy.params = params;
    Ok(config)
}

fn load_series(args: &RunArgs) -> Result<Vec<Candle>> {
    if let Some(path) = &args.data {
        let raw = ingest::read_candles(path)
            .with_context(|| format!("failed to read candles from {}", path.display()))?;
        return Ok(canonicalize(raw));
    }

    let mut request = OhlcvRequest::new(&args.symbol, &args.timeframe).limit(args.limit);
    if let Some(date) = &args.since {
        request = request.since(parse_since_ms(date)?);
    }
    let mut feed = HistoricalFeed::for_exchange(&args.exchange)?;
    Ok(feed.fetch_historical(&request, true))
}

/// Parse a YYYY-MM-DD date into unix milliseconds at midnight UTC.
fn parse_since_ms(date: &str) -> Result<i64> {
    let parsed = NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .with_context(|| format!("bad date '{date}', expected YYYY-MM-DD"))?;
    let midnight = parsed
        .and_hms_opt(0, 0, 0)
        .context("date has no midnight")?;
    Ok(midnight.and_utc().timestamp_millis())
}

fn print_summary(strategy: &str, series: &[Candle], report: &PerformanceReport) {
    println!();
    println!("Backtest: {strategy}");
    println!(
        "Period:   {} to {} ({} candles)",
        series[0].timestamp.format("%Y-%m-%d %H:%M"),
        series[series.len() - 1].timestamp.format("%Y-%m-%d %H:%M"),
        series.len()
    );
    println!("{}", "-".repeat(40));
    println!("{:<20} {:>18}", "Total trades", report.total_trades);
    println!(
        "{:<20} {:>17.1}%",
        "Win rate",
        report.win_rate * 100.0
    );
    println!(
        "{:<20} {:>18.2}",
        "Net profit",
        report.total_net_profit
    );
    println!(
        "{:<20} {:>17.1}%",
        "Max drawdown",
        report.max_drawdown * 100.0
    );
    println!("{:<20} {:>18.3}", "Sharpe ratio", report.sharpe_ratio);
    println!("{:<20} {:>18.2}", "Final capital", report.final_capital);
}
