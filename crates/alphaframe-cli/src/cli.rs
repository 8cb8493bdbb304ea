//! CLI argument definitions for alphaframe.
//!
//! # Commands
//!
//! | Command | Provider function |
//! |---------|-------------------|
//! | `intraday` | `TIME_SERIES_INTRADAY` |
//! | `intraday-extended` | `TIME_SERIES_INTRADAY_EXTENDED`, one request per month |
//! | `daily` / `weekly` / `monthly` | `TIME_SERIES_*[_ADJUSTED]` |
//! | `quote` | `GLOBAL_QUOTE` |
//! | `search` | `SYMBOL_SEARCH` |
//! | `overview` | `OVERVIEW` |
//! | `earnings` | `EARNINGS` |
//! | `income-statement` / `balance-sheet` / `cash-flow` | financial statements |
//!
//! # Examples
//!
//! ```bash
//! alphaframe --config config.yml daily IBM
//! alphaframe intraday-extended IBM --interval 15min --year-range 2 > ibm.csv
//! alphaframe --format json --pretty overview IBM
//! ```

use std::path::PathBuf;

use alphaframe_core::{Interval, LogFormat};
use clap::{Args, Parser, Subcommand, ValueEnum};

/// Alpha Vantage market data as clean CSV or JSON tables.
#[derive(Debug, Parser)]
#[command(
    name = "alphaframe",
    author,
    version,
    about = "Alpha Vantage market data as normalized tables"
)]
pub struct Cli {
    /// YAML config with `api_keys` and optional `proxies`.
    ///
    /// `ALPHAFRAME_API_KEYS` (comma-separated) overrides the configured keys.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Route requests through the configured proxies.
    #[arg(long, global = true, default_value_t = false)]
    pub use_proxy: bool,

    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Csv)]
    pub format: OutputFormat,

    /// Pretty-print JSON output.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Overrides `log_level` from the config file; `RUST_LOG` wins over both.
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Log line layout on stderr: compact, pretty or json.
    #[arg(long, global = true, default_value = "compact")]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Header row plus one line per row.
    Csv,
    /// Array of `{column: value}` records.
    Json,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Intraday bars for the trailing window.
    Intraday(IntradayArgs),

    /// Up to two years of intraday bars, fetched month by month in parallel.
    IntradayExtended(ExtendedArgs),

    /// Daily bars, split/dividend adjusted unless --unadjusted.
    Daily(SeriesArgs),

    Weekly(SeriesArgs),

    Monthly(SeriesArgs),

    /// Latest price and volume.
    Quote(SymbolArgs),

    /// Find symbols by name or ticker fragment.
    Search(SearchArgs),

    /// Company profile and key ratios.
    Overview(SymbolArgs),

    /// Annual and quarterly EPS.
    Earnings(SymbolArgs),

    IncomeStatement(SymbolArgs),

    BalanceSheet(SymbolArgs),

    CashFlow(SymbolArgs),
}

#[derive(Debug, Args)]
pub struct SymbolArgs {
    /// Ticker, e.g. IBM or TSCO.LON.
    pub symbol: String,
}

#[derive(Debug, Args)]
pub struct SeriesArgs {
    pub symbol: String,

    /// Request the raw series instead of the adjusted one.
    #[arg(long, default_value_t = false)]
    pub unadjusted: bool,
}

#[derive(Debug, Args)]
pub struct IntradayArgs {
    pub symbol: String,

    /// 1min, 5min, 15min, 30min or 60min.
    #[arg(long, default_value = "60min")]
    pub interval: Interval,

    #[arg(long, default_value_t = false)]
    pub unadjusted: bool,
}

#[derive(Debug, Args)]
pub struct ExtendedArgs {
    pub symbol: String,

    #[arg(long, default_value = "60min")]
    pub interval: Interval,

    /// Years of history, 1 or 2.
    #[arg(long, default_value_t = 2)]
    pub year_range: u8,

    #[arg(long, default_value_t = false)]
    pub unadjusted: bool,
}

#[derive(Debug, Args)]
pub struct SearchArgs {
    /// Free-form keywords; lowercased before the call.
    #[arg(required = true, num_args = 1..)]
    pub keywords: Vec<String>,
}
