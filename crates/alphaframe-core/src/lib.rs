//! # Alphaframe Core
//!
//! Client for the Alpha Vantage quote-data API that turns every supported
//! function into one typed, canonically named [`Table`].
//!
//! ## Overview
//!
//! - **Key rotation** across a set of API keys, one pseudo-random pick per request
//! - **Resilient fetch** with a linear, capped backoff and optional proxy routing
//! - **Parallel slices** for the 24-month extended intraday history
//! - **Normalization** of CSV and JSON payloads: fixed-precision decimals,
//!   `date` as the time column, snake_case everywhere else
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`client`] | `AlphaClient`, one method per endpoint |
//! | [`config`] | YAML and environment configuration |
//! | [`endpoint`] | Endpoint table and URL rendering |
//! | [`error`] | Error types |
//! | [`fetcher`] | Single request with retries |
//! | [`http_client`] | Transport trait, reqwest and mock implementations |
//! | [`key_rotator`] | API key selection |
//! | [`logging`] | `tracing` subscriber setup |
//! | [`normalize`] | Payload parsing, conversion and renaming |
//! | [`retry`] | Backoff policy |
//! | [`slices`] | Concurrent multi-slice download |
//! | [`table`] | Normalized table and cell values |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use alphaframe_core::{AlphaClient, ClientConfig, Symbol};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ClientConfig::from_yaml_file("config.yml")?.with_env_overrides();
//!     let client = AlphaClient::from_config(&config)?;
//!
//!     let prices = client.time_series_daily(Symbol::parse("IBM")?, true, false).await?;
//!     println!("{} rows, columns {:?}", prices.row_count(), prices.columns());
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! ```rust
//! use alphaframe_core::{AlphaError, AlphaErrorKind};
//!
//! fn handle_error(error: AlphaError) {
//!     match error.kind() {
//!         AlphaErrorKind::Upstream => {
//!             // Provider answered without data; the raw body is attached
//!             let _body = error.upstream_body();
//!         }
//!         AlphaErrorKind::Configuration => {
//!             // Fix keys or proxies
//!         }
//!         _ => {}
//!     }
//! }
//! ```
//!
//! ## Security
//!
//! - API keys never appear in logs or `Debug` output; URLs are redacted
//! - Only the last four characters of a key are ever logged

pub mod client;
pub mod config;
pub mod domain;
pub mod endpoint;
pub mod error;
pub mod fetcher;
pub mod http_client;
pub mod key_rotator;
pub mod logging;
pub mod normalize;
pub mod retry;
pub mod slices;
pub mod table;

pub use client::AlphaClient;

pub use config::ClientConfig;

pub use domain::{Interval, Symbol};

pub use endpoint::{
    build_descriptors, Endpoint, EndpointRequest, EndpointSpec, RequestDescriptor, Slice,
};

pub use error::{AlphaError, AlphaErrorKind, ValidationError};

pub use fetcher::ResilientFetcher;

pub use http_client::{
    HttpClient, HttpError, HttpRequest, MockHttpClient, RawResponse, ReqwestHttpClient,
};

pub use key_rotator::KeyRotator;

pub use logging::{init_logging, LogConfig, LogFormat};

pub use normalize::{normalize, normalize_slices};

pub use retry::RetryPolicy;

pub use slices::ParallelSliceFetcher;

pub use table::{Table, Value};
