use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::ClientConfig;
use crate::domain::{Interval, Symbol};
use crate::endpoint::{build_descriptors, Endpoint, EndpointRequest};
use crate::fetcher::ResilientFetcher;
use crate::http_client::{HttpClient, ReqwestHttpClient};
use crate::key_rotator::KeyRotator;
use crate::normalize::{normalize, normalize_slices};
use crate::slices::ParallelSliceFetcher;
use crate::table::Table;
use crate::AlphaError;

/// Entry point: one client per credential set, shared freely across tasks.
#[derive(Debug, Clone)]
pub struct AlphaClient {
    fetcher: ResilientFetcher,
    slices: ParallelSliceFetcher,
    keys: KeyRotator,
    base_url: String,
    has_proxy: bool,
}

impl AlphaClient {
    /// Builds the reqwest transport, including the proxied client when
    /// proxies are configured.
    pub fn from_config(config: &ClientConfig) -> Result<Self, AlphaError> {
        let transport = ReqwestHttpClient::new(&config.proxies)?;
        let has_proxy = transport.has_proxy();
        Ok(Self::assemble(Arc::new(transport), config, has_proxy))
    }

    /// Uses `client` as transport. `use_proxy` is honoured only if
    /// `config.proxies` is non-empty.
    pub fn with_http_client(client: Arc<dyn HttpClient>, config: &ClientConfig) -> Self {
        Self::assemble(client, config, !config.proxies.is_empty())
    }

    fn assemble(client: Arc<dyn HttpClient>, config: &ClientConfig, has_proxy: bool) -> Self {
        let fetcher = ResilientFetcher::new(client, config.retry)
            .with_timeout_ms(config.request_timeout_ms);
        let mut slices = ParallelSliceFetcher::new(fetcher.clone());
        if let Some(max_workers) = config.max_workers {
            slices = slices.with_max_workers(max_workers);
        }

        Self {
            fetcher,
            slices,
            keys: KeyRotator::new(config.api_keys.iter().cloned()),
            base_url: config.base_url.clone(),
            has_proxy,
        }
    }

    pub fn keys(&self) -> &KeyRotator {
        &self.keys
    }

    /// Validates, downloads and normalizes one endpoint call.
    pub async fn fetch(&self, request: EndpointRequest) -> Result<Table, AlphaError> {
        let spec = request.endpoint.spec();
        info!(function = spec.function, use_proxy = request.use_proxy, "starting request");

        if request.use_proxy {
            if !self.has_proxy {
                return Err(AlphaError::configuration(
                    "use_proxy was requested but no proxies are configured",
                ));
            }
            debug!("routing through proxies; a proxy timeout is retried like any transport error");
        } else {
            debug!("calling the provider directly; it can correlate requests across keys");
        }

        let descriptors = build_descriptors(&request, &self.base_url, &self.keys)?;

        let table = if spec.multi_slice {
            info!(
                slices = descriptors.len(),
                workers = self.slices.max_workers(),
                "fetching slices"
            );
            let responses = self.slices.fetch_slices(&descriptors, request.use_proxy).await?;
            normalize_slices(&responses, spec)?
        } else {
            let mut tables = Vec::with_capacity(descriptors.len());
            for descriptor in &descriptors {
                let response = self.fetcher.fetch(&descriptor.url, request.use_proxy).await?;
                tables.push(normalize(&response, spec)?);
            }
            Table::concat(tables)
        };

        if table.is_empty() {
            warn!(function = spec.function, "normalized table has no rows");
        }
        info!(
            function = spec.function,
            rows = table.row_count(),
            columns = table.column_count(),
            "request complete"
        );
        Ok(table)
    }

    pub async fn time_series_intraday(
        &self,
        symbol: Symbol,
        interval: Interval,
        adjusted: bool,
        use_proxy: bool,
    ) -> Result<Table, AlphaError> {
        self.fetch(
            EndpointRequest::new(Endpoint::Intraday)
                .symbol(symbol)
                .interval(interval)
                .adjusted(adjusted)
                .use_proxy(use_proxy),
        )
        .await
    }

    /// `year_range` (1 or 2) years of history, one request per month.
    pub async fn time_series_intraday_extended(
        &self,
        symbol: Symbol,
        interval: Interval,
        year_range: u8,
        adjusted: bool,
        use_proxy: bool,
    ) -> Result<Table, AlphaError> {
        self.fetch(
            EndpointRequest::new(Endpoint::IntradayExtended)
                .symbol(symbol)
                .interval(interval)
                .year_range(year_range)
                .adjusted(adjusted)
                .use_proxy(use_proxy),
        )
        .await
    }

    pub async fn time_series_daily(
        &self,
        symbol: Symbol,
        adjusted: bool,
        use_proxy: bool,
    ) -> Result<Table, AlphaError> {
        self.symbol_call(Endpoint::daily(adjusted), symbol, use_proxy).await
    }

    pub async fn time_series_weekly(
        &self,
        symbol: Symbol,
        adjusted: bool,
        use_proxy: bool,
    ) -> Result<Table, AlphaError> {
        self.symbol_call(Endpoint::weekly(adjusted), symbol, use_proxy).await
    }

    pub async fn time_series_monthly(
        &self,
        symbol: Symbol,
        adjusted: bool,
        use_proxy: bool,
    ) -> Result<Table, AlphaError> {
        self.symbol_call(Endpoint::monthly(adjusted), symbol, use_proxy).await
    }

    pub async fn quote(&self, symbol: Symbol, use_proxy: bool) -> Result<Table, AlphaError> {
        self.symbol_call(Endpoint::Quote, symbol, use_proxy).await
    }

    /// Keywords are lowercased before the call.
    pub async fn search(&self, keywords: &str, use_proxy: bool) -> Result<Table, AlphaError> {
        let table = self
            .fetch(EndpointRequest::new(Endpoint::Search).keywords(keywords).use_proxy(use_proxy))
            .await?;
        info!(results = table.row_count(), "search results returned");
        Ok(table)
    }

    pub async fn overview(&self, symbol: Symbol, use_proxy: bool) -> Result<Table, AlphaError> {
        self.symbol_call(Endpoint::Overview, symbol, use_proxy).await
    }

    /// Annual rows first, then quarterly; see the `period` column.
    pub async fn earnings(&self, symbol: Symbol, use_proxy: bool) -> Result<Table, AlphaError> {
        self.symbol_call(Endpoint::Earnings, symbol, use_proxy).await
    }

    pub async fn income_statement(
        &self,
        symbol: Symbol,
        use_proxy: bool,
    ) -> Result<Table, AlphaError> {
        self.symbol_call(Endpoint::IncomeStatement, symbol, use_proxy).await
    }

    pub async fn balance_sheet(
        &self,
        symbol: Symbol,
        use_proxy: bool,
    ) -> Result<Table, AlphaError> {
        self.symbol_call(Endpoint::BalanceSheet, symbol, use_proxy).await
    }

    pub async fn cash_flow(&self, symbol: Symbol, use_proxy: bool) -> Result<Table, AlphaError> {
        self.symbol_call(Endpoint::CashFlow, symbol, use_proxy).await
    }

    async fn symbol_call(
        &self,
        endpoint: Endpoint,
        symbol: Symbol,
        use_proxy: bool,
    ) -> Result<Table, AlphaError> {
        self.fetch(EndpointRequest::new(endpoint).symbol(symbol).use_proxy(use_proxy))
            .await
    }
}
