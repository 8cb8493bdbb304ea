use std::collections::{BTreeMap, HashSet};
use std::str::FromStr;
use std::sync::Arc;

use alphaframe_core::{
    AlphaClient, AlphaErrorKind, ClientConfig, Endpoint, EndpointRequest, HttpError, Interval,
    MockHttpClient, RawResponse, RetryPolicy, Symbol, Value,
};
use rust_decimal::Decimal;
use time::macros::date;

const IBM_DAILY_ADJUSTED: &str = "\
timestamp,open,high,low,close,adjusted_close,volume,dividend_amount,split_coefficient
2024-01-03,162.8300,163.2900,160.9500,161.1000,155.2081,4086056,0.0000,1.0
2024-01-02,161.0000,163.2900,160.1000,162.6900,156.7400,4008484,0.0000,1.0
";

fn config(keys: &[&str]) -> ClientConfig {
    ClientConfig {
        api_keys: keys.iter().map(|key| (*key).to_owned()).collect(),
        retry: RetryPolicy::no_retry(),
        max_workers: Some(4),
        ..ClientConfig::default()
    }
}

fn ibm() -> Symbol {
    Symbol::parse("IBM").expect("valid symbol")
}

#[tokio::test]
async fn test_daily_adjusted_has_date_column_and_decimal_prices() {
    let transport = Arc::new(MockHttpClient::always(200, IBM_DAILY_ADJUSTED));
    let client = AlphaClient::with_http_client(transport.clone(), &config(&["DEMO"]));

    let table = client.time_series_daily(ibm(), true, false).await.expect("data");

    assert_eq!(
        table.columns(),
        [
            "date",
            "open",
            "high",
            "low",
            "close",
            "adjusted_close",
            "volume",
            "dividend_amount",
            "split_coefficient"
        ]
    );
    assert_eq!(table.row_count(), 2);
    assert_eq!(table.get(0, "date"), Some(&Value::Date(date!(2024 - 01 - 03))));
    assert_eq!(
        table.get(0, "adjusted_close"),
        Some(&Value::Decimal(Decimal::from_str("155.2081").expect("decimal")))
    );
    assert_eq!(table.get(1, "volume"), Some(&Value::Integer(4_008_484)));

    let requests = transport.requests();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].url.contains("function=TIME_SERIES_DAILY_ADJUSTED&symbol=IBM"));
    assert!(requests[0].url.ends_with("&apikey=DEMO"));
    assert!(!requests[0].use_proxy);
}

#[tokio::test]
async fn test_extended_intraday_fetches_all_slices_in_order() {
    let transport = Arc::new(MockHttpClient::new(|request| {
        let slice = request
            .url
            .split('&')
            .find_map(|pair| pair.strip_prefix("slice="))
            .unwrap_or_default()
            .to_owned();
        // one row per slice, two for the first month of each year
        let rows = if slice.ends_with("month1") { 2 } else { 1 };
        let mut body = String::from("time,open,high,low,close,volume\n");
        for minute in 0..rows {
            body.push_str(&format!("2023-05-01 10:{minute:02}:00,1.0,2.0,0.5,1.5,100\n"));
        }
        Ok(RawResponse::ok(body, request.url.clone()))
    }));
    let client = AlphaClient::with_http_client(transport.clone(), &config(&["K1", "K2", "K3"]));

    let table = client
        .time_series_intraday_extended(ibm(), Interval::FifteenMinutes, 2, true, false)
        .await
        .expect("data");

    let requests = transport.requests();
    assert_eq!(requests.len(), 24);
    let slices = requests
        .iter()
        .filter_map(|request| {
            request
                .url
                .split('&')
                .find_map(|pair| pair.strip_prefix("slice="))
                .map(str::to_owned)
        })
        .collect::<HashSet<_>>();
    let expected = (1..=2)
        .flat_map(|year| (1..=12).map(move |month| format!("year{year}month{month}")))
        .collect::<HashSet<_>>();
    assert_eq!(slices, expected);
    assert!(requests.iter().all(|request| request.url.contains("interval=15min")));

    // 22 single-row slices plus two two-row slices
    assert_eq!(table.row_count(), 26);
    assert_eq!(table.columns()[0], "date");
}

#[tokio::test]
async fn test_year_range_above_two_makes_no_requests() {
    let transport = Arc::new(MockHttpClient::always(200, IBM_DAILY_ADJUSTED));
    let client = AlphaClient::with_http_client(transport.clone(), &config(&["K1"]));

    let error = client
        .time_series_intraday_extended(ibm(), Interval::SixtyMinutes, 3, true, false)
        .await
        .expect_err("year_range 3");

    assert_eq!(error.kind(), AlphaErrorKind::InvalidArgument);
    assert_eq!(transport.request_count(), 0);
}

#[test]
fn test_unknown_endpoint_name_is_invalid_argument() {
    let error = alphaframe_core::AlphaError::from(
        Endpoint::from_str("TIME_SERIES_HOURLY").expect_err("unknown"),
    );
    assert_eq!(error.kind(), AlphaErrorKind::InvalidArgument);
}

#[tokio::test]
async fn test_proxy_requested_without_proxies_is_configuration_error() {
    let transport = Arc::new(MockHttpClient::always(200, IBM_DAILY_ADJUSTED));
    let client = AlphaClient::with_http_client(transport.clone(), &config(&["K1"]));

    let error = client.time_series_daily(ibm(), true, true).await.expect_err("no proxies");

    assert_eq!(error.kind(), AlphaErrorKind::Configuration);
    assert_eq!(transport.request_count(), 0);
}

#[tokio::test]
async fn test_proxy_flag_reaches_transport_when_configured() {
    let transport = Arc::new(MockHttpClient::always(200, IBM_DAILY_ADJUSTED));
    let mut config = config(&["K1"]);
    config.proxies =
        BTreeMap::from([(String::from("https"), String::from("http://10.0.0.1:3128"))]);
    let client = AlphaClient::with_http_client(transport.clone(), &config);

    client.time_series_daily(ibm(), true, true).await.expect("data");

    assert!(transport.requests()[0].use_proxy);
}

#[tokio::test]
async fn test_search_lowercases_keywords() {
    let body = "\
symbol,name,type,region,marketOpen,marketClose,timezone,currency,matchScore
TSCO.LON,Tesco PLC,Equity,United Kingdom,08:00,16:30,UTC+01,GBX,0.7273
TSCDF,Tesco plc,Equity,United States,09:30,16:00,UTC-04,USD,0.7143
";
    let transport = Arc::new(MockHttpClient::always(200, body));
    let client = AlphaClient::with_http_client(transport.clone(), &config(&["K1"]));

    let table = client.search("TeSCo", false).await.expect("results");

    assert_eq!(table.row_count(), 2);
    assert_eq!(table.get(0, "symbol"), Some(&Value::Text(String::from("TSCO.LON"))));
    assert_eq!(table.get(1, "match_score"), Some(&Value::Float(0.7143)));
    assert!(transport.requests()[0].url.contains("keywords=tesco&"));
}

#[tokio::test]
async fn test_generic_fetch_matches_endpoint_methods() {
    let transport = Arc::new(MockHttpClient::always(200, IBM_DAILY_ADJUSTED));
    let client = AlphaClient::with_http_client(transport.clone(), &config(&["K1"]));

    let via_method = client.time_series_daily(ibm(), true, false).await.expect("data");
    let via_fetch = client
        .fetch(EndpointRequest::new(Endpoint::DailyAdjusted).symbol(ibm()))
        .await
        .expect("data");

    assert_eq!(via_method, via_fetch);
    let urls = transport.requests().into_iter().map(|request| request.url).collect::<Vec<_>>();
    assert_eq!(urls[0], urls[1]);
}

#[tokio::test]
async fn test_rejected_call_surfaces_upstream_body() {
    let body = r#"{"Error Message": "Invalid API call. Please retry or visit the documentation (https://www.alphavantage.co/documentation/) for TIME_SERIES_DAILY."}"#;
    let transport = Arc::new(MockHttpClient::always(200, body));
    let client = AlphaClient::with_http_client(transport.clone(), &config(&["K1"]));

    let error = client.time_series_daily(ibm(), false, false).await.expect_err("rejected");

    assert_eq!(error.kind(), AlphaErrorKind::Upstream);
    assert_eq!(error.upstream_body(), Some(body));
}

#[tokio::test]
async fn test_transport_failures_do_not_leak_keys() {
    let transport = Arc::new(MockHttpClient::new(|_| Err(HttpError::new("connection refused"))));
    let client = AlphaClient::with_http_client(transport.clone(), &config(&["SUPERSECRETKEY"]));

    let error = client.quote(ibm(), false).await.expect_err("offline");

    assert_eq!(error.kind(), AlphaErrorKind::Transport);
    assert!(!error.to_string().contains("SUPERSECRETKEY"));
}
