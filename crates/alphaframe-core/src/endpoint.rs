//! Static description of every supported provider function and the
//! rendering of caller parameters into request URLs.

use std::fmt::{Debug, Display, Formatter};
use std::str::FromStr;

use tracing::debug;

use crate::domain::{Interval, Symbol};
use crate::http_client::redact_api_key;
use crate::key_rotator::KeyRotator;
use crate::normalize::to_snake_case;
use crate::{AlphaError, ValidationError};

/// Largest `year_range` the extended intraday function accepts.
pub const MAX_YEAR_RANGE: u8 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Intraday,
    IntradayExtended,
    Daily,
    DailyAdjusted,
    Weekly,
    WeeklyAdjusted,
    Monthly,
    MonthlyAdjusted,
    Quote,
    Search,
    Overview,
    Earnings,
    IncomeStatement,
    BalanceSheet,
    CashFlow,
}

impl Endpoint {
    pub const ALL: [Self; 15] = [
        Self::Intraday,
        Self::IntradayExtended,
        Self::Daily,
        Self::DailyAdjusted,
        Self::Weekly,
        Self::WeeklyAdjusted,
        Self::Monthly,
        Self::MonthlyAdjusted,
        Self::Quote,
        Self::Search,
        Self::Overview,
        Self::Earnings,
        Self::IncomeStatement,
        Self::BalanceSheet,
        Self::CashFlow,
    ];

    pub const fn daily(adjusted: bool) -> Self {
        if adjusted {
            Self::DailyAdjusted
        } else {
            Self::Daily
        }
    }

    pub const fn weekly(adjusted: bool) -> Self {
        if adjusted {
            Self::WeeklyAdjusted
        } else {
            Self::Weekly
        }
    }

    pub const fn monthly(adjusted: bool) -> Self {
        if adjusted {
            Self::MonthlyAdjusted
        } else {
            Self::Monthly
        }
    }

    /// Kebab-case name used on the command line.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Intraday => "intraday",
            Self::IntradayExtended => "intraday-extended",
            Self::Daily => "daily",
            Self::DailyAdjusted => "daily-adjusted",
            Self::Weekly => "weekly",
            Self::WeeklyAdjusted => "weekly-adjusted",
            Self::Monthly => "monthly",
            Self::MonthlyAdjusted => "monthly-adjusted",
            Self::Quote => "quote",
            Self::Search => "search",
            Self::Overview => "overview",
            Self::Earnings => "earnings",
            Self::IncomeStatement => "income-statement",
            Self::BalanceSheet => "balance-sheet",
            Self::CashFlow => "cash-flow",
        }
    }

    /// Provider function name, e.g. `TIME_SERIES_DAILY_ADJUSTED`.
    pub fn function(self) -> &'static str {
        self.spec().function
    }

    pub fn spec(self) -> &'static EndpointSpec {
        match self {
            Self::Intraday => &INTRADAY,
            Self::IntradayExtended => &INTRADAY_EXTENDED,
            Self::Daily => &DAILY,
            Self::DailyAdjusted => &DAILY_ADJUSTED,
            Self::Weekly => &WEEKLY,
            Self::WeeklyAdjusted => &WEEKLY_ADJUSTED,
            Self::Monthly => &MONTHLY,
            Self::MonthlyAdjusted => &MONTHLY_ADJUSTED,
            Self::Quote => &QUOTE,
            Self::Search => &SEARCH,
            Self::Overview => &OVERVIEW,
            Self::Earnings => &EARNINGS,
            Self::IncomeStatement => &INCOME_STATEMENT,
            Self::BalanceSheet => &BALANCE_SHEET,
            Self::CashFlow => &CASH_FLOW,
        }
    }
}

impl Display for Endpoint {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Endpoint {
    type Err = ValidationError;

    /// Accepts the provider function name or the kebab-case name, any case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|endpoint| {
                endpoint.function().eq_ignore_ascii_case(wanted)
                    || endpoint.name().eq_ignore_ascii_case(wanted)
            })
            .ok_or_else(|| ValidationError::InvalidEndpoint {
                value: wanted.to_owned(),
            })
    }
}

/// Shape of a successful payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadLayout {
    /// Delimited text with a header row.
    Csv,
    /// One JSON object, read as a single row.
    JsonFlat,
    /// `annual{suffix}` and `quarterly{suffix}` arrays of JSON objects.
    JsonReports { suffix: &'static str },
}

/// Target type of a raw column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// `YYYY-MM-DD HH:MM[:SS]`; date-only values stay [`crate::Value::Date`].
    Timestamp,
    Date,
    Decimal,
    Integer,
    Float,
    Text,
}

/// Converters keyed on raw provider column names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConverterSpec {
    pub columns: &'static [(&'static str, ColumnKind)],
    /// Applied to columns not listed.
    pub fallback: ColumnKind,
}

impl ConverterSpec {
    pub fn kind_for(&self, column: &str) -> ColumnKind {
        self.columns
            .iter()
            .find(|(name, _)| *name == column)
            .map_or(self.fallback, |(_, kind)| *kind)
    }
}

/// How raw column names become canonical ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenameRule {
    /// Listed names are mapped; the rest go through snake_case.
    Explicit(&'static [(&'static str, &'static str)]),
    SnakeCase,
}

impl RenameRule {
    pub fn apply(&self, column: &str) -> String {
        match self {
            Self::Explicit(map) => map
                .iter()
                .find(|(raw, _)| *raw == column)
                .map_or_else(|| to_snake_case(column), |(_, canonical)| (*canonical).to_owned()),
            Self::SnakeCase => to_snake_case(column),
        }
    }
}

/// Everything the client needs to call and normalize one provider function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EndpointSpec {
    pub function: &'static str,
    /// Query after `function=`, with `{symbol}`, `{keywords}`, `{interval}`,
    /// `{adjusted}` and `{slice}` placeholders.
    pub query: &'static str,
    pub layout: PayloadLayout,
    pub converters: ConverterSpec,
    pub rename: RenameRule,
    /// One request per [`Slice`], aggregated in declared order.
    pub multi_slice: bool,
}

impl EndpointSpec {
    fn needs(&self, placeholder: &str) -> bool {
        self.query.contains(placeholder)
    }
}

const OHLC: [(&str, ColumnKind); 4] = [
    ("open", ColumnKind::Decimal),
    ("high", ColumnKind::Decimal),
    ("low", ColumnKind::Decimal),
    ("close", ColumnKind::Decimal),
];

const fn time_series(columns: &'static [(&'static str, ColumnKind)]) -> ConverterSpec {
    ConverterSpec {
        columns,
        fallback: ColumnKind::Decimal,
    }
}

const INTRADAY_COLUMNS: [(&str, ColumnKind); 6] = [
    ("timestamp", ColumnKind::Timestamp),
    OHLC[0],
    OHLC[1],
    OHLC[2],
    OHLC[3],
    ("volume", ColumnKind::Integer),
];

const EXTENDED_COLUMNS: [(&str, ColumnKind); 6] = [
    ("time", ColumnKind::Timestamp),
    OHLC[0],
    OHLC[1],
    OHLC[2],
    OHLC[3],
    ("volume", ColumnKind::Integer),
];

const DAILY_ADJUSTED_COLUMNS: [(&str, ColumnKind); 9] = [
    ("timestamp", ColumnKind::Timestamp),
    OHLC[0],
    OHLC[1],
    OHLC[2],
    OHLC[3],
    ("adjusted_close", ColumnKind::Decimal),
    ("volume", ColumnKind::Integer),
    ("dividend_amount", ColumnKind::Decimal),
    ("split_coefficient", ColumnKind::Decimal),
];

// Weekly and monthly adjusted CSVs use spaces in their headers.
const PERIODIC_ADJUSTED_COLUMNS: [(&str, ColumnKind); 8] = [
    ("timestamp", ColumnKind::Timestamp),
    OHLC[0],
    OHLC[1],
    OHLC[2],
    OHLC[3],
    ("adjusted close", ColumnKind::Decimal),
    ("volume", ColumnKind::Integer),
    ("dividend amount", ColumnKind::Decimal),
];

const TIME_SERIES_RENAMES: RenameRule = RenameRule::Explicit(&[
    ("timestamp", "date"),
    ("time", "date"),
    ("adjusted close", "adjusted_close"),
    ("dividend amount", "dividend_amount"),
]);

const INTRADAY: EndpointSpec = EndpointSpec {
    function: "TIME_SERIES_INTRADAY",
    query: "symbol={symbol}&interval={interval}&adjusted={adjusted}&outputsize=full&datatype=csv",
    layout: PayloadLayout::Csv,
    converters: time_series(&INTRADAY_COLUMNS),
    rename: TIME_SERIES_RENAMES,
    multi_slice: false,
};

const INTRADAY_EXTENDED: EndpointSpec = EndpointSpec {
    function: "TIME_SERIES_INTRADAY_EXTENDED",
    query: "symbol={symbol}&interval={interval}&adjusted={adjusted}&outputsize=full&slice={slice}",
    layout: PayloadLayout::Csv,
    converters: time_series(&EXTENDED_COLUMNS),
    rename: TIME_SERIES_RENAMES,
    multi_slice: true,
};

const DAILY: EndpointSpec = EndpointSpec {
    function: "TIME_SERIES_DAILY",
    query: "symbol={symbol}&outputsize=full&datatype=csv",
    layout: PayloadLayout::Csv,
    converters: time_series(&INTRADAY_COLUMNS),
    rename: TIME_SERIES_RENAMES,
    multi_slice: false,
};

const DAILY_ADJUSTED: EndpointSpec = EndpointSpec {
    function: "TIME_SERIES_DAILY_ADJUSTED",
    converters: time_series(&DAILY_ADJUSTED_COLUMNS),
    ..DAILY
};

const WEEKLY: EndpointSpec = EndpointSpec {
    function: "TIME_SERIES_WEEKLY",
    query: "symbol={symbol}&datatype=csv",
    ..DAILY
};

const WEEKLY_ADJUSTED: EndpointSpec = EndpointSpec {
    function: "TIME_SERIES_WEEKLY_ADJUSTED",
    converters: time_series(&PERIODIC_ADJUSTED_COLUMNS),
    ..WEEKLY
};

const MONTHLY: EndpointSpec = EndpointSpec {
    function: "TIME_SERIES_MONTHLY",
    ..WEEKLY
};

const MONTHLY_ADJUSTED: EndpointSpec = EndpointSpec {
    function: "TIME_SERIES_MONTHLY_ADJUSTED",
    ..WEEKLY_ADJUSTED
};

const QUOTE: EndpointSpec = EndpointSpec {
    function: "GLOBAL_QUOTE",
    query: "symbol={symbol}&datatype=csv",
    layout: PayloadLayout::Csv,
    converters: ConverterSpec {
        columns: &[
            ("open", ColumnKind::Decimal),
            ("high", ColumnKind::Decimal),
            ("low", ColumnKind::Decimal),
            ("price", ColumnKind::Decimal),
            ("volume", ColumnKind::Integer),
            ("latestDay", ColumnKind::Date),
            ("previousClose", ColumnKind::Decimal),
            ("change", ColumnKind::Decimal),
        ],
        fallback: ColumnKind::Text,
    },
    rename: RenameRule::SnakeCase,
    multi_slice: false,
};

const SEARCH: EndpointSpec = EndpointSpec {
    function: "SYMBOL_SEARCH",
    query: "keywords={keywords}&datatype=csv",
    layout: PayloadLayout::Csv,
    converters: ConverterSpec {
        columns: &[("matchScore", ColumnKind::Float)],
        fallback: ColumnKind::Text,
    },
    rename: RenameRule::SnakeCase,
    multi_slice: false,
};

const OVERVIEW: EndpointSpec = EndpointSpec {
    function: "OVERVIEW",
    query: "symbol={symbol}",
    layout: PayloadLayout::JsonFlat,
    converters: ConverterSpec {
        columns: &[
            ("LatestQuarter", ColumnKind::Date),
            ("MarketCapitalization", ColumnKind::Integer),
            ("EBITDA", ColumnKind::Integer),
            ("PERatio", ColumnKind::Decimal),
            ("PEGRatio", ColumnKind::Decimal),
            ("BookValue", ColumnKind::Decimal),
            ("DividendPerShare", ColumnKind::Decimal),
            ("DividendYield", ColumnKind::Decimal),
            ("EPS", ColumnKind::Decimal),
            ("RevenuePerShareTTM", ColumnKind::Decimal),
            ("ProfitMargin", ColumnKind::Decimal),
            ("OperatingMarginTTM", ColumnKind::Decimal),
            ("ReturnOnAssetsTTM", ColumnKind::Decimal),
            ("ReturnOnEquityTTM", ColumnKind::Decimal),
            ("RevenueTTM", ColumnKind::Integer),
            ("GrossProfitTTM", ColumnKind::Integer),
            ("DilutedEPSTTM", ColumnKind::Decimal),
            ("QuarterlyEarningsGrowthYOY", ColumnKind::Decimal),
            ("QuarterlyRevenueGrowthYOY", ColumnKind::Decimal),
            ("AnalystTargetPrice", ColumnKind::Decimal),
            ("TrailingPE", ColumnKind::Decimal),
            ("ForwardPE", ColumnKind::Decimal),
            ("PriceToSalesRatioTTM", ColumnKind::Decimal),
            ("PriceToBookRatio", ColumnKind::Decimal),
            ("EVToRevenue", ColumnKind::Decimal),
            ("EVToEBITDA", ColumnKind::Decimal),
            ("Beta", ColumnKind::Decimal),
            ("52WeekHigh", ColumnKind::Decimal),
            ("52WeekLow", ColumnKind::Decimal),
            ("50DayMovingAverage", ColumnKind::Decimal),
            ("200DayMovingAverage", ColumnKind::Decimal),
            ("SharesOutstanding", ColumnKind::Integer),
            ("DividendDate", ColumnKind::Date),
            ("ExDividendDate", ColumnKind::Date),
        ],
        fallback: ColumnKind::Text,
    },
    rename: RenameRule::SnakeCase,
    multi_slice: false,
};

const REPORT_CONVERTERS: ConverterSpec = ConverterSpec {
    columns: &[
        ("fiscalDateEnding", ColumnKind::Date),
        ("reportedDate", ColumnKind::Date),
        ("reportedCurrency", ColumnKind::Text),
        ("reportTime", ColumnKind::Text),
    ],
    fallback: ColumnKind::Decimal,
};

const EARNINGS: EndpointSpec = EndpointSpec {
    function: "EARNINGS",
    query: "symbol={symbol}",
    layout: PayloadLayout::JsonReports { suffix: "Earnings" },
    converters: REPORT_CONVERTERS,
    rename: RenameRule::SnakeCase,
    multi_slice: false,
};

const INCOME_STATEMENT: EndpointSpec = EndpointSpec {
    function: "INCOME_STATEMENT",
    layout: PayloadLayout::JsonReports { suffix: "Reports" },
    ..EARNINGS
};

const BALANCE_SHEET: EndpointSpec = EndpointSpec {
    function: "BALANCE_SHEET",
    ..INCOME_STATEMENT
};

const CASH_FLOW: EndpointSpec = EndpointSpec {
    function: "CASH_FLOW",
    ..INCOME_STATEMENT
};

/// One month of extended intraday history, rendered `year{Y}month{M}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Slice {
    pub year: u8,
    pub month: u8,
}

impl Slice {
    /// Year-major order: `year1month1`, `year1month2`, ... `year{range}month12`.
    pub fn range(year_range: u8) -> Result<Vec<Self>, AlphaError> {
        if !(1..=MAX_YEAR_RANGE).contains(&year_range) {
            return Err(AlphaError::invalid_argument(format!(
                "year_range must be between 1 and {MAX_YEAR_RANGE}, got {year_range}"
            )));
        }
        Ok((1..=year_range)
            .flat_map(|year| (1..=12).map(move |month| Self { year, month }))
            .collect())
    }
}

impl Display for Slice {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "year{}month{}", self.year, self.month)
    }
}

/// Caller parameters for one endpoint call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointRequest {
    pub endpoint: Endpoint,
    pub symbol: Option<Symbol>,
    pub keywords: Option<String>,
    pub interval: Option<Interval>,
    pub adjusted: bool,
    pub year_range: u8,
    pub use_proxy: bool,
}

impl EndpointRequest {
    pub fn new(endpoint: Endpoint) -> Self {
        Self {
            endpoint,
            symbol: None,
            keywords: None,
            interval: None,
            adjusted: true,
            year_range: MAX_YEAR_RANGE,
            use_proxy: false,
        }
    }

    pub fn symbol(mut self, symbol: Symbol) -> Self {
        self.symbol = Some(symbol);
        self
    }

    pub fn keywords(mut self, keywords: impl Into<String>) -> Self {
        self.keywords = Some(keywords.into());
        self
    }

    pub fn interval(mut self, interval: Interval) -> Self {
        self.interval = Some(interval);
        self
    }

    pub fn adjusted(mut self, adjusted: bool) -> Self {
        self.adjusted = adjusted;
        self
    }

    pub fn year_range(mut self, year_range: u8) -> Self {
        self.year_range = year_range;
        self
    }

    pub fn use_proxy(mut self, use_proxy: bool) -> Self {
        self.use_proxy = use_proxy;
        self
    }
}

/// Fully rendered request. The URL carries the API key, so `Debug` redacts it.
#[derive(Clone, PartialEq, Eq)]
pub struct RequestDescriptor {
    pub endpoint: Endpoint,
    pub slice: Option<Slice>,
    pub url: String,
}

impl RequestDescriptor {
    pub fn redacted_url(&self) -> String {
        redact_api_key(&self.url)
    }
}

impl Debug for RequestDescriptor {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestDescriptor")
            .field("endpoint", &self.endpoint)
            .field("slice", &self.slice)
            .field("url", &self.redacted_url())
            .finish()
    }
}

/// Renders `request` into one descriptor, or one per slice for multi-slice
/// endpoints. Every descriptor draws its own key from `keys`.
///
/// Parameters are validated before any key is drawn.
pub fn build_descriptors(
    request: &EndpointRequest,
    base_url: &str,
    keys: &KeyRotator,
) -> Result<Vec<RequestDescriptor>, AlphaError> {
    let spec = request.endpoint.spec();

    let slices = if spec.multi_slice {
        Slice::range(request.year_range)?
            .into_iter()
            .map(Some)
            .collect::<Vec<_>>()
    } else {
        vec![None]
    };

    let symbol = match (&request.symbol, spec.needs("{symbol}")) {
        (Some(symbol), true) => symbol.as_str(),
        (None, true) => {
            return Err(AlphaError::invalid_argument(format!(
                "{} requires a symbol",
                request.endpoint
            )))
        }
        (_, false) => "",
    };

    let keywords = if spec.needs("{keywords}") {
        let keywords = request.keywords.as_deref().map(str::trim).unwrap_or_default();
        if keywords.is_empty() {
            return Err(ValidationError::EmptyKeywords.into());
        }
        urlencoding::encode(&keywords.to_lowercase()).into_owned()
    } else {
        String::new()
    };

    let interval = match (request.interval, spec.needs("{interval}")) {
        (Some(interval), true) => interval.as_str(),
        (None, true) => {
            return Err(AlphaError::invalid_argument(format!(
                "{} requires an interval",
                request.endpoint
            )))
        }
        (_, false) => "",
    };

    let query = spec
        .query
        .replace("{symbol}", symbol)
        .replace("{keywords}", &keywords)
        .replace("{interval}", interval)
        .replace("{adjusted}", if request.adjusted { "true" } else { "false" });
    let base_url = base_url.trim_end_matches(['?', '&']);

    slices
        .into_iter()
        .map(|slice| {
            let query = match slice {
                Some(slice) => query.replace("{slice}", &slice.to_string()),
                None => query.clone(),
            };
            let url = format!(
                "{base_url}?function={}&{query}&apikey={}",
                spec.function,
                keys.next()?
            );
            let descriptor = RequestDescriptor {
                endpoint: request.endpoint,
                slice,
                url,
            };
            debug!(url = %descriptor.redacted_url(), "built request");
            Ok(descriptor)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    const BASE: &str = "https://www.alphavantage.co/query";

    fn keys() -> KeyRotator {
        KeyRotator::new(["TESTKEY"])
    }

    fn ibm() -> Symbol {
        Symbol::parse("ibm").expect("valid symbol")
    }

    #[test]
    fn parses_function_and_kebab_names() {
        assert_eq!("TIME_SERIES_DAILY_ADJUSTED".parse::<Endpoint>(), Ok(Endpoint::DailyAdjusted));
        assert_eq!("cash-flow".parse::<Endpoint>(), Ok(Endpoint::CashFlow));
        assert_eq!("global_quote".parse::<Endpoint>(), Ok(Endpoint::Quote));
        assert!("TIME_SERIES_HOURLY".parse::<Endpoint>().is_err());
    }

    #[test]
    fn every_endpoint_round_trips_through_its_names() {
        for endpoint in Endpoint::ALL {
            assert_eq!(endpoint.function().parse::<Endpoint>(), Ok(endpoint));
            assert_eq!(endpoint.name().parse::<Endpoint>(), Ok(endpoint));
        }
    }

    #[test]
    fn renders_daily_adjusted_url() {
        let request = EndpointRequest::new(Endpoint::DailyAdjusted).symbol(ibm());
        let descriptors = build_descriptors(&request, BASE, &keys()).expect("valid request");

        assert_eq!(descriptors.len(), 1);
        assert_eq!(
            descriptors[0].url,
            "https://www.alphavantage.co/query?function=TIME_SERIES_DAILY_ADJUSTED&symbol=IBM&outputsize=full&datatype=csv&apikey=TESTKEY"
        );
    }

    #[test]
    fn renders_intraday_parameters() {
        let request = EndpointRequest::new(Endpoint::Intraday)
            .symbol(ibm())
            .interval(Interval::FifteenMinutes)
            .adjusted(false);
        let descriptors = build_descriptors(&request, BASE, &keys()).expect("valid request");

        assert!(descriptors[0]
            .url
            .contains("&interval=15min&adjusted=false&outputsize=full&datatype=csv"));
    }

    #[test]
    fn extended_intraday_renders_one_url_per_slice() {
        let request = EndpointRequest::new(Endpoint::IntradayExtended)
            .symbol(ibm())
            .interval(Interval::FifteenMinutes)
            .year_range(2);
        let descriptors = build_descriptors(&request, BASE, &keys()).expect("valid request");

        assert_eq!(descriptors.len(), 24);
        assert!(descriptors[0].url.contains("&slice=year1month1&"));
        assert!(descriptors[23].url.contains("&slice=year2month12&"));
        assert!(descriptors.iter().all(|d| !d.url.contains("datatype")));
        let distinct = descriptors.iter().map(|d| d.url.as_str()).collect::<HashSet<_>>();
        assert_eq!(distinct.len(), 24);
    }

    #[test]
    fn year_range_outside_bounds_is_rejected_before_drawing_keys() {
        // An empty key set would fail with Configuration if a key were drawn.
        let empty = KeyRotator::new(Vec::<String>::new());
        for year_range in [0, 3] {
            let request = EndpointRequest::new(Endpoint::IntradayExtended)
                .symbol(ibm())
                .interval(Interval::SixtyMinutes)
                .year_range(year_range);
            let error = build_descriptors(&request, BASE, &empty).expect_err("out of range");
            assert_eq!(error.kind(), crate::AlphaErrorKind::InvalidArgument);
        }
    }

    #[test]
    fn search_keywords_are_lowercased_and_encoded() {
        let request = EndpointRequest::new(Endpoint::Search).keywords("Tesco PLC");
        let descriptors = build_descriptors(&request, BASE, &keys()).expect("valid request");

        assert_eq!(
            descriptors[0].url,
            "https://www.alphavantage.co/query?function=SYMBOL_SEARCH&keywords=tesco%20plc&datatype=csv&apikey=TESTKEY"
        );
    }

    #[test]
    fn missing_parameters_are_invalid_arguments() {
        let cases = [
            EndpointRequest::new(Endpoint::Overview),
            EndpointRequest::new(Endpoint::Search).keywords("   "),
            EndpointRequest::new(Endpoint::Intraday).symbol(ibm()),
        ];
        for request in cases {
            let error = build_descriptors(&request, BASE, &keys()).expect_err("missing parameter");
            assert_eq!(error.kind(), crate::AlphaErrorKind::InvalidArgument, "{request:?}");
        }
    }

    #[test]
    fn fundamentals_request_json() {
        let request = EndpointRequest::new(Endpoint::Earnings).symbol(ibm());
        let descriptors = build_descriptors(&request, BASE, &keys()).expect("valid request");

        assert_eq!(
            descriptors[0].url,
            "https://www.alphavantage.co/query?function=EARNINGS&symbol=IBM&apikey=TESTKEY"
        );
    }

    #[test]
    fn descriptor_debug_redacts_key() {
        let request = EndpointRequest::new(Endpoint::Quote).symbol(ibm());
        let descriptors = build_descriptors(&request, BASE, &keys()).expect("valid request");

        let rendered = format!("{:?}", descriptors[0]);
        assert!(!rendered.contains("TESTKEY"));
        assert!(rendered.contains("apikey=<redacted>"));
    }

    #[test]
    fn time_series_renames_cover_spaced_headers() {
        let rule = Endpoint::WeeklyAdjusted.spec().rename;
        assert_eq!(rule.apply("timestamp"), "date");
        assert_eq!(rule.apply("adjusted close"), "adjusted_close");
        assert_eq!(rule.apply("dividend amount"), "dividend_amount");
        assert_eq!(rule.apply("volume"), "volume");
    }

    #[test]
    fn converter_lookup_falls_back() {
        let converters = Endpoint::BalanceSheet.spec().converters;
        assert_eq!(converters.kind_for("fiscalDateEnding"), ColumnKind::Date);
        assert_eq!(converters.kind_for("totalAssets"), ColumnKind::Decimal);
    }
}
