//! Parsing of provider payloads into canonical [`Table`]s.
//!
//! Converters run on raw column names, renaming runs last, and a table must
//! hold more than [`MIN_CELLS`] cells to count as data.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde_json::{Map, Value as Json};
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{Date, PrimitiveDateTime};
use tracing::error;

use crate::endpoint::{ColumnKind, ConverterSpec, EndpointSpec, PayloadLayout};
use crate::fetcher::excerpt;
use crate::http_client::{redact_api_key, RawResponse};
use crate::table::{Table, Value, DATE_FORMAT, TIMESTAMP_FORMAT};
use crate::AlphaError;

/// Tables with this many cells or fewer are treated as an empty answer.
pub const MIN_CELLS: usize = 3;

const NULL_TOKENS: [&str; 4] = ["", "None", "null", "-"];

const TIMESTAMP_MINUTES_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]");

/// Normalizes a single response.
pub fn normalize(response: &RawResponse, spec: &EndpointSpec) -> Result<Table, AlphaError> {
    let table = parse(response, spec)?;
    if table.cell_count() <= MIN_CELLS {
        return Err(too_small(spec, response));
    }
    Ok(table)
}

/// Normalizes slice responses and stacks them in the given order. The size
/// check applies to the aggregate, so months without trades add no rows.
pub fn normalize_slices(
    responses: &[RawResponse],
    spec: &EndpointSpec,
) -> Result<Table, AlphaError> {
    let tables = responses
        .iter()
        .map(|response| parse(response, spec))
        .collect::<Result<Vec<_>, _>>()?;
    let table = Table::concat(tables);

    if table.cell_count() <= MIN_CELLS {
        return Err(match responses.first() {
            Some(response) => too_small(spec, response),
            None => AlphaError::invalid_argument("no slices to normalize"),
        });
    }
    Ok(table)
}

fn too_small(spec: &EndpointSpec, response: &RawResponse) -> AlphaError {
    error!(
        function = spec.function,
        url = %redact_api_key(&response.url),
        body = %excerpt(&response.body),
        "provider returned an empty table; check the arguments or the call quota"
    );
    AlphaError::upstream(
        response.status,
        format!("payload too small for {}", spec.function),
        response.body.clone(),
    )
}

fn parse(response: &RawResponse, spec: &EndpointSpec) -> Result<Table, AlphaError> {
    check_response(response, spec)?;

    let mut table = match spec.layout {
        PayloadLayout::Csv => parse_csv(response, spec)?,
        PayloadLayout::JsonFlat => parse_json_flat(response, &spec.converters)?,
        PayloadLayout::JsonReports { suffix } => {
            parse_json_reports(response, &spec.converters, suffix)?
        }
    };
    table.rename_columns(|column| spec.rename.apply(column));
    Ok(table)
}

fn check_response(response: &RawResponse, spec: &EndpointSpec) -> Result<(), AlphaError> {
    let message = if !response.is_success() {
        format!("{} returned HTTP {}", spec.function, response.status)
    } else if response.has_invalid_call_marker() {
        format!("{} was rejected as an invalid API call", spec.function)
    } else {
        return Ok(());
    };

    error!(
        url = %redact_api_key(&response.url),
        status = response.status,
        body = %excerpt(&response.body),
        "{message}"
    );
    Err(AlphaError::upstream(response.status, message, response.body.clone()))
}

fn parse_csv(response: &RawResponse, spec: &EndpointSpec) -> Result<Table, AlphaError> {
    // Rate-limit notes and errors arrive as JSON even when CSV was requested.
    if response.body.trim_start().starts_with('{') {
        error!(
            url = %redact_api_key(&response.url),
            body = %excerpt(&response.body),
            "expected csv, provider sent json"
        );
        return Err(AlphaError::upstream(
            response.status,
            format!("{} answered with JSON instead of CSV", spec.function),
            response.body.clone(),
        ));
    }

    if response.body.trim().is_empty() {
        return Ok(Table::default());
    }

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(response.body.as_bytes());
    let columns = reader
        .headers()?
        .iter()
        .map(str::to_owned)
        .collect::<Vec<_>>();
    let kinds = columns
        .iter()
        .map(|column| spec.converters.kind_for(column))
        .collect::<Vec<_>>();

    let mut table = Table::new(columns.clone());
    for (index, record) in reader.records().enumerate() {
        let record = record?;
        let row = record
            .iter()
            .zip(columns.iter().zip(&kinds))
            .map(|(raw, (column, kind))| convert(raw, *kind, column, index + 1))
            .collect::<Result<Vec<_>, _>>()?;
        table.push_row(row)?;
    }
    Ok(table)
}

fn parse_json_flat(
    response: &RawResponse,
    converters: &ConverterSpec,
) -> Result<Table, AlphaError> {
    let object = json_object(&response.body)?;
    let mut table = Table::new(object.keys().cloned().collect());
    let row = json_row(&object, table.columns(), converters, 1)?;
    table.push_row(row)?;
    Ok(table)
}

/// `annual{suffix}` rows followed by `quarterly{suffix}` rows, each tagged in
/// a leading `period` column.
fn parse_json_reports(
    response: &RawResponse,
    converters: &ConverterSpec,
    suffix: &str,
) -> Result<Table, AlphaError> {
    let object = json_object(&response.body)?;

    let mut halves = Vec::with_capacity(2);
    for period in ["annual", "quarterly"] {
        let key = format!("{period}{suffix}");
        let Some(Json::Array(reports)) = object.get(&key) else {
            error!(
                url = %redact_api_key(&response.url),
                body = %excerpt(&response.body),
                section = %key,
                "report section missing"
            );
            return Err(AlphaError::upstream(
                response.status,
                format!("payload has no '{key}' section"),
                response.body.clone(),
            ));
        };

        let mut columns: Vec<String> = Vec::new();
        let mut records = Vec::with_capacity(reports.len());
        for report in reports {
            let Json::Object(report) = report else {
                return Err(AlphaError::parse(format!("'{key}' entries must be JSON objects")));
            };
            for column in report.keys() {
                if !columns.contains(column) {
                    columns.push(column.clone());
                }
            }
            records.push(report);
        }

        let mut table = Table::new(columns);
        for (index, report) in records.into_iter().enumerate() {
            let row = json_row(report, table.columns(), converters, index + 1)?;
            table.push_row(row)?;
        }
        table.insert_column(0, "period", Value::Text(period.to_owned()));
        halves.push(table);
    }

    Ok(Table::concat(halves))
}

fn json_object(body: &str) -> Result<Map<String, Json>, AlphaError> {
    match serde_json::from_str::<Json>(body)? {
        Json::Object(object) => Ok(object),
        _ => Err(AlphaError::parse("expected a JSON object")),
    }
}

fn json_row(
    object: &Map<String, Json>,
    columns: &[String],
    converters: &ConverterSpec,
    row: usize,
) -> Result<Vec<Value>, AlphaError> {
    columns
        .iter()
        .map(|column| match object.get(column) {
            None | Some(Json::Null) => Ok(Value::Null),
            Some(Json::String(raw)) => convert(raw, converters.kind_for(column), column, row),
            Some(other) => convert(&other.to_string(), converters.kind_for(column), column, row),
        })
        .collect()
}

/// Converts one raw cell. `row` is 1-based and only used in error messages.
pub fn convert(raw: &str, kind: ColumnKind, column: &str, row: usize) -> Result<Value, AlphaError> {
    let raw = raw.trim();
    if NULL_TOKENS.contains(&raw) {
        return Ok(Value::Null);
    }

    let converted = match kind {
        ColumnKind::Text => Some(Value::Text(raw.to_owned())),
        ColumnKind::Integer => raw.parse::<i64>().ok().map(Value::Integer),
        ColumnKind::Float => raw.parse::<f64>().ok().map(Value::Float),
        ColumnKind::Decimal => Decimal::from_str(raw)
            .or_else(|_| Decimal::from_scientific(raw))
            .ok()
            .map(Value::Decimal),
        ColumnKind::Date => Date::parse(raw, DATE_FORMAT).ok().map(Value::Date),
        ColumnKind::Timestamp => parse_timestamp(raw),
    };

    converted.ok_or_else(|| {
        AlphaError::parse(format!(
            "column '{column}' row {row}: cannot read '{raw}' as {}",
            kind_name(kind)
        ))
    })
}

fn parse_timestamp(raw: &str) -> Option<Value> {
    if let Ok(date) = Date::parse(raw, DATE_FORMAT) {
        return Some(Value::Date(date));
    }
    PrimitiveDateTime::parse(raw, TIMESTAMP_FORMAT)
        .or_else(|_| PrimitiveDateTime::parse(raw, TIMESTAMP_MINUTES_FORMAT))
        .ok()
        .map(Value::Timestamp)
}

const fn kind_name(kind: ColumnKind) -> &'static str {
    match kind {
        ColumnKind::Timestamp => "timestamp",
        ColumnKind::Date => "date",
        ColumnKind::Decimal => "decimal",
        ColumnKind::Integer => "integer",
        ColumnKind::Float => "float",
        ColumnKind::Text => "text",
    }
}

/// `PERatio` -> `pe_ratio`, `52WeekHigh` -> `52_week_high`,
/// `adjusted close` -> `adjusted_close`.
pub fn to_snake_case(name: &str) -> String {
    let chars = name.trim().chars().collect::<Vec<_>>();
    let mut out = String::with_capacity(chars.len() + 4);

    for (index, &ch) in chars.iter().enumerate() {
        if !ch.is_ascii_alphanumeric() {
            if !out.is_empty() && !out.ends_with('_') {
                out.push('_');
            }
            continue;
        }

        if ch.is_ascii_uppercase() && index > 0 {
            let prev = chars[index - 1];
            let next_is_lower = chars.get(index + 1).is_some_and(char::is_ascii_lowercase);
            let boundary = prev.is_ascii_lowercase()
                || prev.is_ascii_digit()
                || (prev.is_ascii_uppercase() && next_is_lower);
            if boundary && !out.is_empty() && !out.ends_with('_') {
                out.push('_');
            }
        }
        out.push(ch.to_ascii_lowercase());
    }

    out.trim_end_matches('_').to_owned()
}

#[cfg(test)]
mod tests {
    use time::macros::{date, datetime};

    use super::*;
    use crate::endpoint::Endpoint;

    fn ok(body: &str) -> RawResponse {
        RawResponse::ok(body, "https://example.test/query?apikey=K")
    }

    #[test]
    fn snake_cases_provider_names() {
        let cases = [
            ("PERatio", "pe_ratio"),
            ("52WeekHigh", "52_week_high"),
            ("200DayMovingAverage", "200_day_moving_average"),
            ("reportedEPS", "reported_eps"),
            ("EVToEBITDA", "ev_to_ebitda"),
            ("QuarterlyEarningsGrowthYOY", "quarterly_earnings_growth_yoy"),
            ("changePercent", "change_percent"),
            ("adjusted close", "adjusted_close"),
            ("Symbol", "symbol"),
            ("close", "close"),
        ];
        for (raw, expected) in cases {
            assert_eq!(to_snake_case(raw), expected, "{raw}");
        }
    }

    #[test]
    fn null_tokens_become_null() {
        for raw in ["", "None", "null", "-", "  "] {
            assert_eq!(convert(raw, ColumnKind::Decimal, "x", 1).expect("null"), Value::Null);
        }
    }

    #[test]
    fn timestamps_keep_date_only_values_as_dates() {
        assert_eq!(
            convert("2024-01-02", ColumnKind::Timestamp, "timestamp", 1).expect("date"),
            Value::Date(date!(2024 - 01 - 02))
        );
        assert_eq!(
            convert("2024-01-02 09:35:00", ColumnKind::Timestamp, "timestamp", 1).expect("ts"),
            Value::Timestamp(datetime!(2024-01-02 09:35:00))
        );
        assert_eq!(
            convert("2024-01-02 09:35", ColumnKind::Timestamp, "time", 1).expect("ts"),
            Value::Timestamp(datetime!(2024-01-02 09:35:00))
        );
    }

    #[test]
    fn decimals_keep_their_scale() {
        let value = convert("185.6400", ColumnKind::Decimal, "close", 1).expect("decimal");
        assert_eq!(value.to_string(), "185.6400");
        assert_eq!(
            convert("1.5E-3", ColumnKind::Decimal, "ratio", 1).expect("scientific"),
            Value::Decimal(Decimal::new(15, 4))
        );
    }

    #[test]
    fn parse_errors_name_column_and_row() {
        let body = "timestamp,open,high,low,close,volume\n\
                    2024-01-02,1.0,2.0,0.5,1.5,100\n\
                    2024-01-03,1.0,abc,0.5,1.5,100\n";
        let error = normalize(&ok(body), Endpoint::Daily.spec()).expect_err("bad cell");

        assert_eq!(error.kind(), crate::AlphaErrorKind::Parse);
        let message = error.to_string();
        assert!(message.contains("'high'"), "{message}");
        assert!(message.contains("row 2"), "{message}");
    }

    #[test]
    fn json_note_on_csv_endpoint_is_upstream() {
        let body = r#"{"Note": "Our standard API call frequency is 5 calls per minute."}"#;
        let error = normalize(&ok(body), Endpoint::Daily.spec()).expect_err("note");

        assert_eq!(error.kind(), crate::AlphaErrorKind::Upstream);
        assert_eq!(error.upstream_body(), Some(body));
    }

    #[test]
    fn empty_slices_do_not_fail_the_aggregate() {
        let spec = Endpoint::IntradayExtended.spec();
        let responses = [
            ok("time,open,high,low,close,volume\n2022-03-01 10:00:00,1,2,0.5,1.5,100\n"),
            ok("time,open,high,low,close,volume\n"),
        ];

        let table = normalize_slices(&responses, spec).expect("aggregate has data");
        assert_eq!(table.row_count(), 1);
        assert_eq!(table.columns()[0], "date");

        let error = normalize_slices(&responses[1..], spec).expect_err("nothing at all");
        assert_eq!(error.kind(), crate::AlphaErrorKind::Upstream);
    }
}
