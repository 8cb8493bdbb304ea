use alphaframe_core::{AlphaClient, Symbol, Table};

use crate::cli::{ExtendedArgs, IntradayArgs, SeriesArgs};
use crate::error::CliError;

pub async fn intraday(
    args: &IntradayArgs,
    client: &AlphaClient,
    use_proxy: bool,
) -> Result<Table, CliError> {
    let symbol = Symbol::parse(&args.symbol)?;
    Ok(client
        .time_series_intraday(symbol, args.interval, !args.unadjusted, use_proxy)
        .await?)
}

pub async fn intraday_extended(
    args: &ExtendedArgs,
    client: &AlphaClient,
    use_proxy: bool,
) -> Result<Table, CliError> {
    let symbol = Symbol::parse(&args.symbol)?;
    Ok(client
        .time_series_intraday_extended(
            symbol,
            args.interval,
            args.year_range,
            !args.unadjusted,
            use_proxy,
        )
        .await?)
}

pub async fn daily(
    args: &SeriesArgs,
    client: &AlphaClient,
    use_proxy: bool,
) -> Result<Table, CliError> {
    let symbol = Symbol::parse(&args.symbol)?;
    Ok(client.time_series_daily(symbol, !args.unadjusted, use_proxy).await?)
}

pub async fn weekly(
    args: &SeriesArgs,
    client: &AlphaClient,
    use_proxy: bool,
) -> Result<Table, CliError> {
    let symbol = Symbol::parse(&args.symbol)?;
    Ok(client.time_series_weekly(symbol, !args.unadjusted, use_proxy).await?)
}

pub async fn monthly(
    args: &SeriesArgs,
    client: &AlphaClient,
    use_proxy: bool,
) -> Result<Table, CliError> {
    let symbol = Symbol::parse(&args.symbol)?;
    Ok(client.time_series_monthly(symbol, !args.unadjusted, use_proxy).await?)
}
