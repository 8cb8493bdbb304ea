use alphaframe_core::{AlphaClient, Symbol, Table};

use crate::cli::SymbolArgs;
use crate::error::CliError;

pub async fn overview(
    args: &SymbolArgs,
    client: &AlphaClient,
    use_proxy: bool,
) -> Result<Table, CliError> {
    let symbol = Symbol::parse(&args.symbol)?;
    Ok(client.overview(symbol, use_proxy).await?)
}

pub async fn earnings(
    args: &SymbolArgs,
    client: &AlphaClient,
    use_proxy: bool,
) -> Result<Table, CliError> {
    let symbol = Symbol::parse(&args.symbol)?;
    Ok(client.earnings(symbol, use_proxy).await?)
}

pub async fn income_statement(
    args: &SymbolArgs,
    client: &AlphaClient,
    use_proxy: bool,
) -> Result<Table, CliError> {
    let symbol = Symbol::parse(&args.symbol)?;
    Ok(client.income_statement(symbol, use_proxy).await?)
}

pub async fn balance_sheet(
    args: &SymbolArgs,
    client: &AlphaClient,
    use_proxy: bool,
) -> Result<Table, CliError> {
    let symbol = Symbol::parse(&args.symbol)?;
    Ok(client.balance_sheet(symbol, use_proxy).await?)
}

pub async fn cash_flow(
    args: &SymbolArgs,
    client: &AlphaClient,
    use_proxy: bool,
) -> Result<Table, CliError> {
    let symbol = Symbol::parse(&args.symbol)?;
    Ok(client.cash_flow(symbol, use_proxy).await?)
}
