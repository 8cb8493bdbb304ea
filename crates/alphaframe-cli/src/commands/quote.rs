use alphaframe_core::{AlphaClient, Symbol, Table};

use crate::cli::SymbolArgs;
use crate::error::CliError;

pub async fn run(
    args: &SymbolArgs,
    client: &AlphaClient,
    use_proxy: bool,
) -> Result<Table, CliError> {
    let symbol = Symbol::parse(&args.symbol)?;
    Ok(client.quote(symbol, use_proxy).await?)
}
