use alphaframe_core::{AlphaClient, Table};

use crate::cli::SearchArgs;
use crate::error::CliError;

pub async fn run(
    args: &SearchArgs,
    client: &AlphaClient,
    use_proxy: bool,
) -> Result<Table, CliError> {
    let keywords = args.keywords.join(" ");
    let table = client.search(&keywords, use_proxy).await?;
    // stdout carries the table itself
    eprintln!("{} results returned.", table.row_count());
    Ok(table)
}
