mod fundamentals;
mod quote;
mod search;
mod time_series;

use alphaframe_core::{AlphaClient, Table};

use crate::cli::{Cli, Command};
use crate::error::CliError;

pub async fn run(cli: &Cli, client: &AlphaClient) -> Result<Table, CliError> {
    let use_proxy = cli.use_proxy;
    match &cli.command {
        Command::Intraday(args) => time_series::intraday(args, client, use_proxy).await,
        Command::IntradayExtended(args) => {
            time_series::intraday_extended(args, client, use_proxy).await
        }
        Command::Daily(args) => time_series::daily(args, client, use_proxy).await,
        Command::Weekly(args) => time_series::weekly(args, client, use_proxy).await,
        Command::Monthly(args) => time_series::monthly(args, client, use_proxy).await,
        Command::Quote(args) => quote::run(args, client, use_proxy).await,
        Command::Search(args) => search::run(args, client, use_proxy).await,
        Command::Overview(args) => fundamentals::overview(args, client, use_proxy).await,
        Command::Earnings(args) => fundamentals::earnings(args, client, use_proxy).await,
        Command::IncomeStatement(args) => {
            fundamentals::income_statement(args, client, use_proxy).await
        }
        Command::BalanceSheet(args) => fundamentals::balance_sheet(args, client, use_proxy).await,
        Command::CashFlow(args) => fundamentals::cash_flow(args, client, use_proxy).await,
    }
}
