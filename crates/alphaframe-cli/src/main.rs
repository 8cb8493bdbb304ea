mod cli;
mod commands;
mod error;
mod output;

use std::process::ExitCode;

use alphaframe_core::{init_logging, AlphaClient, ClientConfig, LogConfig};
use clap::Parser;
use tracing::debug;

use crate::cli::Cli;
use crate::error::CliError;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::from(error.exit_code())
        }
    }
}

async fn run() -> Result<(), CliError> {
    let cli = Cli::parse();

    let config = load_config(&cli)?;
    init_logging(&log_config(&cli, &config))?;
    debug!(
        keys = config.api_keys.len(),
        proxies = config.proxies.len(),
        "configuration loaded"
    );

    let client = AlphaClient::from_config(&config)?;
    let table = commands::run(&cli, &client).await?;

    output::render(&table, cli.format, cli.pretty, std::io::stdout().lock())
}

fn load_config(cli: &Cli) -> Result<ClientConfig, CliError> {
    let config = match &cli.config {
        Some(path) => ClientConfig::from_yaml_file(path)?,
        None => ClientConfig::default(),
    };
    Ok(config.with_env_overrides())
}

fn log_config(cli: &Cli, config: &ClientConfig) -> LogConfig {
    let log = match &cli.log_level {
        Some(level) => LogConfig::new(level),
        None => config.log_config(),
    };
    log.with_format(cli.log_format)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use alphaframe_core::LogFormat;

    use super::*;

    #[test]
    fn loads_config_named_on_the_command_line() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "alpha_vantage_api_key_list: [FROMFILE]\nlog_level: WARN").expect("write");
        let path = file.path().to_string_lossy().into_owned();

        let cli = Cli::try_parse_from(["alphaframe", "--config", path.as_str(), "quote", "IBM"])
            .expect("valid arguments");
        let config = load_config(&cli).expect("config loads");

        assert_eq!(config.log_level, "WARN");
        assert!(!config.api_keys.is_empty());
    }

    #[test]
    fn missing_config_file_maps_to_configuration_exit_code() {
        let cli = Cli::try_parse_from([
            "alphaframe",
            "--config",
            "/nonexistent/alphaframe.yml",
            "quote",
            "IBM",
        ])
        .expect("valid arguments");
        let error = load_config(&cli).expect_err("missing file");
        assert_eq!(error.exit_code(), 3);
    }

    #[test]
    fn log_settings_come_from_config_unless_overridden() {
        let config = ClientConfig {
            log_level: String::from("WARNING"),
            ..ClientConfig::default()
        };

        let cli = Cli::try_parse_from(["alphaframe", "--log-format", "json", "quote", "IBM"])
            .expect("valid arguments");
        let log = log_config(&cli, &config);
        assert_eq!(log.level, "warn");
        assert_eq!(log.format, LogFormat::Json);

        let cli = Cli::try_parse_from(["alphaframe", "--log-level", "DEBUG", "quote", "IBM"])
            .expect("valid arguments");
        let log = log_config(&cli, &config);
        assert_eq!(log.level, "debug");
        assert_eq!(log.format, LogFormat::Compact);
    }
}
