use std::io::Write;

use alphaframe_core::Table;

use crate::cli::OutputFormat;
use crate::error::CliError;

pub fn render<W: Write>(
    table: &Table,
    format: OutputFormat,
    pretty: bool,
    mut out: W,
) -> Result<(), CliError> {
    match format {
        OutputFormat::Csv => table.write_csv(&mut out)?,
        OutputFormat::Json => {
            if pretty {
                serde_json::to_writer_pretty(&mut out, table)?;
            } else {
                serde_json::to_writer(&mut out, table)?;
            }
            writeln!(out)?;
        }
    }
    out.flush()?;
    Ok(())
}
