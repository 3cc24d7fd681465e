pub mod network;
pub mod nodes;
pub mod watch;

use anyhow::Result;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use tabled::{builder::Builder as TableBuilder, settings::Style};

/// Unified output format for all CLI commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
pub enum OutputFormat {
    #[value(name = "table")]
    Table,
    #[value(name = "json")]
    Json,
    #[value(name = "json-pretty")]
    JsonPretty,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Table => write!(f, "table"),
            Self::Json => write!(f, "json"),
            Self::JsonPretty => write!(f, "json-pretty"),
        }
    }
}

/// Helper function to convert data to JSON format
pub fn to_json_string<T: Serialize>(data: &T, pretty: bool) -> Result<String> {
    if pretty {
        Ok(serde_json::to_string_pretty(data)?)
    } else {
        Ok(serde_json::to_string(data)?)
    }
}

/// Render `data` as JSON, or fall back to `table` for [`OutputFormat::Table`].
pub fn render<T: Serialize>(
    data: &T,
    format: OutputFormat,
    table: impl FnOnce(&T) -> String,
) -> Result<String> {
    match format {
        OutputFormat::Table => Ok(table(data)),
        OutputFormat::Json => to_json_string(data, false),
        OutputFormat::JsonPretty => to_json_string(data, true),
    }
}

pub(crate) fn print_table(header: &[&str], rows: Vec<Vec<String>>) -> String {
    let mut printable = vec![header.iter().map(|h| h.to_string()).collect::<Vec<_>>()];
    printable.extend(rows);

    TableBuilder::from(printable)
        .build()
        .with(Style::psql().remove_horizontals())
        .to_string()
}
