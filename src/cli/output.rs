// Output formatting for CLI

use std::io::Write;

use clap::ValueEnum;
use serde_json::Value;

/// Output format for metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed JSON
    #[default]
    Pretty,
    /// Compact JSON, one document per line
    Json,
    /// Key-value pairs
    KeyValue,
    /// Table format
    Table,
}

/// Format and output data
pub struct OutputFormatter {
    format: OutputFormat,
    quiet: bool,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat, quiet: bool) -> Self {
        Self { format, quiet }
    }

    /// Output metadata
    pub fn output_metadata(&self, metadata: &Value, writer: &mut impl Write) -> anyhow::Result<()> {
        match self.format {
            OutputFormat::Pretty => {
                writeln!(writer, "{}", serde_json::to_string_pretty(metadata)?)?;
            }
            OutputFormat::Json => {
                writeln!(writer, "{}", serde_json::to_string(metadata)?)?;
            }
            OutputFormat::KeyValue => {
                for (key, value) in flatten(metadata) {
                    writeln!(writer, "{}: {}", key, value)?;
                }
                writeln!(writer)?;
            }
            OutputFormat::Table => {
                let rows = flatten(metadata);
                let width = rows.iter().map(|(key, _)| key.len()).max().unwrap_or(0) + 1;

                writeln!(writer, "{}", "=".repeat(width + 30))?;
                for (key, value) in rows {
                    writeln!(writer, "{:<width$} {}", format!("{}:", key), value, width = width)?;
                }
                writeln!(writer, "{}", "=".repeat(width + 30))?;
            }
        }
        Ok(())
    }

    /// Print error message
    pub fn print_error(&self, message: &str) {
        eprintln!("✗ {}", message);
    }

    /// Print info message
    pub fn print_info(&self, message: &str) {
        if !self.quiet {
            println!("  {}", message);
        }
    }

    pub fn quiet(&self) -> bool {
        self.quiet
    }
}

/// Flatten nested objects into dotted keys
fn flatten(value: &Value) -> Vec<(String, String)> {
    let mut rows = Vec::new();
    flatten_into(None, value, &mut rows);
    rows
}

fn flatten_into(prefix: Option<&str>, value: &Value, rows: &mut Vec<(String, String)>) {
    match value {
        Value::Object(obj) => {
            for (key, value) in obj {
                let key = match prefix {
                    Some(prefix) => format!("{}.{}", prefix, key),
                    None => key.clone(),
                };
                flatten_into(Some(&key), value, rows);
            }
        }
        other => rows.push((prefix.unwrap_or_default().to_string(), format_value(other))),
    }
}

/// Format a JSON value for display
fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "(none)".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(arr) => format!("[{} items]", arr.len()),
        Value::Object(obj) => format!("{{{} items}}", obj.len()),
    }
}
