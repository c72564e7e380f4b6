//! Output helpers shared by the CLI commands.

use serde::Serialize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

/// `--format` value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Aligned table; single values print bare.
    #[default]
    Table,
    /// Pretty-printed JSON for scripting.
    Json,
}

/// Print node rows, or `empty` when there are none in table mode.
pub fn print_rows<T: Serialize + Tabled>(rows: &[T], format: OutputFormat, empty: &str) {
    match format {
        OutputFormat::Table if rows.is_empty() => println!("{empty}"),
        OutputFormat::Table => println!("{}", Table::new(rows).with(Style::sharp())),
        OutputFormat::Json => print_json(&rows),
    }
}

/// Print a value as pretty JSON.
pub fn print_json<T: Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{json}"),
        Err(e) => eprintln!("error: failed to encode output: {e}"),
    }
}

/// Report a completed action.
pub fn done(msg: &str) {
    println!("✓ {msg}");
}

/// Report something that needs manual follow-up. Goes to stderr so JSON
/// output stays parseable.
pub fn warn(msg: &str) {
    eprintln!("⚠ {msg}");
}
