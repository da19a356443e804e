//! Output formatting utilities

use colored::Colorize;
use comfy_table::{presets::UTF8_FULL_CONDENSED, ContentArrangement, Table};
use rust_decimal::Decimal;
use serde::Serialize;

/// Print a success message
pub fn success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

/// Print an error message
pub fn error(msg: &str) {
    eprintln!("{}", msg.red());
}

/// Print a warning message
pub fn warning(msg: &str) {
    eprintln!("{}", msg.yellow());
}

/// Print an info message
pub fn info(msg: &str) {
    println!("{}", msg.cyan());
}

/// Print any serializable value as pretty JSON
pub fn json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Create a styled table
pub fn create_table() -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Format an amount of money, or a dash when unknown
pub fn format_money(amount: Option<Decimal>) -> String {
    match amount {
        Some(a) => format!("${:.2}", a.round_dp(2)),
        None => "-".to_string(),
    }
}

/// Format kg CO2e, or a dash when unknown
pub fn format_carbon(kg: Option<Decimal>) -> String {
    match kg {
        Some(kg) => format!("{} kg CO₂e", kg.round_dp(2).normalize()),
        None => "-".to_string(),
    }
}
