//! Carbon command - personal impact report, exports and the community board

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;

use ecobazaar_core::domain::CarbonReport;

use super::App;
use crate::output;

#[derive(Subcommand)]
pub enum CarbonCommands {
    /// Download your report as rendered by the server
    Export {
        /// Text format, e.g. txt
        #[arg(long, default_value = "txt")]
        format: String,
        /// Write to a file instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Platform-wide carbon totals (admin)
    Summary,
    /// Top users by carbon saved
    Leaderboard {
        /// Number of rows
        #[arg(long, default_value_t = 10)]
        limit: u32,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

pub async fn run(command: Option<CarbonCommands>, json: bool) -> Result<()> {
    let app = App::open("/carbon").await?;

    match command {
        None => {
            let report = app.ctx.carbon.report().await?;
            if json {
                output::json(&report)?;
            } else {
                print_report(&report);
            }
        }
        Some(CarbonCommands::Export { format, output: path }) => {
            let text = app.ctx.carbon.export(&format).await?;
            match path {
                Some(path) => {
                    std::fs::write(&path, text)
                        .with_context(|| format!("Failed to write {:?}", path))?;
                    output::success(&format!("Report saved to {}", path.display()));
                }
                None => println!("{}", text),
            }
        }
        Some(CarbonCommands::Summary) => {
            output::json(&app.ctx.carbon.platform_summary().await?)?;
        }
        Some(CarbonCommands::Leaderboard { limit, json }) => {
            let board = app.ctx.carbon.leaderboard(limit).await?;
            if json {
                output::json(&board)?;
            } else if board.is_empty() {
                println!("{}", "Nobody on the board yet".dimmed());
            } else {
                let mut table = output::create_table();
                table.set_header(vec!["#", "Name", "Saved"]);
                for (rank, entry) in board.iter().enumerate() {
                    table.add_row(vec![
                        (rank + 1).to_string(),
                        entry.display_name(),
                        output::format_carbon(entry.total_carbon_saved),
                    ]);
                }
                println!("{}", table);
            }
        }
    }

    app.report_redirects();
    Ok(())
}

fn print_report(report: &CarbonReport) {
    println!("{}", "Carbon Impact".bold());
    println!();
    let mut table = output::create_table();
    table.add_row(vec![
        "Footprint".to_string(),
        output::format_carbon(report.total_carbon_footprint),
    ]);
    table.add_row(vec![
        "Saved".to_string(),
        output::format_carbon(report.total_carbon_saved),
    ]);
    if let Some(orders) = report.total_orders {
        table.add_row(vec!["Orders".to_string(), orders.to_string()]);
    }
    println!("{}", table);
}
