//! Wishlist command - show, toggle and remove saved products

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;

use ecobazaar_core::domain::ProbeState;
use ecobazaar_core::services::WishlistChange;
use ecobazaar_core::ResourceId;

use super::App;
use crate::output;

#[derive(Subcommand)]
pub enum WishlistCommands {
    /// Show the wishlist
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Add a product, or remove it if already saved
    Toggle {
        /// Product ID
        product_id: String,
    },
    /// Remove a wishlist entry
    Remove {
        /// Wishlist entry ID (see `eb wishlist show`)
        entry_id: String,
        /// Print the endpoint shapes tried
        #[arg(long)]
        trace: bool,
    },
    /// Ask the server whether a product is saved
    Check {
        /// Product ID
        product_id: String,
    },
}

pub async fn run(command: WishlistCommands) -> Result<()> {
    let app = App::open("/wishlist").await?;

    let result = match command {
        WishlistCommands::Show { json } => {
            app.require_user()?;
            let state = app.ctx.wishlist.state();
            if json {
                output::json(&state.wishlist)?;
            } else {
                if let Some(error) = &state.error {
                    output::warning(error);
                }
                print_wishlist(&app);
            }
            Ok(())
        }
        WishlistCommands::Toggle { product_id } => {
            app.ctx
                .wishlist
                .toggle(product_id.as_str())
                .await
                .map(|change| match change {
                    WishlistChange::Added => output::success("Added to wishlist"),
                    WishlistChange::Removed => output::success("Removed from wishlist"),
                })
        }
        WishlistCommands::Remove { entry_id, trace } => {
            let result = app.ctx.wishlist.remove_entry(entry_id.as_str()).await;
            if trace {
                print_trace(&app);
            }
            result.map(|()| output::success("Removed from wishlist"))
        }
        WishlistCommands::Check { product_id } => app
            .ctx
            .wishlist
            .check(product_id.as_str())
            .await
            .map(|saved| {
                if saved {
                    println!("{}", format!("♥ Product {} is on your wishlist", product_id).green());
                } else {
                    println!("{}", format!("Product {} is not on your wishlist", product_id).dimmed());
                }
            }),
    };

    app.report_redirects();
    if result.is_err() {
        // The cache keeps the message meant for the user
        if let Some(message) = app.ctx.wishlist.error() {
            anyhow::bail!(message);
        }
    }
    Ok(result?)
}

fn print_wishlist(app: &App) {
    let entries = app.ctx.wishlist.entries();
    if entries.is_empty() {
        println!("{}", "Your wishlist is empty".dimmed());
        return;
    }

    let mut table = output::create_table();
    table.set_header(vec!["Entry", "Product", "Name", "Price", "Carbon"]);
    for entry in &entries {
        let entry_id = entry
            .entry_id
            .as_ref()
            .map(ResourceId::to_string)
            .unwrap_or_else(|| "-".to_string());
        let (name, price, carbon) = match entry.target.product() {
            Some(p) => (p.label(), p.price, p.carbon_footprint),
            None => ("(details unavailable)".dimmed().to_string(), None, None),
        };
        table.add_row(vec![
            entry_id,
            entry.product_id().to_string(),
            name,
            output::format_money(price),
            output::format_carbon(carbon),
        ]);
    }
    println!("{}", table);
}

fn print_trace(app: &App) {
    let trace = app.ctx.wishlist.last_probe_trace();
    if trace.is_empty() {
        return;
    }
    let mut table = output::create_table();
    table.set_header(vec!["Shape", "Request", "Result"]);
    for record in trace {
        table.add_row(vec![
            record.label.to_string(),
            format!("{} {}", record.method, record.target),
            describe(&record.state),
        ]);
    }
    println!("{}", table);
}

fn describe(state: &ProbeState) -> String {
    match state {
        ProbeState::NotTried => "not tried".dimmed().to_string(),
        ProbeState::Trying => "in flight".to_string(),
        ProbeState::Succeeded => "ok".green().to_string(),
        ProbeState::Failed {
            status: Some(status),
            ..
        } => format!("HTTP {}", status).red().to_string(),
        ProbeState::Failed { reason, .. } => reason.red().to_string(),
    }
}
