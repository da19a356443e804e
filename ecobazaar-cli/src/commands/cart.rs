//! Cart command - show and edit the shopping cart

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;

use ecobazaar_core::domain::CartFilter;
use ecobazaar_core::Cart;

use super::{check, App};
use crate::output;

#[derive(Subcommand)]
pub enum CartCommands {
    /// Show the cart
    Show {
        /// Only items in this category (server-side filter)
        #[arg(long)]
        category: Option<String>,
        /// Only items with this eco rating
        #[arg(long)]
        eco_rating: Option<String>,
        /// Only items up to this carbon footprint
        #[arg(long)]
        max_carbon: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Add a product
    Add {
        /// Product ID
        product_id: String,
        /// Quantity
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    /// Remove a cart item
    Remove {
        /// Cart item ID (see `eb cart show`)
        item_id: String,
    },
}

pub async fn run(command: CartCommands) -> Result<()> {
    let app = App::open("/cart").await?;

    match command {
        CartCommands::Show {
            category,
            eco_rating,
            max_carbon,
            json,
        } => {
            app.require_user()?;
            let filter = CartFilter {
                category,
                eco_rating,
                max_carbon,
            };
            let cart = if filter == CartFilter::default() {
                let state = app.ctx.cart.state();
                if let Some(error) = state.error {
                    anyhow::bail!(error);
                }
                state.cart.unwrap_or_default()
            } else {
                app.ctx.cart.filtered(&filter).await?
            };
            if json {
                output::json(&cart)?;
            } else {
                print_cart(&cart);
            }
        }
        CartCommands::Add {
            product_id,
            quantity,
        } => {
            check(app.ctx.cart.add_to_cart(product_id.as_str(), quantity).await)?;
            output::success(&format!("Added {} x product {} to cart", quantity, product_id));
        }
        CartCommands::Remove { item_id } => {
            check(app.ctx.cart.remove_from_cart(item_id.as_str()).await)?;
            output::success("Removed from cart");
        }
    }

    app.report_redirects();
    Ok(())
}

fn print_cart(cart: &Cart) {
    if cart.is_empty() {
        println!("{}", "Your cart is empty".dimmed());
        return;
    }

    let mut table = output::create_table();
    table.set_header(vec!["Item", "Product", "Qty", "Price", "Total", "Carbon"]);
    for item in &cart.items {
        let product = match (&item.product, item.product_ref()) {
            (Some(p), _) => p.label(),
            (None, Some(id)) => format!("Product #{}", id),
            (None, None) => "-".to_string(),
        };
        table.add_row(vec![
            item.item_id.to_string(),
            product,
            item.quantity.to_string(),
            output::format_money(item.unit_price()),
            output::format_money(item.line_total()),
            output::format_carbon(item.line_carbon()),
        ]);
    }
    println!("{}", table);
    println!(
        "{}  {}    {}  {}",
        "Subtotal:".bold(),
        output::format_money(Some(cart.subtotal())),
        "Footprint:".bold(),
        output::format_carbon(Some(cart.carbon_total()))
    );
}
