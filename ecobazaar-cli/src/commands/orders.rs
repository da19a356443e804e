//! Orders command - checkout and order history

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;
use dialoguer::{Confirm, Input};

use ecobazaar_core::domain::{NewOrder, Order};
use ecobazaar_core::ResourceId;

use super::App;
use crate::output;

#[derive(Subcommand)]
pub enum OrderCommands {
    /// Check out the current cart
    Place {
        /// Shipping address (prompted when omitted)
        #[arg(long)]
        address: Option<String>,
        /// Payment method
        #[arg(long)]
        payment: Option<String>,
        /// Skip confirmation prompt
        #[arg(long, short)]
        yes: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List your orders
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show one order
    Show {
        /// Order ID
        id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List every order on the platform (admin)
    All {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Change an order's status (seller/admin)
    Status {
        /// Order ID
        id: String,
        /// New status, e.g. SHIPPED
        status: String,
    },
}

pub async fn run(command: OrderCommands) -> Result<()> {
    let app = App::open("/orders").await?;

    match command {
        OrderCommands::Place {
            address,
            payment,
            yes,
            json,
        } => place(&app, address, payment, yes, json).await?,
        OrderCommands::List { json } => {
            let orders = app.ctx.orders.list().await?;
            if json {
                output::json(&orders)?;
            } else {
                print_orders(&orders);
            }
        }
        OrderCommands::Show { id, json } => {
            let order = app.ctx.orders.get(&ResourceId::from(id)).await?;
            if json {
                output::json(&order)?;
            } else {
                print_orders(std::slice::from_ref(&order));
            }
        }
        OrderCommands::All { json } => {
            app.require_user()?;
            let orders = app.ctx.orders.all().await?;
            if json {
                output::json(&orders)?;
            } else {
                print_orders(&orders);
            }
        }
        OrderCommands::Status { id, status } => {
            app.require_user()?;
            let status = status.to_uppercase();
            let order = app
                .ctx
                .orders
                .update_status(&ResourceId::from(id), &status)
                .await?;
            output::success(&format!("Order {} is now {}", order.id, status));
        }
    }

    app.report_redirects();
    Ok(())
}

async fn place(
    app: &App,
    address: Option<String>,
    payment: Option<String>,
    yes: bool,
    json: bool,
) -> Result<()> {
    app.require_user()?;
    let cart = app.ctx.cart.cart().unwrap_or_default();
    if cart.is_empty() {
        anyhow::bail!("Your cart is empty");
    }

    let shipping_address = match address {
        Some(a) => a,
        None => Input::new().with_prompt("Shipping address").interact_text()?,
    };

    if !yes {
        println!(
            "\n{} item(s), {} total, {}",
            cart.item_count(),
            output::format_money(Some(cart.subtotal())),
            output::format_carbon(Some(cart.carbon_total()))
        );
        if !Confirm::new()
            .with_prompt("Place this order?")
            .default(true)
            .interact()?
        {
            println!("{}\n", "Cancelled".dimmed());
            return Ok(());
        }
    }

    let order = app
        .ctx
        .orders
        .place(&NewOrder {
            shipping_address,
            payment_method: payment,
        })
        .await?;
    if json {
        return output::json(&order);
    }
    output::success(&format!("Order {} placed", order.id));
    Ok(())
}

fn print_orders(orders: &[Order]) {
    if orders.is_empty() {
        println!("{}", "No orders yet".dimmed());
        return;
    }
    let mut table = output::create_table();
    table.set_header(vec!["Order", "Date", "Status", "Items", "Total", "Carbon"]);
    for order in orders {
        table.add_row(vec![
            order.id.to_string(),
            order.order_date.clone().unwrap_or_default(),
            order.status.clone().unwrap_or_default(),
            order.items.len().to_string(),
            output::format_money(order.total_amount),
            output::format_carbon(order.total_carbon_footprint),
        ]);
    }
    println!("{}", table);
}
