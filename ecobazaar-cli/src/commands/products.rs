//! Products command - browse the catalog and manage listings

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;
use dialoguer::Confirm;

use ecobazaar_core::domain::ProductQuery;
use ecobazaar_core::{Product, ResourceId};

use super::App;
use crate::output;

#[derive(Subcommand)]
pub enum ProductCommands {
    /// Search products
    Search {
        /// Free-text keyword
        keyword: Option<String>,
        /// Category filter
        #[arg(long)]
        category: Option<String>,
        /// Eco rating filter (e.g. A)
        #[arg(long)]
        eco_rating: Option<String>,
        /// Minimum price
        #[arg(long)]
        min_price: Option<String>,
        /// Maximum price
        #[arg(long)]
        max_price: Option<String>,
        /// Sort field
        #[arg(long)]
        sort_by: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show one product
    Show {
        /// Product ID
        id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List featured products
    Featured {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List product categories
    Categories {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Your listings (seller)
    Mine {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Listings waiting for verification (admin)
    Pending {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Approve a pending listing (admin)
    Verify {
        /// Product ID
        id: String,
    },
    /// Toggle the featured flag (admin)
    Feature {
        /// Product ID
        id: String,
    },
    /// Delete a listing
    Delete {
        /// Product ID
        id: String,
        /// Skip confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },
}

pub async fn run(command: ProductCommands) -> Result<()> {
    let app = App::open("/products").await?;

    match command {
        ProductCommands::Search {
            keyword,
            category,
            eco_rating,
            min_price,
            max_price,
            sort_by,
            json,
        } => {
            let query = ProductQuery {
                keyword,
                category,
                eco_rating,
                min_price,
                max_price,
                sort_by,
            };
            let products = app.ctx.catalog.search(&query).await?;
            print_products(&app, &products, json)?;
        }
        ProductCommands::Show { id, json } => {
            let id = ResourceId::from(id);
            let product = app.ctx.catalog.product(&id).await?;
            if json {
                return output::json(&product);
            }
            print_product(&app, &product);
        }
        ProductCommands::Featured { json } => {
            let products = app.ctx.catalog.featured().await?;
            print_products(&app, &products, json)?;
        }
        ProductCommands::Categories { json } => {
            let categories = app.ctx.catalog.categories().await?;
            if json {
                output::json(&categories)?;
            } else {
                let mut table = output::create_table();
                table.set_header(vec!["ID", "Name", "Description"]);
                for c in &categories {
                    table.add_row(vec![
                        c.id.as_ref().map(ResourceId::to_string).unwrap_or_default(),
                        c.name.clone(),
                        c.description.clone().unwrap_or_default(),
                    ]);
                }
                println!("{}", table);
            }
        }
        ProductCommands::Mine { json } => {
            app.require_user()?;
            let products = app.ctx.catalog.my_products().await?;
            print_products(&app, &products, json)?;
        }
        ProductCommands::Pending { json } => {
            app.require_user()?;
            let products = app.ctx.catalog.pending_products().await?;
            print_products(&app, &products, json)?;
        }
        ProductCommands::Verify { id } => {
            app.require_user()?;
            app.ctx.catalog.verify_product(&ResourceId::from(id.as_str())).await?;
            output::success(&format!("Product {} verified", id));
        }
        ProductCommands::Feature { id } => {
            app.require_user()?;
            app.ctx.catalog.toggle_featured(&ResourceId::from(id.as_str())).await?;
            output::success(&format!("Featured flag toggled for product {}", id));
        }
        ProductCommands::Delete { id, yes } => {
            app.require_user()?;
            if !yes
                && !Confirm::new()
                    .with_prompt(format!("Delete product {}?", id))
                    .default(false)
                    .interact()?
            {
                println!("{}", "Cancelled".dimmed());
                return Ok(());
            }
            app.ctx.catalog.delete_product(&ResourceId::from(id.as_str())).await?;
            output::success(&format!("Product {} deleted", id));
        }
    }

    app.report_redirects();
    Ok(())
}

fn print_products(app: &App, products: &[Product], json: bool) -> Result<()> {
    if json {
        return output::json(&products);
    }
    if products.is_empty() {
        println!("{}", "No products found".dimmed());
        return Ok(());
    }

    let mut table = output::create_table();
    table.set_header(vec!["ID", "Name", "Price", "Carbon", "Eco", ""]);
    for p in products {
        let saved = if app.ctx.wishlist.contains(&p.id) { "♥" } else { "" };
        table.add_row(vec![
            p.id.to_string(),
            p.label(),
            output::format_money(p.price),
            output::format_carbon(p.carbon_footprint),
            p.eco_rating_label().unwrap_or_default(),
            saved.to_string(),
        ]);
    }
    println!("{}", table);
    Ok(())
}

fn print_product(app: &App, product: &Product) {
    println!("{}", product.label().bold());
    println!();

    let mut table = output::create_table();
    table.add_row(vec!["ID".to_string(), product.id.to_string()]);
    table.add_row(vec!["Price".to_string(), output::format_money(product.price)]);
    table.add_row(vec![
        "Carbon footprint".to_string(),
        output::format_carbon(product.carbon_footprint),
    ]);
    if let Some(rating) = product.eco_rating_label() {
        table.add_row(vec!["Eco rating".to_string(), rating]);
    }
    println!("{}", table);

    if app.ctx.wishlist.contains(&product.id) {
        println!("{}", "♥ On your wishlist".green());
    }
    let in_cart = app
        .ctx
        .cart
        .cart()
        .is_some_and(|c| c.contains_product(&product.id));
    if in_cart {
        println!("{}", "In your cart".green());
    }
}
