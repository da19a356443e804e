//! Reviews command - read and write product reviews

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;

use ecobazaar_core::domain::Review;
use ecobazaar_core::ResourceId;

use super::App;
use crate::output;

#[derive(Subcommand)]
pub enum ReviewCommands {
    /// Reviews of one product
    List {
        /// Product ID
        product_id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Reviews you wrote
    Mine {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Review a product
    Add {
        /// Product ID
        product_id: String,
        /// Stars, 1 to 5
        #[arg(long, short)]
        rating: u8,
        /// Review text
        #[arg(long, short)]
        comment: Option<String>,
    },
    /// Delete one of your reviews
    Delete {
        /// Review ID
        id: String,
    },
}

pub async fn run(command: ReviewCommands) -> Result<()> {
    let app = App::open("/reviews").await?;

    match command {
        ReviewCommands::List { product_id, json } => {
            let reviews = app.ctx.reviews.for_product(&ResourceId::from(product_id)).await?;
            print_reviews(&reviews, json)?;
        }
        ReviewCommands::Mine { json } => {
            app.require_user()?;
            let reviews = app.ctx.reviews.mine().await?;
            print_reviews(&reviews, json)?;
        }
        ReviewCommands::Add {
            product_id,
            rating,
            comment,
        } => {
            app.require_user()?;
            let review = app
                .ctx
                .reviews
                .add(product_id.as_str(), rating, comment)
                .await?;
            output::success(&format!("Review {} posted", review.id));
        }
        ReviewCommands::Delete { id } => {
            app.require_user()?;
            app.ctx.reviews.delete(&ResourceId::from(id)).await?;
            output::success("Review deleted");
        }
    }

    app.report_redirects();
    Ok(())
}

fn print_reviews(reviews: &[Review], json: bool) -> Result<()> {
    if json {
        return output::json(&reviews);
    }
    if reviews.is_empty() {
        println!("{}", "No reviews yet".dimmed());
        return Ok(());
    }
    let mut table = output::create_table();
    table.set_header(vec!["Review", "Product", "By", "Rating", "Comment"]);
    for review in reviews {
        table.add_row(vec![
            review.id.to_string(),
            review
                .product_id
                .as_ref()
                .map(ResourceId::to_string)
                .unwrap_or_default(),
            review.author().unwrap_or("-").to_string(),
            review
                .rating
                .map(|r| "★".repeat(r as usize))
                .unwrap_or_default(),
            review.comment.clone().unwrap_or_default(),
        ]);
    }
    println!("{}", table);
    Ok(())
}
