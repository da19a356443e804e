//! EcoBazaar CLI - the storefront in your terminal

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod output;

use commands::{auth, carbon, cart, dashboard, orders, products, reviews, wishlist};

/// EcoBazaar - sustainable shopping in your terminal
#[derive(Parser)]
#[command(name = "eb", version, about, long_about = None)]
struct Cli {
    /// Log requests and session transitions to stderr
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in and store the session
    Login {
        /// Account email
        email: String,
        /// Password (prompted when omitted)
        #[arg(short, long, env = "ECOBAZAAR_PASSWORD", hide_env_values = true)]
        password: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Create a new account
    Register {
        /// Account email
        email: String,
        /// Display name
        #[arg(long)]
        name: Option<String>,
        /// Role to request, checked against the roles the server allows
        #[arg(long, default_value = "USER")]
        role: String,
        /// Password (prompted when omitted)
        #[arg(short, long, env = "ECOBAZAAR_PASSWORD", hide_env_values = true)]
        password: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Sign out and forget the stored session
    Logout,

    /// Show the signed-in user
    Whoami {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Password recovery
    Password {
        #[command(subcommand)]
        command: auth::PasswordCommands,
    },

    /// Browse the catalog
    Products {
        #[command(subcommand)]
        command: products::ProductCommands,
    },

    /// Manage the shopping cart
    Cart {
        #[command(subcommand)]
        command: cart::CartCommands,
    },

    /// Manage the wishlist
    Wishlist {
        #[command(subcommand)]
        command: wishlist::WishlistCommands,
    },

    /// Place and review orders
    Orders {
        #[command(subcommand)]
        command: orders::OrderCommands,
    },

    /// Show your carbon impact report
    Carbon {
        #[command(subcommand)]
        command: Option<carbon::CarbonCommands>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Read and write product reviews
    Reviews {
        #[command(subcommand)]
        command: reviews::ReviewCommands,
    },

    /// Show a dashboard overview or one of its panels
    Dashboard {
        /// Panel name (see --list)
        panel: Option<String>,
        /// Dashboard to read; defaults to your role's
        #[arg(long = "as", value_enum)]
        audience: Option<dashboard::AudienceArg>,
        /// List the panels instead
        #[arg(long)]
        list: bool,
    },
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env("ECOBAZAAR_LOG").unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Login { email, password, json } => auth::login(&email, password, json).await,
        Commands::Register { email, name, role, password, json } => {
            auth::register(&email, name, &role, password, json).await
        }
        Commands::Logout => auth::logout().await,
        Commands::Whoami { json } => auth::whoami(json).await,
        Commands::Password { command } => auth::password(command).await,
        Commands::Products { command } => products::run(command).await,
        Commands::Cart { command } => cart::run(command).await,
        Commands::Wishlist { command } => wishlist::run(command).await,
        Commands::Orders { command } => orders::run(command).await,
        Commands::Carbon { command, json } => carbon::run(command, json).await,
        Commands::Reviews { command } => reviews::run(command).await,
        Commands::Dashboard { panel, audience, list } => {
            dashboard::run(panel, audience, list).await
        }
    }
}
