//! FutureLabs CLI - browse tests, manage the cart and log in from a terminal.
//!
//! # Usage
//!
//! ```bash
//! # Print the landing page (fixtures unless FUTURELABS_USE_MOCK_DATA=false)
//! fl-cli home
//!
//! # Print a product page against a live API
//! fl-cli --base-url https://api.futurelabs.in product --id 64f1c0
//!
//! # Log in with phone + OTP
//! fl-cli login --phone 9876543210
//!
//! # Cart
//! fl-cli cart add 64f1c0
//! fl-cli cart list --remote
//! ```
//!
//! # Commands
//!
//! - `home`, `package`, `product` - Load a page and print it as JSON
//! - `login`, `logout` - Manage the session
//! - `cart add|remove|list` - Manage the cart
//! - `pincode` - Check home sample collection coverage

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use futurelabs_storefront::{AppState, StorefrontConfig};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "fl-cli")]
#[command(author, version, about = "FutureLabs storefront CLI")]
struct Cli {
    /// Talk to the API at this address instead of using fixtures
    #[arg(long, global = true)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the landing page
    Home,
    /// Print the exclusive package listing
    Package,
    /// Print a product page
    Product {
        /// Test id
        #[arg(short, long)]
        id: Option<String>,
    },
    /// Log in with phone number and OTP
    Login {
        /// 10-digit phone number; prompted for when omitted
        #[arg(short, long)]
        phone: Option<String>,
    },
    /// Forget the stored session
    Logout,
    /// Manage the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Check service availability for a pin code
    Pincode {
        /// 6-digit pin code
        pin: String,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Add a test to the cart
    Add {
        /// Test id
        id: String,
    },
    /// Remove a test from the cart
    Remove {
        /// Test id
        id: String,
    },
    /// Show the cart
    List {
        /// Also fetch the server-side cart
        #[arg(long)]
        remote: bool,
    },
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &StorefrontConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    // Load configuration from environment (needed for Sentry init)
    let config = StorefrontConfig::from_env();

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = config.as_ref().ok().and_then(init_sentry);

    // Logs go to stderr so stdout stays clean for JSON output
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "futurelabs_storefront=info,futurelabs_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    let result: Result<(), Box<dyn std::error::Error>> = match config {
        Ok(config) => run(cli, config).await,
        Err(e) => Err(e.into()),
    };

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli, mut config: StorefrontConfig) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(base_url) = cli.base_url {
        let live = StorefrontConfig::live(&base_url)?;
        config.base_url = live.base_url;
        config.use_mock_data = false;
    }

    let state = AppState::open(config)?;

    match cli.command {
        Commands::Home => commands::catalog::home(&state).await?,
        Commands::Package => commands::catalog::package(&state).await?,
        Commands::Product { id } => commands::catalog::product(&state, id).await?,
        Commands::Login { phone } => commands::auth::login(&state, phone).await?,
        Commands::Logout => commands::auth::logout(&state)?,
        Commands::Cart { action } => match action {
            CartAction::Add { id } => commands::cart::add(&state, id).await?,
            CartAction::Remove { id } => commands::cart::remove(&state, id).await?,
            CartAction::List { remote } => commands::cart::list(&state, remote).await?,
        },
        Commands::Pincode { pin } => commands::pincode::check(&pin).await?,
    }
    Ok(())
}
