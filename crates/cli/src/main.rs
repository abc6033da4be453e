//! Refund Desk CLI - Operator panel for customer refunds.
//!
//! # Usage
//!
//! ```bash
//! # Log in and store the session token
//! refund-desk login -u operator -p secret
//!
//! # List customers, optionally filtered by status
//! refund-desk list --status pending
//!
//! # Show the messages a customer would receive
//! refund-desk preview 42
//!
//! # Message the customer and mark the purchase refunded
//! refund-desk send 42
//!
//! # Print (or open) the pre-filled web messaging link instead
//! refund-desk link 42 --open
//! ```
//!
//! Configuration comes from `REFUND_DESK_*` environment variables or a `.env`
//! file. See `refund_desk::config`.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use refund_desk::{DeskConfig, DeskError};
use refund_desk_core::StatusFilter;
use secrecy::SecretString;
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod table;

#[derive(Parser)]
#[command(name = "refund-desk")]
#[command(author, version, about = "Refund Desk operator panel")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and store the session token
    Login {
        /// Operator username
        #[arg(short, long)]
        username: String,

        /// Operator password
        #[arg(short, long, env = "REFUND_DESK_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Forget the stored session token
    Logout,
    /// Show whether a session token is stored
    Status,
    /// List customers ordered by name
    List {
        /// Status filter (`all`, `pending`, `paid`, `cancelled`, `refunded`)
        #[arg(short, long, default_value = "all")]
        status: StatusFilter,
    },
    /// Show the messages a customer would receive
    Preview {
        /// Customer id or code
        customer: String,
    },
    /// Message a customer and mark the purchase refunded
    Send {
        /// Customer id or code
        customer: String,
    },
    /// Print the pre-filled web messaging link for a customer
    Link {
        /// Customer id or code
        customer: String,

        /// Open the link with the system URL handler
        #[arg(long)]
        open: bool,
    },
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &DeskConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            sample_rate: config.sentry_sample_rate,
            attach_stacktrace: true,
            // Customer names and phone numbers stay out of error reports
            send_default_pii: false,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR => sentry_tracing::EventFilter::Event,
        tracing::Level::WARN | tracing::Level::INFO => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

fn init_tracing(json: bool) {
    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "refund_desk=info,refund_desk_cli=info".into());

    let json_layer = json.then(|| tracing_subscriber::fmt::layer().json().flatten_event(true));
    let text_layer = (!json).then(|| tracing_subscriber::fmt::layer().with_target(false));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match DeskConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            init_tracing(false);
            tracing::error!("Failed to load configuration: {e}");
            std::process::exit(2);
        }
    };

    // Sentry before tracing so the tracing layer finds the client
    let sentry_guard = init_sentry(&config);
    init_tracing(config.log_json);

    let result = run(cli, &config).await;

    if let Err(e) = result {
        if e.is_fault() {
            sentry::capture_error(&e);
        }
        tracing::error!("Command failed: {e}");
        // exit() skips destructors; flush pending events first
        drop(sentry_guard);
        std::process::exit(1);
    }
}

async fn run(cli: Cli, config: &DeskConfig) -> Result<(), DeskError> {
    match cli.command {
        Commands::Login { username, password } => {
            commands::session::login(config, &username, SecretString::from(password)).await
        }
        Commands::Logout => commands::session::logout(config),
        Commands::Status => {
            commands::session::status(config);
            Ok(())
        }
        Commands::List { status } => commands::customers::list(config, status).await,
        Commands::Preview { customer } => commands::customers::preview(config, &customer).await,
        Commands::Send { customer } => commands::customers::send(config, &customer).await,
        Commands::Link { customer, open } => {
            commands::customers::link(config, &customer, open).await
        }
    }
}
