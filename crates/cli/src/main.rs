//! Bazaar console.
//!
//! # Usage
//!
//! ```bash
//! # Sign in as an admin (password from BAZAAR_PASSWORD or stdin)
//! bazaar --role admin login -e admin@example.com
//!
//! # Second page of active brands, 20 per page
//! bazaar list brands --page 2 --limit 20 --filter status=active
//!
//! # Every pending vendor, loading page after page
//! bazaar list vendors --filter status=pending --all
//!
//! # Approve a vendor
//! bazaar status vendors 65f1c0ffee approved
//!
//! # Upload a banner image
//! bazaar upload ./summer-sale.png
//! ```
//!
//! # Commands
//!
//! - `login` / `logout` / `whoami` - Session of the selected role
//! - `list` - Fetch a resource list with pagination, search and filters
//! - `delete` - Delete one entity
//! - `status` - Change an entity's status (approve, block, activate, ...)
//! - `upload` - Upload a file and print its hosted URL
//! - `notifications` - Mark notifications read, count unread ones
//!
//! # Environment Variables
//!
//! - `BAZAAR_API_URL` (required), `BAZAAR_TIMEOUT_SECS`, `BAZAAR_STORAGE_PATH`,
//!   `BAZAAR_USER_AGENT` - See `bazaar_client::config`
//! - `BAZAAR_ROLE` - Default for `--role`
//! - `BAZAAR_LOG_JSON` - Emit JSON logs when set
//! - `SENTRY_DSN` - Report warnings and errors to Sentry when set

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use bazaar_core::Role;
use clap::{Parser, Subcommand};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::{CliError, ResourceKind};

#[derive(Parser)]
#[command(name = "bazaar")]
#[command(author, version, about = "Bazaar multi-role console")]
struct Cli {
    /// Role to act as (`customer`, `admin`, `vendor`, `delivery`)
    #[arg(short, long, global = true, env = "BAZAAR_ROLE", default_value = "admin")]
    role: Role,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in and keep the token for the selected role
    Login {
        /// Account email
        #[arg(short, long)]
        email: String,

        /// Password (read from stdin when omitted)
        #[arg(long, env = "BAZAAR_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Sign out and forget the role's token
    Logout,
    /// Show the signed-in account
    Whoami,
    /// List a resource
    List {
        resource: ResourceKind,

        /// Page to fetch, starting at 1
        #[arg(short, long, default_value_t = 1)]
        page: u32,

        /// Page size
        #[arg(short, long, default_value_t = bazaar_core::DEFAULT_LIMIT)]
        limit: u32,

        /// Free-text search
        #[arg(short, long)]
        search: Option<String>,

        /// Exact-match filter as `key=value`, repeatable
        #[arg(short, long = "filter", value_name = "KEY=VALUE")]
        filters: Vec<String>,

        /// Keep loading pages until the last one
        #[arg(long)]
        all: bool,
    },
    /// Delete one entity
    Delete { resource: ResourceKind, id: String },
    /// Change the status of one entity
    Status {
        resource: ResourceKind,
        id: String,

        /// New status, e.g. `approved`, `blocked`, `inactive`, `delivered`
        status: String,

        /// Note stored with a return request decision
        #[arg(short, long)]
        note: Option<String>,
    },
    /// Upload a file and print its hosted URL
    Upload { path: PathBuf },
    /// Manage notifications
    Notifications {
        #[command(subcommand)]
        action: NotificationAction,
    },
}

#[derive(Subcommand)]
enum NotificationAction {
    /// Mark one notification read
    Read { id: String },
    /// Mark every notification read
    ReadAll,
    /// Count unread notifications
    Count,
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry() -> Option<sentry::ClientInitGuard> {
    let dsn = std::env::var("SENTRY_DSN").ok().filter(|d| !d.is_empty())?;

    let guard = sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: std::env::var("SENTRY_ENVIRONMENT")
                .ok()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            send_default_pii: false,
            ..Default::default()
        },
    ));

    Some(guard)
}

/// Warnings and errors become Sentry events, info and debug breadcrumbs.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "bazaar_client=info,bazaar_cli=info".into());

    let json = std::env::var_os("BAZAAR_LOG_JSON").is_some();
    let json_layer = json.then(|| tracing_subscriber::fmt::layer().json().flatten_event(true));
    let text_layer = (!json).then(|| {
        tracing_subscriber::fmt::layer()
            .without_time()
            .with_target(false)
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // Sentry must be initialized before the tracing subscriber
    let _sentry_guard = init_sentry();
    init_tracing();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let console = commands::open_console(cli.role)?;
    match console.hydrate().await {
        Ok(restored) => tracing::debug!(restored, "Cached lists restored"),
        Err(e) => tracing::warn!(error = %e, "Failed to restore cached lists"),
    }

    match cli.command {
        Commands::Login { email, password } => {
            commands::session::login(&console, &email, password).await?;
        }
        Commands::Logout => commands::session::logout(&console).await?,
        Commands::Whoami => commands::session::whoami(&console).await?,
        Commands::List {
            resource,
            page,
            limit,
            search,
            filters,
            all,
        } => {
            let query = commands::resources::build_query(page, limit, search, &filters)?;
            commands::resources::list(&console, resource, query, all).await?;
        }
        Commands::Delete { resource, id } => {
            commands::resources::delete(&console, resource, &id).await?;
        }
        Commands::Status {
            resource,
            id,
            status,
            note,
        } => {
            commands::resources::set_status(&console, resource, &id, &status, note.as_deref())
                .await?;
        }
        Commands::Upload { path } => commands::files::upload(&console, &path).await?,
        Commands::Notifications { action } => match action {
            NotificationAction::Read { id } => {
                commands::notifications::mark_read(&console, &id).await?;
            }
            NotificationAction::ReadAll => commands::notifications::mark_all_read(&console).await?,
            NotificationAction::Count => commands::notifications::unread_count(&console).await?,
        },
    }
    Ok(())
}
