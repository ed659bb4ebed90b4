//! CareSwap CLI - operator and moderation commands
//!
//! Usage:
//! ```bash
//! careswap init
//! careswap seed
//! careswap status
//! careswap users
//! careswap requests --status open
//! careswap ban 2 --reason spam --admin admin@careswap.sg --password admin123
//! careswap timeout 2 --hours 6 --admin admin@careswap.sg --password admin123
//! careswap logs --limit 20 --admin admin@careswap.sg --password admin123
//! ```

use anyhow::Result;
use careswap_core::RequestStatus;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod db;

use commands::{admin, report};

/// CareSwap - community help exchange
#[derive(Parser)]
#[command(name = "careswap")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Database file path
    #[arg(long, default_value = "data/careswap.db", global = true)]
    pub db: PathBuf,

    /// Use a throwaway in-memory store preloaded with demo data
    #[arg(long, global = true)]
    pub memory: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the database schema
    Init {
        /// Delete an existing database first
        #[arg(long)]
        force: bool,
    },

    /// Load the demo accounts and requests
    Seed,

    /// Show record counts
    Status,

    /// List members
    Users,

    /// List help requests
    Requests {
        /// Only requests in this status
        #[arg(long)]
        status: Option<StatusArg>,
    },

    /// Show the moderation log
    Logs {
        /// Number of most recent entries; all when omitted
        #[arg(long, short)]
        limit: Option<usize>,
        #[command(flatten)]
        auth: AdminAuth,
    },

    /// Ban a member
    Ban {
        user_id: u64,
        #[arg(long, short)]
        reason: Option<String>,
        #[command(flatten)]
        auth: AdminAuth,
    },

    /// Lift a ban or timeout
    Unban {
        user_id: u64,
        #[command(flatten)]
        auth: AdminAuth,
    },

    /// Suspend a member for a number of hours
    Timeout {
        user_id: u64,
        #[arg(long)]
        hours: Option<u32>,
        #[arg(long, short)]
        reason: Option<String>,
        #[command(flatten)]
        auth: AdminAuth,
    },

    /// Record a forced logout
    Kick {
        user_id: u64,
        #[command(flatten)]
        auth: AdminAuth,
    },

    /// Send a member a warning
    Warn {
        user_id: u64,
        #[arg(long, short)]
        message: Option<String>,
        #[command(flatten)]
        auth: AdminAuth,
    },
}

/// Credentials of the acting admin
#[derive(Args, Clone)]
pub struct AdminAuth {
    /// Admin email
    #[arg(long, default_value = "admin@careswap.sg")]
    pub admin: String,
    /// Admin password
    #[arg(long)]
    pub password: String,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum StatusArg {
    Open,
    InProgress,
    Completed,
}

impl StatusArg {
    pub fn to_core_status(&self) -> RequestStatus {
        match self {
            StatusArg::Open => RequestStatus::Open,
            StatusArg::InProgress => RequestStatus::InProgress,
            StatusArg::Completed => RequestStatus::Completed,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    if let Commands::Init { force } = cli.command {
        return db::init_database(&cli.db, force).await;
    }

    let database = db::open(&cli).await?;
    let ctx = database.context();

    match cli.command {
        Commands::Init { .. } => {}
        Commands::Seed => report::seed(ctx).await?,
        Commands::Status => report::status(ctx, &database.describe()).await?,
        Commands::Users => report::users(ctx).await?,
        Commands::Requests { status } => {
            report::requests(ctx, status.map(|s| s.to_core_status())).await?
        }
        Commands::Logs { limit, auth } => admin::logs(ctx, &auth, limit).await?,
        Commands::Ban {
            user_id,
            reason,
            auth,
        } => admin::ban(ctx, &auth, user_id, reason.as_deref()).await?,
        Commands::Unban { user_id, auth } => admin::unban(ctx, &auth, user_id).await?,
        Commands::Timeout {
            user_id,
            hours,
            reason,
            auth,
        } => admin::timeout(ctx, &auth, user_id, hours, reason.as_deref()).await?,
        Commands::Kick { user_id, auth } => admin::kick(ctx, &auth, user_id).await?,
        Commands::Warn {
            user_id,
            message,
            auth,
        } => admin::warn(ctx, &auth, user_id, message.as_deref()).await?,
    }

    database.close().await;
    Ok(())
}
