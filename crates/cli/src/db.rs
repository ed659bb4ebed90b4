//! Store selection and database initialization

use anyhow::{Context, Result};
use careswap_business::{seed_demo_data, ServiceContext};
use careswap_persistence::{MemoryStore, SqliteStore};
use std::path::Path;
use std::sync::Arc;

use crate::Cli;

/// The store a command runs against
pub struct Database {
    ctx: ServiceContext,
    sqlite: Option<SqliteStore>,
    location: String,
}

impl Database {
    pub fn context(&self) -> &ServiceContext {
        &self.ctx
    }

    pub fn describe(&self) -> String {
        self.location.clone()
    }

    pub async fn close(&self) {
        if let Some(store) = &self.sqlite {
            store.close().await;
        }
    }
}

/// Open the store selected on the command line.
///
/// The in-memory store is seeded so that every command has data to show.
pub async fn open(cli: &Cli) -> Result<Database> {
    if cli.memory {
        let ctx = ServiceContext::new(Arc::new(MemoryStore::new()));
        seed_demo_data(&ctx)
            .await
            .context("Failed to seed in-memory store")?;
        return Ok(Database {
            ctx,
            sqlite: None,
            location: "in-memory".to_string(),
        });
    }

    if !cli.db.exists() {
        anyhow::bail!(
            "Database not found at {:?}. Run 'careswap init' first.",
            cli.db
        );
    }

    let store = SqliteStore::open(&cli.db)
        .await
        .with_context(|| format!("Failed to open database at {:?}", cli.db))?;

    Ok(Database {
        ctx: ServiceContext::new(Arc::new(store.clone())),
        sqlite: Some(store),
        location: cli.db.display().to_string(),
    })
}

/// Create the database file and schema
pub async fn init_database(db_path: &Path, force: bool) -> Result<()> {
    if force && db_path.exists() {
        std::fs::remove_file(db_path).context("Failed to remove existing database")?;
        println!("🗑️  Removed existing database");
    }

    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).context("Failed to create data directory")?;
        }
    }

    let store = SqliteStore::open(db_path)
        .await
        .with_context(|| format!("Failed to create database at {:?}", db_path))?;
    store.close().await;

    println!("✅ Database initialized at {:?}", db_path);
    Ok(())
}
