//! Init command handler for creating the database schema.

use std::path::Path;

use airmin_lib::{ensure_parent_dir, SqliteStore};
use anyhow::{Context, Result};
use tracing::info;

/// Create the database file and its tables. Safe to run on an existing database.
pub fn handle_init(database: &Path) -> Result<()> {
    ensure_parent_dir(database)
        .with_context(|| format!("failed to create directory for {}", database.display()))?;
    SqliteStore::create(database)
        .with_context(|| format!("failed to initialize database at {}", database.display()))?;
    info!(path = %database.display(), "database ready");
    println!("Database ready at {}", database.display());
    Ok(())
}
