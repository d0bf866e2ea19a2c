// Handlers for the CLI subcommands. main.rs parses arguments, resolves the
// database path and dispatches here.

pub mod cheapest;
pub mod cities;
pub mod import;
pub mod init;

use std::path::Path;

use airmin_lib::SqliteStore;
use anyhow::{Context, Result};

/// Open an initialized database, pointing at `airmin init` when it is missing.
pub fn open_store(database: &Path) -> Result<SqliteStore> {
    SqliteStore::open(database).with_context(|| {
        format!(
            "failed to open database at {}; run `airmin init` first",
            database.display()
        )
    })
}
