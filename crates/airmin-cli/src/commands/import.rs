//! Import command handlers for OpenFlights-style CSV files.

use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use airmin_lib::{import_airports, import_cities, import_routes, SnapshotCache};
use anyhow::{Context, Result};

use super::open_store;
use airmin_cli::output::{render_imports, OutputFormat};

/// Import the cities named in an airports file, then the airports themselves.
pub fn handle_import_airports(database: &Path, file: &Path, format: OutputFormat) -> Result<()> {
    let store = Arc::new(open_store(database)?);
    let cache = SnapshotCache::new(store.clone());

    let cities = import_cities(store.as_ref(), open_csv(file)?)
        .with_context(|| format!("failed to import cities from {}", file.display()))?;
    let airports = import_airports(store.as_ref(), &cache, open_csv(file)?)
        .with_context(|| format!("failed to import airports from {}", file.display()))?;

    print!(
        "{}",
        render_imports(&[("cities", cities), ("airports", airports)], format)?
    );
    Ok(())
}

/// Import priced routes between airports that are already stored.
pub fn handle_import_routes(database: &Path, file: &Path, format: OutputFormat) -> Result<()> {
    let store = Arc::new(open_store(database)?);
    let cache = SnapshotCache::new(store.clone());

    let routes = import_routes(store.as_ref(), &cache, open_csv(file)?)
        .with_context(|| format!("failed to import routes from {}", file.display()))?;

    print!("{}", render_imports(&[("routes", routes)], format)?);
    Ok(())
}

fn open_csv(path: &Path) -> Result<File> {
    File::open(path).with_context(|| format!("failed to open {}", path.display()))
}
