//! Cities command handler.

use std::path::Path;

use airmin_lib::CityStore;
use anyhow::{Context, Result};

use super::open_store;
use airmin_cli::output::{render_cities, OutputFormat};

/// List stored cities with the identifiers used by `cheapest`.
pub fn handle_cities(database: &Path, format: OutputFormat) -> Result<()> {
    let store = open_store(database)?;
    let cities = store.cities().context("failed to list cities")?;
    print!("{}", render_cities(&cities, format)?);
    Ok(())
}
