//! Cheapest command handler for discovering the cheapest itinerary between two cities.

use std::path::Path;
use std::sync::Arc;

use airmin_lib::{CityId, DiscoveryRequest, RouteDiscovery, SnapshotCache};
use anyhow::{Context, Result};

use super::open_store;
use airmin_cli::output::{render_plan, OutputFormat};

/// Arguments for the cheapest command.
#[derive(Debug, Clone, Copy)]
pub struct CheapestCommandArgs {
    pub from: Option<CityId>,
    pub to: Option<CityId>,
}

/// Print the cheapest itinerary, or a "No route found" notice when none exists.
pub fn handle_cheapest(
    database: &Path,
    args: CheapestCommandArgs,
    format: OutputFormat,
) -> Result<()> {
    let store = Arc::new(open_store(database)?);
    let cache = Arc::new(SnapshotCache::new(store.clone()));
    let discovery = RouteDiscovery::new(store, cache);

    let request = DiscoveryRequest {
        source: args.from,
        destination: args.to,
    };
    let plan = discovery.discover(&request)?;
    let graph = discovery
        .cache()
        .get()
        .context("failed to load the airport graph")?;

    print!("{}", render_plan(&plan, &graph, format)?);
    Ok(())
}
