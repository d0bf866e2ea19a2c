//! Route discovery: from a pair of cities to an ordered list of priced legs.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use airmin_lib::{MemoryStore, RouteDiscovery, SnapshotCache};
//!
//! let store = Arc::new(MemoryStore::new());
//! let berlin = store.add_city("Berlin", "Germany");
//! let paris = store.add_city("Paris", "France");
//! let tegel = store.add_airport("Tegel", berlin);
//! let orly = store.add_airport("Orly", paris);
//! store.add_route(tegel, orly, 42.0);
//!
//! let cache = Arc::new(SnapshotCache::new(store.clone()));
//! let discovery = RouteDiscovery::new(store, cache);
//! let plan = discovery.cheapest(berlin, paris)?;
//! assert_eq!(plan.total_price(), 42.0);
//! # Ok::<(), airmin_lib::Error>(())
//! ```

use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::cache::SnapshotCache;
use crate::error::{Error, Result};
use crate::graph::AirportGraph;
use crate::model::{City, CityId, RouteLeg};
use crate::path;
use crate::store::CityStore;

/// Discovery query. Both cities are required.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiscoveryRequest {
    pub source: Option<CityId>,
    pub destination: Option<CityId>,
}

impl DiscoveryRequest {
    pub fn new(source: CityId, destination: CityId) -> Self {
        Self {
            source: Some(source),
            destination: Some(destination),
        }
    }
}

/// Result of a discovery query. An empty leg list means no route exists.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoutePlan {
    pub source_city: City,
    pub destination_city: City,
    pub legs: Vec<RouteLeg>,
}

impl RoutePlan {
    /// Sum of leg prices.
    pub fn total_price(&self) -> f64 {
        self.legs.iter().map(|leg| leg.price).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.legs.is_empty()
    }

    /// Number of legs (flights) in the plan.
    pub fn hop_count(&self) -> usize {
        self.legs.len()
    }
}

/// Resolves cities, fetches the cached snapshot and runs the search engine.
///
/// Cheap to share between threads: search state is allocated per call and
/// the snapshot itself is immutable.
#[derive(Clone)]
pub struct RouteDiscovery {
    cities: Arc<dyn CityStore>,
    cache: Arc<SnapshotCache>,
}

impl std::fmt::Debug for RouteDiscovery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteDiscovery")
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

impl RouteDiscovery {
    pub fn new(cities: Arc<dyn CityStore>, cache: Arc<SnapshotCache>) -> Self {
        Self { cities, cache }
    }

    /// Cache backing this service, for importers that need to invalidate it.
    pub fn cache(&self) -> &Arc<SnapshotCache> {
        &self.cache
    }

    /// Cheapest itinerary from any airport of `source` to any airport of `destination`.
    pub fn cheapest(&self, source: CityId, destination: CityId) -> Result<RoutePlan> {
        self.discover(&DiscoveryRequest::new(source, destination))
    }

    /// Run a discovery request.
    ///
    /// Fails with [`Error::InvalidArgument`] when a city id is missing and
    /// with [`Error::RelationNotFound`] when a city does not exist. An
    /// unreachable destination is not an error: the plan has no legs.
    pub fn discover(&self, request: &DiscoveryRequest) -> Result<RoutePlan> {
        let source_id = request.source.ok_or(Error::InvalidArgument {
            name: "source city",
        })?;
        let destination_id = request.destination.ok_or(Error::InvalidArgument {
            name: "destination city",
        })?;

        let source_city = self.resolve_city(source_id)?;
        let destination_city = self.resolve_city(destination_id)?;

        let graph = self.cache.get()?;
        let legs = cheapest_between(&graph, source_city.id, destination_city.id);

        debug!(
            source = source_city.id,
            destination = destination_city.id,
            legs = legs.len(),
            "route discovery finished"
        );

        Ok(RoutePlan {
            source_city,
            destination_city,
            legs,
        })
    }

    fn resolve_city(&self, id: CityId) -> Result<City> {
        self.cities
            .find_city(id)?
            .ok_or_else(|| Error::city_not_found(id))
    }
}

/// Partition the snapshot by city and run the engine.
pub fn cheapest_between(
    graph: &AirportGraph,
    source: CityId,
    destination: CityId,
) -> Vec<RouteLeg> {
    let source_airports = graph.airports_in_city(source);
    let destination_airports = graph.airports_in_city(destination);
    let outcome = path::search(graph, &source_airports, &destination_airports);
    path::shortest_path(graph, &outcome, &destination_airports)
}
