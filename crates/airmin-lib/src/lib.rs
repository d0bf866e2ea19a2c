//! Airmin library entry points.
//!
//! This crate loads the airport/route graph from a store, keeps it in a
//! single-slot snapshot cache, and finds the cheapest multi-hop itinerary
//! between two cities. Higher-level consumers (the CLI) should only depend on
//! the functions exported here instead of reimplementing behavior.
//!

#![deny(warnings)]

pub mod cache;
pub mod dataset;
pub mod db;
pub mod discovery;
pub mod error;
pub mod graph;
pub mod import;
pub mod model;
pub mod output;
pub mod path;
pub mod store;

pub use cache::SnapshotCache;
pub use dataset::{default_database_path, ensure_parent_dir, resolve_database_path};
pub use db::SqliteStore;
pub use discovery::{DiscoveryRequest, RouteDiscovery, RoutePlan};
pub use error::{Error, Result};
pub use graph::{AirportGraph, Edge, NodeIndex};
pub use import::{import_airports, import_cities, import_routes, ImportReport};
pub use model::{
    Airport, AirportId, City, CityId, GraphData, NewAirport, NewCity, NewRoute, Route, RouteId,
    RouteLeg,
};
pub use output::{RouteRenderMode, RouteSummary};
pub use path::{find_cheapest_route, search, SearchOutcome, PRICE_TOLERANCE};
pub use store::{AirportGraphLoader, CityStore, GraphStore, MemoryStore};
