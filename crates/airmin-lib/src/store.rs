//! Data-access contracts consumed by the discovery core.
//!
//! The core only ever reads through [`CityStore`] and [`AirportGraphLoader`].
//! Importers additionally write through [`GraphStore`]. [`MemoryStore`] is a
//! thread-safe in-memory implementation of all three; the SQLite backed
//! implementation lives in [`crate::db`].

use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};

use crate::error::Result;
use crate::model::{
    Airport, AirportId, City, CityId, GraphData, NewAirport, NewCity, NewRoute, Route, RouteId,
};

/// Lookup of cities by identifier.
pub trait CityStore: Send + Sync {
    /// Return the city with the given id, or `None` when it does not exist.
    fn find_city(&self, id: CityId) -> Result<Option<City>>;

    /// Return every stored city ordered by id.
    fn cities(&self) -> Result<Vec<City>>;
}

/// Bulk loader for the airport/route graph.
pub trait AirportGraphLoader: Send + Sync {
    /// Load every airport and route.
    fn load_all(&self) -> Result<GraphData>;
}

/// Write side used by bulk imports.
pub trait GraphStore: CityStore + AirportGraphLoader {
    /// Persist cities, returning them with their assigned identifiers.
    fn save_cities(&self, cities: Vec<NewCity>) -> Result<Vec<City>>;

    /// Persist airports, returning the number written.
    fn save_airports(&self, airports: Vec<NewAirport>) -> Result<usize>;

    /// Persist routes, returning the number written.
    fn save_routes(&self, routes: Vec<NewRoute>) -> Result<usize>;
}

#[derive(Debug, Default)]
struct MemoryTables {
    cities: BTreeMap<CityId, City>,
    airports: BTreeMap<AirportId, Airport>,
    routes: BTreeMap<RouteId, Route>,
    next_id: i64,
}

impl MemoryTables {
    fn allocate_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// In-memory store guarded by a read/write lock.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<MemoryTables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a single city, returning its identifier.
    pub fn add_city(&self, name: &str, country: &str) -> CityId {
        let mut tables = self.tables.write().unwrap_or_else(PoisonError::into_inner);
        let id = tables.allocate_id();
        tables.cities.insert(
            id,
            City {
                id,
                name: name.to_string(),
                country: country.to_string(),
                description: String::new(),
            },
        );
        id
    }

    /// Insert a single airport in `city`, returning its identifier.
    ///
    /// The external identifier mirrors the assigned id.
    pub fn add_airport(&self, name: &str, city: CityId) -> AirportId {
        let mut tables = self.tables.write().unwrap_or_else(PoisonError::into_inner);
        let id = tables.allocate_id();
        tables.airports.insert(
            id,
            Airport {
                id,
                external_id: id,
                name: name.to_string(),
                iata_code: None,
                icao_code: None,
                latitude: None,
                longitude: None,
                city_id: city,
            },
        );
        id
    }

    /// Insert a single priced route, returning its identifier.
    pub fn add_route(&self, source: AirportId, destination: AirportId, price: f64) -> RouteId {
        let mut tables = self.tables.write().unwrap_or_else(PoisonError::into_inner);
        let id = tables.allocate_id();
        tables.routes.insert(
            id,
            Route {
                id,
                price,
                source,
                destination,
                airline_code: None,
                stops: None,
            },
        );
        id
    }
}

impl CityStore for MemoryStore {
    fn find_city(&self, id: CityId) -> Result<Option<City>> {
        let tables = self.tables.read().unwrap_or_else(PoisonError::into_inner);
        Ok(tables.cities.get(&id).cloned())
    }

    fn cities(&self) -> Result<Vec<City>> {
        let tables = self.tables.read().unwrap_or_else(PoisonError::into_inner);
        Ok(tables.cities.values().cloned().collect())
    }
}

impl AirportGraphLoader for MemoryStore {
    fn load_all(&self) -> Result<GraphData> {
        let tables = self.tables.read().unwrap_or_else(PoisonError::into_inner);
        Ok(GraphData {
            airports: tables.airports.values().cloned().collect(),
            routes: tables.routes.values().cloned().collect(),
        })
    }
}

impl GraphStore for MemoryStore {
    fn save_cities(&self, cities: Vec<NewCity>) -> Result<Vec<City>> {
        let mut tables = self.tables.write().unwrap_or_else(PoisonError::into_inner);
        let mut saved = Vec::with_capacity(cities.len());
        for city in cities {
            let id = tables.allocate_id();
            let city = City {
                id,
                name: city.name,
                country: city.country,
                description: city.description,
            };
            tables.cities.insert(id, city.clone());
            saved.push(city);
        }
        Ok(saved)
    }

    fn save_airports(&self, airports: Vec<NewAirport>) -> Result<usize> {
        let mut tables = self.tables.write().unwrap_or_else(PoisonError::into_inner);
        let count = airports.len();
        for airport in airports {
            let id = tables.allocate_id();
            tables.airports.insert(
                id,
                Airport {
                    id,
                    external_id: airport.external_id,
                    name: airport.name,
                    iata_code: airport.iata_code,
                    icao_code: airport.icao_code,
                    latitude: airport.latitude,
                    longitude: airport.longitude,
                    city_id: airport.city_id,
                },
            );
        }
        Ok(count)
    }

    fn save_routes(&self, routes: Vec<NewRoute>) -> Result<usize> {
        let mut tables = self.tables.write().unwrap_or_else(PoisonError::into_inner);
        let count = routes.len();
        for route in routes {
            let id = tables.allocate_id();
            tables.routes.insert(
                id,
                Route {
                    id,
                    price: route.price,
                    source: route.source,
                    destination: route.destination,
                    airline_code: route.airline_code,
                    stops: route.stops,
                },
            );
        }
        Ok(count)
    }
}
