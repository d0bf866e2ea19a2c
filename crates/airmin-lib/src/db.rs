use std::collections::HashSet;
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

use rusqlite::{params, Connection, Row};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::model::{
    Airport, AirportId, City, CityId, GraphData, NewAirport, NewCity, NewRoute, Route,
};
use crate::store::{AirportGraphLoader, CityStore, GraphStore};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS city (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    country TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    UNIQUE (name, country)
);
CREATE TABLE IF NOT EXISTS airport (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    external_id INTEGER NOT NULL UNIQUE,
    name TEXT NOT NULL,
    iata_code TEXT,
    icao_code TEXT,
    latitude REAL,
    longitude REAL,
    city_id INTEGER NOT NULL REFERENCES city (id)
);
CREATE TABLE IF NOT EXISTS route (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    price REAL NOT NULL,
    source_id INTEGER NOT NULL REFERENCES airport (id),
    destination_id INTEGER NOT NULL REFERENCES airport (id),
    airline_code TEXT,
    stops INTEGER
);
CREATE INDEX IF NOT EXISTS route_source_idx ON route (source_id);
";

/// Tables and the columns the loader selects from each of them.
const REQUIRED_COLUMNS: &[(&str, &[&str])] = &[
    ("city", &["id", "name", "country", "description"]),
    (
        "airport",
        &[
            "id",
            "external_id",
            "name",
            "iata_code",
            "icao_code",
            "latitude",
            "longitude",
            "city_id",
        ],
    ),
    (
        "route",
        &[
            "id",
            "price",
            "source_id",
            "destination_id",
            "airline_code",
            "stops",
        ],
    ),
];

/// SQLite-backed implementation of the store contracts.
///
/// The connection is guarded by a mutex so one store can be shared between
/// threads; every call holds the lock only for the duration of its statement
/// or transaction.
#[derive(Debug)]
pub struct SqliteStore {
    connection: Mutex<Connection>,
}

impl SqliteStore {
    /// Open an existing database and verify it carries the Airmin schema.
    pub fn open(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::DatabaseNotFound {
                path: path.to_path_buf(),
            });
        }
        let connection = Connection::open(path)?;
        if !schema_present(&connection)? {
            return Err(Error::UnsupportedSchema);
        }
        debug!(path = %path.display(), "opened airmin database");
        Ok(Self::from_connection(connection))
    }

    /// Open (or create) a database file and make sure the schema exists.
    pub fn create(path: &Path) -> Result<Self> {
        let connection = Connection::open(path)?;
        connection.execute_batch(SCHEMA)?;
        debug!(path = %path.display(), "initialized airmin database");
        Ok(Self::from_connection(connection))
    }

    /// Private in-memory database with the schema applied.
    pub fn open_in_memory() -> Result<Self> {
        let connection = Connection::open_in_memory()?;
        connection.execute_batch(SCHEMA)?;
        Ok(Self::from_connection(connection))
    }

    fn from_connection(connection: Connection) -> Self {
        Self {
            connection: Mutex::new(connection),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Connection> {
        self.connection
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl CityStore for SqliteStore {
    fn find_city(&self, id: CityId) -> Result<Option<City>> {
        let connection = self.lock();
        let mut stmt =
            connection.prepare("SELECT id, name, country, description FROM city WHERE id = ?1")?;
        let mut rows = stmt.query_map([id], row_to_city)?;
        match rows.next() {
            Some(city) => Ok(Some(city?)),
            None => Ok(None),
        }
    }

    fn cities(&self) -> Result<Vec<City>> {
        let connection = self.lock();
        let mut stmt =
            connection.prepare("SELECT id, name, country, description FROM city ORDER BY id")?;
        let rows = stmt.query_map([], row_to_city)?;

        let mut cities = Vec::new();
        for entry in rows {
            cities.push(entry?);
        }
        Ok(cities)
    }
}

impl AirportGraphLoader for SqliteStore {
    /// Load every airport and route.
    ///
    /// Routes whose endpoints do not reference a stored airport are dropped
    /// here so corrupt rows never reach the in-memory graph.
    fn load_all(&self) -> Result<GraphData> {
        let connection = self.lock();

        let mut stmt = connection.prepare(
            "SELECT id, external_id, name, iata_code, icao_code, latitude, longitude, city_id \
             FROM airport ORDER BY id",
        )?;
        let rows = stmt.query_map([], row_to_airport)?;
        let mut airports = Vec::new();
        for entry in rows {
            airports.push(entry?);
        }

        let known: HashSet<AirportId> = airports.iter().map(|airport| airport.id).collect();

        let mut stmt = connection.prepare(
            "SELECT id, price, source_id, destination_id, airline_code, stops \
             FROM route ORDER BY id",
        )?;
        let rows = stmt.query_map([], row_to_route)?;
        let mut routes = Vec::new();
        let mut skipped_routes = 0usize;
        for entry in rows {
            let route = entry?;
            if !known.contains(&route.source) || !known.contains(&route.destination) {
                skipped_routes += 1;
                continue;
            }
            routes.push(route);
        }

        if skipped_routes > 0 {
            warn!(skipped_routes, "ignored routes referencing unknown airports");
        }
        debug!(
            airports = airports.len(),
            routes = routes.len(),
            "loaded airport graph from sqlite"
        );

        Ok(GraphData { airports, routes })
    }
}

impl GraphStore for SqliteStore {
    fn save_cities(&self, cities: Vec<NewCity>) -> Result<Vec<City>> {
        let mut connection = self.lock();
        let tx = connection.transaction()?;
        let mut saved = Vec::with_capacity(cities.len());
        {
            let mut stmt =
                tx.prepare("INSERT INTO city (name, country, description) VALUES (?1, ?2, ?3)")?;
            for city in cities {
                stmt.execute(params![city.name, city.country, city.description])?;
                saved.push(City {
                    id: tx.last_insert_rowid(),
                    name: city.name,
                    country: city.country,
                    description: city.description,
                });
            }
        }
        tx.commit()?;
        Ok(saved)
    }

    fn save_airports(&self, airports: Vec<NewAirport>) -> Result<usize> {
        let mut connection = self.lock();
        let tx = connection.transaction()?;
        let count = airports.len();
        {
            let mut stmt = tx.prepare(
                "INSERT INTO airport \
                 (external_id, name, iata_code, icao_code, latitude, longitude, city_id) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            )?;
            for airport in airports {
                stmt.execute(params![
                    airport.external_id,
                    airport.name,
                    airport.iata_code,
                    airport.icao_code,
                    airport.latitude,
                    airport.longitude,
                    airport.city_id,
                ])?;
            }
        }
        tx.commit()?;
        Ok(count)
    }

    fn save_routes(&self, routes: Vec<NewRoute>) -> Result<usize> {
        let mut connection = self.lock();
        let tx = connection.transaction()?;
        let count = routes.len();
        {
            let mut stmt = tx.prepare(
                "INSERT INTO route (price, source_id, destination_id, airline_code, stops) \
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            for route in routes {
                stmt.execute(params![
                    route.price,
                    route.source,
                    route.destination,
                    route.airline_code,
                    route.stops,
                ])?;
            }
        }
        tx.commit()?;
        Ok(count)
    }
}

fn row_to_city(row: &Row<'_>) -> rusqlite::Result<City> {
    Ok(City {
        id: row.get(0)?,
        name: row.get(1)?,
        country: row.get(2)?,
        description: row.get(3)?,
    })
}

fn row_to_airport(row: &Row<'_>) -> rusqlite::Result<Airport> {
    Ok(Airport {
        id: row.get(0)?,
        external_id: row.get(1)?,
        name: row.get(2)?,
        iata_code: row.get(3)?,
        icao_code: row.get(4)?,
        latitude: row.get(5)?,
        longitude: row.get(6)?,
        city_id: row.get(7)?,
    })
}

fn row_to_route(row: &Row<'_>) -> rusqlite::Result<Route> {
    Ok(Route {
        id: row.get(0)?,
        price: row.get(1)?,
        source: row.get(2)?,
        destination: row.get(3)?,
        airline_code: row.get(4)?,
        stops: row.get(5)?,
    })
}

fn schema_present(connection: &Connection) -> Result<bool> {
    for (table, columns) in REQUIRED_COLUMNS {
        if !table_exists(connection, table)? || !table_has_columns(connection, table, columns)? {
            return Ok(false);
        }
    }
    Ok(true)
}

fn table_exists(connection: &Connection, table: &str) -> Result<bool> {
    let mut stmt = connection
        .prepare("SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1 LIMIT 1")?;
    let mut rows = stmt.query([table])?;
    Ok(rows.next()?.is_some())
}

fn table_has_columns(connection: &Connection, table: &str, required: &[&str]) -> Result<bool> {
    let pragma = format!("PRAGMA table_info('{table}')");
    let mut stmt = connection.prepare(&pragma)?;
    let mut rows = stmt.query([])?;

    let mut columns = Vec::new();
    while let Some(row) = rows.next()? {
        let name: String = row.get(1)?;
        columns.push(name);
    }

    Ok(required.iter().all(|required| {
        columns
            .iter()
            .any(|column| column.eq_ignore_ascii_case(required))
    }))
}
