//! Bulk import of OpenFlights-style CSV data.
//!
//! Files are headerless and use `\N` for missing values. Rows that cannot be
//! mapped onto the stored data (unknown city, unknown airport, missing price,
//! duplicate external id) are skipped and counted rather than failing the
//! whole import. Airport and route imports invalidate the snapshot cache
//! before writing so the next discovery query reloads the graph.

use std::collections::{HashMap, HashSet};
use std::io::Read;
use std::str::FromStr;

use csv::{ReaderBuilder, StringRecord, Trim};
use serde::Serialize;
use tracing::{debug, info};

use crate::cache::SnapshotCache;
use crate::error::{Error, Result};
use crate::model::{AirportId, CityId, NewAirport, NewCity, NewRoute};
use crate::store::GraphStore;

const NULL_MARKER: &str = "\\N";

/// Column positions in an airports file.
mod airport_columns {
    pub const ID: usize = 0;
    pub const NAME: usize = 1;
    pub const CITY: usize = 2;
    pub const COUNTRY: usize = 3;
    pub const IATA_CODE: usize = 4;
    pub const ICAO_CODE: usize = 5;
    pub const LATITUDE: usize = 6;
    pub const LONGITUDE: usize = 7;
    /// Rows shorter than this cannot describe an airport.
    pub const REQUIRED: usize = COUNTRY + 1;
}

/// Column positions in a routes file.
mod route_columns {
    pub const AIRLINE_CODE: usize = 0;
    pub const SOURCE_AIRPORT_ID: usize = 3;
    pub const DESTINATION_AIRPORT_ID: usize = 5;
    pub const STOPS: usize = 7;
    pub const PRICE: usize = 9;
    pub const REQUIRED: usize = PRICE + 1;
}

/// Outcome of a single import call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub imported: usize,
    pub skipped: usize,
}

/// Create the distinct (city, country) pairs named in an airports file.
///
/// Pairs already stored (compared case-insensitively) are skipped.
pub fn import_cities<S, R>(store: &S, reader: R) -> Result<ImportReport>
where
    S: GraphStore + ?Sized,
    R: Read,
{
    let mut known: HashSet<(String, String)> = store
        .cities()?
        .into_iter()
        .map(|city| city_key(&city.name, &city.country))
        .collect();

    let mut report = ImportReport::default();
    let mut pending = Vec::new();
    for record in read_records(reader, airport_columns::REQUIRED, "airports")? {
        let (Some(name), Some(country)) = (
            field(&record, airport_columns::CITY),
            field(&record, airport_columns::COUNTRY),
        ) else {
            report.skipped += 1;
            continue;
        };
        if !known.insert(city_key(name, country)) {
            report.skipped += 1;
            continue;
        }
        pending.push(NewCity {
            name: name.to_string(),
            country: country.to_string(),
            description: String::new(),
        });
    }

    report.imported = store.save_cities(pending)?.len();
    info!(
        imported = report.imported,
        skipped = report.skipped,
        "imported cities"
    );
    Ok(report)
}

/// Import airports whose city exists and whose external id is new.
pub fn import_airports<S, R>(store: &S, cache: &SnapshotCache, reader: R) -> Result<ImportReport>
where
    S: GraphStore + ?Sized,
    R: Read,
{
    let cities: HashMap<(String, String), CityId> = store
        .cities()?
        .into_iter()
        .map(|city| (city_key(&city.name, &city.country), city.id))
        .collect();
    let mut seen: HashSet<i64> = store
        .load_all()?
        .airports
        .into_iter()
        .map(|airport| airport.external_id)
        .collect();

    let mut report = ImportReport::default();
    let mut pending = Vec::new();
    for record in read_records(reader, airport_columns::REQUIRED, "airports")? {
        let Some(external_id) = parsed::<i64>(&record, airport_columns::ID) else {
            report.skipped += 1;
            continue;
        };
        let city_id = match (
            field(&record, airport_columns::CITY),
            field(&record, airport_columns::COUNTRY),
        ) {
            (Some(name), Some(country)) => cities.get(&city_key(name, country)).copied(),
            _ => None,
        };
        let Some(city_id) = city_id else {
            debug!(external_id, "skipping airport without a known city");
            report.skipped += 1;
            continue;
        };
        if !seen.insert(external_id) {
            report.skipped += 1;
            continue;
        }

        pending.push(NewAirport {
            external_id,
            name: field(&record, airport_columns::NAME)
                .unwrap_or_default()
                .to_string(),
            iata_code: field(&record, airport_columns::IATA_CODE).map(str::to_string),
            icao_code: field(&record, airport_columns::ICAO_CODE).map(str::to_string),
            latitude: parsed(&record, airport_columns::LATITUDE),
            longitude: parsed(&record, airport_columns::LONGITUDE),
            city_id,
        });
    }

    let writes = !pending.is_empty();
    if writes {
        cache.invalidate();
    }
    report.imported = store.save_airports(pending)?;
    // A snapshot loaded between the first invalidation and the write holds pre-import data.
    if writes {
        cache.invalidate();
    }
    info!(
        imported = report.imported,
        skipped = report.skipped,
        "imported airports"
    );
    Ok(report)
}

/// Import priced routes between already imported airports.
///
/// Endpoints are resolved by the airports' external ids. Rows without a
/// finite, non-negative price and self loops are skipped.
pub fn import_routes<S, R>(store: &S, cache: &SnapshotCache, reader: R) -> Result<ImportReport>
where
    S: GraphStore + ?Sized,
    R: Read,
{
    let airports: HashMap<i64, AirportId> = store
        .load_all()?
        .airports
        .into_iter()
        .map(|airport| (airport.external_id, airport.id))
        .collect();

    let mut report = ImportReport::default();
    let mut pending = Vec::new();
    for record in read_records(reader, route_columns::REQUIRED, "routes")? {
        let source = parsed::<i64>(&record, route_columns::SOURCE_AIRPORT_ID)
            .and_then(|id| airports.get(&id).copied());
        let destination = parsed::<i64>(&record, route_columns::DESTINATION_AIRPORT_ID)
            .and_then(|id| airports.get(&id).copied());
        let price = parsed::<f64>(&record, route_columns::PRICE)
            .filter(|price| price.is_finite() && *price >= 0.0);

        let (Some(source), Some(destination), Some(price)) = (source, destination, price) else {
            report.skipped += 1;
            continue;
        };
        if source == destination {
            report.skipped += 1;
            continue;
        }

        pending.push(NewRoute {
            price,
            source,
            destination,
            airline_code: field(&record, route_columns::AIRLINE_CODE).map(str::to_string),
            stops: parsed(&record, route_columns::STOPS),
        });
    }

    let writes = !pending.is_empty();
    if writes {
        cache.invalidate();
    }
    report.imported = store.save_routes(pending)?;
    // A snapshot loaded between the first invalidation and the write holds pre-import data.
    if writes {
        cache.invalidate();
    }
    info!(
        imported = report.imported,
        skipped = report.skipped,
        "imported routes"
    );
    Ok(report)
}

/// Read every record, rejecting files where no row has enough columns.
fn read_records<R: Read>(reader: R, required: usize, kind: &str) -> Result<Vec<StringRecord>> {
    let mut csv_reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let mut records = Vec::new();
    let mut short_rows = 0usize;
    for result in csv_reader.records() {
        let record = result?;
        if record.len() < required {
            short_rows += 1;
            continue;
        }
        records.push(record);
    }

    if records.is_empty() && short_rows > 0 {
        return Err(Error::ImportValidation {
            message: format!(
                "no row in the {kind} file has the expected {required} columns ({short_rows} rows checked)"
            ),
        });
    }
    if short_rows > 0 {
        debug!(short_rows, kind, "ignored rows with too few columns");
    }
    Ok(records)
}

fn field(record: &StringRecord, column: usize) -> Option<&str> {
    record
        .get(column)
        .map(str::trim)
        .filter(|value| !value.is_empty() && *value != NULL_MARKER)
}

fn parsed<T: FromStr>(record: &StringRecord, column: usize) -> Option<T> {
    field(record, column).and_then(|value| value.parse().ok())
}

fn city_key(name: &str, country: &str) -> (String, String) {
    (name.to_lowercase(), country.to_lowercase())
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, OnceLock, Weak};

    use super::*;
    use crate::model::{City, GraphData};
    use crate::store::{AirportGraphLoader, CityStore, MemoryStore};

    const AIRPORTS: &str = "\
1,\"Tegel\",\"Berlin\",\"Germany\",\"TXL\",\"EDDT\",52.55,13.28,122,1,\"E\",\"Europe/Berlin\",\"airport\",\"OurAirports\"
2,\"Schonefeld\",\"berlin\",\"GERMANY\",\"SXF\",\"EDDB\",52.38,13.52,157,1,\"E\",\"Europe/Berlin\",\"airport\",\"OurAirports\"
3,\"Orly\",\"Paris\",\"France\",\"ORY\",\\N,48.72,2.35,291,1,\"E\",\"Europe/Paris\",\"airport\",\"OurAirports\"
";

    const ROUTES: &str = "\
LH,3320,TXL,1,ORY,3,,0,320,120.50
AF,137,ORY,3,SXF,2,,0,320,80
AF,137,ORY,3,ORY,3,,0,320,10
XX,1,TXL,1,ZZZ,999,,0,320,10
XX,1,TXL,1,ORY,3,,0,320,\\N
";

    fn store_with_airports() -> (Arc<MemoryStore>, SnapshotCache) {
        let store = Arc::new(MemoryStore::new());
        let cache = SnapshotCache::new(store.clone());
        import_cities(store.as_ref(), AIRPORTS.as_bytes()).expect("cities");
        import_airports(store.as_ref(), &cache, AIRPORTS.as_bytes()).expect("airports");
        (store, cache)
    }

    #[test]
    fn cities_are_deduplicated_case_insensitively() {
        let store = MemoryStore::new();
        let report = import_cities(&store, AIRPORTS.as_bytes()).expect("import");

        assert_eq!(report.imported, 2);
        assert_eq!(report.skipped, 1);
        let names: Vec<String> = store
            .cities()
            .expect("cities")
            .into_iter()
            .map(|city| city.name)
            .collect();
        assert_eq!(names, vec!["Berlin".to_string(), "Paris".to_string()]);

        let again = import_cities(&store, AIRPORTS.as_bytes()).expect("reimport");
        assert_eq!(again.imported, 0);
    }

    #[test]
    fn airports_resolve_cities_and_nulls() {
        let (store, _cache) = store_with_airports();
        let airports = store.load_all().expect("load").airports;

        assert_eq!(airports.len(), 3);
        let orly = airports
            .iter()
            .find(|airport| airport.external_id == 3)
            .expect("orly imported");
        assert_eq!(orly.iata_code.as_deref(), Some("ORY"));
        assert_eq!(orly.icao_code, None);
        assert_eq!(orly.latitude, Some(48.72));
        assert_eq!(airports[0].city_id, airports[1].city_id);
    }

    #[test]
    fn airports_with_known_external_id_or_unknown_city_are_skipped() {
        let (store, cache) = store_with_airports();
        let extra = "\
1,\"Tegel again\",\"Berlin\",\"Germany\",\\N,\\N,0,0,0,0,\"E\",\\N,\"airport\",\"x\"
9,\"Nowhere\",\"Atlantis\",\"Ocean\",\\N,\\N,0,0,0,0,\"E\",\\N,\"airport\",\"x\"
";
        let report = import_airports(store.as_ref(), &cache, extra.as_bytes()).expect("import");
        assert_eq!(report, ImportReport { imported: 0, skipped: 2 });
    }

    #[test]
    fn routes_skip_unresolvable_unpriced_and_self_loops() {
        let (store, cache) = store_with_airports();
        let report = import_routes(store.as_ref(), &cache, ROUTES.as_bytes()).expect("import");

        assert_eq!(report, ImportReport { imported: 2, skipped: 3 });
        let routes = store.load_all().expect("load").routes;
        assert_eq!(routes[0].price, 120.5);
        assert_eq!(routes[0].airline_code.as_deref(), Some("LH"));
        assert_eq!(routes[0].stops, Some(0));
    }

    #[test]
    fn route_import_invalidates_the_snapshot() {
        let (store, cache) = store_with_airports();
        assert_eq!(cache.get().expect("snapshot").route_count(), 0);
        let generation = cache.generation();

        import_routes(store.as_ref(), &cache, ROUTES.as_bytes()).expect("import");
        assert!(cache.generation() > generation);
        assert_eq!(cache.get().expect("reloaded").route_count(), 2);
    }

    /// Store that reads through the cache right before every airport or route write.
    #[derive(Default)]
    struct WarmingStore {
        inner: MemoryStore,
        cache: OnceLock<Weak<SnapshotCache>>,
    }

    impl WarmingStore {
        fn warm_cache(&self) {
            if let Some(cache) = self.cache.get().and_then(Weak::upgrade) {
                cache.get().expect("load mid-write");
            }
        }
    }

    impl CityStore for WarmingStore {
        fn find_city(&self, id: CityId) -> Result<Option<City>> {
            self.inner.find_city(id)
        }

        fn cities(&self) -> Result<Vec<City>> {
            self.inner.cities()
        }
    }

    impl AirportGraphLoader for WarmingStore {
        fn load_all(&self) -> Result<GraphData> {
            self.inner.load_all()
        }
    }

    impl GraphStore for WarmingStore {
        fn save_cities(&self, cities: Vec<NewCity>) -> Result<Vec<City>> {
            self.inner.save_cities(cities)
        }

        fn save_airports(&self, airports: Vec<NewAirport>) -> Result<usize> {
            self.warm_cache();
            self.inner.save_airports(airports)
        }

        fn save_routes(&self, routes: Vec<NewRoute>) -> Result<usize> {
            self.warm_cache();
            self.inner.save_routes(routes)
        }
    }

    #[test]
    fn snapshot_loaded_during_write_is_not_kept() {
        let store = Arc::new(WarmingStore::default());
        let cache = Arc::new(SnapshotCache::new(store.clone()));
        store
            .cache
            .set(Arc::downgrade(&cache))
            .expect("cache registered once");

        import_cities(store.as_ref(), AIRPORTS.as_bytes()).expect("cities");
        import_airports(store.as_ref(), &cache, AIRPORTS.as_bytes()).expect("airports");
        assert!(!cache.is_warm());
        assert_eq!(cache.get().expect("after airports").len(), 3);

        let report = import_routes(store.as_ref(), &cache, ROUTES.as_bytes()).expect("routes");
        assert_eq!(report.imported, 2);
        assert!(!cache.is_warm(), "pre-import snapshot must not survive the import");
        assert_eq!(cache.get().expect("after routes").route_count(), 2);
    }

    #[test]
    fn file_with_too_few_columns_is_rejected() {
        let (store, cache) = store_with_airports();
        let err = import_routes(store.as_ref(), &cache, "a,b,c\n".as_bytes())
            .expect_err("wrong file shape");
        assert!(matches!(err, Error::ImportValidation { .. }));
    }
}
