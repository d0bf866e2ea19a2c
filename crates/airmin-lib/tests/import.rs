mod common;

use std::fs::File;
use std::sync::Arc;

use airmin_lib::{
    import_airports, import_cities, import_routes, CityId, CityStore, ImportReport,
    RouteDiscovery, SnapshotCache, SqliteStore,
};
use tempfile::TempDir;

use common::fixtures_dir;

struct Imported {
    _dir: TempDir,
    store: Arc<SqliteStore>,
    cache: Arc<SnapshotCache>,
}

impl Imported {
    fn city(&self, name: &str) -> CityId {
        self.store
            .cities()
            .expect("list cities")
            .into_iter()
            .find(|city| city.name == name)
            .map(|city| city.id)
            .unwrap_or_else(|| panic!("city {name} imported"))
    }

    fn discovery(&self) -> RouteDiscovery {
        RouteDiscovery::new(self.store.clone(), self.cache.clone())
    }
}

fn open_fixture(name: &str) -> File {
    let path = fixtures_dir().join(name);
    File::open(&path).unwrap_or_else(|err| panic!("open {}: {err}", path.display()))
}

fn import_fixtures() -> Imported {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = Arc::new(
        SqliteStore::create(&dir.path().join("airmin.db")).expect("create database"),
    );
    let cache = Arc::new(SnapshotCache::new(store.clone()));

    import_cities(store.as_ref(), open_fixture("airports.csv")).expect("import cities");
    import_airports(store.as_ref(), &cache, open_fixture("airports.csv"))
        .expect("import airports");
    import_routes(store.as_ref(), &cache, open_fixture("routes.csv")).expect("import routes");

    Imported {
        _dir: dir,
        store,
        cache,
    }
}

#[test]
fn fixture_import_reports_skipped_rows() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = SqliteStore::create(&dir.path().join("airmin.db")).expect("create database");
    let cache = SnapshotCache::new(Arc::new(SqliteStore::open_in_memory().expect("memory db")));

    let cities = import_cities(&store, open_fixture("airports.csv")).expect("import cities");
    assert_eq!(
        cities,
        ImportReport {
            imported: 5,
            skipped: 3
        }
    );

    let airports =
        import_airports(&store, &cache, open_fixture("airports.csv")).expect("import airports");
    assert_eq!(
        airports,
        ImportReport {
            imported: 7,
            skipped: 1
        }
    );

    let routes = import_routes(&store, &cache, open_fixture("routes.csv")).expect("import routes");
    assert_eq!(
        routes,
        ImportReport {
            imported: 7,
            skipped: 3
        }
    );
}

#[test]
fn imported_network_finds_cheapest_itinerary() {
    let imported = import_fixtures();
    let discovery = imported.discovery();

    let plan = discovery
        .cheapest(imported.city("Berlin"), imported.city("Paris"))
        .expect("discovery succeeds");

    assert_eq!(plan.hop_count(), 2);
    assert_eq!(plan.total_price(), 75.0);

    let back = discovery
        .cheapest(imported.city("Paris"), imported.city("Berlin"))
        .expect("discovery succeeds");
    assert_eq!(back.hop_count(), 1);
    assert_eq!(back.total_price(), 60.0);
}

#[test]
fn isolated_city_has_no_itinerary() {
    let imported = import_fixtures();

    let plan = imported
        .discovery()
        .cheapest(imported.city("Berlin"), imported.city("Reykjavik"))
        .expect("unreachable is not an error");

    assert!(plan.is_empty());
}

#[test]
fn route_import_invalidates_warm_snapshot() {
    let imported = import_fixtures();
    imported.cache.get().expect("warm the cache");
    assert!(imported.cache.is_warm());

    let extra = "ZZ,1,KEF,7,TXL,1,,0,320,5.00\n";
    let report = import_routes(imported.store.as_ref(), &imported.cache, extra.as_bytes())
        .expect("import extra route");

    assert_eq!(report.imported, 1);
    assert!(!imported.cache.is_warm());

    let plan = imported
        .discovery()
        .cheapest(imported.city("Reykjavik"), imported.city("Berlin"))
        .expect("discovery succeeds");
    assert_eq!(plan.total_price(), 5.0);
}

#[test]
fn reimporting_airports_skips_known_external_ids() {
    let imported = import_fixtures();
    imported.cache.get().expect("warm the cache");

    let report = import_airports(
        imported.store.as_ref(),
        &imported.cache,
        open_fixture("airports.csv"),
    )
    .expect("second import");

    assert_eq!(report.imported, 0);
    assert_eq!(report.skipped, 8);
    assert!(
        imported.cache.is_warm(),
        "nothing written, nothing invalidated"
    );
}

#[test]
fn reopened_database_keeps_imported_data() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("airmin.db");
    {
        let store = SqliteStore::create(&path).expect("create database");
        import_cities(&store, open_fixture("airports.csv")).expect("import cities");
    }

    let reopened = SqliteStore::open(&path).expect("open existing database");
    assert_eq!(reopened.cities().expect("list cities").len(), 5);
}
