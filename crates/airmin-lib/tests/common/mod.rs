//! Common test utilities and fixture helpers.
//!
//! Provides the reference six-airport network and paths to the CSV fixtures
//! shared by the integration tests.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use airmin_lib::{AirportGraph, AirportGraphLoader, AirportId, CityId, MemoryStore, NodeIndex};

/// Path to fixtures directory used by tests (CSV imports).
pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../docs/fixtures")
}

/// Store with one city per airport, so every node can be addressed by city.
pub struct Network {
    pub store: Arc<MemoryStore>,
    pub cities: Vec<CityId>,
    pub airports: Vec<AirportId>,
}

impl Network {
    /// Create `count` airports named `N0..N{count-1}`, each in its own city.
    pub fn with_nodes(count: usize) -> Self {
        let store = Arc::new(MemoryStore::new());
        let mut cities = Vec::with_capacity(count);
        let mut airports = Vec::with_capacity(count);
        for index in 0..count {
            let name = format!("N{index}");
            let city = store.add_city(&name, "Testland");
            cities.push(city);
            airports.push(store.add_airport(&name, city));
        }
        Self {
            store,
            cities,
            airports,
        }
    }

    pub fn connect(&self, from: usize, to: usize, price: f64) {
        self.store
            .add_route(self.airports[from], self.airports[to], price);
    }

    pub fn graph(&self) -> AirportGraph {
        AirportGraph::build(self.store.load_all().expect("memory store loads"))
    }

    pub fn node(&self, graph: &AirportGraph, index: usize) -> NodeIndex {
        graph
            .node_of(self.airports[index])
            .expect("airport present in graph")
    }
}

/// The reference network whose cheapest N1 -> N6 path is N1,N5,N2,N3,N4,N6 at 9.
pub fn six_node_network(with_costly_shortcut: bool) -> Network {
    let network = Network::with_nodes(7);
    network.connect(1, 5, 1.0);
    network.connect(1, 2, 99.0);
    network.connect(2, 3, 2.0);
    network.connect(3, 6, 6.0);
    network.connect(3, 4, 4.0);
    network.connect(4, 6, 1.0);
    network.connect(5, 2, 1.0);
    if with_costly_shortcut {
        network.connect(5, 6, 12.0);
    }
    network
}
