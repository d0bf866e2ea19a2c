use std::collections::HashMap;

use tracing::{debug, warn};

use crate::model::{Airport, AirportId, CityId, GraphData, Route};

/// Dense index of an airport inside an [`AirportGraph`].
pub type NodeIndex = usize;

/// Route stored in an adjacency list together with the node at its far end.
///
/// In a departures list `endpoint` is the destination node; in an arrivals
/// list it is the source node.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub endpoint: NodeIndex,
    pub route: Route,
}

impl Edge {
    /// Edge weight used by the search engine.
    pub fn price(&self) -> f64 {
        self.route.price
    }
}

/// Immutable in-memory snapshot of every airport and its priced routes.
///
/// Nodes are ordered by ascending airport id and both adjacency views keep
/// ascending route id, so iteration order is stable across rebuilds of the
/// same data. The snapshot never carries search state; see
/// [`crate::path::SearchOutcome`] for that.
#[derive(Debug, Clone, Default)]
pub struct AirportGraph {
    airports: Vec<Airport>,
    index: HashMap<AirportId, NodeIndex>,
    departures: Vec<Vec<Edge>>,
    arrivals: Vec<Vec<Edge>>,
    route_count: usize,
}

impl AirportGraph {
    /// Build a snapshot from loader output.
    ///
    /// Routes that reference unknown airports or carry a negative or
    /// non-finite price are dropped with a warning; the search engine relies
    /// on every edge weight being a finite, non-negative number.
    pub fn build(data: GraphData) -> Self {
        let GraphData {
            mut airports,
            mut routes,
        } = data;
        airports.sort_by_key(|airport| airport.id);
        airports.dedup_by_key(|airport| airport.id);
        routes.sort_by_key(|route| route.id);

        let index: HashMap<AirportId, NodeIndex> = airports
            .iter()
            .enumerate()
            .map(|(position, airport)| (airport.id, position))
            .collect();

        let mut departures: Vec<Vec<Edge>> = vec![Vec::new(); airports.len()];
        let mut arrivals: Vec<Vec<Edge>> = vec![Vec::new(); airports.len()];
        let mut dangling = 0usize;
        let mut invalid_price = 0usize;
        let mut route_count = 0usize;

        for route in routes {
            if !route.price.is_finite() || route.price < 0.0 {
                invalid_price += 1;
                continue;
            }
            let (Some(&from), Some(&to)) =
                (index.get(&route.source), index.get(&route.destination))
            else {
                dangling += 1;
                continue;
            };
            arrivals[to].push(Edge {
                endpoint: from,
                route: route.clone(),
            });
            departures[from].push(Edge {
                endpoint: to,
                route,
            });
            route_count += 1;
        }

        if dangling > 0 {
            warn!(dangling, "ignored routes referencing unknown airports");
        }
        if invalid_price > 0 {
            warn!(invalid_price, "ignored routes with negative or non-finite price");
        }
        debug!(
            airports = airports.len(),
            routes = route_count,
            "built airport graph snapshot"
        );

        Self {
            airports,
            index,
            departures,
            arrivals,
            route_count,
        }
    }

    /// Number of airports (nodes).
    pub fn len(&self) -> usize {
        self.airports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.airports.is_empty()
    }

    /// Number of routes (edges) accepted into the snapshot.
    pub fn route_count(&self) -> usize {
        self.route_count
    }

    /// Every airport in node order.
    pub fn airports(&self) -> &[Airport] {
        &self.airports
    }

    pub fn airport(&self, node: NodeIndex) -> &Airport {
        &self.airports[node]
    }

    /// Resolve an airport id to its node index.
    pub fn node_of(&self, airport: AirportId) -> Option<NodeIndex> {
        self.index.get(&airport).copied()
    }

    /// Look up an airport by id.
    pub fn airport_by_id(&self, airport: AirportId) -> Option<&Airport> {
        self.node_of(airport).map(|node| &self.airports[node])
    }

    /// Outgoing routes for a node.
    pub fn departures(&self, node: NodeIndex) -> &[Edge] {
        self.departures
            .get(node)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Incoming routes for a node.
    pub fn arrivals(&self, node: NodeIndex) -> &[Edge] {
        self.arrivals.get(node).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Nodes whose airport belongs to `city`, found by linear scan.
    pub fn airports_in_city(&self, city: CityId) -> Vec<NodeIndex> {
        self.airports
            .iter()
            .enumerate()
            .filter(|(_, airport)| airport.city_id == city)
            .map(|(node, _)| node)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn airport(id: AirportId, city_id: CityId) -> Airport {
        Airport {
            id,
            external_id: id,
            name: format!("A{id}"),
            iata_code: None,
            icao_code: None,
            latitude: None,
            longitude: None,
            city_id,
        }
    }

    fn route(id: i64, source: AirportId, destination: AirportId, price: f64) -> Route {
        Route {
            id,
            price,
            source,
            destination,
            airline_code: None,
            stops: None,
        }
    }

    #[test]
    fn build_orders_nodes_and_populates_both_adjacency_views() {
        let graph = AirportGraph::build(GraphData {
            airports: vec![airport(3, 1), airport(1, 1), airport(2, 2)],
            routes: vec![route(20, 1, 2, 5.0), route(10, 1, 3, 1.0)],
        });

        assert_eq!(
            graph.airports().iter().map(|a| a.id).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
        let first = graph.node_of(1).expect("node for airport 1");
        let ids: Vec<i64> = graph
            .departures(first)
            .iter()
            .map(|edge| edge.route.id)
            .collect();
        assert_eq!(ids, vec![10, 20]);

        let second = graph.node_of(2).expect("node for airport 2");
        assert_eq!(graph.arrivals(second).len(), 1);
        assert_eq!(graph.arrivals(second)[0].endpoint, first);
        assert!(graph.departures(second).is_empty());
        assert_eq!(graph.route_count(), 2);
    }

    #[test]
    fn build_drops_dangling_and_negative_routes() {
        let graph = AirportGraph::build(GraphData {
            airports: vec![airport(1, 1), airport(2, 1)],
            routes: vec![
                route(1, 1, 2, 3.0),
                route(2, 1, 99, 3.0),
                route(3, 2, 1, -1.0),
                route(4, 2, 1, f64::NAN),
            ],
        });

        assert_eq!(graph.route_count(), 1);
    }

    #[test]
    fn airports_in_city_scans_all_nodes() {
        let graph = AirportGraph::build(GraphData {
            airports: vec![airport(1, 7), airport(2, 8), airport(3, 7)],
            routes: Vec::new(),
        });

        let nodes = graph.airports_in_city(7);
        let ids: Vec<AirportId> = nodes.iter().map(|&n| graph.airport(n).id).collect();
        assert_eq!(ids, vec![1, 3]);
        assert!(graph.airports_in_city(9).is_empty());
    }
}
