//! Multi-source, multi-target cheapest path search over an [`AirportGraph`].
//!
//! [`search`] runs Dijkstra's algorithm seeded with every source node at
//! price zero and stops as soon as every target has been settled (or the
//! queue runs dry). Distances and predecessors live in a [`SearchOutcome`]
//! allocated per call, so any number of searches can share one snapshot.
//!
//! The predecessor map only records nodes, not the route that was relaxed.
//! [`reconstruct_legs`] recovers the routes by matching, for each hop, a
//! departure whose price equals the distance delta within
//! [`PRICE_TOLERANCE`].

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};

use tracing::{debug, warn};

use crate::graph::{AirportGraph, Edge, NodeIndex};
use crate::model::RouteLeg;

/// Absolute tolerance used when matching a hop price against a distance delta.
pub const PRICE_TOLERANCE: f64 = 1e-7;

/// Per-search scratch state: tentative prices and the predecessor map.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    distances: Vec<f64>,
    predecessors: HashMap<NodeIndex, NodeIndex>,
    settled_targets: usize,
    expanded: usize,
}

impl SearchOutcome {
    /// Cheapest known total price to reach `node`, `+inf` when unreached.
    pub fn distance(&self, node: NodeIndex) -> f64 {
        self.distances.get(node).copied().unwrap_or(f64::INFINITY)
    }

    /// Node `node` was reached from on its cheapest known path.
    pub fn predecessor(&self, node: NodeIndex) -> Option<NodeIndex> {
        self.predecessors.get(&node).copied()
    }

    /// Every node improved from infinity, mapped to its predecessor.
    pub fn predecessors(&self) -> &HashMap<NodeIndex, NodeIndex> {
        &self.predecessors
    }

    /// Number of distinct targets settled before the search stopped.
    pub fn settled_targets(&self) -> usize {
        self.settled_targets
    }

    /// Number of nodes popped and relaxed.
    pub fn expanded(&self) -> usize {
        self.expanded
    }
}

/// Run the search from every node in `sources` towards every node in `targets`.
///
/// Ties in the queue are broken by node index, which follows ascending
/// airport id, so equal-priced alternatives resolve the same way on every run.
pub fn search(
    graph: &AirportGraph,
    sources: &[NodeIndex],
    targets: &[NodeIndex],
) -> SearchOutcome {
    let mut distances = vec![f64::INFINITY; graph.len()];
    let mut predecessors: HashMap<NodeIndex, NodeIndex> = HashMap::new();
    let mut settled = vec![false; graph.len()];
    let mut queue = BinaryHeap::new();

    let target_set: HashSet<NodeIndex> = targets
        .iter()
        .copied()
        .filter(|&node| node < graph.len())
        .collect();
    let mut settled_targets: HashSet<NodeIndex> = HashSet::new();
    let mut expanded = 0usize;

    for &source in sources {
        if source < graph.len() && distances[source] != 0.0 {
            distances[source] = 0.0;
            queue.push(QueueEntry::new(source, 0.0));
        }
    }

    while settled_targets.len() < target_set.len() {
        let Some(entry) = queue.pop() else {
            break;
        };
        let current = entry.node;
        // Superseded entries left behind by a cheaper re-insertion.
        if settled[current] || entry.cost.0 > distances[current] {
            continue;
        }
        settled[current] = true;
        expanded += 1;

        if target_set.contains(&current) {
            settled_targets.insert(current);
        }

        let current_distance = distances[current];
        for edge in graph.departures(current) {
            let next = edge.endpoint;
            let candidate = current_distance + edge.price();
            if candidate < distances[next] {
                distances[next] = candidate;
                predecessors.insert(next, current);
                queue.push(QueueEntry::new(next, candidate));
            }
        }
    }

    debug!(
        sources = sources.len(),
        targets = target_set.len(),
        settled_targets = settled_targets.len(),
        expanded,
        "cheapest path search finished"
    );

    SearchOutcome {
        distances,
        predecessors,
        settled_targets: settled_targets.len(),
        expanded,
    }
}

/// Cheapest target that appears in the predecessor map.
///
/// Targets never improved from infinity (including targets that were
/// themselves sources) are not candidates.
pub fn cheapest_target(outcome: &SearchOutcome, targets: &[NodeIndex]) -> Option<NodeIndex> {
    targets
        .iter()
        .copied()
        .filter(|node| outcome.predecessors.contains_key(node))
        .min_by(|a, b| {
            compare_price(outcome.distance(*a), outcome.distance(*b)).then_with(|| a.cmp(b))
        })
}

/// Reconstruct the ordered legs leading to the cheapest reachable target.
///
/// Returns an empty list when no target was reached.
pub fn shortest_path(
    graph: &AirportGraph,
    outcome: &SearchOutcome,
    targets: &[NodeIndex],
) -> Vec<RouteLeg> {
    match cheapest_target(outcome, targets) {
        Some(target) => reconstruct_legs(graph, outcome, target),
        None => Vec::new(),
    }
}

/// Search and reconstruct in one step.
pub fn find_cheapest_route(
    graph: &AirportGraph,
    sources: &[NodeIndex],
    targets: &[NodeIndex],
) -> Vec<RouteLeg> {
    let outcome = search(graph, sources, targets);
    shortest_path(graph, &outcome, targets)
}

/// Walk predecessors back from `target` and recover the route used for each hop.
///
/// For every pair (previous, current) the hop is a departure of `previous`
/// arriving at `current` whose price matches the distance delta exactly or
/// within [`PRICE_TOLERANCE`]. Parallel routes matching the same hop collapse
/// to the one with the lowest route id.
pub fn reconstruct_legs(
    graph: &AirportGraph,
    outcome: &SearchOutcome,
    target: NodeIndex,
) -> Vec<RouteLeg> {
    let mut legs = Vec::new();
    let mut current = target;

    while let Some(previous) = outcome.predecessor(current) {
        if legs.len() >= graph.len() {
            warn!(target, "predecessor chain longer than the graph; abandoning path");
            return Vec::new();
        }

        let expected = outcome.distance(current) - outcome.distance(previous);
        let candidates = || {
            graph
                .departures(previous)
                .iter()
                .filter(move |edge| edge.endpoint == current)
        };

        let hop = candidates()
            .filter(|edge| prices_match(expected, edge.price()))
            .min_by_key(|edge| edge.route.id)
            .or_else(|| {
                warn!(
                    from = graph.airport(previous).id,
                    to = graph.airport(current).id,
                    expected,
                    "no route matches hop price within tolerance; using cheapest parallel route"
                );
                candidates().min_by(|a, b| cheaper_edge(a, b))
            });

        match hop {
            Some(edge) => legs.push(RouteLeg::from(&edge.route)),
            None => {
                warn!(
                    from = graph.airport(previous).id,
                    to = graph.airport(current).id,
                    "predecessor without connecting route; abandoning path"
                );
                return Vec::new();
            }
        }

        current = previous;
    }

    legs.reverse();
    let mut seen = HashSet::new();
    legs.retain(|leg| seen.insert(leg.route_id));
    legs
}

/// Exact-or-within-tolerance price comparison.
fn prices_match(a: f64, b: f64) -> bool {
    (a - b).abs() <= PRICE_TOLERANCE || a == b
}

fn cheaper_edge(a: &Edge, b: &Edge) -> Ordering {
    compare_price(a.price(), b.price()).then_with(|| a.route.id.cmp(&b.route.id))
}

fn compare_price(a: f64, b: f64) -> Ordering {
    a.total_cmp(&b)
}

#[derive(Copy, Clone, Debug, Default)]
struct FloatOrd(f64);

impl PartialEq for FloatOrd {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq(&other.0)
    }
}

impl Eq for FloatOrd {}

impl PartialOrd for FloatOrd {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FloatOrd {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
struct QueueEntry {
    node: NodeIndex,
    cost: FloatOrd,
}

impl QueueEntry {
    fn new(node: NodeIndex, cost: f64) -> Self {
        Self {
            node,
            cost: FloatOrd(cost),
        }
    }
}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering so BinaryHeap becomes a min-heap by cost.
        other
            .cost
            .cmp(&self.cost)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
