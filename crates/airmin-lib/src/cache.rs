//! Single-slot cache for the airport graph snapshot.
//!
//! Loading the full graph is the most expensive step of a discovery query, so
//! the built [`AirportGraph`] is kept in one process-wide slot and shared by
//! reference. Importers must call [`SnapshotCache::invalidate`] before they
//! write airports or routes; the next [`SnapshotCache::get`] then rebuilds
//! the snapshot from the loader.
//!
//! Cold-cache callers do not serialize on the load: each may build its own
//! snapshot and the first one stored wins (put-if-absent). A load that began
//! before an invalidation is handed back to its caller but never stored.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::debug;

use crate::error::Result;
use crate::graph::AirportGraph;
use crate::store::AirportGraphLoader;

#[derive(Debug, Default)]
struct Slot {
    graph: Option<Arc<AirportGraph>>,
    generation: u64,
}

/// Mutex-guarded optional snapshot plus the loader used to fill it.
pub struct SnapshotCache {
    loader: Arc<dyn AirportGraphLoader>,
    slot: Mutex<Slot>,
    loads: AtomicUsize,
}

impl SnapshotCache {
    pub fn new(loader: Arc<dyn AirportGraphLoader>) -> Self {
        Self {
            loader,
            slot: Mutex::new(Slot::default()),
            loads: AtomicUsize::new(0),
        }
    }

    /// Return the cached snapshot, loading and storing it on a miss.
    pub fn get(&self) -> Result<Arc<AirportGraph>> {
        let generation = {
            let slot = self.lock();
            if let Some(graph) = &slot.graph {
                return Ok(Arc::clone(graph));
            }
            slot.generation
        };

        let data = self.loader.load_all()?;
        self.loads.fetch_add(1, Ordering::Relaxed);
        let graph = Arc::new(AirportGraph::build(data));

        let mut slot = self.lock();
        if slot.generation != generation {
            debug!(
                loaded_generation = generation,
                current_generation = slot.generation,
                "snapshot invalidated during load; not caching"
            );
            return Ok(graph);
        }
        Ok(Arc::clone(slot.graph.get_or_insert(graph)))
    }

    /// Drop the cached snapshot so the next [`get`](Self::get) reloads it.
    pub fn invalidate(&self) {
        let mut slot = self.lock();
        let had_snapshot = slot.graph.take().is_some();
        slot.generation += 1;
        debug!(
            generation = slot.generation,
            had_snapshot, "invalidated airport graph snapshot"
        );
    }

    /// Whether a snapshot is currently cached.
    pub fn is_warm(&self) -> bool {
        self.lock().graph.is_some()
    }

    /// Number of invalidations performed so far.
    pub fn generation(&self) -> u64 {
        self.lock().generation
    }

    /// Number of times the loader has been invoked.
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::Relaxed)
    }

    fn lock(&self) -> MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for SnapshotCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnapshotCache")
            .field("warm", &self.is_warm())
            .field("generation", &self.generation())
            .field("loads", &self.load_count())
            .finish()
    }
}
