//! Process-wide road network cache.

use super::{load_road_network, GeometryError, RoadNetwork};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Cache of loaded road networks keyed by region name.
///
/// A region is loaded at most once per cache. The map entry stays locked while
/// the loader runs, so concurrent callers for the same region wait for the
/// first load and then share its result.
#[derive(Debug, Default)]
pub struct GeometryCache {
    regions: DashMap<String, Arc<RoadNetwork>>,
}

impl GeometryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached network for `region`, loading it from `path` on first use.
    pub fn get_or_load(&self, region: &str, path: &Path) -> Result<Arc<RoadNetwork>, GeometryError> {
        self.get_or_insert_with(region, || load_road_network(path))
    }

    /// Returns the cached network for `region`, building it with `load` on first use.
    ///
    /// A failed load leaves the region uncached.
    pub fn get_or_insert_with<F>(
        &self,
        region: &str,
        load: F,
    ) -> Result<Arc<RoadNetwork>, GeometryError>
    where
        F: FnOnce() -> Result<RoadNetwork, GeometryError>,
    {
        match self.regions.entry(region.to_string()) {
            Entry::Occupied(entry) => {
                debug!(region, "Using cached road network");
                Ok(Arc::clone(entry.get()))
            }
            Entry::Vacant(entry) => {
                debug!(region, "Loading road network");
                let network = Arc::new(load()?);
                entry.insert(Arc::clone(&network));
                Ok(network)
            }
        }
    }

    /// Returns the cached network without loading.
    pub fn get(&self, region: &str) -> Option<Arc<RoadNetwork>> {
        self.regions.get(region).map(|e| Arc::clone(e.value()))
    }

    /// Number of regions currently cached.
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}
