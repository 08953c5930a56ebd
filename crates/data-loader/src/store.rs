//! The engine's data collaborator.
//!
//! [`VenueStore`] is the only boundary the recommendation engine reads
//! through. [`DataIndex`] implements it in memory; [`CachedStore`] wraps
//! any store and serves reference lists through a [`TtlCache`].

use crate::cache::{CacheKey, TtlCache};
use crate::error::{DataLoadError, Result};
use crate::types::*;
use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;
use tracing::debug;

/// Read access to venues and reference data.
///
/// Implementations must be `Send + Sync` so one store can serve
/// concurrent requests. Any error is fatal to the request that issued it.
pub trait VenueStore: Send + Sync {
    /// Active venues in `region` linked to at least one of `time_window_ids`.
    fn fetch_active_venues(
        &self,
        region: &str,
        time_window_ids: &[TimeWindowId],
    ) -> Result<Vec<Venue>>;

    /// All time windows, ordered by id.
    fn fetch_time_windows(&self) -> Result<Vec<TimeWindow>>;

    /// A single region by id.
    fn fetch_region(&self, id: &str) -> Result<Region>;

    /// All regions, ordered by id.
    fn fetch_regions(&self) -> Result<Vec<Region>>;
}

impl VenueStore for DataIndex {
    fn fetch_active_venues(
        &self,
        region: &str,
        time_window_ids: &[TimeWindowId],
    ) -> Result<Vec<Venue>> {
        let in_region: HashSet<VenueId> =
            self.get_venues_by_region(region).iter().copied().collect();

        // A venue linked to several requested windows is listed once
        let linked: BTreeSet<VenueId> = time_window_ids
            .iter()
            .flat_map(|&window_id| self.get_venues_by_time_window(window_id))
            .copied()
            .filter(|id| in_region.contains(id))
            .collect();

        let venues: Vec<Venue> = linked
            .into_iter()
            .filter_map(|id| self.get_venue(id))
            .filter(|venue| venue.active)
            .cloned()
            .collect();

        debug!(
            region,
            requested_windows = time_window_ids.len(),
            fetched = venues.len(),
            "Fetched active venues"
        );
        Ok(venues)
    }

    fn fetch_time_windows(&self) -> Result<Vec<TimeWindow>> {
        Ok(self.time_windows.values().cloned().collect())
    }

    fn fetch_region(&self, id: &str) -> Result<Region> {
        self.get_region(id)
            .cloned()
            .ok_or_else(|| DataLoadError::NotFound {
                entity: "Region".to_string(),
                id: id.to_string(),
            })
    }

    fn fetch_regions(&self) -> Result<Vec<Region>> {
        let mut regions: Vec<Region> = self.regions.values().cloned().collect();
        regions.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(regions)
    }
}

impl<S: VenueStore + ?Sized> VenueStore for Arc<S> {
    fn fetch_active_venues(
        &self,
        region: &str,
        time_window_ids: &[TimeWindowId],
    ) -> Result<Vec<Venue>> {
        (**self).fetch_active_venues(region, time_window_ids)
    }

    fn fetch_time_windows(&self) -> Result<Vec<TimeWindow>> {
        (**self).fetch_time_windows()
    }

    fn fetch_region(&self, id: &str) -> Result<Region> {
        (**self).fetch_region(id)
    }

    fn fetch_regions(&self) -> Result<Vec<Region>> {
        (**self).fetch_regions()
    }
}

/// Store decorator that serves reference lists through a shared cache.
///
/// Venue fetches always go to the inner store.
pub struct CachedStore<S> {
    inner: S,
    cache: Arc<TtlCache>,
}

impl<S: VenueStore> CachedStore<S> {
    /// Wrap `inner`, reading reference data through `cache`
    pub fn new(inner: S, cache: Arc<TtlCache>) -> Self {
        Self { inner, cache }
    }

    /// The cache this store reads through
    pub fn cache(&self) -> &TtlCache {
        &self.cache
    }
}

impl<S: VenueStore> VenueStore for CachedStore<S> {
    fn fetch_active_venues(
        &self,
        region: &str,
        time_window_ids: &[TimeWindowId],
    ) -> Result<Vec<Venue>> {
        self.inner.fetch_active_venues(region, time_window_ids)
    }

    fn fetch_time_windows(&self) -> Result<Vec<TimeWindow>> {
        crate::cached!(self.cache, CacheKey::TimeWindows, {
            self.inner.fetch_time_windows()
        })
    }

    fn fetch_region(&self, id: &str) -> Result<Region> {
        crate::cached!(self.cache, CacheKey::Region(id.to_string()), {
            self.inner.fetch_region(id)
        })
    }

    fn fetch_regions(&self) -> Result<Vec<Region>> {
        crate::cached!(self.cache, CacheKey::Regions, { self.inner.fetch_regions() })
    }
}
