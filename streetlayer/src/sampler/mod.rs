//! Systematic road sampling.
//!
//! Turns a road network into acquisition candidates by walking a random
//! subset of roads at a fixed spacing and emitting one candidate per
//! cardinal heading at every sampled position.

use crate::coord::{CandidatePoint, Heading, HEADINGS_PER_GROUP};
use crate::geometry::{RoadGeometry, RoadNetwork};
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::SeedableRng;
use std::sync::Arc;
use tracing::debug;

/// Default distance between sampled positions along a road, in metres.
pub const DEFAULT_SPACING_METERS: f64 = 50.0;

/// Produces candidate points for the orchestrator.
///
/// Each call re-samples; the returned batch is finite and an empty batch
/// means the source has nothing more to offer.
pub trait CandidateSource: Send + Sync {
    /// Samples candidates for roughly `target_point_groups` point-groups.
    fn sample(&self, target_point_groups: usize) -> Vec<CandidatePoint>;
}

/// Random road subsampler with equal-arc-length interpolation.
pub struct RoadSampler {
    rng: Mutex<StdRng>,
}

impl RoadSampler {
    /// Creates a sampler seeded from the operating system.
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_os_rng()),
        }
    }

    /// Creates a deterministic sampler.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    /// Samples candidate points from `roads`.
    ///
    /// Picks `target_point_groups / 2` roads without replacement (all roads if
    /// fewer are available), places `max(1, floor(length / spacing))`
    /// positions at equal arc-length intervals on each, and emits the four
    /// headings for every position.
    pub fn sample(
        &self,
        roads: &[RoadGeometry],
        target_point_groups: usize,
        spacing_meters: f64,
    ) -> Vec<CandidatePoint> {
        if roads.is_empty() || spacing_meters <= 0.0 {
            return Vec::new();
        }

        let road_count = target_point_groups / 2;
        let selected: Vec<&RoadGeometry> = if road_count >= roads.len() {
            roads.iter().collect()
        } else {
            let mut rng = self.rng.lock();
            roads.choose_multiple(&mut *rng, road_count).collect()
        };

        let mut points = Vec::new();
        for road in selected {
            let length = road.length_m();
            let num_points = ((length / spacing_meters).floor() as usize).max(1);
            points.reserve(num_points * HEADINGS_PER_GROUP);

            for i in 0..num_points {
                let (lat, lon) = road.interpolate(i as f64 * length / num_points as f64);
                points.extend(
                    Heading::ALL
                        .iter()
                        .map(|&heading| CandidatePoint { lat, lon, heading }),
                );
            }
        }

        debug!(
            requested_groups = target_point_groups,
            roads = road_count.min(roads.len()),
            candidates = points.len(),
            "Sampled road network"
        );

        points
    }
}

impl Default for RoadSampler {
    fn default() -> Self {
        Self::new()
    }
}

/// A [`CandidateSource`] bound to one region's road network.
pub struct RegionSampler {
    network: Arc<RoadNetwork>,
    sampler: RoadSampler,
    spacing_meters: f64,
}

impl RegionSampler {
    pub fn new(network: Arc<RoadNetwork>, sampler: RoadSampler, spacing_meters: f64) -> Self {
        Self {
            network,
            sampler,
            spacing_meters,
        }
    }

    pub fn spacing_meters(&self) -> f64 {
        self.spacing_meters
    }
}

impl CandidateSource for RegionSampler {
    fn sample(&self, target_point_groups: usize) -> Vec<CandidatePoint> {
        self.sampler
            .sample(self.network.roads(), target_point_groups, self.spacing_meters)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A straight north-bound road of roughly `metres` length at `lon`.
    fn road(lon: f64, metres: f64) -> RoadGeometry {
        let dlat = metres / 111_194.93;
        RoadGeometry::from_lon_lat(&[(lon, 10.0), (lon, 10.0 + dlat)]).unwrap()
    }

    fn assert_groups_of_four(points: &[CandidatePoint]) {
        assert_eq!(points.len() % HEADINGS_PER_GROUP, 0);
        for group in points.chunks(HEADINGS_PER_GROUP) {
            let headings: Vec<u16> = group.iter().map(|p| p.heading.degrees()).collect();
            assert_eq!(headings, vec![2, 92, 182, 272]);
            assert!(group.iter().all(|p| p.lat == group[0].lat && p.lon == group[0].lon));
        }
    }

    #[test]
    fn test_empty_roads_yield_nothing() {
        let sampler = RoadSampler::with_seed(1);
        assert!(sampler.sample(&[], 10, 50.0).is_empty());
    }

    #[test]
    fn test_single_road_500m_at_50m_spacing() {
        let sampler = RoadSampler::with_seed(1);
        // A hair over 500 m so floor(L / 50) is exactly 10.
        let roads = vec![road(0.0, 500.5)];

        let points = sampler.sample(&roads, 5, 50.0);
        assert_eq!(points.len(), 40);
        assert_groups_of_four(&points);
    }

    #[test]
    fn test_short_road_gets_one_position() {
        let sampler = RoadSampler::with_seed(1);
        let roads = vec![road(0.0, 20.0)];

        let points = sampler.sample(&roads, 10, 50.0);
        assert_eq!(points.len(), 4);
        assert_eq!(points[0].lat, 10.0);
    }

    #[test]
    fn test_selects_half_the_requested_groups_as_roads() {
        let sampler = RoadSampler::with_seed(7);
        let roads: Vec<_> = (0..20).map(|i| road(i as f64 * 0.01, 10.0)).collect();

        // 6 groups requested => 3 roads, each short enough for one position.
        let points = sampler.sample(&roads, 6, 50.0);
        assert_eq!(points.len(), 3 * HEADINGS_PER_GROUP);
        assert_groups_of_four(&points);

        let mut lons: Vec<f64> = points.iter().map(|p| p.lon).collect();
        lons.dedup();
        assert_eq!(lons.len(), 3, "roads are chosen without replacement");
    }

    #[test]
    fn test_request_larger_than_collection_uses_all_roads() {
        let sampler = RoadSampler::with_seed(3);
        let roads: Vec<_> = (0..3).map(|i| road(i as f64, 10.0)).collect();

        let points = sampler.sample(&roads, 100, 50.0);
        assert_eq!(points.len(), 3 * HEADINGS_PER_GROUP);
    }

    #[test]
    fn test_single_group_request_selects_no_roads() {
        // 1 / 2 == 0 roads.
        let sampler = RoadSampler::with_seed(3);
        let roads: Vec<_> = (0..3).map(|i| road(i as f64, 10.0)).collect();
        assert!(sampler.sample(&roads, 1, 50.0).is_empty());
    }

    #[test]
    fn test_positions_are_equally_spaced() {
        let sampler = RoadSampler::with_seed(1);
        let roads = vec![road(0.0, 200.5)];

        let points = sampler.sample(&roads, 2, 50.0);
        let lats: Vec<f64> = points
            .chunks(HEADINGS_PER_GROUP)
            .map(|group| group[0].lat)
            .collect();
        assert_eq!(lats.len(), 4);

        let steps: Vec<f64> = lats.windows(2).map(|w| w[1] - w[0]).collect();
        for step in &steps {
            assert!((step - steps[0]).abs() < 1e-9);
        }
    }

    #[test]
    fn test_seeded_samplers_agree() {
        let roads: Vec<_> = (0..50).map(|i| road(i as f64 * 0.01, 10.0)).collect();
        let a = RoadSampler::with_seed(42).sample(&roads, 10, 50.0);
        let b = RoadSampler::with_seed(42).sample(&roads, 10, 50.0);
        assert_eq!(a, b);
    }

    #[test]
    fn test_region_sampler_uses_spacing() {
        let network = Arc::new(RoadNetwork::new(vec![road(0.0, 500.5)]));
        let source = RegionSampler::new(network, RoadSampler::with_seed(1), 100.0);
        assert_eq!(source.spacing_meters(), 100.0);
        assert_eq!(source.sample(2).len(), 5 * HEADINGS_PER_GROUP);
    }
}
