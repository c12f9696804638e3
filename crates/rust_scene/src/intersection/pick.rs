//! Bound-level ray picking

use super::ray::Ray;
use crate::foundation::collections::SpatialKey;
use crate::scene::SceneGraph;

/// One picked leaf
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickData {
    /// The leaf whose world bound the ray hit
    pub spatial: SpatialKey,
    /// Distance along the ray to the bound, 0 when the origin is inside
    pub distance: f32,
}

/// Picked leaves ordered by distance, nearest first
#[derive(Debug, Clone, Default)]
pub struct PickResults {
    picks: Vec<PickData>,
}

impl PickResults {
    /// Empty result set
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a pick keeping the distance order; equal distances keep
    /// insertion order
    pub fn add(&mut self, pick: PickData) {
        let index = self.picks.partition_point(|p| p.distance <= pick.distance);
        self.picks.insert(index, pick);
    }

    /// Nearest pick
    pub fn closest(&self) -> Option<&PickData> {
        self.picks.first()
    }

    /// Pick by rank
    pub fn get(&self, index: usize) -> Option<&PickData> {
        self.picks.get(index)
    }

    /// Picks, nearest first
    pub fn iter(&self) -> impl Iterator<Item = &PickData> {
        self.picks.iter()
    }

    /// Number of picks
    pub fn len(&self) -> usize {
        self.picks.len()
    }

    /// No picks
    pub fn is_empty(&self) -> bool {
        self.picks.is_empty()
    }

    /// Forget every pick
    pub fn clear(&mut self) {
        self.picks.clear();
    }
}

impl SceneGraph {
    /// Collect every collidable leaf under `key` whose world bound `ray`
    /// hits. Subtrees whose node bound the ray misses are skipped.
    pub fn find_pick(&self, key: SpatialKey, ray: &Ray, results: &mut PickResults) {
        let Some(spatial) = self.get(key) else {
            return;
        };
        if !spatial.collidable {
            return;
        }
        let Some(distance) = spatial.world_bound().and_then(|bound| bound.ray_distance(ray)) else {
            return;
        };

        if spatial.is_node() {
            for &child in spatial.children() {
                self.find_pick(child, ray, results);
            }
        } else {
            results.add(PickData { spatial: key, distance });
        }
    }
}
