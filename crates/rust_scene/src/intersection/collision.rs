//! Bound-level collision queries between two subtrees

use crate::foundation::collections::SpatialKey;
use crate::scene::SceneGraph;

/// A pair of colliding leaves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollisionData {
    /// Leaf from the queried subtree
    pub source: SpatialKey,
    /// Leaf from the scene it was tested against
    pub target: SpatialKey,
}

/// Colliding leaf pairs in discovery order
#[derive(Debug, Clone, Default)]
pub struct CollisionResults {
    collisions: Vec<CollisionData>,
}

impl CollisionResults {
    /// Empty result set
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a pair
    pub fn add(&mut self, collision: CollisionData) {
        self.collisions.push(collision);
    }

    /// Pair by index
    pub fn get(&self, index: usize) -> Option<&CollisionData> {
        self.collisions.get(index)
    }

    /// All pairs
    pub fn iter(&self) -> impl Iterator<Item = &CollisionData> {
        self.collisions.iter()
    }

    /// Number of pairs
    pub fn len(&self) -> usize {
        self.collisions.len()
    }

    /// No pairs
    pub fn is_empty(&self) -> bool {
        self.collisions.is_empty()
    }

    /// Forget every pair
    pub fn clear(&mut self) {
        self.collisions.clear();
    }
}

impl SceneGraph {
    /// Both spatials exist, differ, are collidable and have overlapping
    /// world bounds
    fn bounds_overlap(&self, a: SpatialKey, b: SpatialKey) -> bool {
        if a == b {
            return false;
        }
        let (Some(a), Some(b)) = (self.get(a), self.get(b)) else {
            return false;
        };
        if !a.collidable || !b.collidable {
            return false;
        }
        match (a.world_bound(), b.world_bound()) {
            (Some(a), Some(b)) => a.intersects(b),
            _ => false,
        }
    }

    /// Record every pair of collidable leaves, one under `source` and one
    /// under `target`, whose world bounds intersect. Node bounds prune the
    /// search.
    pub fn find_collisions(&self, source: SpatialKey, target: SpatialKey, results: &mut CollisionResults) {
        if !self.bounds_overlap(source, target) {
            return;
        }

        if self.get(source).is_some_and(|s| s.is_node()) {
            for &child in self.children(source) {
                self.find_collisions(child, target, results);
            }
        } else if self.get(target).is_some_and(|t| t.is_node()) {
            for &child in self.children(target) {
                self.find_collisions(source, child, results);
            }
        } else {
            results.add(CollisionData { source, target });
        }
    }

    /// Does any collidable leaf under `source` touch one under `target`
    pub fn has_collision(&self, source: SpatialKey, target: SpatialKey) -> bool {
        if !self.bounds_overlap(source, target) {
            return false;
        }

        if self.get(source).is_some_and(|s| s.is_node()) {
            self.children(source).iter().any(|&child| self.has_collision(child, target))
        } else if self.get(target).is_some_and(|t| t.is_node()) {
            self.children(target).iter().any(|&child| self.has_collision(source, child))
        } else {
            true
        }
    }
}
