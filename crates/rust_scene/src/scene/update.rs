//! Geometric update passes and lock management
//!
//! A geometric update runs controllers, recomputes world transforms top-down
//! and world bounds bottom-up. Lock flags short-circuit parts of that work
//! for subtrees known to be static.

use super::controller::{ControllerContext, GraphEdit};
use super::graph::SceneGraph;
use super::modes::LockedMode;
use super::render_context::RenderContext;
use crate::bounding::BoundingVolume;
use crate::error::SceneResult;
use crate::foundation::collections::SpatialKey;
use std::mem;

impl SceneGraph {
    /// Run controllers, then refresh world transforms and bounds of `key`
    /// and its subtree.
    ///
    /// With `initiator` set the new bound is also pushed up to the root and
    /// any structural edits queued by controllers are applied afterwards.
    ///
    /// # Errors
    ///
    /// [`crate::SceneError::SpatialNotFound`] for a stale key.
    pub fn update_geometric_state(&mut self, key: SpatialKey, time: f32, initiator: bool) -> SceneResult<()> {
        self.spatial(key)?;
        self.update_branch(key, time, initiator);
        if initiator {
            self.apply_pending_edits();
        }
        Ok(())
    }

    fn update_branch(&mut self, key: SpatialKey, time: f32, initiator: bool) {
        let Some(spatial) = self.spatials.get(key) else {
            return;
        };
        if spatial.is_locked(LockedMode::BRANCH) {
            return;
        }

        self.update_world_data(key, time);

        let children = self.children(key).to_vec();
        for child in children {
            if self.parent(child) != Some(key) {
                log::debug!("Child {child:?} left {key:?} during update, skipping the rest of the level");
                break;
            }
            self.update_branch(child, time, false);
        }

        if self.spatials.get(key).is_some_and(|s| !s.is_locked(LockedMode::BOUNDS)) {
            self.update_world_bound(key);
            if initiator {
                self.propagate_bound_to_root(key);
            }
        }
    }

    /// Run the controllers of `key` in order, then recompute its world
    /// transform. Controllers that finish are dropped after the pass.
    pub fn update_world_data(&mut self, key: SpatialKey, time: f32) {
        let Self {
            spatials, pending_edits, ..
        } = &mut *self;
        let Some(spatial) = spatials.get_mut(key) else {
            return;
        };

        if !spatial.controllers.is_empty() {
            let mut controllers = mem::take(&mut spatial.controllers);
            let mut ctx = ControllerContext::new(key, &mut spatial.local, pending_edits);
            controllers.retain_mut(|slot| slot.run(time, &mut ctx));
            spatial.controllers = controllers;
        }

        self.update_world_vectors(key);
    }

    /// Recompute the world transform of `key` from its parent's world
    /// transform and its local transform. A root copies its local transform.
    pub fn update_world_vectors(&mut self, key: SpatialKey) {
        let parent_world = self.parent(key).and_then(|p| self.spatials.get(p)).map(|p| p.world);

        let Some(spatial) = self.spatials.get_mut(key) else {
            return;
        };
        if spatial.is_locked(LockedMode::TRANSFORMS) {
            return;
        }

        spatial.world = match parent_world {
            Some(parent) => parent.combine(&spatial.local),
            None => spatial.local,
        };
    }

    /// Recompute the world bound of `key` from its children (nodes) or its
    /// batches (geometry). A node none of whose children has a bound keeps
    /// its previous bound.
    pub fn update_world_bound(&mut self, key: SpatialKey) {
        let Some(spatial) = self.spatials.get(key) else {
            return;
        };
        if spatial.is_locked(LockedMode::BOUNDS) {
            return;
        }

        let world = spatial.world;
        let bound = if spatial.is_node() {
            spatial
                .children()
                .iter()
                .filter_map(|&child| self.spatials.get(child)?.world_bound)
                .reduce(|merged, bound| merged.merge_enclosing(&bound))
        } else {
            self.spatials
                .get_mut(key)
                .and_then(|s| s.as_geometry_mut())
                .and_then(|geometry| geometry.update_world_bound(&world))
        };

        if let (Some(bound), Some(spatial)) = (bound, self.spatials.get_mut(key)) {
            spatial.world_bound = Some(bound);
        }
    }

    /// Recompute the bound of every ancestor of `key`, nearest first
    pub fn propagate_bound_to_root(&mut self, key: SpatialKey) {
        let ancestors: Vec<_> = self.ancestors(key).collect();
        for ancestor in ancestors {
            self.update_world_bound(ancestor);
        }
    }

    /// Give every leaf under `key` a model bound of this kind.
    /// Call [`SceneGraph::update_model_bound`] to fit it.
    pub fn set_model_bound(&mut self, key: SpatialKey, bound: BoundingVolume) {
        for spatial in self.subtree(key) {
            if let Some(geometry) = self.spatials.get_mut(spatial).and_then(|s| s.as_geometry_mut()) {
                geometry.set_model_bound(bound);
            }
        }
    }

    /// Refit the model bounds of every leaf under `key` using the
    /// configured sphere policy
    pub fn update_model_bound(&mut self, key: SpatialKey) {
        let policy = self.config.sphere_policy;
        for spatial in self.subtree(key) {
            if let Some(geometry) = self.spatials.get_mut(spatial).and_then(|s| s.as_geometry_mut()) {
                geometry.update_model_bound(policy);
            }
        }
    }

    /// Apply structural edits queued by controllers and refresh the bounds
    /// above every spatial that moved. Returns how many edits took effect.
    pub fn apply_pending_edits(&mut self) -> usize {
        let edits = mem::take(&mut self.pending_edits);
        let mut applied = 0;

        for edit in edits {
            let former_parent = match edit {
                GraphEdit::Detach(key) => match self.detach_from_parent(key) {
                    Some(parent) => Some(parent),
                    None => {
                        log::debug!("Queued detach of {key:?} had no parent");
                        continue;
                    }
                },
                GraphEdit::Remove(key) => {
                    let parent = self.parent(key);
                    if self.remove(key).is_err() {
                        log::debug!("Queued removal of {key:?} skipped, already gone");
                        continue;
                    }
                    parent
                }
            };

            applied += 1;
            if let Some(parent) = former_parent {
                self.update_world_bound(parent);
                self.propagate_bound_to_root(parent);
            }
        }

        if applied > 0 {
            log::debug!("Applied {applied} deferred graph edits");
        }
        applied
    }

    fn set_locks(&mut self, key: SpatialKey, mode: LockedMode, locked: bool) -> SceneResult<()> {
        self.spatial(key)?;
        for spatial in self.subtree(key) {
            if let Some(spatial) = self.spatials.get_mut(spatial) {
                spatial.locks.set(mode, locked);
            }
        }
        Ok(())
    }

    /// Bring the subtree's bounds up to date, then freeze them.
    ///
    /// # Errors
    ///
    /// [`crate::SceneError::SpatialNotFound`] for a stale key.
    pub fn lock_bounds(&mut self, key: SpatialKey) -> SceneResult<()> {
        self.update_geometric_state(key, 0.0, true)?;
        self.set_locks(key, LockedMode::BOUNDS, true)
    }

    /// Allow bound updates in the subtree again.
    ///
    /// # Errors
    ///
    /// [`crate::SceneError::SpatialNotFound`] for a stale key.
    pub fn unlock_bounds(&mut self, key: SpatialKey) -> SceneResult<()> {
        self.set_locks(key, LockedMode::BOUNDS, false)
    }

    /// Bring the subtree's world transforms up to date, then freeze them.
    ///
    /// # Errors
    ///
    /// [`crate::SceneError::SpatialNotFound`] for a stale key.
    pub fn lock_transforms(&mut self, key: SpatialKey) -> SceneResult<()> {
        self.spatial(key)?;
        for spatial in self.subtree(key) {
            self.update_world_vectors(spatial);
        }
        self.set_locks(key, LockedMode::TRANSFORMS, true)
    }

    /// Allow world transform updates in the subtree again.
    ///
    /// # Errors
    ///
    /// [`crate::SceneError::SpatialNotFound`] for a stale key.
    pub fn unlock_transforms(&mut self, key: SpatialKey) -> SceneResult<()> {
        self.set_locks(key, LockedMode::TRANSFORMS, false)
    }

    /// Resolve the subtree's render states, then mark its mesh data static
    /// for the renderer.
    ///
    /// # Errors
    ///
    /// [`crate::SceneError::SpatialNotFound`] for a stale key.
    pub fn lock_meshes(&mut self, key: SpatialKey, ctx: &RenderContext) -> SceneResult<()> {
        self.update_render_state(key, ctx)?;
        self.set_locks(key, LockedMode::MESH_DATA, true)
    }

    /// Clear the static mesh hint in the subtree.
    ///
    /// # Errors
    ///
    /// [`crate::SceneError::SpatialNotFound`] for a stale key.
    pub fn unlock_meshes(&mut self, key: SpatialKey) -> SceneResult<()> {
        self.set_locks(key, LockedMode::MESH_DATA, false)
    }

    /// Mark the subtree's shadow volumes static for the renderer.
    ///
    /// # Errors
    ///
    /// [`crate::SceneError::SpatialNotFound`] for a stale key.
    pub fn lock_shadows(&mut self, key: SpatialKey) -> SceneResult<()> {
        self.set_locks(key, LockedMode::SHADOWS, true)
    }

    /// Clear the static shadow hint in the subtree.
    ///
    /// # Errors
    ///
    /// [`crate::SceneError::SpatialNotFound`] for a stale key.
    pub fn unlock_shadows(&mut self, key: SpatialKey) -> SceneResult<()> {
        self.set_locks(key, LockedMode::SHADOWS, false)
    }

    /// Skip the subtree entirely during geometric updates.
    ///
    /// # Errors
    ///
    /// [`crate::SceneError::SpatialNotFound`] for a stale key.
    pub fn lock_branch(&mut self, key: SpatialKey) -> SceneResult<()> {
        self.set_locks(key, LockedMode::BRANCH, true)
    }

    /// Include the subtree in geometric updates again.
    ///
    /// # Errors
    ///
    /// [`crate::SceneError::SpatialNotFound`] for a stale key.
    pub fn unlock_branch(&mut self, key: SpatialKey) -> SceneResult<()> {
        self.set_locks(key, LockedMode::BRANCH, false)
    }

    /// Lock bounds, transforms, meshes and shadows of the subtree
    ///
    /// # Errors
    ///
    /// [`crate::SceneError::SpatialNotFound`] for a stale key.
    pub fn lock_all(&mut self, key: SpatialKey, ctx: &RenderContext) -> SceneResult<()> {
        self.lock_bounds(key)?;
        self.lock_transforms(key)?;
        self.lock_meshes(key, ctx)?;
        self.lock_shadows(key)
    }

    /// Clear every lock flag in the subtree
    ///
    /// # Errors
    ///
    /// [`crate::SceneError::SpatialNotFound`] for a stale key.
    pub fn unlock_all(&mut self, key: SpatialKey) -> SceneResult<()> {
        self.set_locks(key, LockedMode::all(), false)
    }
}
