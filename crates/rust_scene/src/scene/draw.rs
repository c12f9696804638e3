//! Draw traversal with frustum culling
//!
//! The renderer backend lives outside this crate. A traversal culls
//! subtrees against the camera, routes visible leaves either straight to the
//! [`Renderer`] or into a [`RenderQueue`] bucket, and flushes the queue at
//! the end.

use super::culling::{Camera, FrustumIntersect};
use super::graph::SceneGraph;
use super::modes::{CullMode, LockedMode, NormalsMode, RenderQueueMode};
use super::render_context::{RenderContext, ResolvedStates};
use super::render_queue::RenderQueue;
use crate::bounding::BoundingVolume;
use crate::error::SceneResult;
use crate::foundation::collections::SpatialKey;
use crate::foundation::math::Transform;

/// Everything a backend needs to draw one leaf
#[derive(Debug, Clone)]
pub struct DrawItem {
    /// Leaf being drawn
    pub key: SpatialKey,
    /// Leaf name
    pub name: String,
    /// World transform
    pub world: Transform,
    /// World bound, if any
    pub world_bound: Option<BoundingVolume>,
    /// States to bind, with enforced and default states applied
    pub states: ResolvedStates,
    /// Normal handling hint
    pub normals_mode: NormalsMode,
    /// Mesh data is locked and may be cached
    pub mesh_locked: bool,
    /// Shadow volumes are locked and may be cached
    pub shadows_locked: bool,
    /// Ortho bucket ordering key
    pub z_order: i32,
    /// Enabled batches to draw
    pub batch_count: usize,
}

/// Backend that turns draw items into pixels
pub trait Renderer {
    /// Draw one leaf
    fn draw(&mut self, item: &DrawItem);

    /// Draw a debug outline of a world bound
    fn draw_bounds(&mut self, _key: SpatialKey, _bound: &BoundingVolume) {}

    /// Switch to screen-space projection before the ortho bucket
    fn set_ortho(&mut self) {}

    /// Restore the previous projection after the ortho bucket
    fn unset_ortho(&mut self) {}
}

/// Modes handed down the traversal so each spatial resolves its own in O(1)
#[derive(Debug, Clone, Copy)]
struct InheritedModes {
    cull: CullMode,
    queue: RenderQueueMode,
    normals: NormalsMode,
}

impl InheritedModes {
    fn child(self, cull: CullMode, queue: RenderQueueMode, normals: NormalsMode) -> Self {
        Self {
            cull: if cull == CullMode::Inherit { self.cull } else { cull },
            queue: if queue == RenderQueueMode::Inherit { self.queue } else { queue },
            normals: if normals == NormalsMode::Inherit { self.normals } else { normals },
        }
    }
}

struct DrawPass<'a, R: ?Sized> {
    camera: &'a mut Camera,
    ctx: &'a RenderContext,
    queue: &'a mut RenderQueue,
    renderer: &'a mut R,
}

impl SceneGraph {
    /// Draw the subtree at `root` as seen from `camera`.
    ///
    /// Transforms, bounds and render states should be current; see
    /// [`SceneGraph::update_geometric_state`] and
    /// [`SceneGraph::update_render_state`].
    ///
    /// # Errors
    ///
    /// [`crate::SceneError::SpatialNotFound`] for a stale key.
    pub fn draw<R: Renderer + ?Sized>(
        &mut self,
        root: SpatialKey,
        camera: &mut Camera,
        ctx: &RenderContext,
        renderer: &mut R,
    ) -> SceneResult<()> {
        let mut queue = RenderQueue::new();
        self.draw_into(root, camera, ctx, &mut queue, renderer)?;
        queue.flush(renderer);
        Ok(())
    }

    /// Like [`SceneGraph::draw`] but queued leaves stay in `queue`, so
    /// several subtrees can share one flush.
    ///
    /// # Errors
    ///
    /// [`crate::SceneError::SpatialNotFound`] for a stale key.
    pub fn draw_into<R: Renderer + ?Sized>(
        &mut self,
        root: SpatialKey,
        camera: &mut Camera,
        ctx: &RenderContext,
        queue: &mut RenderQueue,
        renderer: &mut R,
    ) -> SceneResult<()> {
        self.spatial(root)?;

        let inherited = match self.parent(root) {
            Some(parent) => InheritedModes {
                cull: self.resolved_cull_mode(parent),
                queue: self.resolved_render_queue_mode(parent),
                normals: self.resolved_normals_mode(parent),
            },
            None => InheritedModes {
                cull: CullMode::ROOT_DEFAULT,
                queue: RenderQueueMode::ROOT_DEFAULT,
                normals: NormalsMode::ROOT_DEFAULT,
            },
        };
        let parent_intersection = self
            .parent(root)
            .and_then(|p| self.spatials.get(p))
            .map_or(FrustumIntersect::Intersects, |p| p.last_frustum_intersection);

        let mut pass = DrawPass {
            camera,
            ctx,
            queue,
            renderer,
        };
        self.on_draw(root, inherited, parent_intersection, &mut pass);
        Ok(())
    }

    fn on_draw<R: Renderer + ?Sized>(
        &mut self,
        key: SpatialKey,
        inherited: InheritedModes,
        parent_intersection: FrustumIntersect,
        pass: &mut DrawPass<'_, R>,
    ) {
        let Some(spatial) = self.spatials.get(key) else {
            return;
        };
        let modes = inherited.child(spatial.cull_mode, spatial.render_queue_mode, spatial.normals_mode);

        let saved_plane_state = pass.camera.plane_state();
        let intersection = match modes.cull {
            CullMode::Always => FrustumIntersect::Outside,
            CullMode::Never => FrustumIntersect::Intersects,
            CullMode::Dynamic | CullMode::Inherit => {
                if parent_intersection == FrustumIntersect::Intersects {
                    pass.camera.contains(spatial.world_bound())
                } else {
                    parent_intersection
                }
            }
        };

        if let Some(spatial) = self.spatials.get_mut(key) {
            spatial.last_frustum_intersection = intersection;
        }

        if intersection != FrustumIntersect::Outside {
            self.draw_spatial(key, modes, intersection, pass);
        } else {
            log::trace!("Culled {key:?}");
        }

        pass.camera.set_plane_state(saved_plane_state);
    }

    fn draw_spatial<R: Renderer + ?Sized>(
        &mut self,
        key: SpatialKey,
        modes: InheritedModes,
        intersection: FrustumIntersect,
        pass: &mut DrawPass<'_, R>,
    ) {
        let Some(spatial) = self.spatials.get(key) else {
            return;
        };

        if self.config.draw_bounds {
            if let Some(bound) = spatial.world_bound() {
                pass.renderer.draw_bounds(key, bound);
            }
        }

        let Some(geometry) = spatial.as_geometry() else {
            for child in spatial.children().to_vec() {
                self.on_draw(child, modes, intersection, pass);
            }
            return;
        };

        let item = DrawItem {
            key,
            name: spatial.name().to_owned(),
            world: spatial.world,
            world_bound: spatial.world_bound,
            states: pass.ctx.effective_states(geometry.resolved_states()),
            normals_mode: modes.normals,
            mesh_locked: spatial.is_locked(LockedMode::MESH_DATA),
            shadows_locked: spatial.is_locked(LockedMode::SHADOWS),
            z_order: spatial.z_order,
            batch_count: geometry.batches().iter().filter(|b| b.enabled).count(),
        };

        if let Some(item) = pass.queue.add(modes.queue, item, &pass.camera.location) {
            pass.renderer.draw(&item);
        }
    }

    /// Hand the world bound of every spatial under `key` to the renderer
    pub fn draw_bounds<R: Renderer + ?Sized>(&self, key: SpatialKey, renderer: &mut R) {
        for spatial in self.subtree(key) {
            if let Some(bound) = self.spatials.get(spatial).and_then(|s| s.world_bound()) {
                renderer.draw_bounds(spatial, bound);
            }
        }
    }
}
