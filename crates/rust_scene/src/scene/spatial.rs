//! The record stored for every element of the hierarchy

use super::controller::{Controller, ControllerSlot};
use super::culling::FrustumIntersect;
use super::geometry::Geometry;
use super::modes::{CombineMode, CullMode, LockedMode, NormalsMode, RenderQueueMode};
use super::render_state::{RenderState, RenderStateType};
use crate::bounding::BoundingVolume;
use crate::foundation::collections::SpatialKey;
use crate::foundation::math::{Quat, Transform, Vec3};
use std::sync::Arc;

/// Payload distinguishing inner nodes from leaves
#[derive(Debug)]
pub enum SpatialKind {
    /// Inner node with ordered children
    Node {
        /// Child keys in draw order
        children: Vec<SpatialKey>,
    },
    /// Leaf with geometry batches
    Geometry(Geometry),
}

/// One element of a [`crate::scene::SceneGraph`].
///
/// Local transform and modes are set directly; world data is derived by the
/// graph's update passes.
#[derive(Debug)]
pub struct Spatial {
    name: String,
    pub(crate) parent: Option<SpatialKey>,
    pub(crate) kind: SpatialKind,

    /// Placement relative to the parent
    pub local: Transform,
    pub(crate) world: Transform,
    pub(crate) world_bound: Option<BoundingVolume>,

    /// Frustum culling policy
    pub cull_mode: CullMode,
    /// Render bucket
    pub render_queue_mode: RenderQueueMode,
    /// How light states are combined
    pub light_combine_mode: CombineMode,
    /// How texture states are combined
    pub texture_combine_mode: CombineMode,
    /// Normal handling hint for the renderer
    pub normals_mode: NormalsMode,
    /// Ordering key inside the ortho bucket
    pub z_order: i32,
    /// Whether picking and collision queries consider this spatial
    pub collidable: bool,

    pub(crate) locks: LockedMode,
    pub(crate) last_frustum_intersection: FrustumIntersect,
    pub(crate) render_states: [Option<Arc<RenderState>>; RenderStateType::COUNT],
    pub(crate) controllers: Vec<ControllerSlot>,
}

impl Spatial {
    fn with_kind(name: impl Into<String>, kind: SpatialKind) -> Self {
        Self {
            name: name.into(),
            parent: None,
            kind,
            local: Transform::identity(),
            world: Transform::identity(),
            world_bound: None,
            cull_mode: CullMode::Inherit,
            render_queue_mode: RenderQueueMode::Inherit,
            light_combine_mode: CombineMode::Inherit,
            texture_combine_mode: CombineMode::Inherit,
            normals_mode: NormalsMode::Inherit,
            z_order: 0,
            collidable: true,
            locks: LockedMode::empty(),
            last_frustum_intersection: FrustumIntersect::Intersects,
            render_states: std::array::from_fn(|_| None),
            controllers: Vec::new(),
        }
    }

    /// Inner node without children
    pub fn node(name: impl Into<String>) -> Self {
        Self::with_kind(name, SpatialKind::Node { children: Vec::new() })
    }

    /// Leaf holding `geometry`
    pub fn geometry(name: impl Into<String>, geometry: Geometry) -> Self {
        Self::with_kind(name, SpatialKind::Geometry(geometry))
    }

    /// Name, not necessarily unique
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Parent key, `None` for roots
    pub const fn parent(&self) -> Option<SpatialKey> {
        self.parent
    }

    /// Node or geometry payload
    pub const fn kind(&self) -> &SpatialKind {
        &self.kind
    }

    /// True for inner nodes
    pub const fn is_node(&self) -> bool {
        matches!(self.kind, SpatialKind::Node { .. })
    }

    /// Children in order; empty for leaves
    pub fn children(&self) -> &[SpatialKey] {
        match &self.kind {
            SpatialKind::Node { children } => children.as_slice(),
            SpatialKind::Geometry(_) => &[],
        }
    }

    /// Geometry payload of a leaf
    pub const fn as_geometry(&self) -> Option<&Geometry> {
        match &self.kind {
            SpatialKind::Geometry(geometry) => Some(geometry),
            SpatialKind::Node { .. } => None,
        }
    }

    /// Mutable geometry payload of a leaf
    pub fn as_geometry_mut(&mut self) -> Option<&mut Geometry> {
        match &mut self.kind {
            SpatialKind::Geometry(geometry) => Some(geometry),
            SpatialKind::Node { .. } => None,
        }
    }

    /// Set the local translation
    pub fn set_local_translation(&mut self, translation: Vec3) {
        self.local.translation = translation;
    }

    /// Set the local rotation
    pub fn set_local_rotation(&mut self, rotation: Quat) {
        self.local.rotation = rotation;
    }

    /// Set the local scale
    pub fn set_local_scale(&mut self, scale: Vec3) {
        self.local.scale = scale;
    }

    /// Set a uniform local scale
    pub fn set_local_uniform_scale(&mut self, scale: f32) {
        self.local.scale = Vec3::repeat(scale);
    }

    /// World transform as of the last update
    pub const fn world_transform(&self) -> &Transform {
        &self.world
    }

    /// World translation as of the last update
    pub const fn world_translation(&self) -> Vec3 {
        self.world.translation
    }

    /// World rotation as of the last update
    pub const fn world_rotation(&self) -> Quat {
        self.world.rotation
    }

    /// World scale as of the last update
    pub const fn world_scale(&self) -> Vec3 {
        self.world.scale
    }

    /// World bound as of the last update; `None` before the first one
    pub const fn world_bound(&self) -> Option<&BoundingVolume> {
        self.world_bound.as_ref()
    }

    /// Active lock flags
    pub const fn locks(&self) -> LockedMode {
        self.locks
    }

    /// Is every flag in `mode` set
    pub const fn is_locked(&self, mode: LockedMode) -> bool {
        self.locks.contains(mode)
    }

    /// Result of the frustum test in the most recent draw
    pub const fn last_frustum_intersection(&self) -> FrustumIntersect {
        self.last_frustum_intersection
    }

    /// State set on this spatial for a category
    pub fn render_state(&self, ty: RenderStateType) -> Option<&Arc<RenderState>> {
        self.render_states[ty.index()].as_ref()
    }

    /// Set a state in its category's slot, returning the previous one
    pub fn set_render_state(&mut self, state: impl Into<Arc<RenderState>>) -> Option<Arc<RenderState>> {
        let state = state.into();
        let index = state.state_type().index();
        self.render_states[index].replace(state)
    }

    /// Clear a category's slot, returning the previous state
    pub fn clear_render_state(&mut self, ty: RenderStateType) -> Option<Arc<RenderState>> {
        self.render_states[ty.index()].take()
    }

    /// Attach a controller, returning its index
    pub fn add_controller(&mut self, controller: impl Controller + 'static) -> usize {
        self.controllers.push(ControllerSlot::new(Box::new(controller)));
        self.controllers.len() - 1
    }

    /// Detach a controller by index
    pub fn remove_controller(&mut self, index: usize) -> Option<ControllerSlot> {
        (index < self.controllers.len()).then(|| self.controllers.remove(index))
    }

    /// Attached controllers
    pub fn controllers(&self) -> &[ControllerSlot] {
        &self.controllers
    }

    /// Mutable access to a controller slot, to toggle or retime it
    pub fn controller_mut(&mut self, index: usize) -> Option<&mut ControllerSlot> {
        self.controllers.get_mut(index)
    }
}
