//! Time-driven mutators attached to spatials
//!
//! Controllers run once per geometric update, in attachment order, before the
//! spatial's world transform is recomputed. They may change their spatial's
//! local transform right away; structural changes are queued as
//! [`GraphEdit`]s and applied once the initiating update has finished.

use crate::foundation::collections::SpatialKey;
use crate::foundation::math::{Quat, Transform, Unit, Vec3};
use std::fmt;

/// A per-frame behaviour attached to a spatial
pub trait Controller: fmt::Debug {
    /// Advance by `time` seconds (already multiplied by the slot's speed)
    fn update(&mut self, time: f32, ctx: &mut ControllerContext<'_>);
}

/// Structural change requested during a traversal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphEdit {
    /// Detach the spatial from its parent, keeping it in the graph
    Detach(SpatialKey),
    /// Detach and drop the spatial with its subtree
    Remove(SpatialKey),
}

/// A controller plus its run settings
#[derive(Debug)]
pub struct ControllerSlot {
    controller: Box<dyn Controller>,
    /// Inactive controllers are skipped
    pub active: bool,
    /// Multiplier applied to the update time
    pub speed: f32,
}

impl ControllerSlot {
    /// Active slot running at normal speed
    pub fn new(controller: Box<dyn Controller>) -> Self {
        Self {
            controller,
            active: true,
            speed: 1.0,
        }
    }

    /// The wrapped controller
    pub fn controller(&self) -> &dyn Controller {
        self.controller.as_ref()
    }

    /// Run the controller. Returns false when it asked to be removed.
    pub(crate) fn run(&mut self, time: f32, ctx: &mut ControllerContext<'_>) -> bool {
        if !self.active {
            return true;
        }
        ctx.finished = false;
        self.controller.update(time * self.speed, ctx);
        !ctx.finished
    }
}

/// What a controller may touch while it runs
pub struct ControllerContext<'a> {
    spatial: SpatialKey,
    local: &'a mut Transform,
    edits: &'a mut Vec<GraphEdit>,
    finished: bool,
}

impl<'a> ControllerContext<'a> {
    pub(crate) fn new(spatial: SpatialKey, local: &'a mut Transform, edits: &'a mut Vec<GraphEdit>) -> Self {
        Self {
            spatial,
            local,
            edits,
            finished: false,
        }
    }

    /// Key of the spatial being updated
    pub const fn spatial(&self) -> SpatialKey {
        self.spatial
    }

    /// Local transform of the spatial
    pub fn local_transform(&self) -> &Transform {
        &*self.local
    }

    /// Mutable local transform of the spatial
    pub fn local_transform_mut(&mut self) -> &mut Transform {
        &mut *self.local
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

    /// Remove this controller once the current pass over the spatial's
    /// controllers completes
    pub fn finish(&mut self) {
        self.finished = true;
    }

    /// Queue a detach of `key` from its parent
    pub fn detach(&mut self, key: SpatialKey) {
        self.edits.push(GraphEdit::Detach(key));
    }

    /// Queue a detach of the spatial being updated
    pub fn detach_spatial(&mut self) {
        self.detach(self.spatial);
    }

    /// Queue removal of `key` and its subtree
    pub fn remove(&mut self, key: SpatialKey) {
        self.edits.push(GraphEdit::Remove(key));
    }
}

impl fmt::Debug for ControllerContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControllerContext")
            .field("spatial", &self.spatial)
            .field("pending_edits", &self.edits.len())
            .finish_non_exhaustive()
    }
}

/// Spins its spatial about a fixed axis
#[derive(Debug, Clone)]
pub struct SpinController {
    axis: Unit<Vec3>,
    radians_per_second: f32,
}

impl SpinController {
    /// Spin about `axis` at the given rate
    pub fn new(axis: Vec3, radians_per_second: f32) -> Self {
        Self {
            axis: Unit::new_normalize(axis),
            radians_per_second,
        }
    }
}

impl Controller for SpinController {
    fn update(&mut self, time: f32, ctx: &mut ControllerContext<'_>) {
        let step = Quat::from_axis_angle(&self.axis, self.radians_per_second * time);
        let local = ctx.local_transform_mut();
        local.rotation = step * local.rotation;
    }
}
