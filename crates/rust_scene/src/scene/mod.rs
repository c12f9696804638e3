//! Scene graph
//!
//! A tree of spatials whose world transforms, bounds and render states are
//! derived from their ancestors.
//!
//! ## Frame flow
//!
//! ```text
//! update_geometric_state   controllers, world transforms, world bounds
//!      ↓
//! update_render_state      state stacks resolved at every leaf
//!      ↓
//! draw                     frustum culling, render queue, Renderer
//! ```
//!
//! Node and geometry spatials share one [`Spatial`] record stored in the
//! [`SceneGraph`] arena. Inheritable modes resolve by walking to the nearest
//! ancestor that sets them.

mod capsule;
mod controller;
mod culling;
mod draw;
mod geometry;
mod graph;
mod modes;
mod render_context;
mod render_queue;
mod render_state;
mod resolve;
mod spatial;
mod update;

#[cfg(test)]
mod tests;

pub use capsule::{Capsule, CapsuleValue, Savable};
pub use controller::{Controller, ControllerContext, ControllerSlot, GraphEdit, SpinController};
pub use culling::{planes, Camera, Frustum, FrustumIntersect};
pub use draw::{DrawItem, Renderer};
pub use geometry::{Geometry, GeometryBatch};
pub use graph::{Ancestors, SceneGraph};
pub use modes::{CombineMode, CullMode, LightCombineMode, LockedMode, NormalsMode, RenderQueueMode, TextureCombineMode};
pub use render_context::{RenderContext, ResolvedStates};
pub use render_queue::RenderQueue;
pub use render_state::{
    AlphaState, CompareFunction, CullFace, FogState, Light, LightKind, LightState, MaterialState, RenderState,
    RenderStateType, StateData, StencilState, Texture, TextureState, ZBufferState,
};
pub use spatial::{Spatial, SpatialKind};
