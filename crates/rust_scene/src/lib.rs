//! # Rust Scene
//!
//! A retained-mode scene graph core: a spatial hierarchy with derived world
//! transforms, bounding volumes and render-state resolution.
//!
//! ## Features
//!
//! - **Spatial Hierarchy**: Nodes and geometry leaves in a keyed arena
//! - **Bounding Volumes**: Spheres and boxes merged up the tree
//! - **Render States**: Per-category stacks resolved at every leaf
//! - **Culling**: Frustum tests with plane masking and a sorted render queue
//! - **Controllers**: Time-driven behaviours with deferred structural edits
//! - **Persistence**: Subtrees saved to and loaded from RON capsules
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use rust_scene::prelude::*;
//!
//! struct Printer;
//!
//! impl Renderer for Printer {
//!     fn draw(&mut self, item: &DrawItem) {
//!         println!("draw {}", item.name);
//!     }
//! }
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut graph = SceneGraph::new();
//!     let root = graph.create_node("root");
//!     let ball = graph.create_geometry("ball", Geometry::new());
//!     graph.attach_child(root, ball)?;
//!     graph.get_mut(ball).ok_or("ball vanished")?.add_controller(SpinController::new(Vec3::y(), 1.0));
//!
//!     let ctx = RenderContext::new();
//!     graph.update_geometric_state(root, 0.016, true)?;
//!     graph.update_render_state(root, &ctx)?;
//!
//!     let mut camera = Camera::perspective(Vec3::new(0.0, 0.0, 10.0), Vec3::zeros(), Vec3::y(), 60.0, 1.0, 0.1, 100.0)
//!         .ok_or("degenerate camera")?;
//!     graph.draw(root, &mut camera, &ctx, &mut Printer)?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod bounding;
pub mod config;
pub mod foundation;
pub mod intersection;
pub mod scene;

mod error;

pub use error::{BoundError, CapsuleError, SceneError, SceneResult};

/// Common imports for scene users
pub mod prelude {
    pub use crate::{
        bounding::{BoundingBox, BoundingSphere, BoundingVolume, SpherePolicy},
        config::{Config, SceneConfig},
        foundation::{
            collections::SpatialKey,
            math::{Mat4, Quat, Transform, Vec3},
        },
        intersection::{CollisionResults, PickResults, Ray},
        scene::{
            Camera, Capsule, CombineMode, Controller, ControllerContext, CullMode, DrawItem, Geometry, GeometryBatch,
            LockedMode, NormalsMode, RenderContext, RenderQueue, RenderQueueMode, RenderState, RenderStateType,
            Renderer, Savable, SceneGraph, Spatial, SpinController, StateData,
        },
        BoundError, CapsuleError, SceneError, SceneResult,
    };
}
