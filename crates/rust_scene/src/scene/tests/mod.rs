//! Scene graph behaviour tests spanning several modules

mod controllers;
mod render_states;

use super::draw::{DrawItem, Renderer};
use super::geometry::{Geometry, GeometryBatch};
use super::graph::SceneGraph;
use super::modes::NormalsMode;
use super::render_context::RenderContext;
use crate::bounding::{BoundingBox, BoundingSphere, BoundingVolume};
use crate::foundation::collections::SpatialKey;
use crate::foundation::math::{Transform, Vec3};

pub const EPSILON: f32 = 1e-5;

/// Renderer that records what it was asked to draw
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    pub drawn: Vec<String>,
    pub items: Vec<DrawItem>,
    pub bounds: Vec<SpatialKey>,
    pub ortho_passes: usize,
}

impl Renderer for RecordingRenderer {
    fn draw(&mut self, item: &DrawItem) {
        self.drawn.push(item.name.clone());
        self.items.push(item.clone());
    }

    fn draw_bounds(&mut self, key: SpatialKey, _bound: &BoundingVolume) {
        self.bounds.push(key);
    }

    fn set_ortho(&mut self) {
        self.ortho_passes += 1;
    }
}

pub fn draw_item(name: &str, translation: Vec3, z_order: i32) -> DrawItem {
    DrawItem {
        key: SpatialKey::default(),
        name: name.to_owned(),
        world: Transform::from_translation(translation),
        world_bound: None,
        states: RenderContext::new().effective_states(None),
        normals_mode: NormalsMode::ROOT_DEFAULT,
        mesh_locked: false,
        shadows_locked: false,
        z_order,
        batch_count: 1,
    }
}

fn leaf_with_bound(graph: &mut SceneGraph, name: &str, bound: BoundingVolume) -> SpatialKey {
    let mut batch = GeometryBatch::new(vec![Vec3::zeros()]);
    batch.set_model_bound(bound);
    graph.create_geometry(name, Geometry::from_batch(batch))
}

/// Leaf whose model bound is a sphere of `radius` around its origin
pub fn sphere_leaf(graph: &mut SceneGraph, name: &str, radius: f32) -> SpatialKey {
    leaf_with_bound(graph, name, BoundingSphere::new(Vec3::zeros(), radius).into())
}

/// Leaf whose model bound is a cube with half extent `extent`
pub fn box_leaf(graph: &mut SceneGraph, name: &str, extent: f32) -> SpatialKey {
    leaf_with_bound(graph, name, BoundingBox::from_center_extents(Vec3::zeros(), Vec3::repeat(extent)).into())
}

/// `sphere_leaf` attached under `parent` at `translation`
pub fn place_sphere(graph: &mut SceneGraph, parent: SpatialKey, name: &str, translation: Vec3) -> SpatialKey {
    let leaf = sphere_leaf(graph, name, 1.0);
    graph.attach_child(parent, leaf).unwrap();
    graph.get_mut(leaf).unwrap().set_local_translation(translation);
    leaf
}
