//! Leaf payload: geometry batches
//!
//! Vertex and index buffers for rendering live with the backend. A batch keeps
//! the local vertex positions it needs to fit its model bound.

use super::render_context::ResolvedStates;
use crate::bounding::{BoundingVolume, SpherePolicy};
use crate::error::{SceneError, SceneResult};
use crate::foundation::math::{Transform, Vec3};
use std::mem;

/// One drawable batch of a geometry
#[derive(Debug, Clone, PartialEq)]
pub struct GeometryBatch {
    vertices: Vec<Vec3>,
    indices: Vec<u32>,
    model_bound: Option<BoundingVolume>,
    world_bound: Option<BoundingVolume>,
    /// Disabled batches are neither drawn nor included in the world bound
    pub enabled: bool,
}

impl GeometryBatch {
    /// Non-indexed batch
    pub fn new(vertices: Vec<Vec3>) -> Self {
        Self {
            vertices,
            indices: Vec::new(),
            model_bound: None,
            world_bound: None,
            enabled: true,
        }
    }

    /// Indexed batch.
    ///
    /// # Errors
    ///
    /// [`SceneError::InvalidIndex`] if an index names a missing vertex.
    pub fn from_indexed(vertices: Vec<Vec3>, indices: Vec<u32>) -> SceneResult<Self> {
        let mut batch = Self::new(vertices);
        batch.set_indices(indices)?;
        Ok(batch)
    }

    /// Replace the index buffer, validating every index.
    ///
    /// # Errors
    ///
    /// [`SceneError::InvalidIndex`] if an index names a missing vertex; the
    /// previous indices are kept.
    pub fn set_indices(&mut self, indices: Vec<u32>) -> SceneResult<()> {
        let vertex_count = self.vertices.len();
        if let Some(&index) = indices.iter().find(|&&i| i as usize >= vertex_count) {
            return Err(SceneError::InvalidIndex { index, vertex_count });
        }
        self.indices = indices;
        Ok(())
    }

    /// Replace vertex positions. Indices that no longer fit are dropped and
    /// the model bound is not refitted until [`GeometryBatch::update_model_bound`].
    pub fn set_vertices(&mut self, vertices: Vec<Vec3>) {
        self.vertices = vertices;
        let vertex_count = self.vertices.len();
        if self.indices.iter().any(|&i| i as usize >= vertex_count) {
            log::warn!("Vertex buffer shrank below index range, clearing {} indices", self.indices.len());
            self.indices.clear();
        }
    }

    /// Local vertex positions
    pub fn vertices(&self) -> &[Vec3] {
        &self.vertices
    }

    /// Index buffer
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Number of triangles described by the indices
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Bound in local space
    pub const fn model_bound(&self) -> Option<&BoundingVolume> {
        self.model_bound.as_ref()
    }

    /// Set the kind of local bound; call [`GeometryBatch::update_model_bound`]
    /// to fit it
    pub fn set_model_bound(&mut self, bound: BoundingVolume) {
        self.model_bound = Some(bound);
    }

    /// Refit the model bound to the vertices
    pub fn update_model_bound(&mut self, policy: SpherePolicy) {
        if let Some(bound) = &mut self.model_bound {
            bound.compute_from_points_with(&self.vertices, policy);
        }
    }

    /// Bound in world space as of the last update
    pub const fn world_bound(&self) -> Option<&BoundingVolume> {
        self.world_bound.as_ref()
    }

    fn update_world_bound(&mut self, world: &Transform) {
        let Some(model) = &self.model_bound else {
            return;
        };

        match &mut self.world_bound {
            Some(store) if mem::discriminant(&*store) == mem::discriminant(model) => {
                model.transform_into(&world.rotation, &world.translation, &world.scale, store);
            }
            slot => *slot = Some(model.transform(&world.rotation, &world.translation, &world.scale)),
        }
    }
}

/// Geometry payload of a leaf spatial
#[derive(Debug, Clone, Default)]
pub struct Geometry {
    batches: Vec<GeometryBatch>,
    resolved_states: Option<ResolvedStates>,
}

impl Geometry {
    /// Geometry without batches
    pub fn new() -> Self {
        Self::default()
    }

    /// Geometry with one batch
    pub fn from_batch(batch: GeometryBatch) -> Self {
        Self {
            batches: vec![batch],
            resolved_states: None,
        }
    }

    /// Append a batch, returning its index
    pub fn add_batch(&mut self, batch: GeometryBatch) -> usize {
        self.batches.push(batch);
        self.batches.len() - 1
    }

    /// Remove a batch.
    ///
    /// # Errors
    ///
    /// [`SceneError::BatchIndexOutOfRange`] for a bad index.
    pub fn remove_batch(&mut self, index: usize) -> SceneResult<GeometryBatch> {
        if index >= self.batches.len() {
            return Err(SceneError::BatchIndexOutOfRange {
                index,
                len: self.batches.len(),
            });
        }
        Ok(self.batches.remove(index))
    }

    /// Batch by index
    pub fn batch(&self, index: usize) -> Option<&GeometryBatch> {
        self.batches.get(index)
    }

    /// Mutable batch by index
    pub fn batch_mut(&mut self, index: usize) -> Option<&mut GeometryBatch> {
        self.batches.get_mut(index)
    }

    /// All batches
    pub fn batches(&self) -> &[GeometryBatch] {
        &self.batches
    }

    /// Number of batches
    pub fn batch_count(&self) -> usize {
        self.batches.len()
    }

    /// Total vertices over all batches
    pub fn vertex_count(&self) -> usize {
        self.batches.iter().map(|b| b.vertices.len()).sum()
    }

    /// Total triangles over all batches
    pub fn triangle_count(&self) -> usize {
        self.batches.iter().map(GeometryBatch::triangle_count).sum()
    }

    /// Give every batch a model bound of this kind
    pub fn set_model_bound(&mut self, bound: BoundingVolume) {
        for batch in &mut self.batches {
            batch.set_model_bound(bound);
        }
    }

    /// Refit every batch's model bound
    pub fn update_model_bound(&mut self, policy: SpherePolicy) {
        for batch in &mut self.batches {
            batch.update_model_bound(policy);
        }
    }

    /// Move every enabled batch's bound into world space and return their
    /// union, or `None` when no enabled batch has a bound
    pub(crate) fn update_world_bound(&mut self, world: &Transform) -> Option<BoundingVolume> {
        self.batches
            .iter_mut()
            .filter(|batch| batch.enabled)
            .filter_map(|batch| {
                batch.update_world_bound(world);
                batch.world_bound
            })
            .reduce(|merged, bound| merged.merge_enclosing(&bound))
    }

    /// States from the last render-state update
    pub const fn resolved_states(&self) -> Option<&ResolvedStates> {
        self.resolved_states.as_ref()
    }

    pub(crate) fn set_resolved_states(&mut self, states: ResolvedStates) {
        self.resolved_states = Some(states);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bounding::{BoundingBox, BoundingSphere};
    use approx::assert_relative_eq;

    fn quad() -> Vec<Vec3> {
        vec![
            Vec3::new(-1.0, -1.0, 0.0),
            Vec3::new(1.0, -1.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(-1.0, 1.0, 0.0),
        ]
    }

    #[test]
    fn test_indices_are_validated() {
        let err = GeometryBatch::from_indexed(quad(), vec![0, 1, 4]).unwrap_err();
        assert_eq!(err, SceneError::InvalidIndex { index: 4, vertex_count: 4 });

        let batch = GeometryBatch::from_indexed(quad(), vec![0, 1, 2, 0, 2, 3]).unwrap();
        assert_eq!(batch.triangle_count(), 2);
    }

    #[test]
    fn test_world_bound_is_union_of_enabled_batches() {
        let mut geometry = Geometry::new();
        geometry.add_batch(GeometryBatch::new(quad()));
        let far = geometry.add_batch(GeometryBatch::new(quad().iter().map(|v| v + Vec3::new(10.0, 0.0, 0.0)).collect()));
        geometry.set_model_bound(BoundingVolume::aabb());
        geometry.update_model_bound(SpherePolicy::ContainAabb);

        let bound = geometry.update_world_bound(&Transform::identity()).unwrap();
        assert_relative_eq!(bound.as_box().unwrap().max, Vec3::new(11.0, 1.0, 0.0));

        geometry.batch_mut(far).unwrap().enabled = false;
        let bound = geometry.update_world_bound(&Transform::identity()).unwrap();
        assert_relative_eq!(bound.as_box().unwrap().max, Vec3::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn test_changing_bound_kind_replaces_world_bound() {
        let mut batch = GeometryBatch::new(quad());
        batch.set_model_bound(BoundingBox::default().into());
        batch.update_model_bound(SpherePolicy::ContainAabb);
        batch.update_world_bound(&Transform::identity());
        assert!(batch.world_bound().unwrap().as_box().is_some());

        batch.set_model_bound(BoundingSphere::default().into());
        batch.update_model_bound(SpherePolicy::ContainAabb);
        batch.update_world_bound(&Transform::from_translation(Vec3::new(0.0, 0.0, 3.0)));
        let sphere = *batch.world_bound().unwrap().as_sphere().unwrap();
        assert_relative_eq!(sphere.center, Vec3::new(0.0, 0.0, 3.0));
        assert_relative_eq!(sphere.radius, 2.0_f32.sqrt());
    }

    #[test]
    fn test_remove_batch_out_of_range() {
        let mut geometry = Geometry::from_batch(GeometryBatch::new(quad()));
        assert!(geometry.remove_batch(3).is_err());
        assert!(geometry.remove_batch(0).is_ok());
        assert_eq!(geometry.batch_count(), 0);
    }
}
