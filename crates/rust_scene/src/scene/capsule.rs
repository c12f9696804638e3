//! Key/value persistence for scene data
//!
//! A [`Capsule`] is a flat map of named values; nested objects are stored
//! as child capsules. Values equal to their defaults are not written, and
//! reading a missing field yields the default. The capsule itself derives
//! serde traits, so the byte encoding is up to the caller.

use super::geometry::{Geometry, GeometryBatch};
use super::graph::SceneGraph;
use super::modes::LockedMode;
use super::spatial::{Spatial, SpatialKind};
use crate::bounding::{BoundingBox, BoundingSphere, BoundingVolume};
use crate::error::{CapsuleError, SceneResult};
use crate::foundation::collections::SpatialKey;
use crate::foundation::math::{Quat, Quaternion, Transform, Vec3};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One stored value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CapsuleValue {
    /// Boolean
    Bool(bool),
    /// Integer
    Int(i64),
    /// Float
    Float(f32),
    /// Text, also used for serde-encoded enums
    Text(String),
    /// Vector
    Vec3([f32; 3]),
    /// Quaternion as `[i, j, k, w]`
    Quat([f32; 4]),
    /// Nested object
    Capsule(Box<Capsule>),
    /// Sequence of nested objects
    List(Vec<Capsule>),
    /// Sequence of vectors
    Vec3List(Vec<[f32; 3]>),
    /// Sequence of unsigned integers
    UintList(Vec<u32>),
}

impl CapsuleValue {
    const fn kind_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Text(_) => "text",
            Self::Vec3(_) => "vec3",
            Self::Quat(_) => "quat",
            Self::Capsule(_) => "capsule",
            Self::List(_) => "list",
            Self::Vec3List(_) => "vec3 list",
            Self::UintList(_) => "uint list",
        }
    }
}

/// Named values describing one object
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Capsule {
    values: BTreeMap<String, CapsuleValue>,
}

fn mismatch(field: &str, expected: &'static str) -> CapsuleError {
    CapsuleError::TypeMismatch {
        field: field.to_owned(),
        expected,
    }
}

impl Capsule {
    /// Empty capsule
    pub fn new() -> Self {
        Self::default()
    }

    /// Is a value stored under `name`
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Number of stored values
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Nothing stored
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Raw value under `name`
    pub fn value(&self, name: &str) -> Option<&CapsuleValue> {
        self.values.get(name)
    }

    fn put(&mut self, name: &str, value: CapsuleValue) {
        self.values.insert(name.to_owned(), value);
    }

    fn read_with<T>(
        &self,
        name: &str,
        default: T,
        expected: &'static str,
        extract: impl FnOnce(&CapsuleValue) -> Option<T>,
    ) -> Result<T, CapsuleError> {
        match self.values.get(name) {
            None => Ok(default),
            Some(value) => extract(value).ok_or_else(|| {
                log::debug!("Field '{name}' holds {} instead of {expected}", value.kind_name());
                mismatch(name, expected)
            }),
        }
    }

    /// Store a boolean unless it equals `default`
    pub fn write_bool(&mut self, name: &str, value: bool, default: bool) {
        if value != default {
            self.put(name, CapsuleValue::Bool(value));
        }
    }

    /// Read a boolean, `default` when absent.
    ///
    /// # Errors
    ///
    /// [`CapsuleError::TypeMismatch`] when another kind of value is stored.
    pub fn read_bool(&self, name: &str, default: bool) -> Result<bool, CapsuleError> {
        self.read_with(name, default, "bool", |v| match v {
            CapsuleValue::Bool(b) => Some(*b),
            _ => None,
        })
    }

    /// Store an integer unless it equals `default`
    pub fn write_int(&mut self, name: &str, value: i64, default: i64) {
        if value != default {
            self.put(name, CapsuleValue::Int(value));
        }
    }

    /// Read an integer, `default` when absent.
    ///
    /// # Errors
    ///
    /// [`CapsuleError::TypeMismatch`] when another kind of value is stored.
    pub fn read_int(&self, name: &str, default: i64) -> Result<i64, CapsuleError> {
        self.read_with(name, default, "int", |v| match v {
            CapsuleValue::Int(i) => Some(*i),
            _ => None,
        })
    }

    /// Store a float unless it equals `default`
    #[allow(clippy::float_cmp)]
    pub fn write_float(&mut self, name: &str, value: f32, default: f32) {
        if value != default {
            self.put(name, CapsuleValue::Float(value));
        }
    }

    /// Read a float, `default` when absent.
    ///
    /// # Errors
    ///
    /// [`CapsuleError::TypeMismatch`] when another kind of value is stored.
    pub fn read_float(&self, name: &str, default: f32) -> Result<f32, CapsuleError> {
        self.read_with(name, default, "float", |v| match v {
            CapsuleValue::Float(f) => Some(*f),
            _ => None,
        })
    }

    /// Store text unless it equals `default`
    pub fn write_text(&mut self, name: &str, value: &str, default: &str) {
        if value != default {
            self.put(name, CapsuleValue::Text(value.to_owned()));
        }
    }

    /// Read text, `default` when absent.
    ///
    /// # Errors
    ///
    /// [`CapsuleError::TypeMismatch`] when another kind of value is stored.
    pub fn read_text(&self, name: &str, default: &str) -> Result<String, CapsuleError> {
        self.read_with(name, default.to_owned(), "text", |v| match v {
            CapsuleValue::Text(t) => Some(t.clone()),
            _ => None,
        })
    }

    /// Store a vector unless it equals `default`
    pub fn write_vec3(&mut self, name: &str, value: &Vec3, default: &Vec3) {
        if value != default {
            self.put(name, CapsuleValue::Vec3([value.x, value.y, value.z]));
        }
    }

    /// Read a vector, `default` when absent.
    ///
    /// # Errors
    ///
    /// [`CapsuleError::TypeMismatch`] when another kind of value is stored.
    pub fn read_vec3(&self, name: &str, default: Vec3) -> Result<Vec3, CapsuleError> {
        self.read_with(name, default, "vec3", |v| match v {
            CapsuleValue::Vec3(xyz) => Some(Vec3::from(*xyz)),
            _ => None,
        })
    }

    /// Store a rotation unless it equals `default`
    pub fn write_quat(&mut self, name: &str, value: &Quat, default: &Quat) {
        if value != default {
            let q = value.quaternion();
            self.put(name, CapsuleValue::Quat([q.i, q.j, q.k, q.w]));
        }
    }

    /// Read a rotation, `default` when absent. Stored values are
    /// renormalized.
    ///
    /// # Errors
    ///
    /// [`CapsuleError::TypeMismatch`] when another kind of value is stored.
    pub fn read_quat(&self, name: &str, default: Quat) -> Result<Quat, CapsuleError> {
        self.read_with(name, default, "quat", |v| match v {
            CapsuleValue::Quat([i, j, k, w]) => Some(Quat::new_normalize(Quaternion::new(*w, *i, *j, *k))),
            _ => None,
        })
    }

    /// Store a nested capsule unless it is empty
    pub fn write_capsule(&mut self, name: &str, value: Self) {
        if !value.is_empty() {
            self.put(name, CapsuleValue::Capsule(Box::new(value)));
        }
    }

    /// Read a nested capsule, `None` when absent.
    ///
    /// # Errors
    ///
    /// [`CapsuleError::TypeMismatch`] when another kind of value is stored.
    pub fn read_capsule(&self, name: &str) -> Result<Option<&Self>, CapsuleError> {
        match self.values.get(name) {
            None => Ok(None),
            Some(CapsuleValue::Capsule(capsule)) => Ok(Some(capsule)),
            Some(_) => Err(mismatch(name, "capsule")),
        }
    }

    /// Store a list of capsules unless it is empty
    pub fn write_list(&mut self, name: &str, value: Vec<Self>) {
        if !value.is_empty() {
            self.put(name, CapsuleValue::List(value));
        }
    }

    /// Read a list of capsules, empty when absent.
    ///
    /// # Errors
    ///
    /// [`CapsuleError::TypeMismatch`] when another kind of value is stored.
    pub fn read_list(&self, name: &str) -> Result<&[Self], CapsuleError> {
        match self.values.get(name) {
            None => Ok(&[]),
            Some(CapsuleValue::List(list)) => Ok(list),
            Some(_) => Err(mismatch(name, "list")),
        }
    }

    /// Store vectors unless there are none
    pub fn write_vec3_list(&mut self, name: &str, value: &[Vec3]) {
        if !value.is_empty() {
            self.put(name, CapsuleValue::Vec3List(value.iter().map(|v| [v.x, v.y, v.z]).collect()));
        }
    }

    /// Read vectors, empty when absent.
    ///
    /// # Errors
    ///
    /// [`CapsuleError::TypeMismatch`] when another kind of value is stored.
    pub fn read_vec3_list(&self, name: &str) -> Result<Vec<Vec3>, CapsuleError> {
        self.read_with(name, Vec::new(), "vec3 list", |v| match v {
            CapsuleValue::Vec3List(list) => Some(list.iter().copied().map(Vec3::from).collect()),
            _ => None,
        })
    }

    /// Store unsigned integers unless there are none
    pub fn write_uint_list(&mut self, name: &str, value: &[u32]) {
        if !value.is_empty() {
            self.put(name, CapsuleValue::UintList(value.to_vec()));
        }
    }

    /// Read unsigned integers, empty when absent.
    ///
    /// # Errors
    ///
    /// [`CapsuleError::TypeMismatch`] when another kind of value is stored.
    pub fn read_uint_list(&self, name: &str) -> Result<Vec<u32>, CapsuleError> {
        self.read_with(name, Vec::new(), "uint list", |v| match v {
            CapsuleValue::UintList(list) => Some(list.clone()),
            _ => None,
        })
    }

    /// Store any serde value as RON text unless it equals `default`
    pub fn write_serde<T: Serialize + PartialEq>(&mut self, name: &str, value: &T, default: &T) {
        if value == default {
            return;
        }
        match ron::to_string(value) {
            Ok(text) => self.put(name, CapsuleValue::Text(text)),
            Err(e) => log::warn!("Skipping field '{name}': {e}"),
        }
    }

    /// Read a value written by [`Capsule::write_serde`], `default` when
    /// absent.
    ///
    /// # Errors
    ///
    /// [`CapsuleError::TypeMismatch`] for a non-text value and
    /// [`CapsuleError::InvalidValue`] when the text does not parse.
    pub fn read_serde<T: DeserializeOwned>(&self, name: &str, default: T) -> Result<T, CapsuleError> {
        match self.values.get(name) {
            None => Ok(default),
            Some(CapsuleValue::Text(text)) => ron::from_str(text).map_err(|e| CapsuleError::InvalidValue {
                field: name.to_owned(),
                reason: e.to_string(),
            }),
            Some(_) => Err(mismatch(name, "text")),
        }
    }

    /// Encode as pretty RON.
    ///
    /// # Errors
    ///
    /// [`CapsuleError::Encoding`] if serialization fails.
    pub fn to_ron(&self) -> Result<String, CapsuleError> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| CapsuleError::Encoding(e.to_string()))
    }

    /// Decode from RON.
    ///
    /// # Errors
    ///
    /// [`CapsuleError::Encoding`] if the text is not a capsule.
    pub fn from_ron(text: &str) -> Result<Self, CapsuleError> {
        ron::from_str(text).map_err(|e| CapsuleError::Encoding(e.to_string()))
    }
}

/// Types that can be written to and restored from a [`Capsule`]
pub trait Savable {
    /// Write every non-default field
    fn write(&self, capsule: &mut Capsule);

    /// Restore fields from `capsule`; absent fields take their defaults.
    ///
    /// # Errors
    ///
    /// A [`CapsuleError`] when a field holds the wrong kind of value.
    fn read(&mut self, capsule: &Capsule) -> Result<(), CapsuleError>;
}

impl Savable for Transform {
    fn write(&self, capsule: &mut Capsule) {
        capsule.write_vec3("translation", &self.translation, &Vec3::zeros());
        capsule.write_quat("rotation", &self.rotation, &Quat::identity());
        capsule.write_vec3("scale", &self.scale, &Vec3::repeat(1.0));
    }

    fn read(&mut self, capsule: &Capsule) -> Result<(), CapsuleError> {
        self.translation = capsule.read_vec3("translation", Vec3::zeros())?;
        self.rotation = capsule.read_quat("rotation", Quat::identity())?;
        self.scale = capsule.read_vec3("scale", Vec3::repeat(1.0))?;
        Ok(())
    }
}

impl Savable for BoundingVolume {
    fn write(&self, capsule: &mut Capsule) {
        capsule.write_text("kind", self.kind_name(), "");
        match self {
            Self::Sphere(sphere) => {
                capsule.write_vec3("center", &sphere.center, &Vec3::zeros());
                capsule.write_float("radius", sphere.radius, 0.0);
            }
            Self::Box(bound) => {
                capsule.write_vec3("center", &bound.center, &Vec3::zeros());
                capsule.write_vec3("min", &bound.min, &Vec3::zeros());
                capsule.write_vec3("max", &bound.max, &Vec3::zeros());
            }
        }
    }

    fn read(&mut self, capsule: &Capsule) -> Result<(), CapsuleError> {
        let center = capsule.read_vec3("center", Vec3::zeros())?;
        *self = match capsule.read_text("kind", "")?.as_str() {
            "sphere" => BoundingSphere {
                center,
                radius: capsule.read_float("radius", 0.0)?,
            }
            .into(),
            "box" => BoundingBox {
                center,
                min: capsule.read_vec3("min", Vec3::zeros())?,
                max: capsule.read_vec3("max", Vec3::zeros())?,
            }
            .into(),
            "" => return Err(CapsuleError::MissingField("kind".to_owned())),
            other => {
                return Err(CapsuleError::InvalidValue {
                    field: "kind".to_owned(),
                    reason: format!("unknown bound kind '{other}'"),
                })
            }
        };
        Ok(())
    }
}

impl Savable for GeometryBatch {
    fn write(&self, capsule: &mut Capsule) {
        capsule.write_vec3_list("vertices", self.vertices());
        capsule.write_uint_list("indices", self.indices());
        capsule.write_bool("enabled", self.enabled, true);
        if let Some(bound) = self.model_bound() {
            let mut nested = Capsule::new();
            bound.write(&mut nested);
            capsule.write_capsule("model_bound", nested);
        }
    }

    fn read(&mut self, capsule: &Capsule) -> Result<(), CapsuleError> {
        let mut batch = Self::from_indexed(capsule.read_vec3_list("vertices")?, capsule.read_uint_list("indices")?)
            .map_err(|e| CapsuleError::InvalidValue {
                field: "indices".to_owned(),
                reason: e.to_string(),
            })?;
        batch.enabled = capsule.read_bool("enabled", true)?;
        if let Some(nested) = capsule.read_capsule("model_bound")? {
            let mut bound = BoundingVolume::sphere();
            bound.read(nested)?;
            batch.set_model_bound(bound);
        }
        *self = batch;
        Ok(())
    }
}

impl Savable for Geometry {
    fn write(&self, capsule: &mut Capsule) {
        let batches = self
            .batches()
            .iter()
            .map(|batch| {
                let mut nested = Capsule::new();
                batch.write(&mut nested);
                nested
            })
            .collect();
        capsule.write_list("batches", batches);
    }

    fn read(&mut self, capsule: &Capsule) -> Result<(), CapsuleError> {
        let mut geometry = Self::new();
        for nested in capsule.read_list("batches")? {
            let mut batch = GeometryBatch::new(Vec::new());
            batch.read(nested)?;
            geometry.add_batch(batch);
        }
        *self = geometry;
        Ok(())
    }
}

/// Writes the spatial's own fields. Children, controllers and render states
/// are not included; see [`SceneGraph::export_subtree`].
impl Savable for Spatial {
    fn write(&self, capsule: &mut Capsule) {
        capsule.write_text("name", self.name(), "");
        capsule.write_text("kind", if self.is_node() { "node" } else { "geometry" }, "");

        let mut local = Capsule::new();
        self.local.write(&mut local);
        capsule.write_capsule("local", local);

        capsule.write_serde("cull_mode", &self.cull_mode, &Default::default());
        capsule.write_serde("render_queue_mode", &self.render_queue_mode, &Default::default());
        capsule.write_serde("light_combine_mode", &self.light_combine_mode, &Default::default());
        capsule.write_serde("texture_combine_mode", &self.texture_combine_mode, &Default::default());
        capsule.write_serde("normals_mode", &self.normals_mode, &Default::default());
        capsule.write_int("z_order", i64::from(self.z_order), 0);
        capsule.write_bool("collidable", self.collidable, true);
        capsule.write_int("locks", i64::from(self.locks.bits()), 0);

        if let Some(geometry) = self.as_geometry() {
            let mut nested = Capsule::new();
            geometry.write(&mut nested);
            capsule.write_capsule("geometry", nested);
        }
    }

    fn read(&mut self, capsule: &Capsule) -> Result<(), CapsuleError> {
        self.set_name(capsule.read_text("name", "")?);

        let mut local = Transform::identity();
        if let Some(nested) = capsule.read_capsule("local")? {
            local.read(nested)?;
        }
        self.local = local;

        self.cull_mode = capsule.read_serde("cull_mode", Default::default())?;
        self.render_queue_mode = capsule.read_serde("render_queue_mode", Default::default())?;
        self.light_combine_mode = capsule.read_serde("light_combine_mode", Default::default())?;
        self.texture_combine_mode = capsule.read_serde("texture_combine_mode", Default::default())?;
        self.normals_mode = capsule.read_serde("normals_mode", Default::default())?;
        self.z_order = int_field(capsule, "z_order")?;
        self.collidable = capsule.read_bool("collidable", true)?;
        self.locks = LockedMode::from_bits_truncate(int_field(capsule, "locks")?);

        if let SpatialKind::Geometry(geometry) = &mut self.kind {
            match capsule.read_capsule("geometry")? {
                Some(nested) => geometry.read(nested)?,
                None => *geometry = Geometry::new(),
            }
        }
        Ok(())
    }
}

fn int_field<T: TryFrom<i64>>(capsule: &Capsule, name: &str) -> Result<T, CapsuleError> {
    let value = capsule.read_int(name, 0)?;
    T::try_from(value).map_err(|_| CapsuleError::InvalidValue {
        field: name.to_owned(),
        reason: format!("{value} is out of range"),
    })
}

impl SceneGraph {
    /// Write `key` and its descendants into one nested capsule
    ///
    /// # Errors
    ///
    /// [`crate::SceneError::SpatialNotFound`] for a stale key.
    pub fn export_subtree(&self, key: SpatialKey) -> SceneResult<Capsule> {
        let spatial = self.spatial(key)?;
        let mut capsule = Capsule::new();
        spatial.write(&mut capsule);

        let children = spatial
            .children()
            .iter()
            .map(|&child| self.export_subtree(child))
            .collect::<SceneResult<Vec<_>>>()?;
        capsule.write_list("children", children);
        Ok(capsule)
    }

    /// Rebuild a subtree written by [`SceneGraph::export_subtree`] as a new
    /// root in this graph. World data is stale until the next update.
    ///
    /// # Errors
    ///
    /// [`crate::SceneError::Capsule`] when the data is malformed; spatials
    /// created before the failure are removed again.
    pub fn import_subtree(&mut self, capsule: &Capsule) -> SceneResult<SpatialKey> {
        let mut spatial = match capsule.read_text("kind", "")?.as_str() {
            "node" => Spatial::node(""),
            "geometry" => Spatial::geometry("", Geometry::new()),
            "" => return Err(CapsuleError::MissingField("kind".to_owned()).into()),
            other => {
                return Err(CapsuleError::InvalidValue {
                    field: "kind".to_owned(),
                    reason: format!("unknown spatial kind '{other}'"),
                }
                .into())
            }
        };
        spatial.read(capsule)?;
        let key = self.insert(spatial);

        match self.import_children(key, capsule) {
            Ok(()) => Ok(key),
            Err(e) => {
                log::warn!("Import failed, discarding partial subtree: {e}");
                self.remove(key)?;
                Err(e)
            }
        }
    }

    fn import_children(&mut self, parent: SpatialKey, capsule: &Capsule) -> SceneResult<()> {
        for child in capsule.read_list("children")? {
            let child = self.import_subtree(child)?;
            self.attach_child(parent, child)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::modes::{CullMode, RenderQueueMode};
    use approx::assert_relative_eq;

    const EPSILON: f32 = 1e-5;

    #[test]
    fn test_defaults_are_elided() {
        let mut capsule = Capsule::new();
        Transform::identity().write(&mut capsule);
        assert!(capsule.is_empty());

        capsule.write_int("z_order", 3, 0);
        assert_eq!(capsule.read_int("z_order", 0).unwrap(), 3);
        assert_eq!(capsule.read_int("missing", 7).unwrap(), 7);
    }

    #[test]
    fn test_type_mismatch() {
        let mut capsule = Capsule::new();
        capsule.write_bool("flag", true, false);
        let err = capsule.read_float("flag", 0.0).unwrap_err();
        assert!(matches!(err, CapsuleError::TypeMismatch { expected: "float", .. }));
    }

    #[test]
    fn test_bound_kind_survives() {
        let bound = BoundingVolume::from(BoundingBox::new(Vec3::new(-1.0, 0.0, 0.0), Vec3::new(1.0, 2.0, 0.5)));
        let mut capsule = Capsule::new();
        bound.write(&mut capsule);

        let mut restored = BoundingVolume::sphere();
        restored.read(&capsule).unwrap();
        assert_eq!(restored, bound);
    }

    #[test]
    fn test_unknown_bound_kind() {
        let mut capsule = Capsule::new();
        capsule.write_text("kind", "capsule", "");
        let mut bound = BoundingVolume::sphere();
        assert!(matches!(bound.read(&capsule), Err(CapsuleError::InvalidValue { .. })));
    }

    #[test]
    fn test_export_import_subtree_through_ron() {
        let mut graph = SceneGraph::new();
        let root = graph.create_node("root");
        let quad = GeometryBatch::from_indexed(
            vec![Vec3::zeros(), Vec3::x(), Vec3::new(1.0, 1.0, 0.0)],
            vec![0, 1, 2],
        )
        .unwrap();
        let leaf = graph.create_geometry("leaf", Geometry::from_batch(quad));
        graph.attach_child(root, leaf).unwrap();
        graph.set_model_bound(root, BoundingVolume::sphere());

        {
            let leaf = graph.get_mut(leaf).unwrap();
            leaf.set_local_translation(Vec3::new(0.0, 3.0, 0.0));
            leaf.cull_mode = CullMode::Never;
            leaf.render_queue_mode = RenderQueueMode::Transparent;
            leaf.z_order = -2;
        }

        let text = graph.export_subtree(root).unwrap().to_ron().unwrap();
        let capsule = Capsule::from_ron(&text).unwrap();

        let mut other = SceneGraph::new();
        let copy = other.import_subtree(&capsule).unwrap();
        assert_eq!(other.len(), 2);
        assert_eq!(other.get(copy).unwrap().name(), "root");

        let leaf_copy = other.child(copy, 0).unwrap();
        let leaf_copy = other.get(leaf_copy).unwrap();
        assert_eq!(leaf_copy.name(), "leaf");
        assert_eq!(leaf_copy.cull_mode, CullMode::Never);
        assert_eq!(leaf_copy.render_queue_mode, RenderQueueMode::Transparent);
        assert_eq!(leaf_copy.z_order, -2);
        assert_relative_eq!(leaf_copy.local.translation, Vec3::new(0.0, 3.0, 0.0), epsilon = EPSILON);

        let geometry = leaf_copy.as_geometry().unwrap();
        assert_eq!(geometry.triangle_count(), 1);
        assert!(geometry.batch(0).unwrap().model_bound().unwrap().as_sphere().is_some());
    }

    #[test]
    fn test_import_rejects_bad_indices_and_cleans_up() {
        let mut batch = Capsule::new();
        batch.write_vec3_list("vertices", &[Vec3::zeros()]);
        batch.write_uint_list("indices", &[0, 5, 0]);
        let mut geometry = Capsule::new();
        geometry.write_list("batches", vec![batch]);
        let mut leaf = Capsule::new();
        leaf.write_text("kind", "geometry", "");
        leaf.write_capsule("geometry", geometry);

        let mut root = Capsule::new();
        root.write_text("kind", "node", "");
        root.write_list("children", vec![leaf]);

        let mut graph = SceneGraph::new();
        assert!(graph.import_subtree(&root).is_err());
        assert!(graph.is_empty());
    }
}
