//! Arena-backed spatial hierarchy
//!
//! Spatials live in a slot map and refer to each other by [`SpatialKey`].
//! Children are owned through their parent's ordered child list; the
//! `parent` key on each spatial is a plain back-reference used for upward
//! queries such as bound propagation and mode inheritance.

use super::controller::GraphEdit;
use super::geometry::Geometry;
use super::modes::{CombineMode, CullMode, NormalsMode, RenderQueueMode};
use super::spatial::{Spatial, SpatialKind};
use crate::config::SceneConfig;
use crate::error::{SceneError, SceneResult};
use crate::foundation::collections::{SpatialArena, SpatialKey};

/// Owner of every spatial in a scene
#[derive(Debug, Default)]
pub struct SceneGraph {
    pub(crate) spatials: SpatialArena<Spatial>,
    pub(crate) config: SceneConfig,
    pub(crate) pending_edits: Vec<GraphEdit>,
}

impl SceneGraph {
    /// Empty graph with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty graph with the given configuration
    pub fn with_config(config: SceneConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Active configuration
    pub const fn config(&self) -> &SceneConfig {
        &self.config
    }

    /// Mutable configuration
    pub fn config_mut(&mut self) -> &mut SceneConfig {
        &mut self.config
    }

    /// Insert a detached spatial
    pub fn insert(&mut self, spatial: Spatial) -> SpatialKey {
        let key = self.spatials.insert(spatial);
        log::trace!("Inserted spatial {:?} '{}'", key, self.spatials[key].name());
        key
    }

    /// Insert a detached, empty node
    pub fn create_node(&mut self, name: impl Into<String>) -> SpatialKey {
        self.insert(Spatial::node(name))
    }

    /// Insert a detached geometry leaf
    pub fn create_geometry(&mut self, name: impl Into<String>, geometry: Geometry) -> SpatialKey {
        self.insert(Spatial::geometry(name, geometry))
    }

    /// Spatial for `key`, if live
    pub fn get(&self, key: SpatialKey) -> Option<&Spatial> {
        self.spatials.get(key)
    }

    /// Mutable spatial for `key`, if live
    pub fn get_mut(&mut self, key: SpatialKey) -> Option<&mut Spatial> {
        self.spatials.get_mut(key)
    }

    /// Spatial for `key`.
    ///
    /// # Errors
    ///
    /// [`SceneError::SpatialNotFound`] if the key is stale.
    pub fn spatial(&self, key: SpatialKey) -> SceneResult<&Spatial> {
        self.spatials.get(key).ok_or(SceneError::SpatialNotFound(key))
    }

    /// Mutable spatial for `key`.
    ///
    /// # Errors
    ///
    /// [`SceneError::SpatialNotFound`] if the key is stale.
    pub fn spatial_mut(&mut self, key: SpatialKey) -> SceneResult<&mut Spatial> {
        self.spatials.get_mut(key).ok_or(SceneError::SpatialNotFound(key))
    }

    /// Is `key` live
    pub fn contains(&self, key: SpatialKey) -> bool {
        self.spatials.contains_key(key)
    }

    /// Number of live spatials
    pub fn len(&self) -> usize {
        self.spatials.len()
    }

    /// True when the graph holds no spatials
    pub fn is_empty(&self) -> bool {
        self.spatials.is_empty()
    }

    /// Keys of all spatials without a parent
    pub fn roots(&self) -> impl Iterator<Item = SpatialKey> + '_ {
        self.spatials.iter().filter(|(_, s)| s.parent.is_none()).map(|(key, _)| key)
    }

    /// Parent of `key`
    pub fn parent(&self, key: SpatialKey) -> Option<SpatialKey> {
        self.spatials.get(key).and_then(|s| s.parent)
    }

    /// Ancestors of `key`, nearest first, excluding `key` itself
    pub fn ancestors(&self, key: SpatialKey) -> Ancestors<'_> {
        Ancestors {
            graph: self,
            next: self.parent(key),
        }
    }

    /// Topmost ancestor of `key` (itself when it is a root)
    pub fn root_of(&self, key: SpatialKey) -> SpatialKey {
        self.ancestors(key).last().unwrap_or(key)
    }

    /// Is `key` somewhere below `ancestor`
    pub fn has_descendant(&self, ancestor: SpatialKey, key: SpatialKey) -> bool {
        self.ancestors(key).any(|a| a == ancestor)
    }

    fn node_children_mut(&mut self, key: SpatialKey) -> SceneResult<&mut Vec<SpatialKey>> {
        match &mut self.spatial_mut(key)?.kind {
            SpatialKind::Node { children } => Ok(children),
            SpatialKind::Geometry(_) => Err(SceneError::NotANode(key)),
        }
    }

    fn node_children(&self, key: SpatialKey) -> SceneResult<&[SpatialKey]> {
        match &self.spatial(key)?.kind {
            SpatialKind::Node { children } => Ok(children.as_slice()),
            SpatialKind::Geometry(_) => Err(SceneError::NotANode(key)),
        }
    }

    fn check_attach(&self, parent: SpatialKey, child: SpatialKey) -> SceneResult<()> {
        self.node_children(parent)?;
        self.spatial(child)?;

        if child == parent || self.has_descendant(child, parent) {
            log::warn!("Refusing to attach {child:?} under {parent:?}: would create a cycle");
            return Err(SceneError::CycleDetected { parent, child });
        }
        Ok(())
    }

    /// Remove `child` from its parent's list and clear its parent key.
    /// Returns the former parent and the index it was at.
    fn unlink(&mut self, child: SpatialKey) -> Option<(SpatialKey, usize)> {
        let parent = self.spatials.get_mut(child)?.parent.take()?;
        let children = self.node_children_mut(parent).ok()?;
        let index = children.iter().position(|&c| c == child)?;
        children.remove(index);
        Some((parent, index))
    }

    /// Append `child` to `parent`, detaching it from any previous parent.
    /// Attaching a spatial to its current parent changes nothing.
    ///
    /// Returns the parent's child count.
    ///
    /// # Errors
    ///
    /// Unknown keys, a leaf `parent`, or an attachment that would form a cycle.
    pub fn attach_child(&mut self, parent: SpatialKey, child: SpatialKey) -> SceneResult<usize> {
        self.check_attach(parent, child)?;

        if self.parent(child) != Some(parent) {
            self.unlink(child);
            self.node_children_mut(parent)?.push(child);
            self.spatial_mut(child)?.parent = Some(parent);
            log::debug!("Attached {child:?} under {parent:?}");
        }
        Ok(self.node_children(parent)?.len())
    }

    /// Insert `child` at `index` in `parent`'s children, detaching it from
    /// any previous parent. A current child is moved to `index`.
    ///
    /// # Errors
    ///
    /// As [`SceneGraph::attach_child`], plus
    /// [`SceneError::ChildIndexOutOfRange`] when `index` is past the end.
    pub fn attach_child_at(&mut self, parent: SpatialKey, child: SpatialKey, index: usize) -> SceneResult<usize> {
        self.check_attach(parent, child)?;

        let already_child = self.parent(child) == Some(parent);
        let len = self.node_children(parent)?.len() - usize::from(already_child);
        if index > len {
            return Err(SceneError::ChildIndexOutOfRange { index, len });
        }

        self.unlink(child);
        self.node_children_mut(parent)?.insert(index, child);
        self.spatial_mut(child)?.parent = Some(parent);
        log::debug!("Attached {child:?} under {parent:?} at {index}");
        Ok(len + 1)
    }

    /// Detach `child` if it is a direct child of `parent`.
    /// Returns the index it occupied.
    ///
    /// # Errors
    ///
    /// Unknown `parent` or a leaf `parent`.
    pub fn detach_child(&mut self, parent: SpatialKey, child: SpatialKey) -> SceneResult<Option<usize>> {
        self.node_children(parent)?;
        if self.parent(child) != Some(parent) {
            return Ok(None);
        }
        Ok(self.unlink(child).map(|(_, index)| index))
    }

    /// Detach the child at `index`.
    ///
    /// # Errors
    ///
    /// Unknown or leaf `parent`, or an index past the end.
    pub fn detach_child_at(&mut self, parent: SpatialKey, index: usize) -> SceneResult<SpatialKey> {
        let children = self.node_children(parent)?;
        let child = *children.get(index).ok_or(SceneError::ChildIndexOutOfRange {
            index,
            len: children.len(),
        })?;
        self.unlink(child);
        Ok(child)
    }

    /// Detach the first direct child called `name`.
    ///
    /// # Errors
    ///
    /// Unknown or leaf `parent`.
    pub fn detach_child_named(&mut self, parent: SpatialKey, name: &str) -> SceneResult<Option<SpatialKey>> {
        let Some(child) = self.child_named(parent, name)? else {
            return Ok(None);
        };
        self.unlink(child);
        Ok(Some(child))
    }

    /// Detach every child, returning them in their former order.
    ///
    /// # Errors
    ///
    /// Unknown or leaf `parent`.
    pub fn detach_all_children(&mut self, parent: SpatialKey) -> SceneResult<Vec<SpatialKey>> {
        let children = std::mem::take(self.node_children_mut(parent)?);
        for &child in &children {
            if let Some(spatial) = self.spatials.get_mut(child) {
                spatial.parent = None;
            }
        }
        Ok(children)
    }

    /// Detach `key` from whatever parent it has. Returns the former parent.
    pub fn detach_from_parent(&mut self, key: SpatialKey) -> Option<SpatialKey> {
        self.unlink(key).map(|(parent, _)| parent)
    }

    /// Detach `key` and drop it together with its subtree.
    /// Returns how many spatials were removed.
    ///
    /// # Errors
    ///
    /// [`SceneError::SpatialNotFound`] for a stale key.
    pub fn remove(&mut self, key: SpatialKey) -> SceneResult<usize> {
        self.spatial(key)?;
        self.unlink(key);

        let doomed = self.subtree(key);
        for &spatial in &doomed {
            self.spatials.remove(spatial);
        }
        log::debug!("Removed {} spatials rooted at {key:?}", doomed.len());
        Ok(doomed.len())
    }

    /// Child at `index`
    pub fn child(&self, parent: SpatialKey, index: usize) -> Option<SpatialKey> {
        self.spatials.get(parent)?.children().get(index).copied()
    }

    /// Position of `child` among `parent`'s children
    pub fn child_index(&self, parent: SpatialKey, child: SpatialKey) -> Option<usize> {
        self.spatials.get(parent)?.children().iter().position(|&c| c == child)
    }

    /// Number of direct children (0 for leaves and stale keys)
    pub fn child_count(&self, parent: SpatialKey) -> usize {
        self.spatials.get(parent).map_or(0, |s| s.children().len())
    }

    /// Direct children of `parent` (empty for leaves and stale keys)
    pub fn children(&self, parent: SpatialKey) -> &[SpatialKey] {
        self.spatials.get(parent).map(Spatial::children).unwrap_or_default()
    }

    /// First direct child called `name`.
    ///
    /// # Errors
    ///
    /// Unknown or leaf `parent`.
    pub fn child_named(&self, parent: SpatialKey, name: &str) -> SceneResult<Option<SpatialKey>> {
        Ok(self
            .node_children(parent)?
            .iter()
            .copied()
            .find(|&c| self.spatials.get(c).is_some_and(|s| s.name() == name)))
    }

    /// First spatial called `name` in a depth-first walk from `root`,
    /// `root` included
    pub fn find_named(&self, root: SpatialKey, name: &str) -> Option<SpatialKey> {
        self.subtree(root)
            .into_iter()
            .find(|&key| self.spatials.get(key).is_some_and(|s| s.name() == name))
    }

    /// `root` and all its descendants in depth-first pre-order
    pub fn subtree(&self, root: SpatialKey) -> Vec<SpatialKey> {
        let mut order = Vec::new();
        let mut stack = vec![root];
        while let Some(key) = stack.pop() {
            let Some(spatial) = self.spatials.get(key) else {
                continue;
            };
            order.push(key);
            stack.extend(spatial.children().iter().rev());
        }
        order
    }

    fn resolve_mode<M: Copy + PartialEq>(
        &self,
        key: SpatialKey,
        inherit: M,
        root_default: M,
        mode: impl Fn(&Spatial) -> M,
    ) -> M {
        let mut current = Some(key);
        while let Some(k) = current {
            let Some(spatial) = self.spatials.get(k) else {
                break;
            };
            let value = mode(spatial);
            if value != inherit {
                return value;
            }
            current = spatial.parent;
        }
        root_default
    }

    /// Cull mode after inheritance
    pub fn resolved_cull_mode(&self, key: SpatialKey) -> CullMode {
        self.resolve_mode(key, CullMode::Inherit, CullMode::ROOT_DEFAULT, |s| s.cull_mode)
    }

    /// Render queue mode after inheritance
    pub fn resolved_render_queue_mode(&self, key: SpatialKey) -> RenderQueueMode {
        self.resolve_mode(key, RenderQueueMode::Inherit, RenderQueueMode::ROOT_DEFAULT, |s| {
            s.render_queue_mode
        })
    }

    /// Light combine mode after inheritance
    pub fn resolved_light_combine_mode(&self, key: SpatialKey) -> CombineMode {
        self.resolve_mode(key, CombineMode::Inherit, CombineMode::LIGHT_ROOT_DEFAULT, |s| {
            s.light_combine_mode
        })
    }

    /// Texture combine mode after inheritance
    pub fn resolved_texture_combine_mode(&self, key: SpatialKey) -> CombineMode {
        self.resolve_mode(key, CombineMode::Inherit, CombineMode::TEXTURE_ROOT_DEFAULT, |s| {
            s.texture_combine_mode
        })
    }

    /// Normals mode after inheritance
    pub fn resolved_normals_mode(&self, key: SpatialKey) -> NormalsMode {
        self.resolve_mode(key, NormalsMode::Inherit, NormalsMode::ROOT_DEFAULT, |s| s.normals_mode)
    }
}

/// Iterator over a spatial's ancestors, nearest first
#[derive(Debug)]
pub struct Ancestors<'a> {
    graph: &'a SceneGraph,
    next: Option<SpatialKey>,
}

impl Iterator for Ancestors<'_> {
    type Item = SpatialKey;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = self.graph.parent(current);
        Some(current)
    }
}
