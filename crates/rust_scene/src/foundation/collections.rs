//! Arena keys for the scene hierarchy

pub use slotmap::SlotMap;

slotmap::new_key_type! {
    /// Stable handle to a spatial stored in a [`crate::scene::SceneGraph`].
    ///
    /// Keys stay valid across unrelated insertions and removals; a key whose
    /// spatial was removed simply stops resolving.
    pub struct SpatialKey;
}

/// Arena holding every spatial of a scene graph
pub type SpatialArena<T> = SlotMap<SpatialKey, T>;
