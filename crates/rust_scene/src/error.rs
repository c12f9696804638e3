//! Error types for the scene graph

use crate::foundation::collections::SpatialKey;
use thiserror::Error;

/// Errors raised by structural scene graph operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SceneError {
    /// The key does not resolve to a live spatial
    #[error("Spatial not found: {0:?}")]
    SpatialNotFound(SpatialKey),

    /// Children can only be attached to nodes
    #[error("Spatial {0:?} is not a node")]
    NotANode(SpatialKey),

    /// Attaching would make a spatial its own ancestor
    #[error("Attaching {child:?} under {parent:?} would create a cycle")]
    CycleDetected {
        /// Prospective parent
        parent: SpatialKey,
        /// Prospective child
        child: SpatialKey,
    },

    /// Child index past the end of a node's child list
    #[error("Child index {index} out of range for node with {len} children")]
    ChildIndexOutOfRange {
        /// Requested index
        index: usize,
        /// Number of children
        len: usize,
    },

    /// Index buffer references a vertex that does not exist
    #[error("Index {index} references vertex outside 0..{vertex_count}")]
    InvalidIndex {
        /// Offending index value
        index: u32,
        /// Number of vertices in the batch
        vertex_count: usize,
    },

    /// Batch index past the end of a geometry's batch list
    #[error("Batch index {index} out of range for geometry with {len} batches")]
    BatchIndexOutOfRange {
        /// Requested index
        index: usize,
        /// Number of batches
        len: usize,
    },

    /// Serialized scene data could not be read back
    #[error("Capsule error: {0}")]
    Capsule(#[from] CapsuleError),
}

/// Errors raised by bounding volume operations
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundError {
    /// Strict merge of a sphere with a box, or the reverse
    #[error("Cannot merge a {left} bound with a {right} bound")]
    VariantMismatch {
        /// Variant of the receiver
        left: &'static str,
        /// Variant of the argument
        right: &'static str,
    },
}

/// Errors raised while reading capsule data
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CapsuleError {
    /// A field was present but held another kind of value
    #[error("Field '{field}' has unexpected type, expected {expected}")]
    TypeMismatch {
        /// Field name
        field: String,
        /// Expected value kind
        expected: &'static str,
    },

    /// A required field was absent
    #[error("Missing field: {0}")]
    MissingField(String),

    /// A field held an unknown tag or unparsable value
    #[error("Invalid value for field '{field}': {reason}")]
    InvalidValue {
        /// Field name
        field: String,
        /// Parser message
        reason: String,
    },

    /// Encoding or decoding of the whole capsule failed
    #[error("Encoding error: {0}")]
    Encoding(String),
}

/// Result alias for scene graph operations
pub type SceneResult<T> = Result<T, SceneError>;
