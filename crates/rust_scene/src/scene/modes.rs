//! Inheritable per-spatial modes and lock flags

use serde::{Deserialize, Serialize};

/// Whether a subtree takes part in a draw pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CullMode {
    /// Use the parent's mode
    #[default]
    Inherit,
    /// Test the world bound against the camera frustum
    Dynamic,
    /// Never drawn
    Always,
    /// Always drawn, no frustum test
    Never,
}

impl CullMode {
    /// Mode a tree resolves to when no ancestor sets one
    pub const ROOT_DEFAULT: Self = Self::Dynamic;
}

/// Which render bucket a geometry goes into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RenderQueueMode {
    /// Use the parent's mode
    #[default]
    Inherit,
    /// Drawn immediately during traversal
    Skip,
    /// Opaque bucket, front to back
    Opaque,
    /// Transparent bucket, back to front
    Transparent,
    /// Screen-space bucket, ordered by z-order
    Ortho,
}

impl RenderQueueMode {
    /// Mode a tree resolves to when no ancestor sets one
    pub const ROOT_DEFAULT: Self = Self::Skip;
}

/// How stacked light or texture states along a branch are combined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CombineMode {
    /// Use the parent's mode
    #[default]
    Inherit,
    /// Resolve to an empty, disabled state
    Off,
    /// Nearest state wins outright
    Replace,
    /// Accumulate from the root downward
    CombineFirst,
    /// Accumulate from the leaf upward; lights sorted by distance
    CombineClosest,
    /// Accumulate from the leaf upward, stopping at the first disabled state
    CombineRecentEnabled,
}

/// Combine mode for light states
pub type LightCombineMode = CombineMode;

/// Combine mode for texture states
pub type TextureCombineMode = CombineMode;

impl CombineMode {
    /// Light combine mode when no ancestor sets one
    pub const LIGHT_ROOT_DEFAULT: Self = Self::CombineFirst;

    /// Texture combine mode when no ancestor sets one
    pub const TEXTURE_ROOT_DEFAULT: Self = Self::CombineClosest;
}

/// How the renderer should treat vertex normals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum NormalsMode {
    /// Use the parent's mode
    #[default]
    Inherit,
    /// Use normals as given
    UseProvided,
    /// Always renormalize
    NormalizeProvided,
    /// Renormalize only when the world scale is not 1
    NormalizeIfScaled,
    /// Do not send normals
    Off,
}

impl NormalsMode {
    /// Mode a tree resolves to when no ancestor sets one
    pub const ROOT_DEFAULT: Self = Self::NormalizeIfScaled;
}

bitflags::bitflags! {
    /// Per-spatial update opt-outs.
    ///
    /// Locks are hints: a locked spatial keeps stale data if its inputs
    /// change afterwards.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct LockedMode: u32 {
        /// World bound is frozen
        const BOUNDS = 1 << 0;
        /// Vertex data is frozen (renderer hint)
        const MESH_DATA = 1 << 1;
        /// World transform is frozen
        const TRANSFORMS = 1 << 2;
        /// Shadow volumes need no refresh (renderer hint)
        const SHADOWS = 1 << 3;
        /// The whole subtree is skipped by geometric updates
        const BRANCH = 1 << 4;
    }
}
