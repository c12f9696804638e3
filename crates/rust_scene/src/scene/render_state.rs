//! Render state records
//!
//! Each [`RenderState`] covers one orthogonal rendering attribute. The
//! rasterizer that consumes them lives outside this crate, so payloads only
//! carry the parameters a backend would bind.

use crate::foundation::math::{Vec3, Vec4};
use serde::{Deserialize, Serialize};

/// Category of a render state; one slot per category on every spatial
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RenderStateType {
    /// Alpha blending and testing
    Alpha,
    /// Color dithering
    Dither,
    /// Fog
    Fog,
    /// Lights
    Light,
    /// Surface material
    Material,
    /// Flat or smooth shading
    Shade,
    /// Texture units
    Texture,
    /// Wireframe rasterization
    Wireframe,
    /// Depth buffer
    ZBuffer,
    /// Face culling
    Cull,
    /// Stencil buffer
    Stencil,
    /// Shader program
    Shader,
}

impl RenderStateType {
    /// Number of categories
    pub const COUNT: usize = 12;

    /// All categories in slot order
    pub const ALL: [Self; Self::COUNT] = [
        Self::Alpha,
        Self::Dither,
        Self::Fog,
        Self::Light,
        Self::Material,
        Self::Shade,
        Self::Texture,
        Self::Wireframe,
        Self::ZBuffer,
        Self::Cull,
        Self::Stencil,
        Self::Shader,
    ];

    /// Slot index of this category
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Depth and stencil comparison functions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CompareFunction {
    /// Never passes
    Never,
    /// Passes when less
    #[default]
    Less,
    /// Passes when less or equal
    LessOrEqual,
    /// Passes when equal
    Equal,
    /// Passes when greater
    Greater,
    /// Always passes
    Always,
}

/// Faces removed by the cull state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CullFace {
    /// Keep all faces
    #[default]
    None,
    /// Remove front faces
    Front,
    /// Remove back faces
    Back,
}

/// Alpha blending parameters
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AlphaState {
    /// Blend with the framebuffer
    pub blend: bool,
    /// Discard fragments with alpha below this value
    pub test_threshold: Option<f32>,
}

/// Fog parameters
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FogState {
    /// Fog color
    pub color: Vec4,
    /// Distance where fog starts
    pub start: f32,
    /// Distance where fog is opaque
    pub end: f32,
}

/// Kind and placement of a light
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LightKind {
    /// Infinitely distant light
    Directional {
        /// Direction the light travels
        direction: Vec3,
    },
    /// Omnidirectional light at a position
    Point {
        /// World position
        position: Vec3,
    },
    /// Cone light
    Spot {
        /// World position
        position: Vec3,
        /// Cone axis
        direction: Vec3,
        /// Cone half angle in radians
        angle: f32,
    },
}

/// A light source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Light {
    /// Identifying name, used to drop duplicates when lights are combined
    pub name: String,
    /// Kind and placement
    pub kind: LightKind,
    /// Diffuse color
    pub color: Vec3,
}

impl Light {
    /// Point light at `position`
    pub fn point(name: impl Into<String>, position: Vec3, color: Vec3) -> Self {
        Self {
            name: name.into(),
            kind: LightKind::Point { position },
            color,
        }
    }

    /// Directional light along `direction`
    pub fn directional(name: impl Into<String>, direction: Vec3, color: Vec3) -> Self {
        Self {
            name: name.into(),
            kind: LightKind::Directional { direction },
            color,
        }
    }

    /// Distance from the light to `point`; directional lights are always 0
    pub fn distance_to(&self, point: &Vec3) -> f32 {
        match &self.kind {
            LightKind::Directional { .. } => 0.0,
            LightKind::Point { position } | LightKind::Spot { position, .. } => (position - point).magnitude(),
        }
    }
}

/// Set of lights applied together
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LightState {
    /// Attached lights
    pub lights: Vec<Light>,
    /// Light back faces as well
    pub two_sided: bool,
}

impl LightState {
    /// Attach a light unless one with the same name is present or the
    /// state already holds `max` lights. Returns whether it was added.
    pub fn attach(&mut self, light: Light, max: usize) -> bool {
        if self.lights.len() >= max || self.lights.iter().any(|l| l.name == light.name) {
            return false;
        }
        self.lights.push(light);
        true
    }
}

/// Surface material colors
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MaterialState {
    /// Ambient color
    pub ambient: Vec4,
    /// Diffuse color
    pub diffuse: Vec4,
    /// Specular color
    pub specular: Vec4,
    /// Specular exponent
    pub shininess: f32,
}

/// Handle to a texture owned by the renderer
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Texture {
    /// Backend handle
    pub id: u32,
    /// Source name, for debugging
    pub name: String,
}

/// Textures bound per unit
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TextureState {
    /// Texture per unit; `None` leaves the unit free
    pub units: Vec<Option<Texture>>,
}

impl TextureState {
    /// Bind `texture` to `unit`, growing the unit list as needed
    pub fn set_texture(&mut self, unit: usize, texture: Texture) {
        if self.units.len() <= unit {
            self.units.resize(unit + 1, None);
        }
        self.units[unit] = Some(texture);
    }

    /// Texture on `unit`, if any
    pub fn texture(&self, unit: usize) -> Option<&Texture> {
        self.units.get(unit).and_then(Option::as_ref)
    }
}

/// Depth buffer parameters
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ZBufferState {
    /// Depth test
    pub function: CompareFunction,
    /// Depth writes enabled
    pub writable: bool,
}

/// Stencil parameters
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StencilState {
    /// Stencil test
    pub function: CompareFunction,
    /// Reference value
    pub reference: i32,
}

/// Category-specific payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StateData {
    /// Alpha blending
    Alpha(AlphaState),
    /// Dithering has no parameters
    Dither,
    /// Fog
    Fog(FogState),
    /// Lights
    Light(LightState),
    /// Material
    Material(MaterialState),
    /// Smooth shading when true
    Shade {
        /// Interpolate across faces
        smooth: bool,
    },
    /// Textures
    Texture(TextureState),
    /// Wireframe
    Wireframe {
        /// Line width in pixels
        line_width: f32,
    },
    /// Depth buffer
    ZBuffer(ZBufferState),
    /// Face culling
    Cull {
        /// Faces removed
        face: CullFace,
    },
    /// Stencil buffer
    Stencil(StencilState),
    /// Shader program
    Shader {
        /// Program name known to the backend
        program: String,
    },
}

impl StateData {
    /// Category of this payload
    pub const fn state_type(&self) -> RenderStateType {
        match self {
            Self::Alpha(_) => RenderStateType::Alpha,
            Self::Dither => RenderStateType::Dither,
            Self::Fog(_) => RenderStateType::Fog,
            Self::Light(_) => RenderStateType::Light,
            Self::Material(_) => RenderStateType::Material,
            Self::Shade { .. } => RenderStateType::Shade,
            Self::Texture(_) => RenderStateType::Texture,
            Self::Wireframe { .. } => RenderStateType::Wireframe,
            Self::ZBuffer(_) => RenderStateType::ZBuffer,
            Self::Cull { .. } => RenderStateType::Cull,
            Self::Stencil(_) => RenderStateType::Stencil,
            Self::Shader { .. } => RenderStateType::Shader,
        }
    }
}

/// One render attribute plus its enabled flag
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderState {
    /// Disabled states are bound as "off"
    pub enabled: bool,
    /// Category payload
    pub data: StateData,
}

impl RenderState {
    /// An enabled state
    pub const fn new(data: StateData) -> Self {
        Self { enabled: true, data }
    }

    /// A disabled state
    pub const fn disabled(data: StateData) -> Self {
        Self { enabled: false, data }
    }

    /// Category of this state
    pub const fn state_type(&self) -> RenderStateType {
        self.data.state_type()
    }

    /// The state a pass falls back to when nothing in the tree sets `ty`.
    ///
    /// Depth testing and smooth shading start enabled; everything else off.
    pub fn default_for(ty: RenderStateType) -> Self {
        match ty {
            RenderStateType::Alpha => Self::disabled(StateData::Alpha(AlphaState::default())),
            RenderStateType::Dither => Self::disabled(StateData::Dither),
            RenderStateType::Fog => Self::disabled(StateData::Fog(FogState::default())),
            RenderStateType::Light => Self::disabled(StateData::Light(LightState::default())),
            RenderStateType::Material => Self::disabled(StateData::Material(MaterialState::default())),
            RenderStateType::Shade => Self::new(StateData::Shade { smooth: true }),
            RenderStateType::Texture => Self::disabled(StateData::Texture(TextureState::default())),
            RenderStateType::Wireframe => Self::disabled(StateData::Wireframe { line_width: 1.0 }),
            RenderStateType::ZBuffer => Self::new(StateData::ZBuffer(ZBufferState {
                function: CompareFunction::Less,
                writable: true,
            })),
            RenderStateType::Cull => Self::disabled(StateData::Cull { face: CullFace::None }),
            RenderStateType::Stencil => Self::disabled(StateData::Stencil(StencilState::default())),
            RenderStateType::Shader => Self::disabled(StateData::Shader { program: String::new() }),
        }
    }

    /// Light payload, if this is a light state
    pub const fn as_light(&self) -> Option<&LightState> {
        match &self.data {
            StateData::Light(lights) => Some(lights),
            _ => None,
        }
    }

    /// Texture payload, if this is a texture state
    pub const fn as_texture(&self) -> Option<&TextureState> {
        match &self.data {
            StateData::Texture(textures) => Some(textures),
            _ => None,
        }
    }
}
