//! Plain-old-data values exchanged with legacy callers and the backend.

use bytemuck::{Pod, Zeroable};

use crate::abi::legacy::{self, light_type};

#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct ColorValue {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct Vector {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Matrix(pub [[f32; 4]; 4]);

impl Matrix {
    pub const IDENTITY: Self = Self([
        [1.0, 0.0, 0.0, 0.0],
        [0.0, 1.0, 0.0, 0.0],
        [0.0, 0.0, 1.0, 0.0],
        [0.0, 0.0, 0.0, 1.0],
    ]);

    /// Row-vector convention product `self * rhs`.
    pub fn multiply(&self, rhs: &Matrix) -> Matrix {
        let mut out = [[0.0f32; 4]; 4];
        for (r, row) in out.iter_mut().enumerate() {
            for (c, cell) in row.iter_mut().enumerate() {
                *cell = (0..4).map(|k| self.0[r][k] * rhs.0[k][c]).sum();
            }
        }
        Matrix(out)
    }
}

impl Default for Matrix {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Backend viewport; identical to the version 7 layout.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct Viewport {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    pub min_z: f32,
    pub max_z: f32,
}

/// `D3DVIEWPORT2`-shaped rectangle owned by a legacy viewport object.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LegacyViewport {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    pub clip_x: f32,
    pub clip_y: f32,
    pub clip_width: f32,
    pub clip_height: f32,
    pub min_z: f32,
    pub max_z: f32,
}

impl From<LegacyViewport> for Viewport {
    fn from(vp: LegacyViewport) -> Self {
        Viewport {
            x: vp.x,
            y: vp.y,
            width: vp.width,
            height: vp.height,
            min_z: vp.min_z,
            max_z: vp.max_z,
        }
    }
}

/// Backend light; identical to the version 7 layout.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct Light {
    pub light_type: u32,
    pub diffuse: ColorValue,
    pub specular: ColorValue,
    pub ambient: ColorValue,
    pub position: Vector,
    pub direction: Vector,
    pub range: f32,
    pub falloff: f32,
    pub attenuation0: f32,
    pub attenuation1: f32,
    pub attenuation2: f32,
    pub theta: f32,
    pub phi: f32,
}

/// `D3DLIGHT` / `D3DLIGHT2`, told apart by `size`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LegacyLight {
    pub size: u32,
    pub light_type: u32,
    pub color: ColorValue,
    pub position: Vector,
    pub direction: Vector,
    pub range: f32,
    pub falloff: f32,
    pub attenuation0: f32,
    pub attenuation1: f32,
    pub attenuation2: f32,
    pub theta: f32,
    pub phi: f32,
    /// Only meaningful for `D3DLIGHT2`.
    pub flags: u32,
}

impl LegacyLight {
    pub const SIZE_V1: u32 = 76;
    pub const SIZE_V2: u32 = 80;

    pub fn is_light2(&self) -> bool {
        self.size == Self::SIZE_V2
    }

    pub fn has_valid_size(&self) -> bool {
        self.size == Self::SIZE_V1 || self.size == Self::SIZE_V2
    }

    /// Whether setting this light should also switch it on.
    pub fn is_active(&self) -> bool {
        !self.is_light2() || self.flags & legacy::LIGHT_ACTIVE != 0
    }

    pub fn to_light(&self) -> Light {
        let specular = if self.is_light2() && self.flags & legacy::LIGHT_NO_SPECULAR != 0 {
            ColorValue::default()
        } else {
            self.color
        };
        Light {
            light_type: self.light_type,
            diffuse: self.color,
            specular,
            ambient: ColorValue::default(),
            position: self.position,
            direction: self.direction,
            range: self.range,
            falloff: self.falloff,
            attenuation0: self.attenuation0,
            attenuation1: self.attenuation1,
            attenuation2: self.attenuation2,
            theta: self.theta,
            phi: self.phi,
        }
    }
}

impl Light {
    /// Light types the backend cannot express.
    pub fn is_legacy_only_type(&self) -> bool {
        matches!(self.light_type, light_type::PARALLELPOINT | light_type::GLSPOT)
    }
}

/// Backend material; identical to the version 7 layout.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct Material {
    pub diffuse: ColorValue,
    pub ambient: ColorValue,
    pub specular: ColorValue,
    pub emissive: ColorValue,
    pub power: f32,
}

/// `D3DMATERIAL` of versions 1–3.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LegacyMaterial {
    pub diffuse: ColorValue,
    pub ambient: ColorValue,
    pub specular: ColorValue,
    pub emissive: ColorValue,
    pub power: f32,
    pub texture_handle: u32,
    pub ramp_size: u32,
}

impl From<LegacyMaterial> for Material {
    fn from(m: LegacyMaterial) -> Self {
        Material {
            diffuse: m.diffuse,
            ambient: m.ambient,
            specular: m.specular,
            emissive: m.emissive,
            power: m.power,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ClipStatus {
    pub flags: u32,
    pub status: u32,
    pub min_x: f32,
    pub max_x: f32,
    pub min_y: f32,
    pub max_y: f32,
    pub min_z: f32,
    pub max_z: f32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

/// Capabilities reported by the backend device.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BackendCaps {
    pub dev_caps: u32,
    pub primitive_misc_caps: u32,
    pub raster_caps: u32,
    pub texture_filter_caps: u32,
    pub texture_op_caps: u32,
    pub fvf_caps: u32,
    pub max_texture_width: u32,
    pub max_texture_height: u32,
    pub max_texture_repeat: u32,
    pub max_texture_aspect_ratio: u32,
    pub max_anisotropy: u32,
    pub max_texture_blend_stages: u32,
    pub max_simultaneous_textures: u32,
    pub max_active_lights: u32,
    pub max_user_clip_planes: u32,
    pub max_vertex_blend_matrices: u32,
}

/// `D3DDEVICEDESC7` as reported to legacy callers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeviceDesc {
    pub dev_caps: u32,
    pub primitive_misc_caps: u32,
    pub raster_caps: u32,
    pub texture_filter_caps: u32,
    pub texture_op_caps: u32,
    pub fvf_caps: u16,
    pub max_texture_blend_stages: u16,
    pub max_simultaneous_textures: u16,
    pub min_texture_width: u32,
    pub min_texture_height: u32,
    pub max_texture_width: u32,
    pub max_texture_height: u32,
    pub max_texture_repeat: u32,
    pub max_texture_aspect_ratio: u32,
    pub max_anisotropy: u32,
    pub max_active_lights: u32,
    pub max_user_clip_planes: u16,
    pub max_vertex_blend_matrices: u16,
}

impl From<BackendCaps> for DeviceDesc {
    fn from(caps: BackendCaps) -> Self {
        let clamp16 = |v: u32| u16::try_from(v).unwrap_or(u16::MAX);
        DeviceDesc {
            dev_caps: caps.dev_caps,
            primitive_misc_caps: caps.primitive_misc_caps,
            raster_caps: caps.raster_caps,
            texture_filter_caps: caps.texture_filter_caps,
            texture_op_caps: caps.texture_op_caps,
            fvf_caps: clamp16(caps.fvf_caps),
            max_texture_blend_stages: clamp16(caps.max_texture_blend_stages),
            max_simultaneous_textures: clamp16(caps.max_simultaneous_textures),
            min_texture_width: 1,
            min_texture_height: 1,
            max_texture_width: caps.max_texture_width,
            max_texture_height: caps.max_texture_height,
            max_texture_repeat: caps.max_texture_repeat,
            max_texture_aspect_ratio: caps.max_texture_aspect_ratio,
            max_anisotropy: caps.max_anisotropy,
            max_active_lights: caps.max_active_lights,
            max_user_clip_planes: clamp16(caps.max_user_clip_planes),
            max_vertex_blend_matrices: clamp16(caps.max_vertex_blend_matrices),
        }
    }
}
