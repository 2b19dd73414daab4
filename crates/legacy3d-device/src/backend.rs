//! The modern fixed-function device every emulated call lands on.

use crate::draw::topology::PrimitiveType;
use crate::error::BackendResult;
use crate::types::{BackendCaps, ClipStatus, Light, Material, Matrix, Viewport};

macro_rules! backend_id {
    ($($(#[$meta:meta])* $name:ident),+ $(,)?) => {
        $(
            $(#[$meta])*
            #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
            pub struct $name(pub u64);
        )+
    };
}

backend_id!(
    /// Backend texture resource.
    TextureId,
    VertexBufferId,
    IndexBufferId,
    /// Token of a recorded state block.
    StateBlockId,
    PixelShaderId,
);

/// Backend clear rectangle (`D3DRECT`).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ClearRect {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

/// Operations consumed from the backend device.
///
/// Getters return the stored value; implementations report invalid slots
/// (for example a light index that was never set) with an error.
pub trait Backend {
    fn set_render_state(&mut self, state: u32, value: u32) -> BackendResult<()>;
    fn get_render_state(&mut self, state: u32) -> BackendResult<u32>;

    fn set_texture_stage_state(&mut self, stage: u32, state: u32, value: u32) -> BackendResult<()>;
    fn get_texture_stage_state(&mut self, stage: u32, state: u32) -> BackendResult<u32>;

    fn set_sampler_state(&mut self, sampler: u32, state: u32, value: u32) -> BackendResult<()>;
    fn get_sampler_state(&mut self, sampler: u32, state: u32) -> BackendResult<u32>;

    fn set_texture(&mut self, stage: u32, texture: Option<TextureId>) -> BackendResult<()>;

    fn set_light(&mut self, index: u32, light: &Light) -> BackendResult<()>;
    fn get_light(&mut self, index: u32) -> BackendResult<Light>;
    fn light_enable(&mut self, index: u32, enable: bool) -> BackendResult<()>;
    fn get_light_enable(&mut self, index: u32) -> BackendResult<bool>;

    fn set_material(&mut self, material: &Material) -> BackendResult<()>;
    fn get_material(&mut self) -> BackendResult<Material>;

    fn set_transform(&mut self, state: u32, matrix: &Matrix) -> BackendResult<()>;
    fn get_transform(&mut self, state: u32) -> BackendResult<Matrix>;
    fn multiply_transform(&mut self, state: u32, matrix: &Matrix) -> BackendResult<()>;

    fn set_viewport(&mut self, viewport: &Viewport) -> BackendResult<()>;
    fn get_viewport(&mut self) -> BackendResult<Viewport>;

    fn set_clip_plane(&mut self, index: u32, plane: [f32; 4]) -> BackendResult<()>;
    fn get_clip_plane(&mut self, index: u32) -> BackendResult<[f32; 4]>;
    fn set_clip_status(&mut self, status: &ClipStatus) -> BackendResult<()>;

    fn set_fvf(&mut self, fvf: u32) -> BackendResult<()>;
    fn set_stream_source(&mut self, buffer: VertexBufferId, stride: u32) -> BackendResult<()>;
    fn set_indices(&mut self, buffer: IndexBufferId) -> BackendResult<()>;
    fn set_pixel_shader(&mut self, shader: Option<PixelShaderId>) -> BackendResult<()>;
    fn set_pixel_shader_constant(&mut self, register: u32, value: [f32; 4]) -> BackendResult<()>;

    fn draw_primitive_up(
        &mut self,
        primitive: PrimitiveType,
        primitive_count: u32,
        vertices: &[u8],
        stride: u32,
    ) -> BackendResult<()>;
    fn draw_indexed_primitive_up(
        &mut self,
        primitive: PrimitiveType,
        vertex_count: u32,
        primitive_count: u32,
        indices: &[u16],
        vertices: &[u8],
        stride: u32,
    ) -> BackendResult<()>;
    fn draw_primitive(
        &mut self,
        primitive: PrimitiveType,
        start_vertex: u32,
        primitive_count: u32,
    ) -> BackendResult<()>;
    fn draw_indexed_primitive(
        &mut self,
        primitive: PrimitiveType,
        base_vertex: i32,
        min_vertex: u32,
        vertex_count: u32,
        start_index: u32,
        primitive_count: u32,
    ) -> BackendResult<()>;

    fn begin_state_block(&mut self) -> BackendResult<()>;
    fn end_state_block(&mut self) -> BackendResult<StateBlockId>;
    fn create_state_block(&mut self, kind: u32) -> BackendResult<StateBlockId>;
    fn apply_state_block(&mut self, block: StateBlockId) -> BackendResult<()>;
    fn capture_state_block(&mut self, block: StateBlockId) -> BackendResult<()>;
    fn release_state_block(&mut self, block: StateBlockId);

    fn begin_scene(&mut self) -> BackendResult<()>;
    fn end_scene(&mut self) -> BackendResult<()>;
    fn clear(
        &mut self,
        rects: &[ClearRect],
        flags: u32,
        color: u32,
        z: f32,
        stencil: u32,
    ) -> BackendResult<()>;

    fn caps(&mut self) -> BackendResult<BackendCaps>;
    fn supports_texture_format(&mut self, format: u32) -> bool;
    fn validate_device(&mut self) -> BackendResult<u32>;
}
