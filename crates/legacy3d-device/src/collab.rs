//! Contracts of the collaborators the device talks to but does not own.
//!
//! Resource wrappers are shared as `Arc<dyn ...>` and compared by address;
//! the device only ever calls the narrow surface exposed here.

use std::num::NonZeroUsize;
use std::sync::Arc;

use crate::backend::{
    ClearRect, IndexBufferId, PixelShaderId, StateBlockId, TextureId, VertexBufferId,
};
use crate::error::{BackendResult, DeviceResult};
use crate::types::{
    ClipStatus, DeviceDesc, LegacyMaterial, LegacyViewport, Light, Material, Matrix, Point, Rect,
    Vector, Viewport,
};
use crate::version::{DxVersion, InterfaceId};

/// Address of an interface owned by the passthrough implementation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RawInterface(pub NonZeroUsize);

/// Identity comparison of two shared wrappers, ignoring vtable metadata.
pub fn same_object<T: ?Sized, U: ?Sized>(a: &Arc<T>, b: &Arc<U>) -> bool {
    Arc::as_ptr(a).cast::<()>() == Arc::as_ptr(b).cast::<()>()
}

/// Stable address of a shared wrapper, used as an identity key.
pub fn object_addr<T: ?Sized>(obj: &Arc<T>) -> usize {
    Arc::as_ptr(obj).cast::<()>() as usize
}

pub trait SurfaceObject {
    fn backend_texture(&self) -> Option<TextureId>;

    /// Texture with the surface's source color key folded into alpha.
    fn color_key_texture(&self) -> Option<TextureId> {
        None
    }

    /// Whether the surface's mip chain still has to be produced.
    fn needs_mipmaps(&self) -> bool {
        false
    }

    fn generate_mipmaps(&self) {}

    /// Set when the surface was last locked with a pitch that is not 4-byte aligned.
    fn was_unaligned_lock(&self) -> bool {
        false
    }

    /// Copies `src_rect` of `src` to `dest` on this surface.
    fn load_from(
        &self,
        dest: Point,
        src: &dyn SurfaceObject,
        src_rect: Option<Rect>,
    ) -> DeviceResult<()>;

    /// Texture interface attached to this surface, if any.
    fn texture(&self) -> Option<Arc<dyn TextureObject>>;

    fn raw_interface(&self) -> Option<RawInterface> {
        None
    }
}

pub trait TextureObject {
    fn surface(&self) -> Option<Arc<dyn SurfaceObject>>;
    fn handle(&self) -> u32;
    fn set_handle(&self, handle: u32);

    fn raw_interface(&self) -> Option<RawInterface> {
        None
    }
}

pub trait MaterialObject {
    fn material(&self) -> LegacyMaterial;
}

/// Legacy light objects are tracked by identity only; their data arrives
/// through `set_light_object`.
pub trait LightObject {}

pub trait ViewportObject {
    fn viewport(&self) -> LegacyViewport;

    /// Marks the viewport as the device's current one so later edits are pushed through.
    fn set_current_active(&self, active: bool);

    fn raw_interface(&self) -> Option<RawInterface> {
        None
    }
}

pub trait VertexBufferObject {
    fn backend_buffer(&self) -> Option<VertexBufferId>;
    fn fvf(&self) -> u32;

    fn raw_interface(&self) -> Option<RawInterface> {
        None
    }
}

pub trait Direct3DObject {
    fn version(&self) -> DxVersion;
}

/// The display/device owner that created this 3D device.
pub trait DisplayParent {
    /// Whether the backend device currently exists and is usable.
    fn is_ready(&self) -> bool;

    fn render_target(&self) -> Option<Arc<dyn SurfaceObject>>;
    fn set_render_target(&self, surface: &Arc<dyn SurfaceObject>) -> DeviceResult<()>;

    /// Shared index buffer holding `indices`, cached by slice address and length.
    fn index_buffer(&self, indices: &[u16]) -> Option<IndexBufferId>;

    fn color_key_shader(&self) -> Option<PixelShaderId>;

    fn enable_3d(&self);
    fn present_frame(&self) -> DeviceResult<()>;

    /// Vertex buffer and stride bound while validating the device.
    fn validation_vertex_buffer(&self) -> Option<(VertexBufferId, u32)>;

    fn direct3d(&self, version: DxVersion) -> Option<Arc<dyn Direct3DObject>>;
}

/// Maps addresses returned by the passthrough implementation back to wrappers.
pub trait AddressLookup {
    fn surface(&self, raw: RawInterface, version: DxVersion) -> Arc<dyn SurfaceObject>;
    fn texture(&self, raw: RawInterface, version: DxVersion) -> Arc<dyn TextureObject>;
    fn viewport(&self, raw: RawInterface, version: DxVersion) -> Arc<dyn ViewportObject>;
    fn direct3d(&self, raw: RawInterface, version: DxVersion) -> Arc<dyn Direct3DObject>;
    /// Wrapper address for an arbitrary queried interface.
    fn interface(&self, raw: RawInterface, iid: InterfaceId) -> RawInterface;
}

/// Vertex layout as each legacy version spells it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VertexFormat {
    /// `D3DVERTEXTYPE` tag (version 2).
    Type(u32),
    /// Flexible vertex format mask (versions 3 and 7).
    Fvf(u32),
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DeviceStats {
    pub triangles_drawn: u32,
    pub lines_drawn: u32,
    pub points_drawn: u32,
    pub spans_drawn: u32,
    pub vertices_processed: u32,
}

/// One component stream of a strided draw.
#[derive(Clone, Copy, Debug)]
pub struct StridedComponent<'a> {
    pub data: &'a [u8],
    pub stride: u32,
}

/// A genuine legacy device implementation that passthrough mode forwards to.
pub trait ProxyDevice {
    fn version(&self) -> DxVersion;
    fn raw_interface(&self) -> RawInterface;

    fn add_ref(&self) -> u32;
    fn release(&self) -> u32;
    fn query_interface(&self, iid: InterfaceId) -> BackendResult<RawInterface>;

    fn set_render_state(&mut self, state: u32, value: u32) -> BackendResult<()>;
    fn get_render_state(&mut self, state: u32) -> BackendResult<u32>;
    fn set_texture_stage_state(&mut self, stage: u32, state: u32, value: u32) -> BackendResult<()>;
    fn get_texture_stage_state(&mut self, stage: u32, state: u32) -> BackendResult<u32>;
    fn set_light_state(&mut self, state: u32, value: u32) -> BackendResult<()>;
    fn get_light_state(&mut self, state: u32) -> BackendResult<u32>;

    fn set_transform(&mut self, state: u32, matrix: &Matrix) -> BackendResult<()>;
    fn get_transform(&mut self, state: u32) -> BackendResult<Matrix>;
    fn multiply_transform(&mut self, state: u32, matrix: &Matrix) -> BackendResult<()>;

    fn set_texture(&mut self, stage: u32, texture: Option<RawInterface>) -> BackendResult<()>;
    fn get_texture(&mut self, stage: u32) -> BackendResult<Option<RawInterface>>;
    fn swap_texture_handles(&mut self, a: RawInterface, b: RawInterface) -> BackendResult<()>;
    fn set_render_target(&mut self, surface: RawInterface) -> BackendResult<()>;
    fn get_render_target(&mut self) -> BackendResult<RawInterface>;

    fn add_viewport(&mut self, viewport: RawInterface) -> BackendResult<()>;
    fn delete_viewport(&mut self, viewport: RawInterface) -> BackendResult<()>;
    fn next_viewport(
        &mut self,
        viewport: Option<RawInterface>,
        flags: u32,
    ) -> BackendResult<Option<RawInterface>>;
    fn set_current_viewport(&mut self, viewport: RawInterface) -> BackendResult<()>;
    fn get_current_viewport(&mut self) -> BackendResult<RawInterface>;
    fn set_viewport(&mut self, viewport: &Viewport) -> BackendResult<()>;
    fn get_viewport(&mut self) -> BackendResult<Viewport>;

    fn set_material(&mut self, material: &Material) -> BackendResult<()>;
    fn get_material(&mut self) -> BackendResult<Material>;
    fn set_light(&mut self, index: u32, light: &Light) -> BackendResult<()>;
    fn get_light(&mut self, index: u32) -> BackendResult<Light>;
    fn light_enable(&mut self, index: u32, enable: bool) -> BackendResult<()>;
    fn get_light_enable(&mut self, index: u32) -> BackendResult<bool>;

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

    fn draw_primitive(
        &mut self,
        primitive: u32,
        format: VertexFormat,
        vertices: &[u8],
        vertex_count: u32,
        flags: u32,
    ) -> BackendResult<()>;
    fn draw_indexed_primitive(
        &mut self,
        primitive: u32,
        format: VertexFormat,
        vertices: &[u8],
        vertex_count: u32,
        indices: &[u16],
        flags: u32,
    ) -> BackendResult<()>;
    fn draw_primitive_strided(
        &mut self,
        primitive: u32,
        fvf: u32,
        components: &[StridedComponent<'_>],
        vertex_count: u32,
        indices: Option<&[u16]>,
        flags: u32,
    ) -> BackendResult<()>;
    fn draw_primitive_vb(
        &mut self,
        primitive: u32,
        buffer: RawInterface,
        start_vertex: u32,
        vertex_count: u32,
        flags: u32,
    ) -> BackendResult<()>;
    fn draw_indexed_primitive_vb(
        &mut self,
        primitive: u32,
        buffer: RawInterface,
        start_vertex: u32,
        vertex_count: u32,
        indices: &[u16],
        flags: u32,
    ) -> BackendResult<()>;

    fn begin(&mut self, primitive: u32, format: VertexFormat, flags: u32) -> BackendResult<()>;
    fn begin_indexed(
        &mut self,
        primitive: u32,
        format: VertexFormat,
        vertices: &[u8],
        vertex_count: u32,
        flags: u32,
    ) -> BackendResult<()>;
    fn vertex(&mut self, vertex: &[u8]) -> BackendResult<()>;
    fn index(&mut self, index: u16) -> BackendResult<()>;
    fn end(&mut self, flags: u32) -> BackendResult<()>;

    fn begin_state_block(&mut self) -> BackendResult<()>;
    fn end_state_block(&mut self) -> BackendResult<StateBlockId>;
    fn create_state_block(&mut self, kind: u32) -> BackendResult<StateBlockId>;
    fn apply_state_block(&mut self, block: StateBlockId) -> BackendResult<()>;
    fn capture_state_block(&mut self, block: StateBlockId) -> BackendResult<()>;
    fn delete_state_block(&mut self, block: StateBlockId) -> BackendResult<()>;

    fn get_caps(&mut self) -> BackendResult<DeviceDesc>;
    fn enum_texture_formats(&mut self) -> BackendResult<Vec<u32>>;
    fn validate_device(&mut self) -> BackendResult<u32>;
    fn set_clip_status(&mut self, status: &ClipStatus) -> BackendResult<()>;
    fn get_clip_status(&mut self) -> BackendResult<ClipStatus>;
    fn set_clip_plane(&mut self, index: u32, plane: [f32; 4]) -> BackendResult<()>;
    fn get_clip_plane(&mut self, index: u32) -> BackendResult<[f32; 4]>;
    fn compute_sphere_visibility(
        &mut self,
        centers: &[Vector],
        radii: &[f32],
    ) -> BackendResult<Vec<u32>>;
    fn get_info(&mut self, id: u32, buffer: &mut [u8]) -> BackendResult<bool>;
    fn get_stats(&mut self) -> BackendResult<DeviceStats>;
    fn get_direct3d(&mut self) -> BackendResult<RawInterface>;
    fn pre_load(&mut self, texture: RawInterface) -> BackendResult<()>;
    fn load(
        &mut self,
        dest: RawInterface,
        dest_point: Point,
        src: RawInterface,
        src_rect: Option<Rect>,
        flags: u32,
    ) -> BackendResult<()>;
}
