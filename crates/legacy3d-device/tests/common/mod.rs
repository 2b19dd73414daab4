#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::num::NonZeroUsize;
use std::rc::Rc;
use std::sync::Arc;

use legacy3d_device::backend::{
    Backend, ClearRect, IndexBufferId, PixelShaderId, StateBlockId, TextureId, VertexBufferId,
};
use legacy3d_device::collab::{
    AddressLookup, DeviceStats, Direct3DObject, DisplayParent, LightObject, MaterialObject,
    ProxyDevice, RawInterface, StridedComponent, SurfaceObject, TextureObject, VertexBufferObject,
    VertexFormat, ViewportObject,
};
use legacy3d_device::draw::topology::PrimitiveType;
use legacy3d_device::types::{
    BackendCaps, ClipStatus, DeviceDesc, LegacyMaterial, LegacyViewport, Light, Material, Matrix,
    Point, Rect, Vector, Viewport,
};
use legacy3d_device::{
    BackendError, BackendResult, Device, DeviceConfig, DeviceResult, DxVersion, InterfaceId,
};

pub const BACK_BUFFER: Viewport = Viewport {
    x: 0,
    y: 0,
    width: 640,
    height: 480,
    min_z: 0.0,
    max_z: 1.0,
};

pub fn raw(addr: usize) -> RawInterface {
    RawInterface(NonZeroUsize::new(addr).expect("raw interface address must be non-zero"))
}

/// Backend calls worth asserting on, in issue order.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    SetRender(u32, u32),
    SetSampler(u32, u32, u32),
    SetTexture(u32, Option<TextureId>),
    SetFvf(u32),
    SetStream(VertexBufferId, u32),
    SetIndices(IndexBufferId),
    SetPixelShader(Option<PixelShaderId>),
    SetViewport(Viewport),
    DrawUp {
        primitive: PrimitiveType,
        primitive_count: u32,
        stride: u32,
    },
    DrawIndexedUp {
        primitive: PrimitiveType,
        vertex_count: u32,
        primitive_count: u32,
        stride: u32,
    },
    Draw {
        primitive: PrimitiveType,
        start_vertex: u32,
        primitive_count: u32,
    },
    DrawIndexed {
        primitive: PrimitiveType,
        base_vertex: i32,
        vertex_count: u32,
        primitive_count: u32,
    },
    ReleaseBlock(StateBlockId),
    BeginScene,
    EndScene,
    Clear(u32),
}

#[derive(Debug)]
pub struct BackendState {
    pub render: BTreeMap<u32, u32>,
    pub stage: BTreeMap<(u32, u32), u32>,
    pub sampler: BTreeMap<(u32, u32), u32>,
    pub textures: BTreeMap<u32, TextureId>,
    pub lights: BTreeMap<u32, Light>,
    pub light_enabled: BTreeMap<u32, bool>,
    pub material: Material,
    pub transforms: BTreeMap<u32, Matrix>,
    pub clip_planes: BTreeMap<u32, [f32; 4]>,
    pub viewport: Viewport,
    pub fvf: u32,
    pub pixel_shader: Option<PixelShaderId>,
    pub shader_constants: BTreeMap<u32, [f32; 4]>,
    pub last_vertices: Vec<u8>,
    pub last_indices: Vec<u16>,
    pub calls: Vec<Call>,
    pub recording: bool,
    pub next_block: u64,
    pub fail_draws: bool,
    pub formats: Vec<u32>,
}

impl Default for BackendState {
    fn default() -> Self {
        Self {
            render: BTreeMap::new(),
            stage: BTreeMap::new(),
            sampler: BTreeMap::new(),
            textures: BTreeMap::new(),
            lights: BTreeMap::new(),
            light_enabled: BTreeMap::new(),
            material: Material::default(),
            transforms: BTreeMap::new(),
            clip_planes: BTreeMap::new(),
            viewport: BACK_BUFFER,
            fvf: 0,
            pixel_shader: None,
            shader_constants: BTreeMap::new(),
            last_vertices: Vec::new(),
            last_indices: Vec::new(),
            calls: Vec::new(),
            recording: false,
            next_block: 1,
            fail_draws: false,
            formats: Vec::new(),
        }
    }
}

impl BackendState {
    pub fn render_state(&self, state: u32) -> u32 {
        self.render.get(&state).copied().unwrap_or(0)
    }

    pub fn sampler_state(&self, sampler: u32, state: u32) -> u32 {
        self.sampler.get(&(sampler, state)).copied().unwrap_or(0)
    }

    pub fn stage_state(&self, stage: u32, state: u32) -> u32 {
        self.stage.get(&(stage, state)).copied().unwrap_or(0)
    }

    pub fn draws(&self) -> usize {
        self.calls
            .iter()
            .filter(|call| {
                matches!(
                    call,
                    Call::DrawUp { .. }
                        | Call::DrawIndexedUp { .. }
                        | Call::Draw { .. }
                        | Call::DrawIndexed { .. }
                )
            })
            .count()
    }

    /// Index of the first call matching `pred`.
    pub fn position(&self, pred: impl Fn(&Call) -> bool) -> Option<usize> {
        self.calls.iter().position(pred)
    }

    /// Simulates a backend reset: every slot goes back to its default and the
    /// back buffer gets the given size.
    pub fn lose_device(&mut self, width: u32, height: u32) {
        let calls = std::mem::take(&mut self.calls);
        let formats = std::mem::take(&mut self.formats);
        *self = Self::default();
        self.viewport.width = width;
        self.viewport.height = height;
        self.calls = calls;
        self.formats = formats;
    }
}

pub struct MockBackend {
    state: Rc<RefCell<BackendState>>,
}

impl MockBackend {
    pub fn new() -> (Self, Rc<RefCell<BackendState>>) {
        let state = Rc::new(RefCell::new(BackendState::default()));
        (
            Self {
                state: Rc::clone(&state),
            },
            state,
        )
    }

    fn with<R>(&self, f: impl FnOnce(&mut BackendState) -> R) -> R {
        f(&mut self.state.borrow_mut())
    }
}

impl Backend for MockBackend {
    fn set_render_state(&mut self, state: u32, value: u32) -> BackendResult<()> {
        self.with(|s| {
            s.render.insert(state, value);
            s.calls.push(Call::SetRender(state, value));
        });
        Ok(())
    }

    fn get_render_state(&mut self, state: u32) -> BackendResult<u32> {
        Ok(self.with(|s| s.render_state(state)))
    }

    fn set_texture_stage_state(&mut self, stage: u32, state: u32, value: u32) -> BackendResult<()> {
        self.with(|s| s.stage.insert((stage, state), value));
        Ok(())
    }

    fn get_texture_stage_state(&mut self, stage: u32, state: u32) -> BackendResult<u32> {
        Ok(self.with(|s| s.stage_state(stage, state)))
    }

    fn set_sampler_state(&mut self, sampler: u32, state: u32, value: u32) -> BackendResult<()> {
        self.with(|s| {
            s.sampler.insert((sampler, state), value);
            s.calls.push(Call::SetSampler(sampler, state, value));
        });
        Ok(())
    }

    fn get_sampler_state(&mut self, sampler: u32, state: u32) -> BackendResult<u32> {
        Ok(self.with(|s| s.sampler_state(sampler, state)))
    }

    fn set_texture(&mut self, stage: u32, texture: Option<TextureId>) -> BackendResult<()> {
        self.with(|s| {
            match texture {
                Some(id) => s.textures.insert(stage, id),
                None => s.textures.remove(&stage),
            };
            s.calls.push(Call::SetTexture(stage, texture));
        });
        Ok(())
    }

    fn set_light(&mut self, index: u32, light: &Light) -> BackendResult<()> {
        self.with(|s| s.lights.insert(index, *light));
        Ok(())
    }

    fn get_light(&mut self, index: u32) -> BackendResult<Light> {
        self.with(|s| s.lights.get(&index).copied())
            .ok_or(BackendError::INVALID_CALL)
    }

    fn light_enable(&mut self, index: u32, enable: bool) -> BackendResult<()> {
        self.with(|s| s.light_enabled.insert(index, enable));
        Ok(())
    }

    fn get_light_enable(&mut self, index: u32) -> BackendResult<bool> {
        Ok(self.with(|s| s.light_enabled.get(&index).copied().unwrap_or(false)))
    }

    fn set_material(&mut self, material: &Material) -> BackendResult<()> {
        self.with(|s| s.material = *material);
        Ok(())
    }

    fn get_material(&mut self) -> BackendResult<Material> {
        Ok(self.with(|s| s.material))
    }

    fn set_transform(&mut self, state: u32, matrix: &Matrix) -> BackendResult<()> {
        self.with(|s| s.transforms.insert(state, *matrix));
        Ok(())
    }

    fn get_transform(&mut self, state: u32) -> BackendResult<Matrix> {
        Ok(self.with(|s| s.transforms.get(&state).copied().unwrap_or(Matrix::IDENTITY)))
    }

    fn multiply_transform(&mut self, state: u32, matrix: &Matrix) -> BackendResult<()> {
        self.with(|s| {
            let current = s.transforms.get(&state).copied().unwrap_or(Matrix::IDENTITY);
            s.transforms.insert(state, current.multiply(matrix));
        });
        Ok(())
    }

    fn set_viewport(&mut self, viewport: &Viewport) -> BackendResult<()> {
        self.with(|s| {
            s.viewport = *viewport;
            s.calls.push(Call::SetViewport(*viewport));
        });
        Ok(())
    }

    fn get_viewport(&mut self) -> BackendResult<Viewport> {
        Ok(self.with(|s| s.viewport))
    }

    fn set_clip_plane(&mut self, index: u32, plane: [f32; 4]) -> BackendResult<()> {
        self.with(|s| s.clip_planes.insert(index, plane));
        Ok(())
    }

    fn get_clip_plane(&mut self, index: u32) -> BackendResult<[f32; 4]> {
        Ok(self.with(|s| s.clip_planes.get(&index).copied().unwrap_or_default()))
    }

    fn set_clip_status(&mut self, _status: &ClipStatus) -> BackendResult<()> {
        Ok(())
    }

    fn set_fvf(&mut self, fvf: u32) -> BackendResult<()> {
        self.with(|s| {
            s.fvf = fvf;
            s.calls.push(Call::SetFvf(fvf));
        });
        Ok(())
    }

    fn set_stream_source(&mut self, buffer: VertexBufferId, stride: u32) -> BackendResult<()> {
        self.with(|s| s.calls.push(Call::SetStream(buffer, stride)));
        Ok(())
    }

    fn set_indices(&mut self, buffer: IndexBufferId) -> BackendResult<()> {
        self.with(|s| s.calls.push(Call::SetIndices(buffer)));
        Ok(())
    }

    fn set_pixel_shader(&mut self, shader: Option<PixelShaderId>) -> BackendResult<()> {
        self.with(|s| {
            s.pixel_shader = shader;
            s.calls.push(Call::SetPixelShader(shader));
        });
        Ok(())
    }

    fn set_pixel_shader_constant(&mut self, register: u32, value: [f32; 4]) -> BackendResult<()> {
        self.with(|s| s.shader_constants.insert(register, value));
        Ok(())
    }

    fn draw_primitive_up(
        &mut self,
        primitive: PrimitiveType,
        primitive_count: u32,
        vertices: &[u8],
        stride: u32,
    ) -> BackendResult<()> {
        self.with(|s| {
            s.last_vertices = vertices.to_vec();
            s.calls.push(Call::DrawUp {
                primitive,
                primitive_count,
                stride,
            });
            if s.fail_draws {
                return Err(BackendError::INVALID_CALL);
            }
            Ok(())
        })
    }

    fn draw_indexed_primitive_up(
        &mut self,
        primitive: PrimitiveType,
        vertex_count: u32,
        primitive_count: u32,
        indices: &[u16],
        vertices: &[u8],
        stride: u32,
    ) -> BackendResult<()> {
        self.with(|s| {
            s.last_vertices = vertices.to_vec();
            s.last_indices = indices.to_vec();
            s.calls.push(Call::DrawIndexedUp {
                primitive,
                vertex_count,
                primitive_count,
                stride,
            });
            if s.fail_draws {
                return Err(BackendError::INVALID_CALL);
            }
            Ok(())
        })
    }

    fn draw_primitive(
        &mut self,
        primitive: PrimitiveType,
        start_vertex: u32,
        primitive_count: u32,
    ) -> BackendResult<()> {
        self.with(|s| {
            s.calls.push(Call::Draw {
                primitive,
                start_vertex,
                primitive_count,
            });
            if s.fail_draws {
                return Err(BackendError::INVALID_CALL);
            }
            Ok(())
        })
    }

    fn draw_indexed_primitive(
        &mut self,
        primitive: PrimitiveType,
        base_vertex: i32,
        _min_vertex: u32,
        vertex_count: u32,
        _start_index: u32,
        primitive_count: u32,
    ) -> BackendResult<()> {
        self.with(|s| {
            s.calls.push(Call::DrawIndexed {
                primitive,
                base_vertex,
                vertex_count,
                primitive_count,
            });
            if s.fail_draws {
                return Err(BackendError::INVALID_CALL);
            }
            Ok(())
        })
    }

    fn begin_state_block(&mut self) -> BackendResult<()> {
        self.with(|s| s.recording = true);
        Ok(())
    }

    fn end_state_block(&mut self) -> BackendResult<StateBlockId> {
        self.with(|s| {
            if !s.recording {
                return Err(BackendError::INVALID_CALL);
            }
            s.recording = false;
            s.next_block += 1;
            Ok(StateBlockId(s.next_block))
        })
    }

    fn create_state_block(&mut self, _kind: u32) -> BackendResult<StateBlockId> {
        self.with(|s| {
            s.next_block += 1;
            Ok(StateBlockId(s.next_block))
        })
    }

    fn apply_state_block(&mut self, _block: StateBlockId) -> BackendResult<()> {
        Ok(())
    }

    fn capture_state_block(&mut self, _block: StateBlockId) -> BackendResult<()> {
        Ok(())
    }

    fn release_state_block(&mut self, block: StateBlockId) {
        self.with(|s| s.calls.push(Call::ReleaseBlock(block)));
    }

    fn begin_scene(&mut self) -> BackendResult<()> {
        self.with(|s| s.calls.push(Call::BeginScene));
        Ok(())
    }

    fn end_scene(&mut self) -> BackendResult<()> {
        self.with(|s| s.calls.push(Call::EndScene));
        Ok(())
    }

    fn clear(
        &mut self,
        _rects: &[ClearRect],
        flags: u32,
        _color: u32,
        _z: f32,
        _stencil: u32,
    ) -> BackendResult<()> {
        self.with(|s| s.calls.push(Call::Clear(flags)));
        Ok(())
    }

    fn caps(&mut self) -> BackendResult<BackendCaps> {
        Ok(BackendCaps {
            max_texture_width: 4096,
            max_texture_height: 4096,
            max_texture_blend_stages: 8,
            max_simultaneous_textures: 8,
            max_active_lights: 8,
            max_user_clip_planes: 6,
            fvf_caps: 0x0008_0008,
            ..Default::default()
        })
    }

    fn supports_texture_format(&mut self, format: u32) -> bool {
        self.with(|s| s.formats.contains(&format))
    }

    fn validate_device(&mut self) -> BackendResult<u32> {
        Ok(1)
    }
}

#[derive(Default)]
pub struct MockDirect3D {
    pub version: Option<DxVersion>,
}

impl Direct3DObject for MockDirect3D {
    fn version(&self) -> DxVersion {
        self.version.unwrap_or(DxVersion::V7)
    }
}

pub struct MockParent {
    pub ready: Cell<bool>,
    pub enabled_3d: Cell<u32>,
    pub presented: Cell<u32>,
    pub target_changes: Cell<u32>,
    pub render_target: RefCell<Option<Arc<dyn SurfaceObject>>>,
    pub index_buffer: Option<IndexBufferId>,
    pub color_key_shader: Option<PixelShaderId>,
    pub validation_buffer: Option<(VertexBufferId, u32)>,
}

impl Default for MockParent {
    fn default() -> Self {
        Self {
            ready: Cell::new(true),
            enabled_3d: Cell::new(0),
            presented: Cell::new(0),
            target_changes: Cell::new(0),
            render_target: RefCell::new(None),
            index_buffer: Some(IndexBufferId(90)),
            color_key_shader: Some(PixelShaderId(70)),
            validation_buffer: Some((VertexBufferId(80), 16)),
        }
    }
}

impl DisplayParent for MockParent {
    fn is_ready(&self) -> bool {
        self.ready.get()
    }

    fn render_target(&self) -> Option<Arc<dyn SurfaceObject>> {
        self.render_target.borrow().clone()
    }

    fn set_render_target(&self, surface: &Arc<dyn SurfaceObject>) -> DeviceResult<()> {
        self.target_changes.set(self.target_changes.get() + 1);
        *self.render_target.borrow_mut() = Some(Arc::clone(surface));
        Ok(())
    }

    fn index_buffer(&self, _indices: &[u16]) -> Option<IndexBufferId> {
        self.index_buffer
    }

    fn color_key_shader(&self) -> Option<PixelShaderId> {
        self.color_key_shader
    }

    fn enable_3d(&self) {
        self.enabled_3d.set(self.enabled_3d.get() + 1);
    }

    fn present_frame(&self) -> DeviceResult<()> {
        self.presented.set(self.presented.get() + 1);
        Ok(())
    }

    fn validation_vertex_buffer(&self) -> Option<(VertexBufferId, u32)> {
        self.validation_buffer
    }

    fn direct3d(&self, version: DxVersion) -> Option<Arc<dyn Direct3DObject>> {
        Some(Arc::new(MockDirect3D {
            version: Some(version),
        }))
    }
}

#[derive(Default)]
pub struct MockSurface {
    pub texture: Option<TextureId>,
    pub keyed: Option<TextureId>,
    pub unaligned: Cell<bool>,
    pub needs_mips: Cell<bool>,
    pub mips_generated: Cell<u32>,
    pub loads: Cell<u32>,
    pub raw: Option<RawInterface>,
}

impl MockSurface {
    pub fn with_texture(id: u64) -> Arc<Self> {
        Arc::new(Self {
            texture: Some(TextureId(id)),
            ..Default::default()
        })
    }
}

impl SurfaceObject for MockSurface {
    fn backend_texture(&self) -> Option<TextureId> {
        self.texture
    }

    fn color_key_texture(&self) -> Option<TextureId> {
        self.keyed
    }

    fn needs_mipmaps(&self) -> bool {
        self.needs_mips.get()
    }

    fn generate_mipmaps(&self) {
        self.needs_mips.set(false);
        self.mips_generated.set(self.mips_generated.get() + 1);
    }

    fn was_unaligned_lock(&self) -> bool {
        self.unaligned.get()
    }

    fn load_from(
        &self,
        _dest: Point,
        _src: &dyn SurfaceObject,
        _src_rect: Option<Rect>,
    ) -> DeviceResult<()> {
        self.loads.set(self.loads.get() + 1);
        Ok(())
    }

    fn texture(&self) -> Option<Arc<dyn TextureObject>> {
        None
    }

    fn raw_interface(&self) -> Option<RawInterface> {
        self.raw
    }
}

pub struct MockTexture {
    pub surface: Option<Arc<dyn SurfaceObject>>,
    pub handle: Cell<u32>,
    pub raw: Option<RawInterface>,
}

impl MockTexture {
    pub fn new(texture_id: u64) -> Arc<Self> {
        let surface: Arc<dyn SurfaceObject> = MockSurface::with_texture(texture_id);
        Arc::new(Self {
            surface: Some(surface),
            handle: Cell::new(0),
            raw: None,
        })
    }
}

impl TextureObject for MockTexture {
    fn surface(&self) -> Option<Arc<dyn SurfaceObject>> {
        self.surface.clone()
    }

    fn handle(&self) -> u32 {
        self.handle.get()
    }

    fn set_handle(&self, handle: u32) {
        self.handle.set(handle);
    }

    fn raw_interface(&self) -> Option<RawInterface> {
        self.raw
    }
}

pub struct MockMaterial(pub LegacyMaterial);

impl MaterialObject for MockMaterial {
    fn material(&self) -> LegacyMaterial {
        self.0
    }
}

pub struct MockLight;

impl LightObject for MockLight {}

#[derive(Default)]
pub struct MockViewport {
    pub rect: LegacyViewport,
    pub active: Cell<bool>,
    pub raw: Option<RawInterface>,
}

impl MockViewport {
    pub fn sized(width: u32, height: u32) -> Arc<Self> {
        Arc::new(Self {
            rect: LegacyViewport {
                width,
                height,
                max_z: 1.0,
                ..Default::default()
            },
            ..Default::default()
        })
    }
}

impl ViewportObject for MockViewport {
    fn viewport(&self) -> LegacyViewport {
        self.rect
    }

    fn set_current_active(&self, active: bool) {
        self.active.set(active);
    }

    fn raw_interface(&self) -> Option<RawInterface> {
        self.raw
    }
}

pub struct MockVertexBuffer {
    pub id: Option<VertexBufferId>,
    pub fvf: u32,
    pub raw: Option<RawInterface>,
}

impl VertexBufferObject for MockVertexBuffer {
    fn backend_buffer(&self) -> Option<VertexBufferId> {
        self.id
    }

    fn fvf(&self) -> u32 {
        self.fvf
    }

    fn raw_interface(&self) -> Option<RawInterface> {
        self.raw
    }
}

/// Passthrough target that records each call as a line of text.
pub struct MockProxy {
    pub version: DxVersion,
    pub refs: Cell<u32>,
    pub log: Rc<RefCell<Vec<String>>>,
}

impl MockProxy {
    pub fn new(version: DxVersion) -> (Self, Rc<RefCell<Vec<String>>>) {
        let log = Rc::new(RefCell::new(Vec::new()));
        (
            Self {
                version,
                refs: Cell::new(1),
                log: Rc::clone(&log),
            },
            log,
        )
    }

    fn record(&self, line: String) -> BackendResult<()> {
        self.log.borrow_mut().push(line);
        Ok(())
    }
}

impl ProxyDevice for MockProxy {
    fn version(&self) -> DxVersion {
        self.version
    }

    fn raw_interface(&self) -> RawInterface {
        raw(0x1000)
    }

    fn add_ref(&self) -> u32 {
        self.refs.set(self.refs.get() + 1);
        self.refs.get()
    }

    fn release(&self) -> u32 {
        self.refs.set(self.refs.get().saturating_sub(1));
        self.refs.get()
    }

    fn query_interface(&self, iid: InterfaceId) -> BackendResult<RawInterface> {
        self.log.borrow_mut().push(format!("query_interface({iid:?})"));
        Ok(raw(0x2000))
    }

    fn set_render_state(&mut self, state: u32, value: u32) -> BackendResult<()> {
        self.record(format!("set_render_state({state}, {value})"))
    }

    fn get_render_state(&mut self, state: u32) -> BackendResult<u32> {
        self.record(format!("get_render_state({state})"))?;
        Ok(1)
    }

    fn set_texture_stage_state(&mut self, stage: u32, state: u32, value: u32) -> BackendResult<()> {
        self.record(format!("set_texture_stage_state({stage}, {state}, {value})"))
    }

    fn get_texture_stage_state(&mut self, stage: u32, state: u32) -> BackendResult<u32> {
        self.record(format!("get_texture_stage_state({stage}, {state})"))?;
        Ok(0)
    }

    fn set_light_state(&mut self, state: u32, value: u32) -> BackendResult<()> {
        self.record(format!("set_light_state({state}, {value})"))
    }

    fn get_light_state(&mut self, state: u32) -> BackendResult<u32> {
        self.record(format!("get_light_state({state})"))?;
        Ok(0)
    }

    fn set_transform(&mut self, state: u32, _matrix: &Matrix) -> BackendResult<()> {
        self.record(format!("set_transform({state})"))
    }

    fn get_transform(&mut self, state: u32) -> BackendResult<Matrix> {
        self.record(format!("get_transform({state})"))?;
        Ok(Matrix::IDENTITY)
    }

    fn multiply_transform(&mut self, state: u32, _matrix: &Matrix) -> BackendResult<()> {
        self.record(format!("multiply_transform({state})"))
    }

    fn set_texture(&mut self, stage: u32, texture: Option<RawInterface>) -> BackendResult<()> {
        self.record(format!("set_texture({stage}, {:?})", texture.map(|t| t.0)))
    }

    fn get_texture(&mut self, stage: u32) -> BackendResult<Option<RawInterface>> {
        self.record(format!("get_texture({stage})"))?;
        Ok(Some(raw(0x3000)))
    }

    fn swap_texture_handles(&mut self, a: RawInterface, b: RawInterface) -> BackendResult<()> {
        self.record(format!("swap_texture_handles({}, {})", a.0, b.0))
    }

    fn set_render_target(&mut self, surface: RawInterface) -> BackendResult<()> {
        self.record(format!("set_render_target({})", surface.0))
    }

    fn get_render_target(&mut self) -> BackendResult<RawInterface> {
        self.record("get_render_target".to_owned())?;
        Ok(raw(0x3100))
    }

    fn add_viewport(&mut self, viewport: RawInterface) -> BackendResult<()> {
        self.record(format!("add_viewport({})", viewport.0))
    }

    fn delete_viewport(&mut self, viewport: RawInterface) -> BackendResult<()> {
        self.record(format!("delete_viewport({})", viewport.0))
    }

    fn next_viewport(
        &mut self,
        viewport: Option<RawInterface>,
        flags: u32,
    ) -> BackendResult<Option<RawInterface>> {
        self.record(format!("next_viewport({:?}, {flags})", viewport.map(|v| v.0)))?;
        Ok(Some(raw(0x3200)))
    }

    fn set_current_viewport(&mut self, viewport: RawInterface) -> BackendResult<()> {
        self.record(format!("set_current_viewport({})", viewport.0))
    }

    fn get_current_viewport(&mut self) -> BackendResult<RawInterface> {
        self.record("get_current_viewport".to_owned())?;
        Ok(raw(0x3200))
    }

    fn set_viewport(&mut self, _viewport: &Viewport) -> BackendResult<()> {
        self.record("set_viewport".to_owned())
    }

    fn get_viewport(&mut self) -> BackendResult<Viewport> {
        self.record("get_viewport".to_owned())?;
        Ok(BACK_BUFFER)
    }

    fn set_material(&mut self, _material: &Material) -> BackendResult<()> {
        self.record("set_material".to_owned())
    }

    fn get_material(&mut self) -> BackendResult<Material> {
        self.record("get_material".to_owned())?;
        Ok(Material::default())
    }

    fn set_light(&mut self, index: u32, _light: &Light) -> BackendResult<()> {
        self.record(format!("set_light({index})"))
    }

    fn get_light(&mut self, index: u32) -> BackendResult<Light> {
        self.record(format!("get_light({index})"))?;
        Ok(Light::default())
    }

    fn light_enable(&mut self, index: u32, enable: bool) -> BackendResult<()> {
        self.record(format!("light_enable({index}, {enable})"))
    }

    fn get_light_enable(&mut self, index: u32) -> BackendResult<bool> {
        self.record(format!("get_light_enable({index})"))?;
        Ok(true)
    }

    fn begin_scene(&mut self) -> BackendResult<()> {
        self.record("begin_scene".to_owned())
    }

    fn end_scene(&mut self) -> BackendResult<()> {
        self.record("end_scene".to_owned())
    }

    fn clear(
        &mut self,
        rects: &[ClearRect],
        flags: u32,
        _color: u32,
        _z: f32,
        _stencil: u32,
    ) -> BackendResult<()> {
        self.record(format!("clear({}, {flags})", rects.len()))
    }

    fn draw_primitive(
        &mut self,
        primitive: u32,
        format: VertexFormat,
        _vertices: &[u8],
        vertex_count: u32,
        flags: u32,
    ) -> BackendResult<()> {
        self.record(format!(
            "draw_primitive({primitive}, {format:?}, {vertex_count}, {flags:#x})"
        ))
    }

    fn draw_indexed_primitive(
        &mut self,
        primitive: u32,
        format: VertexFormat,
        _vertices: &[u8],
        vertex_count: u32,
        indices: &[u16],
        flags: u32,
    ) -> BackendResult<()> {
        self.record(format!(
            "draw_indexed_primitive({primitive}, {format:?}, {vertex_count}, {}, {flags:#x})",
            indices.len()
        ))
    }

    fn draw_primitive_strided(
        &mut self,
        primitive: u32,
        fvf: u32,
        components: &[StridedComponent<'_>],
        vertex_count: u32,
        indices: Option<&[u16]>,
        flags: u32,
    ) -> BackendResult<()> {
        self.record(format!(
            "draw_primitive_strided({primitive}, {fvf:#x}, {}, {vertex_count}, {:?}, {flags:#x})",
            components.len(),
            indices.map(<[u16]>::len)
        ))
    }

    fn draw_primitive_vb(
        &mut self,
        primitive: u32,
        buffer: RawInterface,
        start_vertex: u32,
        vertex_count: u32,
        flags: u32,
    ) -> BackendResult<()> {
        self.record(format!(
            "draw_primitive_vb({primitive}, {}, {start_vertex}, {vertex_count}, {flags:#x})",
            buffer.0
        ))
    }

    fn draw_indexed_primitive_vb(
        &mut self,
        primitive: u32,
        buffer: RawInterface,
        start_vertex: u32,
        vertex_count: u32,
        indices: &[u16],
        flags: u32,
    ) -> BackendResult<()> {
        self.record(format!(
            "draw_indexed_primitive_vb({primitive}, {}, {start_vertex}, {vertex_count}, {}, {flags:#x})",
            buffer.0,
            indices.len()
        ))
    }

    fn begin(&mut self, primitive: u32, format: VertexFormat, flags: u32) -> BackendResult<()> {
        self.record(format!("begin({primitive}, {format:?}, {flags:#x})"))
    }

    fn begin_indexed(
        &mut self,
        primitive: u32,
        format: VertexFormat,
        _vertices: &[u8],
        vertex_count: u32,
        flags: u32,
    ) -> BackendResult<()> {
        self.record(format!(
            "begin_indexed({primitive}, {format:?}, {vertex_count}, {flags:#x})"
        ))
    }

    fn vertex(&mut self, vertex: &[u8]) -> BackendResult<()> {
        self.record(format!("vertex({})", vertex.len()))
    }

    fn index(&mut self, index: u16) -> BackendResult<()> {
        self.record(format!("index({index})"))
    }

    fn end(&mut self, flags: u32) -> BackendResult<()> {
        self.record(format!("end({flags:#x})"))
    }

    fn begin_state_block(&mut self) -> BackendResult<()> {
        self.record("begin_state_block".to_owned())
    }

    fn end_state_block(&mut self) -> BackendResult<StateBlockId> {
        self.record("end_state_block".to_owned())?;
        Ok(StateBlockId(500))
    }

    fn create_state_block(&mut self, kind: u32) -> BackendResult<StateBlockId> {
        self.record(format!("create_state_block({kind})"))?;
        Ok(StateBlockId(501))
    }

    fn apply_state_block(&mut self, block: StateBlockId) -> BackendResult<()> {
        self.record(format!("apply_state_block({})", block.0))
    }

    fn capture_state_block(&mut self, block: StateBlockId) -> BackendResult<()> {
        self.record(format!("capture_state_block({})", block.0))
    }

    fn delete_state_block(&mut self, block: StateBlockId) -> BackendResult<()> {
        self.record(format!("delete_state_block({})", block.0))
    }

    fn get_caps(&mut self) -> BackendResult<DeviceDesc> {
        self.record("get_caps".to_owned())?;
        Ok(DeviceDesc::default())
    }

    fn enum_texture_formats(&mut self) -> BackendResult<Vec<u32>> {
        self.record("enum_texture_formats".to_owned())?;
        Ok(vec![21])
    }

    fn validate_device(&mut self) -> BackendResult<u32> {
        self.record("validate_device".to_owned())?;
        Ok(1)
    }

    fn set_clip_status(&mut self, status: &ClipStatus) -> BackendResult<()> {
        self.record(format!("set_clip_status({})", status.flags))
    }

    fn get_clip_status(&mut self) -> BackendResult<ClipStatus> {
        self.record("get_clip_status".to_owned())?;
        Ok(ClipStatus::default())
    }

    fn set_clip_plane(&mut self, index: u32, _plane: [f32; 4]) -> BackendResult<()> {
        self.record(format!("set_clip_plane({index})"))
    }

    fn get_clip_plane(&mut self, index: u32) -> BackendResult<[f32; 4]> {
        self.record(format!("get_clip_plane({index})"))?;
        Ok([0.0; 4])
    }

    fn compute_sphere_visibility(
        &mut self,
        centers: &[Vector],
        _radii: &[f32],
    ) -> BackendResult<Vec<u32>> {
        self.record(format!("compute_sphere_visibility({})", centers.len()))?;
        Ok(vec![1; centers.len()])
    }

    fn get_info(&mut self, id: u32, _buffer: &mut [u8]) -> BackendResult<bool> {
        self.record(format!("get_info({id})"))?;
        Ok(true)
    }

    fn get_stats(&mut self) -> BackendResult<DeviceStats> {
        self.record("get_stats".to_owned())?;
        Ok(DeviceStats {
            triangles_drawn: 12,
            ..Default::default()
        })
    }

    fn get_direct3d(&mut self) -> BackendResult<RawInterface> {
        self.record("get_direct3d".to_owned())?;
        Ok(raw(0x4000))
    }

    fn pre_load(&mut self, texture: RawInterface) -> BackendResult<()> {
        self.record(format!("pre_load({})", texture.0))
    }

    fn load(
        &mut self,
        dest: RawInterface,
        _dest_point: Point,
        src: RawInterface,
        _src_rect: Option<Rect>,
        flags: u32,
    ) -> BackendResult<()> {
        self.record(format!("load({}, {}, {flags})", dest.0, src.0))
    }
}

/// Wraps every address handed back by the proxy in a fresh mock object.
#[derive(Default)]
pub struct MockLookup {
    pub lookups: Cell<u32>,
}

impl MockLookup {
    fn bump(&self) {
        self.lookups.set(self.lookups.get() + 1);
    }
}

impl AddressLookup for MockLookup {
    fn surface(&self, raw: RawInterface, _version: DxVersion) -> Arc<dyn SurfaceObject> {
        self.bump();
        Arc::new(MockSurface {
            raw: Some(raw),
            ..Default::default()
        })
    }

    fn texture(&self, raw: RawInterface, _version: DxVersion) -> Arc<dyn TextureObject> {
        self.bump();
        Arc::new(MockTexture {
            surface: None,
            handle: Cell::new(0),
            raw: Some(raw),
        })
    }

    fn viewport(&self, raw: RawInterface, _version: DxVersion) -> Arc<dyn ViewportObject> {
        self.bump();
        Arc::new(MockViewport {
            raw: Some(raw),
            ..Default::default()
        })
    }

    fn direct3d(&self, _raw: RawInterface, version: DxVersion) -> Arc<dyn Direct3DObject> {
        self.bump();
        Arc::new(MockDirect3D {
            version: Some(version),
        })
    }

    fn interface(&self, raw: RawInterface, _iid: InterfaceId) -> RawInterface {
        self.bump();
        raw
    }
}

pub struct Emulated {
    pub device: Device,
    pub backend: Rc<RefCell<BackendState>>,
    pub parent: Arc<MockParent>,
}

pub fn emulated(version: DxVersion) -> Emulated {
    emulated_with(version, DeviceConfig::default())
}

pub fn emulated_with(version: DxVersion, config: DeviceConfig) -> Emulated {
    let (backend, state) = MockBackend::new();
    let parent = Arc::new(MockParent::default());
    let display: Arc<dyn DisplayParent> = parent.clone();
    Emulated {
        device: Device::new_emulated(version, display, Box::new(backend), config),
        backend: state,
        parent,
    }
}

pub fn passthrough(version: DxVersion) -> (Device, Rc<RefCell<Vec<String>>>) {
    let (proxy, log) = MockProxy::new(version);
    let lookup: Arc<dyn AddressLookup> = Arc::new(MockLookup::default());
    (
        Device::new_passthrough(Box::new(proxy), lookup, DeviceConfig::default()),
        log,
    )
}

/// Installs a test subscriber once so `tracing` output shows up with `--nocapture`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}
