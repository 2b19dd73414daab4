//! The shared device object behind every version-specific wrapper.
//!
//! One [`Device`] serves all four legacy contracts at once. Each entry point
//! takes the calling version explicitly where behaviour differs, and every
//! operation first decides between the two modes:
//!
//! * emulation, implemented directly on a [`Backend`];
//! * passthrough, forwarded to a genuine [`ProxyDevice`] with returned
//!   interfaces re-wrapped through an [`AddressLookup`].
//!
//! Rendering is single threaded. Only the per-version reference counts in
//! [`VersionRefCounts`] are safe to touch from other threads, which is why
//! they live behind their own `Arc`. A release on another thread that drops
//! the last reference only claims the teardown; the device performs it on its
//! own thread at the next entry point.

mod draw;
mod resources;
mod scene;
mod states;
mod viewports;

use std::sync::Arc;

use crate::abi::modern::{rs, tss};
use crate::backend::Backend;
use crate::collab::{
    AddressLookup, DisplayParent, MaterialObject, ProxyDevice, RawInterface, SurfaceObject,
    TextureObject,
};
use crate::config::DeviceConfig;
use crate::draw::DrawBridge;
use crate::error::{DeviceError, DeviceResult};
use crate::handles::{HandleTable, LightIndexMap};
use crate::log_limit::{log_limit, set_log_limit};
use crate::reset::{ResetCoordinator, ResetPhase};
use crate::state::ShadowState;
use crate::state_block::StateBlockTracker;
use crate::types::{ClipStatus, Viewport};
use crate::version::{DxVersion, InterfaceId, VersionRefCounts};
use crate::viewport::ViewportRegistry;
use crate::wrapper::{DeviceWrapper, WrapperPool, WrapperSet};
use crate::MAX_TEXTURE_STAGES;

/// Outcome of [`Device::query_interface`].
#[derive(Debug, Clone)]
pub enum Interface {
    /// The version-specific device wrapper. A reference was added for its version.
    Device(Arc<DeviceWrapper>),
    /// The version-independent core object, i.e. the [`Device`] itself.
    Core,
    /// An interface owned by the passthrough implementation.
    Raw(RawInterface),
}

pub struct Device {
    config: DeviceConfig,
    created_version: DxVersion,
    refs: Arc<VersionRefCounts>,
    pool: Option<Arc<WrapperPool>>,
    wrappers: WrapperSet,
    torn_down: bool,

    parent: Option<Arc<dyn DisplayParent>>,
    backend: Option<Box<dyn Backend>>,
    proxy: Option<Box<dyn ProxyDevice>>,
    lookup: Option<Arc<dyn AddressLookup>>,

    needs_defaults: bool,
    in_scene: bool,
    shadow: ShadowState,
    clip_status: ClipStatus,
    default_viewport: Option<Viewport>,
    render_target: Option<Arc<dyn SurfaceObject>>,
    stage_surfaces: [Option<Arc<dyn SurfaceObject>>; MAX_TEXTURE_STAGES],

    textures: HandleTable<dyn TextureObject>,
    materials: HandleTable<dyn MaterialObject>,
    lights: LightIndexMap,
    viewports: ViewportRegistry,
    blocks: StateBlockTracker,
    reset: ResetCoordinator,
    draw: DrawBridge,
}

/// Borrows the backend out of its slot without tying up the rest of the device.
fn backend_of(slot: &mut Option<Box<dyn Backend>>) -> DeviceResult<&mut (dyn Backend + 'static)> {
    slot.as_deref_mut().ok_or(DeviceError::InvalidObject)
}

/// Logs a failed state write made on the device's own behalf. Such writes
/// never fail the caller's operation.
fn note<E: std::fmt::Debug>(what: &'static str, result: Result<(), E>) {
    if let Err(error) = result {
        log_limit!(debug, what, ?error, "internal state write failed");
    }
}

impl Device {
    fn with_mode(
        config: DeviceConfig,
        version: DxVersion,
        parent: Option<Arc<dyn DisplayParent>>,
        backend: Option<Box<dyn Backend>>,
        proxy: Option<Box<dyn ProxyDevice>>,
        lookup: Option<Arc<dyn AddressLookup>>,
    ) -> Self {
        set_log_limit(config.log_limit);
        Self {
            config,
            created_version: version,
            refs: Arc::new(VersionRefCounts::new(version)),
            pool: None,
            wrappers: WrapperSet::default(),
            torn_down: false,
            parent,
            backend,
            proxy,
            lookup,
            needs_defaults: true,
            in_scene: false,
            shadow: ShadowState::default(),
            clip_status: ClipStatus::default(),
            default_viewport: None,
            render_target: None,
            stage_surfaces: Default::default(),
            textures: HandleTable::default(),
            materials: HandleTable::default(),
            lights: LightIndexMap::default(),
            viewports: ViewportRegistry::default(),
            blocks: StateBlockTracker::default(),
            reset: ResetCoordinator::default(),
            draw: DrawBridge::default(),
        }
    }

    /// Creates a device implemented on `backend`, first referenced through `version`.
    pub fn new_emulated(
        version: DxVersion,
        parent: Arc<dyn DisplayParent>,
        backend: Box<dyn Backend>,
        config: DeviceConfig,
    ) -> Self {
        tracing::debug!(%version, "creating emulated device");
        Self::with_mode(config, version, Some(parent), Some(backend), None, None)
    }

    /// Creates a device forwarding every call to `proxy`.
    pub fn new_passthrough(
        proxy: Box<dyn ProxyDevice>,
        lookup: Arc<dyn AddressLookup>,
        config: DeviceConfig,
    ) -> Self {
        let version = proxy.version();
        tracing::debug!(%version, "creating passthrough device");
        Self::with_mode(config, version, None, None, Some(proxy), Some(lookup))
    }

    /// Draws per-version wrappers from `pool` and hands them back on teardown.
    pub fn with_wrapper_pool(mut self, pool: Arc<WrapperPool>) -> Self {
        self.pool = Some(pool);
        self
    }

    pub fn config(&self) -> &DeviceConfig {
        &self.config
    }

    pub fn created_version(&self) -> DxVersion {
        self.created_version
    }

    pub fn is_emulated(&self) -> bool {
        self.proxy.is_none()
    }

    /// Version of the proxied implementation in passthrough mode.
    pub fn proxy_version(&self) -> Option<DxVersion> {
        self.proxy.as_ref().map(|proxy| proxy.version())
    }

    /// Reference counts shared with wrappers that may release from other
    /// threads. A teardown claimed there runs at the device's next entry
    /// point, or through [`Device::settle`].
    pub fn refs(&self) -> &Arc<VersionRefCounts> {
        &self.refs
    }

    pub fn shadow(&self) -> &ShadowState {
        &self.shadow
    }

    pub fn in_scene(&self) -> bool {
        self.in_scene
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    pub fn default_viewport(&self) -> Option<Viewport> {
        self.default_viewport
    }

    pub fn reset_phase(&self) -> ResetPhase {
        self.reset.phase()
    }

    pub fn scratch_capacity(&self) -> usize {
        self.draw.scratch_capacity()
    }

    pub fn owned_state_blocks(&self) -> usize {
        self.blocks.len()
    }

    /// Direct access for the owning process, e.g. to drive a backend reset.
    pub fn backend_mut(&mut self) -> Option<&mut (dyn Backend + 'static)> {
        self.backend.as_deref_mut()
    }

    /// Verifies the parent and backend are usable and applies the lazy
    /// defaults on first success.
    fn check(&mut self) -> DeviceResult<()> {
        self.settle();
        if self.torn_down {
            return Err(DeviceError::InvalidObject);
        }
        let ready = self.parent.as_ref().is_some_and(|parent| parent.is_ready());
        if !ready || self.backend.is_none() {
            log_limit!(warn, "backend device is not available");
            return Err(DeviceError::InvalidObject);
        }
        if self.needs_defaults {
            self.set_defaults();
        }
        Ok(())
    }

    /// `check` followed by a borrow of the backend.
    fn emulated(&mut self) -> DeviceResult<&mut (dyn Backend + 'static)> {
        self.check()?;
        backend_of(&mut self.backend)
    }

    fn parent(&self) -> DeviceResult<Arc<dyn DisplayParent>> {
        self.parent.clone().ok_or(DeviceError::InvalidObject)
    }

    fn lookup(&self) -> DeviceResult<Arc<dyn AddressLookup>> {
        self.lookup.clone().ok_or(DeviceError::InvalidObject)
    }

    /// The proxy, provided its version offers the operation.
    fn proxy_at_least(
        &mut self,
        min: DxVersion,
        op: &'static str,
    ) -> DeviceResult<&mut (dyn ProxyDevice + 'static)> {
        match self.proxy.as_deref_mut() {
            Some(proxy) if proxy.version() >= min => Ok(proxy),
            Some(proxy) => {
                log_limit!(debug, op, version = %proxy.version(), "not offered by the proxied device");
                Err(DeviceError::Generic)
            }
            None => Err(DeviceError::InvalidObject),
        }
    }

    fn set_defaults(&mut self) {
        self.needs_defaults = false;
        self.in_scene = false;
        self.blocks.reset_recording();
        self.clip_status = ClipStatus::default();
        self.shadow = ShadowState::default();

        let Some(backend) = self.backend.as_deref_mut() else {
            return;
        };
        self.shadow.alpha_blend_enabled = backend.get_render_state(rs::ALPHABLENDENABLE).unwrap_or(0);
        self.shadow.src_blend = backend.get_render_state(rs::SRCBLEND).unwrap_or(0);
        self.shadow.dest_blend = backend.get_render_state(rs::DESTBLEND).unwrap_or(0);

        // Stage n samples coordinate set n by default; legacy content expects set 0.
        for stage in 1..=6 {
            if let Err(error) = backend.set_texture_stage_state(stage, tss::TEXCOORDINDEX, 0) {
                tracing::debug!(stage, ?error, "failed to reset texture coordinate index");
            }
        }
        self.default_viewport = backend.get_viewport().ok();
        tracing::trace!(viewport = ?self.default_viewport, "device defaults applied");
    }

    /// Performs a teardown claimed by a release made elsewhere. Returns
    /// whether the device is torn down.
    pub fn settle(&mut self) -> bool {
        if self.refs.take_pending_teardown() {
            self.teardown();
        }
        self.torn_down
    }

    /// Adds a reference for `version` and returns that version's count.
    pub fn add_ref(&mut self, version: DxVersion) -> u32 {
        self.settle();
        match self.proxy.as_deref() {
            Some(proxy) => proxy.add_ref(),
            None => self.refs.add_ref(version),
        }
    }

    /// Drops a reference for `version`. Tears the device down when the last
    /// reference of any version goes away.
    pub fn release(&mut self, version: DxVersion) -> u32 {
        if let Some(proxy) = self.proxy.as_deref() {
            let remaining = proxy.release();
            if remaining == 0 {
                self.teardown();
            }
            return remaining;
        }
        let released = self.refs.release(version);
        self.settle();
        released.remaining
    }

    /// Releases everything the device still owns. Runs at most once.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.torn_down = true;
        self.refs.take_pending_teardown();

        let blocks = match self.backend.as_deref_mut() {
            Some(backend) => self.blocks.release_all(backend),
            None => {
                self.blocks.forget_all();
                0
            }
        };
        self.viewports.clear();
        self.textures.clear();
        self.materials.clear();
        self.lights.clear();
        self.stage_surfaces = Default::default();
        self.render_target = None;
        self.wrappers.drain_into(self.pool.as_deref());
        tracing::debug!(blocks, version = %self.created_version, "device torn down");
    }

    /// Severs the device from its display. State blocks are released while
    /// the backend is still alive; every later emulated call fails with
    /// invalid-object.
    pub fn detach_parent(&mut self) {
        if let Some(backend) = self.backend.as_deref_mut() {
            let released = self.blocks.release_all(backend);
            tracing::debug!(released, "released state blocks before detaching parent");
        }
        self.parent = None;
        self.backend = None;
        self.render_target = None;
        self.stage_surfaces = Default::default();
        self.needs_defaults = true;
    }

    pub fn query_interface(
        &mut self,
        iid: InterfaceId,
        version: DxVersion,
    ) -> DeviceResult<Interface> {
        if self.settle() {
            return Err(DeviceError::InvalidObject);
        }
        if let Some(proxy) = self.proxy.as_deref_mut() {
            return match iid {
                InterfaceId::RealInterface => Ok(Interface::Raw(proxy.raw_interface())),
                InterfaceId::CoreObject => Ok(Interface::Core),
                InterfaceId::Unknown | InterfaceId::Device(_) => {
                    let served = iid.device_version().unwrap_or(version);
                    proxy.query_interface(iid)?;
                    Ok(Interface::Device(
                        self.wrappers.get_or_create(served, self.pool.as_deref()),
                    ))
                }
                InterfaceId::Other(_) => {
                    let raw = proxy.query_interface(iid)?;
                    Ok(Interface::Raw(self.lookup()?.interface(raw, iid)))
                }
            };
        }

        match iid {
            InterfaceId::Unknown | InterfaceId::Device(_) => {
                let mut served = iid.device_version().unwrap_or(version);
                if self.config.convert_to_direct3d7 && served < DxVersion::V7 {
                    served = DxVersion::V7;
                }
                let wrapper = self.wrappers.get_or_create(served, self.pool.as_deref());
                self.refs.add_ref(served);
                tracing::trace!(?iid, %served, "served device interface");
                Ok(Interface::Device(wrapper))
            }
            InterfaceId::CoreObject => Ok(Interface::Core),
            InterfaceId::RealInterface | InterfaceId::Other(_) => {
                log_limit!(debug, ?iid, "interface not available in emulation");
                Err(DeviceError::NoInterface)
            }
        }
    }

    /// Queries by legacy version number; unknown numbers are not supported.
    pub fn query_device_version(&mut self, number: u32, version: DxVersion) -> DeviceResult<Interface> {
        let requested = DxVersion::from_number(number)?;
        self.query_interface(InterfaceId::Device(requested), version)
    }

    /// Snapshots backend state ahead of a destructive backend reset.
    pub fn before_reset(&mut self) {
        if self.settle() {
            return;
        }
        match self.backend.as_deref_mut() {
            Some(backend) => self.reset.before_reset(backend, &mut self.blocks),
            None => tracing::debug!("no backend to back up before reset"),
        }
    }

    /// Restores the snapshot taken by [`Device::before_reset`].
    pub fn after_reset(&mut self) -> DeviceResult<()> {
        self.settle();
        if !self.is_emulated() || self.reset.phase() == ResetPhase::Normal {
            return Ok(());
        }
        let backend = backend_of(&mut self.backend).map_err(|_| DeviceError::Generic)?;
        self.reset.after_reset(backend)
    }
}

