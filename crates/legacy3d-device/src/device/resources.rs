//! Textures, handles, render target, lights and materials.

use std::sync::Arc;

use crate::abi::legacy::{light_type, rs as lrs};
use crate::collab::{
    same_object, LightObject, MaterialObject, RawInterface, SurfaceObject, TextureObject,
};
use crate::error::{DeviceError, DeviceResult};
use crate::log_limit::log_limit;
use crate::types::{LegacyLight, LegacyMaterial, Light, Material, Point, Rect};
use crate::version::DxVersion;
use crate::MAX_TEXTURE_STAGES;

use super::{backend_of, Device};

/// Applied to spot lights whose inner cone is not narrower than the outer one.
const SPOT_THETA_DIVISOR: f32 = 1.75;

fn raw(interface: Option<RawInterface>) -> DeviceResult<RawInterface> {
    interface.ok_or(DeviceError::InvalidParams)
}

fn stage_index(stage: u32) -> DeviceResult<usize> {
    let index = stage as usize;
    if index >= MAX_TEXTURE_STAGES {
        return Err(DeviceError::InvalidParams);
    }
    Ok(index)
}

impl Device {
    /// Associates `handle` with a texture. Handle 0 and a missing texture are
    /// invalid.
    pub fn set_texture_handle(
        &mut self,
        handle: u32,
        texture: Option<&Arc<dyn TextureObject>>,
    ) -> DeviceResult<()> {
        self.textures.set(handle, texture)?;
        if let Some(texture) = texture {
            texture.set_handle(handle);
        }
        Ok(())
    }

    pub fn texture_for_handle(&self, handle: u32) -> Option<Arc<dyn TextureObject>> {
        self.textures.get(handle).cloned()
    }

    /// Release notification from a texture wrapper: drops every mapping to it.
    /// A bound `TEXTUREHANDLE` that referred to it reads back as 0.
    pub fn release_texture_handle(&mut self, texture: &Arc<dyn TextureObject>) {
        let bound = self.shadow.texture_handle;
        if bound != 0
            && self
                .textures
                .get(bound)
                .is_some_and(|current| same_object(current, texture))
        {
            self.shadow.texture_handle = 0;
        }
        let removed = self.textures.release_object(texture);
        if removed > 0 {
            tracing::trace!(removed, "texture handles released");
        }
    }

    pub fn set_material_handle(
        &mut self,
        handle: u32,
        material: Option<&Arc<dyn MaterialObject>>,
    ) -> DeviceResult<()> {
        self.materials.set(handle, material)
    }

    pub fn material_for_handle(&self, handle: u32) -> Option<Arc<dyn MaterialObject>> {
        self.materials.get(handle).cloned()
    }

    pub fn release_material_handle(&mut self, material: &Arc<dyn MaterialObject>) {
        self.materials.release_object(material);
    }

    /// Binds the texture behind `handle` to stage 0. Unknown handles are
    /// logged and ignored.
    pub(super) fn bind_texture_handle(&mut self, handle: u32) -> DeviceResult<()> {
        if handle == 0 {
            self.shadow.texture_handle = 0;
            return self.set_texture(0, None);
        }
        let Some(texture) = self.textures.get(handle).cloned() else {
            log_limit!(warn, handle, "unknown texture handle");
            return Ok(());
        };
        self.set_texture_object(0, Some(&texture))?;
        self.shadow.texture_handle = handle;
        Ok(())
    }

    /// Exchanges the handles of two textures, in the table and on the objects.
    pub fn swap_texture_handles(
        &mut self,
        a: &Arc<dyn TextureObject>,
        b: &Arc<dyn TextureObject>,
    ) -> DeviceResult<()> {
        if self.proxy_version().is_some_and(|version| version < DxVersion::V3) {
            let (raw_a, raw_b) = (raw(a.raw_interface())?, raw(b.raw_interface())?);
            let proxy = self.proxy_at_least(DxVersion::V1, "swap_texture_handles")?;
            return Ok(proxy.swap_texture_handles(raw_a, raw_b)?);
        }

        let (handle_a, handle_b) = self.textures.swap(a, b)?;
        a.set_handle(handle_b);
        b.set_handle(handle_a);

        let bound = self.shadow.texture_handle;
        if bound != 0 && (bound == handle_a || bound == handle_b) {
            self.bind_texture_handle(bound)?;
        }
        Ok(())
    }

    pub fn set_texture(
        &mut self,
        stage: u32,
        surface: Option<&Arc<dyn SurfaceObject>>,
    ) -> DeviceResult<()> {
        if !self.is_emulated() {
            let interface = surface.map(|s| raw(s.raw_interface())).transpose()?;
            let proxy = self.proxy_at_least(DxVersion::V3, "set_texture")?;
            return Ok(proxy.set_texture(stage, interface)?);
        }
        let index = stage_index(stage)?;
        self.check()?;
        let backend = backend_of(&mut self.backend)?;
        match surface {
            None => {
                backend.set_texture(stage, None)?;
                self.stage_surfaces[index] = None;
            }
            Some(surface) => {
                let Some(texture) = surface.backend_texture() else {
                    log_limit!(warn, stage, "surface has no backend texture");
                    return Err(DeviceError::Generic);
                };
                backend.set_texture(stage, Some(texture))?;
                self.stage_surfaces[index] = Some(Arc::clone(surface));
            }
        }
        Ok(())
    }

    /// Binds a texture interface; emulation binds the surface behind it.
    pub fn set_texture_object(
        &mut self,
        stage: u32,
        texture: Option<&Arc<dyn TextureObject>>,
    ) -> DeviceResult<()> {
        if !self.is_emulated() {
            let interface = texture.map(|t| raw(t.raw_interface())).transpose()?;
            let proxy = self.proxy_at_least(DxVersion::V3, "set_texture")?;
            return Ok(proxy.set_texture(stage, interface)?);
        }
        let surface = match texture {
            Some(texture) => Some(texture.surface().ok_or(DeviceError::InvalidParams)?),
            None => None,
        };
        self.set_texture(stage, surface.as_ref())
    }

    pub fn get_texture(
        &mut self,
        stage: u32,
        version: DxVersion,
    ) -> DeviceResult<Option<Arc<dyn SurfaceObject>>> {
        if !self.is_emulated() {
            let proxy = self.proxy_at_least(DxVersion::V3, "get_texture")?;
            let Some(interface) = proxy.get_texture(stage)? else {
                return Ok(None);
            };
            return Ok(Some(self.lookup()?.surface(interface, version)));
        }
        Ok(self.stage_surfaces[stage_index(stage)?].clone())
    }

    pub fn get_texture_object(
        &mut self,
        stage: u32,
        version: DxVersion,
    ) -> DeviceResult<Option<Arc<dyn TextureObject>>> {
        if !self.is_emulated() {
            let proxy = self.proxy_at_least(DxVersion::V3, "get_texture")?;
            let Some(interface) = proxy.get_texture(stage)? else {
                return Ok(None);
            };
            return Ok(Some(self.lookup()?.texture(interface, version)));
        }
        let surface = &self.stage_surfaces[stage_index(stage)?];
        Ok(surface.as_ref().and_then(|surface| surface.texture()))
    }

    pub fn set_render_target(&mut self, surface: &Arc<dyn SurfaceObject>) -> DeviceResult<()> {
        if !self.is_emulated() {
            let interface = raw(surface.raw_interface())?;
            let proxy = self.proxy_at_least(DxVersion::V2, "set_render_target")?;
            return Ok(proxy.set_render_target(interface)?);
        }
        self.check()?;
        if self
            .render_target
            .as_ref()
            .is_some_and(|current| same_object(current, surface))
        {
            return Ok(());
        }
        self.parent()?.set_render_target(surface)?;
        self.render_target = Some(Arc::clone(surface));
        Ok(())
    }

    pub fn get_render_target(&mut self, version: DxVersion) -> DeviceResult<Arc<dyn SurfaceObject>> {
        if !self.is_emulated() {
            let proxy = self.proxy_at_least(DxVersion::V2, "get_render_target")?;
            let interface = proxy.get_render_target()?;
            return Ok(self.lookup()?.surface(interface, version));
        }
        self.check()?;
        if let Some(target) = &self.render_target {
            return Ok(Arc::clone(target));
        }
        self.parent()?.render_target().ok_or(DeviceError::Generic)
    }

    pub fn pre_load(&mut self, surface: &Arc<dyn SurfaceObject>) -> DeviceResult<()> {
        if !self.is_emulated() {
            let interface = raw(surface.raw_interface())?;
            let proxy = self.proxy_at_least(DxVersion::V7, "pre_load")?;
            return Ok(proxy.pre_load(interface)?);
        }
        // Textures are resident once created.
        self.check()
    }

    pub fn load(
        &mut self,
        dest: &Arc<dyn SurfaceObject>,
        dest_point: Point,
        src: &Arc<dyn SurfaceObject>,
        src_rect: Option<Rect>,
        flags: u32,
    ) -> DeviceResult<()> {
        if !self.is_emulated() {
            let (dest_raw, src_raw) = (raw(dest.raw_interface())?, raw(src.raw_interface())?);
            let proxy = self.proxy_at_least(DxVersion::V7, "load")?;
            return Ok(proxy.load(dest_raw, dest_point, src_raw, src_rect, flags)?);
        }
        self.check()?;
        dest.load_from(dest_point, &**src, src_rect)
    }

    pub fn set_light(&mut self, index: u32, light: &Light) -> DeviceResult<()> {
        if !self.is_emulated() {
            let proxy = self.proxy_at_least(DxVersion::V7, "set_light")?;
            return Ok(proxy.set_light(index, light)?);
        }
        self.check()?;
        if light.is_legacy_only_type() {
            log_limit!(warn, index, light_type = light.light_type, "light type is not supported");
            return Ok(());
        }
        let mut light = *light;
        if light.light_type == light_type::SPOT && light.theta <= light.phi {
            light.theta /= SPOT_THETA_DIVISOR;
        }
        Ok(backend_of(&mut self.backend)?.set_light(index, &light)?)
    }

    pub fn get_light(&mut self, index: u32) -> DeviceResult<Light> {
        if !self.is_emulated() {
            let proxy = self.proxy_at_least(DxVersion::V7, "get_light")?;
            return Ok(proxy.get_light(index)?);
        }
        Ok(self.emulated()?.get_light(index)?)
    }

    pub fn light_enable(&mut self, index: u32, enable: bool) -> DeviceResult<()> {
        if !self.is_emulated() {
            let proxy = self.proxy_at_least(DxVersion::V7, "light_enable")?;
            return Ok(proxy.light_enable(index, enable)?);
        }
        Ok(self.emulated()?.light_enable(index, enable)?)
    }

    pub fn get_light_enable(&mut self, index: u32) -> DeviceResult<bool> {
        if !self.is_emulated() {
            let proxy = self.proxy_at_least(DxVersion::V7, "get_light_enable")?;
            return Ok(proxy.get_light_enable(index)?);
        }
        Ok(self.emulated()?.get_light_enable(index)?)
    }

    /// Applies a legacy light object's data at the index assigned to that
    /// object, switching it on unless a `D3DLIGHT2` says otherwise.
    pub fn set_light_object(
        &mut self,
        light: &Arc<dyn LightObject>,
        data: &LegacyLight,
    ) -> DeviceResult<()> {
        if !data.has_valid_size() {
            log_limit!(warn, size = data.size, "invalid legacy light size");
            return Err(DeviceError::InvalidParams);
        }
        let index = self.lights.index_for(light)?;
        self.set_light(index, &data.to_light())?;
        self.light_enable(index, data.is_active())
    }

    pub fn light_enable_object(&mut self, light: &Arc<dyn LightObject>, enable: bool) -> DeviceResult<()> {
        let index = self.lights.index_of(light).ok_or(DeviceError::InvalidParams)?;
        self.light_enable(index, enable)
    }

    pub fn get_light_enable_object(&mut self, light: &Arc<dyn LightObject>) -> DeviceResult<bool> {
        let index = self.lights.index_of(light).ok_or(DeviceError::InvalidParams)?;
        self.get_light_enable(index)
    }

    pub fn light_index(&self, light: &Arc<dyn LightObject>) -> Option<u32> {
        self.lights.index_of(light)
    }

    /// Release notification from a light object: switches its slot off and
    /// frees the index.
    pub fn release_light_interface(&mut self, light: &Arc<dyn LightObject>) {
        let Some(index) = self.lights.index_of(light) else {
            return;
        };
        if let Err(error) = self.light_enable(index, false) {
            tracing::debug!(index, ?error, "failed to disable released light");
        }
        self.lights.release(light);
    }

    pub fn set_material(&mut self, material: &Material) -> DeviceResult<()> {
        if !self.is_emulated() {
            let proxy = self.proxy_at_least(DxVersion::V7, "set_material")?;
            return Ok(proxy.set_material(material)?);
        }
        Ok(self.emulated()?.set_material(material)?)
    }

    pub fn get_material(&mut self) -> DeviceResult<Material> {
        if !self.is_emulated() {
            let proxy = self.proxy_at_least(DxVersion::V7, "get_material")?;
            return Ok(proxy.get_material()?);
        }
        Ok(self.emulated()?.get_material()?)
    }

    /// Makes a version 1–3 material current. A material naming a texture
    /// handle also binds that texture to stage 0.
    pub fn set_legacy_material(&mut self, material: &LegacyMaterial) -> DeviceResult<()> {
        if material.ramp_size != 0 {
            log_limit!(warn, ramp_size = material.ramp_size, "ramp materials are not supported");
        }
        self.set_material(&(*material).into())?;
        if material.texture_handle != 0 {
            self.set_render_state(lrs::TEXTUREHANDLE, material.texture_handle)?;
        }
        Ok(())
    }

    /// `MATERIAL` light state: 0 clears the material, unknown handles are
    /// logged and ignored.
    pub(super) fn apply_material_handle(&mut self, handle: u32) -> DeviceResult<()> {
        if handle == 0 {
            self.set_material(&Material::default())?;
            self.shadow.material_handle = 0;
            return Ok(());
        }
        let Some(material) = self.materials.get(handle).map(|m| m.material()) else {
            log_limit!(warn, handle, "unknown material handle");
            return Ok(());
        };
        self.set_legacy_material(&material)?;
        self.shadow.material_handle = handle;
        Ok(())
    }
}
