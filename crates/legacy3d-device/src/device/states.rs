//! Render, texture-stage, light-state and transform entry points, plus state blocks.

use crate::abi::legacy::{self, ls};
use crate::abi::modern::{rs, samp};
use crate::backend::StateBlockId;
use crate::error::{DeviceError, DeviceResult};
use crate::log_limit::log_limit;
use crate::state::{
    depth_bias_to_zbias, plan_render_state_read, plan_render_state_write,
    plan_stage_state_read, plan_stage_state_write, translate_transform, BackendWrite,
    RenderRead, RenderWrite, StageRead, StageWrite,
};
use crate::types::Matrix;
use crate::version::DxVersion;
use crate::MAX_TEXTURE_STAGES;

use super::{backend_of, Device};

fn check_stage(stage: u32) -> DeviceResult<usize> {
    let index = stage as usize;
    if index >= MAX_TEXTURE_STAGES {
        log_limit!(warn, stage, "texture stage out of range");
        return Err(DeviceError::InvalidParams);
    }
    Ok(index)
}

impl Device {
    pub fn set_render_state(&mut self, state: u32, value: u32) -> DeviceResult<()> {
        if !self.is_emulated() {
            let proxy = self.proxy_at_least(DxVersion::V2, "set_render_state")?;
            return Ok(proxy.set_render_state(state, value)?);
        }
        self.check()?;
        match plan_render_state_write(&mut self.shadow, state, value)? {
            RenderWrite::Local => Ok(()),
            RenderWrite::TextureHandle(handle) => self.bind_texture_handle(handle),
            RenderWrite::LegacyStage(stage_state, value) => {
                self.set_texture_stage_state(0, stage_state, value)
            }
            RenderWrite::Backend(writes) => self.apply_writes(0, &writes),
        }
    }

    pub fn get_render_state(&mut self, state: u32) -> DeviceResult<u32> {
        if !self.is_emulated() {
            let proxy = self.proxy_at_least(DxVersion::V2, "get_render_state")?;
            return Ok(proxy.get_render_state(state)?);
        }
        self.check()?;
        match plan_render_state_read(&self.shadow, state) {
            RenderRead::Value(value) => Ok(value),
            RenderRead::LegacyStage(stage_state) => self.get_texture_stage_state(0, stage_state),
            RenderRead::Sampler(sampler_state) => {
                Ok(backend_of(&mut self.backend)?.get_sampler_state(0, sampler_state)?)
            }
            RenderRead::Render(state) => Ok(backend_of(&mut self.backend)?.get_render_state(state)?),
            RenderRead::ZBias => {
                let bias = backend_of(&mut self.backend)?.get_render_state(rs::DEPTHBIAS)?;
                Ok(depth_bias_to_zbias(bias))
            }
        }
    }

    /// Applies a translated write plan; stage and sampler writes target `stage`.
    fn apply_writes(&mut self, stage: u32, writes: &[BackendWrite]) -> DeviceResult<()> {
        let backend = backend_of(&mut self.backend)?;
        for write in writes {
            match *write {
                BackendWrite::Render(state, value) => backend.set_render_state(state, value)?,
                BackendWrite::Stage(state, value) => {
                    backend.set_texture_stage_state(stage, state, value)?
                }
                BackendWrite::Sampler(state, value) => {
                    backend.set_sampler_state(stage, state, value)?
                }
            }
        }
        Ok(())
    }

    pub fn set_texture_stage_state(&mut self, stage: u32, state: u32, value: u32) -> DeviceResult<()> {
        if !self.is_emulated() {
            let proxy = self.proxy_at_least(DxVersion::V3, "set_texture_stage_state")?;
            return Ok(proxy.set_texture_stage_state(stage, state, value)?);
        }
        let index = check_stage(stage)?;
        self.check()?;
        let backend = backend_of(&mut self.backend)?;
        match plan_stage_state_write(state, value) {
            StageWrite::Sampler(sampler_state, value) => {
                backend.set_sampler_state(stage, sampler_state, value)?
            }
            StageWrite::Address(value) => {
                backend.set_sampler_state(stage, samp::ADDRESSU, value)?;
                backend.set_sampler_state(stage, samp::ADDRESSV, value)?;
            }
            StageWrite::MipFilter(value) => {
                backend.set_sampler_state(stage, samp::MIPFILTER, value)?;
                self.shadow.mip_filter[index] = value;
            }
            StageWrite::Stage(state, value) => backend.set_texture_stage_state(stage, state, value)?,
            StageWrite::Unknown => {
                log_limit!(warn, stage, state, value, "texture stage state not implemented");
            }
        }
        Ok(())
    }

    pub fn get_texture_stage_state(&mut self, stage: u32, state: u32) -> DeviceResult<u32> {
        if !self.is_emulated() {
            let proxy = self.proxy_at_least(DxVersion::V3, "get_texture_stage_state")?;
            return Ok(proxy.get_texture_stage_state(stage, state)?);
        }
        check_stage(stage)?;
        let backend = self.emulated()?;
        match plan_stage_state_read(state) {
            StageRead::Sampler(sampler_state, fixup) => {
                Ok(fixup.apply(backend.get_sampler_state(stage, sampler_state)?))
            }
            StageRead::Address => {
                let u = backend.get_sampler_state(stage, samp::ADDRESSU)?;
                let v = backend.get_sampler_state(stage, samp::ADDRESSV)?;
                if u != v {
                    log_limit!(warn, stage, u, v, "address modes differ between U and V");
                    return Ok(0);
                }
                Ok(u)
            }
            StageRead::Stage(state) => Ok(backend.get_texture_stage_state(stage, state)?),
            StageRead::Unknown => {
                log_limit!(warn, stage, state, "texture stage state not implemented");
                Ok(0)
            }
        }
    }

    /// Light states are a version 2 and 3 concept; a version 7 proxy gets them
    /// emulated through its render states.
    fn light_states_local(&self) -> bool {
        self.proxy_version().map_or(true, |version| version == DxVersion::V7)
    }

    pub fn set_light_state(&mut self, state: u32, value: u32) -> DeviceResult<()> {
        if !self.light_states_local() {
            let proxy = self.proxy_at_least(DxVersion::V2, "set_light_state")?;
            return Ok(proxy.set_light_state(state, value)?);
        }
        if self.is_emulated() {
            self.check()?;
        }
        match state {
            ls::MATERIAL => self.apply_material_handle(value),
            ls::AMBIENT => self.set_render_state(rs::AMBIENT, value),
            ls::FOGMODE => self.set_render_state(rs::FOGVERTEXMODE, value),
            ls::FOGSTART => self.set_render_state(rs::FOGSTART, value),
            ls::FOGEND => self.set_render_state(rs::FOGEND, value),
            ls::FOGDENSITY => self.set_render_state(rs::FOGDENSITY, value),
            ls::COLORVERTEX => self.set_render_state(rs::COLORVERTEX, value),
            ls::COLORMODEL => {
                if value != legacy::COLOR_RGB {
                    log_limit!(warn, value, "only the RGB color model is supported");
                }
                Ok(())
            }
            _ => {
                log_limit!(warn, state, value, "unknown light state");
                Err(DeviceError::InvalidParams)
            }
        }
    }

    pub fn get_light_state(&mut self, state: u32) -> DeviceResult<u32> {
        if !self.light_states_local() {
            let proxy = self.proxy_at_least(DxVersion::V2, "get_light_state")?;
            return Ok(proxy.get_light_state(state)?);
        }
        if self.is_emulated() {
            self.check()?;
        }
        match state {
            ls::MATERIAL => Ok(self.shadow.material_handle),
            ls::AMBIENT => self.get_render_state(rs::AMBIENT),
            ls::FOGMODE => self.get_render_state(rs::FOGVERTEXMODE),
            ls::FOGSTART => self.get_render_state(rs::FOGSTART),
            ls::FOGEND => self.get_render_state(rs::FOGEND),
            ls::FOGDENSITY => self.get_render_state(rs::FOGDENSITY),
            ls::COLORVERTEX => self.get_render_state(rs::COLORVERTEX),
            ls::COLORMODEL => Ok(legacy::COLOR_RGB),
            _ => {
                log_limit!(warn, state, "unknown light state");
                Err(DeviceError::InvalidParams)
            }
        }
    }

    pub fn set_transform(&mut self, state: u32, matrix: &Matrix) -> DeviceResult<()> {
        if !self.is_emulated() {
            let proxy = self.proxy_at_least(DxVersion::V2, "set_transform")?;
            return Ok(proxy.set_transform(state, matrix)?);
        }
        Ok(self.emulated()?.set_transform(translate_transform(state), matrix)?)
    }

    pub fn get_transform(&mut self, state: u32) -> DeviceResult<Matrix> {
        if !self.is_emulated() {
            let proxy = self.proxy_at_least(DxVersion::V2, "get_transform")?;
            return Ok(proxy.get_transform(state)?);
        }
        Ok(self.emulated()?.get_transform(translate_transform(state))?)
    }

    pub fn multiply_transform(&mut self, state: u32, matrix: &Matrix) -> DeviceResult<()> {
        if !self.is_emulated() {
            let proxy = self.proxy_at_least(DxVersion::V2, "multiply_transform")?;
            return Ok(proxy.multiply_transform(state, matrix)?);
        }
        Ok(self.emulated()?.multiply_transform(translate_transform(state), matrix)?)
    }

    pub fn begin_state_block(&mut self) -> DeviceResult<()> {
        if !self.is_emulated() {
            let proxy = self.proxy_at_least(DxVersion::V7, "begin_state_block")?;
            return Ok(proxy.begin_state_block()?);
        }
        self.check()?;
        self.blocks.begin(backend_of(&mut self.backend)?)
    }

    pub fn end_state_block(&mut self) -> DeviceResult<StateBlockId> {
        if !self.is_emulated() {
            let proxy = self.proxy_at_least(DxVersion::V7, "end_state_block")?;
            return Ok(proxy.end_state_block()?);
        }
        self.check()?;
        self.blocks.end(backend_of(&mut self.backend)?)
    }

    pub fn create_state_block(&mut self, kind: u32) -> DeviceResult<StateBlockId> {
        if !self.is_emulated() {
            let proxy = self.proxy_at_least(DxVersion::V7, "create_state_block")?;
            return Ok(proxy.create_state_block(kind)?);
        }
        self.check()?;
        self.blocks.create(backend_of(&mut self.backend)?, kind)
    }

    pub fn apply_state_block(&mut self, block: StateBlockId) -> DeviceResult<()> {
        if !self.is_emulated() {
            let proxy = self.proxy_at_least(DxVersion::V7, "apply_state_block")?;
            return Ok(proxy.apply_state_block(block)?);
        }
        self.check()?;
        self.blocks.apply(backend_of(&mut self.backend)?, block)
    }

    pub fn capture_state_block(&mut self, block: StateBlockId) -> DeviceResult<()> {
        if !self.is_emulated() {
            let proxy = self.proxy_at_least(DxVersion::V7, "capture_state_block")?;
            return Ok(proxy.capture_state_block(block)?);
        }
        self.check()?;
        self.blocks.capture(backend_of(&mut self.backend)?, block)
    }

    pub fn delete_state_block(&mut self, block: StateBlockId) -> DeviceResult<()> {
        if !self.is_emulated() {
            let proxy = self.proxy_at_least(DxVersion::V7, "delete_state_block")?;
            return Ok(proxy.delete_state_block(block)?);
        }
        self.check()?;
        self.blocks.delete(backend_of(&mut self.backend)?, block)
    }
}
