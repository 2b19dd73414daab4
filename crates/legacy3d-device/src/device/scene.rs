//! Scene bracketing, clears, capabilities and the remaining device queries.

use std::sync::Arc;

use crate::abi::legacy::clip_status;
use crate::abi::modern::format;
use crate::backend::ClearRect;
use crate::collab::{DeviceStats, Direct3DObject};
use crate::error::{DeviceError, DeviceResult};
use crate::log_limit::log_limit;
use crate::types::{ClipStatus, DeviceDesc, Vector};
use crate::version::DxVersion;

use super::{backend_of, Device};

/// Texture formats offered to legacy enumeration, in reporting order.
const TEXTURE_FORMATS: [u32; 10] = [
    format::X1R5G5B5,
    format::A1R5G5B5,
    format::A4R4G4B4,
    format::R5G6B5,
    format::X8R8G8B8,
    format::A8R8G8B8,
    format::P8,
    format::DXT1,
    format::DXT3,
    format::DXT5,
];

impl Device {
    pub fn begin_scene(&mut self) -> DeviceResult<()> {
        if !self.is_emulated() {
            let proxy = self.proxy_at_least(DxVersion::V1, "begin_scene")?;
            return Ok(proxy.begin_scene()?);
        }
        self.check()?;
        self.parent()?.enable_3d();
        match backend_of(&mut self.backend)?.begin_scene() {
            Ok(()) => {
                self.in_scene = true;
                Ok(())
            }
            Err(error) => {
                log_limit!(warn, ?error, "backend failed to begin scene");
                Err(error.into())
            }
        }
    }

    pub fn end_scene(&mut self) -> DeviceResult<()> {
        if !self.is_emulated() {
            let proxy = self.proxy_at_least(DxVersion::V1, "end_scene")?;
            return Ok(proxy.end_scene()?);
        }
        self.check()?;
        if let Err(error) = backend_of(&mut self.backend)?.end_scene() {
            log_limit!(warn, ?error, "backend failed to end scene");
            return Err(error.into());
        }
        self.in_scene = false;
        self.parent()?.present_frame()
    }

    pub fn clear(
        &mut self,
        rects: &[ClearRect],
        flags: u32,
        color: u32,
        z: f32,
        stencil: u32,
    ) -> DeviceResult<()> {
        if !self.is_emulated() {
            let proxy = self.proxy_at_least(DxVersion::V7, "clear")?;
            return Ok(proxy.clear(rects, flags, color, z, stencil)?);
        }
        Ok(self.emulated()?.clear(rects, flags, color, z, stencil)?)
    }

    pub fn get_caps(&mut self) -> DeviceResult<DeviceDesc> {
        if !self.is_emulated() {
            return Ok(self.proxy_at_least(DxVersion::V1, "get_caps")?.get_caps()?);
        }
        Ok(self.emulated()?.caps()?.into())
    }

    /// Formats the backend accepts for textures, in legacy reporting order.
    pub fn enum_texture_formats(&mut self) -> DeviceResult<Vec<u32>> {
        if !self.is_emulated() {
            let proxy = self.proxy_at_least(DxVersion::V1, "enum_texture_formats")?;
            return Ok(proxy.enum_texture_formats()?);
        }
        let backend = self.emulated()?;
        Ok(TEXTURE_FORMATS
            .into_iter()
            .filter(|&id| backend.supports_texture_format(id))
            .collect())
    }

    /// Number of passes the backend needs for the current state.
    pub fn validate_device(&mut self) -> DeviceResult<u32> {
        if !self.is_emulated() {
            let proxy = self.proxy_at_least(DxVersion::V3, "validate_device")?;
            return Ok(proxy.validate_device()?);
        }
        self.check()?;
        let stream = self.parent()?.validation_vertex_buffer();
        let backend = backend_of(&mut self.backend)?;
        if let Some((buffer, stride)) = stream {
            backend.set_stream_source(buffer, stride)?;
        }
        Ok(backend.validate_device()?)
    }

    /// Every sphere is reported visible.
    pub fn compute_sphere_visibility(
        &mut self,
        centers: &[Vector],
        radii: &[f32],
    ) -> DeviceResult<Vec<u32>> {
        if !self.is_emulated() {
            let proxy = self.proxy_at_least(DxVersion::V3, "compute_sphere_visibility")?;
            return Ok(proxy.compute_sphere_visibility(centers, radii)?);
        }
        if centers.len() != radii.len() {
            return Err(DeviceError::InvalidParams);
        }
        self.check()?;
        log_limit!(warn, spheres = centers.len(), "sphere visibility is not computed");
        Ok(vec![0; centers.len()])
    }

    pub fn set_clip_status(&mut self, status: &ClipStatus) -> DeviceResult<()> {
        if !self.is_emulated() {
            let proxy = self.proxy_at_least(DxVersion::V2, "set_clip_status")?;
            return Ok(proxy.set_clip_status(status)?);
        }
        if status.flags & clip_status::EXTENTS3 != 0 {
            log_limit!(warn, flags = status.flags, "3D clip extents are not supported");
            return Err(DeviceError::InvalidParams);
        }
        if status.flags & clip_status::EXTENTS2 != 0 {
            log_limit!(debug, "2D clip extents are stored but never updated");
            self.clip_status = *status;
        } else if status.flags & clip_status::STATUS != 0 {
            self.clip_status = ClipStatus {
                flags: clip_status::STATUS,
                status: 0,
                ..Default::default()
            };
        }
        Ok(())
    }

    pub fn get_clip_status(&mut self) -> DeviceResult<ClipStatus> {
        if !self.is_emulated() {
            let proxy = self.proxy_at_least(DxVersion::V2, "get_clip_status")?;
            return Ok(proxy.get_clip_status()?);
        }
        Ok(self.clip_status)
    }

    pub fn set_clip_plane(&mut self, index: u32, plane: [f32; 4]) -> DeviceResult<()> {
        if !self.is_emulated() {
            let proxy = self.proxy_at_least(DxVersion::V7, "set_clip_plane")?;
            return Ok(proxy.set_clip_plane(index, plane)?);
        }
        Ok(self.emulated()?.set_clip_plane(index, plane)?)
    }

    pub fn get_clip_plane(&mut self, index: u32) -> DeviceResult<[f32; 4]> {
        if !self.is_emulated() {
            let proxy = self.proxy_at_least(DxVersion::V7, "get_clip_plane")?;
            return Ok(proxy.get_clip_plane(index)?);
        }
        Ok(self.emulated()?.get_clip_plane(index)?)
    }

    /// Debug device information. Emulation never has any: `Ok(false)`.
    pub fn get_info(&mut self, id: u32, buffer: &mut [u8]) -> DeviceResult<bool> {
        if !self.is_emulated() {
            let proxy = self.proxy_at_least(DxVersion::V7, "get_info")?;
            return Ok(proxy.get_info(id, buffer)?);
        }
        if buffer.is_empty() {
            return Err(DeviceError::Generic);
        }
        log_limit!(debug, id, "device info not available");
        Ok(false)
    }

    pub fn get_stats(&mut self) -> DeviceResult<DeviceStats> {
        match self.proxy_version() {
            Some(version) if version < DxVersion::V7 => {
                Ok(self.proxy_at_least(DxVersion::V1, "get_stats")?.get_stats()?)
            }
            _ => {
                log_limit!(warn, "device statistics are not supported");
                Err(DeviceError::Unsupported)
            }
        }
    }

    pub fn get_direct3d(&mut self, version: DxVersion) -> DeviceResult<Arc<dyn Direct3DObject>> {
        if !self.is_emulated() {
            let raw = self.proxy_at_least(DxVersion::V1, "get_direct3d")?.get_direct3d()?;
            return Ok(self.lookup()?.direct3d(raw, version));
        }
        self.parent()?.direct3d(version).ok_or(DeviceError::Generic)
    }
}
