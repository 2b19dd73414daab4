//! Draw entry points and the state bracket around every draw.
//!
//! Emulated draws follow one sequence: validate, normalize the vertex
//! format, expand `D3DLVERTEX` data, bind the format, bracket the draw
//! flags, draw, restore. The restore runs whether or not the draw succeeded.

use std::sync::Arc;

use crate::abi::legacy::rs as lrs;
use crate::abi::modern::{cmp, rs, samp, texf};
use crate::collab::{ProxyDevice, StridedComponent, VertexBufferObject, VertexFormat};
use crate::config::ByteAlignmentFix;
use crate::draw::flags::DrawFlags;
use crate::draw::topology::PrimitiveType;
use crate::draw::vertex::{vertex_type_to_fvf, Fvf, FVF_LVERTEX, FVF_LVERTEX9};
use crate::error::{BackendError, BackendResult, DeviceError, DeviceResult};
use crate::log_limit::log_limit;
use crate::version::DxVersion;
use crate::MAX_TEXTURE_STAGES;

use super::{backend_of, note, Device};

fn topology(primitive: u32) -> DeviceResult<PrimitiveType> {
    PrimitiveType::from_u32(primitive).ok_or_else(|| {
        log_limit!(warn, primitive, "unknown primitive type");
        DeviceError::InvalidParams
    })
}

fn finish_draw(op: &'static str, result: BackendResult<()>) -> DeviceResult<()> {
    result.map_err(|error| {
        log_limit!(warn, op, ?error, "draw failed");
        error.into()
    })
}

fn fvf_of(format: VertexFormat) -> Fvf {
    match format {
        VertexFormat::Fvf(mask) => Fvf::from_bits_retain(mask),
        VertexFormat::Type(_) => Fvf::empty(),
    }
}

fn filter_override(fix: ByteAlignmentFix) -> Option<(u32, u32)> {
    match fix {
        ByteAlignmentFix::Off | ByteAlignmentFix::AlignOnly => None,
        ByteAlignmentFix::Point => Some((texf::POINT, texf::POINT)),
        ByteAlignmentFix::Linear => Some((texf::LINEAR, texf::LINEAR)),
    }
}

impl Device {
    /// Low and high color key handed to the color-key pixel shader.
    pub fn set_color_key_range(&mut self, low: [f32; 4], high: [f32; 4]) {
        self.draw.color_key_range = (low, high);
    }

    /// Expands a version 2 vertex-type tag unless it goes to a version 2 proxy.
    fn normalize_format(&self, format: VertexFormat) -> DeviceResult<VertexFormat> {
        match format {
            VertexFormat::Type(tag)
                if self.proxy_version().map_or(true, |v| v > DxVersion::V2) =>
            {
                let fvf = vertex_type_to_fvf(tag).map_err(|error| {
                    log_limit!(warn, vertex_type = tag, "invalid vertex type");
                    error
                })?;
                Ok(VertexFormat::Fvf(fvf.bits()))
            }
            other => Ok(other),
        }
    }

    /// Forwards a draw to the proxy. A version 7 proxy serving an older
    /// caller gets the legacy-only flags applied as render states instead.
    fn forward_draw(
        &mut self,
        version: DxVersion,
        min: DxVersion,
        op: &'static str,
        fvf: Fvf,
        flags: DrawFlags,
        call: impl FnOnce(&mut dyn ProxyDevice, u32) -> BackendResult<()>,
    ) -> DeviceResult<()> {
        let proxy_version = self.proxy_at_least(min, op)?.version();
        let flags = flags.difference(DrawFlags::INTERNAL);
        if proxy_version == DxVersion::V7 && version < DxVersion::V7 {
            let applied = self.set_draw_states(version, fvf, flags);
            let forwarded = applied.difference(DrawFlags::LEGACY_ONLY | DrawFlags::INTERNAL);
            let result = match self.proxy.as_deref_mut() {
                Some(proxy) => call(proxy, forwarded.bits()),
                None => Err(BackendError::FAIL),
            };
            self.restore_draw_states(version, fvf, applied);
            return finish_draw(op, result);
        }
        let proxy = self.proxy_at_least(min, op)?;
        finish_draw(op, call(proxy, flags.bits()))
    }

    /// Binds `fvf` on the backend, substituting the backend layout for
    /// `D3DLVERTEX`. Returns the bound format, its stride and the number of
    /// converted bytes waiting in the scratch buffer.
    fn prepare_vertices(
        &mut self,
        fvf: Fvf,
        vertices: &[u8],
        vertex_count: u32,
    ) -> DeviceResult<(Fvf, u32, Option<usize>)> {
        let count = vertex_count as usize;
        let (fvf, converted) = if fvf == FVF_LVERTEX {
            let len = self.draw.scratch.convert_lvertices(vertices, count)?.len();
            (FVF_LVERTEX9, Some(len))
        } else {
            (fvf, None)
        };
        let stride = fvf.stride().ok_or_else(|| {
            log_limit!(warn, fvf = fvf.bits(), "malformed vertex format");
            DeviceError::InvalidParams
        })?;
        if converted.is_none() && vertices.len() < count.saturating_mul(stride as usize) {
            return Err(DeviceError::InvalidParams);
        }
        if let Err(error) = backend_of(&mut self.backend)?.set_fvf(fvf.bits()) {
            log_limit!(warn, fvf = fvf.bits(), ?error, "failed to set vertex format");
            return Err(DeviceError::InvalidParams);
        }
        Ok((fvf, stride, converted))
    }

    pub fn draw_primitive(
        &mut self,
        version: DxVersion,
        primitive: u32,
        format: VertexFormat,
        vertices: &[u8],
        vertex_count: u32,
        flags: DrawFlags,
    ) -> DeviceResult<()> {
        let format = self.normalize_format(format)?;
        if !self.is_emulated() {
            return self.forward_draw(
                version,
                DxVersion::V2,
                "draw_primitive",
                fvf_of(format),
                flags,
                |proxy, flags| proxy.draw_primitive(primitive, format, vertices, vertex_count, flags),
            );
        }
        self.check()?;
        let primitive = topology(primitive)?;
        let (fvf, stride, converted) = self.prepare_vertices(fvf_of(format), vertices, vertex_count)?;

        let applied = self.set_draw_states(version, fvf, flags);
        let data = match converted {
            Some(len) => self.draw.scratch.converted(len),
            None => vertices,
        };
        let result = match self.backend.as_deref_mut() {
            Some(backend) => backend.draw_primitive_up(
                primitive,
                primitive.primitive_count(vertex_count),
                data,
                stride,
            ),
            None => Err(BackendError::FAIL),
        };
        self.restore_draw_states(version, fvf, applied);
        finish_draw("draw_primitive", result)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn draw_indexed_primitive(
        &mut self,
        version: DxVersion,
        primitive: u32,
        format: VertexFormat,
        vertices: &[u8],
        vertex_count: u32,
        indices: &[u16],
        flags: DrawFlags,
    ) -> DeviceResult<()> {
        let format = self.normalize_format(format)?;
        if !self.is_emulated() {
            return self.forward_draw(
                version,
                DxVersion::V2,
                "draw_indexed_primitive",
                fvf_of(format),
                flags,
                |proxy, flags| {
                    proxy.draw_indexed_primitive(primitive, format, vertices, vertex_count, indices, flags)
                },
            );
        }
        self.check()?;
        let primitive = topology(primitive)?;
        let (fvf, stride, converted) = self.prepare_vertices(fvf_of(format), vertices, vertex_count)?;
        let index_count = u32::try_from(indices.len()).map_err(|_| DeviceError::InvalidParams)?;

        let applied = self.set_draw_states(version, fvf, flags);
        let data = match converted {
            Some(len) => self.draw.scratch.converted(len),
            None => vertices,
        };
        let result = match self.backend.as_deref_mut() {
            Some(backend) => backend.draw_indexed_primitive_up(
                primitive,
                vertex_count,
                primitive.primitive_count(index_count),
                indices,
                data,
                stride,
            ),
            None => Err(BackendError::FAIL),
        };
        self.restore_draw_states(version, fvf, applied);
        finish_draw("draw_indexed_primitive", result)
    }

    /// Strided draws are only available through a proxy.
    #[allow(clippy::too_many_arguments)]
    pub fn draw_primitive_strided(
        &mut self,
        version: DxVersion,
        primitive: u32,
        fvf: u32,
        components: &[StridedComponent<'_>],
        vertex_count: u32,
        indices: Option<&[u16]>,
        flags: DrawFlags,
    ) -> DeviceResult<()> {
        if self.is_emulated() {
            log_limit!(warn, "strided draws are not supported");
            return Err(DeviceError::Unsupported);
        }
        self.forward_draw(
            version,
            DxVersion::V3,
            "draw_primitive_strided",
            Fvf::from_bits_retain(fvf),
            flags,
            |proxy, flags| {
                proxy.draw_primitive_strided(primitive, fvf, components, vertex_count, indices, flags)
            },
        )
    }

    /// Buffer layout and backend binding shared by the vertex-buffer draws.
    fn bind_vertex_buffer(
        &mut self,
        buffer: &Arc<dyn VertexBufferObject>,
    ) -> DeviceResult<(Fvf, u32)> {
        let Some(id) = buffer.backend_buffer() else {
            log_limit!(warn, "vertex buffer has no backend buffer");
            return Err(DeviceError::Generic);
        };
        let fvf = Fvf::from_bits_retain(buffer.fvf());
        let stride = fvf.stride().ok_or(DeviceError::InvalidParams)?;
        let backend = backend_of(&mut self.backend)?;
        if let Err(error) = backend.set_fvf(fvf.bits()) {
            log_limit!(warn, fvf = fvf.bits(), ?error, "failed to set vertex format");
            return Err(DeviceError::InvalidParams);
        }
        backend.set_stream_source(id, stride)?;
        Ok((fvf, stride))
    }

    pub fn draw_primitive_vb(
        &mut self,
        version: DxVersion,
        primitive: u32,
        buffer: &Arc<dyn VertexBufferObject>,
        start_vertex: u32,
        vertex_count: u32,
        flags: DrawFlags,
    ) -> DeviceResult<()> {
        if !self.is_emulated() {
            let raw = buffer.raw_interface().ok_or(DeviceError::InvalidParams)?;
            return self.forward_draw(
                version,
                DxVersion::V3,
                "draw_primitive_vb",
                Fvf::from_bits_retain(buffer.fvf()),
                flags,
                |proxy, flags| proxy.draw_primitive_vb(primitive, raw, start_vertex, vertex_count, flags),
            );
        }
        self.check()?;
        let primitive = topology(primitive)?;
        let (fvf, _) = self.bind_vertex_buffer(buffer)?;

        let applied = self.set_draw_states(version, fvf, flags);
        let result = match self.backend.as_deref_mut() {
            Some(backend) => backend.draw_primitive(
                primitive,
                start_vertex,
                primitive.primitive_count(vertex_count),
            ),
            None => Err(BackendError::FAIL),
        };
        self.restore_draw_states(version, fvf, applied);
        finish_draw("draw_primitive_vb", result)
    }

    /// Indexed draw from a vertex buffer. Client index arrays are turned into
    /// a backend index buffer by the parent's cache; an empty array draws nothing.
    #[allow(clippy::too_many_arguments)]
    pub fn draw_indexed_primitive_vb(
        &mut self,
        version: DxVersion,
        primitive: u32,
        buffer: &Arc<dyn VertexBufferObject>,
        start_vertex: u32,
        vertex_count: u32,
        indices: &[u16],
        flags: DrawFlags,
    ) -> DeviceResult<()> {
        if !self.is_emulated() {
            let raw = buffer.raw_interface().ok_or(DeviceError::InvalidParams)?;
            return self.forward_draw(
                version,
                DxVersion::V3,
                "draw_indexed_primitive_vb",
                Fvf::from_bits_retain(buffer.fvf()),
                flags,
                |proxy, flags| {
                    proxy.draw_indexed_primitive_vb(primitive, raw, start_vertex, vertex_count, indices, flags)
                },
            );
        }
        self.check()?;
        let primitive = topology(primitive)?;
        let base_vertex = i32::try_from(start_vertex).map_err(|_| DeviceError::InvalidParams)?;
        let index_count = u32::try_from(indices.len()).map_err(|_| DeviceError::InvalidParams)?;
        let (fvf, _) = self.bind_vertex_buffer(buffer)?;
        if index_count == 0 {
            return Ok(());
        }
        let Some(index_buffer) = self.parent()?.index_buffer(indices) else {
            log_limit!(warn, index_count, "no index buffer available for draw");
            return Err(DeviceError::Generic);
        };
        backend_of(&mut self.backend)?.set_indices(index_buffer)?;

        let applied = self.set_draw_states(version, fvf, flags);
        let result = match self.backend.as_deref_mut() {
            Some(backend) => backend.draw_indexed_primitive(
                primitive,
                base_vertex,
                0,
                vertex_count,
                0,
                primitive.primitive_count(index_count),
            ),
            None => Err(BackendError::FAIL),
        };
        self.restore_draw_states(version, fvf, applied);
        finish_draw("draw_indexed_primitive_vb", result)
    }

    /// The immediate-mode vertex submission API of versions 2 and 3.
    fn immediate_proxy(&mut self, op: &'static str) -> DeviceResult<&mut (dyn ProxyDevice + 'static)> {
        if self.is_emulated() {
            log_limit!(warn, op, "immediate-mode submission is not supported");
            return Err(DeviceError::Unsupported);
        }
        let proxy = self.proxy_at_least(DxVersion::V2, op)?;
        if proxy.version() == DxVersion::V7 {
            return Err(DeviceError::Generic);
        }
        Ok(proxy)
    }

    pub fn begin(&mut self, primitive: u32, format: VertexFormat, flags: DrawFlags) -> DeviceResult<()> {
        let format = self.normalize_format(format)?;
        Ok(self.immediate_proxy("begin")?.begin(primitive, format, flags.bits())?)
    }

    pub fn begin_indexed(
        &mut self,
        primitive: u32,
        format: VertexFormat,
        vertices: &[u8],
        vertex_count: u32,
        flags: DrawFlags,
    ) -> DeviceResult<()> {
        let format = self.normalize_format(format)?;
        let proxy = self.immediate_proxy("begin_indexed")?;
        Ok(proxy.begin_indexed(primitive, format, vertices, vertex_count, flags.bits())?)
    }

    pub fn vertex(&mut self, vertex: &[u8]) -> DeviceResult<()> {
        Ok(self.immediate_proxy("vertex")?.vertex(vertex)?)
    }

    pub fn index(&mut self, index: u16) -> DeviceResult<()> {
        Ok(self.immediate_proxy("index")?.index(index)?)
    }

    pub fn end(&mut self, flags: DrawFlags) -> DeviceResult<()> {
        Ok(self.immediate_proxy("end")?.end(flags.bits())?)
    }

    /// Applies the per-draw state overrides and returns the flags describing
    /// what was applied, for [`Device::restore_draw_states`].
    fn set_draw_states(&mut self, version: DxVersion, fvf: Fvf, flags: DrawFlags) -> DrawFlags {
        let mut flags = flags.difference(DrawFlags::ALPHA_COLOR_KEY);

        if version < DxVersion::V7 {
            if self.shadow.wrap_changed {
                let wrap = self.shadow.wrap0();
                note("wrap", self.set_render_state(rs::WRAP0, wrap));
                self.shadow.wrap_changed = false;
            }
            if flags.contains(DrawFlags::DONOTCLIP) {
                self.draw.saved.clipping = self.get_render_state(rs::CLIPPING).unwrap_or(1);
                note("clipping", self.set_render_state(rs::CLIPPING, 0));
            }
            if flags.skips_lighting(fvf.has_normal()) {
                self.draw.saved.lighting = self.get_render_state(rs::LIGHTING).unwrap_or(1);
                note("lighting", self.set_render_state(rs::LIGHTING, 0));
            }
            if flags.contains(DrawFlags::DONOTUPDATEEXTENTS) {
                self.draw.saved.extents = self.get_render_state(lrs::EXTENTS).unwrap_or(0);
                note("extents", self.set_render_state(lrs::EXTENTS, 0));
            }
        }

        if self.shadow.antialias_changed {
            let enabled = u32::from(self.shadow.antialias_enabled());
            note("antialias", self.set_render_state(rs::MULTISAMPLEANTIALIAS, enabled));
            self.shadow.antialias_changed = false;
        }

        if self.is_emulated() {
            flags = self.set_emulated_draw_states(flags);
        }
        flags
    }

    fn set_emulated_draw_states(&mut self, mut flags: DrawFlags) -> DrawFlags {
        let Some(backend) = self.backend.as_deref_mut() else {
            return flags;
        };
        let saved = &mut self.draw.saved;
        saved.filtered_stages = 0;
        saved.keyed_stages = 0;
        let filters = filter_override(self.config.fix_byte_alignment);

        for (stage, surface) in self.stage_surfaces.iter().enumerate() {
            let Some(surface) = surface else {
                continue;
            };
            let sampler = stage as u32;
            if let Some((min, mag)) = filters.filter(|_| surface.was_unaligned_lock()) {
                saved.min_filter[stage] = backend
                    .get_sampler_state(sampler, samp::MINFILTER)
                    .unwrap_or(texf::POINT);
                saved.mag_filter[stage] = backend
                    .get_sampler_state(sampler, samp::MAGFILTER)
                    .unwrap_or(texf::POINT);
                note("min filter", backend.set_sampler_state(sampler, samp::MINFILTER, min));
                note("mag filter", backend.set_sampler_state(sampler, samp::MAGFILTER, mag));
                saved.filtered_stages |= 1 << stage;
            }
            if self.shadow.mip_filter[stage] != texf::NONE && surface.needs_mipmaps() {
                surface.generate_mipmaps();
            }
        }

        if self.shadow.color_key_enabled != 0 && self.config.color_key_alpha_test {
            for (stage, surface) in self.stage_surfaces.iter().enumerate() {
                let Some(keyed) = surface.as_ref().and_then(|s| s.color_key_texture()) else {
                    continue;
                };
                match backend.set_texture(stage as u32, Some(keyed)) {
                    Ok(()) => {
                        saved.keyed_stages |= 1 << stage;
                        flags |= DrawFlags::ALPHA_COLOR_KEY;
                    }
                    Err(error) => log_limit!(debug, stage, ?error, "failed to bind color-keyed texture"),
                }
            }
            if flags.contains(DrawFlags::ALPHA_COLOR_KEY) {
                saved.alpha_test_enable = backend.get_render_state(rs::ALPHATESTENABLE).unwrap_or(0);
                saved.alpha_func = backend.get_render_state(rs::ALPHAFUNC).unwrap_or(cmp::ALWAYS);
                saved.alpha_ref = backend.get_render_state(rs::ALPHAREF).unwrap_or(0);
                note("alpha test", backend.set_render_state(rs::ALPHATESTENABLE, 1));
                note("alpha func", backend.set_render_state(rs::ALPHAFUNC, cmp::GREATER));
                note("alpha ref", backend.set_render_state(rs::ALPHAREF, 1));
            }
        }

        if flags.contains(DrawFlags::COLOR_KEY_SHADER) {
            match self.parent.as_ref().and_then(|parent| parent.color_key_shader()) {
                Some(shader) => {
                    let (low, high) = self.draw.color_key_range;
                    note("color key shader", backend.set_pixel_shader(Some(shader)));
                    note("color key low", backend.set_pixel_shader_constant(0, low));
                    note("color key high", backend.set_pixel_shader_constant(1, high));
                }
                None => {
                    log_limit!(warn, "color-key shader is not available");
                    flags.remove(DrawFlags::COLOR_KEY_SHADER);
                }
            }
        }
        flags
    }

    /// Undoes [`Device::set_draw_states`]. `flags` is what that call returned.
    fn restore_draw_states(&mut self, version: DxVersion, fvf: Fvf, flags: DrawFlags) {
        let saved = self.draw.saved;
        if version < DxVersion::V7 {
            if flags.contains(DrawFlags::DONOTCLIP) {
                note("clipping", self.set_render_state(rs::CLIPPING, saved.clipping));
            }
            if flags.skips_lighting(fvf.has_normal()) {
                note("lighting", self.set_render_state(rs::LIGHTING, saved.lighting));
            }
            if flags.contains(DrawFlags::DONOTUPDATEEXTENTS) {
                note("extents", self.set_render_state(lrs::EXTENTS, saved.extents));
            }
        }
        if !self.is_emulated() {
            return;
        }
        let Some(backend) = self.backend.as_deref_mut() else {
            return;
        };

        for stage in 0..MAX_TEXTURE_STAGES {
            let bit = 1u8 << stage;
            let sampler = stage as u32;
            if saved.filtered_stages & bit != 0 {
                note("min filter", backend.set_sampler_state(sampler, samp::MINFILTER, saved.min_filter[stage]));
                note("mag filter", backend.set_sampler_state(sampler, samp::MAGFILTER, saved.mag_filter[stage]));
            }
            if saved.keyed_stages & bit != 0 {
                let texture = self.stage_surfaces[stage]
                    .as_ref()
                    .and_then(|surface| surface.backend_texture());
                note("texture", backend.set_texture(sampler, texture));
            }
        }
        if flags.contains(DrawFlags::ALPHA_COLOR_KEY) {
            note("alpha test", backend.set_render_state(rs::ALPHATESTENABLE, saved.alpha_test_enable));
            note("alpha func", backend.set_render_state(rs::ALPHAFUNC, saved.alpha_func));
            note("alpha ref", backend.set_render_state(rs::ALPHAREF, saved.alpha_ref));
        }
        if flags.contains(DrawFlags::COLOR_KEY_SHADER) {
            note("color key shader", backend.set_pixel_shader(None));
        }
        self.draw.saved.filtered_stages = 0;
        self.draw.saved.keyed_stages = 0;
    }
}
