//! Legacy render states (`D3DRENDERSTATE_*`).

use crate::abi::legacy::{self, filter, rs as lrs, tss as legacy_tss};
use crate::abi::modern::{self, rs, samp, texf};
use crate::error::{DeviceError, DeviceResult};
use crate::log_limit::log_limit;

use super::blend::{map_blend_writes, MapBlend};
use super::{zbias_to_depth_bias, BackendWrite, ShadowState};

/// Plan for a legacy `SetRenderState`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderWrite {
    /// Absorbed by shadow state, or an accepted no-op.
    Local,
    /// Bind the texture behind a handle to stage 0 (0 unbinds).
    TextureHandle(u32),
    /// Route through the legacy texture-stage path for stage 0.
    LegacyStage(u32, u32),
    Backend(Vec<BackendWrite>),
}

/// Plan for a legacy `GetRenderState`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderRead {
    Value(u32),
    LegacyStage(u32),
    Sampler(u32),
    Render(u32),
    ZBias,
}

/// The (minification, mip) filter pair written for a legacy `TEXTUREMIN` value.
pub fn min_filter_pair(value: u32) -> Option<(u32, u32)> {
    Some(match value {
        filter::NEAREST => (texf::POINT, texf::NONE),
        filter::LINEAR => (texf::LINEAR, texf::NONE),
        filter::MIPNEAREST => (texf::POINT, texf::POINT),
        filter::MIPLINEAR => (texf::LINEAR, texf::POINT),
        filter::LINEARMIPNEAREST => (texf::POINT, texf::LINEAR),
        filter::LINEARMIPLINEAR => (texf::LINEAR, texf::LINEAR),
        _ => return None,
    })
}

fn is_stipple_pattern(state: u32) -> bool {
    (lrs::STIPPLEPATTERN00..=lrs::STIPPLEPATTERN31).contains(&state)
}

/// Legacy states that are accepted but only meaningful at one value.
fn unimplemented_default(state: u32) -> Option<u32> {
    match state {
        lrs::LINEPATTERN
        | lrs::MONOENABLE
        | lrs::SUBPIXEL
        | lrs::SUBPIXELX
        | lrs::STIPPLEDALPHA
        | lrs::STIPPLEENABLE
        | lrs::OLDALPHABLENDENABLE
        | lrs::BORDERCOLOR
        | lrs::FLUSHBATCH
        | lrs::TRANSLUCENTSORTINDEPENDENT
        | lrs::EXTENTS
        | lrs::COLORKEYBLENDENABLE => Some(0),
        lrs::ROP2 => Some(legacy::R2_COPYPEN),
        lrs::PLANEMASK => Some(u32::MAX),
        s if is_stipple_pattern(s) => Some(0),
        _ => None,
    }
}

fn one(write: BackendWrite) -> RenderWrite {
    RenderWrite::Backend(vec![write])
}

pub fn plan_render_state_write(
    shadow: &mut ShadowState,
    state: u32,
    value: u32,
) -> DeviceResult<RenderWrite> {
    if let Some(default) = unimplemented_default(state) {
        if value != default {
            log_limit!(warn, state, value, "legacy render state not implemented");
        }
        return Ok(RenderWrite::Local);
    }

    let plan = match state {
        lrs::TEXTUREHANDLE => RenderWrite::TextureHandle(value),
        lrs::ANTIALIAS => {
            shadow.antialias = value;
            shadow.antialias_changed = true;
            RenderWrite::Local
        }
        lrs::EDGEANTIALIAS => {
            shadow.edge_antialias = value;
            shadow.antialias_changed = true;
            RenderWrite::Local
        }
        lrs::TEXTUREADDRESS => RenderWrite::LegacyStage(legacy_tss::ADDRESS, value),
        lrs::TEXTUREADDRESSU => RenderWrite::LegacyStage(legacy_tss::ADDRESSU, value),
        lrs::TEXTUREADDRESSV => RenderWrite::LegacyStage(legacy_tss::ADDRESSV, value),
        lrs::MIPMAPLODBIAS => RenderWrite::LegacyStage(legacy_tss::MIPMAPLODBIAS, value),
        // Always on for version 3 and later; nothing to do.
        lrs::TEXTUREPERSPECTIVE | lrs::ZVISIBLE => RenderWrite::Local,
        lrs::WRAPU => {
            shadow.wrap_u = value;
            shadow.wrap_changed = true;
            RenderWrite::Local
        }
        lrs::WRAPV => {
            shadow.wrap_v = value;
            shadow.wrap_changed = true;
            RenderWrite::Local
        }
        lrs::TEXTUREMAG => match value {
            filter::NEAREST | filter::LINEAR => one(BackendWrite::Sampler(samp::MAGFILTER, value)),
            _ => {
                log_limit!(warn, value, "unsupported TEXTUREMAG value");
                return Err(DeviceError::InvalidParams);
            }
        },
        lrs::TEXTUREMIN => {
            let Some((min, mip)) = min_filter_pair(value) else {
                log_limit!(warn, value, "unsupported TEXTUREMIN value");
                return Err(DeviceError::InvalidParams);
            };
            shadow.texture_min = value;
            shadow.mip_filter[0] = mip;
            RenderWrite::Backend(vec![
                BackendWrite::Sampler(samp::MINFILTER, min),
                BackendWrite::Sampler(samp::MIPFILTER, mip),
            ])
        }
        lrs::SRCBLEND => {
            shadow.src_blend = value;
            one(BackendWrite::Render(rs::SRCBLEND, value))
        }
        lrs::DESTBLEND => {
            shadow.dest_blend = value;
            one(BackendWrite::Render(rs::DESTBLEND, value))
        }
        lrs::ALPHABLENDENABLE => {
            shadow.alpha_blend_enabled = value;
            one(BackendWrite::Render(rs::ALPHABLENDENABLE, value))
        }
        lrs::TEXTUREMAPBLEND => match map_blend_writes(value) {
            MapBlend::Apply(writes) => {
                shadow.texture_map_blend = value;
                RenderWrite::Backend(writes)
            }
            MapBlend::Unsupported => {
                log_limit!(warn, value, "texture-map-blend mask modes are not supported");
                RenderWrite::Local
            }
            MapBlend::Unknown => {
                log_limit!(warn, value, "unknown texture-map-blend mode");
                RenderWrite::Local
            }
        },
        lrs::ALPHAREF => one(BackendWrite::Render(rs::ALPHAREF, value & 0xff)),
        lrs::COLORKEYENABLE => {
            shadow.color_key_enabled = value;
            RenderWrite::Local
        }
        lrs::ZBIAS => one(BackendWrite::Render(rs::DEPTHBIAS, zbias_to_depth_bias(value))),
        s if modern::is_render_state(s) => one(BackendWrite::Render(s, value)),
        _ => {
            log_limit!(warn, state, value, "render state not implemented");
            RenderWrite::Local
        }
    };
    Ok(plan)
}

pub fn plan_render_state_read(shadow: &ShadowState, state: u32) -> RenderRead {
    if let Some(default) = unimplemented_default(state) {
        return RenderRead::Value(default);
    }
    match state {
        lrs::TEXTUREHANDLE => RenderRead::Value(shadow.texture_handle),
        lrs::ANTIALIAS => RenderRead::Value(shadow.antialias),
        lrs::EDGEANTIALIAS => RenderRead::Value(shadow.edge_antialias),
        lrs::TEXTUREADDRESS => RenderRead::LegacyStage(legacy_tss::ADDRESS),
        lrs::TEXTUREADDRESSU => RenderRead::LegacyStage(legacy_tss::ADDRESSU),
        lrs::TEXTUREADDRESSV => RenderRead::LegacyStage(legacy_tss::ADDRESSV),
        lrs::MIPMAPLODBIAS => RenderRead::LegacyStage(legacy_tss::MIPMAPLODBIAS),
        lrs::TEXTUREPERSPECTIVE => RenderRead::Value(1),
        lrs::ZVISIBLE => RenderRead::Value(0),
        lrs::WRAPU => RenderRead::Value(shadow.wrap_u),
        lrs::WRAPV => RenderRead::Value(shadow.wrap_v),
        lrs::TEXTUREMAG => RenderRead::Sampler(samp::MAGFILTER),
        lrs::TEXTUREMIN => RenderRead::Value(shadow.texture_min),
        lrs::TEXTUREMAPBLEND => RenderRead::Value(shadow.texture_map_blend),
        lrs::COLORKEYENABLE => RenderRead::Value(shadow.color_key_enabled),
        lrs::ZBIAS => RenderRead::ZBias,
        s if modern::is_render_state(s) => RenderRead::Render(s),
        _ => {
            log_limit!(warn, state, "render state not implemented");
            RenderRead::Value(0)
        }
    }
}
