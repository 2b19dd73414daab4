//! Texture-map-blend emulation on stage 0.

use crate::abi::legacy::tblend;
use crate::abi::modern::{blend, rs, ta, top, tss};

use super::BackendWrite::{self, Render, Stage};

/// Outcome of a `TEXTUREMAPBLEND` write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapBlend {
    /// Apply the writes and remember the mode.
    Apply(Vec<BackendWrite>),
    /// Documented-unsupported mask modes; accepted without effect.
    Unsupported,
    /// Unknown mode; accepted without effect.
    Unknown,
}

fn alpha_blend(dest: u32) -> [BackendWrite; 3] {
    [
        Render(rs::ALPHABLENDENABLE, 1),
        Render(rs::SRCBLEND, blend::SRCALPHA),
        Render(rs::DESTBLEND, dest),
    ]
}

pub fn map_blend_writes(mode: u32) -> MapBlend {
    let mut writes = vec![
        Stage(tss::COLORARG1, ta::TEXTURE),
        Stage(tss::ALPHAARG1, ta::TEXTURE),
    ];
    match mode {
        tblend::COPY | tblend::DECAL => {
            writes.extend([
                Stage(tss::COLORARG2, ta::CURRENT),
                Stage(tss::ALPHAARG2, ta::CURRENT),
            ]);
            writes.extend(alpha_blend(blend::INVSRCALPHA));
            writes.extend([
                Stage(tss::COLOROP, top::SELECTARG1),
                Stage(tss::ALPHAOP, top::SELECTARG1),
            ]);
        }
        tblend::DECALALPHA => {
            writes.extend(alpha_blend(blend::INVSRCALPHA));
            writes.extend([
                Stage(tss::COLOROP, top::BLENDTEXTUREALPHA),
                Stage(tss::COLORARG2, ta::DIFFUSE),
                Stage(tss::ALPHAOP, top::SELECTARG2),
                Stage(tss::ALPHAARG2, ta::DIFFUSE),
            ]);
        }
        tblend::MODULATE | tblend::MODULATEALPHA => {
            let alpha_op = if mode == tblend::MODULATE {
                top::SELECTARG1
            } else {
                top::MODULATE
            };
            writes.extend(alpha_blend(blend::INVSRCALPHA));
            writes.extend([
                Stage(tss::COLOROP, top::MODULATE),
                Stage(tss::COLORARG2, ta::DIFFUSE),
                Stage(tss::ALPHAOP, alpha_op),
                Stage(tss::ALPHAARG2, ta::DIFFUSE),
            ]);
        }
        tblend::ADD => {
            writes.extend(alpha_blend(blend::ONE));
            writes.extend([
                Stage(tss::COLOROP, top::ADD),
                Stage(tss::COLORARG2, ta::DIFFUSE),
                Stage(tss::ALPHAOP, top::SELECTARG2),
                Stage(tss::ALPHAARG2, ta::DIFFUSE),
            ]);
        }
        tblend::DECALMASK | tblend::MODULATEMASK => return MapBlend::Unsupported,
        _ => return MapBlend::Unknown,
    }
    MapBlend::Apply(writes)
}
