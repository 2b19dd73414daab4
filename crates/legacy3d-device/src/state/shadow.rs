use crate::abi::legacy::{antialias, filter, tblend};
use crate::abi::modern::texf;
use crate::MAX_TEXTURE_STAGES;

/// Legacy state with no backend counterpart, plus a few cached backend values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShadowState {
    /// Handle last bound through `TEXTUREHANDLE`.
    pub texture_handle: u32,
    pub antialias: u32,
    /// Set whenever anti-aliasing changes; consumed by the next draw.
    pub antialias_changed: bool,
    pub edge_antialias: u32,
    pub wrap_u: u32,
    pub wrap_v: u32,
    /// Set whenever a wrap flag changes; consumed by the next draw.
    pub wrap_changed: bool,
    /// Last legacy `TEXTUREMIN` value accepted.
    pub texture_min: u32,
    pub texture_map_blend: u32,
    pub alpha_blend_enabled: u32,
    pub src_blend: u32,
    pub dest_blend: u32,
    pub color_key_enabled: u32,
    /// Material handle applied through the `MATERIAL` light state.
    pub material_handle: u32,
    /// Mip filter per stage in backend terms; drives lazy mip generation.
    pub mip_filter: [u32; MAX_TEXTURE_STAGES],
}

impl Default for ShadowState {
    fn default() -> Self {
        Self {
            texture_handle: 0,
            antialias: antialias::NONE,
            antialias_changed: true,
            edge_antialias: 0,
            wrap_u: 0,
            wrap_v: 0,
            wrap_changed: false,
            texture_min: filter::NEAREST,
            texture_map_blend: tblend::MODULATE,
            alpha_blend_enabled: 0,
            src_blend: 0,
            dest_blend: 0,
            color_key_enabled: 0,
            material_handle: 0,
            mip_filter: [texf::NONE; MAX_TEXTURE_STAGES],
        }
    }
}

impl ShadowState {
    /// Value of the backend `WRAP0` state implied by the legacy wrap flags.
    pub fn wrap0(&self) -> u32 {
        use crate::abi::modern::wrap;
        (if self.wrap_u != 0 { wrap::U } else { 0 }) | (if self.wrap_v != 0 { wrap::V } else { 0 })
    }

    /// Whether the multisample anti-aliasing state should be on.
    pub fn antialias_enabled(&self) -> bool {
        matches!(
            self.antialias,
            antialias::SORTDEPENDENT | antialias::SORTINDEPENDENT
        )
    }
}
