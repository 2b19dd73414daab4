//! Translation between the legacy state space and the backend's.
//!
//! Each legacy write is planned as a list of backend writes (or a local
//! shadow update) by pure functions; the device then applies the plan. Reads
//! are planned the same way. Keeping the tables free of device access makes
//! them testable on their own.

pub mod blend;
pub mod render;
pub mod shadow;
pub mod stage;

pub use render::{plan_render_state_read, plan_render_state_write, RenderRead, RenderWrite};
pub use shadow::ShadowState;
pub use stage::{plan_stage_state_read, plan_stage_state_write, StageRead, StageWrite};

/// A single backend mutation. `Stage` and `Sampler` address stage 0 unless
/// the caller supplies a stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendWrite {
    Render(u32, u32),
    Stage(u32, u32),
    Sampler(u32, u32),
}

/// Maps a legacy transform id onto the backend's numbering.
pub fn translate_transform(state: u32) -> u32 {
    use crate::abi::{legacy, modern};
    match state {
        legacy::ts::WORLD => modern::ts::WORLD,
        legacy::ts::WORLD1 => modern::ts::WORLD + 1,
        legacy::ts::WORLD2 => modern::ts::WORLD + 2,
        legacy::ts::WORLD3 => modern::ts::WORLD + 3,
        other => other,
    }
}

/// Z-bias scale: legacy integer bias (larger is closer) to backend depth bias.
pub const ZBIAS_TO_DEPTH_BIAS: f32 = -0.000_005;
pub const DEPTH_BIAS_TO_ZBIAS: f32 = -200_000.0;

pub fn zbias_to_depth_bias(bias: u32) -> u32 {
    (bias as f32 * ZBIAS_TO_DEPTH_BIAS).to_bits()
}

pub fn depth_bias_to_zbias(bits: u32) -> u32 {
    (f32::from_bits(bits) * DEPTH_BIAS_TO_ZBIAS).round() as u32
}
