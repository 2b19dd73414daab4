//! Immediate-mode and buffer-bound draw submission.
//!
//! The device-facing entry points live in `crate::device::draw`; this module
//! holds the state they share between calls.

pub mod flags;
pub mod topology;
pub mod vertex;

use flags::SavedDrawStates;
use vertex::VertexScratch;

/// Per-device draw bookkeeping. Not safe for concurrent draws on one device.
#[derive(Debug, Default)]
pub struct DrawBridge {
    pub(crate) scratch: VertexScratch,
    pub(crate) saved: SavedDrawStates,
    /// Low/high color key passed to the color-key pixel shader (`c0`, `c1`).
    pub(crate) color_key_range: ([f32; 4], [f32; 4]),
}

impl DrawBridge {
    pub fn scratch_capacity(&self) -> usize {
        self.scratch.capacity()
    }
}
