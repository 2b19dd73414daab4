//! Preservation of fixed-function state across a destructive backend reset.
//!
//! The owning process brackets the backend reset with
//! [`ResetCoordinator::before_reset`] and [`ResetCoordinator::after_reset`];
//! loss is never detected here.

use std::ops::RangeInclusive;

use crate::abi::modern::{self, samp, ts};
use crate::backend::Backend;
use crate::error::DeviceResult;
use crate::handles::MAX_LIGHT_INDEX;
use crate::state_block::StateBlockTracker;
use crate::types::{Light, Material, Matrix, Viewport};
use crate::MAX_TEXTURE_STAGES;

const SAMPLER_STATES: RangeInclusive<u32> = samp::ADDRESSU..=samp::DMAPOFFSET;
const CORE_TRANSFORMS: [u32; 3] = [ts::WORLD, ts::VIEW, ts::PROJECTION];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetPhase {
    Normal,
    BackedUp,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightSlot {
    pub index: u32,
    pub light: Light,
    pub enabled: bool,
}

/// Every backend state slot the device tracks. Slots the backend refused to
/// report are left out and not restored.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StateSnapshot {
    pub render: Vec<(u32, u32)>,
    /// `(stage, state, value)`.
    pub stage: Vec<(u32, u32, u32)>,
    /// `(sampler, state, value)`.
    pub sampler: Vec<(u32, u32, u32)>,
    pub lights: Vec<LightSlot>,
    pub material: Option<Material>,
    /// `(transform id, matrix)` for world, view and projection.
    pub transforms: Vec<(u32, Matrix)>,
    pub viewport: Option<Viewport>,
}

impl StateSnapshot {
    pub fn capture(backend: &mut dyn Backend) -> Self {
        let mut snapshot = StateSnapshot::default();

        for &state in modern::RENDER_STATES {
            if let Ok(value) = backend.get_render_state(state) {
                snapshot.render.push((state, value));
            }
        }

        for stage in 0..MAX_TEXTURE_STAGES as u32 {
            for &state in modern::TEXTURE_STAGE_STATES {
                if let Ok(value) = backend.get_texture_stage_state(stage, state) {
                    snapshot.stage.push((stage, state, value));
                }
            }
            for state in SAMPLER_STATES {
                if let Ok(value) = backend.get_sampler_state(stage, state) {
                    snapshot.sampler.push((stage, state, value));
                }
            }
        }

        for index in 0..=MAX_LIGHT_INDEX {
            // Slots that were never set report an error; nothing to restore.
            let Ok(light) = backend.get_light(index) else {
                continue;
            };
            let enabled = backend.get_light_enable(index).unwrap_or(false);
            snapshot.lights.push(LightSlot {
                index,
                light,
                enabled,
            });
        }

        snapshot.material = backend.get_material().ok();
        for state in CORE_TRANSFORMS {
            if let Ok(matrix) = backend.get_transform(state) {
                snapshot.transforms.push((state, matrix));
            }
        }
        snapshot.viewport = backend.get_viewport().ok();
        snapshot
    }

    /// Writes the snapshot back: render states, texture-stage states, lights,
    /// material, transforms, sampler states, then the viewport resized to the
    /// recreated back buffer. Returns the number of writes the backend refused.
    pub fn restore(&self, backend: &mut dyn Backend) -> usize {
        let mut failed = 0usize;
        let mut note = |result: Result<(), _>| {
            if result.is_err() {
                failed += 1;
            }
        };

        for &(state, value) in &self.render {
            note(backend.set_render_state(state, value));
        }
        for &(stage, state, value) in &self.stage {
            note(backend.set_texture_stage_state(stage, state, value));
        }
        for slot in &self.lights {
            note(backend.set_light(slot.index, &slot.light));
            note(backend.light_enable(slot.index, slot.enabled));
        }
        if let Some(material) = &self.material {
            note(backend.set_material(material));
        }
        for (state, matrix) in &self.transforms {
            note(backend.set_transform(*state, matrix));
        }
        for &(sampler, state, value) in &self.sampler {
            note(backend.set_sampler_state(sampler, state, value));
        }
        if let Some(mut viewport) = self.viewport {
            if let Ok(fresh) = backend.get_viewport() {
                viewport.width = fresh.width;
                viewport.height = fresh.height;
            }
            note(backend.set_viewport(&viewport));
        }
        failed
    }
}

#[derive(Debug, Default)]
pub struct ResetCoordinator {
    snapshot: Option<StateSnapshot>,
}

impl ResetCoordinator {
    pub fn phase(&self) -> ResetPhase {
        if self.snapshot.is_some() {
            ResetPhase::BackedUp
        } else {
            ResetPhase::Normal
        }
    }

    pub fn snapshot(&self) -> Option<&StateSnapshot> {
        self.snapshot.as_ref()
    }

    /// Discards any state block being recorded, then captures the snapshot.
    /// A second call before `after_reset` replaces the pending snapshot.
    pub fn before_reset(&mut self, backend: &mut dyn Backend, blocks: &mut StateBlockTracker) {
        blocks.discard_recording(backend);
        let snapshot = StateSnapshot::capture(backend);
        tracing::debug!(
            render = snapshot.render.len(),
            stage = snapshot.stage.len(),
            sampler = snapshot.sampler.len(),
            lights = snapshot.lights.len(),
            "backed up device state"
        );
        self.snapshot = Some(snapshot);
    }

    /// Restores and consumes the pending snapshot. Without one this is a no-op.
    pub fn after_reset(&mut self, backend: &mut dyn Backend) -> DeviceResult<()> {
        let Some(snapshot) = self.snapshot.take() else {
            return Ok(());
        };
        let failed = snapshot.restore(backend);
        if failed > 0 {
            tracing::warn!(failed, "some device state could not be restored after reset");
        }
        Ok(())
    }
}
