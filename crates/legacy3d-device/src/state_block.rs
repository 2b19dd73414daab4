//! Tokens of backend state blocks recorded or created through this device.

use hashbrown::HashSet;

use crate::backend::{Backend, StateBlockId};
use crate::error::{DeviceError, DeviceResult};

#[derive(Debug, Default)]
pub struct StateBlockTracker {
    recording: bool,
    owned: HashSet<StateBlockId>,
}

impl StateBlockTracker {
    pub fn is_recording(&self) -> bool {
        self.recording
    }

    pub fn owns(&self, block: StateBlockId) -> bool {
        self.owned.contains(&block)
    }

    pub fn len(&self) -> usize {
        self.owned.len()
    }

    pub fn is_empty(&self) -> bool {
        self.owned.is_empty()
    }

    /// Clears the recording flag without touching the backend. Used after the
    /// backend itself was recreated.
    pub fn reset_recording(&mut self) {
        self.recording = false;
    }

    pub fn begin(&mut self, backend: &mut dyn Backend) -> DeviceResult<()> {
        if self.recording {
            return Err(DeviceError::Generic);
        }
        backend.begin_state_block()?;
        self.recording = true;
        Ok(())
    }

    pub fn end(&mut self, backend: &mut dyn Backend) -> DeviceResult<StateBlockId> {
        if !self.recording {
            return Err(DeviceError::Generic);
        }
        let block = backend.end_state_block()?;
        self.recording = false;
        self.owned.insert(block);
        Ok(block)
    }

    pub fn create(&mut self, backend: &mut dyn Backend, kind: u32) -> DeviceResult<StateBlockId> {
        if self.recording {
            return Err(DeviceError::Generic);
        }
        let block = backend.create_state_block(kind)?;
        self.owned.insert(block);
        Ok(block)
    }

    fn check(&self, block: StateBlockId) -> DeviceResult<()> {
        if !self.owns(block) {
            return Err(DeviceError::InvalidParams);
        }
        if self.recording {
            return Err(DeviceError::Generic);
        }
        Ok(())
    }

    pub fn apply(&self, backend: &mut dyn Backend, block: StateBlockId) -> DeviceResult<()> {
        self.check(block)?;
        Ok(backend.apply_state_block(block)?)
    }

    pub fn capture(&self, backend: &mut dyn Backend, block: StateBlockId) -> DeviceResult<()> {
        self.check(block)?;
        Ok(backend.capture_state_block(block)?)
    }

    pub fn delete(&mut self, backend: &mut dyn Backend, block: StateBlockId) -> DeviceResult<()> {
        self.check(block)?;
        backend.release_state_block(block);
        self.owned.remove(&block);
        Ok(())
    }

    /// Ends a recording in flight and throws the block away.
    pub fn discard_recording(&mut self, backend: &mut dyn Backend) {
        if !self.recording {
            return;
        }
        match backend.end_state_block() {
            Ok(block) => backend.release_state_block(block),
            Err(error) => tracing::warn!(?error, "failed to end state block recording"),
        }
        self.recording = false;
    }

    /// Releases every owned block. Returns how many were released.
    pub fn release_all(&mut self, backend: &mut dyn Backend) -> usize {
        self.discard_recording(backend);
        let count = self.owned.len();
        for block in self.owned.drain() {
            backend.release_state_block(block);
        }
        count
    }

    /// Forgets every token without a backend to release them on.
    pub fn forget_all(&mut self) {
        self.recording = false;
        self.owned.clear();
    }
}
