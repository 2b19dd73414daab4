//! Ordered list of viewports attached to the device, plus the current one.

use std::sync::Arc;

use crate::abi::legacy::next;
use crate::collab::{same_object, ViewportObject};
use crate::error::{DeviceError, DeviceResult};

type ViewportRef = Arc<dyn ViewportObject>;

#[derive(Default)]
pub struct ViewportRegistry {
    attached: Vec<ViewportRef>,
    current: Option<ViewportRef>,
}

impl ViewportRegistry {
    pub fn is_attached(&self, viewport: &ViewportRef) -> bool {
        self.position(viewport).is_some()
    }

    fn position(&self, viewport: &ViewportRef) -> Option<usize> {
        self.attached.iter().position(|v| same_object(v, viewport))
    }

    /// Appends `viewport`. A missing or already attached viewport is rejected.
    pub fn attach(&mut self, viewport: Option<&ViewportRef>) -> DeviceResult<()> {
        let viewport = viewport.ok_or(DeviceError::InvalidParams)?;
        if self.is_attached(viewport) {
            return Err(DeviceError::InvalidParams);
        }
        self.attached.push(Arc::clone(viewport));
        Ok(())
    }

    /// Removes `viewport` and returns the registry's reference to it. Detaching
    /// the current viewport also clears the current selection.
    pub fn detach(&mut self, viewport: Option<&ViewportRef>) -> DeviceResult<ViewportRef> {
        let viewport = viewport.ok_or(DeviceError::InvalidParams)?;
        let index = self.position(viewport).ok_or(DeviceError::InvalidParams)?;
        if self
            .current
            .as_ref()
            .is_some_and(|current| same_object(current, viewport))
        {
            self.clear_current();
        }
        Ok(self.attached.remove(index))
    }

    pub fn head(&self) -> DeviceResult<ViewportRef> {
        self.attached
            .first()
            .cloned()
            .ok_or(DeviceError::NoViewports)
    }

    pub fn tail(&self) -> DeviceResult<ViewportRef> {
        self.attached
            .last()
            .cloned()
            .ok_or(DeviceError::NoViewports)
    }

    /// Entry following `viewport`, or `None` when it is the last one.
    pub fn next(&self, viewport: &ViewportRef) -> DeviceResult<Option<ViewportRef>> {
        if self.attached.is_empty() {
            return Err(DeviceError::NoViewports);
        }
        let index = self.position(viewport).ok_or(DeviceError::InvalidParams)?;
        Ok(self.attached.get(index + 1).cloned())
    }

    /// Traversal as driven by the legacy `D3DNEXT_*` flags.
    pub fn traverse(
        &self,
        viewport: Option<&ViewportRef>,
        flags: u32,
    ) -> DeviceResult<Option<ViewportRef>> {
        match flags {
            next::HEAD => self.head().map(Some),
            next::TAIL => self.tail().map(Some),
            next::NEXT => self.next(viewport.ok_or(DeviceError::InvalidParams)?),
            _ => Err(DeviceError::InvalidParams),
        }
    }

    pub fn current(&self) -> DeviceResult<ViewportRef> {
        self.current.clone().ok_or(DeviceError::NoCurrentViewport)
    }

    /// Records `viewport` as current and marks it active. The caller pushes its
    /// rectangle to the backend first.
    pub fn make_current(&mut self, viewport: &ViewportRef) -> DeviceResult<()> {
        if !self.is_attached(viewport) {
            return Err(DeviceError::InvalidParams);
        }
        if let Some(previous) = self.current.replace(Arc::clone(viewport)) {
            if !same_object(&previous, viewport) {
                previous.set_current_active(false);
            }
        }
        viewport.set_current_active(true);
        Ok(())
    }

    fn clear_current(&mut self) {
        if let Some(previous) = self.current.take() {
            previous.set_current_active(false);
        }
    }

    pub fn len(&self) -> usize {
        self.attached.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attached.is_empty()
    }

    /// Drops every attachment.
    pub fn clear(&mut self) {
        self.clear_current();
        self.attached.clear();
    }
}
