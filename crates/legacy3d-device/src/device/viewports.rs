use std::sync::Arc;

use crate::collab::{RawInterface, ViewportObject};
use crate::error::{DeviceError, DeviceResult};
use crate::types::Viewport;
use crate::version::DxVersion;

use super::Device;

fn raw_of(viewport: &Arc<dyn ViewportObject>) -> DeviceResult<RawInterface> {
    viewport.raw_interface().ok_or(DeviceError::InvalidParams)
}

impl Device {
    /// The attached-viewport list is kept here unless the proxied device
    /// still has one of its own.
    fn viewports_local(&self) -> bool {
        self.proxy_version().map_or(true, |version| version == DxVersion::V7)
    }

    pub fn add_viewport(&mut self, viewport: Option<&Arc<dyn ViewportObject>>) -> DeviceResult<()> {
        if self.viewports_local() {
            return self.viewports.attach(viewport);
        }
        let interface = raw_of(viewport.ok_or(DeviceError::InvalidParams)?)?;
        let proxy = self.proxy_at_least(DxVersion::V1, "add_viewport")?;
        Ok(proxy.add_viewport(interface)?)
    }

    pub fn delete_viewport(&mut self, viewport: Option<&Arc<dyn ViewportObject>>) -> DeviceResult<()> {
        if self.viewports_local() {
            self.viewports.detach(viewport)?;
            tracing::trace!(remaining = self.viewports.len(), "viewport detached");
            return Ok(());
        }
        let interface = raw_of(viewport.ok_or(DeviceError::InvalidParams)?)?;
        let proxy = self.proxy_at_least(DxVersion::V1, "delete_viewport")?;
        Ok(proxy.delete_viewport(interface)?)
    }

    /// Walks the attached list with the legacy `D3DNEXT_*` flags.
    pub fn next_viewport(
        &mut self,
        viewport: Option<&Arc<dyn ViewportObject>>,
        flags: u32,
        version: DxVersion,
    ) -> DeviceResult<Option<Arc<dyn ViewportObject>>> {
        if self.viewports_local() {
            return self.viewports.traverse(viewport, flags);
        }
        let interface = viewport.map(raw_of).transpose()?;
        let proxy = self.proxy_at_least(DxVersion::V1, "next_viewport")?;
        let Some(found) = proxy.next_viewport(interface, flags)? else {
            return Ok(None);
        };
        Ok(Some(self.lookup()?.viewport(found, version)))
    }

    /// Makes an attached viewport current and pushes its rectangle to the device.
    pub fn set_current_viewport(&mut self, viewport: &Arc<dyn ViewportObject>) -> DeviceResult<()> {
        if self.viewports_local() {
            if !self.viewports.is_attached(viewport) {
                return Err(DeviceError::InvalidParams);
            }
            self.set_viewport(&viewport.viewport().into())?;
            return self.viewports.make_current(viewport);
        }
        let interface = raw_of(viewport)?;
        let proxy = self.proxy_at_least(DxVersion::V2, "set_current_viewport")?;
        Ok(proxy.set_current_viewport(interface)?)
    }

    pub fn get_current_viewport(
        &mut self,
        version: DxVersion,
    ) -> DeviceResult<Arc<dyn ViewportObject>> {
        if self.viewports_local() {
            return self.viewports.current();
        }
        let proxy = self.proxy_at_least(DxVersion::V2, "get_current_viewport")?;
        let interface = proxy.get_current_viewport()?;
        Ok(self.lookup()?.viewport(interface, version))
    }

    pub fn attached_viewports(&self) -> usize {
        self.viewports.len()
    }

    pub fn set_viewport(&mut self, viewport: &Viewport) -> DeviceResult<()> {
        if !self.is_emulated() {
            let proxy = self.proxy_at_least(DxVersion::V7, "set_viewport")?;
            return Ok(proxy.set_viewport(viewport)?);
        }
        Ok(self.emulated()?.set_viewport(viewport)?)
    }

    pub fn get_viewport(&mut self) -> DeviceResult<Viewport> {
        if !self.is_emulated() {
            let proxy = self.proxy_at_least(DxVersion::V7, "get_viewport")?;
            return Ok(proxy.get_viewport()?);
        }
        Ok(self.emulated()?.get_viewport()?)
    }
}
