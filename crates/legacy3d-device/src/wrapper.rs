//! Per-version device wrappers and the small cache that recycles them.
//!
//! Legacy clients compare interface pointers across rapid release/recreate
//! cycles, so a released device hands its wrappers back to a pool and the next
//! device of the same version reuses them. A pooled wrapper is only reused
//! while nothing else still references it.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use crate::version::DxVersion;

/// The version-specific face of a device.
#[derive(Debug, PartialEq, Eq)]
pub struct DeviceWrapper {
    version: DxVersion,
    serial: u64,
}

impl DeviceWrapper {
    pub fn version(&self) -> DxVersion {
        self.version
    }

    /// Allocation number, unique per pool.
    pub fn serial(&self) -> u64 {
        self.serial
    }
}

#[derive(Debug, Default)]
pub struct WrapperPool {
    spare: Mutex<[Option<Arc<DeviceWrapper>>; 4]>,
    next_serial: AtomicU64,
}

impl WrapperPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes the spare wrapper for `version` if it is unreferenced, otherwise
    /// allocates a new one.
    pub fn acquire(&self, version: DxVersion) -> Arc<DeviceWrapper> {
        let mut spare = self.spare.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(wrapper) = spare[version.slot()].take() {
            if Arc::strong_count(&wrapper) == 1 {
                tracing::trace!(%version, serial = wrapper.serial, "reusing device wrapper");
                return wrapper;
            }
        }
        Arc::new(DeviceWrapper {
            version,
            serial: self.next_serial.fetch_add(1, Ordering::Relaxed),
        })
    }

    /// Parks `wrapper` for reuse by the next device of its version.
    pub fn give_back(&self, wrapper: Arc<DeviceWrapper>) {
        let mut spare = self.spare.lock().unwrap_or_else(PoisonError::into_inner);
        let slot = wrapper.version.slot();
        spare[slot] = Some(wrapper);
    }

    pub fn has_spare(&self, version: DxVersion) -> bool {
        let spare = self.spare.lock().unwrap_or_else(PoisonError::into_inner);
        spare[version.slot()].is_some()
    }
}

/// Wrappers a live device has handed out, one per version at most.
#[derive(Debug, Default)]
pub struct WrapperSet {
    by_version: [Option<Arc<DeviceWrapper>>; 4],
}

impl WrapperSet {
    pub fn get(&self, version: DxVersion) -> Option<&Arc<DeviceWrapper>> {
        self.by_version[version.slot()].as_ref()
    }

    /// Returns the wrapper for `version`, drawing a new one from `pool` (or
    /// allocating standalone) on first use.
    pub fn get_or_create(
        &mut self,
        version: DxVersion,
        pool: Option<&WrapperPool>,
    ) -> Arc<DeviceWrapper> {
        let entry = &mut self.by_version[version.slot()];
        let wrapper = entry.get_or_insert_with(|| match pool {
            Some(pool) => pool.acquire(version),
            None => Arc::new(DeviceWrapper { version, serial: 0 }),
        });
        Arc::clone(wrapper)
    }

    /// Moves every wrapper back into `pool`.
    pub fn drain_into(&mut self, pool: Option<&WrapperPool>) {
        for entry in &mut self.by_version {
            if let (Some(wrapper), Some(pool)) = (entry.take(), pool) {
                pool.give_back(wrapper);
            }
        }
    }
}
