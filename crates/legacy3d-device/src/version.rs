use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use crate::error::{DeviceError, DeviceResult};

/// One of the four legacy device contracts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DxVersion {
    V1,
    V2,
    V3,
    V7,
}

impl DxVersion {
    pub const ALL: [DxVersion; 4] = [Self::V1, Self::V2, Self::V3, Self::V7];

    pub fn from_number(version: u32) -> DeviceResult<Self> {
        match version {
            1 => Ok(Self::V1),
            2 => Ok(Self::V2),
            3 => Ok(Self::V3),
            7 => Ok(Self::V7),
            _ => Err(DeviceError::Unsupported),
        }
    }

    pub fn number(self) -> u32 {
        match self {
            Self::V1 => 1,
            Self::V2 => 2,
            Self::V3 => 3,
            Self::V7 => 7,
        }
    }

    pub(crate) fn slot(self) -> usize {
        match self {
            Self::V1 => 0,
            Self::V2 => 1,
            Self::V3 => 2,
            Self::V7 => 3,
        }
    }
}

impl fmt::Display for DxVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.number())
    }
}

/// Interface identifiers understood by `query_interface`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum InterfaceId {
    Unknown,
    Device(DxVersion),
    /// The proxied legacy interface in passthrough mode.
    RealInterface,
    /// The version-independent core object.
    CoreObject,
    Other(u128),
}

impl InterfaceId {
    pub fn device_version(self) -> Option<DxVersion> {
        match self {
            Self::Device(version) => Some(version),
            _ => None,
        }
    }
}

/// Outcome of [`VersionRefCounts::release`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Released {
    /// Remaining count of the released version.
    pub remaining: u32,
    /// Set for exactly one caller: the one that must tear the object down.
    pub teardown: bool,
}

/// Independent reference counts for each legacy version of one shared object.
///
/// Wrappers of different versions may be released from different threads, so
/// the counters are atomic and the teardown decision is claimed through a
/// single compare-exchange. A claimed teardown stays pending until the owning
/// device takes it with [`VersionRefCounts::take_pending_teardown`].
#[derive(Debug, Default)]
pub struct VersionRefCounts {
    counts: [AtomicU32; 4],
    destroyed: AtomicBool,
    teardown_pending: AtomicBool,
}

impl VersionRefCounts {
    pub fn new(initial: DxVersion) -> Self {
        let refs = Self::default();
        refs.counts[initial.slot()].store(1, Ordering::Relaxed);
        refs
    }

    pub fn add_ref(&self, version: DxVersion) -> u32 {
        self.counts[version.slot()].fetch_add(1, Ordering::AcqRel) + 1
    }

    pub fn count(&self, version: DxVersion) -> u32 {
        self.counts[version.slot()].load(Ordering::Acquire)
    }

    pub fn total(&self) -> u32 {
        self.counts
            .iter()
            .map(|c| c.load(Ordering::Acquire))
            .sum()
    }

    /// Decrements the version's count if it is non-zero. When the combined
    /// count is observed at zero, the first caller to claim it gets
    /// `teardown = true`.
    pub fn release(&self, version: DxVersion) -> Released {
        let counter = &self.counts[version.slot()];
        let remaining = match counter.fetch_update(Ordering::AcqRel, Ordering::Acquire, |c| {
            c.checked_sub(1)
        }) {
            Ok(previous) => previous - 1,
            Err(_) => 0,
        };

        let teardown = self.total() == 0
            && self
                .destroyed
                .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
                .is_ok();
        if teardown {
            self.teardown_pending.store(true, Ordering::Release);
        }

        Released {
            remaining,
            teardown,
        }
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed.load(Ordering::Acquire)
    }

    /// Returns `true` once after a release claimed the teardown.
    pub fn take_pending_teardown(&self) -> bool {
        self.teardown_pending.swap(false, Ordering::AcqRel)
    }
}
