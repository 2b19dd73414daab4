//! `legacy3d-device` serves the Direct3D 1, 2, 3 and 7 device contracts from
//! one shared object.
//!
//! The crate provides:
//! - A version-adapting device facade (see [`Device`]) that either emulates
//!   the legacy contracts on a modern fixed-function [`backend::Backend`] or
//!   forwards them to a genuine legacy implementation.
//! - Translation tables between the legacy and backend state spaces
//!   (see [`state`]).
//! - Handle tables, the attached-viewport list, state-block tracking and the
//!   state snapshot taken around backend resets.

mod log_limit;

pub mod abi;
pub mod backend;
pub mod collab;
pub mod config;
pub mod device;
pub mod draw;
pub mod error;
pub mod handles;
pub mod reset;
pub mod state;
pub mod state_block;
pub mod types;
pub mod version;
pub mod viewport;
pub mod wrapper;

/// Texture stages addressable through the legacy contracts.
pub const MAX_TEXTURE_STAGES: usize = 8;

pub use config::{ByteAlignmentFix, DeviceConfig};
pub use device::{Device, Interface};
pub use draw::flags::DrawFlags;
pub use error::{result_code, BackendError, BackendResult, DeviceError, DeviceResult};
pub use log_limit::{current_log_limit, set_log_limit, DEFAULT_LOG_LIMIT};
pub use version::{DxVersion, InterfaceId, VersionRefCounts};
pub use wrapper::{DeviceWrapper, WrapperPool};
