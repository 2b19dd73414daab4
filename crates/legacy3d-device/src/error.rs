use thiserror::Error;

use crate::abi::hresult;

/// Failure reported by the backend device or a passthrough proxy, carrying its raw result code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("backend call failed with code {0:#010x}")]
pub struct BackendError(pub u32);

impl BackendError {
    pub const INVALID_CALL: Self = Self(hresult::D3DERR_INVALIDCALL);
    pub const FAIL: Self = Self(hresult::E_FAIL);
}

pub type BackendResult<T> = Result<T, BackendError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DeviceError {
    #[error("invalid parameter")]
    InvalidParams,
    #[error("backend device or parent display is unavailable")]
    InvalidObject,
    #[error("operation is not supported in this mode or version")]
    Unsupported,
    #[error("interface is not supported")]
    NoInterface,
    #[error("generic failure")]
    Generic,
    #[error("vertex type is not recognised")]
    InvalidVertexType,
    #[error("no viewports are attached")]
    NoViewports,
    #[error("no current viewport is set")]
    NoCurrentViewport,
    #[error(transparent)]
    Backend(#[from] BackendError),
}

impl DeviceError {
    /// Result code to hand back to a legacy caller.
    pub fn code(self) -> u32 {
        match self {
            Self::InvalidParams => hresult::DDERR_INVALIDPARAMS,
            Self::InvalidObject => hresult::DDERR_INVALIDOBJECT,
            Self::Unsupported => hresult::DDERR_UNSUPPORTED,
            Self::NoInterface => hresult::E_NOINTERFACE,
            Self::Generic => hresult::DDERR_GENERIC,
            Self::InvalidVertexType => hresult::D3DERR_INVALIDVERTEXTYPE,
            Self::NoViewports => hresult::D3DERR_NOVIEWPORTS,
            Self::NoCurrentViewport => hresult::D3DERR_NOCURRENTVIEWPORT,
            Self::Backend(BackendError(code)) => code,
        }
    }
}

pub type DeviceResult<T> = Result<T, DeviceError>;

/// Collapses a result into the code seen by a legacy caller.
pub fn result_code<T>(result: &DeviceResult<T>) -> u32 {
    match result {
        Ok(_) => hresult::S_OK,
        Err(err) => err.code(),
    }
}
