//! Raw numeric identifiers shared with legacy clients and the backend device.
//!
//! The legacy (1–7) and modern (backend) state spaces overlap numerically for
//! many render states, but not for all of them, so they are kept in separate
//! modules and every translation goes through [`crate::state`].

pub mod legacy;
pub mod modern;

/// Result codes surfaced to legacy callers.
pub mod hresult {
    pub const S_OK: u32 = 0;
    pub const S_FALSE: u32 = 1;
    pub const E_NOTIMPL: u32 = 0x8000_4001;
    pub const E_NOINTERFACE: u32 = 0x8000_4002;
    pub const E_FAIL: u32 = 0x8000_4005;
    pub const E_INVALIDARG: u32 = 0x8007_0057;

    const fn make_ddhresult(code: u32) -> u32 {
        0x8876_0000 | code
    }

    pub const DDERR_GENERIC: u32 = E_FAIL;
    pub const DDERR_INVALIDPARAMS: u32 = E_INVALIDARG;
    pub const DDERR_UNSUPPORTED: u32 = E_NOTIMPL;
    pub const DDERR_INVALIDOBJECT: u32 = make_ddhresult(130);
    pub const D3DERR_NOVIEWPORTS: u32 = make_ddhresult(770);
    pub const D3DERR_NOCURRENTVIEWPORT: u32 = make_ddhresult(771);
    pub const D3DERR_INVALIDVERTEXTYPE: u32 = make_ddhresult(2074);
    pub const D3DERR_INVALIDCALL: u32 = make_ddhresult(2156);
}
