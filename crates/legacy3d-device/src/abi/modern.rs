//! Identifiers of the backend (D3D9-class) fixed-function device.

/// `D3DRENDERSTATETYPE` values that the translator writes directly.
pub mod rs {
    pub const ZENABLE: u32 = 7;
    pub const ALPHATESTENABLE: u32 = 15;
    pub const SRCBLEND: u32 = 19;
    pub const DESTBLEND: u32 = 20;
    pub const ALPHAREF: u32 = 24;
    pub const ALPHAFUNC: u32 = 25;
    pub const ALPHABLENDENABLE: u32 = 27;
    pub const FOGSTART: u32 = 36;
    pub const FOGEND: u32 = 37;
    pub const FOGDENSITY: u32 = 38;
    pub const WRAP0: u32 = 128;
    pub const CLIPPING: u32 = 136;
    pub const LIGHTING: u32 = 137;
    pub const AMBIENT: u32 = 139;
    pub const FOGVERTEXMODE: u32 = 140;
    pub const COLORVERTEX: u32 = 141;
    pub const MULTISAMPLEANTIALIAS: u32 = 161;
    pub const DEPTHBIAS: u32 = 195;
}

/// Every render-state id the backend accepts.
pub const RENDER_STATES: &[u32] = &[
    7, 8, 9, 14, 15, 16, 19, 20, 22, 23, 24, 25, 26, 27, 28, 29, 34, 35, 36, 37, 38, 48, 52, 53,
    54, 55, 56, 57, 58, 59, 60, 128, 129, 130, 131, 132, 133, 134, 135, 136, 137, 139, 140, 141,
    142, 143, 145, 146, 147, 148, 151, 152, 154, 155, 156, 157, 158, 159, 160, 161, 162, 163, 165,
    166, 167, 168, 170, 171, 172, 173, 174, 175, 176, 178, 179, 180, 181, 182, 183, 184, 185, 186,
    187, 188, 189, 190, 191, 192, 193, 194, 195, 198, 199, 200, 201, 202, 203, 204, 205, 206, 207,
    208, 209,
];

pub fn is_render_state(state: u32) -> bool {
    RENDER_STATES.binary_search(&state).is_ok()
}

/// `D3DSAMPLERSTATETYPE`.
pub mod samp {
    pub const ADDRESSU: u32 = 1;
    pub const ADDRESSV: u32 = 2;
    pub const ADDRESSW: u32 = 3;
    pub const BORDERCOLOR: u32 = 4;
    pub const MAGFILTER: u32 = 5;
    pub const MINFILTER: u32 = 6;
    pub const MIPFILTER: u32 = 7;
    pub const MIPMAPLODBIAS: u32 = 8;
    pub const MAXMIPLEVEL: u32 = 9;
    pub const MAXANISOTROPY: u32 = 10;
    pub const DMAPOFFSET: u32 = 13;
}

/// `D3DTEXTURESTAGESTATETYPE` values still owned by texture stages.
pub mod tss {
    pub const COLOROP: u32 = 1;
    pub const COLORARG1: u32 = 2;
    pub const COLORARG2: u32 = 3;
    pub const ALPHAOP: u32 = 4;
    pub const ALPHAARG1: u32 = 5;
    pub const ALPHAARG2: u32 = 6;
    pub const TEXCOORDINDEX: u32 = 11;
}

pub const TEXTURE_STAGE_STATES: &[u32] = &[1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 22, 23, 24, 26, 27, 28, 32];

pub fn is_texture_stage_state(state: u32) -> bool {
    TEXTURE_STAGE_STATES.binary_search(&state).is_ok()
}

/// `D3DTEXTUREFILTERTYPE`.
pub mod texf {
    pub const NONE: u32 = 0;
    pub const POINT: u32 = 1;
    pub const LINEAR: u32 = 2;
    pub const ANISOTROPIC: u32 = 3;
}

/// `D3DTEXTUREOP`.
pub mod top {
    pub const DISABLE: u32 = 1;
    pub const SELECTARG1: u32 = 2;
    pub const SELECTARG2: u32 = 3;
    pub const MODULATE: u32 = 4;
    pub const ADD: u32 = 7;
    pub const BLENDTEXTUREALPHA: u32 = 13;
}

/// `D3DTA_*` argument selectors.
pub mod ta {
    pub const DIFFUSE: u32 = 0;
    pub const CURRENT: u32 = 1;
    pub const TEXTURE: u32 = 2;
}

/// `D3DBLEND`.
pub mod blend {
    pub const ZERO: u32 = 1;
    pub const ONE: u32 = 2;
    pub const SRCALPHA: u32 = 5;
    pub const INVSRCALPHA: u32 = 6;
}

/// `D3DCMPFUNC`.
pub mod cmp {
    pub const GREATER: u32 = 5;
    pub const ALWAYS: u32 = 8;
}

/// `D3DWRAPCOORD_*` bits of the `WRAP0..7` states.
pub mod wrap {
    pub const U: u32 = 1;
    pub const V: u32 = 2;
}

/// `D3DTS_*` transform ids.
pub mod ts {
    pub const VIEW: u32 = 2;
    pub const PROJECTION: u32 = 3;
    pub const WORLD: u32 = 256;
}

/// `D3DCLEAR_*`.
pub mod clear {
    pub const TARGET: u32 = 1;
    pub const ZBUFFER: u32 = 2;
    pub const STENCIL: u32 = 4;
}

/// Texture formats offered through `EnumTextureFormats`.
pub mod format {
    pub const R5G6B5: u32 = 23;
    pub const X1R5G5B5: u32 = 24;
    pub const A1R5G5B5: u32 = 25;
    pub const A4R4G4B4: u32 = 26;
    pub const X8R8G8B8: u32 = 22;
    pub const A8R8G8B8: u32 = 21;
    pub const P8: u32 = 41;
    pub const DXT1: u32 = u32::from_le_bytes(*b"DXT1");
    pub const DXT3: u32 = u32::from_le_bytes(*b"DXT3");
    pub const DXT5: u32 = u32::from_le_bytes(*b"DXT5");
}
