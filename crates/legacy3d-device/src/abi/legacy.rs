//! Identifiers of the version 1–7 device contracts.

/// `D3DRENDERSTATETYPE` values. Ids shared with the backend are listed in
/// [`super::modern::rs`] and only re-exported here when the legacy name differs.
pub mod rs {
    pub const TEXTUREHANDLE: u32 = 1;
    pub const ANTIALIAS: u32 = 2;
    pub const TEXTUREADDRESS: u32 = 3;
    pub const TEXTUREPERSPECTIVE: u32 = 4;
    pub const WRAPU: u32 = 5;
    pub const WRAPV: u32 = 6;
    pub const LINEPATTERN: u32 = 10;
    pub const MONOENABLE: u32 = 11;
    pub const ROP2: u32 = 12;
    pub const PLANEMASK: u32 = 13;
    pub const TEXTUREMAG: u32 = 17;
    pub const TEXTUREMIN: u32 = 18;
    pub const SRCBLEND: u32 = 19;
    pub const DESTBLEND: u32 = 20;
    pub const TEXTUREMAPBLEND: u32 = 21;
    pub const ALPHAREF: u32 = 24;
    pub const ALPHABLENDENABLE: u32 = 27;
    pub const ZVISIBLE: u32 = 30;
    pub const SUBPIXEL: u32 = 31;
    pub const SUBPIXELX: u32 = 32;
    pub const STIPPLEDALPHA: u32 = 33;
    pub const STIPPLEENABLE: u32 = 39;
    pub const EDGEANTIALIAS: u32 = 40;
    pub const COLORKEYENABLE: u32 = 41;
    pub const OLDALPHABLENDENABLE: u32 = 42;
    pub const BORDERCOLOR: u32 = 43;
    pub const TEXTUREADDRESSU: u32 = 44;
    pub const TEXTUREADDRESSV: u32 = 45;
    pub const MIPMAPLODBIAS: u32 = 46;
    pub const ZBIAS: u32 = 47;
    pub const FLUSHBATCH: u32 = 50;
    pub const TRANSLUCENTSORTINDEPENDENT: u32 = 51;
    pub const STIPPLEPATTERN00: u32 = 64;
    pub const STIPPLEPATTERN31: u32 = 95;
    pub const CLIPPING: u32 = 136;
    pub const LIGHTING: u32 = 137;
    pub const EXTENTS: u32 = 138;
    pub const COLORKEYBLENDENABLE: u32 = 144;
}

/// `D3DLIGHTSTATETYPE` (versions 2 and 3).
pub mod ls {
    pub const MATERIAL: u32 = 1;
    pub const AMBIENT: u32 = 2;
    pub const COLORMODEL: u32 = 3;
    pub const FOGMODE: u32 = 4;
    pub const FOGSTART: u32 = 5;
    pub const FOGEND: u32 = 6;
    pub const FOGDENSITY: u32 = 7;
    pub const COLORVERTEX: u32 = 8;
}

/// `D3DTEXTURESTAGESTATETYPE` ids that moved to sampler states in the backend.
pub mod tss {
    pub const ADDRESS: u32 = 12;
    pub const ADDRESSU: u32 = 13;
    pub const ADDRESSV: u32 = 14;
    pub const BORDERCOLOR: u32 = 15;
    pub const MAGFILTER: u32 = 16;
    pub const MINFILTER: u32 = 17;
    pub const MIPFILTER: u32 = 18;
    pub const MIPMAPLODBIAS: u32 = 19;
    pub const MAXMIPLEVEL: u32 = 20;
    pub const MAXANISOTROPY: u32 = 21;
    pub const ADDRESSW: u32 = 25;
}

/// `D3DTRANSFORMSTATETYPE` ids whose numbering differs from the backend.
pub mod ts {
    pub const WORLD: u32 = 1;
    pub const VIEW: u32 = 2;
    pub const PROJECTION: u32 = 3;
    pub const WORLD1: u32 = 4;
    pub const WORLD2: u32 = 5;
    pub const WORLD3: u32 = 6;
}

/// `D3DFILTER_*`, used by `TEXTUREMAG`/`TEXTUREMIN`.
pub mod filter {
    pub const NEAREST: u32 = 1;
    pub const LINEAR: u32 = 2;
    pub const MIPNEAREST: u32 = 3;
    pub const MIPLINEAR: u32 = 4;
    pub const LINEARMIPNEAREST: u32 = 5;
    pub const LINEARMIPLINEAR: u32 = 6;
}

/// `D3DTFG_*` magnification filters.
pub mod tfg {
    pub const POINT: u32 = 1;
    pub const LINEAR: u32 = 2;
    pub const FLATCUBIC: u32 = 3;
    pub const GAUSSIANCUBIC: u32 = 4;
    pub const ANISOTROPIC: u32 = 5;
}

/// `D3DTFP_*` mip filters.
pub mod tfp {
    pub const NONE: u32 = 1;
    pub const POINT: u32 = 2;
    pub const LINEAR: u32 = 3;
}

/// `D3DTBLEND_*` texture-map-blend modes.
pub mod tblend {
    pub const DECAL: u32 = 1;
    pub const MODULATE: u32 = 2;
    pub const DECALALPHA: u32 = 3;
    pub const MODULATEALPHA: u32 = 4;
    pub const DECALMASK: u32 = 5;
    pub const MODULATEMASK: u32 = 6;
    pub const COPY: u32 = 7;
    pub const ADD: u32 = 8;
}

/// `D3DANTIALIAS_*`.
pub mod antialias {
    pub const NONE: u32 = 0;
    pub const SORTDEPENDENT: u32 = 1;
    pub const SORTINDEPENDENT: u32 = 2;
}

pub const COLOR_MONO: u32 = 1;
pub const COLOR_RGB: u32 = 2;

/// GDI `R2_COPYPEN`, the only supported `ROP2` value.
pub const R2_COPYPEN: u32 = 13;

/// `D3DVERTEXTYPE` tags of the version 2 draw entry points.
pub mod vt {
    pub const VERTEX: u32 = 1;
    pub const LVERTEX: u32 = 2;
    pub const TLVERTEX: u32 = 3;
}

/// `D3DLIGHTTYPE`.
pub mod light_type {
    pub const POINT: u32 = 1;
    pub const SPOT: u32 = 2;
    pub const DIRECTIONAL: u32 = 3;
    pub const PARALLELPOINT: u32 = 4;
    pub const GLSPOT: u32 = 5;
}

/// `D3DLIGHT_ACTIVE` flag of `D3DLIGHT2`.
pub const LIGHT_ACTIVE: u32 = 0x1;
/// `D3DLIGHT_NO_SPECULAR` flag of `D3DLIGHT2`.
pub const LIGHT_NO_SPECULAR: u32 = 0x2;

/// `D3DNEXT_*` flags of `NextViewport`.
pub mod next {
    pub const NEXT: u32 = 1;
    pub const HEAD: u32 = 2;
    pub const TAIL: u32 = 4;
}

/// `D3DCLIPSTATUS_*` flags.
pub mod clip_status {
    pub const STATUS: u32 = 1;
    pub const EXTENTS2: u32 = 2;
    pub const EXTENTS3: u32 = 4;
}
