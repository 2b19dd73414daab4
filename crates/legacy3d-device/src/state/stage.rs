//! Texture-stage states, including the version 7 ids that became sampler
//! states in the backend.

use crate::abi::legacy::{tfg, tfp, tss as legacy_tss};
use crate::abi::modern::{self, samp, texf};

/// Plan for a legacy `SetTextureStageState`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageWrite {
    /// Write a sampler state of the same stage.
    Sampler(u32, u32),
    /// Combined address mode: both U and V.
    Address(u32),
    /// Mip filter, already translated; the caller caches it per stage.
    MipFilter(u32),
    Stage(u32, u32),
    /// Unknown id: accepted, nothing written.
    Unknown,
}

/// How a value read back from the backend must be adjusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadFixup {
    None,
    MagFilter,
    MipFilter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageRead {
    Sampler(u32, ReadFixup),
    /// Combined address mode: U and V must agree.
    Address,
    Stage(u32),
    Unknown,
}

fn sampler_for(state: u32) -> Option<u32> {
    Some(match state {
        legacy_tss::ADDRESSU => samp::ADDRESSU,
        legacy_tss::ADDRESSV => samp::ADDRESSV,
        legacy_tss::ADDRESSW => samp::ADDRESSW,
        legacy_tss::BORDERCOLOR => samp::BORDERCOLOR,
        legacy_tss::MAGFILTER => samp::MAGFILTER,
        legacy_tss::MINFILTER => samp::MINFILTER,
        legacy_tss::MIPFILTER => samp::MIPFILTER,
        legacy_tss::MIPMAPLODBIAS => samp::MIPMAPLODBIAS,
        legacy_tss::MAXMIPLEVEL => samp::MAXMIPLEVEL,
        legacy_tss::MAXANISOTROPY => samp::MAXANISOTROPY,
        _ => return None,
    })
}

/// `D3DTFG_*` to backend filter. Cubic filters degrade to linear.
pub fn mag_filter_to_backend(value: u32) -> u32 {
    match value {
        tfg::ANISOTROPIC => texf::ANISOTROPIC,
        tfg::FLATCUBIC | tfg::GAUSSIANCUBIC => texf::LINEAR,
        other => other,
    }
}

pub fn mag_filter_from_backend(value: u32) -> u32 {
    if value == texf::ANISOTROPIC {
        tfg::ANISOTROPIC
    } else {
        value
    }
}

/// `D3DTFP_*` to backend filter; anything unknown disables mipmapping.
pub fn mip_filter_to_backend(value: u32) -> u32 {
    match value {
        tfp::POINT => texf::POINT,
        tfp::LINEAR => texf::LINEAR,
        _ => texf::NONE,
    }
}

pub fn mip_filter_from_backend(value: u32) -> u32 {
    match value {
        texf::POINT => tfp::POINT,
        texf::LINEAR => tfp::LINEAR,
        _ => tfp::NONE,
    }
}

pub fn plan_stage_state_write(state: u32, value: u32) -> StageWrite {
    match state {
        legacy_tss::ADDRESS => StageWrite::Address(value),
        legacy_tss::MAGFILTER => StageWrite::Sampler(samp::MAGFILTER, mag_filter_to_backend(value)),
        legacy_tss::MIPFILTER => StageWrite::MipFilter(mip_filter_to_backend(value)),
        _ => match sampler_for(state) {
            Some(sampler) => StageWrite::Sampler(sampler, value),
            None if modern::is_texture_stage_state(state) => StageWrite::Stage(state, value),
            None => StageWrite::Unknown,
        },
    }
}

pub fn plan_stage_state_read(state: u32) -> StageRead {
    match state {
        legacy_tss::ADDRESS => StageRead::Address,
        legacy_tss::MAGFILTER => StageRead::Sampler(samp::MAGFILTER, ReadFixup::MagFilter),
        legacy_tss::MIPFILTER => StageRead::Sampler(samp::MIPFILTER, ReadFixup::MipFilter),
        _ => match sampler_for(state) {
            Some(sampler) => StageRead::Sampler(sampler, ReadFixup::None),
            None if modern::is_texture_stage_state(state) => StageRead::Stage(state),
            None => StageRead::Unknown,
        },
    }
}

impl ReadFixup {
    pub fn apply(self, value: u32) -> u32 {
        match self {
            ReadFixup::None => value,
            ReadFixup::MagFilter => mag_filter_from_backend(value),
            ReadFixup::MipFilter => mip_filter_from_backend(value),
        }
    }
}
