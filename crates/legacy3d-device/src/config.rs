//! Device configuration.
//!
//! Values default to the behaviour legacy applications expect and can be
//! overridden from the environment, e.g. `LEGACY3D_CONVERT_TO_D3D7=1`.

use crate::log_limit::DEFAULT_LOG_LIMIT;

pub const CONVERT_TO_D3D7_ENV: &str = "LEGACY3D_CONVERT_TO_D3D7";
pub const FIX_BYTE_ALIGNMENT_ENV: &str = "LEGACY3D_FIX_BYTE_ALIGNMENT";
pub const COLOR_KEY_ALPHA_TEST_ENV: &str = "LEGACY3D_COLOR_KEY_ALPHA_TEST";
pub const LOG_LIMIT_ENV: &str = "LEGACY3D_LOG_LIMIT";

/// Handling of surfaces locked with an unaligned pitch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ByteAlignmentFix {
    #[default]
    Off,
    /// The surface wrapper fixes up the pitch; draws keep their filters.
    AlignOnly,
    /// As `AlignOnly`, plus point filtering while drawing from such a surface.
    Point,
    /// As `AlignOnly`, plus linear filtering while drawing from such a surface.
    Linear,
}

impl ByteAlignmentFix {
    fn from_level(level: u32) -> Self {
        match level {
            0 => Self::Off,
            1 => Self::AlignOnly,
            2 => Self::Point,
            _ => Self::Linear,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceConfig {
    /// Serve version 1–3 device queries as version 7 in emulation mode.
    pub convert_to_direct3d7: bool,
    pub fix_byte_alignment: ByteAlignmentFix,
    /// Emulate color keying with an alpha test when a stage surface carries a
    /// color-keyed draw texture.
    pub color_key_alpha_test: bool,
    pub log_limit: u32,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            convert_to_direct3d7: false,
            fix_byte_alignment: ByteAlignmentFix::Off,
            color_key_alpha_test: true,
            log_limit: DEFAULT_LOG_LIMIT,
        }
    }
}

impl DeviceConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let flag = |name: &str, default: bool| lookup(name).map_or(default, |v| is_truthy(&v));
        let number = |name: &str| lookup(name).and_then(|v| v.trim().parse::<u32>().ok());

        Self {
            convert_to_direct3d7: flag(CONVERT_TO_D3D7_ENV, defaults.convert_to_direct3d7),
            fix_byte_alignment: number(FIX_BYTE_ALIGNMENT_ENV)
                .map_or(defaults.fix_byte_alignment, ByteAlignmentFix::from_level),
            color_key_alpha_test: flag(COLOR_KEY_ALPHA_TEST_ENV, defaults.color_key_alpha_test),
            log_limit: number(LOG_LIMIT_ENV).unwrap_or(defaults.log_limit),
        }
    }
}

fn is_truthy(raw: &str) -> bool {
    let v = raw.trim();
    v == "1"
        || v.eq_ignore_ascii_case("true")
        || v.eq_ignore_ascii_case("yes")
        || v.eq_ignore_ascii_case("on")
}
