use bitflags::bitflags;

bitflags! {
    /// `D3DDP_*` draw flags plus the bits the device sets on itself.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct DrawFlags: u32 {
        const WAIT = 0x01;
        const DONOTCLIP = 0x04;
        const DONOTUPDATEEXTENTS = 0x08;
        const DONOTLIGHT = 0x10;

        /// Set by the device when a stage was rebound to its color-keyed texture.
        const ALPHA_COLOR_KEY = 0x1000_0000;
        /// Requested by surface blits: run the shared color-key pixel shader.
        const COLOR_KEY_SHADER = 0x2000_0000;

        const _ = !0;
    }
}

impl DrawFlags {
    /// Flags that only older device versions understand.
    pub const LEGACY_ONLY: DrawFlags = DrawFlags::DONOTCLIP
        .union(DrawFlags::DONOTUPDATEEXTENTS)
        .union(DrawFlags::DONOTLIGHT);

    /// Flags that never leave the device.
    pub const INTERNAL: DrawFlags = DrawFlags::ALPHA_COLOR_KEY.union(DrawFlags::COLOR_KEY_SHADER);

    /// Whether lighting has to be forced off for this draw.
    pub fn skips_lighting(self, has_normal: bool) -> bool {
        self.contains(DrawFlags::DONOTLIGHT) || !has_normal
    }
}

/// Values captured before a draw so they can be put back afterwards.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SavedDrawStates {
    pub clipping: u32,
    pub lighting: u32,
    pub extents: u32,
    pub alpha_test_enable: u32,
    pub alpha_func: u32,
    pub alpha_ref: u32,
    pub min_filter: [u32; crate::MAX_TEXTURE_STAGES],
    pub mag_filter: [u32; crate::MAX_TEXTURE_STAGES],
    /// Bit per stage whose filters were overridden for an unaligned surface.
    pub filtered_stages: u8,
    /// Bit per stage rebound to its color-keyed texture.
    pub keyed_stages: u8,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_normal_implies_no_lighting() {
        assert!(DrawFlags::empty().skips_lighting(false));
        assert!(!DrawFlags::WAIT.skips_lighting(true));
        assert!(DrawFlags::DONOTLIGHT.skips_lighting(true));
    }

    #[test]
    fn legacy_flags_strip_cleanly() {
        let flags = DrawFlags::WAIT | DrawFlags::DONOTCLIP | DrawFlags::DONOTLIGHT;
        assert_eq!(flags.difference(DrawFlags::LEGACY_ONLY), DrawFlags::WAIT);
        assert_eq!(DrawFlags::from_bits_retain(0x40).bits(), 0x40);
    }
}
