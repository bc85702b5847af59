//! Subnormal (denormal) sample detection.

#![forbid(unsafe_code)]

/// True if any sample is nonzero with an all-zero exponent field.
pub fn has_subnormal(buf: &[f32]) -> bool {
    buf.iter().any(|s| s.is_subnormal())
}

/// Number of subnormal samples in `buf`.
pub fn count_subnormal(buf: &[f32]) -> usize {
    buf.iter().filter(|s| s.is_subnormal()).count()
}

/// Sticky per-mode notification state: each direction is reported once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DenormalFlags {
    /// Input frame denormals already reported for this mode.
    pub input_reported: bool,
    /// Output frame denormals already reported for this mode.
    pub output_reported: bool,
}

impl DenormalFlags {
    /// Clear both flags at the start of a mode.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Returns true the first time `buf` is found to hold input denormals.
    pub fn check_input(&mut self, buf: &[f32]) -> bool {
        Self::check(&mut self.input_reported, buf)
    }

    /// Returns true the first time `buf` is found to hold output denormals.
    pub fn check_output(&mut self, buf: &[f32]) -> bool {
        Self::check(&mut self.output_reported, buf)
    }

    fn check(reported: &mut bool, buf: &[f32]) -> bool {
        if *reported || !has_subnormal(buf) {
            return false;
        }
        *reported = true;
        true
    }
}
