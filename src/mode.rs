//! Signal modes: the ordered test schedule and what each mode generates.

#![forbid(unsafe_code)]

use crate::signal;
use rand::Rng;
use std::fmt;

/// Tone frequency used by the sine modes, in Hz.
pub const SINE_FREQ: u32 = 440;

/// Number of modes in the regular schedule; the rest are evil.
pub const NORMAL_MODE_COUNT: usize = 7;

/// Every mode, in schedule order.
pub const ALL_MODES: [SignalMode; 11] = [
    SignalMode::Silence,
    SignalMode::Impulse,
    SignalMode::RectSymmetric,
    SignalMode::RectUnipolar,
    SignalMode::ConstantTiny,
    SignalMode::Sine,
    SignalMode::RandomImpulse,
    SignalMode::RectOverdriven,
    SignalMode::ConstantDenormal,
    SignalMode::ConstantFltMin,
    SignalMode::SineOverdriven,
];

/// One entry of the test schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SignalMode {
    /// Digital silence.
    Silence,
    /// Single 0.5 impulse at the start of every frame.
    Impulse,
    /// Rectangular wave, 0.5 then -0.5.
    RectSymmetric,
    /// Rectangular wave, 1.0 then 0.0.
    RectUnipolar,
    /// Constant 1e-27: tiny but still a normal float.
    ConstantTiny,
    /// Phase-continuous 440 Hz sine, amplitude 0.5.
    Sine,
    /// One 0.5 impulse per frame at a random position.
    RandomImpulse,
    /// Rectangular wave beyond full scale, -1.5 then 1.5.
    RectOverdriven,
    /// Constant 1e-38, below `f32::MIN_POSITIVE`.
    ConstantDenormal,
    /// Constant `f32::MIN_POSITIVE`, the smallest normal float.
    ConstantFltMin,
    /// Phase-continuous 440 Hz sine, amplitude 1.5 (clipping).
    SineOverdriven,
}

impl SignalMode {
    /// Modes to run: the regular seven, or all eleven in evil mode.
    pub fn schedule(evil: bool) -> &'static [SignalMode] {
        if evil {
            &ALL_MODES
        } else {
            &ALL_MODES[..NORMAL_MODE_COUNT]
        }
    }

    /// Position in the schedule.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Deliberately out-of-range or numerically pathological input.
    pub fn is_evil(self) -> bool {
        self.index() >= NORMAL_MODE_COUNT
    }

    /// Fill `buf` with frame number `frame_index` of this mode.
    pub fn fill<R: Rng + ?Sized>(
        self,
        buf: &mut [f32],
        frame_index: u64,
        sample_rate: u32,
        rng: &mut R,
    ) {
        let phase = frame_index * buf.len() as u64;
        match self {
            SignalMode::Silence => signal::constant(buf, 0.0),
            SignalMode::Impulse => signal::impulse(buf, 0.5),
            SignalMode::RectSymmetric => signal::rectangular(buf, 0.5, -0.5),
            SignalMode::RectUnipolar => signal::rectangular(buf, 1.0, 0.0),
            SignalMode::ConstantTiny => signal::constant(buf, 1e-27),
            SignalMode::Sine => signal::sine(buf, phase, sample_rate, SINE_FREQ, 0.5),
            SignalMode::RandomImpulse => signal::random_impulse(buf, 0.5, rng),
            SignalMode::RectOverdriven => signal::rectangular(buf, -1.5, 1.5),
            SignalMode::ConstantDenormal => signal::constant(buf, 1e-38),
            SignalMode::ConstantFltMin => signal::constant(buf, f32::MIN_POSITIVE),
            SignalMode::SineOverdriven => signal::sine(buf, phase, sample_rate, SINE_FREQ, 1.5),
        }
    }
}

impl fmt::Display for SignalMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalMode::Silence => write!(f, "Silence"),
            SignalMode::Impulse => write!(f, "Impulse amp:0.5"),
            SignalMode::RectSymmetric => write!(f, "Rect wave amp:-0.5..0.5"),
            SignalMode::RectUnipolar => write!(f, "Rect wave amp:0.0..1.0"),
            SignalMode::ConstantTiny => write!(f, "Constant 1e-27"),
            SignalMode::Sine => write!(f, "Sine-wave {}Hz, amp:.5", SINE_FREQ),
            SignalMode::RandomImpulse => write!(f, "Random impulses amp:0.5"),
            SignalMode::RectOverdriven => write!(f, "Rect wave amp:-1.5..1.5"),
            SignalMode::ConstantDenormal => write!(f, "Constant 1e-38 -- denormal"),
            SignalMode::ConstantFltMin => write!(f, "Constant FLT_MIN ({:e})", f32::MIN_POSITIVE),
            SignalMode::SineOverdriven => write!(f, "Sine-wave {}Hz, amp:1.5", SINE_FREQ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn schedule_lengths() {
        assert_eq!(SignalMode::schedule(false).len(), 7);
        assert_eq!(SignalMode::schedule(true).len(), 11);
        assert!(SignalMode::schedule(false).iter().all(|m| !m.is_evil()));
    }

    #[test]
    fn schedule_is_index_ordered() {
        for (i, mode) in ALL_MODES.iter().enumerate() {
            assert_eq!(mode.index(), i);
        }
    }

    #[test]
    fn sine_mode_is_phase_continuous() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut joined = vec![0.0; 240];
        signal::sine(&mut joined, 0, 48000, SINE_FREQ, 0.5);
        let mut frame = vec![0.0; 120];
        SignalMode::Sine.fill(&mut frame, 1, 48000, &mut rng);
        assert_eq!(&frame[..], &joined[120..]);
    }

    #[test]
    fn denormal_mode_is_subnormal() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut frame = vec![0.0; 64];
        SignalMode::ConstantDenormal.fill(&mut frame, 0, 48000, &mut rng);
        assert!(crate::denormal::has_subnormal(&frame));
        SignalMode::ConstantFltMin.fill(&mut frame, 0, 48000, &mut rng);
        assert!(!crate::denormal::has_subnormal(&frame));
    }
}
