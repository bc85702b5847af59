//! Signal generators: fill a caller-owned frame with a test pattern.
//!
//! Every generator writes exactly `buf.len()` samples and never allocates.

#![forbid(unsafe_code)]

use rand::Rng;
use std::f64::consts::PI;

/// Every sample = `v`.
pub fn constant(buf: &mut [f32], v: f32) {
    buf.fill(v);
}

/// Sample 0 = `v`, the rest silent.
pub fn impulse(buf: &mut [f32], v: f32) {
    buf.fill(0.0);
    if let Some(first) = buf.first_mut() {
        *first = v;
    }
}

/// A single spike of `v` at a uniformly random position, the rest silent.
pub fn random_impulse<R: Rng + ?Sized>(buf: &mut [f32], v: f32, rng: &mut R) {
    buf.fill(0.0);
    if buf.is_empty() {
        return;
    }
    let spike = rng.gen_range(0..buf.len());
    buf[spike] = v;
}

/// Sine tone. `phase_offset` is the number of samples already generated for
/// this tone, which keeps consecutive frames phase-continuous.
pub fn sine(buf: &mut [f32], phase_offset: u64, sample_rate: u32, freq: u32, amplitude: f32) {
    let step = 2.0 * PI * f64::from(freq) / f64::from(sample_rate);
    for (i, sample) in buf.iter_mut().enumerate() {
        let t = (i as u64 + phase_offset) as f64;
        *sample = (f64::from(amplitude) * (step * t).sin()) as f32;
    }
}

/// Rectangular half-wave: first half `v0`, second half `v1`.
/// With an odd length the extra sample belongs to the second half.
pub fn rectangular(buf: &mut [f32], v0: f32, v1: f32) {
    let half = buf.len() / 2;
    let (first, second) = buf.split_at_mut(half);
    first.fill(v0);
    second.fill(v1);
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn impulse_overwrites_stale_samples() {
        let mut buf = vec![7.0; 16];
        impulse(&mut buf, 0.5);
        assert_eq!(buf[0], 0.5);
        assert!(buf[1..].iter().all(|&s| s == 0.0));
    }

    #[test]
    fn rectangular_odd_length() {
        let mut buf = vec![0.0; 5];
        rectangular(&mut buf, 1.0, -1.0);
        assert_eq!(buf, vec![1.0, 1.0, -1.0, -1.0, -1.0]);
    }

    #[test]
    fn random_impulse_is_seed_deterministic() {
        let mut a = vec![0.0; 120];
        let mut b = vec![0.0; 120];
        random_impulse(&mut a, 0.5, &mut StdRng::seed_from_u64(42));
        random_impulse(&mut b, 0.5, &mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
        assert_eq!(a.iter().filter(|&&s| s != 0.0).count(), 1);
    }

    #[test]
    fn random_impulse_empty_frame() {
        let mut buf: Vec<f32> = Vec::new();
        random_impulse(&mut buf, 0.5, &mut StdRng::seed_from_u64(1));
        assert!(buf.is_empty());
    }

    #[test]
    fn sine_starts_at_zero() {
        let mut buf = vec![1.0; 64];
        sine(&mut buf, 0, 48000, 440, 0.5);
        assert_eq!(buf[0], 0.0);
        assert!(buf[1] > 0.0);
    }
}
