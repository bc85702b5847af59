use opus_torture::driver::ModeReport;
use opus_torture::harness::Loopback;
use opus_torture::mode::ALL_MODES;
use opus_torture::{Backend, RunConfig, Torture};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fs;
use std::path::Path;

/// The per-frame path must not call `assert_invariant`, which takes a Mutex.
#[test]
fn step_does_not_call_assert_invariant() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("src")
        .join("driver.rs");
    let src = fs::read_to_string(path).expect("failed to read driver.rs");
    let start = src.find("pub fn step").expect("step not found");
    let end = src[start..].find("pub fn run_mode").expect("run_mode not found") + start;
    assert!(
        !src[start..end].contains("assert_invariant("),
        "Torture::step runs once per frame and must not call assert_invariant."
    );
}

proptest! {
    #[test]
    fn step_never_panics(
        custom in any::<bool>(),
        exponent in 6u32..=10,
        multiple in 1usize..=24,
        sample_rate in 8000u32..=192_000,
        decoded in 0usize..=3000,
        frame in 0u64..10_000,
        seed in any::<u64>(),
    ) {
        let (backend, period) = if custom {
            (Backend::Custom, 1usize << exponent)
        } else {
            (Backend::Standard, multiple * 120)
        };
        let config = RunConfig {
            backend,
            period,
            sample_rate,
            ..RunConfig::new("unused.wav")
        };
        let mut torture = Torture::new(&config).unwrap();
        let mut codec = Loopback::short(config.codec_params(), decoded);
        let mut rng = StdRng::seed_from_u64(seed);
        for mode in ALL_MODES {
            let mut report = ModeReport::new(mode);
            torture.step(mode, frame, &mut codec, &mut rng, &mut report);
            prop_assert_eq!(report.blocks, 1);
            prop_assert_eq!(report.decode_mismatches, usize::from(decoded < period));
            prop_assert!(torture.output()[decoded.min(period)..].iter().all(|&s| s == 0.0));
        }
    }
}
