use criterion::{black_box, criterion_group, criterion_main, Criterion};
use opus_torture::denormal::has_subnormal;
use opus_torture::driver::ModeReport;
use opus_torture::harness::Loopback;
use opus_torture::mode::ALL_MODES;
use opus_torture::{RunConfig, SignalMode, Torture};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn bench_generators(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(0);
    let mut frame = vec![0.0f32; 960];
    c.bench_function("fill_all_modes_960", |b| {
        b.iter(|| {
            for mode in ALL_MODES {
                mode.fill(black_box(&mut frame), 7, 48000, &mut rng);
            }
            black_box(&frame);
        })
    });
}

fn bench_denormal_scan(c: &mut Criterion) {
    let clean = vec![0.5f32; 1024];
    c.bench_function("has_subnormal_clean_1024", |b| {
        b.iter(|| has_subnormal(black_box(&clean)))
    });
}

fn bench_loopback_step(c: &mut Criterion) {
    let config = RunConfig::new("unused.wav");
    let mut torture = Torture::new(&config).unwrap();
    let mut codec = Loopback::new(config.codec_params());
    let mut rng = StdRng::seed_from_u64(0);
    let mut report = ModeReport::new(SignalMode::Sine);
    let mut frame = 0u64;

    c.bench_function("loopback_step_120", |b| {
        b.iter(|| {
            torture.step(SignalMode::Sine, frame, &mut codec, &mut rng, &mut report);
            frame += 1;
            black_box(torture.output());
        })
    });
}

criterion_group!(benches, bench_generators, bench_denormal_scan, bench_loopback_step);
criterion_main!(benches);
