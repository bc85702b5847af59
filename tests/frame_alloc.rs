use opus_torture::driver::ModeReport;
use opus_torture::harness::Loopback;
use opus_torture::mode::ALL_MODES;
use opus_torture::{RunConfig, Torture};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::alloc::{GlobalAlloc, Layout};
use std::cell::RefCell;

thread_local! {
    static ALLOC_COUNT: RefCell<usize> = RefCell::new(0);
}

struct CountingAllocator;

unsafe impl GlobalAlloc for CountingAllocator {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        ALLOC_COUNT.with(|c| *c.borrow_mut() += 1);
        unsafe { std::alloc::System.alloc(layout) }
    }
    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        unsafe { std::alloc::System.dealloc(ptr, layout) }
    }
}

#[global_allocator]
static A: CountingAllocator = CountingAllocator;

#[test]
fn frame_loop_does_not_allocate() {
    let config = RunConfig {
        evil: true,
        ..RunConfig::new("unused.wav")
    };
    let mut torture = Torture::new(&config).unwrap();
    let mut codec = Loopback::new(config.codec_params());
    let mut rng = StdRng::seed_from_u64(0);
    let mut reports: Vec<ModeReport> = ALL_MODES.iter().map(|&m| ModeReport::new(m)).collect();

    // Warm-up: first-hit diagnostics register their callsites.
    for mode in ALL_MODES {
        let mut scratch = ModeReport::new(mode);
        torture.step(mode, 0, &mut codec, &mut rng, &mut scratch);
    }

    let before = ALLOC_COUNT.with(|c| *c.borrow());
    for (mode, report) in ALL_MODES.iter().zip(reports.iter_mut()) {
        for frame in 0..1_000 {
            torture.step(*mode, frame, &mut codec, &mut rng, report);
        }
    }
    let after = ALLOC_COUNT.with(|c| *c.borrow());

    assert_eq!(after, before, "per-frame path should not allocate");
    assert!(reports.iter().all(|r| r.blocks == 1_000));
}
