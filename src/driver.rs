//! Torture driver: runs the mode schedule through a codec into a sink.
//!
//! [`execute`] owns the whole lifecycle of a run. [`Torture`] is the frame
//! loop on its own and works with any [`CodecTransform`] and [`FrameSink`].

use crate::codec::{self, CodecTransform};
use crate::config::RunConfig;
use crate::denormal::DenormalFlags;
use crate::error::TortureError;
use crate::invariant_ppt::{
    assert_invariant, ENCODE_WITHIN_BOUND, FRAME_LENGTH, SCHEDULE_ORDER, SINK_FINALIZED,
};
use crate::mode::SignalMode;
use crate::sink::{FrameSink, WavSink};
use rand::Rng;
use tracing::{debug, info, warn};

/// What happened while one mode ran.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModeReport {
    pub mode: SignalMode,
    /// Frames (blocks) pushed through the codec.
    pub blocks: usize,
    /// Subnormal samples were seen in a generated frame.
    pub input_denormals: bool,
    /// Subnormal samples were seen in a round-tripped frame.
    pub output_denormals: bool,
    /// Round trips that decoded a sample count other than the block size.
    pub decode_mismatches: usize,
    /// Round trips the codec failed outright.
    pub codec_failures: usize,
    /// Largest compressed packet, in bytes.
    pub max_packet_bytes: usize,
}

impl ModeReport {
    pub fn new(mode: SignalMode) -> Self {
        Self {
            mode,
            blocks: 0,
            input_denormals: false,
            output_denormals: false,
            decode_mismatches: 0,
            codec_failures: 0,
            max_packet_bytes: 0,
        }
    }
}

/// Summary of a completed run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub modes: Vec<ModeReport>,
    /// Blocks written across all modes.
    pub blocks_written: usize,
    /// Stereo frames (samples per channel) written across all modes.
    pub frames_written: usize,
}

impl RunReport {
    fn record(&mut self, mode: ModeReport, block_size: usize) {
        self.blocks_written += mode.blocks;
        self.frames_written += mode.blocks * block_size;
        self.modes.push(mode);
    }

    /// Report for `mode`, if it ran.
    pub fn mode(&self, mode: SignalMode) -> Option<&ModeReport> {
        self.modes.iter().find(|r| r.mode == mode)
    }
}

/// The frame loop and the buffers it reuses.
#[derive(Debug)]
pub struct Torture {
    sample_rate: u32,
    input: Vec<f32>,
    output: Vec<f32>,
    flags: DenormalFlags,
}

impl Torture {
    /// Allocate the input and output frames for `config`.
    pub fn new(config: &RunConfig) -> Result<Self, TortureError> {
        Ok(Self {
            sample_rate: config.sample_rate,
            input: frame_buffer(config.period)?,
            output: frame_buffer(config.period)?,
            flags: DenormalFlags::default(),
        })
    }

    pub fn block_size(&self) -> usize {
        self.input.len()
    }

    /// Most recent generated frame.
    pub fn input(&self) -> &[f32] {
        &self.input
    }

    /// Most recent round-tripped frame.
    pub fn output(&self) -> &[f32] {
        &self.output
    }

    /// Generate, round-trip and inspect one frame. Does not touch a sink.
    ///
    /// A short decode leaves the rest of the output frame zeroed; a failed
    /// round trip zeroes all of it. Neither stops the run.
    pub fn step<R: Rng + ?Sized>(
        &mut self,
        mode: SignalMode,
        frame_index: u64,
        codec: &mut dyn CodecTransform,
        rng: &mut R,
        report: &mut ModeReport,
    ) {
        mode.fill(&mut self.input, frame_index, self.sample_rate, rng);

        match codec.process(&self.input, &mut self.output) {
            Ok(trip) => {
                report.max_packet_bytes = report.max_packet_bytes.max(trip.encoded_bytes);
                if trip.decoded_samples != self.output.len() {
                    report.decode_mismatches += 1;
                    if report.decode_mismatches == 1 {
                        warn!(
                            want = self.output.len(),
                            got = trip.decoded_samples,
                            "en/decoded sample-count does not match"
                        );
                    }
                    let filled = trip.decoded_samples.min(self.output.len());
                    self.output[filled..].fill(0.0);
                }
            }
            Err(err) => {
                report.codec_failures += 1;
                if report.codec_failures == 1 {
                    warn!(error = %err, "round trip failed, writing silence");
                }
                self.output.fill(0.0);
            }
        }

        if self.flags.check_input(&self.input) {
            report.input_denormals = true;
            warn!("input buffer has denormals");
        }
        if self.flags.check_output(&self.output) {
            report.output_denormals = true;
            warn!("output buffer has denormals");
        }
        report.blocks += 1;
    }

    /// Run `blocks` frames of one mode, appending each to `sink`.
    pub fn run_mode<S: FrameSink, R: Rng + ?Sized>(
        &mut self,
        mode: SignalMode,
        blocks: usize,
        codec: &mut dyn CodecTransform,
        sink: &mut S,
        rng: &mut R,
    ) -> Result<ModeReport, TortureError> {
        info!(mode = mode.index(), "{}", mode);
        self.flags.reset();
        let mut report = ModeReport::new(mode);
        for frame_index in 0..blocks {
            self.step(mode, frame_index as u64, codec, rng, &mut report);
            sink.write_interleaved(&self.input, &self.output)?;
        }
        assert_invariant(
            ENCODE_WITHIN_BOUND,
            report.max_packet_bytes <= codec.max_compressed_bytes(),
            "encoded packet exceeds the compressed-size bound",
            None,
        );
        debug!(
            blocks = report.blocks,
            mismatches = report.decode_mismatches,
            failures = report.codec_failures,
            max_packet = report.max_packet_bytes,
            "mode done"
        );
        Ok(report)
    }

    /// Run every mode of `schedule` in order.
    pub fn run<S: FrameSink, R: Rng + ?Sized>(
        &mut self,
        schedule: &[SignalMode],
        blocks_per_mode: usize,
        codec: &mut dyn CodecTransform,
        sink: &mut S,
        rng: &mut R,
    ) -> Result<RunReport, TortureError> {
        assert_invariant(
            FRAME_LENGTH,
            codec.block_size() == self.block_size(),
            "codec block size differs from the frame length",
            None,
        );
        let mut report = RunReport::default();
        let mut previous: Option<SignalMode> = None;
        for &mode in schedule {
            assert_invariant(
                SCHEDULE_ORDER,
                previous.map_or(true, |p| p < mode),
                "modes must run in index order",
                None,
            );
            previous = Some(mode);
            let mode_report = self.run_mode(mode, blocks_per_mode, codec, sink, rng)?;
            report.record(mode_report, self.block_size());
        }
        Ok(report)
    }
}

fn frame_buffer(len: usize) -> Result<Vec<f32>, TortureError> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(len).map_err(|_| TortureError::Alloc(len))?;
    buf.resize(len, 0.0);
    Ok(buf)
}

/// Run the schedule of `config` and tear down: the sink is finalized and the
/// codec dropped whether or not the loop completed.
pub fn run_session<S: FrameSink, R: Rng + ?Sized>(
    torture: &mut Torture,
    config: &RunConfig,
    mut codec: Box<dyn CodecTransform>,
    mut sink: S,
    rng: &mut R,
) -> Result<RunReport, TortureError> {
    let result = torture.run(
        SignalMode::schedule(config.evil),
        config.blocks_per_mode(),
        codec.as_mut(),
        &mut sink,
        rng,
    );
    let closed = sink.finalize();
    drop(codec);
    let report = result?;
    closed?;
    assert_invariant(SINK_FINALIZED, true, "output finalized", None);
    Ok(report)
}

/// Validate, allocate, open the WAV sink, start the codec and run.
pub fn execute<R: Rng + ?Sized>(config: &RunConfig, rng: &mut R) -> Result<RunReport, TortureError> {
    config.validate()?;
    if !config.backend.is_available() {
        return Err(TortureError::BackendUnavailable(config.backend));
    }

    let mut torture = Torture::new(config)?;
    let sink = WavSink::create(&config.output, config.sample_rate, config.format)?;

    let codec = match codec::init(config.backend, config.codec_params()) {
        Ok(codec) => codec,
        Err(err) => {
            if let Err(close) = sink.finalize() {
                warn!(error = %close, "cannot finalize output after codec failure");
            }
            return Err(err.into());
        }
    };
    info!(
        backend = %codec.backend(),
        sample_rate = config.sample_rate,
        period = config.period,
        kbps = config.kbps,
        max_packet = codec.max_compressed_bytes(),
        "codec ready"
    );
    if let Some(delay) = codec.lookahead() {
        info!("Encoder lookahead delay : {}", delay);
    }

    run_session(&mut torture, config, codec, sink, rng)
}
