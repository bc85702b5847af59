//! Output sinks for interleaved (generated, round-tripped) stereo frames.

use hound::{SampleFormat as HoundFormat, WavSpec, WavWriter};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use thiserror::Error;

/// Channels written per frame: generated signal, then round-tripped signal.
pub const CHANNELS: u16 = 2;

/// Sample encoding of the output file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SampleFormat {
    /// 16-bit signed PCM.
    #[default]
    Int16,
    /// 32-bit IEEE float.
    Float32,
}

impl SampleFormat {
    fn wav_spec(self, sample_rate: u32) -> WavSpec {
        let (bits_per_sample, sample_format) = match self {
            SampleFormat::Int16 => (16, HoundFormat::Int),
            SampleFormat::Float32 => (32, HoundFormat::Float),
        };
        WavSpec {
            channels: CHANNELS,
            sample_rate,
            bits_per_sample,
            sample_format,
        }
    }
}

/// Sink failures.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("cannot open output file: {0}")]
    Open(#[source] hound::Error),
    #[error("cannot write output file: {0}")]
    Write(#[source] hound::Error),
    #[error("cannot finalize output file: {0}")]
    Finalize(#[source] hound::Error),
}

/// Destination for stereo frames, written sequentially.
pub trait FrameSink {
    /// Append `left.len()` frames, interleaving `left[i]` with `right[i]`.
    fn write_interleaved(&mut self, left: &[f32], right: &[f32]) -> Result<(), SinkError>;

    /// Flush and close. Called exactly once.
    fn finalize(self) -> Result<(), SinkError>
    where
        Self: Sized;
}

/// Convert a float sample to PCM16, clamping overdriven input to full scale.
pub fn to_pcm16(sample: f32) -> i16 {
    (sample.clamp(-1.0, 1.0) * f32::from(i16::MAX)).round() as i16
}

/// WAV file sink.
pub struct WavSink {
    writer: WavWriter<BufWriter<File>>,
    format: SampleFormat,
}

impl WavSink {
    /// Create (or truncate) `path` for 2-channel output at `sample_rate`.
    pub fn create<P: AsRef<Path>>(
        path: P,
        sample_rate: u32,
        format: SampleFormat,
    ) -> Result<Self, SinkError> {
        let writer =
            WavWriter::create(path, format.wav_spec(sample_rate)).map_err(SinkError::Open)?;
        Ok(Self { writer, format })
    }
}

impl FrameSink for WavSink {
    fn write_interleaved(&mut self, left: &[f32], right: &[f32]) -> Result<(), SinkError> {
        for (&l, &r) in left.iter().zip(right) {
            match self.format {
                SampleFormat::Int16 => {
                    self.writer.write_sample(to_pcm16(l)).map_err(SinkError::Write)?;
                    self.writer.write_sample(to_pcm16(r)).map_err(SinkError::Write)?;
                }
                SampleFormat::Float32 => {
                    self.writer.write_sample(l).map_err(SinkError::Write)?;
                    self.writer.write_sample(r).map_err(SinkError::Write)?;
                }
            }
        }
        Ok(())
    }

    fn finalize(self) -> Result<(), SinkError> {
        self.writer.finalize().map_err(SinkError::Finalize)
    }
}
