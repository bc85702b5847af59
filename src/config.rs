//! Run configuration and its validation rules.

#![forbid(unsafe_code)]

use crate::codec::{Backend, CodecParams};
use crate::invariant_ppt::{assert_invariant, CONFIG_VALIDATED};
use crate::sink::SampleFormat;
use std::ops::RangeInclusive;
use std::path::PathBuf;
use thiserror::Error;

/// Accepted sample rates, in Hz.
pub const SAMPLE_RATE_RANGE: RangeInclusive<u32> = 8000..=192_000;
/// Accepted bitrates, in kbit/s.
pub const KBPS_RANGE: RangeInclusive<u32> = 1..=512;

pub const DEFAULT_SAMPLE_RATE: u32 = 48000;
pub const DEFAULT_PERIOD: usize = 120;
pub const DEFAULT_KBPS: u32 = 128;

/// Invalid run parameters. Detected before anything is allocated.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid Sample Rate: {0} (allowed 8000..=192000)")]
    SampleRate(i64),
    #[error("Invalid Period size: {period} ({rule})")]
    Period { period: i64, rule: &'static str },
    #[error("Invalid bitrate: {0} (allowed 1..=512 kbit/s)")]
    Bitrate(i64),
    #[error("Invalid bitrate: {kbps} kbit/s leaves no room for a {period}-sample packet")]
    EmptyPacket { kbps: u32, period: usize },
}

/// Everything one run needs. Immutable once validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    pub sample_rate: u32,
    /// Block size in samples.
    pub period: usize,
    pub kbps: u32,
    pub backend: Backend,
    /// Append the adversarial modes to the schedule.
    pub evil: bool,
    pub format: SampleFormat,
    pub output: PathBuf,
}

impl RunConfig {
    /// Defaults for everything but the output path.
    pub fn new<P: Into<PathBuf>>(output: P) -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            period: DEFAULT_PERIOD,
            kbps: DEFAULT_KBPS,
            backend: Backend::Standard,
            evil: false,
            format: SampleFormat::Int16,
            output: output.into(),
        }
    }

    /// Check every parameter rule; the first violation wins.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !SAMPLE_RATE_RANGE.contains(&self.sample_rate) {
            return Err(ConfigError::SampleRate(self.sample_rate.into()));
        }
        if !self.backend.accepts_block_size(self.period) {
            return Err(ConfigError::Period {
                period: i64::try_from(self.period).unwrap_or(i64::MAX),
                rule: period_rule(self.backend),
            });
        }
        if !KBPS_RANGE.contains(&self.kbps) {
            return Err(ConfigError::Bitrate(self.kbps.into()));
        }
        if self.codec_params().compressed_bound() == 0 {
            return Err(ConfigError::EmptyPacket {
                kbps: self.kbps,
                period: self.period,
            });
        }
        assert_invariant(CONFIG_VALIDATED, true, "configuration validated", None);
        Ok(())
    }

    /// Codec session parameters.
    pub fn codec_params(&self) -> CodecParams {
        CodecParams {
            sample_rate: self.sample_rate,
            kbps: self.kbps,
            block_size: self.period,
        }
    }

    /// Blocks generated per mode: one second of audio, rounded down.
    pub fn blocks_per_mode(&self) -> usize {
        if self.period == 0 {
            return 0;
        }
        self.sample_rate as usize / self.period
    }
}

/// Block-size rule of `backend`, as shown in error messages.
pub(crate) fn period_rule(backend: Backend) -> &'static str {
    match backend {
        Backend::Standard => "must be a positive multiple of 120",
        Backend::Custom => "must be a power of two in 64..=1024",
    }
}
