//! Command-line surface of the `opus-torture` binary.

#![forbid(unsafe_code)]

use crate::codec::Backend;
use crate::config::{
    period_rule, ConfigError, RunConfig, DEFAULT_KBPS, DEFAULT_PERIOD, DEFAULT_SAMPLE_RATE,
};
use crate::sink::SampleFormat;
use clap::Parser;
use std::path::PathBuf;

const AFTER_HELP: &str = "\
opus-torture writes a stereo wav file with various audio patterns:
channel 1 is the generated raw audio,
channel 2 has the same signal passed through an opus en/decode cycle.

WARNING: YOU ARE NOT SUPPOSED TO LISTEN TO THE GENERATED AUDIO FILE!
It may damage your equipment. Inspect it with a wave-editor or analyze it
with sndfile-tools.

With opus-custom ('-c') the period size ('-p') must be a power of two
>= 64 and <= 1024. Standard Opus accepts period sizes which are multiples
of 120 samples. By default a 16bit signed integer wav file is written;
'-f' writes 32bit float instead.";

/// opus-torture - test Opus.
#[derive(Parser, Debug)]
#[command(name = "opus-torture", version, after_help = AFTER_HELP)]
pub struct Cli {
    /// Use opus-custom mode
    #[arg(short, long)]
    pub custom: bool,

    /// Enable evil tests e.g. denormals
    #[arg(short, long)]
    pub evil: bool,

    /// Write 32bit float WAV file
    #[arg(short, long)]
    pub float: bool,

    // Numeric flags parse as i64; `to_config` range-checks them.

    /// Kilobit per second for encoding
    #[arg(
        short,
        long,
        value_name = "NUM",
        allow_negative_numbers = true,
        default_value_t = i64::from(DEFAULT_KBPS)
    )]
    pub kbps: i64,

    /// Block size in samples
    #[arg(
        short,
        long,
        value_name = "NUM",
        allow_negative_numbers = true,
        default_value_t = DEFAULT_PERIOD as i64
    )]
    pub period: i64,

    /// Audio sample rate
    #[arg(
        short,
        long = "samplerate",
        visible_alias = "sample-rate",
        value_name = "NUM",
        allow_negative_numbers = true,
        default_value_t = i64::from(DEFAULT_SAMPLE_RATE)
    )]
    pub samplerate: i64,

    /// Seed for the random-impulse generator (default: fresh entropy)
    #[arg(long, value_name = "NUM")]
    pub seed: Option<u64>,

    /// Print debug diagnostics
    #[arg(short, long)]
    pub verbose: bool,

    /// Output WAV file
    pub filename: PathBuf,
}

impl Cli {
    /// Run configuration described by the flags. Not yet validated, except
    /// that numbers must fit their field.
    pub fn to_config(&self) -> Result<RunConfig, ConfigError> {
        let backend = if self.custom {
            Backend::Custom
        } else {
            Backend::Standard
        };
        let sample_rate = u32::try_from(self.samplerate)
            .map_err(|_| ConfigError::SampleRate(self.samplerate))?;
        let period = usize::try_from(self.period).map_err(|_| ConfigError::Period {
            period: self.period,
            rule: period_rule(backend),
        })?;
        let kbps = u32::try_from(self.kbps).map_err(|_| ConfigError::Bitrate(self.kbps))?;
        Ok(RunConfig {
            sample_rate,
            period,
            kbps,
            backend,
            evil: self.evil,
            format: if self.float {
                SampleFormat::Float32
            } else {
                SampleFormat::Int16
            },
            output: self.filename.clone(),
        })
    }
}
