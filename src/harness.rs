//! Test harness: stand-in codecs and sinks for driving the torture loop
//! without libopus or a file system.

use crate::codec::{Backend, CodecError, CodecParams, CodecTransform, RoundTrip};
use crate::sink::{FrameSink, SinkError};

/// Codec that reproduces its input exactly.
#[derive(Debug)]
pub struct Loopback {
    params: CodecParams,
    /// Samples reported as decoded; `None` means a full block.
    decoded: Option<usize>,
}

impl Loopback {
    pub fn new(params: CodecParams) -> Self {
        Self {
            params,
            decoded: None,
        }
    }

    /// Loopback whose decoder only ever returns `samples` samples.
    pub fn short(params: CodecParams, samples: usize) -> Self {
        Self {
            params,
            decoded: Some(samples),
        }
    }
}

impl CodecTransform for Loopback {
    fn backend(&self) -> Backend {
        Backend::Standard
    }

    fn block_size(&self) -> usize {
        self.params.block_size
    }

    fn max_compressed_bytes(&self) -> usize {
        self.params.compressed_bound()
    }

    fn lookahead(&self) -> Option<u32> {
        Some(0)
    }

    fn process(&mut self, input: &[f32], output: &mut [f32]) -> Result<RoundTrip, CodecError> {
        let n = self
            .decoded
            .unwrap_or(self.params.block_size)
            .min(input.len())
            .min(output.len());
        output[..n].copy_from_slice(&input[..n]);
        Ok(RoundTrip {
            encoded_bytes: self.params.compressed_bound(),
            decoded_samples: n,
        })
    }
}

/// Codec whose every round trip fails to encode.
#[derive(Debug)]
pub struct Broken {
    params: CodecParams,
}

impl Broken {
    pub fn new(params: CodecParams) -> Self {
        Self { params }
    }
}

impl CodecTransform for Broken {
    fn backend(&self) -> Backend {
        Backend::Standard
    }

    fn block_size(&self) -> usize {
        self.params.block_size
    }

    fn max_compressed_bytes(&self) -> usize {
        self.params.compressed_bound()
    }

    fn process(&mut self, _input: &[f32], _output: &mut [f32]) -> Result<RoundTrip, CodecError> {
        // OPUS_INTERNAL_ERROR
        Err(CodecError::Encode(-3))
    }
}

/// Sink that keeps every frame in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    /// Interleaved samples: generated, round-tripped, generated, ...
    pub samples: Vec<f32>,
    pub finalized: bool,
    /// Fail the write after this many frames have been stored.
    pub fail_after: Option<usize>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_after(frames: usize) -> Self {
        Self {
            fail_after: Some(frames),
            ..Self::default()
        }
    }

    /// Stereo frames stored.
    pub fn frames(&self) -> usize {
        self.samples.len() / 2
    }

    /// Channel 1: the generated signal.
    pub fn generated(&self) -> impl Iterator<Item = f32> + '_ {
        self.samples.iter().step_by(2).copied()
    }

    /// Channel 2: the round-tripped signal.
    pub fn round_tripped(&self) -> impl Iterator<Item = f32> + '_ {
        self.samples.iter().skip(1).step_by(2).copied()
    }
}

impl FrameSink for &mut MemorySink {
    fn write_interleaved(&mut self, left: &[f32], right: &[f32]) -> Result<(), SinkError> {
        if let Some(limit) = self.fail_after {
            if self.frames() + left.len() > limit {
                return Err(SinkError::Write(hound::Error::IoError(std::io::Error::new(
                    std::io::ErrorKind::WriteZero,
                    "memory sink full",
                ))));
            }
        }
        for (&l, &r) in left.iter().zip(right) {
            self.samples.push(l);
            self.samples.push(r);
        }
        Ok(())
    }

    fn finalize(self) -> Result<(), SinkError> {
        self.finalized = true;
        Ok(())
    }
}
