//! Codec transform: an encode→decode round trip behind one trait.
//!
//! Two backends exist. [`Backend::Standard`] drives the public libopus API and
//! accepts block sizes that are multiples of 120 samples. [`Backend::Custom`]
//! drives the opus-custom API, which accepts power-of-two block sizes at the
//! cost of interoperability. The standard backend is built by default (cargo
//! feature `opus`); the custom one needs the opt-in `opus-custom` feature.
//!
//! A session is created once with [`init`], driven with
//! [`CodecTransform::process`] and destroyed when it is dropped.

use std::fmt;
use thiserror::Error;

#[cfg(feature = "opus-custom")]
pub mod custom;
#[cfg(feature = "opus")]
pub mod standard;

/// Granularity of standard block sizes, in samples.
pub const STANDARD_GRANULARITY: usize = 120;
/// Smallest block size accepted by the custom backend.
pub const CUSTOM_MIN_BLOCK: usize = 64;
/// Largest block size accepted by the custom backend.
pub const CUSTOM_MAX_BLOCK: usize = 1024;
/// Encoder complexity applied to every session (libopus maximum).
pub const COMPLEXITY: i32 = 10;

/// Which codec API performs the round trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Backend {
    /// Public libopus API.
    #[default]
    Standard,
    /// opus-custom API with power-of-two block sizes.
    Custom,
}

impl Backend {
    /// Whether this backend was compiled into the binary.
    pub fn is_available(self) -> bool {
        match self {
            Backend::Standard => cfg!(feature = "opus"),
            Backend::Custom => cfg!(feature = "opus-custom"),
        }
    }

    /// Block-size rule of this backend.
    pub fn accepts_block_size(self, block_size: usize) -> bool {
        match self {
            Backend::Standard => {
                block_size >= STANDARD_GRANULARITY && block_size % STANDARD_GRANULARITY == 0
            }
            Backend::Custom => {
                (CUSTOM_MIN_BLOCK..=CUSTOM_MAX_BLOCK).contains(&block_size)
                    && block_size.is_power_of_two()
            }
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::Standard => write!(f, "standard"),
            Backend::Custom => write!(f, "opus-custom"),
        }
    }
}

/// Parameters a session is negotiated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodecParams {
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Target bitrate in kbit/s (1 kbit = 1024 bit).
    pub kbps: u32,
    /// Samples per encode/decode cycle.
    pub block_size: usize,
}

impl CodecParams {
    /// Upper bound on the compressed size of one block, in bytes.
    pub fn compressed_bound(&self) -> usize {
        let bits = u64::from(self.kbps) * self.block_size as u64 * 1024;
        let per_byte = u64::from(self.sample_rate) * 8;
        if per_byte == 0 {
            return 0;
        }
        usize::try_from(bits / per_byte).unwrap_or(usize::MAX)
    }

    /// Target bitrate in bit/s as handed to the encoder.
    pub fn bits_per_second(&self) -> i32 {
        i32::try_from(u64::from(self.kbps) * 1024).unwrap_or(i32::MAX)
    }
}

/// Byte and sample counts of one round trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundTrip {
    /// Size of the compressed packet.
    pub encoded_bytes: usize,
    /// Samples the decoder produced.
    pub decoded_samples: usize,
}

/// Codec failures. Numeric codes are libopus error codes.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("this version has been compiled without {0} codec support")]
    Unavailable(Backend),
    #[error("invalid block size {size} for the {backend} codec")]
    BlockSize { backend: Backend, size: usize },
    #[error("compressed-size bound is zero bytes")]
    ZeroBound,
    #[error("cannot allocate compressed buffer of {0} bytes")]
    Alloc(usize),
    #[error("cannot create Opus {what}: {code}")]
    Init { what: &'static str, code: i32 },
    #[error("encode failed: {0}")]
    Encode(i32),
    #[error("decode failed: {0}")]
    Decode(i32),
}

/// A live encoder + decoder pair for one configuration.
pub trait CodecTransform {
    /// Backend serving this session.
    fn backend(&self) -> Backend;

    /// Samples per frame.
    fn block_size(&self) -> usize;

    /// Capacity of the scratch compressed buffer.
    fn max_compressed_bytes(&self) -> usize;

    /// Encoder lookahead delay in samples, if the backend reports one.
    fn lookahead(&self) -> Option<u32> {
        None
    }

    /// Encode `input` and decode the packet straight back into `output`.
    ///
    /// `output` samples past `decoded_samples` are left untouched; the caller
    /// decides how to fill them.
    fn process(&mut self, input: &[f32], output: &mut [f32]) -> Result<RoundTrip, CodecError>;
}

/// Create a session for `backend`.
pub fn init(backend: Backend, params: CodecParams) -> Result<Box<dyn CodecTransform>, CodecError> {
    if !backend.is_available() {
        return Err(CodecError::Unavailable(backend));
    }
    if !backend.accepts_block_size(params.block_size) {
        return Err(CodecError::BlockSize {
            backend,
            size: params.block_size,
        });
    }
    if params.compressed_bound() == 0 {
        return Err(CodecError::ZeroBound);
    }
    open(backend, params)
}

fn open(backend: Backend, params: CodecParams) -> Result<Box<dyn CodecTransform>, CodecError> {
    match backend {
        #[cfg(feature = "opus")]
        Backend::Standard => Ok(Box::new(standard::StandardOpus::new(params)?)),
        #[cfg(feature = "opus-custom")]
        Backend::Custom => Ok(Box::new(custom::CustomOpus::new(params)?)),
        #[allow(unreachable_patterns)]
        other => {
            let _ = params;
            Err(CodecError::Unavailable(other))
        }
    }
}

/// Scratch buffer for compressed packets, allocated without aborting on OOM.
pub fn scratch_buffer(len: usize) -> Result<Vec<u8>, CodecError> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(len).map_err(|_| CodecError::Alloc(len))?;
    buf.resize(len, 0);
    Ok(buf)
}
