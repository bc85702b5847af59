//! Fatal run errors and the exit status each one maps to.

use crate::codec::{Backend, CodecError};
use crate::config::ConfigError;
use crate::sink::SinkError;
use thiserror::Error;

/// Exit status for command-line usage errors.
pub const EXIT_USAGE: u8 = 1;
pub const EXIT_CONFIG: u8 = 2;
pub const EXIT_ALLOC: u8 = 3;
pub const EXIT_OUTPUT_OPEN: u8 = 4;
pub const EXIT_BACKEND_UNAVAILABLE: u8 = 5;
pub const EXIT_BACKEND_INIT: u8 = 6;
pub const EXIT_OUTPUT_WRITE: u8 = 7;

/// Anything that stops a run. Runtime anomalies are not errors; they end up
/// in the [`RunReport`](crate::driver::RunReport).
#[derive(Debug, Error)]
pub enum TortureError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("this version has been compiled without {0} codec support")]
    BackendUnavailable(Backend),
    #[error("out of memory allocating {0} samples")]
    Alloc(usize),
    #[error(transparent)]
    Codec(#[from] CodecError),
    #[error(transparent)]
    Sink(#[from] SinkError),
}

impl TortureError {
    /// Process exit status for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            TortureError::Config(_) => EXIT_CONFIG,
            TortureError::BackendUnavailable(_) => EXIT_BACKEND_UNAVAILABLE,
            TortureError::Alloc(_) => EXIT_ALLOC,
            TortureError::Codec(CodecError::Alloc(_)) => EXIT_ALLOC,
            TortureError::Codec(CodecError::Unavailable(_)) => EXIT_BACKEND_UNAVAILABLE,
            TortureError::Codec(_) => EXIT_BACKEND_INIT,
            TortureError::Sink(SinkError::Open(_)) => EXIT_OUTPUT_OPEN,
            TortureError::Sink(_) => EXIT_OUTPUT_WRITE,
        }
    }
}
