//! Round-trip torture harness for the Opus codec.
//!
//! A schedule of deterministic and adversarial signals is generated frame by
//! frame, pushed through an encode→decode cycle and written next to the
//! original as a stereo WAV file for offline inspection.

pub mod cli;
pub mod codec;
pub mod config;
pub mod denormal;
pub mod driver;
pub mod error;
#[doc(hidden)]
pub mod harness;
#[doc(hidden)]
pub mod invariant_ppt;
pub mod mode;
pub mod signal;
pub mod sink;

pub use codec::{Backend, CodecError, CodecParams, CodecTransform, RoundTrip};
pub use config::{ConfigError, RunConfig};
pub use driver::{execute, ModeReport, RunReport, Torture};
pub use error::TortureError;
pub use mode::SignalMode;
pub use sink::{FrameSink, SampleFormat, WavSink};
