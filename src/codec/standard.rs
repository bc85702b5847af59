//! Standard backend over the public libopus encoder/decoder API.

use super::{Backend, CodecError, CodecParams, CodecTransform, RoundTrip, COMPLEXITY};
use audiopus_sys as ffi;
use std::os::raw::c_int;
use std::ptr::NonNull;
use tracing::{debug, warn};

const OK: c_int = ffi::OPUS_OK as c_int;

struct Encoder(NonNull<ffi::OpusEncoder>);

impl Encoder {
    fn new(sample_rate: u32) -> Result<Self, CodecError> {
        let mut err: c_int = OK;
        // SAFETY: `err` is a valid out-pointer for the duration of the call.
        let raw = unsafe {
            ffi::opus_encoder_create(
                sample_rate as ffi::opus_int32,
                1,
                ffi::OPUS_APPLICATION_RESTRICTED_LOWDELAY as c_int,
                &mut err,
            )
        };
        match NonNull::new(raw) {
            Some(ptr) if err == OK => Ok(Self(ptr)),
            _ => Err(CodecError::Init {
                what: "encoder",
                code: err,
            }),
        }
    }

    fn set(&mut self, request: c_int, value: ffi::opus_int32, name: &str) {
        // SAFETY: SET requests take a single opus_int32 argument.
        let ret = unsafe { ffi::opus_encoder_ctl(self.0.as_ptr(), request, value) };
        if ret != OK {
            warn!(code = ret, "{} failed", name);
        }
    }

    fn lookahead(&mut self) -> Option<u32> {
        let mut value: ffi::opus_int32 = 0;
        // SAFETY: GET_LOOKAHEAD writes one opus_int32 through the pointer.
        let ret = unsafe {
            ffi::opus_encoder_ctl(
                self.0.as_ptr(),
                ffi::OPUS_GET_LOOKAHEAD_REQUEST as c_int,
                &mut value as *mut ffi::opus_int32,
            )
        };
        if ret != OK {
            warn!(code = ret, "OPUS_GET_LOOKAHEAD failed");
            return None;
        }
        u32::try_from(value).ok()
    }
}

impl Drop for Encoder {
    fn drop(&mut self) {
        // SAFETY: created by opus_encoder_create and destroyed exactly once.
        unsafe { ffi::opus_encoder_destroy(self.0.as_ptr()) }
    }
}

struct Decoder(NonNull<ffi::OpusDecoder>);

impl Decoder {
    fn new(sample_rate: u32) -> Result<Self, CodecError> {
        let mut err: c_int = OK;
        // SAFETY: `err` is a valid out-pointer for the duration of the call.
        let raw = unsafe { ffi::opus_decoder_create(sample_rate as ffi::opus_int32, 1, &mut err) };
        match NonNull::new(raw) {
            Some(ptr) if err == OK => Ok(Self(ptr)),
            _ => Err(CodecError::Init {
                what: "decoder",
                code: err,
            }),
        }
    }
}

impl Drop for Decoder {
    fn drop(&mut self) {
        // SAFETY: created by opus_decoder_create and destroyed exactly once.
        unsafe { ffi::opus_decoder_destroy(self.0.as_ptr()) }
    }
}

/// Mono libopus session tuned for generic audio at maximum complexity.
pub struct StandardOpus {
    encoder: Encoder,
    decoder: Decoder,
    params: CodecParams,
    compressed: Vec<u8>,
    lookahead: Option<u32>,
}

impl StandardOpus {
    /// Create encoder and decoder for `params`.
    pub fn new(params: CodecParams) -> Result<Self, CodecError> {
        let compressed = super::scratch_buffer(params.compressed_bound())?;
        let mut encoder = Encoder::new(params.sample_rate)?;
        encoder.set(
            ffi::OPUS_SET_BITRATE_REQUEST as c_int,
            params.bits_per_second(),
            "OPUS_SET_BITRATE",
        );
        encoder.set(
            ffi::OPUS_SET_COMPLEXITY_REQUEST as c_int,
            COMPLEXITY,
            "OPUS_SET_COMPLEXITY",
        );
        encoder.set(
            ffi::OPUS_SET_SIGNAL_REQUEST as c_int,
            ffi::OPUS_SIGNAL_MUSIC as ffi::opus_int32,
            "OPUS_SET_SIGNAL",
        );
        let decoder = Decoder::new(params.sample_rate)?;
        let lookahead = encoder.lookahead();
        debug!(?params, bound = compressed.len(), "standard opus session ready");
        Ok(Self {
            encoder,
            decoder,
            params,
            compressed,
            lookahead,
        })
    }
}

impl CodecTransform for StandardOpus {
    fn backend(&self) -> Backend {
        Backend::Standard
    }

    fn block_size(&self) -> usize {
        self.params.block_size
    }

    fn max_compressed_bytes(&self) -> usize {
        self.compressed.len()
    }

    fn lookahead(&self) -> Option<u32> {
        self.lookahead
    }

    fn process(&mut self, input: &[f32], output: &mut [f32]) -> Result<RoundTrip, CodecError> {
        let frame = self.params.block_size.min(input.len());
        // SAFETY: `input` holds at least `frame` samples and `compressed` is
        // exactly as long as the byte limit passed in.
        let encoded = unsafe {
            ffi::opus_encode_float(
                self.encoder.0.as_ptr(),
                input.as_ptr(),
                frame as c_int,
                self.compressed.as_mut_ptr(),
                self.compressed.len() as ffi::opus_int32,
            )
        };
        if encoded < 0 {
            return Err(CodecError::Encode(encoded));
        }
        // SAFETY: `encoded` bytes of `compressed` were just written and
        // `output` has room for `output.len()` samples.
        let decoded = unsafe {
            ffi::opus_decode_float(
                self.decoder.0.as_ptr(),
                self.compressed.as_ptr(),
                encoded,
                output.as_mut_ptr(),
                output.len() as c_int,
                0,
            )
        };
        if decoded < 0 {
            return Err(CodecError::Decode(decoded));
        }
        Ok(RoundTrip {
            encoded_bytes: encoded as usize,
            decoded_samples: decoded as usize,
        })
    }
}
