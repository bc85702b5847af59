//! opus-custom backend: CELT-only coding at arbitrary power-of-two block sizes.
//!
//! Needs a libopus built with `--enable-custom-modes`; the symbols come from
//! the same library `audiopus_sys` links.

use super::{Backend, CodecError, CodecParams, CodecTransform, RoundTrip, COMPLEXITY};
use audiopus_sys as ffi;
use std::os::raw::{c_int, c_uchar};
use std::ptr::NonNull;
use tracing::{debug, warn};

const OK: c_int = ffi::OPUS_OK as c_int;

#[repr(C)]
struct OpusCustomMode {
    _private: [u8; 0],
}

#[repr(C)]
struct OpusCustomEncoder {
    _private: [u8; 0],
}

#[repr(C)]
struct OpusCustomDecoder {
    _private: [u8; 0],
}

extern "C" {
    fn opus_custom_mode_create(fs: i32, frame_size: c_int, error: *mut c_int) -> *mut OpusCustomMode;
    fn opus_custom_mode_destroy(mode: *mut OpusCustomMode);
    fn opus_custom_encoder_create(
        mode: *const OpusCustomMode,
        channels: c_int,
        error: *mut c_int,
    ) -> *mut OpusCustomEncoder;
    fn opus_custom_encoder_destroy(st: *mut OpusCustomEncoder);
    fn opus_custom_encoder_ctl(st: *mut OpusCustomEncoder, request: c_int, ...) -> c_int;
    fn opus_custom_encode_float(
        st: *mut OpusCustomEncoder,
        pcm: *const f32,
        frame_size: c_int,
        compressed: *mut c_uchar,
        max_data_bytes: c_int,
    ) -> c_int;
    fn opus_custom_decoder_create(
        mode: *const OpusCustomMode,
        channels: c_int,
        error: *mut c_int,
    ) -> *mut OpusCustomDecoder;
    fn opus_custom_decoder_destroy(st: *mut OpusCustomDecoder);
    fn opus_custom_decode_float(
        st: *mut OpusCustomDecoder,
        data: *const c_uchar,
        len: c_int,
        pcm: *mut f32,
        frame_size: c_int,
    ) -> c_int;
}

struct Mode(NonNull<OpusCustomMode>);

impl Drop for Mode {
    fn drop(&mut self) {
        // SAFETY: created by opus_custom_mode_create; every coder using it
        // is dropped first (field order of `CustomOpus`).
        unsafe { opus_custom_mode_destroy(self.0.as_ptr()) }
    }
}

struct Encoder(NonNull<OpusCustomEncoder>);

impl Encoder {
    fn set(&mut self, request: c_int, value: i32, name: &str) {
        // SAFETY: SET requests take a single opus_int32 argument.
        let ret = unsafe { opus_custom_encoder_ctl(self.0.as_ptr(), request, value) };
        if ret != OK {
            warn!(code = ret, "{} failed", name);
        }
    }

    fn lookahead(&mut self) -> Option<u32> {
        let mut value: i32 = 0;
        // SAFETY: GET_LOOKAHEAD writes one opus_int32 through the pointer.
        let ret = unsafe {
            opus_custom_encoder_ctl(
                self.0.as_ptr(),
                ffi::OPUS_GET_LOOKAHEAD_REQUEST as c_int,
                &mut value as *mut i32,
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
        // SAFETY: created by opus_custom_encoder_create, destroyed once.
        unsafe { opus_custom_encoder_destroy(self.0.as_ptr()) }
    }
}

struct Decoder(NonNull<OpusCustomDecoder>);

impl Drop for Decoder {
    fn drop(&mut self) {
        // SAFETY: created by opus_custom_decoder_create, destroyed once.
        unsafe { opus_custom_decoder_destroy(self.0.as_ptr()) }
    }
}

/// Mono opus-custom session. Owns the mode shared by its coders.
pub struct CustomOpus {
    // Field order is drop order: coders before the mode they reference.
    encoder: Encoder,
    decoder: Decoder,
    _mode: Mode,
    params: CodecParams,
    compressed: Vec<u8>,
    lookahead: Option<u32>,
}

impl CustomOpus {
    /// Create mode, encoder and decoder for `params`.
    pub fn new(params: CodecParams) -> Result<Self, CodecError> {
        if !Backend::Custom.accepts_block_size(params.block_size) {
            return Err(CodecError::BlockSize {
                backend: Backend::Custom,
                size: params.block_size,
            });
        }
        let compressed = super::scratch_buffer(params.compressed_bound())?;

        let mut err: c_int = OK;
        // SAFETY: `err` is a valid out-pointer for each create call below.
        let mode = unsafe {
            opus_custom_mode_create(params.sample_rate as i32, params.block_size as c_int, &mut err)
        };
        let mode = match NonNull::new(mode) {
            Some(ptr) if err == OK => Mode(ptr),
            _ => return Err(CodecError::Init { what: "mode", code: err }),
        };

        let encoder = unsafe { opus_custom_encoder_create(mode.0.as_ptr(), 1, &mut err) };
        let mut encoder = match NonNull::new(encoder) {
            Some(ptr) if err == OK => Encoder(ptr),
            _ => return Err(CodecError::Init { what: "encoder", code: err }),
        };
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
            ffi::OPUS_SIGNAL_MUSIC as i32,
            "OPUS_SET_SIGNAL",
        );

        let decoder = unsafe { opus_custom_decoder_create(mode.0.as_ptr(), 1, &mut err) };
        let decoder = match NonNull::new(decoder) {
            Some(ptr) if err == OK => Decoder(ptr),
            _ => return Err(CodecError::Init { what: "decoder", code: err }),
        };

        let lookahead = encoder.lookahead();
        debug!(?params, bound = compressed.len(), "opus-custom session ready");
        Ok(Self {
            encoder,
            decoder,
            _mode: mode,
            params,
            compressed,
            lookahead,
        })
    }
}

impl CodecTransform for CustomOpus {
    fn backend(&self) -> Backend {
        Backend::Custom
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
        let frame = self.params.block_size.min(input.len()).min(output.len());
        // SAFETY: `input` holds at least `frame` samples and `compressed` is
        // exactly as long as the byte limit passed in.
        let encoded = unsafe {
            opus_custom_encode_float(
                self.encoder.0.as_ptr(),
                input.as_ptr(),
                frame as c_int,
                self.compressed.as_mut_ptr(),
                self.compressed.len() as c_int,
            )
        };
        if encoded < 0 {
            return Err(CodecError::Encode(encoded));
        }
        // SAFETY: the custom decoder writes at most `frame` samples.
        let decoded = unsafe {
            opus_custom_decode_float(
                self.decoder.0.as_ptr(),
                self.compressed.as_ptr(),
                encoded,
                output.as_mut_ptr(),
                frame as c_int,
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
