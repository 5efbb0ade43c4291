//! Per-frame QR decoding
//!
//! The scan loop treats the decoder as an opaque function with a fixed
//! contract: RGBA pixels in, at most one [`Symbol`] out. [`QrDecoder`] is
//! the bundled implementation; anything matching the [`Decoder`] trait
//! (including a closure) can stand in for it.

/// `rqrr`-backed decoder
pub mod qr_decoder;

pub use qr_decoder::QrDecoder;

use crate::models::Symbol;

/// Options passed with every decode call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DecodeOptions {
    /// Also try light-on-dark symbols when the normal polarity misses
    pub invert: bool,
}

impl DecodeOptions {
    /// Normal (dark-on-light) polarity only
    pub const DONT_INVERT: DecodeOptions = DecodeOptions { invert: false };
    /// Normal polarity, then inverted
    pub const ATTEMPT_BOTH: DecodeOptions = DecodeOptions { invert: true };
}

/// Inspect one RGBA frame and return the first symbol found
pub trait Decoder {
    /// `pixels` holds `width * height` packed RGBA pixels, row-major.
    /// Returns `None` when no symbol was found (or the input is malformed).
    fn decode(
        &mut self,
        pixels: &[u8],
        width: u32,
        height: u32,
        options: DecodeOptions,
    ) -> Option<Symbol>;
}

impl<F> Decoder for F
where
    F: FnMut(&[u8], u32, u32, DecodeOptions) -> Option<Symbol>,
{
    fn decode(
        &mut self,
        pixels: &[u8],
        width: u32,
        height: u32,
        options: DecodeOptions,
    ) -> Option<Symbol> {
        self(pixels, width, height, options)
    }
}
