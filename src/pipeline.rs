//! Capture Pipeline: one video frame in, one decode outcome out
//!
//! Each call sizes the capture surface from the frame's native dimensions
//! (cameras re-negotiate resolution mid-stream), copies the frame, and runs
//! the decoder exactly once in normal polarity.
//!
//! Known limitation: the decoder is never asked to try inverted polarity,
//! so light-on-dark QR codes are not found. That keeps per-frame cost down.

use crate::decoder::{DecodeOptions, Decoder};
use crate::models::{DecodedPayload, PixelBuffer};
use crate::source::VideoStream;
use tracing::{debug, trace};

/// Options used for every live decode
pub const LIVE_DECODE_OPTIONS: DecodeOptions = DecodeOptions::DONT_INVERT;

/// Result of one capture attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeOutcome {
    /// The stream has not buffered a full frame yet; nothing was inspected
    NotReady,
    /// A full frame was inspected and held no symbol
    NoCode,
    /// A symbol was decoded
    Found(DecodedPayload),
}

/// Counters for one pipeline's lifetime
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CaptureStats {
    /// Attempts that found the stream not ready
    pub not_ready: usize,
    /// Frames copied into the surface
    pub frames_captured: usize,
    /// Decoder invocations
    pub decode_calls: usize,
    /// Times the surface allocation had to grow
    pub surface_growths: usize,
}

/// Copies frames into an RGBA surface and hands them to a [`Decoder`]
pub struct CapturePipeline<D> {
    decoder: D,
    surface: PixelBuffer,
    stats: CaptureStats,
}

impl<D: Decoder> CapturePipeline<D> {
    /// Create a pipeline around `decoder`
    pub fn new(decoder: D) -> Self {
        Self {
            decoder,
            surface: PixelBuffer::new(),
            stats: CaptureStats::default(),
        }
    }

    /// Capture the current frame of `source` and decode it
    pub fn capture_and_decode<S>(&mut self, source: &mut S) -> DecodeOutcome
    where
        S: VideoStream + ?Sized,
    {
        if !source.is_ready() {
            self.stats.not_ready += 1;
            trace!("frame not ready");
            return DecodeOutcome::NotReady;
        }

        let (width, height) = source.native_size();
        if width == 0 || height == 0 {
            self.stats.not_ready += 1;
            trace!("frame has no dimensions yet");
            return DecodeOutcome::NotReady;
        }

        if self.surface.resize(width, height) {
            self.stats.surface_growths += 1;
            debug!(width, height, "capture surface grown");
        }
        source.copy_frame(&mut self.surface);
        self.stats.frames_captured += 1;

        self.stats.decode_calls += 1;
        match self
            .decoder
            .decode(self.surface.as_rgba(), width, height, LIVE_DECODE_OPTIONS)
        {
            Some(symbol) => {
                debug!(width, height, "symbol decoded");
                DecodeOutcome::Found(symbol.payload)
            }
            None => DecodeOutcome::NoCode,
        }
    }

    /// Lifetime counters
    pub fn stats(&self) -> CaptureStats {
        self.stats
    }

    /// The most recently captured frame
    pub fn surface(&self) -> &PixelBuffer {
        &self.surface
    }

    /// The wrapped decoder
    pub fn decoder(&self) -> &D {
        &self.decoder
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Symbol;
    use crate::source::synthetic::SyntheticStream;
    use image::RgbaImage;

    #[test]
    fn test_not_ready_skips_decoder() {
        let mut calls = 0;
        let mut pipeline = CapturePipeline::new(
            |_: &[u8], _: u32, _: u32, _: DecodeOptions| -> Option<Symbol> {
                calls += 1;
                None
            },
        );
        let (stream, _probe) = SyntheticStream::blank(8, 8);
        let mut stream = stream.with_warmup(1);

        assert_eq!(pipeline.capture_and_decode(&mut stream), DecodeOutcome::NotReady);
        assert_eq!(pipeline.capture_and_decode(&mut stream), DecodeOutcome::NoCode);
        let stats = pipeline.stats();
        drop(pipeline);
        assert_eq!(calls, 1);
        assert_eq!(stats.not_ready, 1);
        assert_eq!(stats.decode_calls, 1);
    }

    #[test]
    fn test_dimensions_follow_each_frame() {
        let mut seen = Vec::new();
        let frames = vec![RgbaImage::new(4, 3), RgbaImage::new(10, 6)];
        let (mut stream, probe) = SyntheticStream::new(frames);
        let mut pipeline = CapturePipeline::new(
            |pixels: &[u8], w: u32, h: u32, _: DecodeOptions| -> Option<Symbol> {
                seen.push((w, h, pixels.len()));
                None
            },
        );

        pipeline.capture_and_decode(&mut stream);
        pipeline.capture_and_decode(&mut stream);
        drop(pipeline);

        assert_eq!(seen, vec![(4, 3, 4 * 3 * 4), (10, 6, 10 * 6 * 4)]);
        assert_eq!(probe.frames_copied(), 2);
    }

    #[test]
    fn test_live_decode_never_inverts() {
        let mut pipeline = CapturePipeline::new(
            |_: &[u8], _: u32, _: u32, opts: DecodeOptions| -> Option<Symbol> {
                assert!(!opts.invert);
                Some(Symbol::from_payload("ok"))
            },
        );
        let (mut stream, _probe) = SyntheticStream::blank(4, 4);
        assert_eq!(
            pipeline.capture_and_decode(&mut stream),
            DecodeOutcome::Found(DecodedPayload::from("ok"))
        );
    }

    #[test]
    fn test_zero_sized_frame_is_not_ready() {
        let mut pipeline = CapturePipeline::new(
            |_: &[u8], _: u32, _: u32, _: DecodeOptions| -> Option<Symbol> {
                panic!("decoder must not run on an empty frame")
            },
        );
        let (mut stream, _probe) = SyntheticStream::new(vec![RgbaImage::new(0, 0)]);
        assert_eq!(pipeline.capture_and_decode(&mut stream), DecodeOutcome::NotReady);
    }
}
