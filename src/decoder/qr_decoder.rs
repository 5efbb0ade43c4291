use super::{DecodeOptions, Decoder};
use crate::config::{DEFAULT_PARALLEL_THRESHOLD, ScannerConfig};
use crate::models::frame::RGBA_CHANNELS;
use crate::models::{DecodedPayload, ECLevel, MaskPattern, Point, Symbol, Version};
use crate::utils::grayscale::{
    invert_in_place, rgba_to_grayscale_into, rgba_to_grayscale_parallel_into,
};
use crate::utils::memory_pool::BufferPool;
use tracing::{debug, trace};

/// QR decoder backed by `rqrr`
///
/// Converts each frame to luma in a pooled buffer, then returns the first
/// grid that decodes. Only one symbol per frame is reported.
pub struct QrDecoder {
    pool: BufferPool,
    parallel_threshold: usize,
}

impl QrDecoder {
    /// Create a decoder with default settings
    pub fn new() -> Self {
        Self {
            pool: BufferPool::new(),
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
        }
    }

    /// Decoder tuned by `config` (parallel luma threshold)
    pub fn from_config(config: &ScannerConfig) -> Self {
        Self::new().with_parallel_threshold(config.parallel_threshold)
    }

    /// Frames with at least `pixels` pixels convert to luma in parallel
    pub fn with_parallel_threshold(mut self, pixels: usize) -> Self {
        self.parallel_threshold = pixels;
        self
    }

    /// Luma buffer statistics
    pub fn pool(&self) -> &BufferPool {
        &self.pool
    }
}

impl Default for QrDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for QrDecoder {
    fn decode(
        &mut self,
        pixels: &[u8],
        width: u32,
        height: u32,
        options: DecodeOptions,
    ) -> Option<Symbol> {
        let (w, h) = (width as usize, height as usize);
        let pixel_count = w * h;
        if pixel_count == 0 || pixels.len() < pixel_count * RGBA_CHANNELS {
            debug!(width, height, len = pixels.len(), "rejecting malformed frame");
            return None;
        }

        let gray = self.pool.luma_buffer(pixel_count);
        if pixel_count >= self.parallel_threshold {
            rgba_to_grayscale_parallel_into(pixels, w, h, gray);
        } else {
            rgba_to_grayscale_into(pixels, w, h, gray);
        }

        if let Some(symbol) = decode_luma(gray, w, h) {
            return Some(symbol);
        }
        if !options.invert {
            return None;
        }

        trace!("normal polarity missed, retrying inverted");
        invert_in_place(gray);
        decode_luma(gray, w, h)
    }
}

fn decode_luma(gray: &[u8], width: usize, height: usize) -> Option<Symbol> {
    let mut prepared =
        rqrr::PreparedImage::prepare_from_greyscale(width, height, |x, y| gray[y * width + x]);
    let grids = prepared.detect_grids();
    trace!(grids = grids.len(), "grid candidates");

    for grid in grids {
        match grid.decode() {
            Ok((meta, content)) => {
                let corners = grid
                    .bounds
                    .map(|p| Point::new(p.x as f32, p.y as f32));
                return Some(Symbol {
                    payload: DecodedPayload::new(content),
                    version: u8::try_from(meta.version.0).ok().and_then(Version::new),
                    error_correction: Some(ECLevel::from_format_bits(meta.ecc_level as u8)),
                    mask: Some(MaskPattern::from_bits(meta.mask as u8)),
                    corners,
                });
            }
            Err(err) => {
                trace!(?err, "grid failed to decode");
            }
        }
    }

    None
}
