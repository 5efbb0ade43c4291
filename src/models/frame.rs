use image::RgbaImage;

/// Bytes per RGBA pixel
pub const RGBA_CHANNELS: usize = 4;

/// RGBA capture surface that a video frame is copied into
///
/// Dimensions follow the source frame on every capture; the backing
/// allocation is kept and only grows.
#[derive(Debug, Default)]
pub struct PixelBuffer {
    data: Vec<u8>,
    width: u32,
    height: u32,
}

impl PixelBuffer {
    /// Create an empty surface
    pub fn new() -> Self {
        Self::default()
    }

    /// Resize the surface to `width` x `height`.
    ///
    /// Returns true when the backing allocation had to grow.
    pub fn resize(&mut self, width: u32, height: u32) -> bool {
        let len = width as usize * height as usize * RGBA_CHANNELS;
        let grew = len > self.data.capacity();
        self.data.resize(len, 0);
        self.width = width;
        self.height = height;
        grew
    }

    /// Surface width in pixels
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Surface height in pixels
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Packed RGBA bytes, row-major
    pub fn as_rgba(&self) -> &[u8] {
        &self.data
    }

    /// Mutable packed RGBA bytes, row-major
    pub fn as_rgba_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Copy an image of the same size into the surface.
    ///
    /// Returns false (leaving the surface untouched) on a size mismatch.
    pub fn copy_from_image(&mut self, image: &RgbaImage) -> bool {
        if image.width() != self.width || image.height() != self.height {
            return false;
        }
        self.data.copy_from_slice(image.as_raw());
        true
    }

    /// Snapshot the surface as an owned image
    pub fn to_image(&self) -> Option<RgbaImage> {
        RgbaImage::from_raw(self.width, self.height, self.data.clone())
    }
}
