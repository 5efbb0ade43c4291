//! RGBA to luminance conversion for captured frames
//!
//! Y = 0.299*R + 0.587*G + 0.114*B, computed with integer arithmetic:
//! Y = (76*R + 150*G + 29*B) >> 8. Alpha is ignored.

use rayon::prelude::*;

/// Coefficients for grayscale conversion: Y = (76*R + 150*G + 29*B) >> 8
const COEF_R: u32 = 76;
const COEF_G: u32 = 150;
const COEF_B: u32 = 29;

#[inline]
fn luma(px: &[u8]) -> u8 {
    let lum = (COEF_R * px[0] as u32 + COEF_G * px[1] as u32 + COEF_B * px[2] as u32) >> 8;
    lum.min(255) as u8
}

/// Convert an RGBA frame into a freshly allocated luma buffer
pub fn rgba_to_grayscale(rgba: &[u8], width: usize, height: usize) -> Vec<u8> {
    let mut gray = vec![0u8; width * height];
    rgba_to_grayscale_into(rgba, width, height, &mut gray);
    gray
}

/// Convert RGBA into a pre-allocated buffer (no allocation)
///
/// # Returns
/// Number of pixels written (width * height)
///
/// # Panics
/// If `output` holds fewer than `width * height` bytes or `rgba` fewer
/// than `width * height * 4`.
pub fn rgba_to_grayscale_into(
    rgba: &[u8],
    width: usize,
    height: usize,
    output: &mut [u8],
) -> usize {
    let pixel_count = width * height;
    assert!(output.len() >= pixel_count, "Output buffer too small");
    assert!(rgba.len() >= pixel_count * 4, "Input buffer too small");

    for (out, px) in output[..pixel_count]
        .iter_mut()
        .zip(rgba.chunks_exact(4))
    {
        *out = luma(px);
    }

    pixel_count
}

/// Convert RGBA into a pre-allocated buffer, one row per rayon task
///
/// # Panics
/// Same buffer-size preconditions as [`rgba_to_grayscale_into`].
pub fn rgba_to_grayscale_parallel_into(
    rgba: &[u8],
    width: usize,
    height: usize,
    output: &mut [u8],
) -> usize {
    let pixel_count = width * height;
    assert!(output.len() >= pixel_count, "Output buffer too small");
    assert!(rgba.len() >= pixel_count * 4, "Input buffer too small");
    if width == 0 {
        return 0;
    }

    output[..pixel_count]
        .par_chunks_mut(width)
        .zip(rgba[..pixel_count * 4].par_chunks(width * 4))
        .for_each(|(row, src)| {
            for (out, px) in row.iter_mut().zip(src.chunks_exact(4)) {
                *out = luma(px);
            }
        });

    pixel_count
}

/// Flip polarity in place (dark-on-light becomes light-on-dark)
pub fn invert_in_place(gray: &mut [u8]) {
    for v in gray.iter_mut() {
        *v = 255 - *v;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgba_to_grayscale() {
        // Pure white
        let gray = rgba_to_grayscale(&[255, 255, 255, 255], 1, 1);
        assert!(gray[0] >= 254);

        // Pure black, alpha ignored
        let gray = rgba_to_grayscale(&[0, 0, 0, 17], 1, 1);
        assert_eq!(gray[0], 0);

        // Pure red
        let gray = rgba_to_grayscale(&[255, 0, 0, 255], 1, 1);
        assert!(gray[0] > 0 && gray[0] < 255);

        // Pure green is brighter than pure blue
        let green = rgba_to_grayscale(&[0, 255, 0, 255], 1, 1)[0];
        let blue = rgba_to_grayscale(&[0, 0, 255, 255], 1, 1)[0];
        assert!(green > 100);
        assert!(green > blue);
    }

    #[test]
    fn test_parallel_matches_scalar() {
        let (w, h) = (37, 23);
        let rgba: Vec<u8> = (0..w * h * 4).map(|i| (i * 31 % 256) as u8).collect();

        let scalar = rgba_to_grayscale(&rgba, w, h);
        let mut parallel = vec![0u8; w * h];
        assert_eq!(rgba_to_grayscale_parallel_into(&rgba, w, h, &mut parallel), w * h);
        assert_eq!(scalar, parallel);
    }

    #[test]
    fn test_into_leaves_tail_untouched() {
        let rgba = vec![255u8; 2 * 2 * 4];
        let mut out = vec![7u8; 6];
        assert_eq!(rgba_to_grayscale_into(&rgba, 2, 2, &mut out), 4);
        assert_eq!(&out[4..], &[7, 7]);
    }

    #[test]
    fn test_invert() {
        let mut gray = vec![0, 100, 255];
        invert_in_place(&mut gray);
        assert_eq!(gray, vec![255, 155, 0]);
    }

    #[test]
    #[should_panic(expected = "Output buffer too small")]
    fn test_short_output_panics() {
        let rgba = vec![0u8; 4 * 4 * 4];
        let mut out = vec![0u8; 3];
        rgba_to_grayscale_into(&rgba, 4, 4, &mut out);
    }

    #[test]
    #[should_panic(expected = "Input buffer too small")]
    fn test_parallel_short_input_panics() {
        let rgba = vec![0u8; 10];
        let mut out = vec![0u8; 16];
        rgba_to_grayscale_parallel_into(&rgba, 4, 4, &mut out);
    }
}
