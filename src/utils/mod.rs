//! Utility functions for frame processing
//!
//! - Grayscale conversion (RGBA to luminance, optional inversion)
//! - Memory pools (luma buffer reuse across ticks)

pub mod grayscale;
pub mod memory_pool;
