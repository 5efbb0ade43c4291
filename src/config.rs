use crate::source::FacingMode;
use std::time::Duration;

/// Default scan pacing: one tick per display refresh at 60 Hz
pub const DEFAULT_TICKS_PER_SECOND: u32 = 60;

/// Frames at or above this many pixels convert to luma on the rayon pool
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 1280 * 720;

fn parse_env_u32(name: &str, default: u32) -> u32 {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse::<u32>().ok())
        .unwrap_or(default)
}

fn parse_env_usize(name: &str, default: usize) -> usize {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(default)
}

fn parse_env_facing(name: &str, default: FacingMode) -> FacingMode {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse::<FacingMode>().ok())
        .unwrap_or(default)
}

/// Scanner configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannerConfig {
    /// Camera to ask for when acquiring the stream
    pub facing_mode: FacingMode,
    /// Delay between scheduling a tick and running it
    pub frame_interval: Duration,
    /// Pixel count at which luma conversion goes parallel
    pub parallel_threshold: usize,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            facing_mode: FacingMode::Environment,
            frame_interval: interval_for_rate(DEFAULT_TICKS_PER_SECOND),
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
        }
    }
}

impl ScannerConfig {
    /// Defaults overridden by `QR_SCAN_FACING_MODE`, `QR_SCAN_FPS` and
    /// `QR_SCAN_PARALLEL_PIXELS`. Unparsable values keep the default.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let fps = parse_env_u32("QR_SCAN_FPS", DEFAULT_TICKS_PER_SECOND).clamp(1, 240);
        Self {
            facing_mode: parse_env_facing("QR_SCAN_FACING_MODE", defaults.facing_mode),
            frame_interval: interval_for_rate(fps),
            parallel_threshold: parse_env_usize(
                "QR_SCAN_PARALLEL_PIXELS",
                defaults.parallel_threshold,
            ),
        }
    }

    /// Set the tick rate (clamped to 1..=240 per second)
    pub fn with_ticks_per_second(mut self, fps: u32) -> Self {
        self.frame_interval = interval_for_rate(fps.clamp(1, 240));
        self
    }

    /// Set the requested camera
    pub fn with_facing_mode(mut self, facing_mode: FacingMode) -> Self {
        self.facing_mode = facing_mode;
        self
    }
}

fn interval_for_rate(fps: u32) -> Duration {
    Duration::from_secs_f64(1.0 / fps.max(1) as f64)
}
