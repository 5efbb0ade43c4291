//! In-memory camera for tests, benches and frame replay
//!
//! Frames are plain `RgbaImage`s. The stream can report "not ready" for a
//! number of polls after opening, and the last frame is held once the
//! sequence runs out, like a camera pointed at a still scene. A shared
//! [`StreamProbe`] records what happened to every stream the camera opened.

use super::{AcquireFuture, Camera, Constraints, VideoStream};
use crate::error::AcquisitionError;
use crate::models::PixelBuffer;
use image::{GenericImageView, Rgba, RgbaImage};
use std::cell::Cell;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Default)]
struct ProbeCounters {
    requests: AtomicUsize,
    streams_opened: AtomicUsize,
    stop_calls: AtomicUsize,
    frames_copied: AtomicUsize,
    last_constraints: Mutex<Option<Constraints>>,
}

/// Shared view of what a synthetic camera and its streams did
#[derive(Debug, Clone, Default)]
pub struct StreamProbe {
    counters: Arc<ProbeCounters>,
}

impl StreamProbe {
    /// Acquisition requests received
    pub fn requests(&self) -> usize {
        self.counters.requests.load(Ordering::SeqCst)
    }

    /// Streams handed out
    pub fn streams_opened(&self) -> usize {
        self.counters.streams_opened.load(Ordering::SeqCst)
    }

    /// Total `stop()` calls across all streams
    pub fn stop_calls(&self) -> usize {
        self.counters.stop_calls.load(Ordering::SeqCst)
    }

    /// Whether at least one stream was stopped
    pub fn is_stopped(&self) -> bool {
        self.stop_calls() > 0
    }

    /// Streams opened but never stopped
    pub fn live_streams(&self) -> usize {
        self.streams_opened().saturating_sub(self.stop_calls())
    }

    /// Frames copied into a capture surface
    pub fn frames_copied(&self) -> usize {
        self.counters.frames_copied.load(Ordering::SeqCst)
    }

    /// Constraints of the most recent request
    pub fn last_constraints(&self) -> Option<Constraints> {
        self.counters
            .last_constraints
            .lock()
            .ok()
            .and_then(|guard| *guard)
    }
}

/// Stream over a fixed sequence of frames
pub struct SyntheticStream {
    frames: Vec<RgbaImage>,
    cursor: usize,
    warmup: usize,
    polls: Cell<usize>,
    stopped: bool,
    probe: StreamProbe,
}

impl SyntheticStream {
    /// Stream over `frames`, with a fresh probe
    pub fn new(frames: Vec<RgbaImage>) -> (Self, StreamProbe) {
        let probe = StreamProbe::default();
        (Self::with_probe(frames, probe.clone()), probe)
    }

    /// Single white frame of the given size
    pub fn blank(width: u32, height: u32) -> (Self, StreamProbe) {
        Self::new(vec![RgbaImage::from_pixel(width, height, Rgba([255, 255, 255, 255]))])
    }

    fn with_probe(frames: Vec<RgbaImage>, probe: StreamProbe) -> Self {
        probe.counters.streams_opened.fetch_add(1, Ordering::SeqCst);
        Self {
            frames,
            cursor: 0,
            warmup: 0,
            polls: Cell::new(0),
            stopped: false,
            probe,
        }
    }

    /// Report "not ready" for the first `polls` readiness checks
    pub fn with_warmup(mut self, polls: usize) -> Self {
        self.warmup = polls;
        self
    }

    fn current(&self) -> Option<&RgbaImage> {
        self.frames.get(self.cursor)
    }
}

impl VideoStream for SyntheticStream {
    fn is_ready(&self) -> bool {
        if self.stopped || self.frames.is_empty() {
            return false;
        }
        let polls = self.polls.get();
        if polls < self.warmup {
            self.polls.set(polls + 1);
            return false;
        }
        true
    }

    fn native_size(&self) -> (u32, u32) {
        self.current().map(|f| f.dimensions()).unwrap_or((0, 0))
    }

    fn copy_frame(&mut self, surface: &mut PixelBuffer) {
        let Some(frame) = self.current() else {
            return;
        };
        if surface.copy_from_image(frame) {
            self.probe
                .counters
                .frames_copied
                .fetch_add(1, Ordering::SeqCst);
        }
        if self.cursor + 1 < self.frames.len() {
            self.cursor += 1;
        }
    }

    fn stop(&mut self) {
        self.stopped = true;
        self.probe.counters.stop_calls.fetch_add(1, Ordering::SeqCst);
    }
}

/// Camera with a scripted acquisition outcome
#[derive(Debug, Clone)]
pub struct SyntheticCamera {
    script: Result<Vec<RgbaImage>, AcquisitionError>,
    warmup: usize,
    latency: Duration,
    probe: StreamProbe,
}

impl SyntheticCamera {
    /// Camera that grants access and plays `frames`
    pub fn with_frames(frames: Vec<RgbaImage>) -> Self {
        Self {
            script: Ok(frames),
            warmup: 0,
            latency: Duration::ZERO,
            probe: StreamProbe::default(),
        }
    }

    /// Camera whose every request fails with `err`
    pub fn failing(err: AcquisitionError) -> Self {
        Self {
            script: Err(err),
            warmup: 0,
            latency: Duration::ZERO,
            probe: StreamProbe::default(),
        }
    }

    /// Streams report "not ready" for their first `polls` checks
    pub fn with_warmup(mut self, polls: usize) -> Self {
        self.warmup = polls;
        self
    }

    /// Delay before a request resolves (uses the tokio clock)
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Probe shared by this camera and every stream it opens
    pub fn probe(&self) -> StreamProbe {
        self.probe.clone()
    }
}

impl Camera for SyntheticCamera {
    type Stream = SyntheticStream;

    fn request(&self, constraints: Constraints) -> AcquireFuture<SyntheticStream> {
        self.probe.counters.requests.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut last) = self.probe.counters.last_constraints.lock() {
            *last = Some(constraints);
        }

        let script = self.script.clone();
        let warmup = self.warmup;
        let latency = self.latency;
        let probe = self.probe.clone();
        Box::pin(async move {
            if !latency.is_zero() {
                tokio::time::sleep(latency).await;
            }
            let frames = script?;
            Ok(SyntheticStream::with_probe(frames, probe).with_warmup(warmup))
        })
    }
}

/// Render a square module grid (row-major, `true` = dark) as a frame.
///
/// Each module becomes `scale` x `scale` pixels, surrounded by a light
/// quiet zone of `quiet_zone` modules.
pub fn render_modules(modules: &[bool], side: usize, scale: u32, quiet_zone: u32) -> RgbaImage {
    let dim = (side as u32 + 2 * quiet_zone) * scale;
    RgbaImage::from_fn(dim, dim, |x, y| {
        let mx = (x / scale) as i64 - quiet_zone as i64;
        let my = (y / scale) as i64 - quiet_zone as i64;
        let in_symbol = (0..side as i64).contains(&mx) && (0..side as i64).contains(&my);
        let dark = in_symbol && modules[my as usize * side + mx as usize];
        if dark {
            Rgba([0, 0, 0, 255])
        } else {
            Rgba([255, 255, 255, 255])
        }
    })
}

/// Load an image file as a frame, downscaling so neither side exceeds `max_dim`
pub fn load_frame<P: AsRef<Path>>(path: P, max_dim: Option<u32>) -> Result<RgbaImage, image::ImageError> {
    let img = image::open(path)?;
    let (w, h) = img.dimensions();
    match max_dim {
        Some(max_dim) if w.max(h) > max_dim => Ok(img
            .resize(max_dim, max_dim, image::imageops::FilterType::Triangle)
            .to_rgba8()),
        _ => Ok(img.to_rgba8()),
    }
}
