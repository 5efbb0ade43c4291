//! qr_scan - live camera QR code scanning
//!
//! Acquires a camera stream, captures one frame per display refresh,
//! decodes it and reports the first QR payload found. The pieces, leaves
//! first:
//!
//! - [`source`]: camera acquisition and the owned stream handle
//! - [`decoder`]: RGBA frame to decoded symbol (`rqrr` backed)
//! - [`pipeline`]: copies the current frame into a surface and decodes it
//! - [`controller`]: the session state machine
//! - [`service`]: tokio host wiring intents, camera requests and tick pacing
//!
//! # Example
//! ```no_run
//! use qr_scan::source::synthetic::SyntheticCamera;
//! use qr_scan::{QrDecoder, ScanService, ScannerConfig, StateKind};
//!
//! # async fn run() -> Result<(), qr_scan::ServiceError> {
//! let camera = SyntheticCamera::with_frames(Vec::new());
//! let (scanner, _task) = ScanService::spawn(camera, QrDecoder::new(), &ScannerConfig::default());
//! scanner.start()?;
//! let state = scanner.wait_for(StateKind::Success).await?;
//! println!("{}", state.result().map(|p| p.as_str()).unwrap_or_default());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![allow(clippy::missing_docs_in_private_items)]

/// Scanner configuration (pacing, camera preference)
pub mod config;
/// Scan Controller state machine
pub mod controller;
/// Per-frame QR decoding
pub mod decoder;
/// Acquisition and service errors
pub mod error;
/// Core data structures (state, payload, symbol, pixel buffer)
pub mod models;
/// Capture Pipeline
pub mod pipeline;
/// Single-slot tick scheduling
pub mod scheduler;
/// Async host for the controller
pub mod service;
/// Frame Source: cameras and video streams
pub mod source;
/// Utility functions (grayscale, buffer pooling)
pub mod utils;

pub use config::ScannerConfig;
pub use controller::{AcquisitionTicket, ScanController, StateLog, StateObserver};
pub use decoder::{DecodeOptions, Decoder, QrDecoder};
pub use error::{AcquisitionError, ServiceError};
pub use models::{DecodedPayload, PixelBuffer, ScannerState, StateKind, Symbol};
pub use pipeline::{CapturePipeline, CaptureStats, DecodeOutcome};
pub use scheduler::{PendingTick, TickSlot};
pub use service::{Intent, ScanService, ScannerHandle};
pub use source::{Camera, Constraints, FacingMode, FrameHandle, VideoStream};
