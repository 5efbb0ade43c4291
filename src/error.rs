//! Error types for camera acquisition and the async scanner service
//!
//! Decode misses are not errors: a frame without a symbol is a normal
//! "keep scanning" outcome and is reported through [`crate::DecodeOutcome`].

use thiserror::Error;

/// Why the camera could not be acquired for a session.
///
/// Every variant is terminal for the current session (state becomes
/// `Error`) and recoverable only through an explicit retry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AcquisitionError {
    /// The user declined camera access
    #[error("camera permission denied")]
    PermissionDenied,
    /// No capture device is present
    #[error("no capture device found")]
    DeviceNotFound,
    /// Any other failure (device busy, unsupported constraints, ...)
    #[error("camera acquisition failed: {0}")]
    AcquisitionFailed(String),
}

impl AcquisitionError {
    /// Wrap an arbitrary backend failure
    pub fn failed(reason: impl Into<String>) -> Self {
        AcquisitionError::AcquisitionFailed(reason.into())
    }

    /// Message shown to the user for this cause
    pub fn user_message(&self) -> &'static str {
        match self {
            AcquisitionError::PermissionDenied => {
                "Camera access denied. Please allow camera access to scan QR codes."
            }
            AcquisitionError::DeviceNotFound => "No camera found on your device.",
            AcquisitionError::AcquisitionFailed(_) => {
                "An error occurred while accessing the camera."
            }
        }
    }

    /// Whether the user can do something about it before retrying
    pub fn is_actionable(&self) -> bool {
        !matches!(self, AcquisitionError::DeviceNotFound)
    }
}

/// Errors from [`crate::service::ScannerHandle`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ServiceError {
    /// The service task has stopped and no longer accepts intents
    #[error("scanner service has shut down")]
    Closed,
}
