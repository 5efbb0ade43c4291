use super::DecodedPayload;
use crate::error::AcquisitionError;
use std::fmt;

/// Published state of the scanner session
///
/// Data lives only in the variant it belongs to: a result exists only in
/// `Success`, an error detail only in `Error`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ScannerState {
    /// No session; waiting for a start intent
    #[default]
    Idle,
    /// Camera acquisition is in flight
    Requesting,
    /// Camera bound, frames are being decoded
    Scanning,
    /// A symbol was decoded
    Success(DecodedPayload),
    /// Camera acquisition failed
    Error(AcquisitionError),
}

/// Discriminant of [`ScannerState`] without its data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateKind {
    /// See [`ScannerState::Idle`]
    Idle,
    /// See [`ScannerState::Requesting`]
    Requesting,
    /// See [`ScannerState::Scanning`]
    Scanning,
    /// See [`ScannerState::Success`]
    Success,
    /// See [`ScannerState::Error`]
    Error,
}

impl ScannerState {
    /// Which state this is
    pub fn kind(&self) -> StateKind {
        match self {
            ScannerState::Idle => StateKind::Idle,
            ScannerState::Requesting => StateKind::Requesting,
            ScannerState::Scanning => StateKind::Scanning,
            ScannerState::Success(_) => StateKind::Success,
            ScannerState::Error(_) => StateKind::Error,
        }
    }

    /// Decoded payload, only in `Success`
    pub fn result(&self) -> Option<&DecodedPayload> {
        match self {
            ScannerState::Success(payload) => Some(payload),
            _ => None,
        }
    }

    /// Acquisition failure, only in `Error`
    pub fn error_detail(&self) -> Option<&AcquisitionError> {
        match self {
            ScannerState::Error(err) => Some(err),
            _ => None,
        }
    }

    /// Whether a session currently owns (or is acquiring) the camera
    pub fn is_active(&self) -> bool {
        matches!(self, ScannerState::Requesting | ScannerState::Scanning)
    }
}

impl fmt::Display for StateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StateKind::Idle => "idle",
            StateKind::Requesting => "requesting",
            StateKind::Scanning => "scanning",
            StateKind::Success => "success",
            StateKind::Error => "error",
        };
        f.write_str(name)
    }
}
