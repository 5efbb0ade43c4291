//! Frame Source: camera acquisition and the owned stream handle
//!
//! A [`Camera`] resolves a request into a [`VideoStream`]. The stream is
//! wrapped in a [`FrameHandle`] as soon as it exists, so every track it
//! opened is stopped on release, on drop, and on every early-exit path.

pub mod synthetic;

use crate::error::AcquisitionError;
use crate::models::PixelBuffer;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::str::FromStr;
use tracing::debug;

/// Which camera to prefer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FacingMode {
    /// Rear camera, pointing away from the user
    #[default]
    Environment,
    /// Front camera, pointing at the user
    User,
}

impl FromStr for FacingMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "environment" | "rear" | "back" => Ok(FacingMode::Environment),
            "user" | "front" => Ok(FacingMode::User),
            other => Err(format!("unknown facing mode: {other}")),
        }
    }
}

impl fmt::Display for FacingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FacingMode::Environment => f.write_str("environment"),
            FacingMode::User => f.write_str("user"),
        }
    }
}

/// Constraints passed with an acquisition request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Constraints {
    /// Preferred camera
    pub facing_mode: FacingMode,
}

/// A live video stream obtained from a [`Camera`]
pub trait VideoStream: Send {
    /// Whether enough data is buffered to read a full frame
    fn is_ready(&self) -> bool;

    /// Native width and height of the current frame
    fn native_size(&self) -> (u32, u32);

    /// Copy the current frame into `surface`, already sized to [`native_size`](Self::native_size)
    fn copy_frame(&mut self, surface: &mut PixelBuffer);

    /// Stop every track opened for this stream
    fn stop(&mut self);
}

impl<S: VideoStream + ?Sized> VideoStream for Box<S> {
    fn is_ready(&self) -> bool {
        (**self).is_ready()
    }

    fn native_size(&self) -> (u32, u32) {
        (**self).native_size()
    }

    fn copy_frame(&mut self, surface: &mut PixelBuffer) {
        (**self).copy_frame(surface)
    }

    fn stop(&mut self) {
        (**self).stop()
    }
}

/// Future resolving a camera request
pub type AcquireFuture<S> = Pin<Box<dyn Future<Output = Result<S, AcquisitionError>> + Send>>;

/// Camera acquisition API
pub trait Camera: Send + Sync + 'static {
    /// Stream type produced on success
    type Stream: VideoStream + 'static;

    /// Request a stream. The future may suspend (permission prompt, device warm-up).
    fn request(&self, constraints: Constraints) -> AcquireFuture<Self::Stream>;
}

/// Exclusive owner of an acquired stream
///
/// Release stops the stream and detaches it. Releasing twice is a no-op,
/// and dropping an unreleased handle releases it.
pub struct FrameHandle<S: VideoStream> {
    stream: Option<S>,
}

impl<S: VideoStream> FrameHandle<S> {
    /// Take ownership of a freshly acquired stream
    pub fn new(stream: S) -> Self {
        Self {
            stream: Some(stream),
        }
    }

    /// The bound stream, if not yet released
    pub fn stream_mut(&mut self) -> Option<&mut S> {
        self.stream.as_mut()
    }

    /// Whether the stream is still held
    pub fn is_held(&self) -> bool {
        self.stream.is_some()
    }

    /// Stop all tracks and detach the stream.
    ///
    /// Returns true if this call released it, false if it was already released.
    pub fn release(&mut self) -> bool {
        match self.stream.take() {
            Some(mut stream) => {
                stream.stop();
                debug!("camera stream released");
                true
            }
            None => false,
        }
    }
}

impl<S: VideoStream> Drop for FrameHandle<S> {
    fn drop(&mut self) {
        self.release();
    }
}

impl<S: VideoStream> fmt::Debug for FrameHandle<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameHandle")
            .field("held", &self.is_held())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::synthetic::SyntheticStream;

    #[test]
    fn test_facing_mode_parse() {
        assert_eq!("environment".parse::<FacingMode>(), Ok(FacingMode::Environment));
        assert_eq!("USER".parse::<FacingMode>(), Ok(FacingMode::User));
        assert!("sideways".parse::<FacingMode>().is_err());
        assert_eq!(FacingMode::User.to_string(), "user");
    }

    #[test]
    fn test_release_is_idempotent() {
        let (stream, probe) = SyntheticStream::blank(8, 8);
        let mut handle = FrameHandle::new(stream);
        assert!(handle.is_held());

        assert!(handle.release());
        assert!(!handle.release());
        assert!(!handle.is_held());
        assert!(handle.stream_mut().is_none());
        assert_eq!(probe.stop_calls(), 1);

        drop(handle);
        assert_eq!(probe.stop_calls(), 1);
    }

    #[test]
    fn test_drop_releases() {
        let (stream, probe) = SyntheticStream::blank(8, 8);
        {
            let _handle = FrameHandle::new(stream);
            assert!(!probe.is_stopped());
        }
        assert!(probe.is_stopped());
        assert_eq!(probe.stop_calls(), 1);
    }
}
