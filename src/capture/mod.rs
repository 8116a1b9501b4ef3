//! Camera input and frame handling.
//!
//! This module opens a camera for exactly one frame, releases it, and
//! writes the frame as a plaintext image file. It knows nothing about
//! encryption; the sealer picks the file up by path.

mod camera;
mod config;
mod frame;
#[cfg(feature = "camera")]
mod native;
mod source;

pub use camera::{Camera, CameraError, DeviceGuard, MockCamera};
pub use config::{CaptureConfig, ConfigError, FileConfig, OutputConfig, SealConfig, DEFAULT_KEY_ENV};
pub use frame::{Frame, PixelFormat};
#[cfg(feature = "camera")]
pub use native::NokhwaCamera;
pub use source::{CaptureError, CaptureOutcome, CaptureSource};
