//! Camera abstraction for frame capture.
//!
//! This module provides a trait-based abstraction over camera hardware,
//! allowing for both real camera input and mock implementations for testing.

use super::{CaptureConfig, Frame, PixelFormat};
use thiserror::Error;

/// Errors that can occur during camera operations.
#[derive(Debug, Error)]
pub enum CameraError {
    #[error("camera device unavailable: {0}")]
    DeviceUnavailable(String),
    #[error("no frame available: {0}")]
    FrameUnavailable(String),
    #[error("failed to configure camera: {0}")]
    ConfigFailed(String),
    #[error("camera not initialized")]
    NotInitialized,
}

/// Trait for camera implementations.
///
/// This abstraction allows swapping between real camera hardware
/// and mock implementations for testing.
pub trait Camera {
    /// Opens and initializes the camera with the given configuration.
    fn open(&mut self, config: &CaptureConfig) -> Result<(), CameraError>;

    /// Captures a single frame.
    fn capture(&mut self) -> Result<Frame, CameraError>;

    /// Checks if the camera is currently open.
    fn is_open(&self) -> bool;

    /// Closes the camera and releases resources. Must be safe to call
    /// on a camera that is not open.
    fn close(&mut self);
}

/// Exclusive, scoped ownership of an open camera.
///
/// The device is closed when the guard drops, whichever way the
/// owning scope is left.
pub struct DeviceGuard<'a, C: Camera + ?Sized> {
    camera: &'a mut C,
}

impl<'a, C: Camera + ?Sized> DeviceGuard<'a, C> {
    /// Opens `camera` and returns a guard that releases it on drop.
    pub fn open(camera: &'a mut C, config: &CaptureConfig) -> Result<Self, CameraError> {
        if let Err(e) = camera.open(config) {
            // A half-opened backend may still hold the device.
            camera.close();
            return Err(e);
        }
        Ok(Self { camera })
    }

    /// Reads one frame from the open device.
    pub fn capture(&mut self) -> Result<Frame, CameraError> {
        self.camera.capture()
    }
}

impl<C: Camera + ?Sized> Drop for DeviceGuard<'_, C> {
    fn drop(&mut self) {
        self.camera.close();
        tracing::debug!("camera device released");
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum MockBehavior {
    #[default]
    Frames,
    NoDevice,
    NoFrames,
}

/// Mock camera for testing that generates synthetic frames.
#[derive(Debug, Default)]
pub struct MockCamera {
    config: Option<CaptureConfig>,
    behavior: MockBehavior,
    open_count: u32,
    close_count: u32,
}

impl MockCamera {
    /// A camera that delivers a synthetic gradient on every capture.
    pub fn new() -> Self {
        Self::default()
    }

    /// A camera whose device can never be opened.
    pub fn unavailable() -> Self {
        Self {
            behavior: MockBehavior::NoDevice,
            ..Self::default()
        }
    }

    /// A camera that opens but never delivers a frame.
    pub fn without_frames() -> Self {
        Self {
            behavior: MockBehavior::NoFrames,
            ..Self::default()
        }
    }

    /// Number of successful opens.
    pub fn open_count(&self) -> u32 {
        self.open_count
    }

    /// Number of times an open device was released.
    pub fn close_count(&self) -> u32 {
        self.close_count
    }
}

impl Camera for MockCamera {
    fn open(&mut self, config: &CaptureConfig) -> Result<(), CameraError> {
        if self.behavior == MockBehavior::NoDevice {
            return Err(CameraError::DeviceUnavailable(format!(
                "no camera at index {}",
                config.device_id
            )));
        }
        config
            .validate()
            .map_err(|e| CameraError::ConfigFailed(e.to_string()))?;
        self.config = Some(config.clone());
        self.open_count += 1;
        tracing::info!("MockCamera opened with config: {:?}", config);
        Ok(())
    }

    fn capture(&mut self) -> Result<Frame, CameraError> {
        let config = self.config.as_ref().ok_or(CameraError::NotInitialized)?;

        if self.behavior == MockBehavior::NoFrames {
            return Err(CameraError::FrameUnavailable("device returned no data".into()));
        }

        let format = if config.grayscale {
            PixelFormat::Gray8
        } else {
            PixelFormat::Rgb8
        };
        let (width, height) = (config.width as usize, config.height as usize);
        let bpp = format.bytes_per_pixel();

        // Diagonal gradient, one value per channel
        let mut pixels = Vec::with_capacity(width * height * bpp);
        for y in 0..height {
            for x in 0..width {
                for channel in 0..bpp {
                    pixels.push(((x + y + channel * 85) % 256) as u8);
                }
            }
        }

        Ok(Frame::new(pixels, config.width, config.height, format))
    }

    fn is_open(&self) -> bool {
        self.config.is_some()
    }

    fn close(&mut self) {
        if self.config.take().is_some() {
            self.close_count += 1;
            tracing::info!("MockCamera closed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_camera_lifecycle() {
        let mut camera = MockCamera::new();
        let config = CaptureConfig::with_dimensions(32, 24);

        assert!(!camera.is_open());

        camera.open(&config).unwrap();
        assert!(camera.is_open());

        let frame = camera.capture().unwrap();
        assert!(frame.is_valid());
        assert_eq!(frame.format(), PixelFormat::Rgb8);

        camera.close();
        assert!(!camera.is_open());
        assert_eq!(camera.close_count(), 1);
    }

    #[test]
    fn test_grayscale_frames() {
        let mut camera = MockCamera::new();
        let config = CaptureConfig {
            grayscale: true,
            ..CaptureConfig::with_dimensions(10, 10)
        };
        camera.open(&config).unwrap();

        let frame = camera.capture().unwrap();
        assert_eq!(frame.format(), PixelFormat::Gray8);
        assert_eq!(frame.pixels().len(), 100);
    }

    #[test]
    fn test_capture_without_open() {
        let mut camera = MockCamera::new();
        assert!(matches!(
            camera.capture(),
            Err(CameraError::NotInitialized)
        ));
    }

    #[test]
    fn test_guard_releases_on_drop() {
        let mut camera = MockCamera::new();
        {
            let mut guard = DeviceGuard::open(&mut camera, &CaptureConfig::default()).unwrap();
            guard.capture().unwrap();
        }
        assert!(!camera.is_open());
        assert_eq!(camera.open_count(), 1);
        assert_eq!(camera.close_count(), 1);
    }

    #[test]
    fn test_guard_releases_after_failed_read() {
        let mut camera = MockCamera::without_frames();
        {
            let mut guard = DeviceGuard::open(&mut camera, &CaptureConfig::default()).unwrap();
            assert!(matches!(
                guard.capture(),
                Err(CameraError::FrameUnavailable(_))
            ));
        }
        assert!(!camera.is_open());
        assert_eq!(camera.close_count(), 1);
    }

    #[test]
    fn test_guard_not_created_when_device_missing() {
        let mut camera = MockCamera::unavailable();
        let result = DeviceGuard::open(&mut camera, &CaptureConfig::default());

        assert!(matches!(result, Err(CameraError::DeviceUnavailable(_))));
        drop(result);

        assert!(!camera.is_open());
        assert_eq!(camera.open_count(), 0);
    }

    #[test]
    fn test_invalid_config_rejected_on_open() {
        let mut camera = MockCamera::new();
        let config = CaptureConfig::with_dimensions(0, 10);

        assert!(matches!(
            camera.open(&config),
            Err(CameraError::ConfigFailed(_))
        ));
    }
}
