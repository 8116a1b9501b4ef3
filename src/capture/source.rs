//! Single-shot capture to a plaintext image file.

use super::{Camera, CameraError, CaptureConfig, DeviceGuard};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Fatal capture failures. A camera that opens but yields no frame is
/// not an error; see [`CaptureOutcome::NoFrame`].
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("camera unavailable: {0}")]
    DeviceUnavailable(String),
    #[error("invalid capture configuration: {0}")]
    InvalidConfig(String),
    #[error("failed to encode frame: {0}")]
    Encode(String),
    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Result of a capture attempt that got as far as opening the device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureOutcome {
    /// A frame was captured and written to this path.
    Saved(PathBuf),
    /// The device opened but delivered no frame.
    NoFrame,
}

impl CaptureOutcome {
    /// True when an image file was produced.
    pub fn is_success(&self) -> bool {
        matches!(self, CaptureOutcome::Saved(_))
    }

    /// Path of the written image, if any.
    pub fn path(&self) -> Option<&Path> {
        match self {
            CaptureOutcome::Saved(path) => Some(path),
            CaptureOutcome::NoFrame => None,
        }
    }
}

/// Acquires one frame per call and materializes it as an image file.
///
/// The camera is opened and released inside every call; no handle is
/// carried between calls.
pub struct CaptureSource<C: Camera> {
    camera: C,
    config: CaptureConfig,
}

impl<C: Camera> CaptureSource<C> {
    pub fn new(camera: C, config: CaptureConfig) -> Self {
        Self { camera, config }
    }

    /// Returns the underlying camera.
    pub fn camera(&self) -> &C {
        &self.camera
    }

    /// Returns the capture configuration.
    pub fn config(&self) -> &CaptureConfig {
        &self.config
    }

    /// Captures one frame and writes it to `destination`, replacing any
    /// existing file. The container format follows the extension.
    ///
    /// The device is released before the frame is encoded. A missing
    /// frame is reported as [`CaptureOutcome::NoFrame`] without retrying.
    pub fn capture(&mut self, destination: impl AsRef<Path>) -> Result<CaptureOutcome, CaptureError> {
        let destination = destination.as_ref();

        let frame = {
            let mut device = DeviceGuard::open(&mut self.camera, &self.config).map_err(|e| match e {
                CameraError::DeviceUnavailable(msg) => CaptureError::DeviceUnavailable(msg),
                CameraError::ConfigFailed(msg) => CaptureError::InvalidConfig(msg),
                other => CaptureError::DeviceUnavailable(other.to_string()),
            })?;

            match device.capture() {
                Ok(frame) => frame,
                Err(e) => {
                    tracing::warn!(error = %e, "camera delivered no frame");
                    return Ok(CaptureOutcome::NoFrame);
                }
            }
        };

        frame.write_to(destination)?;

        tracing::info!(
            path = %destination.display(),
            width = frame.width(),
            height = frame.height(),
            "photo captured"
        );

        Ok(CaptureOutcome::Saved(destination.to_path_buf()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::MockCamera;

    fn small_config() -> CaptureConfig {
        CaptureConfig::with_dimensions(16, 12)
    }

    #[test]
    fn test_capture_writes_image() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("photo.jpg");
        let mut source = CaptureSource::new(MockCamera::new(), small_config());

        let outcome = source.capture(&path).unwrap();

        assert!(outcome.is_success());
        assert_eq!(outcome.path(), Some(path.as_path()));
        let decoded = image::open(&path).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (16, 12));
        assert!(!source.camera().is_open());
        assert_eq!(source.camera().close_count(), 1);
    }

    #[test]
    fn test_each_capture_reopens_device() {
        let dir = tempfile::tempdir().unwrap();
        let mut source = CaptureSource::new(MockCamera::new(), small_config());

        source.capture(dir.path().join("a.png")).unwrap();
        source.capture(dir.path().join("b.png")).unwrap();

        assert_eq!(source.camera().open_count(), 2);
        assert_eq!(source.camera().close_count(), 2);
    }

    #[test]
    fn test_no_frame_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("photo.jpg");
        let mut source = CaptureSource::new(MockCamera::without_frames(), small_config());

        let outcome = source.capture(&path).unwrap();

        assert_eq!(outcome, CaptureOutcome::NoFrame);
        assert!(!outcome.is_success());
        assert!(!path.exists());
        assert!(!source.camera().is_open());
        assert_eq!(source.camera().close_count(), 1);
    }

    #[test]
    fn test_missing_device_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("photo.jpg");
        let mut source = CaptureSource::new(MockCamera::unavailable(), small_config());

        let result = source.capture(&path);

        assert!(matches!(result, Err(CaptureError::DeviceUnavailable(_))));
        assert!(!path.exists());
    }

    #[test]
    fn test_bad_config_is_not_a_missing_device() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("photo.jpg");
        let config = CaptureConfig {
            fps: 0,
            ..small_config()
        };
        let mut source = CaptureSource::new(MockCamera::new(), config);

        let result = source.capture(&path);

        assert!(matches!(result, Err(CaptureError::InvalidConfig(_))));
        assert!(!path.exists());
        assert!(!source.camera().is_open());
    }

    #[test]
    fn test_disabled_codec_leaves_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("photo.gif");
        let mut source = CaptureSource::new(MockCamera::new(), small_config());

        let result = source.capture(&path);

        assert!(matches!(result, Err(CaptureError::Encode(_))));
        assert!(!path.exists());
    }

    #[test]
    fn test_unwritable_destination() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing-dir").join("photo.png");
        let mut source = CaptureSource::new(MockCamera::new(), small_config());

        let result = source.capture(&path);

        assert!(matches!(result, Err(CaptureError::Write { .. })));
        assert!(!source.camera().is_open());
    }
}
