//! Hardware camera backed by `nokhwa`.

use super::{Camera, CameraError, CaptureConfig, Frame, PixelFormat};
use nokhwa::pixel_format::RgbFormat;
use nokhwa::utils::{
    CameraFormat, CameraIndex, FrameFormat, RequestedFormat, RequestedFormatType, Resolution,
};

/// A platform camera opened through the native backend.
///
/// Frames are decoded to RGB; grayscale configurations are converted
/// after decoding.
#[derive(Default)]
pub struct NokhwaCamera {
    device: Option<nokhwa::Camera>,
    grayscale: bool,
}

impl NokhwaCamera {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Camera for NokhwaCamera {
    fn open(&mut self, config: &CaptureConfig) -> Result<(), CameraError> {
        config
            .validate()
            .map_err(|e| CameraError::ConfigFailed(e.to_string()))?;

        let format = CameraFormat::new(
            Resolution::new(config.width, config.height),
            FrameFormat::MJPEG,
            config.fps,
        );
        let requested = RequestedFormat::new::<RgbFormat>(RequestedFormatType::Closest(format));

        let mut device = nokhwa::Camera::new(CameraIndex::Index(config.device_id), requested)
            .map_err(|e| CameraError::DeviceUnavailable(e.to_string()))?;
        device
            .open_stream()
            .map_err(|e| CameraError::DeviceUnavailable(e.to_string()))?;

        tracing::info!(
            device_id = config.device_id,
            format = ?device.camera_format(),
            "camera stream opened"
        );

        self.device = Some(device);
        self.grayscale = config.grayscale;
        Ok(())
    }

    fn capture(&mut self) -> Result<Frame, CameraError> {
        let device = self.device.as_mut().ok_or(CameraError::NotInitialized)?;

        let buffer = device
            .frame()
            .map_err(|e| CameraError::FrameUnavailable(e.to_string()))?;
        let decoded = buffer
            .decode_image::<RgbFormat>()
            .map_err(|e| CameraError::FrameUnavailable(e.to_string()))?;

        let (width, height) = (decoded.width(), decoded.height());
        let rgb = decoded.into_raw();

        if self.grayscale {
            Ok(Frame::new(to_luma(&rgb), width, height, PixelFormat::Gray8))
        } else {
            Ok(Frame::new(rgb, width, height, PixelFormat::Rgb8))
        }
    }

    fn is_open(&self) -> bool {
        self.device.is_some()
    }

    fn close(&mut self) {
        if let Some(mut device) = self.device.take() {
            if let Err(e) = device.stop_stream() {
                tracing::warn!(error = %e, "failed to stop camera stream");
            }
            tracing::info!("camera stream closed");
        }
    }
}

impl Drop for NokhwaCamera {
    fn drop(&mut self) {
        self.close();
    }
}

/// ITU-R BT.601 luma in integer arithmetic.
fn to_luma(rgb: &[u8]) -> Vec<u8> {
    rgb.chunks_exact(3)
        .map(|px| {
            let y = 299 * px[0] as u32 + 587 * px[1] as u32 + 114 * px[2] as u32;
            (y / 1000) as u8
        })
        .collect()
}
