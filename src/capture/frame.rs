//! Frame type representing a captured image with metadata.

use chrono::{DateTime, Utc};
use image::{ColorType, ImageFormat};
use std::io::Cursor;
use std::path::Path;

use super::CaptureError;

/// Pixel layout of a frame's raw buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    /// 8-bit luminance.
    Gray8,
    /// 8-bit interleaved red, green, blue.
    Rgb8,
}

impl PixelFormat {
    /// Bytes used by a single pixel.
    #[inline]
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            PixelFormat::Gray8 => 1,
            PixelFormat::Rgb8 => 3,
        }
    }

    fn color_type(self) -> ColorType {
        match self {
            PixelFormat::Gray8 => ColorType::L8,
            PixelFormat::Rgb8 => ColorType::Rgb8,
        }
    }
}

/// A single captured frame from the camera.
///
/// Frames live only in memory. They are consumed by [`Frame::write_to`]
/// and dropped by the capture call that produced them.
#[derive(Clone)]
pub struct Frame {
    pixels: Vec<u8>,
    width: u32,
    height: u32,
    format: PixelFormat,
    captured_at: DateTime<Utc>,
}

impl Frame {
    /// Creates a new frame with the given parameters.
    pub fn new(pixels: Vec<u8>, width: u32, height: u32, format: PixelFormat) -> Self {
        Self {
            pixels,
            width,
            height,
            format,
            captured_at: Utc::now(),
        }
    }

    /// Returns a reference to the raw pixel data.
    #[inline]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Returns the frame width.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the frame height.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns the pixel encoding.
    #[inline]
    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /// Returns the capture timestamp.
    #[inline]
    pub fn captured_at(&self) -> DateTime<Utc> {
        self.captured_at
    }

    /// Expected buffer length for the frame's dimensions and format.
    #[inline]
    pub fn expected_len(&self) -> usize {
        (self.width as usize) * (self.height as usize) * self.format.bytes_per_pixel()
    }

    /// Validates that the pixel buffer size matches dimensions.
    pub fn is_valid(&self) -> bool {
        self.width > 0 && self.height > 0 && self.pixels.len() == self.expected_len()
    }

    /// Encodes the frame into the container named by the path's extension
    /// and writes it, replacing any existing file.
    pub fn write_to(&self, path: &Path) -> Result<(), CaptureError> {
        if !self.is_valid() {
            return Err(CaptureError::Encode(format!(
                "pixel buffer is {} bytes, expected {}",
                self.pixels.len(),
                self.expected_len()
            )));
        }

        let container =
            ImageFormat::from_path(path).map_err(|e| CaptureError::Encode(e.to_string()))?;

        // Encode fully in memory so an unsupported codec never touches the destination.
        let mut encoded = Cursor::new(Vec::new());
        image::write_buffer_with_format(
            &mut encoded,
            &self.pixels,
            self.width,
            self.height,
            self.format.color_type(),
            container,
        )
        .map_err(|e| CaptureError::Encode(e.to_string()))?;

        std::fs::write(path, encoded.into_inner()).map_err(|source| CaptureError::Write {
            path: path.to_path_buf(),
            source,
        })
    }
}

impl std::fmt::Debug for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Frame")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("format", &self.format)
            .field("captured_at", &self.captured_at)
            .field("pixel_bytes", &self.pixels.len())
            .finish()
    }
}
