//! Photoseal Library
//!
//! Captures a single still image from a camera and seals it to disk with
//! AES-256-CBC, so the persisted file cannot be read without the key.
//!
//! # Architecture
//!
//! The system runs two steps in sequence, coupled only by a file path:
//!
//! ```text
//! capture (camera → photo.jpg) → seal (photo.jpg → photo.jpg.enc)
//! ```
//!
//! # Design Principles
//!
//! - **Scoped devices**: the camera is opened for one frame and released on every exit path
//! - **Typed keys**: a key is exactly 32 raw bytes, never a passphrase
//! - **Fresh IVs**: every seal draws a new IV from the OS RNG
//! - **No partial artifacts**: output is encrypted in memory and renamed into place
//! - **Confidentiality only**: artifacts carry no authentication tag
//!
//! # Example
//!
//! ```no_run
//! use photoseal::{
//!     capture::{CaptureConfig, CaptureSource, MockCamera},
//!     pipeline::Pipeline,
//!     seal::SealKey,
//! };
//!
//! let key = SealKey::from_env_var("PHOTOSEAL_KEY").unwrap();
//! let source = CaptureSource::new(MockCamera::new(), CaptureConfig::default());
//! let mut pipeline = Pipeline::new(source);
//!
//! let artifact = pipeline.run_with_key("photo.jpg", &key).unwrap();
//! println!("sealed to {}", artifact.display());
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod capture;
pub mod pipeline;
pub mod seal;

// Re-export commonly used types at crate root
pub use capture::{Camera, CaptureConfig, CaptureOutcome, CaptureSource, Frame, MockCamera};
pub use pipeline::{Pipeline, PipelineError, PlaintextPolicy};
pub use seal::{SealError, SealKey, Sealer};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
