//! Image source adapter: file picker / drag-and-drop / camera → payload.
//!
//! # Pipeline
//!
//! ```text
//! file path ──┐
//! dropped file ┼─▶ ImagePayload ─▶ PreviewRegistry (preview://N)
//! camera frame ┘        │
//!                       └─▶ Scanner::submit
//! ```
//!
//! Non-image inputs produce no payload and are ignored without an error.

pub mod camera;
pub mod payload;
pub mod preview;

pub use camera::{
    CameraDevice, CameraError, CameraSession, DirectoryCamera, NoCamera, VideoStream,
};
pub use payload::{is_image_type, ImagePayload};
pub use preview::{PreviewRegistry, PreviewUrl};

use thiserror::Error;

/// Errors raised while turning a user-selected file into a payload.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
