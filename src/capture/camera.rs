//! Camera path of the image source adapter.
//!
//! [`CameraDevice`] hands out [`VideoStream`]s; [`CameraSession`] owns at most
//! one stream at a time and is the only thing allowed to release it.  A
//! stream must be stopped (all tracks) before a new one is acquired.
//!
//! The shipped device is [`DirectoryCamera`]: it treats the newest image in a
//! frame directory as the live video frame, which is what tethering and
//! capture tools produce.  [`NoCamera`] stands in when nothing is configured.

use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::codecs::jpeg::JpegEncoder;
use image::DynamicImage;
use thiserror::Error;

use super::ImagePayload;

/// File name given to every captured frame.
pub const CAPTURE_FILE_NAME: &str = "camera-capture.jpg";

// ---------------------------------------------------------------------------
// CameraError
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum CameraError {
    #[error("camera permission denied: {0}")]
    PermissionDenied(String),

    #[error("no camera device available")]
    NoDevice,

    #[error("camera is not active")]
    NotActive,

    #[error("no frame available yet")]
    NoFrame,

    #[error("failed to read camera frame: {0}")]
    Frame(String),

    #[error("failed to encode captured frame: {0}")]
    Encode(String),
}

// ---------------------------------------------------------------------------
// Device / stream traits
// ---------------------------------------------------------------------------

/// A live video stream made of one or more tracks.
pub trait VideoStream: Send {
    /// Decode the frame currently being shown.
    fn current_frame(&mut self) -> Result<DynamicImage, CameraError>;

    /// Stop every track.  Idempotent.
    fn stop_all_tracks(&mut self);

    /// Number of tracks that have not been stopped.
    fn live_tracks(&self) -> usize;
}

/// Something that can open a rear-facing [`VideoStream`] for document
/// capture.
pub trait CameraDevice: Send + Sync {
    fn open(&self) -> Result<Box<dyn VideoStream>, CameraError>;
}

// ---------------------------------------------------------------------------
// CameraSession
// ---------------------------------------------------------------------------

/// Owns the active camera stream, if any.
pub struct CameraSession {
    device: Arc<dyn CameraDevice>,
    stream: Option<Box<dyn VideoStream>>,
    jpeg_quality: u8,
}

impl CameraSession {
    pub fn new(device: Arc<dyn CameraDevice>, jpeg_quality: u8) -> Self {
        Self {
            device,
            stream: None,
            jpeg_quality: jpeg_quality.clamp(1, 100),
        }
    }

    /// Acquire a rear-facing stream, releasing any previous one first.
    ///
    /// On failure the session stays inactive.
    pub fn start(&mut self) -> Result<(), CameraError> {
        self.stop();
        let stream = self.device.open()?;
        log::info!("camera: stream started ({} track(s))", stream.live_tracks());
        self.stream = Some(stream);
        Ok(())
    }

    /// Grab the current frame and encode it as a JPEG payload.
    pub fn capture(&mut self) -> Result<ImagePayload, CameraError> {
        let stream = self.stream.as_mut().ok_or(CameraError::NotActive)?;
        let frame = stream.current_frame()?;
        let bytes = encode_jpeg(&frame, self.jpeg_quality)?;
        ImagePayload::new(CAPTURE_FILE_NAME, "image/jpeg", bytes)
            .ok_or_else(|| CameraError::Encode("encoder produced a non-image payload".into()))
    }

    /// Stop every track and drop the stream.
    pub fn stop(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            stream.stop_all_tracks();
            log::info!("camera: stream stopped");
        }
    }

    pub fn is_active(&self) -> bool {
        self.stream.is_some()
    }

    /// Live tracks held by this session (0 when inactive).
    pub fn active_tracks(&self) -> usize {
        self.stream.as_ref().map_or(0, |s| s.live_tracks())
    }
}

impl Drop for CameraSession {
    fn drop(&mut self) {
        self.stop();
    }
}

fn encode_jpeg(frame: &DynamicImage, quality: u8) -> Result<Vec<u8>, CameraError> {
    let rgb = frame.to_rgb8();
    let mut buf = Cursor::new(Vec::new());
    JpegEncoder::new_with_quality(&mut buf, quality)
        .encode_image(&rgb)
        .map_err(|e| CameraError::Encode(e.to_string()))?;
    Ok(buf.into_inner())
}

// ---------------------------------------------------------------------------
// NoCamera
// ---------------------------------------------------------------------------

/// Device used when no camera is configured.
pub struct NoCamera;

impl CameraDevice for NoCamera {
    fn open(&self) -> Result<Box<dyn VideoStream>, CameraError> {
        Err(CameraError::NoDevice)
    }
}

// ---------------------------------------------------------------------------
// DirectoryCamera
// ---------------------------------------------------------------------------

/// Camera backed by a directory of frames written by a capture tool.
#[derive(Debug, Clone)]
pub struct DirectoryCamera {
    dir: PathBuf,
}

impl DirectoryCamera {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl CameraDevice for DirectoryCamera {
    fn open(&self) -> Result<Box<dyn VideoStream>, CameraError> {
        match std::fs::read_dir(&self.dir) {
            Ok(_) => {}
            Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
                return Err(CameraError::PermissionDenied(self.dir.display().to_string()));
            }
            Err(_) => return Err(CameraError::NoDevice),
        }
        log::debug!("camera: opening {}", self.dir.display());
        Ok(Box::new(DirectoryStream {
            dir: self.dir.clone(),
            live: true,
        }))
    }
}

struct DirectoryStream {
    dir: PathBuf,
    live: bool,
}

impl VideoStream for DirectoryStream {
    fn current_frame(&mut self) -> Result<DynamicImage, CameraError> {
        if !self.live {
            return Err(CameraError::NotActive);
        }
        let newest = newest_image(&self.dir)?.ok_or(CameraError::NoFrame)?;
        image::open(&newest).map_err(|e| CameraError::Frame(format!("{}: {e}", newest.display())))
    }

    fn stop_all_tracks(&mut self) {
        self.live = false;
    }

    fn live_tracks(&self) -> usize {
        usize::from(self.live)
    }
}

fn newest_image(dir: &Path) -> Result<Option<PathBuf>, CameraError> {
    let entries = std::fs::read_dir(dir).map_err(|e| CameraError::Frame(e.to_string()))?;

    let newest = entries
        .filter_map(Result::ok)
        .filter(|entry| image::ImageFormat::from_path(entry.path()).is_ok())
        .filter_map(|entry| {
            let modified = entry.metadata().ok()?.modified().ok()?;
            Some((modified, entry.path()))
        })
        .max_by_key(|(modified, _)| *modified)
        .map(|(_, path)| path);

    Ok(newest)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
