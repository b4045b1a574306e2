//! Normalised image payloads.
//!
//! Every input path (file picker, drag-and-drop, camera frame) ends up as an
//! [`ImagePayload`]: a name, a declared content type and the raw encoded
//! bytes.  Inputs whose declared type is not `image/*` are rejected by
//! returning `None`; the caller treats that as a silent no-op.

use std::path::Path;

use super::CaptureError;

/// One encoded image, owned by the recognition job that consumes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePayload {
    name: String,
    content_type: String,
    bytes: Vec<u8>,
}

impl ImagePayload {
    /// Build a payload from parts.  Returns `None` when `content_type` is not
    /// an image type.
    pub fn new(
        name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Option<Self> {
        let content_type = content_type.into();
        if !is_image_type(&content_type) {
            return None;
        }
        Some(Self {
            name: name.into(),
            content_type: content_type.trim().to_ascii_lowercase(),
            bytes,
        })
    }

    /// Read a file picked by the user.
    ///
    /// The content type is declared from the file extension.  A file that is
    /// not an image yields `Ok(None)` without reading its contents.
    ///
    /// # Errors
    ///
    /// [`CaptureError::Io`] when the file cannot be read.
    pub fn from_path(path: &Path) -> Result<Option<Self>, CaptureError> {
        let Some(content_type) = content_type_for_name(path) else {
            log::debug!("capture: ignoring non-image file {}", path.display());
            return Ok(None);
        };

        let bytes = std::fs::read(path).map_err(|source| CaptureError::Io {
            path: path.display().to_string(),
            source,
        })?;

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".into());

        Ok(Self::new(name, content_type, bytes))
    }

    /// Build a payload from a drag-and-drop event.
    ///
    /// `mime` is the type declared by the drop source.  When it is empty the
    /// type is inferred from `name`'s extension.
    pub fn from_dropped(name: &str, mime: Option<&str>, bytes: Vec<u8>) -> Option<Self> {
        let declared = mime
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(str::to_string)
            .or_else(|| content_type_for_name(Path::new(name)).map(str::to_string));

        match declared {
            Some(content_type) => Self::new(name, content_type, bytes),
            None => {
                log::debug!("capture: ignoring dropped file {name} with unknown type");
                None
            }
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Preferred file extension for staging the payload on disk.
    pub fn extension(&self) -> &'static str {
        image::ImageFormat::from_mime_type(&self.content_type)
            .and_then(|f| f.extensions_str().first().copied())
            .unwrap_or("img")
    }
}

/// `true` for `image/*` content types (case-insensitive).
pub fn is_image_type(content_type: &str) -> bool {
    content_type
        .trim()
        .to_ascii_lowercase()
        .starts_with("image/")
}

fn content_type_for_name(path: &Path) -> Option<&'static str> {
    image::ImageFormat::from_path(path)
        .ok()
        .map(|format| format.to_mime_type())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn image_type_detection_is_case_insensitive() {
        assert!(is_image_type("image/png"));
        assert!(is_image_type(" IMAGE/JPEG "));
        assert!(!is_image_type("application/pdf"));
        assert!(!is_image_type("text/plain"));
        assert!(!is_image_type(""));
    }

    #[test]
    fn new_rejects_non_image_type() {
        assert!(ImagePayload::new("a.pdf", "application/pdf", vec![1, 2, 3]).is_none());
    }

    #[test]
    fn from_path_reads_image_file() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("sample.jpg");
        std::fs::write(&path, b"not really a jpeg").expect("write");

        let payload = ImagePayload::from_path(&path)
            .expect("readable")
            .expect("jpg is an image");
        assert_eq!(payload.name(), "sample.jpg");
        assert_eq!(payload.content_type(), "image/jpeg");
        assert_eq!(payload.bytes(), b"not really a jpeg");
        assert_eq!(payload.extension(), "jpg");
    }

    #[test]
    fn from_path_ignores_non_image_file() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, b"hello").expect("write");

        assert!(ImagePayload::from_path(&path).expect("no io error").is_none());
    }

    #[test]
    fn from_path_missing_image_is_io_error() {
        let err = ImagePayload::from_path(Path::new("/nonexistent/scan.png")).unwrap_err();
        assert!(matches!(err, CaptureError::Io { .. }));
    }

    #[test]
    fn dropped_file_uses_declared_mime_first() {
        let payload = ImagePayload::from_dropped("scan.bin", Some("image/png"), vec![0]);
        assert_eq!(payload.map(|p| p.content_type().to_string()), Some("image/png".into()));

        let rejected = ImagePayload::from_dropped("scan.png", Some("application/zip"), vec![0]);
        assert!(rejected.is_none());
    }

    #[test]
    fn dropped_file_falls_back_to_extension() {
        let payload = ImagePayload::from_dropped("form.PNG", None, vec![0]).expect("png");
        assert_eq!(payload.content_type(), "image/png");

        assert!(ImagePayload::from_dropped("form.docx", Some(""), vec![0]).is_none());
    }
}
