//! Application settings structs, defaults and TOML persistence.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`
//! so they can be round-tripped through TOML files and shared across threads.
//!
//! Secrets are never part of this file: [`GeneratorConfig::api_key_env`]
//! only names the environment variable the key is read from at runtime.

use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::AppPaths;

// ---------------------------------------------------------------------------
// EngineChoice
// ---------------------------------------------------------------------------

/// Selects the text-recognition back-end.
///
/// | Variant         | tesseract `--oem` | Notes                          |
/// |-----------------|-------------------|--------------------------------|
/// | Tesseract       | 3                 | whatever the install defaults to |
/// | TesseractLstm   | 1                 | neural line recogniser only    |
/// | TesseractLegacy | 0                 | pattern engine, needs legacy traineddata |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineChoice {
    Tesseract,
    TesseractLstm,
    TesseractLegacy,
}

impl EngineChoice {
    /// All selectable back-ends, in display order.
    pub const ALL: [EngineChoice; 3] = [
        EngineChoice::Tesseract,
        EngineChoice::TesseractLstm,
        EngineChoice::TesseractLegacy,
    ];

    /// Label shown in the engine picker.
    pub fn label(&self) -> &'static str {
        match self {
            EngineChoice::Tesseract => "Tesseract (default)",
            EngineChoice::TesseractLstm => "Tesseract LSTM",
            EngineChoice::TesseractLegacy => "Tesseract legacy",
        }
    }
}

impl Default for EngineChoice {
    fn default() -> Self {
        Self::Tesseract
    }
}

// ---------------------------------------------------------------------------
// OcrConfig
// ---------------------------------------------------------------------------

/// Settings for the recognition invoker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OcrConfig {
    /// Which back-end handles recognition.
    pub engine: EngineChoice,
    /// Ordered language identifiers (tesseract traineddata names).  The
    /// first entry is the primary language.
    pub languages: Vec<String>,
    /// Path or command name of the `tesseract` binary.
    pub tesseract_path: String,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            engine: EngineChoice::default(),
            languages: vec!["eng".into(), "hin".into()],
            tesseract_path: "tesseract".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// CameraConfig
// ---------------------------------------------------------------------------

/// Settings for the camera path of the image source adapter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraConfig {
    /// Directory a capture device writes frames into.  `None` means no
    /// camera is available.
    pub frame_dir: Option<PathBuf>,
    /// JPEG quality (1 – 100) used when encoding a captured frame.
    pub jpeg_quality: u8,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            frame_dir: None,
            jpeg_quality: 90,
        }
    }
}

// ---------------------------------------------------------------------------
// GeneratorConfig
// ---------------------------------------------------------------------------

/// Settings for the survey question generator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Base URL of the OpenAI-compatible endpoint.
    pub base_url: String,
    /// Model identifier sent to the API.
    pub model: String,
    /// Name of the environment variable holding the API key.
    pub api_key_env: String,
    /// Sampling temperature (0.0 – 2.0).
    pub temperature: f32,
    /// Maximum seconds to wait for a response before timing out.
    pub timeout_secs: u64,
    /// Upper bound on generated tokens.
    pub max_tokens: u32,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com".into(),
            model: "gpt-4o-mini".into(),
            api_key_env: "OPENAI_API_KEY".into(),
            temperature: 0.7,
            timeout_secs: 30,
            max_tokens: 2048,
        }
    }
}

impl GeneratorConfig {
    /// Read the API key from the configured environment variable.
    ///
    /// Returns `None` when the variable is unset or empty.
    pub fn resolve_api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
    }
}

// ---------------------------------------------------------------------------
// ExportConfig
// ---------------------------------------------------------------------------

/// Where downloads are written.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Export directory; `None` uses [`AppPaths::exports_dir`].
    pub dir: Option<PathBuf>,
}

impl ExportConfig {
    /// The directory downloads should land in.
    pub fn resolve_dir(&self) -> PathBuf {
        self.dir
            .clone()
            .unwrap_or_else(|| AppPaths::new().exports_dir)
    }
}

// ---------------------------------------------------------------------------
// UiConfig
// ---------------------------------------------------------------------------

/// Who is looking at the scanner widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViewerRole {
    /// Field agent scanning forms.
    Agent,
    /// Admin reviewing agent uploads.
    Admin,
}

impl Default for ViewerRole {
    fn default() -> Self {
        Self::Agent
    }
}

/// Dashboard window settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    pub role: ViewerRole,
    /// Initial window size `(width, height)` in logical pixels.
    pub window_size: (f32, f32),
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            role: ViewerRole::default(),
            window_size: (1100.0, 760.0),
        }
    }
}

// ---------------------------------------------------------------------------
// AppConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level application configuration, serialised as `settings.toml`.
///
/// ```rust,no_run
/// use fieldscan::config::AppConfig;
///
/// // Load (returns Default when file is missing)
/// let config = AppConfig::load().unwrap();
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub ocr: OcrConfig,
    pub camera: CameraConfig,
    pub generator: GeneratorConfig,
    pub export: ExportConfig,
    pub ui: UiConfig,
}

impl AppConfig {
    /// Load configuration from the platform-appropriate `settings.toml`.
    ///
    /// Returns `Ok(AppConfig::default())` when the file does not exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&AppPaths::new().settings_file)
    }

    /// Load from an explicit path.
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to the platform-appropriate `settings.toml`,
    /// creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&AppPaths::new().settings_file)
    }

    /// Save to an explicit path.
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn round_trip_toml() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("settings.toml");

        let original = AppConfig::default();
        original.save_to(&path).expect("save");

        let loaded = AppConfig::load_from(&path).expect("load");

        assert_eq!(original.ocr.engine, loaded.ocr.engine);
        assert_eq!(original.ocr.languages, loaded.ocr.languages);
        assert_eq!(original.ocr.tesseract_path, loaded.ocr.tesseract_path);
        assert_eq!(original.camera.frame_dir, loaded.camera.frame_dir);
        assert_eq!(original.camera.jpeg_quality, loaded.camera.jpeg_quality);
        assert_eq!(original.generator.base_url, loaded.generator.base_url);
        assert_eq!(original.generator.model, loaded.generator.model);
        assert_eq!(original.generator.api_key_env, loaded.generator.api_key_env);
        assert_eq!(original.generator.timeout_secs, loaded.generator.timeout_secs);
        assert_eq!(original.ui.role, loaded.ui.role);
    }

    #[test]
    fn load_missing_returns_default() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("nonexistent.toml");

        let config = AppConfig::load_from(&path).expect("should not error");

        assert_eq!(config.ocr.engine, EngineChoice::Tesseract);
        assert_eq!(config.generator.model, "gpt-4o-mini");
    }

    #[test]
    fn default_values() {
        let cfg = AppConfig::default();

        assert_eq!(cfg.ocr.languages, vec!["eng".to_string(), "hin".to_string()]);
        assert_eq!(cfg.ocr.tesseract_path, "tesseract");
        assert!(cfg.camera.frame_dir.is_none());
        assert_eq!(cfg.generator.base_url, "https://api.openai.com");
        assert_eq!(cfg.generator.api_key_env, "OPENAI_API_KEY");
        assert_eq!(cfg.generator.timeout_secs, 30);
        assert_eq!(cfg.ui.role, ViewerRole::Agent);
    }

    #[test]
    fn round_trip_modified_values() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("modified.toml");

        let mut cfg = AppConfig::default();
        cfg.ocr.engine = EngineChoice::TesseractLstm;
        cfg.ocr.languages = vec!["hin".into()];
        cfg.camera.frame_dir = Some(PathBuf::from("/tmp/frames"));
        cfg.generator.base_url = "http://localhost:11434".into();
        cfg.generator.model = "qwen2.5:3b".into();
        cfg.export.dir = Some(PathBuf::from("/tmp/exports"));
        cfg.ui.role = ViewerRole::Admin;

        cfg.save_to(&path).expect("save");
        let loaded = AppConfig::load_from(&path).expect("load");

        assert_eq!(loaded.ocr.engine, EngineChoice::TesseractLstm);
        assert_eq!(loaded.ocr.languages, vec!["hin".to_string()]);
        assert_eq!(loaded.camera.frame_dir, Some(PathBuf::from("/tmp/frames")));
        assert_eq!(loaded.generator.base_url, "http://localhost:11434");
        assert_eq!(loaded.generator.model, "qwen2.5:3b");
        assert_eq!(loaded.export.resolve_dir(), PathBuf::from("/tmp/exports"));
        assert_eq!(loaded.ui.role, ViewerRole::Admin);
    }

    #[test]
    fn saved_file_contains_no_api_key_value() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("settings.toml");
        AppConfig::default().save_to(&path).expect("save");

        let content = std::fs::read_to_string(&path).expect("read");
        assert!(content.contains("api_key_env"));
        assert!(!content.contains("sk-"));
    }

    #[test]
    fn resolve_api_key_ignores_unset_variable() {
        let cfg = GeneratorConfig {
            api_key_env: "FIELDSCAN_TEST_KEY_THAT_IS_NEVER_SET".into(),
            ..GeneratorConfig::default()
        };
        assert!(cfg.resolve_api_key().is_none());
    }
}
