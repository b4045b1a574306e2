//! Application entry point for the fieldscan dashboard.
//!
//! # Startup sequence
//!
//! 1. Initialise logging.
//! 2. Load [`AppConfig`] from disk (returns default on first run).
//! 3. Create [`tokio`] runtime (multi-thread, 2 workers).
//! 4. Build the engine factory, language set and camera from config.
//! 5. Create the scanner and survey channels.
//! 6. Spawn the scanner and the question generator on the tokio runtime.
//! 7. Run [`eframe::run_native`], which blocks the main thread until the
//!    window is closed.

use std::sync::Arc;

use tokio::sync::mpsc;
use fieldscan::{
    app::FieldscanApp,
    capture::{CameraDevice, CameraSession, DirectoryCamera, NoCamera},
    config::AppConfig,
    ledger::new_shared_ledger,
    ocr::{build_engine, LanguageSet},
    pipeline::{new_shared_previews, EngineFactory, Scanner, ScannerCommand, ScannerEvent},
    survey::{run_generator, ApiGenerator, QuestionGenerator, SurveyCommand, SurveyEvent},
};

use eframe::egui;

// ---------------------------------------------------------------------------
// Native options builder
// ---------------------------------------------------------------------------

fn native_options(config: &AppConfig) -> eframe::NativeOptions {
    let (width, height) = config.ui.window_size;
    let vp = egui::ViewportBuilder::default()
        .with_title("fieldscan")
        .with_inner_size([width, height])
        .with_min_inner_size([720.0, 480.0])
        .with_drag_and_drop(true);

    eframe::NativeOptions {
        viewport: vp,
        ..Default::default()
    }
}

// ---------------------------------------------------------------------------
// main
// ---------------------------------------------------------------------------

fn main() -> eframe::Result<()> {
    // 1. Logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("fieldscan starting up");

    // 2. Configuration
    let config = AppConfig::load().unwrap_or_else(|e| {
        log::warn!("Failed to load config ({e}); using defaults");
        AppConfig::default()
    });

    // 3. Tokio runtime (2 worker threads; recognition runs on the blocking pool)
    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .expect("failed to create tokio runtime");

    // 4. Recognition engines, languages, camera
    let ocr_config = config.ocr.clone();
    let engines: EngineFactory = Arc::new(move |choice| build_engine(&ocr_config, choice));

    let languages = LanguageSet::new(&config.ocr.languages).unwrap_or_else(|e| {
        log::warn!("{e}; falling back to {}", LanguageSet::default().tesseract_spec());
        LanguageSet::default()
    });

    let device: Arc<dyn CameraDevice> = match &config.camera.frame_dir {
        Some(dir) => {
            log::info!("Camera frames read from {}", dir.display());
            Arc::new(DirectoryCamera::new(dir.clone()))
        }
        None => {
            log::info!("No camera configured; capture is disabled");
            Arc::new(NoCamera)
        }
    };
    let camera = CameraSession::new(device, config.camera.jpeg_quality);

    // 5. Channel setup
    let (scanner_tx, scanner_rx) = mpsc::channel::<ScannerCommand>(16);
    let (scanner_event_tx, scanner_event_rx) = mpsc::channel::<ScannerEvent>(64);
    let (survey_tx, survey_rx) = mpsc::channel::<SurveyCommand>(4);
    let (survey_event_tx, survey_event_rx) = mpsc::channel::<SurveyEvent>(4);

    let ledger = new_shared_ledger();
    let previews = new_shared_previews();

    // 6. Background tasks
    let scanner = Scanner::new(
        Arc::clone(&ledger),
        Arc::clone(&previews),
        engines,
        config.ocr.engine,
        languages,
        camera,
        config.export.resolve_dir(),
        scanner_event_tx,
    )
    .with_text_callback(Arc::new(|text: &str, confidence: u8| {
        log::info!(
            "Extracted {} characters at {confidence}% confidence",
            text.chars().count()
        );
    }));
    rt.spawn(scanner.run(scanner_rx));

    let generator: Arc<dyn QuestionGenerator> = Arc::new(ApiGenerator::from_config(&config.generator));
    rt.spawn(run_generator(generator, survey_rx, survey_event_tx));

    // 7. Build the egui app and run it (blocks until the window is closed)
    let app = FieldscanApp::new(
        config.clone(),
        ledger,
        previews,
        scanner_tx,
        scanner_event_rx,
        survey_tx,
        survey_event_rx,
    );
    let options = native_options(&config);

    eframe::run_native(
        "fieldscan",
        options,
        Box::new(move |_cc| Ok(Box::new(app))),
    )
}
