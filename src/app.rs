//! fieldscan dashboard, egui/eframe application.
//!
//! # Architecture
//!
//! [`FieldscanApp`] is the top-level [`eframe::App`].  It owns the per-tab UI
//! state and four channel endpoints:
//!
//! * `scanner_tx` / `scanner_rx`: [`ScannerCommand`] out, [`ScannerEvent`] in.
//! * `survey_tx` / `survey_rx`: [`SurveyCommand`] out, [`SurveyEvent`] in.
//!
//! Both receivers are drained with `try_recv` at the start of every frame
//! and commands go out with `try_send`, so the UI thread never blocks on
//! the tokio tasks.  Job progress is read straight from the shared ledger.
//!
//! # Tabs
//!
//! | Tab | Content |
//! |-----|---------|
//! | Scanner | drop zone, path input, camera, progress bar, history |
//! | Documents | review queue with search, status and district filters |
//! | Validation | overview, error list with bulk actions, region tree |
//! | Agents | performance table and badge summary |
//! | Survey | generator prompt, generated preview, manual builder |

use std::path::PathBuf;
use std::time::{Duration, Instant};

use eframe::egui;
use tokio::sync::mpsc;

use crate::capture::{PreviewRegistry, PreviewUrl};
use crate::config::{AppConfig, EngineChoice, ViewerRole};
use crate::ledger::{JobId, JobStatus, RecognitionJob, SharedLedger};
use crate::pipeline::{ScannerCommand, ScannerEvent, SharedPreviews};
use crate::records::{
    apply_bulk, error_categories, export_document, flatten_regions, sample_agents, sample_errors,
    sample_regions, AgentFilter, AgentPerformance, AgentSummary, Badge, BulkAction,
    CategoryTrend, DocumentFilter, DocumentStats, DocumentStatus, ErrorCategory, ErrorFilter,
    ErrorSelection, ErrorStatus, OcrDocument, RegionData, RegionStatus, ReviewQueue, Severity,
    ValidationError, ValidationStats,
};
use crate::survey::{Question, QuestionType, SurveyCommand, SurveyDraft, SurveyEvent, PROMPT_HINT};

/// How long a notice stays in the status bar.
const NOTICE_TTL: Duration = Duration::from_secs(4);

// ---------------------------------------------------------------------------
// Tabs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Scanner,
    Documents,
    Validation,
    Agents,
    Survey,
}

impl Tab {
    pub const ALL: [Tab; 5] = [
        Tab::Scanner,
        Tab::Documents,
        Tab::Validation,
        Tab::Agents,
        Tab::Survey,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Tab::Scanner => "Scanner",
            Tab::Documents => "Documents",
            Tab::Validation => "Validation",
            Tab::Agents => "Agents",
            Tab::Survey => "Survey",
        }
    }
}

// ---------------------------------------------------------------------------
// Preview modal
// ---------------------------------------------------------------------------

/// An open image preview.  Closing it revokes `url`.
struct PreviewView {
    job: JobId,
    url: PreviewUrl,
    name: String,
    content_type: String,
    size: usize,
    text: Option<String>,
    texture: Option<egui::TextureHandle>,
    decode_error: Option<String>,
}

/// Decode an uploaded image into something egui can upload as a texture.
pub fn decode_preview(bytes: &[u8]) -> Result<egui::ColorImage, image::ImageError> {
    let rgba = image::load_from_memory(bytes)?.to_rgba8();
    let size = [rgba.width() as usize, rgba.height() as usize];
    Ok(egui::ColorImage::from_rgba_unmultiplied(size, rgba.as_raw()))
}

// ---------------------------------------------------------------------------
// FieldscanApp
// ---------------------------------------------------------------------------

/// Top-level eframe application.
pub struct FieldscanApp {
    // --- Navigation ---
    tab: Tab,
    notice: Option<(String, Instant)>,
    error_message: Option<String>,

    // --- Scanner tab ---
    ledger: SharedLedger,
    previews: SharedPreviews,
    engine: EngineChoice,
    camera_on: bool,
    path_input: String,
    preview: Option<PreviewView>,

    // --- Records tabs ---
    review: ReviewQueue,
    doc_filter: DocumentFilter,
    selected_doc: Option<String>,
    notes_input: String,
    errors: Vec<ValidationError>,
    error_filter: ErrorFilter,
    selection: ErrorSelection,
    validation_stats: ValidationStats,
    categories: Vec<ErrorCategory>,
    regions: Vec<RegionData>,
    agents: Vec<AgentPerformance>,
    agent_filter: AgentFilter,

    // --- Survey tab ---
    prompt: String,
    generating: bool,
    generated: Vec<Question>,
    survey_error: Option<String>,
    draft: SurveyDraft,

    // --- Channels ---
    scanner_tx: mpsc::Sender<ScannerCommand>,
    scanner_rx: mpsc::Receiver<ScannerEvent>,
    survey_tx: mpsc::Sender<SurveyCommand>,
    survey_rx: mpsc::Receiver<SurveyEvent>,

    // --- Config ---
    export_dir: PathBuf,
    config: AppConfig,
}

impl FieldscanApp {
    pub fn new(
        config: AppConfig,
        ledger: SharedLedger,
        previews: SharedPreviews,
        scanner_tx: mpsc::Sender<ScannerCommand>,
        scanner_rx: mpsc::Receiver<ScannerEvent>,
        survey_tx: mpsc::Sender<SurveyCommand>,
        survey_rx: mpsc::Receiver<SurveyEvent>,
    ) -> Self {
        Self {
            tab: Tab::Scanner,
            notice: None,
            error_message: None,
            ledger,
            previews,
            engine: config.ocr.engine,
            camera_on: false,
            path_input: String::new(),
            preview: None,
            review: ReviewQueue::default(),
            doc_filter: DocumentFilter::default(),
            selected_doc: None,
            notes_input: String::new(),
            errors: sample_errors(),
            error_filter: ErrorFilter::default(),
            selection: ErrorSelection::new(),
            validation_stats: ValidationStats::sample(),
            categories: error_categories(),
            regions: sample_regions(),
            agents: sample_agents(),
            agent_filter: AgentFilter::default(),
            prompt: String::new(),
            generating: false,
            generated: Vec::new(),
            survey_error: None,
            draft: SurveyDraft::new(),
            scanner_tx,
            scanner_rx,
            survey_tx,
            survey_rx,
            export_dir: config.export.resolve_dir(),
            config,
        }
    }

    // ── Channel polling ──────────────────────────────────────────────────

    /// Drain all pending scanner events (non-blocking).
    fn poll_scanner(&mut self) {
        while let Ok(event) = self.scanner_rx.try_recv() {
            match event {
                ScannerEvent::JobQueued(id) => {
                    self.error_message = None;
                    self.notify(format!("Job {id} queued"));
                }
                ScannerEvent::JobFinished { id, status } => {
                    self.notify(format!("Job {id} {}", status.display_label()));
                }
                ScannerEvent::CameraStarted => self.camera_on = true,
                ScannerEvent::CameraStopped => self.camera_on = false,
                ScannerEvent::EngineSelected(choice) => self.engine = choice,
                ScannerEvent::Exported { path, .. } => {
                    self.notify(format!("Saved {}", path.display()));
                }
                ScannerEvent::Error(message) => self.error_message = Some(message),
            }
        }
    }

    /// Drain all pending survey events (non-blocking).
    fn poll_survey(&mut self) {
        while let Ok(event) = self.survey_rx.try_recv() {
            self.generating = false;
            match event {
                SurveyEvent::Generated(questions) => {
                    self.survey_error = None;
                    self.notify(format!("Generated {} questions", questions.len()));
                    self.generated = questions;
                }
                SurveyEvent::Failed(message) => self.survey_error = Some(message),
            }
        }
    }

    fn send_scanner(&mut self, command: ScannerCommand) {
        if let Err(e) = self.scanner_tx.try_send(command) {
            log::warn!("app: scanner command dropped: {e}");
            self.error_message = Some("The scanner is busy, try again.".into());
        }
    }

    fn notify(&mut self, message: String) {
        self.notice = Some((message, Instant::now()));
    }

    // ── Scanner tab ──────────────────────────────────────────────────────

    /// Forward files dropped onto the window to the scanner.
    fn handle_dropped_files(&mut self, ctx: &egui::Context) {
        let dropped = ctx.input(|i| i.raw.dropped_files.clone());
        for file in dropped {
            if let Some(path) = file.path {
                self.send_scanner(ScannerCommand::SubmitFile(path));
            } else if let Some(bytes) = file.bytes {
                let mime = (!file.mime.is_empty()).then_some(file.mime);
                self.send_scanner(ScannerCommand::SubmitDropped {
                    name: file.name,
                    mime,
                    bytes: bytes.to_vec(),
                });
            }
        }
    }

    fn draw_scanner(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        // Snapshot under the lock; the preview registry is locked separately.
        let jobs: Vec<RecognitionJob> = self.ledger.lock().unwrap().iter().cloned().collect();
        let active = jobs.iter().find(|j| j.status.is_active()).cloned();
        let busy = active.is_some();
        let has_image = images_available(&self.previews.lock().unwrap(), &jobs);

        ui.heading("OCR Document Scanner");
        ui.label(match self.config.ui.role {
            ViewerRole::Agent => "Scan documents and forms to extract text automatically",
            ViewerRole::Admin => "View and manage OCR extracted text from field agents",
        });
        ui.label(
            egui::RichText::new(format!(
                "Languages: {}",
                self.config.ocr.languages.join(", ")
            ))
            .color(egui::Color32::from_rgb(80, 160, 100))
            .size(11.0),
        );
        ui.add_space(6.0);

        // Engine picker
        let mut choice = self.engine;
        egui::ComboBox::from_label("Engine")
            .selected_text(choice.label())
            .show_ui(ui, |ui| {
                for option in EngineChoice::ALL {
                    ui.selectable_value(&mut choice, option, option.label());
                }
            });
        if choice != self.engine {
            self.engine = choice;
            self.send_scanner(ScannerCommand::SelectEngine(choice));
        }

        // File input
        ui.horizontal(|ui| {
            ui.label("Image file:");
            ui.add(
                egui::TextEdit::singleline(&mut self.path_input)
                    .hint_text("path/to/form.jpg")
                    .desired_width(320.0),
            );
            let can_submit = !busy && !self.path_input.trim().is_empty();
            if ui.add_enabled(can_submit, egui::Button::new("Scan")).clicked() {
                let path = PathBuf::from(self.path_input.trim());
                self.path_input.clear();
                self.send_scanner(ScannerCommand::SubmitFile(path));
            }
        });
        ui.label(
            egui::RichText::new("…or drop an image anywhere on this window")
                .italics()
                .color(egui::Color32::from_rgb(140, 140, 140)),
        );

        // Camera controls
        ui.horizontal(|ui| {
            if self.camera_on {
                if ui.add_enabled(!busy, egui::Button::new("Capture")).clicked() {
                    self.send_scanner(ScannerCommand::CapturePhoto);
                }
                if ui.button("Stop camera").clicked() {
                    self.send_scanner(ScannerCommand::StopCamera);
                }
            } else if ui.add_enabled(!busy, egui::Button::new("Start camera")).clicked() {
                self.send_scanner(ScannerCommand::StartCamera);
            }
        });

        if let Some(job) = &active {
            ui.add_space(4.0);
            ui.add(
                egui::ProgressBar::new(f32::from(job.progress) / 100.0)
                    .text(format!("Processing {}… {}%", job.id, job.progress)),
            );
        }

        if let Some(message) = self.error_message.clone() {
            ui.add_space(4.0);
            ui.horizontal(|ui| {
                ui.colored_label(egui::Color32::from_rgb(255, 136, 68), message);
                if ui.small_button("x").clicked() {
                    self.error_message = None;
                }
            });
        }

        ui.separator();
        ui.heading(format!("History ({})", jobs.len()));
        egui::ScrollArea::vertical()
            .id_salt("history")
            .show(ui, |ui| {
                for (job, has_image) in jobs.iter().zip(has_image) {
                    self.draw_job_row(ui, ctx, job, busy, has_image);
                    ui.separator();
                }
            });
    }

    /// `has_image` is false once the job's preview has been revoked; retry
    /// and preview need the image.
    fn draw_job_row(
        &mut self,
        ui: &mut egui::Ui,
        ctx: &egui::Context,
        job: &RecognitionJob,
        busy: bool,
        has_image: bool,
    ) {
        ui.horizontal(|ui| {
            ui.label(egui::RichText::new(job.id.to_string()).strong());
            ui.label(job.created_at.format("%H:%M:%S").to_string());
            ui.label(job.engine.label());
            ui.colored_label(status_color(job.status), job.status.display_label());
            if let Some(confidence) = job.confidence() {
                ui.label(format!("{confidence}% confidence"));
            }
        });

        match job.status {
            JobStatus::Completed => {
                let text = job.text().unwrap_or_default().to_string();
                ui.label(egui::RichText::new(text.as_str()).monospace());
                ui.horizontal(|ui| {
                    if ui.button("Copy").clicked() {
                        ctx.copy_text(text.clone());
                        self.notify("Copied to clipboard".into());
                    }
                    if ui.button("Download").clicked() {
                        self.send_scanner(ScannerCommand::Download(job.id));
                    }
                    if ui.add_enabled(has_image, egui::Button::new("Preview")).clicked() {
                        self.open_preview(ctx, job);
                    }
                });
            }
            JobStatus::Failed => {
                if let Some(error) = &job.error {
                    ui.colored_label(egui::Color32::from_rgb(255, 136, 68), error);
                }
                ui.horizontal(|ui| {
                    if ui
                        .add_enabled(!busy && has_image, egui::Button::new("Retry"))
                        .clicked()
                    {
                        self.send_scanner(ScannerCommand::Retry(job.id));
                    }
                    if ui.add_enabled(has_image, egui::Button::new("Preview")).clicked() {
                        self.open_preview(ctx, job);
                    }
                });
            }
            JobStatus::Queued | JobStatus::Recognizing => {}
        }
    }

    fn open_preview(&mut self, ctx: &egui::Context, job: &RecognitionJob) {
        if let Some(open) = self.preview.take() {
            self.send_scanner(ScannerCommand::RevokePreview(open.url));
        }

        let payload = self.previews.lock().unwrap().resolve(&job.preview);
        let Some(payload) = payload else {
            self.error_message = Some(format!("The image for job {} is no longer available", job.id));
            return;
        };

        let (texture, decode_error) = match decode_preview(payload.bytes()) {
            Ok(image) => (
                Some(ctx.load_texture(
                    job.preview.as_str(),
                    image,
                    egui::TextureOptions::default(),
                )),
                None,
            ),
            Err(e) => {
                log::debug!("app: cannot decode preview {}: {e}", job.preview);
                (None, Some(e.to_string()))
            }
        };

        self.preview = Some(PreviewView {
            job: job.id,
            url: job.preview.clone(),
            name: payload.name().to_string(),
            content_type: payload.content_type().to_string(),
            size: payload.bytes().len(),
            text: job.text().map(str::to_string),
            texture,
            decode_error,
        });
    }

    fn draw_preview(&mut self, ctx: &egui::Context) {
        let Some(view) = &self.preview else {
            return;
        };

        let mut open = true;
        let mut close_clicked = false;
        egui::Window::new(format!("Preview {}", view.job))
            .open(&mut open)
            .collapsible(false)
            .resizable(true)
            .show(ctx, |ui| {
                ui.label(format!(
                    "{} ({}, {} bytes)",
                    view.name, view.content_type, view.size
                ));
                match (&view.texture, &view.decode_error) {
                    (Some(texture), _) => {
                        ui.add(egui::Image::new(texture).max_width(520.0));
                    }
                    (None, Some(error)) => {
                        ui.colored_label(egui::Color32::from_rgb(255, 136, 68), error);
                    }
                    (None, None) => {}
                }
                if let Some(text) = &view.text {
                    ui.separator();
                    ui.label(egui::RichText::new(text.as_str()).monospace());
                }
                if ui.button("Close").clicked() {
                    close_clicked = true;
                }
            });

        if !open || close_clicked {
            if let Some(view) = self.preview.take() {
                self.send_scanner(ScannerCommand::RevokePreview(view.url));
            }
        }
    }

    // ── Documents tab ────────────────────────────────────────────────────

    fn draw_documents(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        let stats: DocumentStats = self.review.stats();
        ui.heading("OCR Document Review");
        ui.horizontal(|ui| {
            stat_card(ui, "Total", stats.total.to_string());
            stat_card(ui, "Pending", stats.pending.to_string());
            stat_card(ui, "Approved", stats.approved.to_string());
            stat_card(ui, "Avg confidence", format!("{}%", stats.average_confidence));
        });
        ui.add_space(4.0);

        let districts: Vec<String> = self.review.districts().into_iter().map(String::from).collect();
        ui.horizontal(|ui| {
            ui.add(
                egui::TextEdit::singleline(&mut self.doc_filter.query)
                    .hint_text("Search text, agent or district")
                    .desired_width(260.0),
            );
            egui::ComboBox::from_id_salt("doc-status")
                .selected_text(self.doc_filter.status.map_or("All statuses", DocumentStatus::as_str))
                .show_ui(ui, |ui| {
                    ui.selectable_value(&mut self.doc_filter.status, None, "All statuses");
                    for status in DocumentStatus::ALL {
                        ui.selectable_value(&mut self.doc_filter.status, Some(status), status.as_str());
                    }
                });
            egui::ComboBox::from_id_salt("doc-district")
                .selected_text(self.doc_filter.district.as_deref().unwrap_or("All districts"))
                .show_ui(ui, |ui| {
                    ui.selectable_value(&mut self.doc_filter.district, None, "All districts");
                    for district in &districts {
                        ui.selectable_value(
                            &mut self.doc_filter.district,
                            Some(district.clone()),
                            district.as_str(),
                        );
                    }
                });
        });
        ui.separator();

        let visible: Vec<OcrDocument> = self
            .doc_filter
            .apply(self.review.documents())
            .into_iter()
            .cloned()
            .collect();
        if visible.is_empty() {
            ui.label("No documents match the current filters.");
        }

        egui::Grid::new("documents")
            .striped(true)
            .num_columns(6)
            .show(ui, |ui| {
                for header in ["ID", "Agent", "District", "Type", "Confidence", "Status"] {
                    ui.strong(header);
                }
                ui.end_row();
                for doc in &visible {
                    if ui
                        .selectable_label(self.selected_doc.as_deref() == Some(doc.id.as_str()), &doc.id)
                        .clicked()
                    {
                        self.selected_doc = Some(doc.id.clone());
                        self.notes_input = doc.notes.clone().unwrap_or_default();
                    }
                    ui.label(&doc.agent_name);
                    ui.label(format!("{}, {}", doc.district, doc.state));
                    ui.label(&doc.document_type);
                    ui.label(format!("{}%", doc.confidence));
                    ui.label(doc.status.as_str());
                    ui.end_row();
                }
            });

        let Some(doc) = self
            .selected_doc
            .as_deref()
            .and_then(|id| self.review.get(id))
            .cloned()
        else {
            return;
        };

        ui.separator();
        ui.heading(format!("{} · {}", doc.id, doc.document_type));
        ui.label(format!(
            "Uploaded {} by {}",
            doc.timestamp.format("%d/%m/%Y %H:%M"),
            doc.agent_name
        ));
        ui.label(egui::RichText::new(doc.extracted_text.as_str()).monospace());
        ui.horizontal(|ui| {
            ui.label("Notes:");
            ui.text_edit_singleline(&mut self.notes_input);
            if ui.button("Save notes").clicked() {
                if let Err(e) = self.review.set_notes(&doc.id, &self.notes_input) {
                    log::warn!("app: {e}");
                }
            }
        });
        ui.horizontal(|ui| {
            for (label, status) in [
                ("Approve", DocumentStatus::Approved),
                ("Reject", DocumentStatus::Rejected),
                ("Mark reviewed", DocumentStatus::Reviewed),
            ] {
                if ui.add_enabled(doc.status != status, egui::Button::new(label)).clicked() {
                    match self.review.set_status(&doc.id, status) {
                        Ok(()) => self.notify(format!("{} {}", doc.id, status)),
                        Err(e) => log::warn!("app: {e}"),
                    }
                }
            }
            if ui.button("Copy text").clicked() {
                ctx.copy_text(doc.extracted_text.clone());
            }
            if ui.button("Export report").clicked() {
                match export_document(&doc, &self.export_dir) {
                    Ok(path) => self.notify(format!("Saved {}", path.display())),
                    Err(e) => {
                        log::error!("app: {e}");
                        self.error_message = Some(e.to_string());
                    }
                }
            }
        });
    }

    // ── Validation tab ───────────────────────────────────────────────────

    fn draw_validation(&mut self, ui: &mut egui::Ui) {
        let stats = self.validation_stats;
        ui.heading("Data Validation");
        ui.horizontal(|ui| {
            stat_card(ui, "Validated", format!("{}/{}", stats.validated_surveys, stats.total_surveys));
            stat_card(ui, "Pending", stats.pending_validation.to_string());
            stat_card(ui, "Error rate", format!("{:.1}%", stats.error_rate));
            stat_card(ui, "Auto-fixed", stats.auto_fixed_errors.to_string());
            stat_card(ui, "Manual review", stats.manual_review_needed.to_string());
            stat_card(ui, "Avg time", format!("{:.1}s", stats.avg_validation_secs));
        });

        ui.collapsing("Error categories", |ui| {
            egui::Grid::new("categories").striped(true).show(ui, |ui| {
                for category in &self.categories {
                    ui.label(category.label);
                    ui.label(category.count.to_string());
                    ui.label(format!("{:.1}%", category.percentage));
                    ui.label(match category.trend {
                        CategoryTrend::Up => "↑",
                        CategoryTrend::Down => "↓",
                        CategoryTrend::Stable => "→",
                    });
                    ui.label(category.examples.join("; "));
                    ui.end_row();
                }
            });
        });

        ui.collapsing("Regions", |ui| {
            for (depth, region) in flatten_regions(&self.regions) {
                ui.horizontal(|ui| {
                    ui.add_space(depth as f32 * 16.0);
                    ui.label(&region.name);
                    ui.colored_label(
                        region_color(region.status),
                        format!("{:.1}% ({} / {})", region.error_rate, region.error_count, region.total_surveys),
                    );
                });
            }
        });
        ui.separator();

        ui.horizontal(|ui| {
            ui.add(
                egui::TextEdit::singleline(&mut self.error_filter.query)
                    .hint_text("Search description, agent or district")
                    .desired_width(260.0),
            );
            egui::ComboBox::from_id_salt("error-severity")
                .selected_text(self.error_filter.severity.map_or("All severities", Severity::as_str))
                .show_ui(ui, |ui| {
                    ui.selectable_value(&mut self.error_filter.severity, None, "All severities");
                    for severity in Severity::ALL {
                        ui.selectable_value(&mut self.error_filter.severity, Some(severity), severity.as_str());
                    }
                });
            egui::ComboBox::from_id_salt("error-status")
                .selected_text(self.error_filter.status.map_or("All statuses", ErrorStatus::as_str))
                .show_ui(ui, |ui| {
                    ui.selectable_value(&mut self.error_filter.status, None, "All statuses");
                    for status in ErrorStatus::ALL {
                        ui.selectable_value(&mut self.error_filter.status, Some(status), status.as_str());
                    }
                });
        });

        if !self.selection.is_empty() {
            let mut chosen = None;
            ui.horizontal(|ui| {
                ui.label(format!("{} selected", self.selection.len()));
                for (label, action) in [
                    ("Fix", BulkAction::Fix),
                    ("Ignore", BulkAction::Ignore),
                    ("Reassign", BulkAction::Reassign),
                ] {
                    if ui.button(label).clicked() {
                        chosen = Some(action);
                    }
                }
            });
            if let Some(action) = chosen {
                let ids = self.selection.bulk_action(action);
                let changed = apply_bulk(&mut self.errors, action, &ids);
                self.notify(format!("{} {} errors ({changed} updated)", action.as_str(), ids.len()));
            }
        }

        let visible: Vec<ValidationError> = self
            .error_filter
            .apply(&self.errors)
            .into_iter()
            .cloned()
            .collect();
        egui::ScrollArea::vertical().id_salt("errors").show(ui, |ui| {
            for error in &visible {
                ui.horizontal(|ui| {
                    let mut checked = self.selection.is_selected(&error.id);
                    if ui.checkbox(&mut checked, "").changed() {
                        self.selection.toggle(&error.id);
                    }
                    ui.strong(&error.id);
                    ui.colored_label(severity_color(error.severity), error.severity.as_str());
                    ui.label(error.kind.as_str());
                    ui.label(error.status.as_str());
                    if error.auto_fixable {
                        ui.label("auto-fixable");
                    }
                });
                ui.label(&error.description);
                ui.label(format!("{} = {:?} → {}", error.field, error.value, error.suggestion));
                ui.label(
                    egui::RichText::new(format!(
                        "{} · {}, {} · {}",
                        error.agent_name, error.district, error.state, error.survey_id
                    ))
                    .size(11.0)
                    .color(egui::Color32::from_rgb(140, 140, 140)),
                );
                ui.separator();
            }
        });
    }

    // ── Agents tab ───────────────────────────────────────────────────────

    fn draw_agents(&mut self, ui: &mut egui::Ui) {
        ui.heading("Agent Performance");
        ui.add(
            egui::TextEdit::singleline(&mut self.agent_filter.query)
                .hint_text("Search name or district")
                .desired_width(260.0),
        );

        let visible = self.agent_filter.apply(&self.agents);
        let summary = AgentSummary::from_agents(visible.iter().copied());
        ui.horizontal(|ui| {
            stat_card(ui, "Agents", summary.agents.to_string());
            stat_card(ui, "Gold", summary.gold.to_string());
            stat_card(ui, "Silver", summary.silver.to_string());
            stat_card(ui, "Bronze", summary.bronze.to_string());
            stat_card(ui, "Avg accuracy", format!("{:.1}%", summary.average_accuracy));
        });
        ui.separator();

        egui::Grid::new("agents").striped(true).show(ui, |ui| {
            for header in ["Agent", "District", "Surveys", "Errors", "Accuracy", "Badge", "Trend", "Last active"] {
                ui.strong(header);
            }
            ui.end_row();
            for agent in &visible {
                ui.label(&agent.name).on_hover_text(agent.common_errors.join(", "));
                ui.label(format!("{}, {}", agent.district, agent.state));
                ui.label(agent.total_surveys.to_string());
                ui.label(format!("{} ({:.1}%)", agent.error_count, agent.error_rate));
                ui.label(format!("{:.1}%", agent.accuracy));
                ui.colored_label(badge_color(agent.badge), agent.badge.as_str());
                ui.label(agent.trend.as_str());
                ui.label(agent.last_active.format("%d/%m/%Y %H:%M").to_string());
                ui.end_row();
            }
        });
    }

    // ── Survey tab ───────────────────────────────────────────────────────

    fn draw_survey(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        ui.heading("Survey Designer");
        ui.add(
            egui::TextEdit::multiline(&mut self.prompt)
                .hint_text(PROMPT_HINT)
                .desired_rows(3)
                .desired_width(f32::INFINITY),
        );
        ui.horizontal(|ui| {
            let can_generate = !self.generating && !self.prompt.trim().is_empty();
            if ui.add_enabled(can_generate, egui::Button::new("Generate questions")).clicked() {
                match self.survey_tx.try_send(SurveyCommand::Generate(self.prompt.clone())) {
                    Ok(()) => {
                        self.generating = true;
                        self.survey_error = None;
                    }
                    Err(e) => log::warn!("app: survey command dropped: {e}"),
                }
            }
            if self.generating {
                ui.spinner();
                ui.label(format!("Asking {}…", self.config.generator.model));
            }
        });
        if let Some(message) = &self.survey_error {
            ui.colored_label(egui::Color32::from_rgb(255, 136, 68), message);
        }

        if !self.generated.is_empty() {
            ui.separator();
            ui.strong(format!("Generated ({})", self.generated.len()));
            for question in &self.generated {
                question_row(ui, question);
            }
            ui.horizontal(|ui| {
                if ui.button("Add all to survey").clicked() {
                    let added = self.draft.import(std::mem::take(&mut self.generated));
                    self.notify(format!("Added {added} questions"));
                }
                if ui.button("Discard").clicked() {
                    self.generated.clear();
                }
            });
        }

        ui.separator();
        ui.horizontal_wrapped(|ui| {
            ui.label("Add:");
            for kind in QuestionType::ALL {
                if ui.button(kind.label()).clicked() {
                    self.draft.add_question(kind);
                }
            }
        });

        if self.draft.is_empty() {
            ui.label("No questions yet.");
            return;
        }

        let mut remove = None;
        egui::ScrollArea::vertical().id_salt("draft").show(ui, |ui| {
            for question in self.draft.questions() {
                ui.horizontal(|ui| {
                    question_row(ui, question);
                    if ui.small_button("Remove").clicked() {
                        remove = Some(question.id.clone());
                    }
                });
            }
        });
        if let Some(id) = remove {
            self.draft.remove(&id);
        }

        if ui.button("Copy as JSON").clicked() {
            match serde_json::to_string_pretty(self.draft.questions()) {
                Ok(json) => ctx.copy_text(json),
                Err(e) => log::error!("app: cannot serialise survey: {e}"),
            }
        }
    }

    // ── Status bar ───────────────────────────────────────────────────────

    fn draw_status_bar(&mut self, ui: &mut egui::Ui) {
        if let Some((_, shown)) = &self.notice {
            if shown.elapsed() >= NOTICE_TTL {
                self.notice = None;
            }
        }
        ui.horizontal(|ui| {
            ui.label(
                egui::RichText::new(format!("Engine: {}", self.engine.label()))
                    .size(11.0)
                    .color(egui::Color32::from_rgb(140, 140, 140)),
            );
            if let Some((message, _)) = &self.notice {
                ui.separator();
                ui.label(egui::RichText::new(message.as_str()).size(11.0));
            }
        });
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn stat_card(ui: &mut egui::Ui, label: &str, value: String) {
    egui::Frame::group(ui.style()).show(ui, |ui| {
        ui.vertical(|ui| {
            ui.label(egui::RichText::new(label).size(11.0));
            ui.label(egui::RichText::new(value).strong().size(16.0));
        });
    });
}

fn question_row(ui: &mut egui::Ui, question: &Question) {
    ui.vertical(|ui| {
        ui.horizontal(|ui| {
            ui.strong(&question.question);
            ui.label(format!("[{}]", question.kind.label()));
            if question.required {
                ui.colored_label(egui::Color32::from_rgb(255, 80, 80), "*");
            }
        });
        if !question.options.is_empty() {
            ui.label(
                egui::RichText::new(question.options.join(" · "))
                    .size(11.0)
                    .color(egui::Color32::from_rgb(140, 140, 140)),
            );
        }
    });
}

/// Whether each job's source image is still registered.
fn images_available(previews: &PreviewRegistry, jobs: &[RecognitionJob]) -> Vec<bool> {
    jobs.iter().map(|job| previews.contains(&job.preview)).collect()
}

fn status_color(status: JobStatus) -> egui::Color32 {
    match status {
        JobStatus::Queued | JobStatus::Recognizing => egui::Color32::from_rgb(68, 136, 255),
        JobStatus::Completed => egui::Color32::from_rgb(80, 200, 120),
        JobStatus::Failed => egui::Color32::from_rgb(255, 136, 68),
    }
}

fn severity_color(severity: Severity) -> egui::Color32 {
    match severity {
        Severity::High => egui::Color32::from_rgb(255, 68, 68),
        Severity::Medium => egui::Color32::from_rgb(255, 180, 60),
        Severity::Low => egui::Color32::from_rgb(68, 136, 255),
    }
}

fn region_color(status: RegionStatus) -> egui::Color32 {
    match status {
        RegionStatus::Excellent => egui::Color32::from_rgb(80, 200, 120),
        RegionStatus::Good => egui::Color32::from_rgb(68, 136, 255),
        RegionStatus::Warning => egui::Color32::from_rgb(255, 180, 60),
        RegionStatus::Critical => egui::Color32::from_rgb(255, 68, 68),
    }
}

fn badge_color(badge: Badge) -> egui::Color32 {
    match badge {
        Badge::Gold => egui::Color32::from_rgb(230, 180, 40),
        Badge::Silver => egui::Color32::from_rgb(180, 180, 190),
        Badge::Bronze => egui::Color32::from_rgb(190, 120, 60),
        Badge::None => egui::Color32::from_rgb(120, 120, 120),
    }
}

// ---------------------------------------------------------------------------
// eframe::App impl
// ---------------------------------------------------------------------------

impl eframe::App for FieldscanApp {
    /// Called every frame by eframe.  Polls channels, then renders the
    /// active tab.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // --- Poll non-blocking channels ------------------------------------
        self.poll_scanner();
        self.poll_survey();
        self.handle_dropped_files(ctx);

        // --- Keep polling while background work is in flight --------------
        let busy = self.ledger.lock().unwrap().active().is_some();
        if busy || self.generating {
            ctx.request_repaint_after(Duration::from_millis(66));
        } else {
            ctx.request_repaint_after(Duration::from_millis(500));
        }

        egui::TopBottomPanel::top("tabs").show(ctx, |ui| {
            ui.horizontal(|ui| {
                for tab in Tab::ALL {
                    ui.selectable_value(&mut self.tab, tab, tab.title());
                }
            });
        });

        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            self.draw_status_bar(ui);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            let ctx_clone = ctx.clone();
            match self.tab {
                Tab::Scanner => self.draw_scanner(ui, &ctx_clone),
                Tab::Documents => self.draw_documents(ui, &ctx_clone),
                Tab::Validation => self.draw_validation(ui),
                Tab::Agents => self.draw_agents(ui),
                Tab::Survey => self.draw_survey(ui, &ctx_clone),
            }
        });

        self.draw_preview(ctx);
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        if let Some(view) = self.preview.take() {
            let _ = self.scanner_tx.try_send(ScannerCommand::RevokePreview(view.url));
        }
        let _ = self.scanner_tx.try_send(ScannerCommand::StopCamera);
        log::info!("fieldscan dashboard closing");
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn preview_decodes_png_to_rgba() {
        let image = image::RgbImage::from_pixel(3, 2, image::Rgb([10, 20, 30]));
        let mut png = Cursor::new(Vec::new());
        image
            .write_to(&mut png, image::ImageFormat::Png)
            .unwrap();

        let decoded = decode_preview(png.get_ref()).unwrap();
        assert_eq!(decoded.size, [3, 2]);
        assert_eq!(decoded.pixels[0], egui::Color32::from_rgb(10, 20, 30));
    }

    #[test]
    fn preview_rejects_non_images() {
        assert!(decode_preview(b"not an image").is_err());
    }

    #[test]
    fn revoked_images_are_reported_unavailable() {
        use crate::capture::ImagePayload;
        use crate::ocr::LanguageSet;
        use std::sync::Arc;

        let mut previews = PreviewRegistry::new();
        let job = |previews: &mut PreviewRegistry| {
            let payload = ImagePayload::new("form.png", "image/png", vec![1]).unwrap();
            let url = previews.register(Arc::new(payload));
            RecognitionJob::queued(url, LanguageSet::default(), EngineChoice::Tesseract)
        };
        let jobs = vec![job(&mut previews), job(&mut previews)];

        assert_eq!(images_available(&previews, &jobs), vec![true, true]);
        previews.revoke(&jobs[0].preview);
        assert_eq!(images_available(&previews, &jobs), vec![false, true]);
    }

    #[test]
    fn tabs_cover_every_view_in_order() {
        let titles: Vec<&str> = Tab::ALL.iter().map(|t| t.title()).collect();
        assert_eq!(titles, ["Scanner", "Documents", "Validation", "Agents", "Survey"]);
    }
}
