//! Core application state and lifecycle.

use std::path::PathBuf;
use std::time::Duration;

use stencil_core::config::EditorConfig;
use stencil_core::persistence::DOWNLOAD_FILE_NAME;
use stencil_core::session::{DropOutcome, EditorSession};

use crate::platform::{self, ImageDecoder, UploadedFile, Uploads};
use crate::ui::{UiAction, UiState, render_ui};

/// How often to poll while decodes or uploads are outstanding.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    /// Directory palette assets are read from (native only).
    pub asset_root: PathBuf,
    pub editor: EditorConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: "Stencil".to_string(),
            width: 1280,
            height: 900,
            asset_root: PathBuf::from("./public"),
            editor: EditorConfig::default(),
        }
    }
}

impl AppConfig {
    /// Defaults overridden by `STENCIL_ASSET_ROOT` and `STENCIL_CONFIG`
    /// (a JSON file of editor settings).
    #[cfg(not(target_arch = "wasm32"))]
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(root) = std::env::var("STENCIL_ASSET_ROOT") {
            config.asset_root = PathBuf::from(root);
        }
        if let Ok(path) = std::env::var("STENCIL_CONFIG") {
            match std::fs::read_to_string(&path) {
                Ok(json) => match EditorConfig::from_json(&json) {
                    Ok(editor) => config.editor = editor,
                    Err(e) => log::error!("Ignoring invalid editor config {}: {}", path, e),
                },
                Err(e) => log::error!("Failed to read editor config {}: {}", path, e),
            }
        }
        config
    }
}

/// Main application struct.
pub struct StencilApp {
    config: AppConfig,
    session: EditorSession,
    ui_state: UiState,
    decoder: ImageDecoder,
    uploads: Uploads,
}

impl StencilApp {
    /// Create the app from an eframe creation context.
    pub fn new(_cc: &eframe::CreationContext<'_>, config: AppConfig) -> Self {
        Self::with_config(config)
    }

    /// Create the app with an open editor view.
    pub fn with_config(config: AppConfig) -> Self {
        let session = EditorSession::open(&config.editor);
        let mut ui_state = UiState::default();
        ui_state.zoom_percent = session.zoom_percent();
        Self {
            decoder: ImageDecoder::new(config.asset_root.clone()),
            uploads: Uploads::default(),
            config,
            session,
            ui_state,
        }
    }

    pub fn session(&self) -> &EditorSession {
        &self.session
    }

    pub fn ui_state(&self) -> &UiState {
        &self.ui_state
    }

    /// Close the current view and open a blank one.
    ///
    /// Decodes and uploads still in flight for the old view are discarded
    /// when they complete.
    pub fn reopen(&mut self) {
        let old = std::mem::replace(&mut self.session, EditorSession::open(&self.config.editor));
        old.close();
        self.ui_state.info("New canvas");
    }

    /// Apply one UI action.
    pub fn handle_action(&mut self, action: UiAction) {
        match action {
            UiAction::BeginDrag(kind) => self.session.begin_drag(kind),
            UiAction::Drop(point) => match self.session.drop_at(point) {
                Ok(DropOutcome::Placed(id)) => log::debug!("Dropped object {}", id),
                Ok(DropOutcome::Pending(pending)) => {
                    log::debug!("Decoding {} for {}", pending.source, pending.kind);
                    self.decoder.request(pending);
                }
                Err(e) => {
                    log::warn!("Drop rejected: {}", e);
                    self.ui_state.error(e.to_string());
                }
            },
            UiAction::NewCanvas => self.reopen(),
            UiAction::SaveDocument => self.save(),
            UiAction::LoadDocument => {
                let ticket = self.session.begin_load();
                self.uploads.request(ticket);
            }
            UiAction::ZoomIn => {
                self.session.zoom_in();
            }
            UiAction::ZoomOut => {
                self.session.zoom_out();
            }
        }
        self.ui_state.zoom_percent = self.session.zoom_percent();
    }

    fn save(&mut self) {
        let json = match self.session.save() {
            Ok(json) => json,
            Err(e) => {
                log::error!("Failed to serialize canvas: {}", e);
                self.ui_state.error(format!("Save failed: {}", e));
                return;
            }
        };
        match platform::save_document(&json) {
            Ok(true) => self.ui_state.info(format!("Saved {}", DOWNLOAD_FILE_NAME)),
            Ok(false) => {}
            Err(e) => {
                log::error!("Failed to save canvas: {}", e);
                self.ui_state.error(format!("Save failed: {}", e));
            }
        }
    }

    /// Apply every decode and upload that completed since the last frame.
    pub fn poll_async(&mut self) {
        for done in self.decoder.poll() {
            let kind = done.pending.kind;
            let result = match done.dimensions {
                Ok((width, height)) => self
                    .session
                    .finish_image(done.pending, width, height)
                    .map_err(|e| e.to_string()),
                Err(e) => {
                    log::error!("Failed to decode {} asset: {}", kind, e);
                    Err(e.to_string())
                }
            };
            if let Err(message) = result {
                self.ui_state.error(message);
            }
        }

        if let Some(UploadedFile {
            pending,
            file_name,
            contents,
        }) = self.uploads.poll()
        {
            let result = contents.and_then(|json| self.session.finish_load(pending, &file_name, &json));
            match result {
                Ok(count) => self.ui_state.info(format!("Loaded {} ({} objects)", file_name, count)),
                Err(e) => {
                    log::error!("Failed to load {}: {}", file_name, e);
                    self.ui_state.error(format!("Load failed: {}", e));
                }
            }
        }

        self.ui_state.busy = self.decoder.in_flight() > 0 || self.uploads.is_waiting();
    }
}

impl eframe::App for StencilApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_async();

        let (actions, viewport) = render_ui(ctx, &self.ui_state, self.session.canvas());
        self.session
            .canvas_mut()
            .set_viewport_size(viewport.x as f64, viewport.y as f64);
        for action in actions {
            self.handle_action(action);
        }

        if self.session.canvas_mut().take_redraw() {
            ctx.request_repaint();
        }
        if self.ui_state.busy {
            ctx.request_repaint_after(POLL_INTERVAL);
        }
    }
}
