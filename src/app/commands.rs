//! Command handlers - business logic for processing UI events

use std::path::PathBuf;

use crate::app::state::{ApiHealth, ClipboardRequest, NotificationLevel};
use crate::app::AppState;
use crate::error::{ApiError, UploadError, WorkflowError};
use crate::messages::ui_events::Route;
use crate::messages::{NetworkCommand, NetworkResponse};
use crate::models::{
    HealthResponse, PreviewRef, ProfessionsResponse, SelectedFile, SwapResponse, SwapResult,
    UploadResponse, UploadedImage,
};
use crate::upload::{self, UploadWidget};
use crate::workflow::{Workflow, WorkflowStep};

impl AppState {
    // ========================
    // Navigation
    // ========================

    /// Commands to issue once at start-up
    pub fn startup_commands(&mut self) -> Vec<NetworkCommand> {
        let id = self.next_id();
        self.health_request = Some(id);
        self.api_health = ApiHealth::Checking;
        vec![NetworkCommand::HealthCheck { id }]
    }

    pub fn navigate(&mut self, target: Route) -> Option<NetworkCommand> {
        // The result route only exists while a handoff is available
        let target = if target == Route::Result
            && self.pending_handoff.is_none()
            && !(self.route == Route::Result && self.result.is_some())
        {
            tracing::debug!("No result to show, redirecting to upload");
            Route::Upload
        } else {
            target
        };

        if target == self.route {
            return None;
        }

        match self.route {
            Route::Upload => self.leave_workflow(),
            Route::Result => self.result = None,
            Route::Home => {}
        }

        self.route = target;
        tracing::info!(route = ?target, "Navigated");

        match target {
            Route::Upload => self.load_professions(),
            Route::Result => {
                self.result = self.pending_handoff.take();
                self.last_download = None;
                None
            }
            Route::Home => None,
        }
    }

    /// Tear down the workflow; late responses no longer match any pending id
    fn leave_workflow(&mut self) {
        if let Some(image) = self.workflow.image() {
            tracing::debug!(preview = %image.preview.url, "Released preview");
        }
        self.workflow = Workflow::new();
        self.upload = UploadWidget::Empty;
        self.show_picker = false;
        self.picker_input.clear();
        self.profession_cursor = 0;
    }

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    pub fn close_help(&mut self) {
        self.show_help = false;
    }

    // ========================
    // Upload widget
    // ========================

    /// Files dropped onto the window arrive as pasted paths
    pub fn drop_files(&mut self, text: &str) -> Option<NetworkCommand> {
        if self.route != Route::Upload || self.workflow.step() != WorkflowStep::AwaitingImage {
            self.notify(NotificationLevel::Info, "Open the upload step to add an image");
            return None;
        }
        let paths = upload::parse_dropped_paths(text);
        self.submit_paths(paths)
    }

    pub fn open_file_picker(&mut self) {
        if self.upload.is_uploading() {
            return;
        }
        self.show_picker = true;
    }

    pub fn picker_char(&mut self, c: char) {
        self.picker_input.push(c);
    }

    pub fn picker_paste(&mut self, text: &str) {
        self.picker_input.push_str(text.trim_end_matches(['\r', '\n']));
    }

    pub fn picker_backspace(&mut self) {
        self.picker_input.pop();
    }

    pub fn picker_autocomplete(&mut self) {
        if let Some(completed) = upload::autocomplete_path(&self.picker_input) {
            self.picker_input = completed;
        }
    }

    pub fn picker_cancel(&mut self) {
        self.show_picker = false;
        self.picker_input.clear();
    }

    pub fn picker_submit(&mut self) -> Option<NetworkCommand> {
        let input = self.picker_input.trim().to_string();
        let paths: Vec<PathBuf> = if input.is_empty() {
            Vec::new()
        } else {
            vec![upload::expand_home(&input)]
        };

        let cmd = self.submit_paths(paths);
        if self.upload.is_uploading() {
            self.picker_cancel();
        }
        cmd
    }

    /// Validate the selection and start the upload
    fn submit_paths(&mut self, paths: Vec<PathBuf>) -> Option<NetworkCommand> {
        match self.prepare_upload(paths) {
            Ok(cmd) => Some(cmd),
            Err(e) => {
                tracing::warn!(error = %e, "Upload rejected");
                self.notify(NotificationLevel::Error, e.to_string());
                None
            }
        }
    }

    fn prepare_upload(&mut self, paths: Vec<PathBuf>) -> Result<NetworkCommand, UploadError> {
        self.upload.accepts_drop()?;

        let files = paths
            .iter()
            .map(|p| upload::inspect_file(p))
            .collect::<Result<Vec<SelectedFile>, _>>()?;
        let file = upload::validate_selection(&files)?.clone();

        let id = self.next_id();
        self.upload.begin(id, file.clone())?;
        tracing::info!(id, file = %file.path.display(), size = file.size_bytes, mime = %file.mime_type, "Uploading image");
        Ok(NetworkCommand::UploadImage { id, file })
    }

    pub fn remove_image(&mut self) {
        match self.workflow.remove_image() {
            Ok(Some(image)) => {
                tracing::debug!(preview = %image.preview.url, "Released preview");
                self.upload.clear();
                self.profession_cursor = 0;
                self.notify(NotificationLevel::Success, "Image removed");
            }
            Ok(None) => {}
            Err(e) => tracing::debug!(error = %e, "Remove ignored"),
        }
    }

    // ========================
    // Profession catalog
    // ========================

    /// Fetch the catalog unless it is already loaded
    fn load_professions(&mut self) -> Option<NetworkCommand> {
        if !self.professions.is_empty() {
            return None;
        }
        self.fetch_professions()
    }

    pub fn fetch_professions(&mut self) -> Option<NetworkCommand> {
        if self.professions_request.is_some() {
            return None;
        }
        let id = self.next_id();
        self.professions_request = Some(id);
        Some(NetworkCommand::FetchProfessions { id })
    }

    pub fn next_profession(&mut self) {
        if !self.professions.is_empty() {
            self.profession_cursor = (self.profession_cursor + 1) % self.professions.len();
        }
    }

    pub fn prev_profession(&mut self) {
        if !self.professions.is_empty() {
            self.profession_cursor = self
                .profession_cursor
                .checked_sub(1)
                .unwrap_or(self.professions.len() - 1);
        }
    }

    pub fn select_profession(&mut self) {
        let Some(profession) = self.professions.get(self.profession_cursor).cloned() else {
            return;
        };
        let id = profession.id.clone();
        match self.workflow.select_profession(profession) {
            Ok(()) => tracing::info!(profession = %id, "Profession selected"),
            Err(WorkflowError::SwapInFlight) => {}
            Err(e) => self.notify(NotificationLevel::Error, e.to_string()),
        }
    }

    // ========================
    // Angle + transform
    // ========================

    pub fn cycle_angle(&mut self, forward: bool) {
        if let Err(e) = self.workflow.cycle_angle(forward) {
            tracing::debug!(error = %e, "Angle change ignored");
        }
    }

    /// The "Transform My Image" action
    pub fn transform(&mut self) -> Option<NetworkCommand> {
        let id = self.next_id();
        match self.workflow.begin_swap(id) {
            Ok(request) => {
                tracing::info!(
                    id,
                    image_id = %request.image_id,
                    profession = %request.profession,
                    angle = request.angle.as_str(),
                    "Requesting face swap"
                );
                Some(NetworkCommand::SwapFace { id, request })
            }
            Err(WorkflowError::SwapInFlight) => {
                tracing::debug!("Swap already in flight, ignoring");
                None
            }
            Err(e) => {
                self.notify(NotificationLevel::Error, e.to_string());
                None
            }
        }
    }

    // ========================
    // Result actions
    // ========================

    pub fn download(&mut self) -> Option<NetworkCommand> {
        if self.download_request.is_some() {
            return None;
        }
        let Some(handoff) = &self.result else {
            self.notify(NotificationLevel::Error, "No result image available for download");
            return None;
        };
        if handoff.result.result_url.is_empty() {
            self.notify(NotificationLevel::Error, "No result image available for download");
            return None;
        }

        let url = handoff.result.result_url.clone();
        let dest = self
            .config
            .download_dir
            .join(download_file_name(&handoff.profession.name));
        let id = self.next_id();
        self.download_request = Some(id);
        tracing::info!(id, url = %url, dest = %dest.display(), "Downloading result");
        Some(NetworkCommand::DownloadResult { id, url, dest })
    }

    /// No share sheet exists in a terminal, so sharing copies the link
    pub fn share(&mut self) {
        let Some(url) = self.result.as_ref().map(|h| h.result.result_url.clone()) else {
            self.notify(NotificationLevel::Error, "No result to share");
            return;
        };
        let seq = self.next_id();
        self.clipboard = Some(ClipboardRequest { seq, text: url });
        self.notify(NotificationLevel::Success, "Link copied to clipboard!");
    }

    pub fn try_another(&mut self) -> Option<NetworkCommand> {
        self.navigate(Route::Upload)
    }

    // ========================
    // Response handling
    // ========================

    pub fn handle_response(&mut self, response: NetworkResponse) -> Option<NetworkCommand> {
        match response {
            NetworkResponse::UploadFinished { id, result } => {
                self.on_upload_finished(id, result);
                None
            }
            NetworkResponse::ProfessionsLoaded { id, result } => {
                self.on_professions_loaded(id, result);
                None
            }
            NetworkResponse::SwapFinished { id, result } => self.on_swap_finished(id, result),
            NetworkResponse::DownloadFinished { id, result } => {
                self.on_download_finished(id, result);
                None
            }
            NetworkResponse::HealthChecked { id, result } => {
                self.on_health_checked(id, result);
                None
            }
        }
    }

    fn on_upload_finished(&mut self, id: u64, result: Result<UploadResponse, ApiError>) {
        let file = match &self.upload {
            UploadWidget::Uploading { id: pending, file } if *pending == id => file.clone(),
            _ => {
                tracing::debug!(id, "Ignoring stale upload response");
                return;
            }
        };

        let outcome = result.and_then(|resp| {
            if !resp.success {
                return Err(ApiError::Domain(
                    resp.message.unwrap_or_else(|| "Upload failed".to_string()),
                ));
            }
            let image_id = resp
                .image_id
                .ok_or_else(|| ApiError::InvalidResponse("missing image_id".to_string()))?;
            Ok(UploadedImage {
                preview: PreviewRef::for_path(&file.path),
                file,
                image_id,
                face_detected: resp.face_detected.unwrap_or(false),
                landmarks: resp.landmarks.unwrap_or_default(),
            })
        });

        self.upload.finish(id, outcome.is_ok());

        match outcome {
            Ok(image) => {
                let face_detected = image.face_detected;
                tracing::info!(id, image_id = %image.image_id, face_detected, "Upload complete");
                if let Err(e) = self.workflow.image_uploaded(image) {
                    tracing::warn!(error = %e, "Upload arrived out of order");
                    self.upload.clear();
                    return;
                }
                self.profession_cursor = 0;
                self.notify(NotificationLevel::Success, "Image uploaded successfully!");
                if !face_detected {
                    self.notify(
                        NotificationLevel::Warning,
                        "No face detected in this image; results may be poor",
                    );
                }
            }
            Err(e) => {
                tracing::warn!(id, error = %e, "Upload failed");
                self.notify(NotificationLevel::Error, e.to_string());
            }
        }
    }

    fn on_professions_loaded(&mut self, id: u64, result: Result<ProfessionsResponse, ApiError>) {
        if self.professions_request != Some(id) {
            return;
        }
        self.professions_request = None;

        match result {
            Ok(resp) => {
                tracing::info!(count = resp.professions.len(), "Professions loaded");
                self.professions = resp.professions;
                if self.profession_cursor >= self.professions.len() {
                    self.profession_cursor = 0;
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load professions");
                self.notify(NotificationLevel::Error, "Failed to load professions");
            }
        }
    }

    fn on_swap_finished(
        &mut self,
        id: u64,
        result: Result<SwapResponse, ApiError>,
    ) -> Option<NetworkCommand> {
        let outcome = result.and_then(|resp| {
            if !resp.success {
                return Err(ApiError::Domain(
                    resp.message.unwrap_or_else(|| "Face swap failed".to_string()),
                ));
            }
            let result_url = resp
                .result_url
                .filter(|u| !u.is_empty())
                .ok_or_else(|| ApiError::InvalidResponse("missing result_url".to_string()))?;
            Ok(SwapResult {
                result_url: self.config.resolve_url(&result_url),
                angle: resp.angle,
                success: resp.success,
            })
        });

        match outcome {
            Ok(swap) => {
                let handoff = self.workflow.swap_succeeded(id, swap)?;
                tracing::info!(id, url = %handoff.result.result_url, "Face swap complete");
                self.pending_handoff = Some(handoff);
                self.navigate(Route::Result)
            }
            Err(e) => {
                if self.workflow.swap_failed(id) {
                    tracing::warn!(id, error = %e, "Face swap failed");
                    let message = match e {
                        ApiError::Domain(msg) => msg,
                        ApiError::Transport(_) | ApiError::Status { .. } => {
                            "Failed to process face swap".to_string()
                        }
                        other => other.to_string(),
                    };
                    self.notify(NotificationLevel::Error, message);
                }
                None
            }
        }
    }

    fn on_download_finished(&mut self, id: u64, result: Result<PathBuf, ApiError>) {
        if self.download_request != Some(id) {
            return;
        }
        self.download_request = None;

        match result {
            Ok(path) => {
                tracing::info!(id, path = %path.display(), "Download complete");
                self.last_download = Some(path);
                self.notify(NotificationLevel::Success, "Image downloaded successfully!");
            }
            Err(e) => {
                tracing::warn!(id, error = %e, "Download failed");
                self.notify(NotificationLevel::Error, "Failed to download image");
            }
        }
    }

    fn on_health_checked(&mut self, id: u64, result: Result<HealthResponse, ApiError>) {
        if self.health_request != Some(id) {
            return;
        }
        self.health_request = None;
        self.api_health = match result {
            Ok(health) => ApiHealth::Healthy(health.status),
            Err(e) => {
                tracing::warn!(error = %e, "Health check failed");
                ApiHealth::Unreachable(e.to_string())
            }
        };
    }
}

/// File name the result is saved under, e.g. `ai-swap-Doctor.jpg`
pub fn download_file_name(profession_name: &str) -> String {
    let name: String = profession_name
        .chars()
        .map(|c| if matches!(c, '/' | '\\' | ':') { '-' } else { c })
        .collect();
    let name = if name.trim().is_empty() { "result" } else { name.trim() };
    format!("ai-swap-{}.jpg", name)
}
