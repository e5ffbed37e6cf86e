//! Render state - data structure sent from App layer to UI for rendering

use std::path::PathBuf;

use crate::app::state::{ApiHealth, ClipboardRequest, Notification};
use crate::messages::ui_events::{KeyContext, Route};
use crate::models::{Angle, Profession, UploadedImage};
use crate::workflow::{ResultHandoff, WorkflowStep};

/// Complete state needed by the UI to render
#[derive(Debug, Clone, Default)]
pub struct RenderState {
    pub route: Route,
    pub api_base_url: String,
    pub api_health: ApiHealth,

    // Upload widget
    pub is_uploading: bool,
    pub uploading_file: Option<String>,
    pub show_picker: bool,
    pub picker_input: String,

    // Workflow
    pub step: WorkflowStep,
    pub image: Option<UploadedImage>,
    pub professions: Vec<Profession>,
    pub professions_loading: bool,
    pub profession_cursor: usize,
    pub selected_profession: Option<Profession>,
    pub angle: Angle,
    pub is_swapping: bool,

    // Result
    pub result: Option<ResultHandoff>,
    pub is_downloading: bool,
    pub last_download: Option<PathBuf>,

    // Overlays
    pub notifications: Vec<Notification>,
    pub show_help: bool,

    /// Clipboard write the UI layer performs once per `seq`
    pub clipboard: Option<ClipboardRequest>,
}

impl RenderState {
    pub fn key_context(&self) -> KeyContext {
        KeyContext {
            route: self.route,
            step: self.step,
            show_help: self.show_help,
            show_picker: self.show_picker,
        }
    }
}
