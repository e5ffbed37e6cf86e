//! App state - pure data structure with no network I/O

use std::collections::VecDeque;

use chrono::{DateTime, Utc};

use crate::config::Config;
use crate::constants::MAX_NOTIFICATIONS;
use crate::messages::ui_events::Route;
use crate::messages::RenderState;
use crate::models::Profession;
use crate::upload::UploadWidget;
use crate::workflow::{ResultHandoff, Workflow};

/// Severity of a transient notification
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// A toast-style message shown for a limited time
#[derive(Clone, Debug, PartialEq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

/// Health of the face swap service as last probed
#[derive(Clone, Debug, Default, PartialEq)]
pub enum ApiHealth {
    #[default]
    Unknown,
    Checking,
    Healthy(String),
    Unreachable(String),
}

/// Text the UI layer should place on the clipboard
#[derive(Clone, Debug, PartialEq)]
pub struct ClipboardRequest {
    pub seq: u64,
    pub text: String,
}

/// Main application state - pure data, no I/O
pub struct AppState {
    pub config: Config,

    // Navigation
    pub route: Route,
    pub show_help: bool,

    // Upload widget
    pub upload: UploadWidget,
    pub show_picker: bool,
    pub picker_input: String,

    // Workflow
    pub workflow: Workflow,
    pub professions: Vec<Profession>,
    pub professions_request: Option<u64>,
    pub profession_cursor: usize,

    // Result
    /// One-shot payload waiting for the result route to pick it up
    pub pending_handoff: Option<ResultHandoff>,
    pub result: Option<ResultHandoff>,
    pub download_request: Option<u64>,
    pub last_download: Option<std::path::PathBuf>,

    // Service
    pub api_health: ApiHealth,
    pub health_request: Option<u64>,

    // Overlays
    pub notifications: VecDeque<Notification>,
    pub clipboard: Option<ClipboardRequest>,

    pub next_request_id: u64,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl AppState {
    pub fn new(config: Config) -> Self {
        AppState {
            config,
            route: Route::Home,
            show_help: false,
            upload: UploadWidget::default(),
            show_picker: false,
            picker_input: String::new(),
            workflow: Workflow::new(),
            professions: Vec::new(),
            professions_request: None,
            profession_cursor: 0,
            pending_handoff: None,
            result: None,
            download_request: None,
            last_download: None,
            api_health: ApiHealth::Unknown,
            health_request: None,
            notifications: VecDeque::with_capacity(MAX_NOTIFICATIONS),
            clipboard: None,
            next_request_id: 1,
        }
    }

    /// Generate a unique request ID
    pub fn next_id(&mut self) -> u64 {
        let id = self.next_request_id;
        self.next_request_id += 1;
        id
    }

    pub fn notify(&mut self, level: NotificationLevel, message: impl Into<String>) {
        if self.notifications.len() >= MAX_NOTIFICATIONS {
            self.notifications.pop_front();
        }
        self.notifications.push_back(Notification {
            level,
            message: message.into(),
            created_at: Utc::now(),
        });
    }

    /// Drop notifications older than the configured TTL. Returns true if any were removed.
    pub fn prune_notifications(&mut self, now: DateTime<Utc>) -> bool {
        let ttl = chrono::Duration::from_std(self.config.notification_ttl())
            .unwrap_or_else(|_| chrono::Duration::seconds(4));
        let before = self.notifications.len();
        self.notifications.retain(|n| now - n.created_at < ttl);
        self.notifications.len() != before
    }

    pub fn latest_notification(&self) -> Option<&Notification> {
        self.notifications.back()
    }

    /// Convert state to RenderState for UI
    pub fn to_render_state(&self) -> RenderState {
        let uploading_file = match &self.upload {
            UploadWidget::Uploading { file, .. } => Some(file.file_name.clone()),
            _ => None,
        };

        RenderState {
            route: self.route,
            api_base_url: self.config.api_base_url.clone(),
            api_health: self.api_health.clone(),
            is_uploading: self.upload.is_uploading(),
            uploading_file,
            show_picker: self.show_picker,
            picker_input: self.picker_input.clone(),
            step: self.workflow.step(),
            image: self.workflow.image().cloned(),
            professions: self.professions.clone(),
            professions_loading: self.professions_request.is_some(),
            profession_cursor: self.profession_cursor,
            selected_profession: self.workflow.profession().cloned(),
            angle: self.workflow.angle(),
            is_swapping: self.workflow.is_swapping(),
            result: self.result.clone(),
            is_downloading: self.download_request.is_some(),
            last_download: self.last_download.clone(),
            notifications: self.notifications.iter().cloned().collect(),
            show_help: self.show_help,
            clipboard: self.clipboard.clone(),
        }
    }
}
