//! # AI-Swap TUI
//!
//! A terminal client for the AI-Swap professional face swapping service.
//!
//! ## Features
//! - Image selection by drag-and-drop (pasted paths) or a path picker
//! - Client-side validation: image MIME type, 10 MB limit, single file
//! - Three-step workflow: upload, choose a profession, pick an angle
//! - Result screen with download and link sharing
//! - Service health check on start-up
//!
//! ## Architecture
//! Actor-based with channels:
//! - UI Layer (Ratatui) - synchronous
//! - App Layer (State machine)
//! - Network Layer (Tokio runtime)

pub mod models;
pub mod error;
pub mod config;
pub mod constants;
pub mod upload;
pub mod workflow;
pub mod ui;
pub mod messages;
pub mod app;
pub mod network;

// Re-export commonly used types
pub use models::{Angle, Profession, SelectedFile, SwapRequest, SwapResult, UploadedImage};
pub use error::{ApiError, UploadError, WorkflowError};
pub use config::Config;
pub use workflow::{Workflow, WorkflowStep};
pub use messages::{UiEvent, NetworkCommand, NetworkResponse, RenderState};
pub use app::{AppState, AppActor};
pub use network::{ApiClient, NetworkActor};
