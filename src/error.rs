//! Error taxonomy
//!
//! Three families map onto how failures reach the user:
//! - [`UploadError`]: local validation, rejected before any request
//! - [`WorkflowError`]: missing selections or out-of-order actions
//! - [`ApiError`]: transport and domain failures from the service

use thiserror::Error;

/// Client-side validation failures raised by the upload widget
#[derive(Error, Debug, Clone, PartialEq)]
pub enum UploadError {
    #[error("No file selected")]
    NoFile,

    #[error("Please drop a single image")]
    MultipleFiles,

    #[error("Please upload an image file (JPEG, PNG, WebP)")]
    NotAnImage { mime_type: String },

    #[error("File size must be less than 10MB")]
    TooLarge { size_bytes: u64 },

    #[error("Cannot read {path}: {reason}")]
    Unreadable { path: String, reason: String },

    #[error("An upload is already in progress")]
    Busy,

    #[error("Remove the current image before uploading another")]
    ImagePresent,
}

/// Precondition and transition failures of the workflow controller
#[derive(Error, Debug, Clone, PartialEq)]
pub enum WorkflowError {
    #[error("Please select an image and profession")]
    MissingSelection,

    #[error("A transformation is already in progress")]
    SwapInFlight,

    #[error("Cannot {action} while {step}")]
    InvalidTransition {
        action: &'static str,
        step: &'static str,
    },
}

/// Failures talking to the face swap service
#[derive(Error, Debug, Clone)]
pub enum ApiError {
    /// Network unreachable, timeout, or any other request-level failure
    #[error("{0}")]
    Transport(String),

    /// Non-success HTTP status without a usable body
    #[error("Server returned HTTP {status}")]
    Status { status: u16 },

    /// Body did not match the expected contract
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// `success: false` in an otherwise valid response
    #[error("{0}")]
    Domain(String),

    #[error("IO error: {0}")]
    Io(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        let msg = if e.is_timeout() {
            "Request timed out".to_string()
        } else if e.is_connect() {
            format!("Connection failed: {}", e)
        } else if e.is_decode() {
            return ApiError::InvalidResponse(e.to_string());
        } else {
            format!("Request failed: {}", e)
        };
        ApiError::Transport(msg)
    }
}

impl From<std::io::Error> for ApiError {
    fn from(e: std::io::Error) -> Self {
        ApiError::Io(e.to_string())
    }
}
