//! Network messages - communication between App and Network layers

use std::path::PathBuf;

use crate::error::ApiError;
use crate::models::{
    HealthResponse, ProfessionsResponse, SelectedFile, SwapRequest, SwapResponse, UploadResponse,
};

/// Commands sent from App layer to Network layer
#[derive(Debug, Clone)]
pub enum NetworkCommand {
    /// Multipart upload of the selected image
    UploadImage { id: u64, file: SelectedFile },
    /// Fetch the profession catalog
    FetchProfessions { id: u64 },
    /// Request the face swap
    SwapFace { id: u64, request: SwapRequest },
    /// Save the result image to disk
    DownloadResult { id: u64, url: String, dest: PathBuf },
    /// Probe the service health endpoint
    HealthCheck { id: u64 },
    /// Shutdown the network actor
    Shutdown,
}

/// Responses sent from Network layer to App layer
#[derive(Debug, Clone)]
pub enum NetworkResponse {
    UploadFinished {
        id: u64,
        result: Result<UploadResponse, ApiError>,
    },
    ProfessionsLoaded {
        id: u64,
        result: Result<ProfessionsResponse, ApiError>,
    },
    SwapFinished {
        id: u64,
        result: Result<SwapResponse, ApiError>,
    },
    DownloadFinished {
        id: u64,
        result: Result<PathBuf, ApiError>,
    },
    HealthChecked {
        id: u64,
        result: Result<HealthResponse, ApiError>,
    },
}

impl NetworkResponse {
    /// Get the request ID from the response
    pub fn id(&self) -> u64 {
        match self {
            NetworkResponse::UploadFinished { id, .. } => *id,
            NetworkResponse::ProfessionsLoaded { id, .. } => *id,
            NetworkResponse::SwapFinished { id, .. } => *id,
            NetworkResponse::DownloadFinished { id, .. } => *id,
            NetworkResponse::HealthChecked { id, .. } => *id,
        }
    }

    pub fn is_ok(&self) -> bool {
        match self {
            NetworkResponse::UploadFinished { result, .. } => result.is_ok(),
            NetworkResponse::ProfessionsLoaded { result, .. } => result.is_ok(),
            NetworkResponse::SwapFinished { result, .. } => result.is_ok(),
            NetworkResponse::DownloadFinished { result, .. } => result.is_ok(),
            NetworkResponse::HealthChecked { result, .. } => result.is_ok(),
        }
    }
}
