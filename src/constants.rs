//! Application constants
//!
//! Centralized location for magic strings and configuration defaults.

/// Default base URL of the face swap service
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

pub const DEFAULT_UPLOAD_PATH: &str = "/api/upload";
pub const DEFAULT_PROFESSIONS_PATH: &str = "/api/professions";
pub const DEFAULT_SWAP_PATH: &str = "/api/swap";
pub const DEFAULT_HEALTH_PATH: &str = "/health";

/// Request timeout applied to every service call
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// How long a notification stays on screen
pub const DEFAULT_NOTIFICATION_TTL_SECS: u64 = 4;

/// Largest image the upload widget accepts (10 MiB)
pub const MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

/// Notifications kept on screen at once
pub const MAX_NOTIFICATIONS: usize = 3;

pub const DEFAULT_LOG_FILE: &str = "ai-swap.log";

/// Directory under $HOME holding config.yaml
pub const CONFIG_DIR_NAME: &str = ".ai-swap";

pub const ENV_API_URL: &str = "AI_SWAP_API_URL";
pub const ENV_DOWNLOAD_DIR: &str = "AI_SWAP_DOWNLOAD_DIR";

/// Application name
pub const APP_NAME: &str = "AI-Swap";

/// Application version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");
