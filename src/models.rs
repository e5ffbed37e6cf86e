use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Viewing angle of the professional template
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Angle {
    #[default]
    Front,
    Side,
    ThreeQuarter,
    Back,
}

impl Angle {
    pub const ALL: [Angle; 4] = [Angle::Front, Angle::Side, Angle::ThreeQuarter, Angle::Back];

    /// Wire name sent to the service
    pub fn as_str(&self) -> &'static str {
        match self {
            Angle::Front => "front",
            Angle::Side => "side",
            Angle::ThreeQuarter => "three_quarter",
            Angle::Back => "back",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Angle::Front => "Front View",
            Angle::Side => "Side View",
            Angle::ThreeQuarter => "Three Quarter",
            Angle::Back => "Back View",
        }
    }

    pub fn next(&self) -> Angle {
        match self {
            Angle::Front => Angle::Side,
            Angle::Side => Angle::ThreeQuarter,
            Angle::ThreeQuarter => Angle::Back,
            Angle::Back => Angle::Front,
        }
    }

    pub fn prev(&self) -> Angle {
        match self {
            Angle::Front => Angle::Back,
            Angle::Side => Angle::Front,
            Angle::ThreeQuarter => Angle::Side,
            Angle::Back => Angle::ThreeQuarter,
        }
    }
}

/// A professional template category from the service catalog
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Profession {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub angles: Vec<String>,
}

impl Profession {
    /// An empty angle list means every angle is offered
    pub fn supports(&self, angle: Angle) -> bool {
        self.angles.is_empty() || self.angles.iter().any(|a| a == angle.as_str())
    }

    pub fn angle_count(&self) -> usize {
        if self.angles.is_empty() {
            Angle::ALL.len()
        } else {
            self.angles.len()
        }
    }
}

/// A local file picked or dropped by the user
#[derive(Clone, Debug, PartialEq)]
pub struct SelectedFile {
    pub path: PathBuf,
    pub file_name: String,
    pub mime_type: String,
    pub size_bytes: u64,
}

/// Reference to the locally shown preview of the uploaded image
#[derive(Clone, Debug, PartialEq)]
pub struct PreviewRef {
    pub url: String,
}

impl PreviewRef {
    pub fn for_path(path: &Path) -> Self {
        let absolute = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
        PreviewRef {
            url: format!("file://{}", absolute.display()),
        }
    }
}

/// The image accepted by the service, with its server-issued identity
#[derive(Clone, Debug, PartialEq)]
pub struct UploadedImage {
    pub file: SelectedFile,
    pub preview: PreviewRef,
    pub image_id: String,
    pub face_detected: bool,
    /// Passed through untouched; only the service interprets it
    pub landmarks: serde_json::Value,
}

/// Outcome of a completed swap
#[derive(Clone, Debug, PartialEq)]
pub struct SwapResult {
    pub result_url: String,
    pub angle: Option<String>,
    pub success: bool,
}

impl SwapResult {
    /// Angle label for the result details, e.g. "three quarter"
    pub fn angle_label(&self) -> String {
        self.angle
            .as_deref()
            .map(|a| a.replace('_', " "))
            .unwrap_or_else(|| "Front".to_string())
    }
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Clone, Debug, Deserialize)]
pub struct UploadResponse {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub image_id: Option<String>,
    #[serde(default)]
    pub face_detected: Option<bool>,
    #[serde(default)]
    pub landmarks: Option<serde_json::Value>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct ProfessionsResponse {
    #[serde(default)]
    pub professions: Vec<Profession>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SwapRequest {
    pub image_id: String,
    pub profession: String,
    pub angle: Angle,
}

#[derive(Clone, Debug, Deserialize)]
pub struct SwapResponse {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub result_url: Option<String>,
    #[serde(default)]
    pub profession: Option<String>,
    #[serde(default)]
    pub angle: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    #[serde(default)]
    pub service: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_swap_request_body_shape() {
        let req = SwapRequest {
            image_id: "abc123".into(),
            profession: "doctor".into(),
            angle: Angle::ThreeQuarter,
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"image_id": "abc123", "profession": "doctor", "angle": "three_quarter"})
        );
    }

    #[test]
    fn test_profession_without_angles_supports_all() {
        let p: Profession = serde_json::from_str(r#"{"id":"doctor","name":"Doctor"}"#).unwrap();
        assert!(p.supports(Angle::Back));
        assert_eq!(p.angle_count(), 4);

        let limited = Profession { angles: vec!["front".into()], ..p };
        assert!(limited.supports(Angle::Front));
        assert!(!limited.supports(Angle::Side));
    }

    #[test]
    fn test_upload_response_requires_success() {
        assert!(serde_json::from_str::<UploadResponse>(r#"{"image_id":"x"}"#).is_err());
    }

    #[test]
    fn test_angle_label() {
        let mut r = SwapResult { result_url: "u".into(), angle: Some("three_quarter".into()), success: true };
        assert_eq!(r.angle_label(), "three quarter");
        r.angle = None;
        assert_eq!(r.angle_label(), "Front");
    }
}
