//! Workflow controller - the linear upload → profession → angle process
//!
//! Pure state machine with no I/O. The app layer drives it with user actions
//! and network outcomes; every transition is an explicit method that either
//! succeeds or returns a [`WorkflowError`] leaving the state untouched.
//!
//! ```text
//! AwaitingImage --image_uploaded--> AwaitingProfession
//!     ^                                  | select_profession
//!     |                                  v
//!     +--------remove_image------ AwaitingAngleAndConfirm --swap_succeeded--> Completed
//! ```

use crate::error::WorkflowError;
use crate::models::{Angle, PreviewRef, Profession, SwapRequest, SwapResult, UploadedImage};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum WorkflowStep {
    #[default]
    AwaitingImage,
    AwaitingProfession,
    AwaitingAngleAndConfirm,
    Completed,
}

impl WorkflowStep {
    /// 1-based position shown in the progress indicator
    pub fn number(&self) -> u8 {
        match self {
            WorkflowStep::AwaitingImage => 1,
            WorkflowStep::AwaitingProfession => 2,
            WorkflowStep::AwaitingAngleAndConfirm => 3,
            WorkflowStep::Completed => 4,
        }
    }

    fn describe(&self) -> &'static str {
        match self {
            WorkflowStep::AwaitingImage => "awaiting an image",
            WorkflowStep::AwaitingProfession => "awaiting a profession",
            WorkflowStep::AwaitingAngleAndConfirm => "awaiting confirmation",
            WorkflowStep::Completed => "completed",
        }
    }
}

/// Payload handed to the result screen, exactly once
#[derive(Clone, Debug, PartialEq)]
pub struct ResultHandoff {
    pub result: SwapResult,
    pub original_image: PreviewRef,
    pub profession: Profession,
}

#[derive(Clone, Debug, Default)]
pub struct Workflow {
    step: WorkflowStep,
    image: Option<UploadedImage>,
    profession: Option<Profession>,
    angle: Angle,
    /// Token of the outstanding swap request, if any
    swap_in_flight: Option<u64>,
}

impl Workflow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(&self) -> WorkflowStep {
        self.step
    }

    pub fn image(&self) -> Option<&UploadedImage> {
        self.image.as_ref()
    }

    pub fn image_id(&self) -> Option<&str> {
        self.image.as_ref().map(|i| i.image_id.as_str())
    }

    pub fn profession(&self) -> Option<&Profession> {
        self.profession.as_ref()
    }

    pub fn angle(&self) -> Angle {
        self.angle
    }

    pub fn is_swapping(&self) -> bool {
        self.swap_in_flight.is_some()
    }

    fn invalid(&self, action: &'static str) -> WorkflowError {
        WorkflowError::InvalidTransition {
            action,
            step: self.step.describe(),
        }
    }

    /// Step 1 → 2. `face_detected` is not checked here.
    pub fn image_uploaded(&mut self, image: UploadedImage) -> Result<(), WorkflowError> {
        if self.step != WorkflowStep::AwaitingImage {
            return Err(self.invalid("accept an upload"));
        }
        self.image = Some(image);
        self.step = WorkflowStep::AwaitingProfession;
        Ok(())
    }

    /// Step 2 → 3, or re-selection within step 3
    pub fn select_profession(&mut self, profession: Profession) -> Result<(), WorkflowError> {
        match self.step {
            WorkflowStep::AwaitingProfession | WorkflowStep::AwaitingAngleAndConfirm => {}
            _ => return Err(self.invalid("select a profession")),
        }
        if self.is_swapping() {
            return Err(WorkflowError::SwapInFlight);
        }

        if !profession.supports(self.angle) {
            self.angle = Angle::ALL
                .into_iter()
                .find(|a| profession.supports(*a))
                .unwrap_or_default();
        }
        self.profession = Some(profession);
        self.step = WorkflowStep::AwaitingAngleAndConfirm;
        Ok(())
    }

    pub fn select_angle(&mut self, angle: Angle) -> Result<(), WorkflowError> {
        if self.step != WorkflowStep::AwaitingAngleAndConfirm {
            return Err(self.invalid("choose an angle"));
        }
        if self.is_swapping() {
            return Err(WorkflowError::SwapInFlight);
        }
        self.angle = angle;
        Ok(())
    }

    /// Move to the next (or previous) angle the profession supports
    pub fn cycle_angle(&mut self, forward: bool) -> Result<Angle, WorkflowError> {
        let mut angle = self.angle;
        for _ in 0..Angle::ALL.len() {
            angle = if forward { angle.next() } else { angle.prev() };
            let supported = self.profession.as_ref().map_or(true, |p| p.supports(angle));
            if supported {
                break;
            }
        }
        self.select_angle(angle)?;
        Ok(angle)
    }

    /// Back to step 1 from anywhere before completion
    pub fn remove_image(&mut self) -> Result<Option<UploadedImage>, WorkflowError> {
        if self.step == WorkflowStep::Completed {
            return Err(self.invalid("remove the image"));
        }
        self.profession = None;
        self.swap_in_flight = None;
        self.step = WorkflowStep::AwaitingImage;
        Ok(self.image.take())
    }

    /// Precondition check for "transform"; on success the token occupies the
    /// single in-flight slot until the outcome is reported.
    pub fn begin_swap(&mut self, token: u64) -> Result<SwapRequest, WorkflowError> {
        if self.step == WorkflowStep::Completed {
            return Err(self.invalid("transform"));
        }
        let (Some(image), Some(profession)) = (&self.image, &self.profession) else {
            return Err(WorkflowError::MissingSelection);
        };
        if self.swap_in_flight.is_some() {
            return Err(WorkflowError::SwapInFlight);
        }

        let request = SwapRequest {
            image_id: image.image_id.clone(),
            profession: profession.id.clone(),
            angle: self.angle,
        };
        self.swap_in_flight = Some(token);
        Ok(request)
    }

    /// Step 3 → Completed. `None` if `token` is not the outstanding request.
    pub fn swap_succeeded(&mut self, token: u64, result: SwapResult) -> Option<ResultHandoff> {
        if self.swap_in_flight != Some(token) {
            return None;
        }
        self.swap_in_flight = None;

        let handoff = ResultHandoff {
            result,
            original_image: self.image.as_ref()?.preview.clone(),
            profession: self.profession.clone()?,
        };
        self.step = WorkflowStep::Completed;
        Some(handoff)
    }

    /// Stay in step 3 so the user can retry. Returns whether `token` was current.
    pub fn swap_failed(&mut self, token: u64) -> bool {
        if self.swap_in_flight != Some(token) {
            return false;
        }
        self.swap_in_flight = None;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SelectedFile;
    use std::path::PathBuf;

    fn uploaded(id: &str) -> UploadedImage {
        UploadedImage {
            file: SelectedFile {
                path: PathBuf::from("/photos/portrait.jpg"),
                file_name: "portrait.jpg".into(),
                mime_type: "image/jpeg".into(),
                size_bytes: 2 * 1024 * 1024,
            },
            preview: PreviewRef { url: "file:///photos/portrait.jpg".into() },
            image_id: id.into(),
            face_detected: true,
            landmarks: serde_json::Value::Null,
        }
    }

    fn doctor() -> Profession {
        Profession {
            id: "doctor".into(),
            name: "Doctor".into(),
            description: "Medical professional".into(),
            angles: vec![],
        }
    }

    fn at_step_three() -> Workflow {
        let mut wf = Workflow::new();
        wf.image_uploaded(uploaded("abc123")).unwrap();
        wf.select_profession(doctor()).unwrap();
        wf
    }

    #[test]
    fn test_upload_advances_to_profession() {
        let mut wf = Workflow::new();
        assert_eq!(wf.step(), WorkflowStep::AwaitingImage);
        wf.image_uploaded(uploaded("abc123")).unwrap();
        assert_eq!(wf.step(), WorkflowStep::AwaitingProfession);
        assert_eq!(wf.image_id(), Some("abc123"));
    }

    #[test]
    fn test_face_not_detected_still_advances() {
        let mut wf = Workflow::new();
        let mut image = uploaded("nf1");
        image.face_detected = false;
        wf.image_uploaded(image).unwrap();
        assert_eq!(wf.step(), WorkflowStep::AwaitingProfession);
    }

    #[test]
    fn test_second_upload_is_rejected() {
        let mut wf = Workflow::new();
        wf.image_uploaded(uploaded("a")).unwrap();
        assert!(matches!(
            wf.image_uploaded(uploaded("b")),
            Err(WorkflowError::InvalidTransition { .. })
        ));
        assert_eq!(wf.image_id(), Some("a"));
    }

    #[test]
    fn test_profession_requires_image() {
        let mut wf = Workflow::new();
        assert!(wf.select_profession(doctor()).is_err());
        assert!(wf.profession().is_none());
    }

    #[test]
    fn test_select_profession_advances() {
        let wf = at_step_three();
        assert_eq!(wf.step(), WorkflowStep::AwaitingAngleAndConfirm);
        assert_eq!(wf.profession().map(|p| p.id.as_str()), Some("doctor"));
        assert_eq!(wf.angle(), Angle::Front);
    }

    #[test]
    fn test_transform_without_profession_fails_fast() {
        let mut wf = Workflow::new();
        wf.image_uploaded(uploaded("abc123")).unwrap();
        assert_eq!(wf.begin_swap(1), Err(WorkflowError::MissingSelection));
        assert!(!wf.is_swapping());
    }

    #[test]
    fn test_only_one_swap_in_flight() {
        let mut wf = at_step_three();
        assert!(wf.begin_swap(1).is_ok());
        assert_eq!(wf.begin_swap(2), Err(WorkflowError::SwapInFlight));
        assert!(wf.is_swapping());
    }

    #[test]
    fn test_swap_request_carries_selection() {
        let mut wf = at_step_three();
        wf.select_angle(Angle::Side).unwrap();
        let req = wf.begin_swap(9).unwrap();
        assert_eq!(
            req,
            SwapRequest {
                image_id: "abc123".into(),
                profession: "doctor".into(),
                angle: Angle::Side,
            }
        );
    }

    #[test]
    fn test_failure_allows_retry() {
        let mut wf = at_step_three();
        wf.begin_swap(1).unwrap();
        assert!(!wf.swap_failed(2));
        assert!(wf.swap_failed(1));
        assert_eq!(wf.step(), WorkflowStep::AwaitingAngleAndConfirm);
        assert!(wf.begin_swap(3).is_ok());
    }

    #[test]
    fn test_success_hands_off_once() {
        let mut wf = at_step_three();
        wf.begin_swap(4).unwrap();
        let result = SwapResult {
            result_url: "https://cdn.example.com/out.jpg".into(),
            angle: Some("front".into()),
            success: true,
        };

        assert!(wf.swap_succeeded(5, result.clone()).is_none());
        let handoff = wf.swap_succeeded(4, result.clone()).unwrap();
        assert_eq!(handoff.result, result);
        assert_eq!(handoff.profession.id, "doctor");
        assert_eq!(handoff.original_image.url, "file:///photos/portrait.jpg");
        assert_eq!(wf.step(), WorkflowStep::Completed);
        assert!(wf.swap_succeeded(4, result).is_none());
    }

    #[test]
    fn test_remove_image_resets_from_step_three() {
        let mut wf = at_step_three();
        let removed = wf.remove_image().unwrap();
        assert_eq!(removed.map(|i| i.image_id), Some("abc123".to_string()));
        assert_eq!(wf.step(), WorkflowStep::AwaitingImage);
        assert!(wf.profession().is_none());
        assert!(wf.image().is_none());
    }

    #[test]
    fn test_remove_during_swap_drops_late_result() {
        let mut wf = at_step_three();
        wf.begin_swap(1).unwrap();
        wf.remove_image().unwrap();
        let result = SwapResult { result_url: "u".into(), angle: None, success: true };
        assert!(wf.swap_succeeded(1, result).is_none());
        assert_eq!(wf.step(), WorkflowStep::AwaitingImage);
    }

    #[test]
    fn test_angle_cycling_skips_unsupported() {
        let mut wf = Workflow::new();
        wf.image_uploaded(uploaded("abc")).unwrap();
        let mut p = doctor();
        p.angles = vec!["side".into(), "back".into()];
        wf.select_profession(p).unwrap();

        assert_eq!(wf.angle(), Angle::Side);
        assert_eq!(wf.cycle_angle(true).unwrap(), Angle::Back);
        assert_eq!(wf.cycle_angle(true).unwrap(), Angle::Side);
        assert_eq!(wf.cycle_angle(false).unwrap(), Angle::Back);
    }

    #[test]
    fn test_selection_locked_while_swapping() {
        let mut wf = at_step_three();
        wf.begin_swap(1).unwrap();
        assert_eq!(wf.select_angle(Angle::Back), Err(WorkflowError::SwapInFlight));
        assert_eq!(wf.select_profession(doctor()), Err(WorkflowError::SwapInFlight));
    }
}
