use crate::capture::sampler::EncodedFrame;
use crate::capture::station::CaptureStation;
use crate::error::AppError;
use crate::remote::client::AttendanceApi;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, instrument};
use utoipa::ToSchema;

pub const MIN_ENROLLMENT_FRAMES: usize = 3;
/// Oldest frames are dropped beyond this.
pub const MAX_ENROLLMENT_FRAMES: usize = 10;

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentRequest {
    #[schema(example = "Sreyan Panda")]
    pub student_name: String,
    #[schema(example = "S004")]
    pub student_id: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DraftStatus {
    pub frames: usize,
    pub required: usize,
    pub limit: usize,
    pub ready: bool,
    /// Data URL of the latest capture, for the thumbnail strip.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview: Option<String>,
}

/// Frames collected for one student before they are sent for enrollment.
pub struct EnrollmentService {
    station: Arc<CaptureStation>,
    api: AttendanceApi,
    draft: Mutex<Vec<EncodedFrame>>,
}

impl EnrollmentService {
    pub fn new(station: Arc<CaptureStation>, api: AttendanceApi) -> Self {
        Self {
            station,
            api,
            draft: Mutex::new(Vec::new()),
        }
    }

    fn status(frames: usize, preview: Option<String>) -> DraftStatus {
        DraftStatus {
            frames,
            required: MIN_ENROLLMENT_FRAMES,
            limit: MAX_ENROLLMENT_FRAMES,
            ready: frames >= MIN_ENROLLMENT_FRAMES,
            preview,
        }
    }

    pub async fn draft(&self) -> DraftStatus {
        Self::status(self.draft.lock().await.len(), None)
    }

    pub async fn capture(&self) -> Result<DraftStatus, AppError> {
        let (frame, _) = self.station.capture().await?;
        let preview = frame.to_data_url();
        let mut draft = self.draft.lock().await;
        if draft.len() >= MAX_ENROLLMENT_FRAMES {
            let excess = draft.len() + 1 - MAX_ENROLLMENT_FRAMES;
            draft.drain(..excess);
        }
        draft.push(frame);
        Ok(Self::status(draft.len(), Some(preview)))
    }

    pub async fn reset(&self) -> DraftStatus {
        let mut draft = self.draft.lock().await;
        draft.clear();
        Self::status(0, None)
    }

    /// Sends the draft; it is cleared only when the backend accepts it.
    #[instrument(name = "enroll", skip(self, req), fields(student_id = %req.student_id))]
    pub async fn submit(&self, req: EnrollmentRequest) -> Result<String, AppError> {
        let name = req.student_name.trim();
        let id = req.student_id.trim();
        if name.is_empty() || id.is_empty() {
            return Err(AppError::BadRequest(
                "Student name and ID are required".into(),
            ));
        }

        let mut draft = self.draft.lock().await;
        if draft.len() < MIN_ENROLLMENT_FRAMES {
            return Err(AppError::BadRequest(format!(
                "Capture at least {MIN_ENROLLMENT_FRAMES} images, {} so far",
                draft.len()
            )));
        }

        let message = self.api.enroll_face(name, id, &draft).await?;
        info!(frames = draft.len(), "student enrolled");
        draft.clear();
        Ok(message)
    }
}
