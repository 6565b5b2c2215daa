use crate::capture::media::{CameraHandle, FacingMode, MediaDevice};
use crate::capture::sampler::{EncodedFrame, FrameSampler};
use crate::error::AppError;
use serde::Serialize;
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::info;
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CameraStatus {
    #[schema(example = "active")]
    pub state: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub facing_mode: FacingMode,
    pub tracks: usize,
}

/// The kiosk camera, shared by the scan and enrollment flows.
///
/// Every acquisition gets a fresh cancellation token; stopping the camera
/// cancels it so in-flight scans started on that stream stop as well.
pub struct CaptureStation {
    camera: Mutex<CameraHandle>,
    sampler: FrameSampler,
    switch_delay: Duration,
    lifecycle: StdMutex<CancellationToken>,
}

impl CaptureStation {
    pub fn new(device: Arc<dyn MediaDevice>, sampler: FrameSampler, switch_delay: Duration) -> Self {
        Self {
            camera: Mutex::new(CameraHandle::new(device)),
            sampler,
            switch_delay,
            lifecycle: StdMutex::new(CancellationToken::new()),
        }
    }

    fn status_of(camera: &CameraHandle) -> CameraStatus {
        CameraStatus {
            state: camera.state().as_str(),
            message: camera.state().message().map(str::to_string),
            facing_mode: camera.facing(),
            tracks: camera.tracks(),
        }
    }

    fn renew_lifecycle(&self) {
        let mut token = self.lifecycle.lock().unwrap_or_else(|e| e.into_inner());
        token.cancel();
        *token = CancellationToken::new();
    }

    /// Token cancelled when the current stream goes away.
    pub fn lifecycle(&self) -> CancellationToken {
        self.lifecycle
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .child_token()
    }

    pub async fn status(&self) -> CameraStatus {
        Self::status_of(&*self.camera.lock().await)
    }

    pub async fn start(&self, facing: Option<FacingMode>) -> Result<CameraStatus, AppError> {
        let mut camera = self.camera.lock().await;
        let facing = facing.unwrap_or(camera.facing());
        camera.start(facing).await?;
        Ok(Self::status_of(&camera))
    }

    pub async fn stop(&self) -> CameraStatus {
        let mut camera = self.camera.lock().await;
        camera.stop();
        self.renew_lifecycle();
        Self::status_of(&camera)
    }

    pub async fn switch(&self) -> Result<CameraStatus, AppError> {
        let mut camera = self.camera.lock().await;
        self.renew_lifecycle();
        camera.switch(self.switch_delay).await?;
        Ok(Self::status_of(&camera))
    }

    /// Snapshot of the current frame together with the token of the stream it
    /// came from.
    pub async fn capture(&self) -> Result<(EncodedFrame, CancellationToken), AppError> {
        let raw = self.camera.lock().await.read_frame().await?;
        let frame = self.sampler.sample(raw)?;
        Ok((frame, self.lifecycle()))
    }

    pub async fn shutdown(&self) {
        self.stop().await;
        info!("capture station shut down");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::media::MediaError;
    use crate::capture::testing::FakeDevice;

    fn station(device: Arc<FakeDevice>) -> CaptureStation {
        CaptureStation::new(device, FrameSampler::default(), Duration::from_millis(1))
    }

    #[actix_web::test]
    async fn capture_needs_an_active_camera() {
        let station = station(Arc::new(FakeDevice::with_tracks(1)));
        assert!(matches!(station.capture().await, Err(AppError::CameraInactive)));

        station.start(None).await.unwrap();
        let (frame, token) = station.capture().await.unwrap();
        assert!(!frame.bytes.is_empty());
        assert!(!token.is_cancelled());
    }

    #[actix_web::test]
    async fn stopping_cancels_outstanding_work() {
        let device = Arc::new(FakeDevice::with_tracks(2));
        let station = station(device.clone());
        station.start(Some(FacingMode::Environment)).await.unwrap();
        let (_, token) = station.capture().await.unwrap();

        let status = station.stop().await;

        assert!(token.is_cancelled());
        assert_eq!(status.state, "idle");
        assert_eq!(device.track_stops(), vec![1, 1]);
    }

    #[actix_web::test]
    async fn denied_start_reports_error_state() {
        let station = station(Arc::new(FakeDevice::failing(MediaError::PermissionDenied)));
        assert!(station.start(None).await.is_err());

        let status = station.status().await;
        assert_eq!(status.state, "error");
        assert_eq!(status.message.as_deref(), Some("camera permission denied"));
    }

    #[actix_web::test]
    async fn slow_camera_open_does_not_stall_the_worker() {
        let station = station(Arc::new(FakeDevice::slow(Duration::from_millis(300))));
        let begun = std::time::Instant::now();

        let (started, ticked) = tokio::join!(
            async {
                station.start(None).await.unwrap();
                begun.elapsed()
            },
            async {
                tokio::time::sleep(Duration::from_millis(20)).await;
                begun.elapsed()
            }
        );

        assert!(ticked < started);
        assert_eq!(station.status().await.state, "active");
    }
}
