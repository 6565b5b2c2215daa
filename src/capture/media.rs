use crate::error::AppError;
use actix_web::web;
use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use utoipa::ToSchema;

/// Which camera to ask the device for.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum FacingMode {
    /// front camera
    #[default]
    User,
    /// rear camera
    Environment,
}

impl FacingMode {
    pub fn toggled(self) -> Self {
        match self {
            FacingMode::User => FacingMode::Environment,
            FacingMode::Environment => FacingMode::User,
        }
    }
}

/// Packed RGB8 frame as read from a stream.
#[derive(Debug, Clone)]
pub struct RawFrame {
    pub width: u32,
    pub height: u32,
    pub rgb: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum MediaError {
    #[display(fmt = "camera permission denied")]
    PermissionDenied,
    #[display(fmt = "no camera found")]
    NoDevice,
    #[display(fmt = "camera is in use by another application")]
    Busy,
    #[display(fmt = "{}", _0)]
    Stream(String),
}

impl std::error::Error for MediaError {}

/// Source of live video streams (the platform camera API).
pub trait MediaDevice: Send + Sync {
    fn open(&self, facing: FacingMode) -> Result<Box<dyn MediaStream>, MediaError>;
}

/// An acquired stream. Owns one or more tracks until `stop_tracks`.
pub trait MediaStream: Send {
    fn tracks(&self) -> usize;

    /// Stops every track. Calling it twice must not stop anything twice.
    fn stop_tracks(&mut self);

    /// `Ok(None)` while the stream has not buffered a displayable frame.
    fn read_frame(&mut self) -> Result<Option<RawFrame>, MediaError>;
}

/// Device used when the console is built without native camera support.
pub struct UnavailableDevice;

impl MediaDevice for UnavailableDevice {
    fn open(&self, _facing: FacingMode) -> Result<Box<dyn MediaStream>, MediaError> {
        Err(MediaError::NoDevice)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CameraState {
    Idle,
    Requesting,
    Active,
    Error(String),
}

impl CameraState {
    pub fn as_str(&self) -> &'static str {
        match self {
            CameraState::Idle => "idle",
            CameraState::Requesting => "requesting",
            CameraState::Active => "active",
            CameraState::Error(_) => "error",
        }
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            CameraState::Error(msg) => Some(msg),
            _ => None,
        }
    }
}

/// Exclusive handle on the kiosk camera. The stream is released on `stop`,
/// on `switch`, and when the handle is dropped.
pub struct CameraHandle {
    device: Arc<dyn MediaDevice>,
    stream: Option<Box<dyn MediaStream>>,
    state: CameraState,
    facing: FacingMode,
}

impl CameraHandle {
    pub fn new(device: Arc<dyn MediaDevice>) -> Self {
        Self {
            device,
            stream: None,
            state: CameraState::Idle,
            facing: FacingMode::default(),
        }
    }

    pub fn state(&self) -> &CameraState {
        &self.state
    }

    pub fn facing(&self) -> FacingMode {
        self.facing
    }

    pub fn is_active(&self) -> bool {
        self.state == CameraState::Active && self.stream.is_some()
    }

    pub fn tracks(&self) -> usize {
        self.stream.as_ref().map(|s| s.tracks()).unwrap_or(0)
    }

    /// Opens the device on the blocking pool; native cameras can take seconds.
    pub async fn start(&mut self, facing: FacingMode) -> Result<(), AppError> {
        if self.is_active() {
            debug!("camera already active");
            return Ok(());
        }

        self.facing = facing;
        self.state = CameraState::Requesting;

        let device = self.device.clone();
        let opened = match web::block(move || device.open(facing)).await {
            Ok(res) => res,
            Err(e) => Err(MediaError::Stream(e.to_string())),
        };

        match opened {
            Ok(stream) => {
                info!(?facing, tracks = stream.tracks(), "camera stream acquired");
                self.stream = Some(stream);
                self.state = CameraState::Active;
                Ok(())
            }
            Err(e) => {
                warn!(?facing, error = %e, "camera acquisition failed");
                self.stream = None;
                self.state = CameraState::Error(e.to_string());
                Err(AppError::Camera(e))
            }
        }
    }

    pub fn stop(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            stream.stop_tracks();
            info!("camera stream released");
        }
        self.state = CameraState::Idle;
    }

    /// Flips front/rear. The old stream is released first and the device gets
    /// `delay` to settle before the new request.
    pub async fn switch(&mut self, delay: Duration) -> Result<(), AppError> {
        let next = self.facing.toggled();
        self.stop();
        tokio::time::sleep(delay).await;
        self.start(next).await
    }

    /// Reads the current frame on the blocking pool. The stream is handed
    /// back to the handle once the read returns.
    pub async fn read_frame(&mut self) -> Result<Option<RawFrame>, AppError> {
        let mut stream = match self.stream.take() {
            Some(stream) if self.state == CameraState::Active => stream,
            other => {
                self.stream = other;
                return Err(AppError::CameraInactive);
            }
        };

        match web::block(move || {
            let frame = stream.read_frame();
            (stream, frame)
        })
        .await
        {
            Ok((stream, frame)) => {
                self.stream = Some(stream);
                Ok(frame?)
            }
            Err(e) => {
                self.state = CameraState::Error(e.to_string());
                Err(AppError::Camera(MediaError::Stream(e.to_string())))
            }
        }
    }
}

impl Drop for CameraHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::testing::FakeDevice;

    #[actix_web::test]
    async fn permission_denied_leaves_camera_inactive_with_one_error() {
        let device = Arc::new(FakeDevice::failing(MediaError::PermissionDenied));
        let mut handle = CameraHandle::new(device.clone());

        let errors: Vec<AppError> = handle.start(FacingMode::User).await.err().into_iter().collect();

        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], AppError::Camera(MediaError::PermissionDenied)));
        assert!(!handle.is_active());
        assert_eq!(handle.state().as_str(), "error");
        assert_eq!(handle.tracks(), 0);
    }

    #[actix_web::test]
    async fn stop_releases_every_track_once() {
        let device = Arc::new(FakeDevice::with_tracks(3));
        let mut handle = CameraHandle::new(device.clone());
        handle.start(FacingMode::User).await.unwrap();

        handle.stop();
        handle.stop();

        assert_eq!(device.track_stops(), vec![1, 1, 1]);
        assert_eq!(handle.state(), &CameraState::Idle);
    }

    #[actix_web::test]
    async fn dropping_the_handle_releases_the_stream() {
        let device = Arc::new(FakeDevice::with_tracks(2));
        {
            let mut handle = CameraHandle::new(device.clone());
            handle.start(FacingMode::Environment).await.unwrap();
        }
        assert_eq!(device.track_stops(), vec![1, 1]);
    }

    #[actix_web::test]
    async fn starting_twice_keeps_the_first_stream() {
        let device = Arc::new(FakeDevice::with_tracks(1));
        let mut handle = CameraHandle::new(device.clone());
        handle.start(FacingMode::User).await.unwrap();
        handle.start(FacingMode::Environment).await.unwrap();

        assert_eq!(device.opened(), vec![FacingMode::User]);
        assert_eq!(handle.facing(), FacingMode::User);
    }

    #[actix_web::test]
    async fn switch_releases_old_stream_before_reacquiring() {
        let device = Arc::new(FakeDevice::with_tracks(1));
        let mut handle = CameraHandle::new(device.clone());
        handle.start(FacingMode::User).await.unwrap();

        handle.switch(Duration::from_millis(1)).await.unwrap();

        assert_eq!(device.opened(), vec![FacingMode::User, FacingMode::Environment]);
        // first stream stopped, second still live
        assert_eq!(device.track_stops(), vec![1, 0]);
        assert!(handle.is_active());
    }

    #[actix_web::test]
    async fn inactive_camera_has_no_stream() {
        let mut handle = CameraHandle::new(Arc::new(UnavailableDevice));
        assert!(handle.start(FacingMode::User).await.is_err());
        assert!(matches!(handle.read_frame().await, Err(AppError::CameraInactive)));
    }
}
