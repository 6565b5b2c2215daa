use crate::capture::station::CaptureStation;
use crate::error::AppError;
use crate::remote::client::{AttendanceApi, ScanContext};
use crate::scan::guard::InFlight;
use crate::scan::presenter::{FaceCategory, ScanReport, present};
use chrono::NaiveDate;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};
use utoipa::ToSchema;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ScanRequest {
    #[schema(example = "1st Period (9:00-10:00)")]
    pub period: String,
    /// Defaults to today on the backend.
    #[schema(value_type = Option<String>, format = Date)]
    pub date: Option<NaiveDate>,
}

/// One capture, one recognition call, one report.
pub struct ScanService {
    station: Arc<CaptureStation>,
    api: AttendanceApi,
    in_flight: InFlight,
    timeout: Duration,
}

impl ScanService {
    pub fn new(station: Arc<CaptureStation>, api: AttendanceApi, timeout: Duration) -> Self {
        Self {
            station,
            api,
            in_flight: InFlight::new(),
            timeout,
        }
    }

    pub fn is_scanning(&self) -> bool {
        self.in_flight.is_busy()
    }

    #[instrument(name = "scan", skip(self), fields(period = %req.period))]
    pub async fn scan(&self, req: ScanRequest) -> Result<ScanReport, AppError> {
        let period = req.period.trim();
        if period.is_empty() {
            return Err(AppError::BadRequest("Please select a class period".into()));
        }

        let _permit = self.in_flight.try_acquire()?;
        let (frame, lifecycle) = self.station.capture().await?;
        debug!(
            bytes = frame.bytes.len(),
            width = frame.width,
            height = frame.height,
            "frame captured"
        );

        let ctx = ScanContext {
            period: Some(period.to_string()),
            date: req.date,
        };

        let outcome = tokio::select! {
            _ = lifecycle.cancelled() => {
                warn!("scan cancelled, camera went away");
                return Err(AppError::Cancelled);
            }
            res = tokio::time::timeout(self.timeout, self.api.recognize(&frame, &ctx)) => {
                res.map_err(|_| AppError::Timeout)??
            }
        };

        let report = present(outcome);
        if report.has(FaceCategory::Spoofed) {
            warn!("spoof attempt in scanned frame");
        }
        info!(
            faces = report.faces.len(),
            categories = report.categories.len(),
            "scan finished"
        );
        Ok(report)
    }
}
