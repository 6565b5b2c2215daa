use crate::capture::media::MediaDevice;
use crate::capture::sampler::FrameSampler;
use crate::capture::station::CaptureStation;
use crate::config::Config;
use crate::dashboard::DashboardService;
use crate::error::AppError;
use crate::notify::poller::NotificationCenter;
use crate::remote::client::AttendanceApi;
use crate::scan::enrollment::EnrollmentService;
use crate::scan::service::ScanService;
use actix_web::web::{self, Data};
use std::sync::Arc;
use tracing::debug;

/// Everything the handlers share, built once and cloned into each worker.
#[derive(Clone)]
pub struct AppServices {
    pub config: Data<Config>,
    pub api: Data<AttendanceApi>,
    pub station: Data<CaptureStation>,
    pub scans: Data<ScanService>,
    pub enrollment: Data<EnrollmentService>,
    pub notifications: Data<NotificationCenter>,
    pub dashboards: Data<DashboardService>,
}

impl AppServices {
    pub fn build(config: Config, device: Arc<dyn MediaDevice>) -> Result<Self, AppError> {
        let api = AttendanceApi::new(&config.api_base_url, config.request_timeout)?;
        let sampler = FrameSampler::new(config.jpeg_quality);
        debug!(quality = sampler.quality(), "jpeg sampler ready");
        let station = Arc::new(CaptureStation::new(
            device,
            sampler,
            config.camera_switch_delay,
        ));

        Ok(Self {
            scans: Data::new(ScanService::new(
                station.clone(),
                api.clone(),
                config.scan_timeout,
            )),
            enrollment: Data::new(EnrollmentService::new(station.clone(), api.clone())),
            notifications: Data::new(NotificationCenter::new(api.clone())),
            dashboards: Data::new(DashboardService::new(
                api.clone(),
                config.stats_cache_ttl,
                &config.api_prefix,
            )),
            station: Data::from(station),
            api: Data::new(api),
            config: Data::new(config),
        })
    }

    pub fn register(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(self.config.clone())
            .app_data(self.api.clone())
            .app_data(self.station.clone())
            .app_data(self.scans.clone())
            .app_data(self.enrollment.clone())
            .app_data(self.notifications.clone())
            .app_data(self.dashboards.clone());
    }
}
