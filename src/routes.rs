use crate::{
    api::{attendance, camera, dashboard, enrollment, health, notifications, scan, students},
    auth::{handlers, middleware::session_middleware},
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};
use std::sync::Arc;

// Helper to build per-route limiter
fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
    let per_ms = if requests_per_min == 0 {
        1
    } else {
        (60_000 / requests_per_min as u64).max(1)
    };
    let cfg = GovernorConfigBuilder::default()
        .milliseconds_per_request(per_ms)
        .burst_size(requests_per_min.max(1))
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .expect("per_ms and burst_size are both non-zero");
    Governor::new(&cfg)
}

pub fn configure(cfg: &mut web::ServiceConfig, config: &Config) {
    let login_limiter = Arc::new(build_limiter(config.rate_login_per_min));
    let scan_limiter = Arc::new(build_limiter(config.rate_scan_per_min));
    let protected_limiter = Arc::new(build_limiter(config.rate_protected_per_min));

    // Public routes
    cfg.route("/health", web::get().to(health::health)).service(
        web::scope("/auth")
            .service(
                web::resource("/login")
                    .wrap(login_limiter.clone())
                    .route(web::post().to(handlers::login)),
            )
            .service(
                web::resource("/logout")
                    .wrap(login_limiter)
                    .route(web::post().to(handlers::logout)),
            ),
    );

    // Session-protected routes
    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(from_fn(session_middleware))
            .wrap(protected_limiter)
            .route("/session", web::get().to(handlers::current_session))
            .service(
                web::scope("/camera")
                    .route("", web::get().to(camera::camera_status))
                    .route("/start", web::post().to(camera::start_camera))
                    .route("/stop", web::post().to(camera::stop_camera))
                    .route("/switch", web::post().to(camera::switch_camera)),
            )
            .service(
                web::resource("/scan")
                    .wrap(scan_limiter)
                    .route(web::post().to(scan::scan)),
            )
            .service(
                web::scope("/enrollment")
                    .service(
                        web::resource("")
                            .route(web::get().to(enrollment::draft))
                            .route(web::post().to(enrollment::submit))
                            .route(web::delete().to(enrollment::reset)),
                    )
                    .route("/frames", web::post().to(enrollment::capture_frame)),
            )
            .service(
                web::scope("/dashboard")
                    .route("", web::get().to(dashboard::dashboard))
                    .route("/student/calendar", web::get().to(dashboard::student_calendar))
                    .route("/student/analytics", web::get().to(dashboard::student_analytics))
                    .route("/student/report.csv", web::get().to(dashboard::student_report))
                    .route("/education/schools", web::get().to(dashboard::search_schools))
                    .route("/education/dropout", web::get().to(dashboard::dropout_analysis))
                    .route("/education/report.csv", web::get().to(dashboard::district_report)),
            )
            .service(
                web::scope("/notifications")
                    .route("", web::get().to(notifications::list))
                    .route("/{id}/read", web::put().to(notifications::mark_read)),
            )
            .service(
                web::scope("/attendance")
                    // /attendance/period
                    .route("/period", web::get().to(attendance::period_records))
                    .route("/period/summary", web::get().to(attendance::period_summary))
                    .route("/period/export", web::get().to(attendance::period_export))
                    .route("/bulk", web::post().to(attendance::bulk_mark)),
            )
            .service(
                web::scope("/students")
                    .route("", web::get().to(students::list_students))
                    .route("/search", web::get().to(students::search_students)),
            )
            .route("/periods", web::get().to(attendance::periods)),
    );
}
