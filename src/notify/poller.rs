use crate::error::AppError;
use crate::model::notification::Notification;
use crate::remote::client::AttendanceApi;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use utoipa::ToSchema;

#[derive(Debug, Clone, Default, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NotificationSnapshot {
    pub notifications: Vec<Notification>,
    pub unread: usize,
    /// Last poll failure; the list keeps its previous content.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>, format = DateTime)]
    pub last_polled: Option<DateTime<Utc>>,
}

/// Keeps the latest notification list fetched from the backend.
pub struct NotificationCenter {
    api: AttendanceApi,
    state: RwLock<NotificationSnapshot>,
}

impl NotificationCenter {
    pub fn new(api: AttendanceApi) -> Self {
        Self {
            api,
            state: RwLock::new(NotificationSnapshot::default()),
        }
    }

    pub async fn snapshot(&self) -> NotificationSnapshot {
        self.state.read().await.clone()
    }

    pub async fn poll_once(&self) -> Result<usize, AppError> {
        let result = self.api.notifications().await;
        let mut state = self.state.write().await;
        state.last_polled = Some(Utc::now());
        match result {
            Ok(list) => {
                state.unread = list.iter().filter(|n| !n.read).count();
                state.notifications = list;
                state.error = None;
                debug!(unread = state.unread, "notifications refreshed");
                Ok(state.unread)
            }
            Err(e) => {
                warn!(error = %e, "notification poll failed");
                state.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    pub async fn mark_read(&self, id: i64) -> Result<NotificationSnapshot, AppError> {
        self.api.mark_notification_read(id).await?;
        let mut state = self.state.write().await;
        if let Some(n) = state.notifications.iter_mut().find(|n| n.id == id && !n.read) {
            n.read = true;
            state.unread = state.unread.saturating_sub(1);
        }
        Ok(state.clone())
    }

    /// Polls every `every` until `shutdown` fires.
    pub fn spawn(self: Arc<Self>, every: Duration, shutdown: CancellationToken) {
        actix_web::rt::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            info!(every_secs = every.as_secs(), "notification poller started");
            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => {
                        info!("notification poller stopped");
                        break;
                    }
                    _ = ticker.tick() => {
                        let _ = self.poll_once().await;
                    }
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::stub::StubBackend;
    use actix_web::{HttpResponse, web};
    use serde_json::json;

    fn routes(cfg: &mut web::ServiceConfig) {
        cfg.route(
            "/api/notifications",
            web::get().to(|| async {
                HttpResponse::Ok().json(json!({
                    "success": true,
                    "data": [
                        { "id": 1, "type": "warning", "title": "Low attendance",
                          "message": "Class 8B below 75%", "timestamp": "2024-01-10T09:00:00", "read": 0 },
                        { "id": 2, "type": "info", "title": "Report ready",
                          "message": "Weekly report", "timestamp": "2024-01-10T08:00:00", "read": 1 }
                    ]
                }))
            }),
        )
        .route(
            "/api/notifications",
            web::put().to(|| async { HttpResponse::Ok().json(json!({ "success": true })) }),
        );
    }

    #[actix_web::test]
    async fn poll_counts_unread_and_mark_read_updates_it() {
        let stub = StubBackend::start(routes).await;
        let api = AttendanceApi::new(&stub.base_url, Duration::from_secs(5)).unwrap();
        let center = NotificationCenter::new(api);

        assert_eq!(center.poll_once().await.unwrap(), 1);
        let snap = center.mark_read(1).await.unwrap();
        assert_eq!(snap.unread, 0);
        assert!(snap.notifications[0].read);
        stub.stop().await;
    }

    #[actix_web::test]
    async fn failed_poll_keeps_previous_list() {
        let stub = StubBackend::start(routes).await;
        let base = stub.base_url.clone();
        let center = NotificationCenter::new(
            AttendanceApi::new(&base, Duration::from_secs(2)).unwrap(),
        );
        center.poll_once().await.unwrap();
        stub.stop().await;

        assert!(center.poll_once().await.is_err());
        let snap = center.snapshot().await;
        assert_eq!(snap.notifications.len(), 2);
        assert!(snap.error.is_some());
    }
}
