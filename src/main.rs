use actix_web::middleware::NormalizePath;
use actix_web::{App, HttpResponse, HttpServer, Responder, get};
use anyhow::Context;
use serde_json::json;
use strum::IntoEnumIterator;
use tokio_util::sync::CancellationToken;

mod api;
mod auth;
mod capture;
mod config;
mod dashboard;
mod docs;
mod error;
mod export;
mod model;
mod models;
mod notify;
mod remote;
mod routes;
mod scan;
mod state;
mod utils;

use config::Config;
use model::role::Role;
use state::AppServices;

use tracing::{info, warn};
use tracing_appender::rolling;
use utoipa_swagger_ui::SwaggerUi;

#[get("/")]
async fn index() -> impl Responder {
    HttpResponse::Ok().json(json!({
        "name": "Praesentix",
        "description": "Face-recognition attendance console",
        "roles": Role::iter().collect::<Vec<_>>(),
        "login": "/auth/login",
        "docs": "/swagger-ui/",
    }))
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    // Rolling daily log
    let file_appender = rolling::daily("logs", "praesentix.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_target(false) // removes module path
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .pretty()
        .init();

    info!(backend = %config.api_base_url, "Server starting...");

    let services = AppServices::build(config.clone(), capture::default_device())
        .context("could not set up the attendance client")?;

    // Background notification polling, stopped when the server exits
    let shutdown = CancellationToken::new();
    services
        .notifications
        .clone()
        .into_inner()
        .spawn(config.notification_poll, shutdown.child_token());

    let backend = services.api.health().await;
    if !backend.reachable {
        warn!(
            error = backend.error.as_deref().unwrap_or("non-success status"),
            "attendance service not reachable at startup"
        );
    }

    let server_addr = config.server_addr.clone();
    let app_services = services.clone();
    let openapi = docs::api_doc(&config.api_prefix);

    HttpServer::new(move || {
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}") // ← important: wildcard {_:.*} to match JS/CSS files
                    .url("/api-doc/openapi.json", openapi.clone()),
            )
            .configure(|cfg| app_services.register(cfg))
            .service(index)
            // auth + protected routes with rate limiting
            .configure(|cfg| routes::configure(cfg, &config))
    })
    .bind(&server_addr)
    .with_context(|| format!("could not bind {server_addr}"))?
    .run()
    .await?;

    shutdown.cancel();
    services.station.shutdown().await;
    info!("Server stopped");
    Ok(())
}
