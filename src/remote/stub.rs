//! Throwaway attendance backend for the unit tests.

use actix_web::dev::{Service, ServerHandle};
use actix_web::{App, HttpServer, web};
use std::sync::{Arc, Mutex};

pub struct StubBackend {
    pub base_url: String,
    hits: Arc<Mutex<Vec<String>>>,
    handle: ServerHandle,
}

impl StubBackend {
    /// Serves `routes` on an ephemeral local port and records every request
    /// URI (path and query).
    pub async fn start<F>(routes: F) -> Self
    where
        F: Fn(&mut web::ServiceConfig) + Send + Clone + 'static,
    {
        let hits = Arc::new(Mutex::new(Vec::new()));
        let recorded = hits.clone();

        let server = HttpServer::new(move || {
            let recorded = recorded.clone();
            App::new()
                .wrap_fn(move |req, srv| {
                    recorded.lock().unwrap().push(req.uri().to_string());
                    srv.call(req)
                })
                .configure(routes.clone())
        })
        .workers(1)
        .bind(("127.0.0.1", 0))
        .expect("bind stub backend");

        let addr = server.addrs()[0];
        let server = server.run();
        let handle = server.handle();
        actix_web::rt::spawn(server);

        Self {
            base_url: format!("http://{addr}"),
            hits,
            handle,
        }
    }

    pub fn hits(&self) -> Vec<String> {
        self.hits.lock().unwrap().clone()
    }

    pub fn hits_to(&self, path: &str) -> usize {
        self.hits().iter().filter(|h| h.starts_with(path)).count()
    }

    pub async fn stop(self) {
        self.handle.stop(false).await;
    }
}
