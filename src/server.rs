//! Native actix-web host. Every request is translated into a Spin request,
//! run through the shared router and translated back.

use std::sync::Arc;
use std::time::Instant;

use actix_web::{web, App, HttpRequest, HttpResponse, HttpServer};
use tokio::sync::Mutex;

use crate::config::Config;
use crate::core::store::MemoryStore;
use crate::core::Ctx;
use crate::github::{RepoFetcher, UpstreamReply, UpstreamRequest};
use crate::router::route;

mod adapter {
    use actix_web::HttpRequest;
    use spin_sdk::http::{Method, Request, Response};

    pub fn method_from_actix(method: &actix_web::http::Method) -> Method {
        match method.as_str() {
            "GET" => Method::Get,
            "POST" => Method::Post,
            "PUT" => Method::Put,
            "DELETE" => Method::Delete,
            "HEAD" => Method::Head,
            "OPTIONS" => Method::Options,
            "PATCH" => Method::Patch,
            other => Method::Other(other.to_string()),
        }
    }

    pub fn actix_to_spin_request(req: &HttpRequest, body: actix_web::web::Bytes) -> Request {
        let mut builder = Request::builder();
        builder
            .method(method_from_actix(req.method()))
            .uri(req.uri().to_string());

        for (name, value) in req.headers() {
            if let Ok(val_str) = value.to_str() {
                builder.header(name.as_str(), val_str);
            }
        }

        builder.body(body.to_vec()).build()
    }

    pub fn spin_to_actix_response(spin_resp: Response) -> actix_web::HttpResponse {
        let status = actix_web::http::StatusCode::from_u16(*spin_resp.status())
            .unwrap_or(actix_web::http::StatusCode::INTERNAL_SERVER_ERROR);

        let mut response = actix_web::HttpResponse::build(status);
        if let Some(content_type) = spin_resp.header("content-type").and_then(|v| v.as_str()) {
            response.content_type(content_type.to_string());
        }

        response.body(spin_resp.body().to_vec())
    }
}

/// GitHub client for the native host.
#[derive(Clone, Default)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl RepoFetcher for HttpFetcher {
    async fn fetch(&self, req: UpstreamRequest) -> anyhow::Result<UpstreamReply> {
        let mut builder = self.client.get(&req.url);
        for (name, value) in req.headers {
            builder = builder.header(name, value);
        }

        let resp = builder.send().await?;
        let status = resp.status().as_u16();
        let body = resp.bytes().await?.to_vec();
        Ok(UpstreamReply { status, body })
    }
}

pub struct AppState {
    pub store: Arc<MemoryStore>,
    pub config: Config,
    pub fetcher: HttpFetcher,
    /// Serializes mutating requests so list updates do not interleave across workers.
    write_lock: Mutex<()>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self::with_store(config, Arc::new(MemoryStore::new()))
    }

    pub fn with_store(config: Config, store: Arc<MemoryStore>) -> Self {
        Self {
            store,
            config,
            fetcher: HttpFetcher::default(),
            write_lock: Mutex::new(()),
        }
    }
}

pub async fn handle_all(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Bytes,
) -> HttpResponse {
    let start = Instant::now();
    let method = req.method().clone();
    let path = req.path().to_string();

    let spin_req = adapter::actix_to_spin_request(&req, body);
    let ctx = Ctx::new(state.store.as_ref(), &state.config);

    let spin_resp = if method == actix_web::http::Method::GET {
        route(&ctx, &state.fetcher, &spin_req).await
    } else {
        let _guard = state.write_lock.lock().await;
        route(&ctx, &state.fetcher, &spin_req).await
    };

    let response = adapter::spin_to_actix_response(spin_resp);
    tracing::info!(
        method = %method,
        path = %path,
        status = response.status().as_u16(),
        duration_ms = start.elapsed().as_millis() as u64,
        "HTTP request completed"
    );
    response
}

pub async fn run(config: Config) -> std::io::Result<()> {
    let bind_addr = config.bind_addr.clone();
    let state = web::Data::new(AppState::new(config));

    tracing::info!(%bind_addr, "server listening (in-memory store)");

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .default_service(web::route().to(handle_all))
    })
    .bind(bind_addr)?
    .run()
    .await
}
