//! devconnect: a developer social network API.
//!
//! Ships as a Spin HTTP component backed by Spin's key-value store, plus a
//! native actix-web host (see [`server`]) that runs the same router over an
//! in-memory store.

pub mod auth;
pub mod comments;
pub mod config;
pub mod core;
pub mod credentials;
pub mod github;
pub mod models;
pub mod posts;
pub mod profile;
pub mod router;
pub mod users;

#[cfg(not(target_arch = "wasm32"))]
pub mod server;

#[cfg(target_arch = "wasm32")]
mod component {
    use anyhow::anyhow;
    use spin_sdk::http::{IntoResponse, Method, Request, Response};
    use spin_sdk::http_component;
    use spin_sdk::key_value::Store;

    use crate::config::Config;
    use crate::core::Ctx;
    use crate::github::{RepoFetcher, UpstreamReply, UpstreamRequest};
    use crate::router::route;

    struct SpinFetcher;

    impl RepoFetcher for SpinFetcher {
        async fn fetch(&self, req: UpstreamRequest) -> anyhow::Result<UpstreamReply> {
            let mut builder = Request::builder();
            builder.method(Method::Get).uri(req.url);
            for (name, value) in req.headers {
                builder.header(name, value);
            }

            let resp: Response = spin_sdk::http::send(builder.build())
                .await
                .map_err(|e| anyhow!("github request failed: {:?}", e))?;
            Ok(UpstreamReply {
                status: *resp.status(),
                body: resp.body().to_vec(),
            })
        }
    }

    #[http_component]
    async fn handle(req: Request) -> anyhow::Result<impl IntoResponse> {
        let store = Store::open_default().map_err(|e| anyhow!("KV store must exist: {:?}", e))?;
        let config = Config::from_env();
        let ctx = Ctx::new(&store, &config);

        Ok(route(&ctx, &SpinFetcher, &req).await)
    }
}
