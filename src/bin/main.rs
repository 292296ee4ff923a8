#[cfg(not(target_arch = "wasm32"))]
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("failed to load .env: {e}");
        }
    }

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,devconnect=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = devconnect::config::Config::from_env();
    devconnect::server::run(config).await
}

#[cfg(target_arch = "wasm32")]
fn main() {}
