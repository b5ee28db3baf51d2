use imgshelf::{
    Config, ImageService,
    db::MetadataStore,
    fetch::HttpFetcher,
    server::router::{ImgShelfState, imgshelf_router},
    storage,
};
use mimalloc::MiMalloc;
use std::{net::SocketAddr, sync::Arc};
use tokio::{net::TcpListener, signal};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cfg = Config::load()?;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cfg.basic.loglevel.clone()));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_level(true)
                .with_target(false),
        )
        .init();

    info!(
        database_url = %cfg.basic.database_url,
        loglevel = %cfg.basic.loglevel,
        listen_addr = %cfg.basic.listen_addr,
        listen_port = cfg.basic.listen_port,
        storage_backend = ?cfg.storage.backend,
        bucket = %cfg.storage.bucket,
        region = %cfg.storage.region,
        batch_concurrency = cfg.batch.concurrency,
    );

    let db = MetadataStore::connect(&cfg.basic.database_url).await?;
    let store = storage::from_config(&cfg.storage)?;
    info!(public_base = %store.public_base().as_url(), "object store ready");
    let fetcher = Arc::new(HttpFetcher::new(&cfg.fetch)?);

    let images = ImageService::new(store, fetcher, db.clone())
        .with_batch(cfg.batch.concurrency, cfg.batch.description.clone());
    let state = ImgShelfState::new(
        Arc::new(images),
        cfg.basic.request_timeout(),
        cfg.batch.timeout(),
    );
    let app = imgshelf_router(state, cfg.basic.max_upload_bytes);

    let addr = SocketAddr::from((cfg.basic.listen_addr, cfg.basic.listen_port));
    let listener = TcpListener::bind(addr).await?;
    info!("HTTP server listening on {}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await;
    info!("Server has shut down gracefully.");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Ctrl+C received, shutting down"),
        () = terminate => info!("SIGTERM received, shutting down"),
    }
}
