mod config;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{Router, extract::DefaultBodyLimit};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use vidshare_api::{AppState, AppStateInner};
use vidshare_media::{CloudinaryHost, LocalMediaHost, MediaHost};

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vidshare=debug,vidshare_api=debug,tower_http=debug".into()),
        )
        .init();

    let config = Config::from_env()?;

    // Init database
    let db = vidshare_db::Database::open(&config.db_path)?;

    tokio::fs::create_dir_all(&config.upload_dir).await?;

    // Media host: Cloudinary when configured, otherwise files on local disk
    let mut app = Router::new();
    let media: Arc<dyn MediaHost> = match config.cloudinary.clone() {
        Some(cloudinary) => {
            info!("Media host: Cloudinary ({})", cloudinary.cloud_name);
            Arc::new(CloudinaryHost::new(cloudinary))
        }
        None => {
            warn!("Cloudinary not configured; storing media under {}", config.media_dir.display());
            let local = LocalMediaHost::new(config.media_dir.clone(), config.public_url.clone()).await?;
            app = app.nest_service("/media", ServeDir::new(local.dir()));
            Arc::new(local)
        }
    };

    let state: AppState = Arc::new(AppStateInner {
        db,
        media,
        jwt_secret: config.jwt_secret.clone(),
        upload_dir: config.upload_dir.clone(),
    });

    let app = app
        .merge(vidshare_api::router(state))
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("VidShare server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
                    _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
                }
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                ctrl_c.await.ok();
                info!("Received Ctrl+C, shutting down...");
            }
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        info!("Received Ctrl+C, shutting down...");
    }
}
