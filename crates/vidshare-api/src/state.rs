use std::path::PathBuf;
use std::sync::Arc;

use tracing::error;
use vidshare_db::Database;
use vidshare_media::MediaHost;

use crate::error::ApiError;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub media: Arc<dyn MediaHost>,
    pub jwt_secret: String,
    /// Multipart uploads are staged here before going to the media host.
    pub upload_dir: PathBuf,
}

impl AppStateInner {
    pub fn media(&self) -> &dyn MediaHost {
        &*self.media
    }
}

/// Runs a blocking store call off the async runtime. Store errors become
/// `ApiError::Internal`.
pub(crate) async fn with_db<F, T>(state: &AppState, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&Database) -> anyhow::Result<T> + Send + 'static,
    T: Send + 'static,
{
    try_db(state, f).await.map_err(ApiError::store)
}

/// Like `with_db`, but hands the raw store error back so the caller can
/// inspect it (e.g. for unique violations).
pub(crate) async fn try_db<F, T>(state: &AppState, f: F) -> anyhow::Result<T>
where
    F: FnOnce(&Database) -> anyhow::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let state = state.clone();
    tokio::task::spawn_blocking(move || f(&state.db))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            anyhow::anyhow!("store task failed: {}", e)
        })?
}
