use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{DeleteOutcome, MediaError, MediaHost, UploadedMedia};

/// Media host backed by a local directory, for development without a
/// Cloudinary account.
///
/// Each upload is stored as a flat file `{dir}/{uuid}.{ext}` and addressed as
/// `{public_base}/media/{uuid}.{ext}`; the server mounts `dir` at `/media`.
pub struct LocalMediaHost {
    dir: PathBuf,
    public_base: String,
}

impl LocalMediaHost {
    pub async fn new(dir: PathBuf, public_base: impl Into<String>) -> Result<Self, MediaError> {
        fs::create_dir_all(&dir).await?;
        info!("Local media directory: {}", dir.display());
        Ok(Self {
            dir,
            public_base: public_base.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Maps a URL from `upload` back to the stored file. Only bare file names
    /// under `/media/` are accepted.
    fn file_path(&self, remote_ref: &str) -> Option<PathBuf> {
        let (_, name) = remote_ref.rsplit_once("/media/")?;
        let valid = !name.is_empty()
            && name != "."
            && name != ".."
            && name.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
        valid.then(|| self.dir.join(name))
    }
}

#[async_trait]
impl MediaHost for LocalMediaHost {
    async fn upload(&self, local_path: &Path) -> Result<UploadedMedia, MediaError> {
        let ext = local_path
            .extension()
            .and_then(|e| e.to_str())
            .filter(|e| e.chars().all(|c| c.is_ascii_alphanumeric()))
            .map(|e| format!(".{}", e.to_ascii_lowercase()))
            .unwrap_or_default();
        let name = format!("{}{}", Uuid::new_v4(), ext);

        let bytes = fs::copy(local_path, self.dir.join(&name)).await?;
        info!("Stored {} bytes as {}", bytes, name);

        Ok(UploadedMedia {
            url: format!("{}/media/{}", self.public_base, name),
            duration: None,
        })
    }

    async fn delete(&self, remote_ref: &str) -> Result<DeleteOutcome, MediaError> {
        let path = self
            .file_path(remote_ref)
            .ok_or_else(|| MediaError::InvalidReference(remote_ref.to_string()))?;

        match fs::remove_file(&path).await {
            Ok(()) => {
                info!("Deleted {}", path.display());
                Ok(DeleteOutcome::ok())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!("Media file {} already gone", path.display());
                Ok(DeleteOutcome {
                    result: "not found".into(),
                })
            }
            Err(e) => Err(e.into()),
        }
    }
}
