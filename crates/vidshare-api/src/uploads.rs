//! Multipart staging and the media-host side effects around it.
//!
//! Files are written to a `NamedTempFile` in the upload directory; the file is
//! removed when the `StagedFile` is dropped, whichever way the request ends.

use std::path::Path;

use axum::extract::Multipart;
use axum::extract::multipart::Field;
use tempfile::NamedTempFile;
use tokio::io::AsyncWriteExt;
use tracing::{debug, error, warn};

use vidshare_media::{MediaHost, UploadedMedia};

use crate::error::ApiError;
use crate::validate::non_blank;

pub struct StagedFile {
    file: NamedTempFile,
    len: u64,
}

impl StagedFile {
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub fn len(&self) -> u64 {
        self.len
    }
}

/// Fields of the publish and update forms. Empty file parts are dropped.
#[derive(Default)]
pub struct VideoForm {
    pub title: Option<String>,
    pub description: Option<String>,
    pub thumbnail: Option<StagedFile>,
    pub video_file: Option<StagedFile>,
}

pub async fn read_video_form(mut multipart: Multipart, upload_dir: &Path) -> Result<VideoForm, ApiError> {
    let mut form = VideoForm::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "title" => form.title = non_blank(Some(field.text().await?)),
            "description" => form.description = non_blank(Some(field.text().await?)),
            "thumbnail" => form.thumbnail = stage(field, upload_dir).await?,
            "videoFile" => form.video_file = stage(field, upload_dir).await?,
            other => debug!("Ignoring multipart field {:?}", other),
        }
    }

    Ok(form)
}

async fn stage(mut field: Field<'_>, upload_dir: &Path) -> Result<Option<StagedFile>, ApiError> {
    let suffix = field
        .file_name()
        .and_then(|n| Path::new(n).extension())
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty() && e.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|e| format!(".{}", e))
        .unwrap_or_default();

    let temp = tempfile::Builder::new()
        .prefix("upload-")
        .suffix(&suffix)
        .tempfile_in(upload_dir)
        .map_err(|e| {
            error!("Failed to create temp file in {}: {}", upload_dir.display(), e);
            ApiError::Internal("Could not stage the upload".into())
        })?;

    let io_err = |e: std::io::Error| {
        error!("Failed to write staged upload: {}", e);
        ApiError::Internal("Could not stage the upload".into())
    };

    let mut out = tokio::fs::File::from_std(temp.reopen().map_err(io_err)?);
    let mut len = 0u64;
    while let Some(chunk) = field.chunk().await? {
        out.write_all(&chunk).await.map_err(io_err)?;
        len += chunk.len() as u64;
    }
    out.flush().await.map_err(io_err)?;

    if len == 0 {
        return Ok(None);
    }
    Ok(Some(StagedFile { file: temp, len }))
}

/// Uploads and consumes the staged file. An error or an empty URL from the
/// host is `UploadFailed`.
pub async fn upload(media: &dyn MediaHost, staged: StagedFile, what: &str) -> Result<UploadedMedia, ApiError> {
    let result = media.upload(staged.path()).await;
    drop(staged);

    match result {
        Ok(uploaded) if uploaded.is_usable() => Ok(uploaded),
        Ok(_) => {
            warn!("Media host returned no URL for {}", what);
            Err(ApiError::UploadFailed(format!("Error while uploading {}", what)))
        }
        Err(e) => {
            warn!("Upload of {} failed: {}", what, e);
            Err(ApiError::UploadFailed(format!("Error while uploading {}", what)))
        }
    }
}

/// Deletes a hosted object; anything but an `"ok"` verdict is
/// `ExternalDeleteFailed`.
pub async fn delete_remote(media: &dyn MediaHost, url: &str, what: &str) -> Result<(), ApiError> {
    match media.delete(url).await {
        Ok(outcome) if outcome.is_ok() => Ok(()),
        Ok(outcome) => {
            warn!("Media host refused to delete {} {}: {}", what, url, outcome.result);
            Err(ApiError::ExternalDeleteFailed(format!("Failed to delete {}", what)))
        }
        Err(e) => {
            warn!("Delete of {} {} failed: {}", what, url, e);
            Err(ApiError::ExternalDeleteFailed(format!("Failed to delete {}", what)))
        }
    }
}

/// Best-effort removal of objects that no record points at.
pub async fn discard(media: &dyn MediaHost, urls: &[&str]) {
    for url in urls {
        if let Err(e) = delete_remote(media, url, "orphaned upload").await {
            warn!("Orphaned media left behind at {}: {}", url, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use vidshare_media::{DeleteOutcome, MediaError};

    #[derive(Default)]
    struct Recorder {
        uploaded: Mutex<Vec<bool>>,
        url: &'static str,
    }

    #[async_trait]
    impl MediaHost for Recorder {
        async fn upload(&self, local_path: &Path) -> Result<UploadedMedia, MediaError> {
            self.uploaded.lock().unwrap().push(local_path.exists());
            Ok(UploadedMedia {
                url: self.url.to_string(),
                duration: None,
            })
        }

        async fn delete(&self, _remote_ref: &str) -> Result<DeleteOutcome, MediaError> {
            Ok(DeleteOutcome {
                result: "not found".into(),
            })
        }
    }

    fn staged(dir: &Path) -> StagedFile {
        let file = tempfile::Builder::new().tempfile_in(dir).unwrap();
        std::fs::write(file.path(), b"frames").unwrap();
        StagedFile { file, len: 6 }
    }

    #[tokio::test]
    async fn test_staged_file_removed_after_upload() {
        let dir = tempfile::tempdir().unwrap();
        let host = Recorder {
            url: "https://cdn.test/a.mp4",
            ..Default::default()
        };

        let file = staged(dir.path());
        let path = file.path().to_path_buf();
        let uploaded = upload(&host, file, "video file").await.unwrap();

        assert_eq!(uploaded.url, "https://cdn.test/a.mp4");
        assert_eq!(*host.uploaded.lock().unwrap(), vec![true]);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_empty_url_is_upload_failure() {
        let dir = tempfile::tempdir().unwrap();
        let host = Recorder::default();

        let file = staged(dir.path());
        let path = file.path().to_path_buf();
        let err = upload(&host, file, "thumbnail").await.unwrap_err();

        assert!(matches!(err, ApiError::UploadFailed(_)));
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_delete_requires_ok_verdict() {
        let host = Recorder::default();
        let err = delete_remote(&host, "https://cdn.test/a.png", "thumbnail").await.unwrap_err();
        assert!(matches!(err, ApiError::ExternalDeleteFailed(_)));
    }
}
