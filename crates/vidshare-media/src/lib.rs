//! Clients for the external media host that stores video files and thumbnails.

pub mod cloudinary;
pub mod local;

use std::path::Path;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

pub use cloudinary::{CloudinaryConfig, CloudinaryHost};
pub use local::LocalMediaHost;

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("media host request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("local file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("media host rejected request ({status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("not a media reference: {0}")]
    InvalidReference(String),
}

/// What the host hands back for a stored file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct UploadedMedia {
    pub url: String,
    /// Seconds; only reported for video.
    #[serde(default)]
    pub duration: Option<f64>,
}

impl UploadedMedia {
    pub fn is_usable(&self) -> bool {
        !self.url.trim().is_empty()
    }
}

/// Host's verdict on a delete. Anything but `"ok"` is a failure.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DeleteOutcome {
    pub result: String,
}

impl DeleteOutcome {
    pub fn ok() -> Self {
        Self { result: "ok".into() }
    }

    pub fn is_ok(&self) -> bool {
        self.result == "ok"
    }
}

#[async_trait]
pub trait MediaHost: Send + Sync {
    /// Uploads the file at `local_path`. The caller owns the local file.
    async fn upload(&self, local_path: &Path) -> Result<UploadedMedia, MediaError>;

    /// Deletes the object behind a URL previously returned by `upload`.
    async fn delete(&self, remote_ref: &str) -> Result<DeleteOutcome, MediaError>;
}
