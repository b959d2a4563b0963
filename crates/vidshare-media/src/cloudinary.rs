use std::collections::BTreeMap;
use std::path::Path;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use sha1::{Digest, Sha1};
use tokio_util::io::ReaderStream;
use tracing::{debug, info};

use crate::{DeleteOutcome, MediaError, MediaHost, UploadedMedia};

const API_BASE: &str = "https://api.cloudinary.com/v1_1";

#[derive(Debug, Clone)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
}

/// Signed REST client for Cloudinary's upload API.
pub struct CloudinaryHost {
    http: reqwest::Client,
    config: CloudinaryConfig,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: Option<String>,
    url: Option<String>,
    duration: Option<f64>,
}

impl CloudinaryHost {
    pub fn new(config: CloudinaryConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    fn sign(&self, params: &BTreeMap<&str, String>) -> String {
        sign_params(params, &self.config.api_secret)
    }
}

#[async_trait]
impl MediaHost for CloudinaryHost {
    async fn upload(&self, local_path: &Path) -> Result<UploadedMedia, MediaError> {
        let file = tokio::fs::File::open(local_path).await?;
        let len = file.metadata().await?.len();
        let file_name = local_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload")
            .to_string();

        let timestamp = chrono::Utc::now().timestamp().to_string();
        let mut params = BTreeMap::new();
        params.insert("timestamp", timestamp.clone());
        let signature = self.sign(&params);

        let body = reqwest::Body::wrap_stream(ReaderStream::new(file));
        let form = Form::new()
            .part("file", Part::stream_with_length(body, len).file_name(file_name))
            .text("api_key", self.config.api_key.clone())
            .text("timestamp", timestamp)
            .text("signature", signature);

        let url = format!("{}/{}/auto/upload", API_BASE, self.config.cloud_name);
        let resp = self.http.post(&url).multipart(form).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(MediaError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let uploaded: UploadResponse = resp.json().await?;
        let url = uploaded.secure_url.or(uploaded.url).unwrap_or_default();
        info!("Uploaded {} bytes to {}", len, url);

        Ok(UploadedMedia {
            url,
            duration: uploaded.duration,
        })
    }

    async fn delete(&self, remote_ref: &str) -> Result<DeleteOutcome, MediaError> {
        let public_id = public_id_from_url(remote_ref)
            .ok_or_else(|| MediaError::InvalidReference(remote_ref.to_string()))?;
        let resource_type = resource_type_for(remote_ref);

        let timestamp = chrono::Utc::now().timestamp().to_string();
        let mut params = BTreeMap::new();
        params.insert("public_id", public_id.clone());
        params.insert("timestamp", timestamp.clone());
        let signature = self.sign(&params);

        let url = format!("{}/{}/{}/destroy", API_BASE, self.config.cloud_name, resource_type);
        let resp = self
            .http
            .post(&url)
            .form(&[
                ("public_id", public_id.as_str()),
                ("api_key", self.config.api_key.as_str()),
                ("timestamp", timestamp.as_str()),
                ("signature", signature.as_str()),
            ])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(MediaError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let outcome: DeleteOutcome = resp.json().await?;
        debug!("Destroy {} ({}): {}", public_id, resource_type, outcome.result);
        Ok(outcome)
    }
}

/// SHA-1 over `k1=v1&k2=v2...` (keys sorted) followed by the API secret.
pub fn sign_params(params: &BTreeMap<&str, String>, api_secret: &str) -> String {
    let joined = params
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha1::new();
    hasher.update(joined.as_bytes());
    hasher.update(api_secret.as_bytes());
    hex::encode(hasher.finalize())
}

/// `.../upload/v1712/folder/name.mp4` → `folder/name`.
pub fn public_id_from_url(url: &str) -> Option<String> {
    let (_, tail) = url.split_once("/upload/")?;
    let mut segments: Vec<&str> = tail.split('/').filter(|s| !s.is_empty()).collect();

    if let Some(first) = segments.first() {
        let is_version = first.len() > 1
            && first.starts_with('v')
            && first[1..].chars().all(|c| c.is_ascii_digit());
        if is_version {
            segments.remove(0);
        }
    }

    let last = segments.pop()?;
    let stem = last.rsplit_once('.').map(|(stem, _)| stem).unwrap_or(last);
    if stem.is_empty() {
        return None;
    }
    segments.push(stem);
    Some(segments.join("/"))
}

pub fn resource_type_for(url: &str) -> &'static str {
    if url.contains("/video/") { "video" } else { "image" }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signature_matches_documented_example() {
        let mut params = BTreeMap::new();
        params.insert("timestamp", "1315060510".to_string());
        params.insert("public_id", "sample_image".to_string());
        params.insert("eager", "w_400,h_300,c_pad|w_260,h_200,c_crop".to_string());

        assert_eq!(sign_params(&params, "abcd"), "bfd09f95f331f558cbd1320e67aa8d488770583e");
    }

    #[test]
    fn test_public_id_from_url() {
        assert_eq!(
            public_id_from_url("http://res.cloudinary.com/demo/video/upload/v1700000000/abc123.mp4"),
            Some("abc123".to_string())
        );
        assert_eq!(
            public_id_from_url("https://res.cloudinary.com/demo/image/upload/thumbs/cat.png"),
            Some("thumbs/cat".to_string())
        );
        assert_eq!(
            public_id_from_url("https://res.cloudinary.com/demo/image/upload/noext"),
            Some("noext".to_string())
        );
        assert_eq!(public_id_from_url("https://example.com/cat.png"), None);
        assert_eq!(public_id_from_url("https://res.cloudinary.com/demo/image/upload/"), None);
    }

    #[test]
    fn test_resource_type() {
        assert_eq!(resource_type_for("https://res.cloudinary.com/d/video/upload/a.mp4"), "video");
        assert_eq!(resource_type_for("https://res.cloudinary.com/d/image/upload/a.png"), "image");
    }
}
