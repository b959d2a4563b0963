use std::path::PathBuf;

use anyhow::{Context, bail};
use vidshare_media::CloudinaryConfig;

/// Placeholder JWT secrets that MUST NOT be used.
const PLACEHOLDER_SECRETS: &[&str] = &["change-me-to-a-random-string", "dev-secret-change-me", "secret"];

#[cfg_attr(test, derive(Debug))]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    pub jwt_secret: String,
    pub upload_dir: PathBuf,
    pub media_dir: PathBuf,
    pub public_url: String,
    pub max_upload_bytes: usize,
    /// `None` unless all three Cloudinary variables are set.
    pub cloudinary: Option<CloudinaryConfig>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let get = |key: &str, default: &str| {
            var(key)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let jwt_secret = var("VIDSHARE_JWT_SECRET").unwrap_or_default();
        if jwt_secret.trim().is_empty() || PLACEHOLDER_SECRETS.contains(&jwt_secret.as_str()) {
            bail!("VIDSHARE_JWT_SECRET is unset or still a placeholder; it must match the account service's secret");
        }

        let port: u16 = get("VIDSHARE_PORT", "8000")
            .parse()
            .context("VIDSHARE_PORT must be a port number")?;
        let max_upload_mb: usize = get("VIDSHARE_MAX_UPLOAD_MB", "512")
            .parse()
            .context("VIDSHARE_MAX_UPLOAD_MB must be a whole number")?;
        let max_upload_bytes = max_upload_mb
            .checked_mul(1024 * 1024)
            .context("VIDSHARE_MAX_UPLOAD_MB is too large")?;

        let cloudinary = match (
            var("CLOUDINARY_CLOUD_NAME"),
            var("CLOUDINARY_API_KEY"),
            var("CLOUDINARY_API_SECRET"),
        ) {
            (Some(cloud_name), Some(api_key), Some(api_secret))
                if !cloud_name.is_empty() && !api_key.is_empty() && !api_secret.is_empty() =>
            {
                Some(CloudinaryConfig {
                    cloud_name,
                    api_key,
                    api_secret,
                })
            }
            _ => None,
        };

        Ok(Self {
            host: get("VIDSHARE_HOST", "0.0.0.0"),
            port,
            db_path: get("VIDSHARE_DB_PATH", "vidshare.db").into(),
            jwt_secret,
            upload_dir: get("VIDSHARE_UPLOAD_DIR", "./public/temp").into(),
            media_dir: get("VIDSHARE_MEDIA_DIR", "./media").into(),
            public_url: get("VIDSHARE_PUBLIC_URL", &format!("http://localhost:{}", port)),
            max_upload_bytes,
            cloudinary,
        })
    }
}
