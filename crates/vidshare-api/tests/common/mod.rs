#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use jsonwebtoken::{EncodingKey, Header, encode};
use tempfile::TempDir;
use tower::ServiceExt;
use uuid::Uuid;

use vidshare_api::{AppState, AppStateInner};
use vidshare_db::{Database, NewUser};
use vidshare_media::{DeleteOutcome, MediaError, MediaHost, UploadedMedia};
use vidshare_types::api::Claims;

pub const SECRET: &str = "integration-test-secret";
const BOUNDARY: &str = "vidshare-test-boundary";

/// Media host double that records every call.
#[derive(Default)]
pub struct FakeMedia {
    pub uploads: Mutex<Vec<String>>,
    pub deletes: Mutex<Vec<String>>,
    /// Set to make video uploads come back without a URL.
    pub break_video_uploads: AtomicBool,
    /// Set to make every delete come back as "not found".
    pub refuse_deletes: AtomicBool,
    /// Every staged file seen by `upload`, to check they were cleaned up.
    pub staged_paths: Mutex<Vec<PathBuf>>,
    counter: AtomicUsize,
}

impl FakeMedia {
    pub fn upload_count(&self) -> usize {
        self.uploads.lock().unwrap().len()
    }

    pub fn delete_count(&self) -> usize {
        self.deletes.lock().unwrap().len()
    }
}

#[async_trait]
impl MediaHost for FakeMedia {
    async fn upload(&self, local_path: &Path) -> Result<UploadedMedia, MediaError> {
        assert!(local_path.exists(), "staged file should exist during upload");
        self.staged_paths.lock().unwrap().push(local_path.to_path_buf());

        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        let is_video = local_path.extension().is_some_and(|e| e == "mp4");
        let uploaded = if is_video {
            if self.break_video_uploads.load(Ordering::SeqCst) {
                UploadedMedia {
                    url: String::new(),
                    duration: None,
                }
            } else {
                UploadedMedia {
                    url: format!("https://cdn.test/video/upload/v1/clip{}.mp4", n),
                    duration: Some(42.5),
                }
            }
        } else {
            UploadedMedia {
                url: format!("https://cdn.test/image/upload/v1/thumb{}.png", n),
                duration: None,
            }
        };

        self.uploads.lock().unwrap().push(uploaded.url.clone());
        Ok(uploaded)
    }

    async fn delete(&self, remote_ref: &str) -> Result<DeleteOutcome, MediaError> {
        self.deletes.lock().unwrap().push(remote_ref.to_string());
        if self.refuse_deletes.load(Ordering::SeqCst) {
            return Ok(DeleteOutcome {
                result: "not found".into(),
            });
        }
        Ok(DeleteOutcome::ok())
    }
}

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub media: Arc<FakeMedia>,
    pub upload_dir: TempDir,
}

pub fn app() -> TestApp {
    let db = Database::open_in_memory().unwrap();
    let media = Arc::new(FakeMedia::default());
    let upload_dir = tempfile::tempdir().unwrap();

    let state: AppState = Arc::new(AppStateInner {
        db,
        media: media.clone(),
        jwt_secret: SECRET.into(),
        upload_dir: upload_dir.path().to_path_buf(),
    });

    TestApp {
        router: vidshare_api::router(state.clone()),
        state,
        media,
        upload_dir,
    }
}

pub struct TestUser {
    pub id: Uuid,
    pub token: String,
}

impl TestApp {
    pub fn user(&self, username: &str) -> TestUser {
        let id = Uuid::new_v4();
        self.state
            .db
            .create_user(&NewUser {
                id,
                username: username.into(),
                email: format!("{}@example.com", username),
                full_name: username.to_uppercase(),
                password_hash: "x".into(),
                avatar: Some(format!("https://cdn.test/{}.png", username)),
                cover_image: None,
            })
            .unwrap();
        TestUser {
            id,
            token: token_for(id, username),
        }
    }

    /// Files left in the upload directory.
    pub fn staged_leftovers(&self) -> usize {
        std::fs::read_dir(self.upload_dir.path()).unwrap().count()
    }

    pub async fn call(
        &self,
        method: &str,
        uri: &str,
        user: Option<&TestUser>,
        body: Option<serde_json::Value>,
    ) -> (StatusCode, serde_json::Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(user) = user {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", user.token));
        }
        let body = match body {
            Some(v) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(serde_json::to_vec(&v).unwrap())
            }
            None => Body::empty(),
        };
        self.send(builder.body(body).unwrap()).await
    }

    pub async fn multipart(
        &self,
        method: &str,
        uri: &str,
        user: &TestUser,
        parts: &[Part<'_>],
    ) -> (StatusCode, serde_json::Value) {
        let req = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {}", user.token))
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(multipart_body(parts)))
            .unwrap();
        self.send(req).await
    }

    pub async fn send(&self, req: Request<Body>) -> (StatusCode, serde_json::Value) {
        let resp = self.router.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, json)
    }

    /// Publishes a video through the API and returns its id.
    pub async fn publish(&self, user: &TestUser, title: &str) -> Uuid {
        let (status, body) = self
            .multipart(
                "POST",
                "/api/v1/videos",
                user,
                &[
                    Part::Text("title", title),
                    Part::Text("description", "a test video"),
                    Part::File("thumbnail", "thumb.png", b"png bytes"),
                    Part::File("videoFile", "clip.mp4", b"mp4 bytes"),
                ],
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{}", body);
        id_of(&body["data"])
    }
}

pub fn token_for(id: Uuid, username: &str) -> String {
    let claims = Claims {
        sub: id,
        username: username.into(),
        exp: (chrono::Utc::now().timestamp() + 3600) as usize,
    };
    encode(&Header::default(), &claims, &EncodingKey::from_secret(SECRET.as_bytes())).unwrap()
}

pub fn id_of(value: &serde_json::Value) -> Uuid {
    value["id"].as_str().unwrap().parse().unwrap()
}

pub enum Part<'a> {
    Text(&'a str, &'a str),
    File(&'a str, &'a str, &'a [u8]),
}

fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes(),
                );
                body.extend_from_slice(value.as_bytes());
            }
            Part::File(name, file_name, bytes) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n\
                         Content-Type: application/octet-stream\r\n\r\n",
                        name, file_name
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(bytes);
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}
