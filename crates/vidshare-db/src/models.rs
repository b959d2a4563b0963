/// Write-side inputs for the store. Read-side shapes live in vidshare-types.
use uuid::Uuid;

pub struct NewUser {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub password_hash: String,
    pub avatar: Option<String>,
    pub cover_image: Option<String>,
}

pub struct NewVideo {
    pub id: Uuid,
    pub owner: Uuid,
    pub title: String,
    pub description: String,
    pub video_file: String,
    pub thumbnail: String,
    pub duration: f64,
}

/// Partial update; `None` leaves the column untouched.
#[derive(Debug, Default, Clone)]
pub struct VideoPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub thumbnail: Option<String>,
}

/// What a like points at. Exactly one target per like row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LikeTarget {
    Video(Uuid),
    Comment(Uuid),
    Tweet(Uuid),
}

impl LikeTarget {
    pub(crate) fn column(&self) -> &'static str {
        match self {
            LikeTarget::Video(_) => "video_id",
            LikeTarget::Comment(_) => "comment_id",
            LikeTarget::Tweet(_) => "tweet_id",
        }
    }

    pub fn id(&self) -> Uuid {
        match self {
            LikeTarget::Video(id) | LikeTarget::Comment(id) | LikeTarget::Tweet(id) => *id,
        }
    }
}

/// Outcome of a toggle: the pair now exists (`On`) or not (`Off`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggled {
    On,
    Off,
}
