use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Joined user projection. Aggregated reads never expose more than this.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserSummary {
    pub username: String,
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub avatar: Option<String>,
    pub cover_image: Option<String>,
    pub created_at: DateTime<Utc>,
}

// -- Videos --

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Video {
    pub id: Uuid,
    pub owner: Uuid,
    pub title: String,
    pub description: String,
    pub video_file: String,
    pub thumbnail: String,
    pub duration: f64,
    pub views: i64,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Row of the public video listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoListItem {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub thumbnail: String,
    pub video_file: String,
    pub views: i64,
    pub duration: f64,
    pub created_by: UserSummary,
    pub created_at: DateTime<Utc>,
}

/// Row of the owner's dashboard listing, unpublished videos included.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelVideo {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub thumbnail: String,
    pub views: i64,
    pub duration: f64,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
}

// -- Comments --

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: Uuid,
    pub video: Uuid,
    pub owner: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentAuthor {
    pub user_id: Uuid,
    pub username: String,
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentView {
    pub id: Uuid,
    pub content: String,
    pub created_by: CommentAuthor,
    pub created_at: DateTime<Utc>,
}

// -- Tweets --

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tweet {
    pub id: Uuid,
    pub owner: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// -- Playlists --

/// Stored playlist; `videos` keeps insertion order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Playlist {
    pub id: Uuid,
    pub owner: Uuid,
    pub name: String,
    pub description: String,
    pub videos: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistVideo {
    pub id: Uuid,
    pub title: String,
    pub thumbnail: String,
    pub video_file: String,
    pub duration: f64,
    pub views: i64,
    pub owner: UserSummary,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistDetail {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub owner: UserSummary,
    pub videos: Vec<PlaylistVideo>,
}

// -- Likes --

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikedVideoDetail {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub thumbnail: String,
    pub video_file: String,
    pub owner: UserSummary,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikedVideo {
    pub video: LikedVideoDetail,
    pub liked_at: DateTime<Utc>,
}

// -- Subscriptions --

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelSubscriber {
    pub subscriber: UserSummary,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscribedChannel {
    pub channel: UserSummary,
    pub created_at: DateTime<Utc>,
}

// -- Dashboard --

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// Dashboard totals for one channel. The like totals count likes *received*
/// on the owner's videos, comments and tweets, not likes the owner gave.
pub struct ChannelStats {
    pub total_videos: i64,
    pub total_views: i64,
    pub total_subscribers: i64,
    pub total_video_likes: i64,
    pub total_comment_likes: i64,
    pub total_tweet_likes: i64,
}
