use axum::{
    Extension,
    extract::{Path, State},
};
use axum_extra::extract::WithRejection;
use tracing::info;

use vidshare_db::{LikeTarget, Toggled};
use vidshare_types::api::Claims;
use vidshare_types::models::LikedVideo;

use crate::error::ApiError;
use crate::response::{ApiResponse, Empty};
use crate::state::{AppState, with_db};
use crate::validate::{exists, parse_id};

pub async fn toggle_video_like(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    WithRejection(Path(video_id), _): WithRejection<Path<String>, ApiError>,
) -> Result<ApiResponse<Empty>, ApiError> {
    let target = LikeTarget::Video(parse_id(&video_id, "Video")?);
    toggle(&state, &claims, target).await
}

pub async fn toggle_comment_like(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    WithRejection(Path(comment_id), _): WithRejection<Path<String>, ApiError>,
) -> Result<ApiResponse<Empty>, ApiError> {
    let target = LikeTarget::Comment(parse_id(&comment_id, "Comment")?);
    toggle(&state, &claims, target).await
}

pub async fn toggle_tweet_like(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    WithRejection(Path(tweet_id), _): WithRejection<Path<String>, ApiError>,
) -> Result<ApiResponse<Empty>, ApiError> {
    let target = LikeTarget::Tweet(parse_id(&tweet_id, "Tweet")?);
    toggle(&state, &claims, target).await
}

async fn toggle(state: &AppState, claims: &Claims, target: LikeTarget) -> Result<ApiResponse<Empty>, ApiError> {
    let noun = match target {
        LikeTarget::Video(_) => "Video",
        LikeTarget::Comment(_) => "Comment",
        LikeTarget::Tweet(_) => "Tweet",
    };

    let present = with_db(state, move |db| match target {
        LikeTarget::Video(id) => db.video_exists(id),
        LikeTarget::Comment(id) => db.comment_exists(id),
        LikeTarget::Tweet(id) => db.tweet_exists(id),
    })
    .await?;
    exists(present, &format!("{} not found", noun))?;

    let user = claims.sub;
    let toggled = with_db(state, move |db| db.toggle_like(user, target)).await?;

    let message = match toggled {
        Toggled::On => format!("{} liked successfully", noun),
        Toggled::Off => format!("{} unliked successfully", noun),
    };
    info!("{} {} by {}: {:?}", noun, target.id(), user, toggled);
    Ok(ApiResponse::ok(Empty {}, message))
}

pub async fn liked_videos(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<ApiResponse<Vec<LikedVideo>>, ApiError> {
    let user = claims.sub;
    let videos = with_db(&state, move |db| db.liked_videos(user)).await?;
    Ok(ApiResponse::ok(videos, "Liked videos fetched successfully"))
}
