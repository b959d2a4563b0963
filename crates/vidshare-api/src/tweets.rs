use axum::{
    Extension, Json,
    extract::{Path, State},
};
use axum_extra::extract::WithRejection;
use tracing::info;
use uuid::Uuid;

use vidshare_types::api::{Claims, ContentRequest};
use vidshare_types::models::Tweet;

use crate::error::ApiError;
use crate::response::{ApiResponse, Empty};
use crate::state::{AppState, with_db};
use crate::validate::{exists, owned_by, parse_id, required};

pub async fn create_tweet(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    WithRejection(Json(req), _): WithRejection<Json<ContentRequest>, ApiError>,
) -> Result<ApiResponse<Tweet>, ApiError> {
    let content = required(req.content, "Content is required")?;

    let owner = claims.sub;
    let tweet = with_db(&state, move |db| db.insert_tweet(Uuid::new_v4(), owner, &content)).await?;

    info!("Tweet {} created by {}", tweet.id, owner);
    Ok(ApiResponse::ok(tweet, "Tweet created successfully"))
}

/// Newest first. A user with no tweets gets an empty list.
pub async fn user_tweets(
    State(state): State<AppState>,
    Extension(_claims): Extension<Claims>,
    WithRejection(Path(user_id), _): WithRejection<Path<String>, ApiError>,
) -> Result<ApiResponse<Vec<Tweet>>, ApiError> {
    let user = parse_id(&user_id, "User")?;

    let present = with_db(&state, move |db| db.user_exists(user)).await?;
    exists(present, "User not found")?;

    let tweets = with_db(&state, move |db| db.user_tweets(user)).await?;
    Ok(ApiResponse::ok(tweets, "Tweets fetched successfully"))
}

pub async fn update_tweet(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    WithRejection(Path(tweet_id), _): WithRejection<Path<String>, ApiError>,
    WithRejection(Json(req), _): WithRejection<Json<ContentRequest>, ApiError>,
) -> Result<ApiResponse<Tweet>, ApiError> {
    let id = parse_id(&tweet_id, "Tweet")?;
    let content = required(req.content, "Content is required")?;

    let existing = with_db(&state, move |db| db.get_tweet(id)).await?;
    owned_by(existing, claims.sub, "Tweet not found", "Only the owner can edit this tweet")?;

    let owner = claims.sub;
    let updated = with_db(&state, move |db| db.update_tweet(id, owner, &content)).await?;
    let tweet = updated.ok_or_else(|| ApiError::Internal("Failed to update the tweet".into()))?;

    info!("Tweet {} updated by {}", id, owner);
    Ok(ApiResponse::ok(tweet, "Tweet updated successfully"))
}

pub async fn delete_tweet(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    WithRejection(Path(tweet_id), _): WithRejection<Path<String>, ApiError>,
) -> Result<ApiResponse<Empty>, ApiError> {
    let id = parse_id(&tweet_id, "Tweet")?;

    let existing = with_db(&state, move |db| db.get_tweet(id)).await?;
    owned_by(existing, claims.sub, "Tweet not found", "Only the owner can delete this tweet")?;

    let owner = claims.sub;
    let deleted = with_db(&state, move |db| db.delete_tweet(id, owner)).await?;
    if !deleted {
        return Err(ApiError::Internal("Failed to delete the tweet".into()));
    }

    info!("Tweet {} deleted by {}", id, owner);
    Ok(ApiResponse::ok(Empty {}, "Tweet deleted successfully"))
}
