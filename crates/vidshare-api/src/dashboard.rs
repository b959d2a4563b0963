use axum::{Extension, extract::State};

use vidshare_types::api::Claims;
use vidshare_types::models::{ChannelStats, ChannelVideo};

use crate::error::ApiError;
use crate::response::ApiResponse;
use crate::state::{AppState, with_db};

/// Totals for the requester's own channel.
pub async fn channel_stats(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<ApiResponse<ChannelStats>, ApiError> {
    let owner = claims.sub;
    let stats = with_db(&state, move |db| db.channel_stats(owner)).await?;
    Ok(ApiResponse::ok(stats, "Channel stats fetched successfully"))
}

/// Every video the requester owns, published or not.
pub async fn channel_videos(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<ApiResponse<Vec<ChannelVideo>>, ApiError> {
    let owner = claims.sub;
    let videos = with_db(&state, move |db| db.channel_videos(owner)).await?;
    Ok(ApiResponse::ok(videos, "Channel videos fetched successfully"))
}
