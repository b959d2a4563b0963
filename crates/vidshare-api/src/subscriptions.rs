use axum::{
    Extension,
    extract::{Path, State},
};
use axum_extra::extract::WithRejection;
use tracing::info;

use vidshare_db::Toggled;
use vidshare_types::api::Claims;
use vidshare_types::models::{ChannelSubscriber, SubscribedChannel};

use crate::error::ApiError;
use crate::response::{ApiResponse, Empty};
use crate::state::{AppState, with_db};
use crate::validate::{exists, parse_id};

pub async fn toggle_subscription(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    WithRejection(Path(channel_id), _): WithRejection<Path<String>, ApiError>,
) -> Result<ApiResponse<Empty>, ApiError> {
    let channel = parse_id(&channel_id, "Channel")?;
    let subscriber = claims.sub;
    if channel == subscriber {
        return Err(ApiError::InvalidInput("You cannot subscribe to your own channel".into()));
    }

    let present = with_db(&state, move |db| db.user_exists(channel)).await?;
    exists(present, "Channel not found")?;

    let toggled = with_db(&state, move |db| db.toggle_subscription(subscriber, channel)).await?;
    info!("Subscription {} -> {}: {:?}", subscriber, channel, toggled);

    let message = match toggled {
        Toggled::On => "Subscribed successfully",
        Toggled::Off => "Unsubscribed successfully",
    };
    Ok(ApiResponse::ok(Empty {}, message))
}

pub async fn channel_subscribers(
    State(state): State<AppState>,
    Extension(_claims): Extension<Claims>,
    WithRejection(Path(channel_id), _): WithRejection<Path<String>, ApiError>,
) -> Result<ApiResponse<Vec<ChannelSubscriber>>, ApiError> {
    let channel = parse_id(&channel_id, "Channel")?;

    let present = with_db(&state, move |db| db.user_exists(channel)).await?;
    exists(present, "Channel not found")?;

    let subscribers = with_db(&state, move |db| db.channel_subscribers(channel)).await?;
    Ok(ApiResponse::ok(subscribers, "Subscribers fetched successfully"))
}

pub async fn subscribed_channels(
    State(state): State<AppState>,
    Extension(_claims): Extension<Claims>,
    WithRejection(Path(subscriber_id), _): WithRejection<Path<String>, ApiError>,
) -> Result<ApiResponse<Vec<SubscribedChannel>>, ApiError> {
    let subscriber = parse_id(&subscriber_id, "Subscriber")?;

    let present = with_db(&state, move |db| db.user_exists(subscriber)).await?;
    exists(present, "User not found")?;

    let channels = with_db(&state, move |db| db.subscribed_channels(subscriber)).await?;
    Ok(ApiResponse::ok(channels, "Subscribed channels fetched successfully"))
}
