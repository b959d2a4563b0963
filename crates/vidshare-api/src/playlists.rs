use axum::{
    Extension, Json,
    extract::{Path, State},
};
use axum_extra::extract::WithRejection;
use tracing::info;
use uuid::Uuid;

use vidshare_db::is_unique_violation;
use vidshare_types::api::{Claims, PlaylistRequest};
use vidshare_types::models::{Playlist, PlaylistDetail};

use crate::error::ApiError;
use crate::response::{ApiResponse, Empty};
use crate::state::{AppState, try_db, with_db};
use crate::validate::{exists, found, non_blank, owned_by, parse_id, required};

const DUPLICATE_NAME: &str = "You already have a playlist with this name";

/// Unique violations on the (owner, name) pair or on membership surface as
/// `Conflict`; anything else is a store failure.
fn conflict_or_store(err: anyhow::Error, message: &str) -> ApiError {
    if is_unique_violation(&err) {
        ApiError::Conflict(message.into())
    } else {
        ApiError::store(err)
    }
}

pub async fn create_playlist(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    WithRejection(Json(req), _): WithRejection<Json<PlaylistRequest>, ApiError>,
) -> Result<ApiResponse<Playlist>, ApiError> {
    let name = required(req.name, "Name and description are required")?;
    let description = required(req.description, "Name and description are required")?;

    let owner = claims.sub;
    let lookup = name.clone();
    let taken = with_db(&state, move |db| db.find_playlist_by_name(owner, &lookup)).await?;
    if taken.is_some() {
        return Err(ApiError::Conflict(DUPLICATE_NAME.into()));
    }

    let playlist = try_db(&state, move |db| db.insert_playlist(Uuid::new_v4(), owner, &name, &description))
        .await
        .map_err(|e| conflict_or_store(e, DUPLICATE_NAME))?;

    info!("Playlist {} created by {}", playlist.id, owner);
    Ok(ApiResponse::ok(playlist, "Playlist created successfully"))
}

pub async fn get_playlist(
    State(state): State<AppState>,
    Extension(_claims): Extension<Claims>,
    WithRejection(Path(playlist_id), _): WithRejection<Path<String>, ApiError>,
) -> Result<ApiResponse<PlaylistDetail>, ApiError> {
    let id = parse_id(&playlist_id, "Playlist")?;
    let detail = with_db(&state, move |db| db.playlist_detail(id)).await?;
    let detail = found(detail, "Playlist not found")?;

    Ok(ApiResponse::ok(detail, "Playlist fetched successfully"))
}

pub async fn user_playlists(
    State(state): State<AppState>,
    Extension(_claims): Extension<Claims>,
    WithRejection(Path(user_id), _): WithRejection<Path<String>, ApiError>,
) -> Result<ApiResponse<Vec<PlaylistDetail>>, ApiError> {
    let user = parse_id(&user_id, "User")?;

    let present = with_db(&state, move |db| db.user_exists(user)).await?;
    exists(present, "User not found")?;

    let playlists = with_db(&state, move |db| db.user_playlists(user)).await?;
    Ok(ApiResponse::ok(playlists, "User playlists fetched successfully"))
}

pub async fn update_playlist(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    WithRejection(Path(playlist_id), _): WithRejection<Path<String>, ApiError>,
    WithRejection(Json(req), _): WithRejection<Json<PlaylistRequest>, ApiError>,
) -> Result<ApiResponse<Playlist>, ApiError> {
    let id = parse_id(&playlist_id, "Playlist")?;
    let name = non_blank(req.name);
    let description = non_blank(req.description);
    if name.is_none() && description.is_none() {
        return Err(ApiError::InvalidInput("Name or description is required".into()));
    }

    let existing = with_db(&state, move |db| db.get_playlist(id)).await?;
    owned_by(
        existing,
        claims.sub,
        "Playlist not found",
        "You are not allowed to update this playlist",
    )?;

    let owner = claims.sub;
    if let Some(name) = name.clone() {
        let taken = with_db(&state, move |db| db.find_playlist_by_name(owner, &name)).await?;
        if taken.is_some_and(|other| other != id) {
            return Err(ApiError::Conflict(DUPLICATE_NAME.into()));
        }
    }

    let updated = try_db(&state, move |db| {
        db.update_playlist(id, owner, name.as_deref(), description.as_deref())
    })
    .await
    .map_err(|e| conflict_or_store(e, DUPLICATE_NAME))?;
    let playlist = updated.ok_or_else(|| ApiError::Internal("Failed to update the playlist".into()))?;

    info!("Playlist {} updated by {}", id, owner);
    Ok(ApiResponse::ok(playlist, "Playlist updated successfully"))
}

pub async fn delete_playlist(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    WithRejection(Path(playlist_id), _): WithRejection<Path<String>, ApiError>,
) -> Result<ApiResponse<Empty>, ApiError> {
    let id = parse_id(&playlist_id, "Playlist")?;

    let existing = with_db(&state, move |db| db.get_playlist(id)).await?;
    owned_by(
        existing,
        claims.sub,
        "Playlist not found",
        "You are not allowed to delete this playlist",
    )?;

    let owner = claims.sub;
    let deleted = with_db(&state, move |db| db.delete_playlist(id, owner)).await?;
    if !deleted {
        return Err(ApiError::Internal("Failed to delete the playlist".into()));
    }

    info!("Playlist {} deleted by {}", id, owner);
    Ok(ApiResponse::ok(Empty {}, "Playlist deleted successfully"))
}

pub async fn add_video(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    WithRejection(Path((video_id, playlist_id)), _): WithRejection<Path<(String, String)>, ApiError>,
) -> Result<ApiResponse<Playlist>, ApiError> {
    let video = parse_id(&video_id, "Video")?;
    let id = parse_id(&playlist_id, "Playlist")?;

    let existing = with_db(&state, move |db| db.get_playlist(id)).await?;
    let playlist = owned_by(
        existing,
        claims.sub,
        "Playlist not found",
        "You are not allowed to modify this playlist",
    )?;

    let present = with_db(&state, move |db| db.video_exists(video)).await?;
    exists(present, "Video not found")?;

    if playlist.videos.contains(&video) {
        return Err(ApiError::Conflict("Video is already in the playlist".into()));
    }

    let owner = claims.sub;
    let updated = try_db(&state, move |db| db.add_playlist_video(id, owner, video))
        .await
        .map_err(|e| conflict_or_store(e, "Video is already in the playlist"))?;
    let playlist = updated.ok_or_else(|| ApiError::Internal("Failed to add the video to the playlist".into()))?;

    info!("Video {} added to playlist {}", video, id);
    Ok(ApiResponse::ok(playlist, "Video added to playlist successfully"))
}

pub async fn remove_video(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    WithRejection(Path((video_id, playlist_id)), _): WithRejection<Path<(String, String)>, ApiError>,
) -> Result<ApiResponse<Playlist>, ApiError> {
    let video = parse_id(&video_id, "Video")?;
    let id = parse_id(&playlist_id, "Playlist")?;

    let existing = with_db(&state, move |db| db.get_playlist(id)).await?;
    owned_by(
        existing,
        claims.sub,
        "Playlist not found",
        "You are not allowed to modify this playlist",
    )?;

    let present = with_db(&state, move |db| db.video_exists(video)).await?;
    exists(present, "Video not found")?;

    let owner = claims.sub;
    let updated = with_db(&state, move |db| db.remove_playlist_video(id, owner, video)).await?;
    let playlist = updated.ok_or_else(|| ApiError::Internal("Failed to remove the video from the playlist".into()))?;

    info!("Video {} removed from playlist {}", video, id);
    Ok(ApiResponse::ok(playlist, "Video removed from playlist successfully"))
}
