use axum::{
    Extension,
    extract::{Multipart, Path, Query, State},
};
use axum_extra::extract::WithRejection;
use tracing::{error, info};
use uuid::Uuid;

use vidshare_db::{NewVideo, SortField, SortOrder, VideoListing, VideoPatch};
use vidshare_types::api::{Claims, VideoListQuery};
use vidshare_types::models::{Video, VideoListItem};

use crate::error::ApiError;
use crate::response::{ApiResponse, Empty};
use crate::state::{AppState, with_db};
use crate::uploads::{self, discard, read_video_form};
use crate::validate::{exists, found, non_blank, owned_by, page, parse_id, required};

pub async fn list_videos(
    State(state): State<AppState>,
    Extension(_claims): Extension<Claims>,
    WithRejection(Query(q), _): WithRejection<Query<VideoListQuery>, ApiError>,
) -> Result<ApiResponse<Vec<VideoListItem>>, ApiError> {
    let page = page(q.page, q.limit)?;

    let sort = match non_blank(q.sort_by) {
        Some(field) => {
            let field: SortField = field.parse().map_err(ApiError::InvalidInput)?;
            Some((field, SortOrder::from_param(q.sort_type.as_deref())))
        }
        None => None,
    };

    let owner = match non_blank(q.user_id) {
        Some(raw) => {
            let owner = parse_id(&raw, "User")?;
            let present = with_db(&state, move |db| db.user_exists(owner)).await?;
            exists(present, "User not found")?;
            Some(owner)
        }
        None => None,
    };

    let listing = VideoListing {
        title_contains: non_blank(q.query),
        owner,
        sort,
        page,
    };
    let videos = with_db(&state, move |db| db.list_videos(&listing)).await?;

    Ok(ApiResponse::ok(videos, "Videos fetched successfully"))
}

pub async fn publish_video(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    WithRejection(multipart, _): WithRejection<Multipart, ApiError>,
) -> Result<ApiResponse<Video>, ApiError> {
    let form = read_video_form(multipart, &state.upload_dir).await?;

    let title = required(form.title, "Title and description are required")?;
    let description = required(form.description, "Title and description are required")?;
    let thumbnail = form
        .thumbnail
        .ok_or_else(|| ApiError::InvalidInput("Thumbnail file is required".into()))?;
    let video_file = form
        .video_file
        .ok_or_else(|| ApiError::InvalidInput("Video file is required".into()))?;
    info!(
        "Publishing video for {} ({} byte thumbnail, {} byte video)",
        claims.sub,
        thumbnail.len(),
        video_file.len()
    );

    let thumb = uploads::upload(state.media(), thumbnail, "thumbnail").await?;
    let media = match uploads::upload(state.media(), video_file, "video file").await {
        Ok(media) => media,
        Err(e) => {
            discard(state.media(), &[thumb.url.as_str()]).await;
            return Err(e);
        }
    };

    let new = NewVideo {
        id: Uuid::new_v4(),
        owner: claims.sub,
        title,
        description,
        video_file: media.url.clone(),
        thumbnail: thumb.url.clone(),
        duration: media.duration.unwrap_or(0.0),
    };
    let video = match with_db(&state, move |db| db.insert_video(&new)).await {
        Ok(video) => video,
        Err(e) => {
            error!("Video record not created; discarding uploaded media");
            discard(state.media(), &[thumb.url.as_str(), media.url.as_str()]).await;
            return Err(e);
        }
    };

    info!("Video {} published by {}", video.id, claims.sub);
    Ok(ApiResponse::ok(video, "Video published successfully"))
}

pub async fn get_video(
    State(state): State<AppState>,
    Extension(_claims): Extension<Claims>,
    WithRejection(Path(video_id), _): WithRejection<Path<String>, ApiError>,
) -> Result<ApiResponse<Video>, ApiError> {
    let id = parse_id(&video_id, "Video")?;
    let video = with_db(&state, move |db| db.get_video(id)).await?;
    let video = found(video, "No video found with this ID")?;

    Ok(ApiResponse::ok(video, "Video fetched successfully"))
}

/// Updates title, description and/or thumbnail. A new thumbnail replaces the
/// old one on the media host before the record changes.
pub async fn update_video(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    WithRejection(Path(video_id), _): WithRejection<Path<String>, ApiError>,
    WithRejection(multipart, _): WithRejection<Multipart, ApiError>,
) -> Result<ApiResponse<Video>, ApiError> {
    let id = parse_id(&video_id, "Video")?;
    let form = read_video_form(multipart, &state.upload_dir).await?;

    if form.title.is_none() && form.description.is_none() && form.thumbnail.is_none() {
        return Err(ApiError::InvalidInput(
            "Title, description or thumbnail is required".into(),
        ));
    }

    let existing = with_db(&state, move |db| db.get_video(id)).await?;
    let existing = owned_by(
        existing,
        claims.sub,
        "No video found with this ID",
        "You are not allowed to update this video",
    )?;

    let mut patch = VideoPatch {
        title: form.title,
        description: form.description,
        thumbnail: None,
    };
    if let Some(thumbnail) = form.thumbnail {
        uploads::delete_remote(state.media(), &existing.thumbnail, "old thumbnail").await?;
        let uploaded = uploads::upload(state.media(), thumbnail, "thumbnail").await?;
        patch.thumbnail = Some(uploaded.url);
    }

    let owner = claims.sub;
    let updated = with_db(&state, move |db| db.update_video(id, owner, &patch)).await?;
    let video = updated.ok_or_else(|| ApiError::Internal("Something went wrong while updating the video".into()))?;

    info!("Video {} updated by {}", id, owner);
    Ok(ApiResponse::ok(video, "Video updated successfully"))
}

pub async fn delete_video(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    WithRejection(Path(video_id), _): WithRejection<Path<String>, ApiError>,
) -> Result<ApiResponse<Empty>, ApiError> {
    let id = parse_id(&video_id, "Video")?;

    let existing = with_db(&state, move |db| db.get_video(id)).await?;
    let existing = owned_by(
        existing,
        claims.sub,
        "No video found with this ID",
        "You are not allowed to delete this video",
    )?;

    uploads::delete_remote(state.media(), &existing.thumbnail, "thumbnail").await?;
    uploads::delete_remote(state.media(), &existing.video_file, "video file").await?;

    let owner = claims.sub;
    let deleted = with_db(&state, move |db| db.delete_video(id, owner)).await?;
    if !deleted {
        return Err(ApiError::Internal("Something went wrong while deleting the video".into()));
    }

    info!("Video {} deleted by {}", id, owner);
    Ok(ApiResponse::ok(Empty {}, "Video deleted successfully"))
}

pub async fn toggle_publish(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    WithRejection(Path(video_id), _): WithRejection<Path<String>, ApiError>,
) -> Result<ApiResponse<Video>, ApiError> {
    let id = parse_id(&video_id, "Video")?;

    let existing = with_db(&state, move |db| db.get_video(id)).await?;
    owned_by(
        existing,
        claims.sub,
        "No video found with this ID",
        "You are not allowed to change the publish status of this video",
    )?;

    let owner = claims.sub;
    let toggled = with_db(&state, move |db| db.toggle_publish(id, owner)).await?;
    let video = toggled.ok_or_else(|| ApiError::Internal("Something went wrong while toggling publish status".into()))?;

    info!("Video {} is_published={}", id, video.is_published);
    Ok(ApiResponse::ok(video, "Publish status modified successfully"))
}
