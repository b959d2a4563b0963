use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use axum_extra::extract::WithRejection;
use tracing::info;
use uuid::Uuid;

use vidshare_types::api::{Claims, ContentRequest, PageQuery};
use vidshare_types::models::{Comment, CommentView};

use crate::error::ApiError;
use crate::response::{ApiResponse, Empty};
use crate::state::{AppState, with_db};
use crate::validate::{exists, owned_by, page, parse_id, required};

pub async fn video_comments(
    State(state): State<AppState>,
    Extension(_claims): Extension<Claims>,
    WithRejection(Path(video_id), _): WithRejection<Path<String>, ApiError>,
    WithRejection(Query(q), _): WithRejection<Query<PageQuery>, ApiError>,
) -> Result<ApiResponse<Vec<CommentView>>, ApiError> {
    let video = parse_id(&video_id, "Video")?;
    let page = page(q.page, q.limit)?;

    let present = with_db(&state, move |db| db.video_exists(video)).await?;
    exists(present, "Video not found")?;

    let comments = with_db(&state, move |db| db.video_comments(video, page)).await?;
    Ok(ApiResponse::ok(comments, "Comments fetched successfully"))
}

pub async fn add_comment(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    WithRejection(Path(video_id), _): WithRejection<Path<String>, ApiError>,
    WithRejection(Json(req), _): WithRejection<Json<ContentRequest>, ApiError>,
) -> Result<ApiResponse<Comment>, ApiError> {
    let video = parse_id(&video_id, "Video")?;
    let content = required(req.content, "Content is required")?;

    let present = with_db(&state, move |db| db.video_exists(video)).await?;
    exists(present, "Video not found")?;

    let owner = claims.sub;
    let comment = with_db(&state, move |db| db.insert_comment(Uuid::new_v4(), video, owner, &content)).await?;

    info!("Comment {} added to video {} by {}", comment.id, video, owner);
    Ok(ApiResponse::ok(comment, "Comment added successfully"))
}

pub async fn update_comment(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    WithRejection(Path(comment_id), _): WithRejection<Path<String>, ApiError>,
    WithRejection(Json(req), _): WithRejection<Json<ContentRequest>, ApiError>,
) -> Result<ApiResponse<Comment>, ApiError> {
    let id = parse_id(&comment_id, "Comment")?;
    let content = required(req.content, "Content is required")?;

    let existing = with_db(&state, move |db| db.get_comment(id)).await?;
    owned_by(
        existing,
        claims.sub,
        "Comment not found",
        "Only the comment owner can edit this comment",
    )?;

    let owner = claims.sub;
    let updated = with_db(&state, move |db| db.update_comment(id, owner, &content)).await?;
    let comment = updated.ok_or_else(|| ApiError::Internal("Failed to update the comment".into()))?;

    info!("Comment {} updated by {}", id, owner);
    Ok(ApiResponse::ok(comment, "Comment updated successfully"))
}

pub async fn delete_comment(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    WithRejection(Path(comment_id), _): WithRejection<Path<String>, ApiError>,
) -> Result<ApiResponse<Empty>, ApiError> {
    let id = parse_id(&comment_id, "Comment")?;

    let existing = with_db(&state, move |db| db.get_comment(id)).await?;
    owned_by(
        existing,
        claims.sub,
        "Comment not found",
        "Only the comment owner can delete this comment",
    )?;

    let owner = claims.sub;
    let deleted = with_db(&state, move |db| db.delete_comment(id, owner)).await?;
    if !deleted {
        return Err(ApiError::Internal("Failed to delete the comment".into()));
    }

    info!("Comment {} deleted by {}", id, owner);
    Ok(ApiResponse::ok(Empty {}, "Comment deleted successfully"))
}
