//! HTTP surface of the video sharing backend.

pub mod comments;
pub mod dashboard;
pub mod error;
pub mod likes;
pub mod middleware;
pub mod playlists;
pub mod response;
pub mod state;
pub mod subscriptions;
pub mod tweets;
pub mod uploads;
pub mod validate;
pub mod videos;

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, patch, post},
};

pub use error::ApiError;
pub use response::{ApiResponse, Empty};
pub use state::{AppState, AppStateInner};

use crate::middleware::require_auth;

pub const API_PREFIX: &str = "/api/v1";

/// All routes under `/api/v1`. Everything but `/health` requires a token.
pub fn router(state: AppState) -> Router {
    let public_routes = Router::new().route("/health", get(health));

    let protected_routes = Router::new()
        // Videos
        .route("/videos", get(videos::list_videos).post(videos::publish_video))
        .route(
            "/videos/{video_id}",
            get(videos::get_video)
                .patch(videos::update_video)
                .delete(videos::delete_video),
        )
        .route("/videos/toggle/publish/{video_id}", patch(videos::toggle_publish))
        // Comments
        .route(
            "/comments/{video_id}",
            get(comments::video_comments).post(comments::add_comment),
        )
        .route(
            "/comments/c/{comment_id}",
            patch(comments::update_comment).delete(comments::delete_comment),
        )
        // Tweets
        .route("/tweets", post(tweets::create_tweet))
        .route("/tweets/user/{user_id}", get(tweets::user_tweets))
        .route(
            "/tweets/{tweet_id}",
            patch(tweets::update_tweet).delete(tweets::delete_tweet),
        )
        // Likes
        .route("/likes/toggle/v/{video_id}", post(likes::toggle_video_like))
        .route("/likes/toggle/c/{comment_id}", post(likes::toggle_comment_like))
        .route("/likes/toggle/t/{tweet_id}", post(likes::toggle_tweet_like))
        .route("/likes/videos", get(likes::liked_videos))
        // Subscriptions
        .route(
            "/subscriptions/c/{channel_id}",
            get(subscriptions::channel_subscribers).post(subscriptions::toggle_subscription),
        )
        .route("/subscriptions/u/{subscriber_id}", get(subscriptions::subscribed_channels))
        // Playlists
        .route("/playlist", post(playlists::create_playlist))
        .route(
            "/playlist/{playlist_id}",
            get(playlists::get_playlist)
                .patch(playlists::update_playlist)
                .delete(playlists::delete_playlist),
        )
        .route("/playlist/add/{video_id}/{playlist_id}", patch(playlists::add_video))
        .route("/playlist/remove/{video_id}/{playlist_id}", patch(playlists::remove_video))
        .route("/playlist/user/{user_id}", get(playlists::user_playlists))
        // Dashboard
        .route("/dashboard/stats", get(dashboard::channel_stats))
        .route("/dashboard/videos", get(dashboard::channel_videos))
        .layer(axum_middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new().nest(
        API_PREFIX,
        public_routes.merge(protected_routes).with_state(state),
    )
}

async fn health() -> ApiResponse<Empty> {
    ApiResponse::success(Empty {})
}
