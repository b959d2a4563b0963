mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::{app, id_of};

#[tokio::test]
async fn video_like_toggles_back_and_forth() {
    let app = app();
    let alice = app.user("alice");
    let bob = app.user("bob");
    let video = app.publish(&alice, "Likeable").await;
    let uri = format!("/api/v1/likes/toggle/v/{}", video);

    let (status, body) = app.call("POST", &uri, Some(&bob), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Video liked successfully");
    assert_eq!(body["data"], json!({}));

    let (_, liked) = app.call("GET", "/api/v1/likes/videos", Some(&bob), None).await;
    assert_eq!(liked["data"].as_array().unwrap().len(), 1);
    assert_eq!(liked["data"][0]["video"]["title"], "Likeable");

    let (status, body) = app.call("POST", &uri, Some(&bob), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Video unliked successfully");
    assert_eq!(body["data"], json!({}));

    let (_, liked) = app.call("GET", "/api/v1/likes/videos", Some(&bob), None).await;
    assert_eq!(liked["data"], json!([]));

    // Odd number of calls leaves it liked.
    app.call("POST", &uri, Some(&bob), None).await;
    let (_, stats) = app.call("GET", "/api/v1/dashboard/stats", Some(&alice), None).await;
    assert_eq!(stats["data"]["totalVideoLikes"], 1);
}

#[tokio::test]
async fn like_targets_must_exist_and_parse() {
    let app = app();
    let bob = app.user("bob");

    let (status, body) = app.call("POST", "/api/v1/likes/toggle/c/garbage", Some(&bob), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid Comment ID");

    let missing = uuid::Uuid::new_v4();
    let (status, _) = app
        .call("POST", &format!("/api/v1/likes/toggle/t/{}", missing), Some(&bob), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn comment_and_tweet_likes() {
    let app = app();
    let alice = app.user("alice");
    let bob = app.user("bob");
    let video = app.publish(&alice, "Discussed").await;

    let (_, comment) = app
        .call(
            "POST",
            &format!("/api/v1/comments/{}", video),
            Some(&alice),
            Some(json!({ "content": "first!" })),
        )
        .await;
    let comment = id_of(&comment["data"]);

    let (_, tweet) = app
        .call("POST", "/api/v1/tweets", Some(&alice), Some(json!({ "content": "new video up" })))
        .await;
    let tweet = id_of(&tweet["data"]);

    let (_, body) = app
        .call("POST", &format!("/api/v1/likes/toggle/c/{}", comment), Some(&bob), None)
        .await;
    assert_eq!(body["message"], "Comment liked successfully");
    let (_, body) = app
        .call("POST", &format!("/api/v1/likes/toggle/t/{}", tweet), Some(&bob), None)
        .await;
    assert_eq!(body["message"], "Tweet liked successfully");

    let (_, stats) = app.call("GET", "/api/v1/dashboard/stats", Some(&alice), None).await;
    assert_eq!(stats["data"]["totalCommentLikes"], 1);
    assert_eq!(stats["data"]["totalTweetLikes"], 1);
    assert_eq!(stats["data"]["totalVideoLikes"], 0);
    assert_eq!(stats["data"]["totalVideos"], 1);
}

#[tokio::test]
async fn subscriptions_toggle_and_list() {
    let app = app();
    let alice = app.user("alice");
    let bob = app.user("bob");
    let uri = format!("/api/v1/subscriptions/c/{}", alice.id);

    let (_, body) = app.call("GET", &uri, Some(&bob), None).await;
    assert_eq!(body["data"], json!([]));

    let (status, body) = app.call("POST", &uri, Some(&bob), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Subscribed successfully");

    let (_, body) = app.call("GET", &uri, Some(&bob), None).await;
    assert_eq!(body["data"][0]["subscriber"]["username"], "bob");

    let (_, body) = app
        .call("GET", &format!("/api/v1/subscriptions/u/{}", bob.id), Some(&bob), None)
        .await;
    assert_eq!(body["data"][0]["channel"]["username"], "alice");

    let (_, stats) = app.call("GET", "/api/v1/dashboard/stats", Some(&alice), None).await;
    assert_eq!(stats["data"]["totalSubscribers"], 1);

    let (_, body) = app.call("POST", &uri, Some(&bob), None).await;
    assert_eq!(body["message"], "Unsubscribed successfully");
    let (_, body) = app.call("GET", &uri, Some(&bob), None).await;
    assert_eq!(body["data"], json!([]));
}

#[tokio::test]
async fn cannot_subscribe_to_self_or_ghosts() {
    let app = app();
    let alice = app.user("alice");

    let (status, _) = app
        .call("POST", &format!("/api/v1/subscriptions/c/{}", alice.id), Some(&alice), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let ghost = uuid::Uuid::new_v4();
    let (status, _) = app
        .call("POST", &format!("/api/v1/subscriptions/c/{}", ghost), Some(&alice), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn comments_are_paged_in_posting_order() {
    let app = app();
    let alice = app.user("alice");
    let video = app.publish(&alice, "Chatty").await;
    let uri = format!("/api/v1/comments/{}", video);

    for n in 1..=3 {
        let (status, _) = app
            .call("POST", &uri, Some(&alice), Some(json!({ "content": format!("comment {}", n) })))
            .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (_, body) = app.call("GET", &format!("{}?page=2&limit=2", uri), Some(&alice), None).await;
    let data = body["data"].as_array().unwrap();
    assert_eq!(data.len(), 1);
    assert_eq!(data[0]["content"], "comment 3");
    assert_eq!(data[0]["createdBy"]["username"], "alice");
    assert_eq!(data[0]["createdBy"]["userId"], alice.id.to_string());

    let (status, _) = app.call("GET", &format!("{}?page=0", uri), Some(&alice), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn comment_content_and_ownership_rules() {
    let app = app();
    let alice = app.user("alice");
    let bob = app.user("bob");
    let video = app.publish(&alice, "Rules").await;

    let (status, _) = app
        .call(
            "POST",
            &format!("/api/v1/comments/{}", video),
            Some(&bob),
            Some(json!({ "content": "  " })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .call(
            "POST",
            &format!("/api/v1/comments/{}", video),
            Some(&bob),
            Some(json!({ "content": "hi", "spam": true })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, body) = app
        .call(
            "POST",
            &format!("/api/v1/comments/{}", video),
            Some(&bob),
            Some(json!({ "content": "nice" })),
        )
        .await;
    let comment = id_of(&body["data"]);
    let uri = format!("/api/v1/comments/c/{}", comment);

    let (status, _) = app
        .call("PATCH", &uri, Some(&alice), Some(json!({ "content": "edited by alice" })))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = app.call("DELETE", &uri, Some(&alice), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app
        .call("PATCH", &uri, Some(&bob), Some(json!({ "content": "very nice" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["content"], "very nice");

    let (status, _) = app.call("DELETE", &uri, Some(&bob), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app.call("DELETE", &uri, Some(&bob), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn tweets_lifecycle() {
    let app = app();
    let alice = app.user("alice");
    let bob = app.user("bob");
    let timeline = format!("/api/v1/tweets/user/{}", alice.id);

    let (status, body) = app.call("GET", &timeline, Some(&bob), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!([]));

    app.call("POST", "/api/v1/tweets", Some(&alice), Some(json!({ "content": "older" })))
        .await;
    let (_, body) = app
        .call("POST", "/api/v1/tweets", Some(&alice), Some(json!({ "content": "newer" })))
        .await;
    let tweet = id_of(&body["data"]);

    let (_, body) = app.call("GET", &timeline, Some(&bob), None).await;
    let contents: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["content"].as_str().unwrap())
        .collect();
    assert_eq!(contents, vec!["newer", "older"]);

    let uri = format!("/api/v1/tweets/{}", tweet);
    let (status, _) = app
        .call("PATCH", &uri, Some(&bob), Some(json!({ "content": "mine now" })))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app
        .call("PATCH", &uri, Some(&alice), Some(json!({ "content": "newest" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["content"], "newest");

    let (status, _) = app.call("DELETE", &uri, Some(&alice), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app.call("POST", "/api/v1/tweets", Some(&alice), Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app.call("GET", "/api/v1/tweets/user/xyz", Some(&alice), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
