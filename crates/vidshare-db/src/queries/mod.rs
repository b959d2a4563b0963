mod comments;
mod dashboard;
mod likes;
mod playlists;
mod subscriptions;
mod toggle;
mod tweets;
mod users;
mod videos;
