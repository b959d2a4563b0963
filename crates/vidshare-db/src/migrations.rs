use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let version: i64 =
        conn.query_row("SELECT COALESCE(MAX(version), 0) FROM schema_version", [], |r| r.get(0))?;

    if version < 1 {
        info!("Running migration v1 (initial schema)");
        conn.execute_batch(
            "
            CREATE TABLE users (
                id              TEXT PRIMARY KEY,
                username        TEXT NOT NULL UNIQUE,
                email           TEXT NOT NULL UNIQUE,
                full_name       TEXT NOT NULL,
                password_hash   TEXT NOT NULL,
                avatar          TEXT,
                cover_image     TEXT,
                created_at      TEXT NOT NULL,
                updated_at      TEXT NOT NULL
            );

            CREATE TABLE videos (
                id              TEXT PRIMARY KEY,
                owner_id        TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                title           TEXT NOT NULL,
                description     TEXT NOT NULL,
                video_file      TEXT NOT NULL,
                thumbnail       TEXT NOT NULL,
                duration        REAL NOT NULL DEFAULT 0,
                views           INTEGER NOT NULL DEFAULT 0,
                is_published    INTEGER NOT NULL DEFAULT 1,
                created_at      TEXT NOT NULL,
                updated_at      TEXT NOT NULL
            );

            CREATE INDEX idx_videos_owner ON videos(owner_id);

            CREATE TABLE comments (
                id              TEXT PRIMARY KEY,
                video_id        TEXT NOT NULL REFERENCES videos(id) ON DELETE CASCADE,
                owner_id        TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                content         TEXT NOT NULL,
                created_at      TEXT NOT NULL,
                updated_at      TEXT NOT NULL
            );

            CREATE INDEX idx_comments_video ON comments(video_id, created_at);

            CREATE TABLE tweets (
                id              TEXT PRIMARY KEY,
                owner_id        TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                content         TEXT NOT NULL,
                created_at      TEXT NOT NULL,
                updated_at      TEXT NOT NULL
            );

            CREATE INDEX idx_tweets_owner ON tweets(owner_id, created_at);

            CREATE TABLE playlists (
                id              TEXT PRIMARY KEY,
                owner_id        TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                name            TEXT NOT NULL,
                description     TEXT NOT NULL,
                created_at      TEXT NOT NULL,
                updated_at      TEXT NOT NULL,
                UNIQUE(owner_id, name)
            );

            CREATE TABLE playlist_videos (
                playlist_id     TEXT NOT NULL REFERENCES playlists(id) ON DELETE CASCADE,
                video_id        TEXT NOT NULL REFERENCES videos(id) ON DELETE CASCADE,
                position        INTEGER NOT NULL,
                added_at        TEXT NOT NULL,
                PRIMARY KEY (playlist_id, video_id)
            );

            CREATE TABLE subscriptions (
                id              TEXT PRIMARY KEY,
                subscriber_id   TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                channel_id      TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                created_at      TEXT NOT NULL,
                UNIQUE(subscriber_id, channel_id)
            );

            CREATE INDEX idx_subscriptions_channel ON subscriptions(channel_id);

            CREATE TABLE likes (
                id              TEXT PRIMARY KEY,
                liked_by        TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                video_id        TEXT REFERENCES videos(id) ON DELETE CASCADE,
                comment_id      TEXT REFERENCES comments(id) ON DELETE CASCADE,
                tweet_id        TEXT REFERENCES tweets(id) ON DELETE CASCADE,
                created_at      TEXT NOT NULL,
                CHECK ((video_id IS NOT NULL) + (comment_id IS NOT NULL) + (tweet_id IS NOT NULL) = 1)
            );

            CREATE UNIQUE INDEX uq_likes_video ON likes(liked_by, video_id) WHERE video_id IS NOT NULL;
            CREATE UNIQUE INDEX uq_likes_comment ON likes(liked_by, comment_id) WHERE comment_id IS NOT NULL;
            CREATE UNIQUE INDEX uq_likes_tweet ON likes(liked_by, tweet_id) WHERE tweet_id IS NOT NULL;

            INSERT INTO schema_version (version) VALUES (1);
            ",
        )?;
    }

    info!("Database migrations complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        run(&conn).unwrap();
        run(&conn).unwrap();

        let versions: i64 = conn
            .query_row("SELECT COUNT(*) FROM schema_version", [], |r| r.get(0))
            .unwrap();
        assert_eq!(versions, 1);
    }
}
