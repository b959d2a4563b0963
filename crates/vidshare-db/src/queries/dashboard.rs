use anyhow::Result;
use rusqlite::Connection;
use uuid::Uuid;
use vidshare_types::models::{ChannelStats, ChannelVideo};

use crate::{Database, ts_col, uuid_col};

impl Database {
    /// Independent aggregates for one channel, folded into a single object.
    /// Like totals count likes *received* on the owner's content.
    pub fn channel_stats(&self, owner: Uuid) -> Result<ChannelStats> {
        self.with_conn(|conn| {
            let owner = owner.to_string();

            let (total_videos, total_views): (i64, i64) = conn.query_row(
                "SELECT COUNT(*), COALESCE(SUM(views), 0) FROM videos WHERE owner_id = ?1",
                [&owner],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )?;

            Ok(ChannelStats {
                total_videos,
                total_views,
                total_subscribers: count(
                    conn,
                    "SELECT COUNT(*) FROM subscriptions WHERE channel_id = ?1",
                    &owner,
                )?,
                total_video_likes: count(
                    conn,
                    "SELECT COUNT(*) FROM likes l JOIN videos v ON v.id = l.video_id WHERE v.owner_id = ?1",
                    &owner,
                )?,
                total_comment_likes: count(
                    conn,
                    "SELECT COUNT(*) FROM likes l JOIN comments c ON c.id = l.comment_id WHERE c.owner_id = ?1",
                    &owner,
                )?,
                total_tweet_likes: count(
                    conn,
                    "SELECT COUNT(*) FROM likes l JOIN tweets t ON t.id = l.tweet_id WHERE t.owner_id = ?1",
                    &owner,
                )?,
            })
        })
    }

    /// All of the owner's videos, unpublished included, newest first.
    pub fn channel_videos(&self, owner: Uuid) -> Result<Vec<ChannelVideo>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, title, description, thumbnail, views, duration, is_published, created_at
                 FROM videos WHERE owner_id = ?1
                 ORDER BY created_at DESC, rowid DESC",
            )?;
            let rows = stmt
                .query_map([owner.to_string()], |row| {
                    Ok(ChannelVideo {
                        id: uuid_col(row, 0)?,
                        title: row.get(1)?,
                        description: row.get(2)?,
                        thumbnail: row.get(3)?,
                        views: row.get(4)?,
                        duration: row.get(5)?,
                        is_published: row.get(6)?,
                        created_at: ts_col(row, 7)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }
}

fn count(conn: &Connection, sql: &str, owner: &str) -> Result<i64> {
    Ok(conn.query_row(sql, [owner], |row| row.get(0))?)
}
