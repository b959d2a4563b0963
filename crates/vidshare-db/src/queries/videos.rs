use anyhow::Result;
use rusqlite::{Connection, Row};
use uuid::Uuid;
use vidshare_types::models::{UserSummary, Video, VideoListItem};

use crate::listing::VideoListing;
use crate::models::{NewVideo, VideoPatch};
use crate::{Database, OptionalExt, now, ts_col, uuid_col};

const VIDEO_COLUMNS: &str = "id, owner_id, title, description, video_file, thumbnail, duration, views, is_published, created_at, updated_at";

impl Database {
    pub fn insert_video(&self, video: &NewVideo) -> Result<Video> {
        self.with_conn(|conn| {
            let ts = now();
            conn.execute(
                "INSERT INTO videos (id, owner_id, title, description, video_file, thumbnail, duration, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)",
                rusqlite::params![
                    video.id.to_string(),
                    video.owner.to_string(),
                    video.title,
                    video.description,
                    video.video_file,
                    video.thumbnail,
                    video.duration,
                    ts,
                ],
            )?;
            query_video(conn, video.id)?.ok_or_else(|| anyhow::anyhow!("Video vanished after insert: {}", video.id))
        })
    }

    pub fn get_video(&self, id: Uuid) -> Result<Option<Video>> {
        self.with_conn(|conn| query_video(conn, id))
    }

    pub fn video_exists(&self, id: Uuid) -> Result<bool> {
        self.with_conn(|conn| {
            let found: Option<i64> = conn
                .query_row("SELECT 1 FROM videos WHERE id = ?1", [id.to_string()], |row| row.get(0))
                .optional()?;
            Ok(found.is_some())
        })
    }

    pub fn list_videos(&self, listing: &VideoListing) -> Result<Vec<VideoListItem>> {
        let (sql, params) = listing.to_sql();
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map(rusqlite::params_from_iter(params), |row| {
                    Ok(VideoListItem {
                        id: uuid_col(row, 0)?,
                        title: row.get(1)?,
                        description: row.get(2)?,
                        thumbnail: row.get(3)?,
                        video_file: row.get(4)?,
                        views: row.get(5)?,
                        duration: row.get(6)?,
                        created_at: ts_col(row, 7)?,
                        created_by: UserSummary {
                            username: row.get(8)?,
                            avatar: row.get(9)?,
                        },
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Applies `patch` only if `owner` still owns the video.
    /// Returns `None` when no row matched.
    pub fn update_video(&self, id: Uuid, owner: Uuid, patch: &VideoPatch) -> Result<Option<Video>> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE videos
                 SET title = COALESCE(?3, title),
                     description = COALESCE(?4, description),
                     thumbnail = COALESCE(?5, thumbnail),
                     updated_at = ?6
                 WHERE id = ?1 AND owner_id = ?2",
                rusqlite::params![
                    id.to_string(),
                    owner.to_string(),
                    patch.title,
                    patch.description,
                    patch.thumbnail,
                    now(),
                ],
            )?;
            if changed == 0 {
                return Ok(None);
            }
            query_video(conn, id)
        })
    }

    pub fn toggle_publish(&self, id: Uuid, owner: Uuid) -> Result<Option<Video>> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE videos SET is_published = NOT is_published, updated_at = ?3
                 WHERE id = ?1 AND owner_id = ?2",
                rusqlite::params![id.to_string(), owner.to_string(), now()],
            )?;
            if changed == 0 {
                return Ok(None);
            }
            query_video(conn, id)
        })
    }

    /// Comments, likes and playlist entries go with it (ON DELETE CASCADE).
    pub fn delete_video(&self, id: Uuid, owner: Uuid) -> Result<bool> {
        self.with_conn(|conn| {
            let deleted = conn.execute(
                "DELETE FROM videos WHERE id = ?1 AND owner_id = ?2",
                [id.to_string(), owner.to_string()],
            )?;
            Ok(deleted > 0)
        })
    }
}

pub(crate) fn query_video(conn: &Connection, id: Uuid) -> Result<Option<Video>> {
    let mut stmt = conn.prepare(&format!("SELECT {VIDEO_COLUMNS} FROM videos WHERE id = ?1"))?;
    let row = stmt.query_row([id.to_string()], video_from_row).optional()?;
    Ok(row)
}

fn video_from_row(row: &Row<'_>) -> rusqlite::Result<Video> {
    Ok(Video {
        id: uuid_col(row, 0)?,
        owner: uuid_col(row, 1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        video_file: row.get(4)?,
        thumbnail: row.get(5)?,
        duration: row.get(6)?,
        views: row.get(7)?,
        is_published: row.get(8)?,
        created_at: ts_col(row, 9)?,
        updated_at: ts_col(row, 10)?,
    })
}
