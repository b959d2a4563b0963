use anyhow::Result;
use rusqlite::Connection;
use uuid::Uuid;
use vidshare_types::models::{Comment, CommentAuthor, CommentView};

use crate::listing::Page;
use crate::{Database, OptionalExt, now, ts_col, uuid_col};

impl Database {
    pub fn insert_comment(&self, id: Uuid, video: Uuid, owner: Uuid, content: &str) -> Result<Comment> {
        self.with_conn(|conn| {
            let ts = now();
            conn.execute(
                "INSERT INTO comments (id, video_id, owner_id, content, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
                rusqlite::params![id.to_string(), video.to_string(), owner.to_string(), content, ts],
            )?;
            query_comment(conn, id)?.ok_or_else(|| anyhow::anyhow!("Comment vanished after insert: {}", id))
        })
    }

    pub fn get_comment(&self, id: Uuid) -> Result<Option<Comment>> {
        self.with_conn(|conn| query_comment(conn, id))
    }

    pub fn comment_exists(&self, id: Uuid) -> Result<bool> {
        self.with_conn(|conn| {
            let found: Option<i64> = conn
                .query_row("SELECT 1 FROM comments WHERE id = ?1", [id.to_string()], |row| row.get(0))
                .optional()?;
            Ok(found.is_some())
        })
    }

    /// Comments on a video with their authors, oldest first.
    pub fn video_comments(&self, video: Uuid, page: Page) -> Result<Vec<CommentView>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT c.id, c.content, c.created_at, u.id, u.username, u.avatar
                 FROM comments c
                 JOIN users u ON u.id = c.owner_id
                 WHERE c.video_id = ?1
                 ORDER BY c.created_at ASC, c.rowid ASC
                 LIMIT ?2 OFFSET ?3",
            )?;

            let rows = stmt
                .query_map(
                    rusqlite::params![video.to_string(), page.limit(), page.skip() as i64],
                    |row| {
                        Ok(CommentView {
                            id: uuid_col(row, 0)?,
                            content: row.get(1)?,
                            created_at: ts_col(row, 2)?,
                            created_by: CommentAuthor {
                                user_id: uuid_col(row, 3)?,
                                username: row.get(4)?,
                                avatar: row.get(5)?,
                            },
                        })
                    },
                )?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    pub fn update_comment(&self, id: Uuid, owner: Uuid, content: &str) -> Result<Option<Comment>> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE comments SET content = ?3, updated_at = ?4 WHERE id = ?1 AND owner_id = ?2",
                rusqlite::params![id.to_string(), owner.to_string(), content, now()],
            )?;
            if changed == 0 {
                return Ok(None);
            }
            query_comment(conn, id)
        })
    }

    pub fn delete_comment(&self, id: Uuid, owner: Uuid) -> Result<bool> {
        self.with_conn(|conn| {
            let deleted = conn.execute(
                "DELETE FROM comments WHERE id = ?1 AND owner_id = ?2",
                [id.to_string(), owner.to_string()],
            )?;
            Ok(deleted > 0)
        })
    }
}

fn query_comment(conn: &Connection, id: Uuid) -> Result<Option<Comment>> {
    let mut stmt = conn.prepare(
        "SELECT id, video_id, owner_id, content, created_at, updated_at FROM comments WHERE id = ?1",
    )?;

    let row = stmt
        .query_row([id.to_string()], |row| {
            Ok(Comment {
                id: uuid_col(row, 0)?,
                video: uuid_col(row, 1)?,
                owner: uuid_col(row, 2)?,
                content: row.get(3)?,
                created_at: ts_col(row, 4)?,
                updated_at: ts_col(row, 5)?,
            })
        })
        .optional()?;

    Ok(row)
}
