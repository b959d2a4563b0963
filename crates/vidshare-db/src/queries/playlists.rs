use anyhow::Result;
use rusqlite::Connection;
use uuid::Uuid;
use vidshare_types::models::{Playlist, PlaylistDetail, PlaylistVideo, UserSummary};

use crate::{Database, OptionalExt, now, ts_col, uuid_col};

impl Database {
    /// Fails with a unique violation when `owner` already has a playlist named `name`.
    pub fn insert_playlist(&self, id: Uuid, owner: Uuid, name: &str, description: &str) -> Result<Playlist> {
        self.with_conn(|conn| {
            let ts = now();
            conn.execute(
                "INSERT INTO playlists (id, owner_id, name, description, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
                rusqlite::params![id.to_string(), owner.to_string(), name, description, ts],
            )?;
            query_playlist(conn, id)?.ok_or_else(|| anyhow::anyhow!("Playlist vanished after insert: {}", id))
        })
    }

    pub fn get_playlist(&self, id: Uuid) -> Result<Option<Playlist>> {
        self.with_conn(|conn| query_playlist(conn, id))
    }

    /// Id of the owner's playlist called `name`, if any.
    pub fn find_playlist_by_name(&self, owner: Uuid, name: &str) -> Result<Option<Uuid>> {
        self.with_conn(|conn| {
            let found: Option<String> = conn
                .query_row(
                    "SELECT id FROM playlists WHERE owner_id = ?1 AND name = ?2",
                    [owner.to_string(), name.to_string()],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(found.and_then(|id| id.parse().ok()))
        })
    }

    pub fn playlist_detail(&self, id: Uuid) -> Result<Option<PlaylistDetail>> {
        self.with_conn(|conn| {
            let head = conn
                .query_row(
                    "SELECT p.id, p.name, p.description, u.username, u.avatar
                     FROM playlists p
                     JOIN users u ON u.id = p.owner_id
                     WHERE p.id = ?1",
                    [id.to_string()],
                    |row| {
                        Ok(PlaylistDetail {
                            id: uuid_col(row, 0)?,
                            name: row.get(1)?,
                            description: row.get(2)?,
                            owner: UserSummary {
                                username: row.get(3)?,
                                avatar: row.get(4)?,
                            },
                            videos: Vec::new(),
                        })
                    },
                )
                .optional()?;

            match head {
                Some(mut detail) => {
                    detail.videos = query_playlist_videos(conn, detail.id)?;
                    Ok(Some(detail))
                }
                None => Ok(None),
            }
        })
    }

    /// Every playlist owned by `owner`, oldest first, with joined videos.
    pub fn user_playlists(&self, owner: Uuid) -> Result<Vec<PlaylistDetail>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT p.id, p.name, p.description, u.username, u.avatar
                 FROM playlists p
                 JOIN users u ON u.id = p.owner_id
                 WHERE p.owner_id = ?1
                 ORDER BY p.created_at ASC, p.rowid ASC",
            )?;

            let mut playlists = stmt
                .query_map([owner.to_string()], |row| {
                    Ok(PlaylistDetail {
                        id: uuid_col(row, 0)?,
                        name: row.get(1)?,
                        description: row.get(2)?,
                        owner: UserSummary {
                            username: row.get(3)?,
                            avatar: row.get(4)?,
                        },
                        videos: Vec::new(),
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            for playlist in &mut playlists {
                playlist.videos = query_playlist_videos(conn, playlist.id)?;
            }

            Ok(playlists)
        })
    }

    pub fn update_playlist(
        &self,
        id: Uuid,
        owner: Uuid,
        name: Option<&str>,
        description: Option<&str>,
    ) -> Result<Option<Playlist>> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE playlists
                 SET name = COALESCE(?3, name),
                     description = COALESCE(?4, description),
                     updated_at = ?5
                 WHERE id = ?1 AND owner_id = ?2",
                rusqlite::params![id.to_string(), owner.to_string(), name, description, now()],
            )?;
            if changed == 0 {
                return Ok(None);
            }
            query_playlist(conn, id)
        })
    }

    pub fn delete_playlist(&self, id: Uuid, owner: Uuid) -> Result<bool> {
        self.with_conn(|conn| {
            let deleted = conn.execute(
                "DELETE FROM playlists WHERE id = ?1 AND owner_id = ?2",
                [id.to_string(), owner.to_string()],
            )?;
            Ok(deleted > 0)
        })
    }

    /// Appends `video` to the end of the playlist. Returns `None` if `owner`
    /// does not own it; a video already present fails with a unique violation.
    pub fn add_playlist_video(&self, id: Uuid, owner: Uuid, video: Uuid) -> Result<Option<Playlist>> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let ts = now();

            let touched = tx.execute(
                "UPDATE playlists SET updated_at = ?3 WHERE id = ?1 AND owner_id = ?2",
                rusqlite::params![id.to_string(), owner.to_string(), ts],
            )?;
            if touched == 0 {
                return Ok(None);
            }

            tx.execute(
                "INSERT INTO playlist_videos (playlist_id, video_id, position, added_at)
                 VALUES (?1, ?2, (SELECT COALESCE(MAX(position), 0) + 1 FROM playlist_videos WHERE playlist_id = ?1), ?3)",
                rusqlite::params![id.to_string(), video.to_string(), ts],
            )?;

            let playlist = query_playlist(&tx, id)?;
            tx.commit()?;
            Ok(playlist)
        })
    }

    /// Removing a video that is not in the playlist leaves it unchanged.
    pub fn remove_playlist_video(&self, id: Uuid, owner: Uuid, video: Uuid) -> Result<Option<Playlist>> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            let touched = tx.execute(
                "UPDATE playlists SET updated_at = ?3 WHERE id = ?1 AND owner_id = ?2",
                rusqlite::params![id.to_string(), owner.to_string(), now()],
            )?;
            if touched == 0 {
                return Ok(None);
            }

            tx.execute(
                "DELETE FROM playlist_videos WHERE playlist_id = ?1 AND video_id = ?2",
                [id.to_string(), video.to_string()],
            )?;

            let playlist = query_playlist(&tx, id)?;
            tx.commit()?;
            Ok(playlist)
        })
    }
}

fn query_playlist(conn: &Connection, id: Uuid) -> Result<Option<Playlist>> {
    let row = conn
        .query_row(
            "SELECT id, owner_id, name, description, created_at, updated_at FROM playlists WHERE id = ?1",
            [id.to_string()],
            |row| {
                Ok(Playlist {
                    id: uuid_col(row, 0)?,
                    owner: uuid_col(row, 1)?,
                    name: row.get(2)?,
                    description: row.get(3)?,
                    videos: Vec::new(),
                    created_at: ts_col(row, 4)?,
                    updated_at: ts_col(row, 5)?,
                })
            },
        )
        .optional()?;

    let Some(mut playlist) = row else {
        return Ok(None);
    };

    let mut stmt = conn.prepare(
        "SELECT video_id FROM playlist_videos WHERE playlist_id = ?1 ORDER BY position ASC",
    )?;
    playlist.videos = stmt
        .query_map([id.to_string()], |row| uuid_col(row, 0))?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(Some(playlist))
}

fn query_playlist_videos(conn: &Connection, playlist: Uuid) -> Result<Vec<PlaylistVideo>> {
    let mut stmt = conn.prepare(
        "SELECT v.id, v.title, v.thumbnail, v.video_file, v.duration, v.views, u.username, u.avatar
         FROM playlist_videos pv
         JOIN videos v ON v.id = pv.video_id
         JOIN users u ON u.id = v.owner_id
         WHERE pv.playlist_id = ?1
         ORDER BY pv.position ASC",
    )?;

    let rows = stmt
        .query_map([playlist.to_string()], |row| {
            Ok(PlaylistVideo {
                id: uuid_col(row, 0)?,
                title: row.get(1)?,
                thumbnail: row.get(2)?,
                video_file: row.get(3)?,
                duration: row.get(4)?,
                views: row.get(5)?,
                owner: UserSummary {
                    username: row.get(6)?,
                    avatar: row.get(7)?,
                },
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}
