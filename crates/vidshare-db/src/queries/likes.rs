use anyhow::Result;
use uuid::Uuid;
use vidshare_types::models::{LikedVideo, LikedVideoDetail, UserSummary};

use super::toggle::toggle_pair;
use crate::models::{LikeTarget, Toggled};
use crate::{Database, ts_col, uuid_col};

impl Database {
    pub fn toggle_like(&self, user: Uuid, target: LikeTarget) -> Result<Toggled> {
        self.with_conn(|conn| {
            toggle_pair(conn, "likes", ("liked_by", user), (target.column(), target.id()))
        })
    }

    #[cfg(test)]
    pub(crate) fn is_liked(&self, user: Uuid, target: LikeTarget) -> Result<bool> {
        use crate::OptionalExt;

        self.with_conn(|conn| {
            let found: Option<i64> = conn
                .query_row(
                    &format!("SELECT 1 FROM likes WHERE liked_by = ?1 AND {} = ?2", target.column()),
                    [user.to_string(), target.id().to_string()],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(found.is_some())
        })
    }

    /// Videos `user` has liked, most recent like first.
    pub fn liked_videos(&self, user: Uuid) -> Result<Vec<LikedVideo>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT v.id, v.title, v.description, v.thumbnail, v.video_file, v.created_at,
                        u.username, u.avatar, l.created_at
                 FROM likes l
                 JOIN videos v ON v.id = l.video_id
                 JOIN users u ON u.id = v.owner_id
                 WHERE l.liked_by = ?1 AND l.video_id IS NOT NULL
                 ORDER BY l.created_at DESC, l.rowid DESC",
            )?;

            let rows = stmt
                .query_map([user.to_string()], |row| {
                    Ok(LikedVideo {
                        video: LikedVideoDetail {
                            id: uuid_col(row, 0)?,
                            title: row.get(1)?,
                            description: row.get(2)?,
                            thumbnail: row.get(3)?,
                            video_file: row.get(4)?,
                            created_at: ts_col(row, 5)?,
                            owner: UserSummary {
                                username: row.get(6)?,
                                avatar: row.get(7)?,
                            },
                        },
                        liked_at: ts_col(row, 8)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::test_support::{db, user, video};

    use super::*;

    #[test]
    fn test_double_toggle_restores_state() {
        let db = db();
        let alice = user(&db, "alice");
        let vid = video(&db, alice, "Clip");
        let target = LikeTarget::Video(vid);

        for n in 1..=4 {
            let state = db.toggle_like(alice, target).unwrap();
            let expected = if n % 2 == 1 { Toggled::On } else { Toggled::Off };
            assert_eq!(state, expected);
            assert_eq!(db.is_liked(alice, target).unwrap(), n % 2 == 1);
        }
    }

    #[test]
    fn test_likes_are_per_target_kind() {
        let db = db();
        let alice = user(&db, "alice");
        let vid = video(&db, alice, "Clip");
        let comment = Uuid::new_v4();
        db.insert_comment(comment, vid, alice, "nice").unwrap();
        let tweet = Uuid::new_v4();
        db.insert_tweet(tweet, alice, "hi").unwrap();

        db.toggle_like(alice, LikeTarget::Comment(comment)).unwrap();
        db.toggle_like(alice, LikeTarget::Tweet(tweet)).unwrap();

        assert!(!db.is_liked(alice, LikeTarget::Video(vid)).unwrap());
        assert!(db.is_liked(alice, LikeTarget::Comment(comment)).unwrap());
        assert!(db.is_liked(alice, LikeTarget::Tweet(tweet)).unwrap());
    }

    #[test]
    fn test_duplicate_like_row_is_rejected_by_store() {
        let db = db();
        let alice = user(&db, "alice");
        let vid = video(&db, alice, "Clip");
        db.toggle_like(alice, LikeTarget::Video(vid)).unwrap();

        let err = db
            .with_conn(|conn| {
                conn.execute(
                    "INSERT INTO likes (id, liked_by, video_id, created_at) VALUES (?1, ?2, ?3, ?4)",
                    [Uuid::new_v4().to_string(), alice.to_string(), vid.to_string(), crate::now()],
                )?;
                Ok(())
            })
            .unwrap_err();
        assert!(crate::is_unique_violation(&err));
    }

    #[test]
    fn test_liked_videos_lists_only_video_likes() {
        let db = db();
        let alice = user(&db, "alice");
        let bob = user(&db, "bob");
        let first = video(&db, bob, "First");
        let second = video(&db, bob, "Second");
        let tweet = Uuid::new_v4();
        db.insert_tweet(tweet, bob, "hi").unwrap();

        db.toggle_like(alice, LikeTarget::Video(first)).unwrap();
        db.toggle_like(alice, LikeTarget::Video(second)).unwrap();
        db.toggle_like(alice, LikeTarget::Tweet(tweet)).unwrap();

        let liked = db.liked_videos(alice).unwrap();
        assert_eq!(liked.len(), 2);
        assert_eq!(liked[0].video.title, "Second");
        assert_eq!(liked[0].video.owner.username, "bob");
        assert!(db.liked_videos(bob).unwrap().is_empty());
    }
}
