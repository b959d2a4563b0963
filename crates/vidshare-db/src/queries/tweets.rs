use anyhow::Result;
use rusqlite::{Connection, Row};
use uuid::Uuid;
use vidshare_types::models::Tweet;

use crate::{Database, OptionalExt, now, ts_col, uuid_col};

impl Database {
    pub fn insert_tweet(&self, id: Uuid, owner: Uuid, content: &str) -> Result<Tweet> {
        self.with_conn(|conn| {
            let ts = now();
            conn.execute(
                "INSERT INTO tweets (id, owner_id, content, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?4)",
                rusqlite::params![id.to_string(), owner.to_string(), content, ts],
            )?;
            query_tweet(conn, id)?.ok_or_else(|| anyhow::anyhow!("Tweet vanished after insert: {}", id))
        })
    }

    pub fn get_tweet(&self, id: Uuid) -> Result<Option<Tweet>> {
        self.with_conn(|conn| query_tweet(conn, id))
    }

    pub fn tweet_exists(&self, id: Uuid) -> Result<bool> {
        self.with_conn(|conn| {
            let found: Option<i64> = conn
                .query_row("SELECT 1 FROM tweets WHERE id = ?1", [id.to_string()], |row| row.get(0))
                .optional()?;
            Ok(found.is_some())
        })
    }

    /// Newest first.
    pub fn user_tweets(&self, owner: Uuid) -> Result<Vec<Tweet>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, owner_id, content, created_at, updated_at
                 FROM tweets WHERE owner_id = ?1
                 ORDER BY created_at DESC, rowid DESC",
            )?;
            let rows = stmt
                .query_map([owner.to_string()], tweet_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn update_tweet(&self, id: Uuid, owner: Uuid, content: &str) -> Result<Option<Tweet>> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE tweets SET content = ?3, updated_at = ?4 WHERE id = ?1 AND owner_id = ?2",
                rusqlite::params![id.to_string(), owner.to_string(), content, now()],
            )?;
            if changed == 0 {
                return Ok(None);
            }
            query_tweet(conn, id)
        })
    }

    pub fn delete_tweet(&self, id: Uuid, owner: Uuid) -> Result<bool> {
        self.with_conn(|conn| {
            let deleted = conn.execute(
                "DELETE FROM tweets WHERE id = ?1 AND owner_id = ?2",
                [id.to_string(), owner.to_string()],
            )?;
            Ok(deleted > 0)
        })
    }
}

fn query_tweet(conn: &Connection, id: Uuid) -> Result<Option<Tweet>> {
    let mut stmt = conn.prepare(
        "SELECT id, owner_id, content, created_at, updated_at FROM tweets WHERE id = ?1",
    )?;
    let row = stmt.query_row([id.to_string()], tweet_from_row).optional()?;
    Ok(row)
}

fn tweet_from_row(row: &Row<'_>) -> rusqlite::Result<Tweet> {
    Ok(Tweet {
        id: uuid_col(row, 0)?,
        owner: uuid_col(row, 1)?,
        content: row.get(2)?,
        created_at: ts_col(row, 3)?,
        updated_at: ts_col(row, 4)?,
    })
}

#[cfg(test)]
mod tests {
    use crate::test_support::{db, user};

    use super::*;

    #[test]
    fn test_user_tweets_newest_first() {
        let db = db();
        let alice = user(&db, "alice");
        let bob = user(&db, "bob");

        db.insert_tweet(Uuid::new_v4(), alice, "one").unwrap();
        db.insert_tweet(Uuid::new_v4(), alice, "two").unwrap();
        db.insert_tweet(Uuid::new_v4(), bob, "not alice").unwrap();

        let tweets = db.user_tweets(alice).unwrap();
        let contents: Vec<_> = tweets.iter().map(|t| t.content.as_str()).collect();
        assert_eq!(contents, vec!["two", "one"]);
        assert!(db.user_tweets(Uuid::new_v4()).unwrap().is_empty());
    }

    #[test]
    fn test_tweet_owner_only_mutations() {
        let db = db();
        let alice = user(&db, "alice");
        let bob = user(&db, "bob");
        let id = Uuid::new_v4();
        db.insert_tweet(id, alice, "hello").unwrap();

        assert!(db.update_tweet(id, bob, "pwned").unwrap().is_none());
        assert!(!db.delete_tweet(id, bob).unwrap());
        assert_eq!(db.get_tweet(id).unwrap().unwrap().content, "hello");

        assert_eq!(db.update_tweet(id, alice, "hello again").unwrap().unwrap().content, "hello again");
        assert!(db.delete_tweet(id, alice).unwrap());
        assert!(!db.tweet_exists(id).unwrap());
    }
}
