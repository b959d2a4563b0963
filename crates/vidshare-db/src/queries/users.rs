use anyhow::Result;
use uuid::Uuid;

use crate::models::NewUser;
use crate::{Database, OptionalExt, now};

impl Database {
    /// Users are registered by the account service; this is its write path
    /// into the shared store.
    pub fn create_user(&self, user: &NewUser) -> Result<()> {
        self.with_conn(|conn| {
            let ts = now();
            conn.execute(
                "INSERT INTO users (id, username, email, full_name, password_hash, avatar, cover_image, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)",
                rusqlite::params![
                    user.id.to_string(),
                    user.username.to_lowercase(),
                    user.email,
                    user.full_name,
                    user.password_hash,
                    user.avatar,
                    user.cover_image,
                    ts,
                ],
            )?;
            Ok(())
        })
    }

    pub fn user_exists(&self, id: Uuid) -> Result<bool> {
        self.with_conn(|conn| {
            let found: Option<i64> = conn
                .query_row("SELECT 1 FROM users WHERE id = ?1", [id.to_string()], |row| row.get(0))
                .optional()?;
            Ok(found.is_some())
        })
    }
}

#[cfg(test)]
impl Database {
    pub(crate) fn get_user(&self, id: Uuid) -> Result<Option<vidshare_types::models::User>> {
        self.with_conn(|conn| query_user(conn, id))
    }
}

#[cfg(test)]
fn query_user(conn: &rusqlite::Connection, id: Uuid) -> Result<Option<vidshare_types::models::User>> {
    use crate::{ts_col, uuid_col};
    use vidshare_types::models::User;

    let mut stmt = conn.prepare(
        "SELECT id, username, email, full_name, avatar, cover_image, created_at FROM users WHERE id = ?1",
    )?;

    let row = stmt
        .query_row([id.to_string()], |row| {
            Ok(User {
                id: uuid_col(row, 0)?,
                username: row.get(1)?,
                email: row.get(2)?,
                full_name: row.get(3)?,
                avatar: row.get(4)?,
                cover_image: row.get(5)?,
                created_at: ts_col(row, 6)?,
            })
        })
        .optional()?;

    Ok(row)
}
