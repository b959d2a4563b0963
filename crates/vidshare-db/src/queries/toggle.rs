use anyhow::Result;
use rusqlite::Connection;
use uuid::Uuid;

use crate::models::Toggled;
use crate::{OptionalExt, is_unique_violation, now};

/// Create the (actor, target) row if absent, delete it if present.
///
/// The table's uniqueness constraint on the pair settles races: an insert that
/// loses to a concurrent insert means the pair already exists, and a delete
/// that removes nothing means it is already gone.
pub(crate) fn toggle_pair(
    conn: &Connection,
    table: &str,
    (actor_col, actor): (&str, Uuid),
    (target_col, target): (&str, Uuid),
) -> Result<Toggled> {
    let existing: Option<String> = conn
        .query_row(
            &format!("SELECT id FROM {table} WHERE {actor_col} = ?1 AND {target_col} = ?2"),
            [actor.to_string(), target.to_string()],
            |row| row.get(0),
        )
        .optional()?;

    if let Some(existing_id) = existing {
        conn.execute(&format!("DELETE FROM {table} WHERE id = ?1"), [&existing_id])?;
        return Ok(Toggled::Off);
    }

    let inserted = conn.execute(
        &format!(
            "INSERT INTO {table} (id, {actor_col}, {target_col}, created_at) VALUES (?1, ?2, ?3, ?4)"
        ),
        [Uuid::new_v4().to_string(), actor.to_string(), target.to_string(), now()],
    );

    match inserted {
        Ok(_) => Ok(Toggled::On),
        Err(e) => {
            let err = anyhow::Error::from(e);
            if is_unique_violation(&err) {
                Ok(Toggled::On)
            } else {
                Err(err)
            }
        }
    }
}
