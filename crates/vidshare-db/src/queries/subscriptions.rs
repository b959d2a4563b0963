use anyhow::Result;
use uuid::Uuid;
use vidshare_types::models::{ChannelSubscriber, SubscribedChannel, UserSummary};

use super::toggle::toggle_pair;
use crate::models::Toggled;
use crate::{Database, ts_col};

impl Database {
    pub fn toggle_subscription(&self, subscriber: Uuid, channel: Uuid) -> Result<Toggled> {
        self.with_conn(|conn| {
            toggle_pair(conn, "subscriptions", ("subscriber_id", subscriber), ("channel_id", channel))
        })
    }

    #[cfg(test)]
    pub(crate) fn is_subscribed(&self, subscriber: Uuid, channel: Uuid) -> Result<bool> {
        use crate::OptionalExt;

        self.with_conn(|conn| {
            let found: Option<i64> = conn
                .query_row(
                    "SELECT 1 FROM subscriptions WHERE subscriber_id = ?1 AND channel_id = ?2",
                    [subscriber.to_string(), channel.to_string()],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(found.is_some())
        })
    }

    pub fn channel_subscribers(&self, channel: Uuid) -> Result<Vec<ChannelSubscriber>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT u.username, u.avatar, s.created_at
                 FROM subscriptions s
                 JOIN users u ON u.id = s.subscriber_id
                 WHERE s.channel_id = ?1
                 ORDER BY s.created_at DESC, s.rowid DESC",
            )?;
            let rows = stmt
                .query_map([channel.to_string()], |row| {
                    Ok(ChannelSubscriber {
                        subscriber: UserSummary {
                            username: row.get(0)?,
                            avatar: row.get(1)?,
                        },
                        created_at: ts_col(row, 2)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn subscribed_channels(&self, subscriber: Uuid) -> Result<Vec<SubscribedChannel>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT u.username, u.avatar, s.created_at
                 FROM subscriptions s
                 JOIN users u ON u.id = s.channel_id
                 WHERE s.subscriber_id = ?1
                 ORDER BY s.created_at DESC, s.rowid DESC",
            )?;
            let rows = stmt
                .query_map([subscriber.to_string()], |row| {
                    Ok(SubscribedChannel {
                        channel: UserSummary {
                            username: row.get(0)?,
                            avatar: row.get(1)?,
                        },
                        created_at: ts_col(row, 2)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }
}
