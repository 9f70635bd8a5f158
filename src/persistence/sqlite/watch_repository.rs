//! Implementation of the WatchRepository trait for SqliteStateRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

use crate::{
    models::{ChannelBinding, Watch, WatchRecord},
    persistence::{error::PersistenceError, sqlite::SqliteStateRepository, traits::WatchRepository},
};

/// Flat row shape of the `watches` table.
#[derive(FromRow)]
struct WatchRow {
    owner_id: String,
    entity_id: String,
    guild_id: String,
    entity_name: String,
    channel_id: Option<String>,
    last_known_online: bool,
    last_online_at: DateTime<Utc>,
    last_notified_offline_at: Option<DateTime<Utc>>,
    last_channel_offline_notified_at: Option<DateTime<Utc>>,
    last_dm_offline_notified_at: Option<DateTime<Utc>>,
    last_channel_online_notified_at: Option<DateTime<Utc>>,
    last_dm_online_notified_at: Option<DateTime<Utc>>,
}

impl From<WatchRow> for Watch {
    fn from(row: WatchRow) -> Self {
        Watch {
            entity_name: row.entity_name,
            channel: row.channel_id.map(|channel_id| ChannelBinding { channel_id }),
            record: WatchRecord {
                owner_id: row.owner_id,
                entity_id: row.entity_id,
                guild_id: row.guild_id,
                last_known_online: row.last_known_online,
                last_online_at: row.last_online_at,
                last_notified_offline_at: row.last_notified_offline_at,
                last_channel_offline_notified_at: row.last_channel_offline_notified_at,
                last_dm_offline_notified_at: row.last_dm_offline_notified_at,
                last_channel_online_notified_at: row.last_channel_online_notified_at,
                last_dm_online_notified_at: row.last_dm_online_notified_at,
            },
        }
    }
}

const SELECT_COLUMNS: &str = "owner_id, entity_id, guild_id, entity_name, channel_id, \
     last_known_online, last_online_at, last_notified_offline_at, \
     last_channel_offline_notified_at, last_dm_offline_notified_at, \
     last_channel_online_notified_at, last_dm_online_notified_at";

#[async_trait]
impl WatchRepository for SqliteStateRepository {
    #[tracing::instrument(skip(self), level = "debug")]
    async fn list_watches(&self) -> Result<Vec<Watch>, PersistenceError> {
        let rows = self
            .execute_query_with_error_handling(
                "list watches",
                sqlx::query_as::<_, WatchRow>(&format!(
                    "SELECT {SELECT_COLUMNS} FROM watches ORDER BY owner_id, entity_id, guild_id"
                ))
                .fetch_all(self.pool()),
            )
            .await?;

        Ok(rows.into_iter().map(Watch::from).collect())
    }

    #[tracing::instrument(skip(self), level = "debug")]
    async fn get_watch(
        &self,
        owner_id: &str,
        entity_id: &str,
        guild_id: &str,
    ) -> Result<Option<Watch>, PersistenceError> {
        let row = self
            .execute_query_with_error_handling(
                "get watch",
                sqlx::query_as::<_, WatchRow>(&format!(
                    "SELECT {SELECT_COLUMNS} FROM watches \
                     WHERE owner_id = ? AND entity_id = ? AND guild_id = ?"
                ))
                .bind(owner_id)
                .bind(entity_id)
                .bind(guild_id)
                .fetch_optional(self.pool()),
            )
            .await?;

        Ok(row.map(Watch::from))
    }

    #[tracing::instrument(skip(self, watch), level = "debug")]
    async fn add_watch(&self, watch: &Watch) -> Result<(), PersistenceError> {
        let record = &watch.record;
        let result = sqlx::query(
            "INSERT INTO watches (owner_id, entity_id, guild_id, entity_name, channel_id, \
             last_known_online, last_online_at, last_notified_offline_at, \
             last_channel_offline_notified_at, last_dm_offline_notified_at, \
             last_channel_online_notified_at, last_dm_online_notified_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&record.owner_id)
        .bind(&record.entity_id)
        .bind(&record.guild_id)
        .bind(&watch.entity_name)
        .bind(watch.channel.as_ref().map(|c| c.channel_id.as_str()))
        .bind(record.last_known_online)
        .bind(record.last_online_at)
        .bind(record.last_notified_offline_at)
        .bind(record.last_channel_offline_notified_at)
        .bind(record.last_dm_offline_notified_at)
        .bind(record.last_channel_online_notified_at)
        .bind(record.last_dm_online_notified_at)
        .execute(self.pool())
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) if e.as_database_error().is_some_and(|d| d.is_unique_violation()) => {
                Err(PersistenceError::AlreadyExists(format!(
                    "watch ({}, {}, {})",
                    record.owner_id, record.entity_id, record.guild_id
                )))
            }
            Err(e) => {
                tracing::error!(error = %e, operation = "add watch", "Database operation failed.");
                Err(PersistenceError::OperationFailed(e.to_string()))
            }
        }
    }

    #[tracing::instrument(skip(self, record), level = "debug")]
    async fn update_record(&self, record: &WatchRecord) -> Result<(), PersistenceError> {
        // Total-overwrite of the mutable fields. An UPDATE matching zero
        // rows means the watch was removed mid-cycle; that outcome is
        // deliberately silent so a removed watch is never resurrected.
        let result = self
            .execute_query_with_error_handling(
                "update watch record",
                sqlx::query(
                    "UPDATE watches SET last_known_online = ?, last_online_at = ?, \
                     last_notified_offline_at = ?, last_channel_offline_notified_at = ?, \
                     last_dm_offline_notified_at = ?, last_channel_online_notified_at = ?, \
                     last_dm_online_notified_at = ? \
                     WHERE owner_id = ? AND entity_id = ? AND guild_id = ?",
                )
                .bind(record.last_known_online)
                .bind(record.last_online_at)
                .bind(record.last_notified_offline_at)
                .bind(record.last_channel_offline_notified_at)
                .bind(record.last_dm_offline_notified_at)
                .bind(record.last_channel_online_notified_at)
                .bind(record.last_dm_online_notified_at)
                .bind(&record.owner_id)
                .bind(&record.entity_id)
                .bind(&record.guild_id)
                .execute(self.pool()),
            )
            .await?;

        if result.rows_affected() == 0 {
            tracing::debug!(
                owner_id = %record.owner_id,
                entity_id = %record.entity_id,
                guild_id = %record.guild_id,
                "Watch removed mid-cycle; dropping state update."
            );
        }
        Ok(())
    }

    #[tracing::instrument(skip(self, channel), level = "debug")]
    async fn set_channel_binding<'a>(
        &self,
        owner_id: &str,
        entity_id: &str,
        guild_id: &str,
        channel: Option<&'a ChannelBinding>,
    ) -> Result<(), PersistenceError> {
        let result = self
            .execute_query_with_error_handling(
                "set channel binding",
                sqlx::query(
                    "UPDATE watches SET channel_id = ? \
                     WHERE owner_id = ? AND entity_id = ? AND guild_id = ?",
                )
                .bind(channel.map(|c| c.channel_id.as_str()))
                .bind(owner_id)
                .bind(entity_id)
                .bind(guild_id)
                .execute(self.pool()),
            )
            .await?;

        if result.rows_affected() == 0 {
            return Err(PersistenceError::NotFound(format!(
                "watch ({owner_id}, {entity_id}, {guild_id})"
            )));
        }
        Ok(())
    }

    #[tracing::instrument(skip(self), level = "debug")]
    async fn delete_watch(
        &self,
        owner_id: &str,
        entity_id: &str,
        guild_id: &str,
    ) -> Result<(), PersistenceError> {
        self.execute_query_with_error_handling(
            "delete watch",
            sqlx::query("DELETE FROM watches WHERE owner_id = ? AND entity_id = ? AND guild_id = ?")
                .bind(owner_id)
                .bind(entity_id)
                .bind(guild_id)
                .execute(self.pool()),
        )
        .await?;
        Ok(())
    }

    async fn flush(&self) -> Result<(), PersistenceError> {
        self.checkpoint_wal("PASSIVE").await
    }

    async fn cleanup(&self) -> Result<(), PersistenceError> {
        self.checkpoint_wal("TRUNCATE").await?;
        self.close().await;
        Ok(())
    }
}
