//! The state management interface for the Vigil application.

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use crate::{
    models::{ChannelBinding, Watch, WatchRecord},
    persistence::error::PersistenceError,
};

/// Durable access to watch records and their registry metadata.
///
/// The sweep reads the full watch list through this trait each cycle and
/// writes updated records back through it; the admin API uses the same
/// trait for registration.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait WatchRepository: Send + Sync {
    /// Retrieves every registered watch.
    async fn list_watches(&self) -> Result<Vec<Watch>, PersistenceError>;

    /// Retrieves a single watch by its identity triple.
    async fn get_watch(
        &self,
        owner_id: &str,
        entity_id: &str,
        guild_id: &str,
    ) -> Result<Option<Watch>, PersistenceError>;

    /// Registers a new watch. Fails with `AlreadyExists` when the identity
    /// triple is already registered.
    async fn add_watch(&self, watch: &Watch) -> Result<(), PersistenceError>;

    /// Overwrites the mutable fields of a record in full.
    ///
    /// A record that was deleted since it was read is a silent no-op: the
    /// evaluator's output must never resurrect a removed watch.
    async fn update_record(&self, record: &WatchRecord) -> Result<(), PersistenceError>;

    /// Sets or clears the channel binding of an existing watch.
    async fn set_channel_binding<'a>(
        &self,
        owner_id: &str,
        entity_id: &str,
        guild_id: &str,
        channel: Option<&'a ChannelBinding>,
    ) -> Result<(), PersistenceError>;

    /// Removes a watch. Removing an absent watch is not an error.
    async fn delete_watch(
        &self,
        owner_id: &str,
        entity_id: &str,
        guild_id: &str,
    ) -> Result<(), PersistenceError>;

    /// Ensures all pending writes are flushed to disk.
    async fn flush(&self) -> Result<(), PersistenceError>;

    /// Performs any necessary cleanup operations before shutdown.
    async fn cleanup(&self) -> Result<(), PersistenceError>;
}
