//! This module defines the interface for querying the current presence of a
//! monitored entity.

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use thiserror::Error;

use crate::models::PresenceStatus;

/// Custom error type for presence lookups.
#[derive(Error, Debug)]
pub enum PresenceError {
    /// The presence gateway could not be reached or answered with an
    /// unexpected response. The entity is skipped this cycle, never marked
    /// offline.
    #[error("Presence gateway unavailable: {0}")]
    Unavailable(String),

    /// The entity is unknown to the gateway. The entity is skipped this
    /// cycle.
    #[error("Entity {entity_id} not found in guild {guild_id}")]
    EntityNotFound {
        /// The entity that was looked up.
        entity_id: String,
        /// The guild it was looked up in.
        guild_id: String,
    },
}

/// A source of current presence information, queried once per entity per
/// sweep.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait PresenceSource: Send + Sync {
    /// Returns the current status of an entity within a guild.
    async fn status(
        &self,
        entity_id: &str,
        guild_id: &str,
    ) -> Result<PresenceStatus, PresenceError>;
}
