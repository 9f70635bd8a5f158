//! Core types describing a monitored entity and its persisted debounce state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The presence of an entity as reported by the presence source at sweep
/// time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PresenceStatus {
    /// The entity is currently reachable.
    Online,
    /// The entity is not reachable (idle, disconnected, or gone).
    Offline,
}

impl PresenceStatus {
    /// Returns `true` when the status counts as online for transition
    /// purposes.
    pub fn is_online(self) -> bool {
        matches!(self, PresenceStatus::Online)
    }
}

/// An optional shared-channel destination bound to a watch.
///
/// The direct-message destination is implicit (the owner); at most one
/// channel destination exists per watch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelBinding {
    /// The channel that receives channel-level alerts for this watch.
    pub channel_id: String,
}

/// The persisted per-entity state record driving transition detection and
/// notification debounce.
///
/// All mutation of the boolean and timestamp fields goes through the
/// transition evaluator; the identity triple is immutable after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchRecord {
    /// The user who registered the watch and receives direct notifications.
    pub owner_id: String,
    /// The presence-tracked entity.
    pub entity_id: String,
    /// The guild the entity is monitored in.
    pub guild_id: String,
    /// Status as of the most recent sweep.
    pub last_known_online: bool,
    /// Last time the entity was confirmed online; doubles as the "went
    /// offline at" reference. Never moves backward.
    pub last_online_at: DateTime<Utc>,
    /// Last time an offline alert round fired. Shared gate for both
    /// destinations.
    pub last_notified_offline_at: Option<DateTime<Utc>>,
    /// Per-destination offline cooldown (shared channel).
    pub last_channel_offline_notified_at: Option<DateTime<Utc>>,
    /// Per-destination offline cooldown (owner DM).
    pub last_dm_offline_notified_at: Option<DateTime<Utc>>,
    /// Per-destination recovery cooldown (shared channel).
    pub last_channel_online_notified_at: Option<DateTime<Utc>>,
    /// Per-destination recovery cooldown (owner DM).
    pub last_dm_online_notified_at: Option<DateTime<Utc>>,
}

impl WatchRecord {
    /// Creates a fresh record for a newly registered watch.
    ///
    /// New watches start online with every notified field unset, so the
    /// offline grace period is measured from registration time.
    pub fn new(
        owner_id: impl Into<String>,
        entity_id: impl Into<String>,
        guild_id: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            owner_id: owner_id.into(),
            entity_id: entity_id.into(),
            guild_id: guild_id.into(),
            last_known_online: true,
            last_online_at: now,
            last_notified_offline_at: None,
            last_channel_offline_notified_at: None,
            last_dm_offline_notified_at: None,
            last_channel_online_notified_at: None,
            last_dm_online_notified_at: None,
        }
    }
}

/// A monitored entity as swept each cycle: the debounce record plus the
/// registry metadata that travels with it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Watch {
    /// Display name of the entity, captured at registration time.
    pub entity_name: String,
    /// Optional shared-channel destination for this watch.
    pub channel: Option<ChannelBinding>,
    /// The persisted debounce state.
    pub record: WatchRecord,
}

impl Watch {
    /// Creates a watch with a fresh record and no channel binding.
    pub fn new(
        owner_id: impl Into<String>,
        entity_id: impl Into<String>,
        guild_id: impl Into<String>,
        entity_name: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            entity_name: entity_name.into(),
            channel: None,
            record: WatchRecord::new(owner_id, entity_id, guild_id, now),
        }
    }
}
