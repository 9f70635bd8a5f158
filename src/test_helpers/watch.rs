//! Builder for watch fixtures.

use chrono::{DateTime, Utc};

use crate::models::{ChannelBinding, Watch, WatchRecord};

/// A builder for constructing `Watch` fixtures in tests.
///
/// Defaults mirror a freshly registered watch: online, all notified fields
/// unset, no channel binding.
pub struct WatchBuilder {
    watch: Watch,
}

impl WatchBuilder {
    /// Starts a builder for the given identity triple.
    pub fn new(owner_id: &str, entity_id: &str, guild_id: &str) -> Self {
        Self { watch: Watch::new(owner_id, entity_id, guild_id, entity_id, Utc::now()) }
    }

    /// Sets the display name.
    pub fn entity_name(mut self, name: &str) -> Self {
        self.watch.entity_name = name.to_string();
        self
    }

    /// Binds a shared alert channel.
    pub fn channel(mut self, channel_id: &str) -> Self {
        self.watch.channel = Some(ChannelBinding { channel_id: channel_id.to_string() });
        self
    }

    /// Sets the last-known-online flag.
    pub fn last_known_online(mut self, online: bool) -> Self {
        self.watch.record.last_known_online = online;
        self
    }

    /// Sets the last confirmed-online time.
    pub fn last_online_at(mut self, at: DateTime<Utc>) -> Self {
        self.watch.record.last_online_at = at;
        self
    }

    /// Sets the shared offline notification gate.
    pub fn last_notified_offline_at(mut self, at: Option<DateTime<Utc>>) -> Self {
        self.watch.record.last_notified_offline_at = at;
        self
    }

    /// Sets the DM offline cooldown field.
    pub fn last_dm_offline_notified_at(mut self, at: Option<DateTime<Utc>>) -> Self {
        self.watch.record.last_dm_offline_notified_at = at;
        self
    }

    /// Sets the channel offline cooldown field.
    pub fn last_channel_offline_notified_at(mut self, at: Option<DateTime<Utc>>) -> Self {
        self.watch.record.last_channel_offline_notified_at = at;
        self
    }

    /// Sets the DM recovery cooldown field.
    pub fn last_dm_online_notified_at(mut self, at: Option<DateTime<Utc>>) -> Self {
        self.watch.record.last_dm_online_notified_at = at;
        self
    }

    /// Sets the channel recovery cooldown field.
    pub fn last_channel_online_notified_at(mut self, at: Option<DateTime<Utc>>) -> Self {
        self.watch.record.last_channel_online_notified_at = at;
        self
    }

    /// Finalizes the fixture.
    pub fn build(self) -> Watch {
        self.watch
    }
}
