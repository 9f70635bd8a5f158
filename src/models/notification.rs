//! Data models for notifications.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::watch::Watch;

/// A delivery target for a rendered alert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Destination {
    /// A direct message to the watch owner.
    Dm {
        /// The owner receiving the message.
        owner_id: String,
    },
    /// A shared channel bound to the watch.
    Channel {
        /// The bound channel.
        channel_id: String,
    },
}

/// A message to be sent in a notification, with a title and body.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct NotificationMessage {
    /// The title of the notification message.
    pub title: String,
    /// The body content of the notification message.
    pub body: String,
}

impl NotificationMessage {
    /// Renders the offline alert for a watch.
    ///
    /// `offline_since` is the last confirmed-online time, which the grace
    /// period was measured from.
    pub fn offline(watch: &Watch, offline_since: DateTime<Utc>) -> Self {
        Self {
            title: format!("{} went offline", watch.entity_name),
            body: format!(
                "{} (id: {}) has been offline since {}.",
                watch.entity_name,
                watch.record.entity_id,
                offline_since.format("%Y-%m-%d %H:%M:%S UTC"),
            ),
        }
    }

    /// Renders the recovery alert for a watch.
    pub fn online(watch: &Watch, now: DateTime<Utc>) -> Self {
        Self {
            title: format!("{} is back online", watch.entity_name),
            body: format!(
                "{} (id: {}) came back online at {}.",
                watch.entity_name,
                watch.record.entity_id,
                now.format("%Y-%m-%d %H:%M:%S UTC"),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn offline_message_carries_name_id_and_offline_since() {
        let since = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap();
        let watch = Watch::new("owner-1", "bot-42", "guild-9", "StatusBot", since);
        let message = NotificationMessage::offline(&watch, since);

        assert_eq!(message.title, "StatusBot went offline");
        assert!(message.body.contains("bot-42"));
        assert!(message.body.contains("2024-03-01 12:30:00 UTC"));
    }

    #[test]
    fn online_message_carries_recovery_time() {
        let created = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 13, 0, 0).unwrap();
        let watch = Watch::new("owner-1", "bot-42", "guild-9", "StatusBot", created);
        let message = NotificationMessage::online(&watch, now);

        assert_eq!(message.title, "StatusBot is back online");
        assert!(message.body.contains("13:00:00"));
    }
}
