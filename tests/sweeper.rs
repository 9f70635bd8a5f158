//! End-to-end sweep tests against a real in-memory SQLite repository.

use std::{
    collections::HashSet,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use tokio_util::sync::CancellationToken;
use vigil::{
    actions::{error::DispatchError, traits::NotificationSink},
    engine::Sweeper,
    models::{Destination, NotificationMessage, PresenceStatus},
    persistence::{sqlite::SqliteStateRepository, traits::WatchRepository},
    presence::traits::{PresenceError, PresenceSource},
    test_helpers::{test_config, WatchBuilder},
};

/// A presence source scripted per entity: listed entities fail their
/// lookup, everything else reports the configured status.
struct ScriptedPresence {
    failing: HashSet<String>,
    status: Mutex<PresenceStatus>,
}

impl ScriptedPresence {
    fn offline() -> Self {
        Self { failing: HashSet::new(), status: Mutex::new(PresenceStatus::Offline) }
    }

    fn failing_for(entity_ids: &[&str]) -> Self {
        Self {
            failing: entity_ids.iter().map(|id| id.to_string()).collect(),
            status: Mutex::new(PresenceStatus::Offline),
        }
    }

    fn set_status(&self, status: PresenceStatus) {
        *self.status.lock().unwrap() = status;
    }
}

#[async_trait]
impl PresenceSource for ScriptedPresence {
    async fn status(
        &self,
        entity_id: &str,
        _guild_id: &str,
    ) -> Result<PresenceStatus, PresenceError> {
        if self.failing.contains(entity_id) {
            return Err(PresenceError::Unavailable("scripted failure".to_string()));
        }
        Ok(*self.status.lock().unwrap())
    }
}

/// A sink that records every delivered message.
#[derive(Default)]
struct RecordingSink {
    sent: Mutex<Vec<(Destination, NotificationMessage)>>,
}

impl RecordingSink {
    fn sent(&self) -> Vec<(Destination, NotificationMessage)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationSink for RecordingSink {
    async fn send(
        &self,
        destination: &Destination,
        message: &NotificationMessage,
    ) -> Result<(), DispatchError> {
        self.sent.lock().unwrap().push((destination.clone(), message.clone()));
        Ok(())
    }
}

async fn setup_repo() -> Arc<SqliteStateRepository> {
    let repo = SqliteStateRepository::new("sqlite::memory:")
        .await
        .expect("Failed to connect to in-memory db");
    repo.run_migrations().await.expect("Failed to run migrations");
    Arc::new(repo)
}

#[tokio::test]
async fn one_failing_lookup_leaves_the_other_forty_nine_swept() {
    let repo = setup_repo().await;
    let long_ago = Utc::now() - Duration::minutes(30);

    for i in 0..50 {
        let watch = WatchBuilder::new("owner-1", &format!("bot-{i}"), "guild-1")
            .last_online_at(long_ago)
            .build();
        repo.add_watch(&watch).await.unwrap();
    }

    let presence = Arc::new(ScriptedPresence::failing_for(&["bot-25"]));
    let sink = Arc::new(RecordingSink::default());
    let sweeper = Sweeper::new(
        Arc::new(test_config()),
        Arc::clone(&repo),
        Arc::clone(&presence),
        Arc::clone(&sink),
        CancellationToken::new(),
    );

    sweeper.sweep_cycle().await.unwrap();

    // 49 DM offline alerts; the failing entity is skipped, not alerted.
    assert_eq!(sink.sent().len(), 49);

    // The 49 are persisted as notified; the skipped one is untouched.
    let watches = repo.list_watches().await.unwrap();
    let notified =
        watches.iter().filter(|w| w.record.last_notified_offline_at.is_some()).count();
    assert_eq!(notified, 49);

    let skipped = repo.get_watch("owner-1", "bot-25", "guild-1").await.unwrap().unwrap();
    assert!(skipped.record.last_known_online);
    assert!(skipped.record.last_notified_offline_at.is_none());
}

#[tokio::test]
async fn outage_and_recovery_round_trip_through_the_store() {
    let repo = setup_repo().await;
    let long_ago = Utc::now() - Duration::minutes(30);

    let watch = WatchBuilder::new("owner-1", "bot-1", "guild-1")
        .entity_name("StatusBot")
        .channel("alerts")
        .last_online_at(long_ago)
        .build();
    repo.add_watch(&watch).await.unwrap();

    let presence = Arc::new(ScriptedPresence::offline());
    let sink = Arc::new(RecordingSink::default());
    let sweeper = Sweeper::new(
        Arc::new(test_config()),
        Arc::clone(&repo),
        Arc::clone(&presence),
        Arc::clone(&sink),
        CancellationToken::new(),
    );

    // First cycle: offline round to both destinations.
    sweeper.sweep_cycle().await.unwrap();
    let sent = sink.sent();
    assert_eq!(sent.len(), 2);
    assert!(sent.iter().any(|(d, _)| matches!(d, Destination::Dm { owner_id } if owner_id == "owner-1")));
    assert!(sent.iter().any(|(d, _)| matches!(d, Destination::Channel { channel_id } if channel_id == "alerts")));
    assert!(sent.iter().all(|(_, m)| m.title.contains("went offline")));

    // Second cycle right away: inside the cooldown, silent.
    sweeper.sweep_cycle().await.unwrap();
    assert_eq!(sink.sent().len(), 2);

    // Entity comes back: one recovery alert per destination, offline
    // fields cleared in the store.
    presence.set_status(PresenceStatus::Online);
    sweeper.sweep_cycle().await.unwrap();
    let sent = sink.sent();
    assert_eq!(sent.len(), 4);
    assert!(sent[2..].iter().all(|(_, m)| m.title.contains("back online")));

    let stored = repo.get_watch("owner-1", "bot-1", "guild-1").await.unwrap().unwrap();
    assert!(stored.record.last_known_online);
    assert!(stored.record.last_notified_offline_at.is_none());
    assert!(stored.record.last_dm_offline_notified_at.is_none());
    assert!(stored.record.last_channel_offline_notified_at.is_none());
    assert!(stored.record.last_dm_online_notified_at.is_some());

    // A further online cycle stays silent.
    sweeper.sweep_cycle().await.unwrap();
    assert_eq!(sink.sent().len(), 4);
}

/// A sink that removes the watch it is alerting about before returning,
/// landing the sweep's state write after the deletion.
struct DeletingSink {
    repo: Arc<SqliteStateRepository>,
}

#[async_trait]
impl NotificationSink for DeletingSink {
    async fn send(
        &self,
        _destination: &Destination,
        _message: &NotificationMessage,
    ) -> Result<(), DispatchError> {
        self.repo.delete_watch("owner-1", "bot-1", "guild-1").await.expect("delete");
        Ok(())
    }
}

#[tokio::test]
async fn watch_deleted_mid_cycle_is_not_resurrected() {
    let repo = setup_repo().await;
    let long_ago = Utc::now() - Duration::minutes(30);
    let watch =
        WatchBuilder::new("owner-1", "bot-1", "guild-1").last_online_at(long_ago).build();
    repo.add_watch(&watch).await.unwrap();

    let presence = Arc::new(ScriptedPresence::offline());
    let sink = Arc::new(DeletingSink { repo: Arc::clone(&repo) });
    let sweeper = Sweeper::new(
        Arc::new(test_config()),
        Arc::clone(&repo),
        Arc::clone(&presence),
        sink,
        CancellationToken::new(),
    );

    // The watch vanishes while its alert is being dispatched; the state
    // write that follows must neither error nor bring the row back.
    sweeper.sweep_cycle().await.unwrap();
    assert!(repo.get_watch("owner-1", "bot-1", "guild-1").await.unwrap().is_none());
    assert!(repo.list_watches().await.unwrap().is_empty());
}
