//! Pure transition detection and notification debounce.

use chrono::{DateTime, Duration, Utc};

use crate::models::{PresenceStatus, Watch, WatchRecord};

/// A notification the sweep should dispatch for a watch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertAction {
    /// Offline alert to the owner's direct channel.
    OfflineDm,
    /// Offline alert to the bound shared channel.
    OfflineChannel,
    /// Recovery alert to the owner's direct channel.
    OnlineDm,
    /// Recovery alert to the bound shared channel.
    OnlineChannel,
}

/// The outcome of evaluating one watch against a fresh observation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
    /// Notifications to dispatch, at most one per destination.
    pub actions: Vec<AlertAction>,
    /// The record to persist. Equal to the input record when the sweep was
    /// a no-op.
    pub record: WatchRecord,
}

/// The pure decision core of the engine.
///
/// `evaluate` has no I/O and is deterministic in its inputs, so every
/// debounce property can be tested by feeding records and clock values
/// directly. All debounce state lives on the record itself; the evaluator
/// holds only the two configured thresholds.
#[derive(Debug, Clone)]
pub struct TransitionEvaluator {
    offline_grace: Duration,
    renotify_cooldown: Duration,
}

impl TransitionEvaluator {
    /// Creates an evaluator with the given thresholds.
    pub fn new(offline_grace: std::time::Duration, renotify_cooldown: std::time::Duration) -> Self {
        Self {
            offline_grace: Duration::seconds(offline_grace.as_secs() as i64),
            renotify_cooldown: Duration::seconds(renotify_cooldown.as_secs() as i64),
        }
    }

    /// Evaluates one watch against the status observed this sweep.
    pub fn evaluate(&self, watch: &Watch, observed: PresenceStatus, now: DateTime<Utc>) -> Evaluation {
        if observed.is_online() {
            self.evaluate_online(watch, now)
        } else {
            self.evaluate_offline(watch, now)
        }
    }

    fn evaluate_online(&self, watch: &Watch, now: DateTime<Utc>) -> Evaluation {
        let mut record = watch.record.clone();
        let mut actions = Vec::new();

        if !record.last_known_online {
            // Recovery transition. Each destination notifies at most once
            // per recovery, gated by its own online-notified field.
            if record.last_dm_online_notified_at.is_none() {
                actions.push(AlertAction::OnlineDm);
                record.last_dm_online_notified_at = Some(now);
            }
            if watch.channel.is_some() && record.last_channel_online_notified_at.is_none() {
                actions.push(AlertAction::OnlineChannel);
                record.last_channel_online_notified_at = Some(now);
            }

            // Re-arm the next offline cycle.
            record.last_notified_offline_at = None;
            record.last_channel_offline_notified_at = None;
            record.last_dm_offline_notified_at = None;
        }

        record.last_known_online = true;
        if now > record.last_online_at {
            record.last_online_at = now;
        }

        Evaluation { actions, record }
    }

    fn evaluate_offline(&self, watch: &Watch, now: DateTime<Utc>) -> Evaluation {
        let mut record = watch.record.clone();
        record.last_known_online = false;
        // last_online_at stays put: it is the "offline since" reference.

        let offline_for = now - record.last_online_at;
        if offline_for < self.offline_grace {
            return Evaluation { actions: Vec::new(), record };
        }

        let last_notified = record.last_notified_offline_at.unwrap_or(DateTime::UNIX_EPOCH);
        if now - last_notified < self.renotify_cooldown {
            return Evaluation { actions: Vec::new(), record };
        }

        // A new offline alert round. Destinations still debounce
        // independently: each fires only when its own field is unset or
        // older than the cooldown.
        let mut actions = Vec::new();
        if self.destination_eligible(record.last_dm_offline_notified_at, now) {
            actions.push(AlertAction::OfflineDm);
            record.last_dm_offline_notified_at = Some(now);
        }
        if watch.channel.is_some()
            && self.destination_eligible(record.last_channel_offline_notified_at, now)
        {
            actions.push(AlertAction::OfflineChannel);
            record.last_channel_offline_notified_at = Some(now);
        }

        // The shared gate advances regardless of per-destination outcomes.
        record.last_notified_offline_at = Some(now);

        // Re-arm the next recovery cycle.
        record.last_channel_online_notified_at = None;
        record.last_dm_online_notified_at = None;

        Evaluation { actions, record }
    }

    fn destination_eligible(&self, notified_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
        notified_at.is_none_or(|at| now - at >= self.renotify_cooldown)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::test_helpers::WatchBuilder;

    const GRACE: std::time::Duration = std::time::Duration::from_secs(600);
    const COOLDOWN: std::time::Duration = std::time::Duration::from_secs(600);

    fn evaluator() -> TransitionEvaluator {
        TransitionEvaluator::new(GRACE, COOLDOWN)
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap()
    }

    fn minutes(n: i64) -> DateTime<Utc> {
        t0() + Duration::minutes(n)
    }

    fn bound_watch() -> Watch {
        WatchBuilder::new("owner-1", "bot-1", "guild-1")
            .channel("alerts")
            .last_online_at(t0())
            .build()
    }

    fn unbound_watch() -> Watch {
        WatchBuilder::new("owner-1", "bot-1", "guild-1").last_online_at(t0()).build()
    }

    fn with_record(watch: &Watch, record: WatchRecord) -> Watch {
        Watch { record, ..watch.clone() }
    }

    #[test]
    fn steady_online_refreshes_last_online_at_and_stays_quiet() {
        let watch = bound_watch();
        let evaluation = evaluator().evaluate(&watch, PresenceStatus::Online, minutes(1));

        assert!(evaluation.actions.is_empty());
        assert!(evaluation.record.last_known_online);
        assert_eq!(evaluation.record.last_online_at, minutes(1));
    }

    #[test]
    fn evaluation_is_idempotent_at_the_same_instant() {
        let watch = bound_watch();
        let now = minutes(11);

        // Offline past grace: the first evaluation fires a round.
        let offline = WatchRecord { last_known_online: false, ..watch.record.clone() };
        let watch = with_record(&watch, offline);
        let first = evaluator().evaluate(&watch, PresenceStatus::Offline, now);
        assert!(!first.actions.is_empty());

        // Re-feeding the result at the same instant is a no-op.
        let watch = with_record(&watch, first.record.clone());
        let second = evaluator().evaluate(&watch, PresenceStatus::Offline, now);
        assert!(second.actions.is_empty());
        assert_eq!(second.record, first.record);
    }

    #[test]
    fn offline_within_grace_updates_state_only() {
        let watch = bound_watch();
        let evaluation = evaluator().evaluate(&watch, PresenceStatus::Offline, minutes(9));

        assert!(evaluation.actions.is_empty());
        assert!(!evaluation.record.last_known_online);
        // The offline-since reference is untouched.
        assert_eq!(evaluation.record.last_online_at, t0());
        assert!(evaluation.record.last_notified_offline_at.is_none());
    }

    #[test]
    fn offline_rounds_respect_grace_and_cooldown() {
        let ev = evaluator();
        let mut watch = bound_watch();

        // t = 9 min: still within grace.
        let e = ev.evaluate(&watch, PresenceStatus::Offline, minutes(9));
        assert!(e.actions.is_empty());
        watch = with_record(&watch, e.record);

        // t = 11 min: first round, both destinations.
        let e = ev.evaluate(&watch, PresenceStatus::Offline, minutes(11));
        assert_eq!(e.actions, vec![AlertAction::OfflineDm, AlertAction::OfflineChannel]);
        assert_eq!(e.record.last_notified_offline_at, Some(minutes(11)));
        assert_eq!(e.record.last_dm_offline_notified_at, Some(minutes(11)));
        assert_eq!(e.record.last_channel_offline_notified_at, Some(minutes(11)));
        watch = with_record(&watch, e.record);

        // t = 15 min: inside the cooldown, silent.
        let e = ev.evaluate(&watch, PresenceStatus::Offline, minutes(15));
        assert!(e.actions.is_empty());
        watch = with_record(&watch, e.record);

        // t = 22 min: second round.
        let e = ev.evaluate(&watch, PresenceStatus::Offline, minutes(22));
        assert_eq!(e.actions, vec![AlertAction::OfflineDm, AlertAction::OfflineChannel]);
        assert_eq!(e.record.last_notified_offline_at, Some(minutes(22)));
    }

    #[test]
    fn unbound_watch_alerts_dm_only() {
        let watch = unbound_watch();
        let e = evaluator().evaluate(&watch, PresenceStatus::Offline, minutes(11));

        assert_eq!(e.actions, vec![AlertAction::OfflineDm]);
        assert!(e.record.last_channel_offline_notified_at.is_none());
        // The shared gate still advances.
        assert_eq!(e.record.last_notified_offline_at, Some(minutes(11)));
    }

    #[test]
    fn recovery_notifies_and_rearms_offline_cycle() {
        let ev = evaluator();
        let mut watch = bound_watch();

        let e = ev.evaluate(&watch, PresenceStatus::Offline, minutes(11));
        watch = with_record(&watch, e.record);

        let e = ev.evaluate(&watch, PresenceStatus::Online, minutes(12));
        assert_eq!(e.actions, vec![AlertAction::OnlineDm, AlertAction::OnlineChannel]);
        assert!(e.record.last_known_online);
        assert_eq!(e.record.last_online_at, minutes(12));
        assert!(e.record.last_notified_offline_at.is_none());
        assert!(e.record.last_dm_offline_notified_at.is_none());
        assert!(e.record.last_channel_offline_notified_at.is_none());
        assert_eq!(e.record.last_dm_online_notified_at, Some(minutes(12)));
        assert_eq!(e.record.last_channel_online_notified_at, Some(minutes(12)));
    }

    #[test]
    fn recovery_restarts_grace_from_new_last_online_at() {
        let ev = evaluator();
        let mut watch = bound_watch();

        let e = ev.evaluate(&watch, PresenceStatus::Offline, minutes(11));
        watch = with_record(&watch, e.record);
        let e = ev.evaluate(&watch, PresenceStatus::Online, minutes(12));
        watch = with_record(&watch, e.record);

        // Offline again: grace now runs from minute 12, so minute 20 is
        // still quiet and minute 23 fires despite the stale minute-11
        // notification timestamps having been cleared.
        let e = ev.evaluate(&watch, PresenceStatus::Offline, minutes(20));
        assert!(e.actions.is_empty());
        watch = with_record(&watch, e.record);

        let e = ev.evaluate(&watch, PresenceStatus::Offline, minutes(23));
        assert_eq!(e.actions, vec![AlertAction::OfflineDm, AlertAction::OfflineChannel]);
    }

    #[test]
    fn channel_bound_mid_outage_gets_its_first_alert() {
        let ev = evaluator();
        let mut watch = unbound_watch();

        // DM-only round at minute 11.
        let e = ev.evaluate(&watch, PresenceStatus::Offline, minutes(11));
        assert_eq!(e.actions, vec![AlertAction::OfflineDm]);
        watch = with_record(&watch, e.record);

        // The owner binds a channel while the outage is ongoing.
        watch.channel = Some(crate::models::ChannelBinding { channel_id: "alerts".into() });

        // Next eligible round: the channel's own field is still unset, so
        // it does not inherit the DM cooldown.
        let e = ev.evaluate(&watch, PresenceStatus::Offline, minutes(22));
        assert!(e.actions.contains(&AlertAction::OfflineChannel));
        assert!(e.actions.contains(&AlertAction::OfflineDm));
        assert_eq!(e.record.last_channel_offline_notified_at, Some(minutes(22)));
    }

    #[test]
    fn repeated_flapping_notifies_recovery_at_most_once() {
        let ev = evaluator();
        let mut watch = bound_watch();

        // Full outage with an alert round, then recovery.
        let e = ev.evaluate(&watch, PresenceStatus::Offline, minutes(11));
        watch = with_record(&watch, e.record);
        let e = ev.evaluate(&watch, PresenceStatus::Online, minutes(12));
        assert_eq!(e.actions.len(), 2);
        watch = with_record(&watch, e.record);

        // Flap: brief offline inside grace, then online again. The
        // online-notified fields were not cleared (no offline round), so
        // the second recovery is silent.
        let e = ev.evaluate(&watch, PresenceStatus::Offline, minutes(14));
        assert!(e.actions.is_empty());
        watch = with_record(&watch, e.record);
        let e = ev.evaluate(&watch, PresenceStatus::Online, minutes(15));
        assert!(e.actions.is_empty());
        assert_eq!(e.record.last_dm_online_notified_at, Some(minutes(12)));
    }

    #[test]
    fn first_alert_fires_only_after_grace_from_registration() {
        let ev = evaluator();
        // Registered while the entity was already unreachable: the record
        // starts with last_online_at at registration time.
        let mut watch = unbound_watch();

        let e = ev.evaluate(&watch, PresenceStatus::Offline, minutes(5));
        assert!(e.actions.is_empty());
        watch = with_record(&watch, e.record);

        let e = ev.evaluate(&watch, PresenceStatus::Offline, minutes(10));
        assert_eq!(e.actions, vec![AlertAction::OfflineDm]);
    }

    #[test]
    fn last_online_at_never_moves_backward() {
        let watch = bound_watch();
        let earlier = t0() - Duration::minutes(5);

        let e = evaluator().evaluate(&watch, PresenceStatus::Online, earlier);
        assert_eq!(e.record.last_online_at, t0());
    }
}
