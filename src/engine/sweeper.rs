//! The Sweeper drives one evaluation cycle over all registered watches on a
//! fixed interval.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::{
    actions::traits::NotificationSink,
    config::AppConfig,
    engine::evaluator::{AlertAction, TransitionEvaluator},
    models::{Destination, NotificationMessage, Watch},
    persistence::{error::PersistenceError, traits::WatchRepository},
    presence::traits::{PresenceError, PresenceSource},
};

/// The periodic sweep service.
///
/// Cycles never overlap: the next tick is not polled while a cycle is in
/// flight, and ticks that elapsed during a slow cycle are skipped rather
/// than queued, which bounds outstanding notification attempts. Any error
/// while processing one watch is contained at that watch's boundary and
/// logged with its identity; the remaining sweep always continues.
pub struct Sweeper<
    R: WatchRepository + ?Sized,
    P: PresenceSource + ?Sized,
    N: NotificationSink + ?Sized,
> {
    /// Shared application configuration.
    config: Arc<AppConfig>,
    /// The persistent repository of watch records.
    repo: Arc<R>,
    /// The presence source queried once per watch per cycle.
    presence: Arc<P>,
    /// The sink notifications are dispatched through.
    sink: Arc<N>,
    /// The pure transition/debounce core.
    evaluator: TransitionEvaluator,
    /// A token used to signal a graceful shutdown.
    cancellation_token: CancellationToken,
}

impl<R: WatchRepository + ?Sized, P: PresenceSource + ?Sized, N: NotificationSink + ?Sized>
    Sweeper<R, P, N>
{
    /// Creates a new Sweeper instance.
    pub fn new(
        config: Arc<AppConfig>,
        repo: Arc<R>,
        presence: Arc<P>,
        sink: Arc<N>,
        cancellation_token: CancellationToken,
    ) -> Self {
        let evaluator = TransitionEvaluator::new(config.offline_grace, config.renotify_cooldown);
        Self { config, repo, presence, sink, evaluator, cancellation_token }
    }

    /// Starts the long-running service loop.
    ///
    /// Cancellation is only observed between cycles, so a requested stop
    /// waits for the in-flight cycle to finish and leaves no partially
    /// processed watch behind.
    pub async fn run(self) {
        let mut ticker = tokio::time::interval(self.config.sweep_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;

                _ = self.cancellation_token.cancelled() => {
                    tracing::info!("Sweeper cancellation signal received, shutting down...");
                    break;
                }

                _ = ticker.tick() => {
                    if let Err(e) = self.sweep_cycle().await {
                        tracing::error!(error = %e, "Error during sweep cycle. Retrying next tick...");
                    }
                }
            }
        }
        tracing::info!("Sweeper has shut down.");
    }

    /// Performs one full cycle over all registered watches.
    ///
    /// Returns an error only when the watch list itself cannot be read;
    /// everything past that point is contained per watch.
    pub async fn sweep_cycle(&self) -> Result<(), PersistenceError> {
        let watches = self.repo.list_watches().await?;
        let now = Utc::now();

        tracing::debug!(count = watches.len(), "Starting sweep cycle.");

        for watch in &watches {
            if let Err(e) = self.process_watch(watch, now).await {
                tracing::error!(
                    owner_id = %watch.record.owner_id,
                    entity_id = %watch.record.entity_id,
                    guild_id = %watch.record.guild_id,
                    error = %e,
                    "Failed to process watch; continuing sweep."
                );
            }
        }

        Ok(())
    }

    /// Evaluates and applies one watch.
    async fn process_watch(&self, watch: &Watch, now: DateTime<Utc>) -> Result<(), PersistenceError> {
        let observed = match self.presence.status(&watch.record.entity_id, &watch.record.guild_id).await {
            Ok(status) => status,
            Err(PresenceError::EntityNotFound { .. }) => {
                tracing::debug!(
                    entity_id = %watch.record.entity_id,
                    guild_id = %watch.record.guild_id,
                    "Entity unknown to the presence gateway; skipping this cycle."
                );
                return Ok(());
            }
            Err(e) => {
                // An unreachable gateway says nothing about the entity;
                // skip rather than record a false offline transition.
                tracing::warn!(
                    entity_id = %watch.record.entity_id,
                    guild_id = %watch.record.guild_id,
                    error = %e,
                    "Presence lookup failed; skipping this cycle."
                );
                return Ok(());
            }
        };

        let evaluation = self.evaluator.evaluate(watch, observed, now);

        for action in &evaluation.actions {
            let Some((destination, message)) = self.render(*action, watch, now) else {
                continue;
            };
            // A failed delivery is logged and dropped: it must not block
            // the other destination or the state write, and there is no
            // retry within the cycle.
            if let Err(e) = self.sink.send(&destination, &message).await {
                tracing::error!(
                    entity_id = %watch.record.entity_id,
                    ?destination,
                    error = %e,
                    "Failed to deliver notification."
                );
            }
        }

        if evaluation.record != watch.record {
            self.repo.update_record(&evaluation.record).await?;
        }

        Ok(())
    }

    /// Resolves an alert action into a destination and a rendered message.
    fn render(
        &self,
        action: AlertAction,
        watch: &Watch,
        now: DateTime<Utc>,
    ) -> Option<(Destination, NotificationMessage)> {
        let dm = || Destination::Dm { owner_id: watch.record.owner_id.clone() };
        let channel = || {
            watch
                .channel
                .as_ref()
                .map(|binding| Destination::Channel { channel_id: binding.channel_id.clone() })
        };

        match action {
            AlertAction::OfflineDm => {
                Some((dm(), NotificationMessage::offline(watch, watch.record.last_online_at)))
            }
            AlertAction::OfflineChannel => {
                Some((channel()?, NotificationMessage::offline(watch, watch.record.last_online_at)))
            }
            AlertAction::OnlineDm => Some((dm(), NotificationMessage::online(watch, now))),
            AlertAction::OnlineChannel => Some((channel()?, NotificationMessage::online(watch, now))),
        }
    }
}
