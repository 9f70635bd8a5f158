//! This module provides the `SupervisorBuilder` for constructing a
//! `Supervisor`.

use std::sync::Arc;

use super::{Supervisor, SupervisorError};
use crate::{
    actions::traits::NotificationSink, config::AppConfig, persistence::traits::WatchRepository,
    presence::traits::PresenceSource,
};

/// A builder for creating a `Supervisor` instance.
pub struct SupervisorBuilder<R: WatchRepository + 'static> {
    config: Option<AppConfig>,
    repo: Option<Arc<R>>,
    presence: Option<Arc<dyn PresenceSource>>,
    sink: Option<Arc<dyn NotificationSink>>,
}

impl<R: WatchRepository + Send + Sync + 'static> SupervisorBuilder<R> {
    /// Creates a new, empty `SupervisorBuilder`.
    pub fn new() -> Self {
        Self { config: None, repo: None, presence: None, sink: None }
    }

    /// Sets the application configuration for the `Supervisor`.
    pub fn config(mut self, config: AppConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Sets the watch repository (database connection) for the `Supervisor`.
    pub fn repository(mut self, repo: Arc<R>) -> Self {
        self.repo = Some(repo);
        self
    }

    /// Sets the presence source for the `Supervisor`.
    pub fn presence_source(mut self, presence: Arc<dyn PresenceSource>) -> Self {
        self.presence = Some(presence);
        self
    }

    /// Sets the notification sink for the `Supervisor`.
    pub fn notification_sink(mut self, sink: Arc<dyn NotificationSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Assembles and validates the components to build a `Supervisor`.
    ///
    /// This method performs the final "wiring" of the application's
    /// services and fails with a typed error for each missing dependency.
    pub fn build(self) -> Result<Supervisor<R>, SupervisorError> {
        let config = self.config.ok_or(SupervisorError::MissingConfig)?;
        let repo = self.repo.ok_or(SupervisorError::MissingRepository)?;
        let presence = self.presence.ok_or(SupervisorError::MissingPresenceSource)?;
        let sink = self.sink.ok_or(SupervisorError::MissingNotificationSink)?;

        Ok(Supervisor::new(config, repo, presence, sink))
    }
}

impl<R: WatchRepository + Send + Sync + 'static> Default for SupervisorBuilder<R> {
    fn default() -> Self {
        Self::new()
    }
}
