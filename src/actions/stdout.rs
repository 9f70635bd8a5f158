//! A sink that prints alerts to standard output.

use async_trait::async_trait;

use crate::{
    actions::{error::DispatchError, traits::NotificationSink},
    models::{Destination, NotificationMessage},
};

/// A sink used by sweep-once mode: prints each alert instead of delivering
/// it externally.
#[derive(Debug, Default)]
pub struct StdoutSink;

impl StdoutSink {
    /// Creates a new `StdoutSink`.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl NotificationSink for StdoutSink {
    async fn send(
        &self,
        destination: &Destination,
        message: &NotificationMessage,
    ) -> Result<(), DispatchError> {
        let target = match destination {
            Destination::Dm { owner_id } => format!("dm:{owner_id}"),
            Destination::Channel { channel_id } => format!("channel:{channel_id}"),
        };
        println!("=== Notification -> {} ===\n{}\n{}\n", target, message.title, message.body);
        Ok(())
    }
}
