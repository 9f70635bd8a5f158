use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use crate::{
    actions::error::DispatchError,
    models::{Destination, NotificationMessage},
};

/// A sink that delivers a rendered alert to a destination.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Delivers the message to the destination.
    async fn send(
        &self,
        destination: &Destination,
        message: &NotificationMessage,
    ) -> Result<(), DispatchError>;
}
