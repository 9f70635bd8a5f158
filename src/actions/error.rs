//! Error types for notification delivery.

use thiserror::Error;

/// Errors that can occur while delivering a notification.
#[derive(Error, Debug)]
pub enum DispatchError {
    /// The messenger gateway could not be reached.
    #[error("Failed to deliver notification: {0}")]
    Delivery(String),

    /// The messenger gateway rejected the message.
    #[error("Messenger gateway returned status {0}")]
    GatewayStatus(u16),
}
