//! Notification delivery.
//!
//! The sweep decides *whether* and *to whom* an alert goes; the sink
//! implementations here only deliver an already-rendered message to a
//! destination. Delivery failure is non-fatal and is never retried within
//! the same cycle.

pub mod error;
mod messenger;
mod stdout;
pub mod traits;

pub use error::DispatchError;
pub use messenger::MessengerSink;
pub use stdout::StdoutSink;
pub use traits::NotificationSink;
