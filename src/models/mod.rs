//! Data models for the Vigil application.

pub mod notification;
pub mod watch;

pub use notification::{Destination, NotificationMessage};
pub use watch::{ChannelBinding, PresenceStatus, Watch, WatchRecord};
