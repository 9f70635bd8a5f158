//! Configuration module for Vigil.

mod app_config;
mod helpers;
mod server;

pub use app_config::AppConfig;
pub use helpers::{deserialize_duration_from_seconds, serialize_duration_to_seconds};
pub use server::ServerConfig;
