//! Handlers for watch-related endpoints in the HTTP server.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use super::{ApiError, ApiState};
use crate::{
    models::{ChannelBinding, Watch},
    persistence::traits::WatchRepository,
};

/// Query parameters accepted by the watch listing endpoint.
#[derive(Debug, Deserialize)]
pub struct ListParams {
    /// Restrict the listing to a single guild.
    pub guild_id: Option<String>,
}

/// Payload for registering a new watch.
#[derive(Debug, Deserialize)]
pub struct CreateWatchRequest {
    /// The user registering the watch.
    pub owner_id: String,
    /// The entity to monitor.
    pub entity_id: String,
    /// The guild the entity is monitored in.
    pub guild_id: String,
    /// Display name used in rendered alerts.
    pub entity_name: String,
    /// Optional shared channel to alert alongside the owner DM.
    pub channel_id: Option<String>,
}

/// Payload for setting or clearing a channel binding.
#[derive(Debug, Deserialize)]
pub struct SetChannelRequest {
    /// The channel to bind, or `null` to clear the binding.
    pub channel_id: Option<String>,
}

/// Retrieves all registered watches, optionally restricted to one guild.
pub async fn list_watches(
    State(state): State<ApiState>,
    Query(params): Query<ListParams>,
) -> Result<impl IntoResponse, ApiError> {
    let mut watches = state.repo.list_watches().await?;
    if let Some(guild_id) = params.guild_id {
        watches.retain(|watch| watch.record.guild_id == guild_id);
    }
    Ok((StatusCode::OK, Json(json!({ "watches": watches }))))
}

/// Registers a new watch. The record starts online with every notified
/// field unset.
pub async fn create_watch(
    State(state): State<ApiState>,
    Json(payload): Json<CreateWatchRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let mut watch = Watch::new(
        payload.owner_id,
        payload.entity_id,
        payload.guild_id,
        payload.entity_name,
        Utc::now(),
    );
    watch.channel = payload.channel_id.map(|channel_id| ChannelBinding { channel_id });

    state.repo.add_watch(&watch).await?;

    Ok((StatusCode::CREATED, Json(json!({ "watch": watch }))))
}

/// Removes a watch. Removing an absent watch succeeds.
pub async fn delete_watch(
    State(state): State<ApiState>,
    Path((owner_id, entity_id, guild_id)): Path<(String, String, String)>,
) -> Result<impl IntoResponse, ApiError> {
    state.repo.delete_watch(&owner_id, &entity_id, &guild_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Sets or clears the shared channel binding of an existing watch.
pub async fn set_channel_binding(
    State(state): State<ApiState>,
    Path((owner_id, entity_id, guild_id)): Path<(String, String, String)>,
    Json(payload): Json<SetChannelRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let binding = payload.channel_id.map(|channel_id| ChannelBinding { channel_id });
    state
        .repo
        .set_channel_binding(&owner_id, &entity_id, &guild_id, binding.as_ref())
        .await?;
    Ok((StatusCode::OK, Json(json!({ "status": "Channel binding updated" }))))
}
