//! HTTP implementation of the presence source.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use url::Url;

use crate::{
    models::PresenceStatus,
    presence::traits::{PresenceError, PresenceSource},
};

/// Response shape of the presence gateway.
#[derive(Debug, Deserialize)]
struct PresenceResponse {
    status: PresenceStatus,
}

/// A presence source backed by an HTTP presence gateway.
///
/// Looks up `GET {base}/guilds/{guild_id}/members/{entity_id}/presence`;
/// a 404 maps to [`PresenceError::EntityNotFound`], everything else
/// non-2xx to [`PresenceError::Unavailable`].
pub struct HttpPresenceSource {
    base_url: Url,
    client: reqwest::Client,
}

impl HttpPresenceSource {
    /// Creates a new source against the given gateway base URL.
    pub fn new(base_url: Url, request_timeout: Duration) -> Result<Self, PresenceError> {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| PresenceError::Unavailable(e.to_string()))?;
        Ok(Self { base_url, client })
    }

    fn presence_url(&self, entity_id: &str, guild_id: &str) -> Result<Url, PresenceError> {
        self.base_url
            .join(&format!("guilds/{guild_id}/members/{entity_id}/presence"))
            .map_err(|e| PresenceError::Unavailable(format!("invalid presence URL: {e}")))
    }
}

#[async_trait]
impl PresenceSource for HttpPresenceSource {
    async fn status(
        &self,
        entity_id: &str,
        guild_id: &str,
    ) -> Result<PresenceStatus, PresenceError> {
        let url = self.presence_url(entity_id, guild_id)?;
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| PresenceError::Unavailable(e.to_string()))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(PresenceError::EntityNotFound {
                entity_id: entity_id.to_string(),
                guild_id: guild_id.to_string(),
            });
        }
        if !response.status().is_success() {
            return Err(PresenceError::Unavailable(format!(
                "presence gateway returned status {}",
                response.status()
            )));
        }

        let body: PresenceResponse =
            response.json().await.map_err(|e| PresenceError::Unavailable(e.to_string()))?;
        Ok(body.status)
    }
}
