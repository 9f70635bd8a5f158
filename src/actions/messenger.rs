//! Messenger-gateway implementation of the notification sink.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use url::Url;

use crate::{
    actions::{error::DispatchError, traits::NotificationSink},
    models::{Destination, NotificationMessage},
};

/// A sink that posts rendered alerts to a messenger gateway.
///
/// The gateway owns the actual chat integration; this sink only addresses
/// the message (`dm` to an owner, `channel` to a bound channel) and posts
/// it as JSON.
pub struct MessengerSink {
    base_url: Url,
    token: Option<String>,
    client: reqwest::Client,
}

impl MessengerSink {
    /// Creates a new sink against the given gateway base URL.
    pub fn new(
        base_url: Url,
        token: Option<String>,
        request_timeout: Duration,
    ) -> Result<Self, DispatchError> {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| DispatchError::Delivery(e.to_string()))?;
        Ok(Self { base_url, token, client })
    }
}

#[async_trait]
impl NotificationSink for MessengerSink {
    async fn send(
        &self,
        destination: &Destination,
        message: &NotificationMessage,
    ) -> Result<(), DispatchError> {
        let url = self
            .base_url
            .join("messages")
            .map_err(|e| DispatchError::Delivery(format!("invalid messenger URL: {e}")))?;

        let payload = json!({
            "destination": destination,
            "title": message.title,
            "body": message.body,
        });

        let mut request = self.client.post(url).json(&payload);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response =
            request.send().await.map_err(|e| DispatchError::Delivery(e.to_string()))?;

        if !response.status().is_success() {
            return Err(DispatchError::GatewayStatus(response.status().as_u16()));
        }

        tracing::debug!(?destination, title = %message.title, "Notification delivered.");
        Ok(())
    }
}
