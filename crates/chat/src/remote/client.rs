//! Chat API HTTP client
//!
//! Talks to the `/channel` and `/message` endpoints.
//! Uses synchronous HTTP (ureq) to be executor-agnostic.

use log::debug;
use serde::de::DeserializeOwned;
use std::time::Duration;

use super::api::{MessageEdit, NewMessage};
use super::{ApiError, ChatBackend};
use crate::config::ClientConfig;
use crate::models::{Channel, ChannelId, Message, MessageId};

/// HTTP implementation of [`ChatBackend`]
pub struct HttpChatClient {
    agent: ureq::Agent,
    base_url: String,
    auth_token: Option<String>,
}

impl HttpChatClient {
    /// Create a client for the configured server
    pub fn new(config: &ClientConfig) -> Self {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(config.timeout_secs)))
            .build()
            .into();

        Self {
            agent,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            auth_token: config.auth_token.clone(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn channels_url(&self) -> String {
        format!("{}/channel", self.base_url)
    }

    fn message_url(&self) -> String {
        format!("{}/message", self.base_url)
    }

    fn channel_messages_url(&self, channel_id: &ChannelId) -> String {
        format!(
            "{}/message?channel_id={}",
            self.base_url,
            urlencoding::encode(channel_id.as_str())
        )
    }

    fn message_by_id_url(&self, id: &MessageId) -> String {
        format!(
            "{}/message?id={}",
            self.base_url,
            urlencoding::encode(id.as_str())
        )
    }

    fn authorize<B>(&self, request: ureq::RequestBuilder<B>) -> ureq::RequestBuilder<B> {
        let request = request.header("Accept", "application/json");
        match &self.auth_token {
            Some(token) => request.header("Authorization", &format!("Bearer {}", token)),
            None => request,
        }
    }
}

fn read_json<T: DeserializeOwned>(
    mut response: ureq::http::Response<ureq::Body>,
) -> Result<T, ApiError> {
    let text = response.body_mut().read_to_string()?;
    Ok(serde_json::from_str(&text)?)
}

impl ChatBackend for HttpChatClient {
    fn list_channels(&self) -> Result<Vec<Channel>, ApiError> {
        let url = self.channels_url();
        debug!("GET {}", url);

        let response = self.authorize(self.agent.get(url.as_str())).call()?;
        read_json(response)
    }

    fn list_messages(&self, channel_id: &ChannelId) -> Result<Vec<Message>, ApiError> {
        let url = self.channel_messages_url(channel_id);
        debug!("GET {}", url);

        let response = self.authorize(self.agent.get(url.as_str())).call()?;
        read_json(response)
    }

    fn create_message(&self, content: &str, channel_id: &ChannelId) -> Result<(), ApiError> {
        let url = self.message_url();
        debug!("POST {} (channel {})", url, channel_id);

        // Response body (empty or an echo) is ignored
        self.authorize(self.agent.post(url.as_str()))
            .send_json(&NewMessage { content, channel_id })?;
        Ok(())
    }

    fn update_message(&self, id: &MessageId, content: &str) -> Result<(), ApiError> {
        let url = self.message_url();
        debug!("PUT {} (message {})", url, id);

        self.authorize(self.agent.put(url.as_str()))
            .send_json(&MessageEdit { id, content })?;
        Ok(())
    }

    fn delete_message(&self, id: &MessageId) -> Result<(), ApiError> {
        let url = self.message_by_id_url(id);
        debug!("DELETE {}", url);

        self.authorize(self.agent.delete(url.as_str())).call()?;
        Ok(())
    }
}
