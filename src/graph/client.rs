//! Graph API Client
//!
//! reqwest-backed `MessagingApi` talking to the Meta Graph endpoints.

use crate::config::{Config, Credentials};
use crate::error::{WaError, WaResult};
use crate::graph::models::{TemplateList, TemplateMessage, TemplateSummary};
use crate::graph::MessagingApi;
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use std::time::Duration;
use tracing::{debug, warn};

/// Meta Graph API client
pub struct GraphClient {
    client: Client,
    base_url: String,
    templates_version: String,
    messages_version: String,
    timeout: Duration,
}

impl GraphClient {
    pub fn new(config: &Config) -> Self {
        Self {
            client: Client::new(),
            base_url: config.graph_base_url.trim_end_matches('/').to_string(),
            templates_version: config.templates_api_version.clone(),
            messages_version: config.messages_api_version.clone(),
            timeout: Duration::from_secs(config.request_timeout_secs),
        }
    }

    /// Point the client at another host, e.g. a local mock server
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn templates_url(&self, waba_id: &str) -> String {
        format!(
            "{}/{}/{}/message_templates",
            self.base_url, self.templates_version, waba_id
        )
    }

    fn messages_url(&self, phone_id: &str) -> String {
        format!(
            "{}/{}/{}/messages",
            self.base_url, self.messages_version, phone_id
        )
    }

    /// Turn a response into its JSON body, mapping non-2xx statuses to errors
    async fn read_json(response: Response) -> WaResult<serde_json::Value> {
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            warn!("❌ Graph API error ({}): {}", status, text);
            let body = serde_json::from_str(&text).ok();
            return Err(match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => WaError::Auth {
                    status: status.as_u16(),
                    body,
                },
                _ => WaError::Api {
                    status: status.as_u16(),
                    body,
                },
            });
        }

        debug!("Graph API body: {}", text);
        if text.trim().is_empty() {
            return Ok(serde_json::Value::Null);
        }
        Ok(serde_json::from_str(&text)?)
    }
}

#[async_trait]
impl MessagingApi for GraphClient {
    async fn list_templates(&self, credentials: &Credentials) -> WaResult<Vec<TemplateSummary>> {
        let url = self.templates_url(&credentials.waba_id);
        debug!("Template request: {}", url);

        let response = self
            .client
            .get(&url)
            .bearer_auth(&credentials.api_token)
            .query(&[("fields", "name,status")])
            .timeout(self.timeout)
            .send()
            .await?;

        let json = Self::read_json(response).await?;
        let list: TemplateList = serde_json::from_value(json)?;
        Ok(list.data)
    }

    async fn send_template(
        &self,
        credentials: &Credentials,
        message: &TemplateMessage,
    ) -> WaResult<serde_json::Value> {
        let url = self.messages_url(&credentials.phone_number_id);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&credentials.api_token)
            .json(message)
            .timeout(self.timeout)
            .send()
            .await?;

        Self::read_json(response).await
    }

    fn name(&self) -> &str {
        "graph"
    }
}
