//! Graph Messaging API
//!
//! Provides a unified interface over the provider's template and message
//! endpoints so the sending pipeline can run against a mock in tests.

use crate::config::Credentials;
use crate::error::WaResult;
use async_trait::async_trait;

pub mod client;
pub mod models;

pub use client::GraphClient;
pub use models::{TemplateMessage, TemplateSummary};

/// Trait for messaging API backends
#[async_trait]
pub trait MessagingApi: Send + Sync {
    /// Fetch every template of the business account with its status
    async fn list_templates(&self, credentials: &Credentials) -> WaResult<Vec<TemplateSummary>>;

    /// Send one template message, returning the provider's raw response
    async fn send_template(
        &self,
        credentials: &Credentials,
        message: &TemplateMessage,
    ) -> WaResult<serde_json::Value>;

    /// Get the backend name
    fn name(&self) -> &str;
}
