//! Mock Messaging API for Testing
//!
//! Records every request and fails on chosen recipients.

use async_trait::async_trait;
use serde_json::json;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use wabulk::config::Credentials;
use wabulk::error::{WaError, WaResult};
use wabulk::graph::{MessagingApi, TemplateMessage, TemplateSummary};

/// Mock API that records sent messages
#[derive(Debug, Default)]
pub struct MockApi {
    /// Templates returned by `list_templates`
    pub templates: Vec<TemplateSummary>,
    /// Number of `list_templates` calls
    pub list_calls: Arc<Mutex<usize>>,
    /// Every message passed to `send_template`
    pub sent: Arc<Mutex<Vec<TemplateMessage>>>,
    /// Recipients whose send returns an API error
    pub fail_for: HashSet<String>,
    /// Make `list_templates` fail with a transport error
    pub fail_listing: bool,
}

impl MockApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_templates(templates: &[(&str, &str)]) -> Self {
        Self {
            templates: templates
                .iter()
                .map(|(name, status)| TemplateSummary {
                    name: name.to_string(),
                    status: status.to_string(),
                })
                .collect(),
            ..Self::default()
        }
    }

    pub fn failing_for(mut self, phone: &str) -> Self {
        self.fail_for.insert(phone.to_string());
        self
    }

    /// Recipients in the order they were sent to
    pub fn sent_to(&self) -> Vec<String> {
        self.sent.lock().unwrap().iter().map(|m| m.to.clone()).collect()
    }

    pub fn send_calls(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    pub fn list_calls(&self) -> usize {
        *self.list_calls.lock().unwrap()
    }
}

#[async_trait]
impl MessagingApi for MockApi {
    async fn list_templates(&self, _credentials: &Credentials) -> WaResult<Vec<TemplateSummary>> {
        *self.list_calls.lock().unwrap() += 1;
        if self.fail_listing {
            return Err(WaError::Transport("connection refused".to_string()));
        }
        Ok(self.templates.clone())
    }

    async fn send_template(
        &self,
        _credentials: &Credentials,
        message: &TemplateMessage,
    ) -> WaResult<serde_json::Value> {
        self.sent.lock().unwrap().push(message.clone());
        if self.fail_for.contains(&message.to) {
            return Err(WaError::Api {
                status: 400,
                body: Some(json!({"error": {"message": "Recipient not on WhatsApp"}})),
            });
        }
        Ok(json!({"messages": [{"id": format!("wamid.{}", message.to)}]}))
    }

    fn name(&self) -> &str {
        "mock"
    }
}
