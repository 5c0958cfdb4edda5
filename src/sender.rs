//! Bulk Sender
//!
//! Sends one template message per recipient, strictly one after another.
//! A failed recipient is recorded and the loop moves on; there is no retry.
//! Runs above the recipient cap are rejected before any request is made.

use crate::config::{Config, Credentials};
use crate::error::{WaError, WaResult};
use crate::graph::{MessagingApi, TemplateMessage};
use serde::Serialize;
use tracing::{debug, info, warn};

/// Result of one recipient's send
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Delivery {
    Sent {
        response: serde_json::Value,
    },
    Failed {
        error: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        details: Option<serde_json::Value>,
    },
}

/// Per-recipient outcome, in recipient order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SendOutcome {
    pub phone_number: String,
    #[serde(flatten)]
    pub delivery: Delivery,
}

impl SendOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self.delivery, Delivery::Sent { .. })
    }

    fn from_result(phone_number: &str, result: WaResult<serde_json::Value>) -> Self {
        let delivery = match result {
            Ok(response) => Delivery::Sent { response },
            Err(e) => Delivery::Failed {
                details: e.provider_body().cloned(),
                error: e.to_string(),
            },
        };
        Self {
            phone_number: phone_number.to_string(),
            delivery,
        }
    }
}

/// Progress after each recipient
#[derive(Debug, Clone, PartialEq)]
pub struct Progress<'a> {
    pub completed: usize,
    pub total: usize,
    pub phone_number: &'a str,
    pub success: bool,
}

impl Progress<'_> {
    /// Fraction completed, (index + 1) / total
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            return 1.0;
        }
        self.completed as f64 / self.total as f64
    }
}

/// Outcomes of a finished run
#[derive(Debug, Clone, Default, Serialize)]
pub struct BulkReport {
    pub template_name: String,
    pub outcomes: Vec<SendOutcome>,
}

impl BulkReport {
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn success_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failure_count(&self) -> usize {
        self.total() - self.success_count()
    }

    pub fn failures(&self) -> impl Iterator<Item = &SendOutcome> {
        self.outcomes.iter().filter(|o| !o.is_success())
    }
}

/// Sequential template sender
pub struct BulkSender<'a> {
    api: &'a dyn MessagingApi,
    credentials: Credentials,
    language_code: String,
    max_recipients: usize,
}

impl<'a> BulkSender<'a> {
    pub fn new(api: &'a dyn MessagingApi, config: &Config) -> Self {
        Self {
            api,
            credentials: config.credentials(),
            language_code: config.language_code.clone(),
            max_recipients: config.max_recipients,
        }
    }

    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = credentials;
        self
    }

    pub fn max_recipients(&self) -> usize {
        self.max_recipients
    }

    /// Reject a run that must not start; no request is issued on error
    pub fn validate(&self, recipients: &[String], template_name: &str) -> WaResult<()> {
        if !self.credentials.has_token() || self.credentials.phone_number_id.trim().is_empty() {
            return Err(WaError::Validation(
                "API token and Phone Number ID are required to send messages".to_string(),
            ));
        }
        if template_name.trim().is_empty() {
            return Err(WaError::Validation(
                "Please select a template first".to_string(),
            ));
        }
        if recipients.len() > self.max_recipients {
            return Err(WaError::RecipientLimit {
                selected: recipients.len(),
                max: self.max_recipients,
            });
        }
        if recipients.is_empty() {
            return Err(WaError::Validation(
                "No recipients selected. Include at least one contact".to_string(),
            ));
        }
        Ok(())
    }

    /// Send `template_name` to every recipient, calling `on_progress` after each one
    pub async fn send_bulk<F>(
        &self,
        recipients: &[String],
        template_name: &str,
        variables: &[String],
        mut on_progress: F,
    ) -> WaResult<BulkReport>
    where
        F: FnMut(&Progress<'_>),
    {
        self.validate(recipients, template_name)?;

        let total = recipients.len();
        info!(
            "📤 Preparing to send '{}' to {} recipient(s) with {} variable(s)",
            template_name,
            total,
            variables.len()
        );

        let mut outcomes = Vec::with_capacity(total);
        for (i, phone) in recipients.iter().enumerate() {
            let message = TemplateMessage::new(phone, template_name, &self.language_code, variables);
            debug!("Sending to {} ({}/{})", phone, i + 1, total);

            let outcome = SendOutcome::from_result(
                phone,
                self.api.send_template(&self.credentials, &message).await,
            );
            if let Delivery::Failed { error, .. } = &outcome.delivery {
                warn!("❌ Send to {} failed: {}", phone, error);
            }

            on_progress(&Progress {
                completed: i + 1,
                total,
                phone_number: phone,
                success: outcome.is_success(),
            });
            outcomes.push(outcome);
        }

        let report = BulkReport {
            template_name: template_name.to_string(),
            outcomes,
        };
        info!(
            "✅ Sending complete: {}/{} succeeded",
            report.success_count(),
            report.total()
        );
        Ok(report)
    }
}
