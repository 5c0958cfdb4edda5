//! Graph API wire models

use serde::{Deserialize, Serialize};

/// Status string the provider uses for sendable templates
pub const APPROVED_STATUS: &str = "APPROVED";

/// One entry of the template listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateSummary {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub status: String,
}

impl TemplateSummary {
    /// Approved and carrying a name that can be sent
    pub fn is_approved(&self) -> bool {
        self.status == APPROVED_STATUS && !self.name.is_empty()
    }
}

/// Body of `GET /{waba_id}/message_templates`
#[derive(Debug, Default, Deserialize)]
pub struct TemplateList {
    #[serde(default)]
    pub data: Vec<TemplateSummary>,
}

/// Body of `POST /{phone_id}/messages`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemplateMessage {
    pub messaging_product: String,
    pub to: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub template: TemplatePayload,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemplatePayload {
    pub name: String,
    pub language: Language,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<Component>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Language {
    pub code: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Component {
    #[serde(rename = "type")]
    pub kind: String,
    pub parameters: Vec<Parameter>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Parameter {
    #[serde(rename = "type")]
    pub kind: String,
    pub text: String,
}

impl TemplateMessage {
    /// Build the payload for one recipient.
    ///
    /// Variables become text parameters of a single body component, in order.
    /// With no variables the `components` field is left out entirely.
    pub fn new(to: &str, template_name: &str, language_code: &str, variables: &[String]) -> Self {
        let components = if variables.is_empty() {
            Vec::new()
        } else {
            vec![Component {
                kind: "body".to_string(),
                parameters: variables
                    .iter()
                    .map(|v| Parameter {
                        kind: "text".to_string(),
                        text: v.clone(),
                    })
                    .collect(),
            }]
        };

        Self {
            messaging_product: "whatsapp".to_string(),
            to: to.to_string(),
            kind: "template".to_string(),
            template: TemplatePayload {
                name: template_name.to_string(),
                language: Language {
                    code: language_code.to_string(),
                },
                components,
            },
        }
    }

    /// Number of body parameters carried by this message
    pub fn parameter_count(&self) -> usize {
        self.template
            .components
            .iter()
            .map(|c| c.parameters.len())
            .sum()
    }
}
