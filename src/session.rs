//! Session State
//!
//! One `Session` per user run. It owns everything the interactive flow
//! accumulates (fetched templates, the loaded contact sheet, the chosen
//! phone column and variable text) and each field is changed only by its
//! handler below.

use crate::config::{Config, Credentials};
use crate::contacts::ContactSheet;
use crate::error::{WaError, WaResult};
use crate::graph::MessagingApi;
use crate::sender::{BulkReport, BulkSender, Progress};
use crate::templates;
use crate::variables::parse_variables;
use std::io::Read;
use tracing::{info, warn};

#[derive(Debug)]
pub struct Session {
    config: Config,
    credentials: Credentials,
    templates: Vec<String>,
    selected_template: Option<String>,
    sheet: Option<ContactSheet>,
    source_name: Option<String>,
    phone_column: Option<String>,
    variables_input: String,
}

impl Session {
    pub fn new(config: Config) -> Self {
        let credentials = config.credentials();
        Self {
            config,
            credentials,
            templates: Vec::new(),
            selected_template: None,
            sheet: None,
            source_name: None,
            phone_column: None,
            variables_input: String::new(),
        }
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn set_credentials(&mut self, credentials: Credentials) {
        self.credentials = credentials;
    }

    pub fn templates(&self) -> &[String] {
        &self.templates
    }

    pub fn selected_template(&self) -> Option<&str> {
        self.selected_template.as_deref()
    }

    pub fn sheet(&self) -> Option<&ContactSheet> {
        self.sheet.as_ref()
    }

    pub fn sheet_mut(&mut self) -> Option<&mut ContactSheet> {
        self.sheet.as_mut()
    }

    pub fn phone_column(&self) -> Option<&str> {
        self.phone_column.as_deref()
    }

    /// Replace the template list with the approved templates.
    ///
    /// On failure the list is cleared and the error returned.
    pub async fn fetch_templates(&mut self, api: &dyn MessagingApi) -> WaResult<&[String]> {
        match templates::list_approved_templates(api, &self.credentials).await {
            Ok(names) => {
                if names.is_empty() {
                    warn!("⚠️ No approved templates found");
                }
                let still_listed = self
                    .selected_template
                    .as_ref()
                    .is_some_and(|s| names.contains(s));
                if !still_listed {
                    self.selected_template = None;
                }
                self.templates = names;
                Ok(&self.templates)
            }
            Err(e) => {
                self.templates.clear();
                self.selected_template = None;
                Err(e)
            }
        }
    }

    pub fn select_template(&mut self, name: &str) -> WaResult<()> {
        if !self.templates.iter().any(|t| t == name) {
            return Err(WaError::Validation(format!(
                "Template '{}' is not among the approved templates",
                name
            )));
        }
        self.selected_template = Some(name.to_string());
        Ok(())
    }

    /// Load a contact list. Only a new source name replaces the current
    /// sheet; reloading the same source keeps the user's row edits.
    pub fn load_contacts<R: Read>(&mut self, source_name: &str, reader: R) -> WaResult<()> {
        if self.source_name.as_deref() == Some(source_name) && self.sheet.is_some() {
            info!("📋 '{}' already loaded, keeping edits", source_name);
            return Ok(());
        }

        match ContactSheet::from_reader(reader) {
            Ok(sheet) => {
                let column_kept = self
                    .phone_column
                    .as_ref()
                    .is_some_and(|c| sheet.columns().contains(c));
                if !column_kept {
                    self.phone_column = None;
                }
                self.sheet = Some(sheet);
                self.source_name = Some(source_name.to_string());
                Ok(())
            }
            Err(e) => {
                self.sheet = None;
                self.source_name = None;
                self.phone_column = None;
                Err(e)
            }
        }
    }

    pub fn choose_phone_column(&mut self, column: &str) -> WaResult<()> {
        let sheet = self
            .sheet
            .as_ref()
            .ok_or_else(|| WaError::Validation("Please upload a CSV first".to_string()))?;
        if !sheet.columns().iter().any(|c| c == column) {
            return Err(WaError::Validation(format!(
                "Column '{}' not found. Available: {}",
                column,
                sheet.columns().join(", ")
            )));
        }
        self.phone_column = Some(column.to_string());
        Ok(())
    }

    pub fn set_variables(&mut self, text: &str) {
        self.variables_input = text.to_string();
    }

    pub fn variables(&self) -> Vec<String> {
        parse_variables(&self.variables_input)
    }

    /// Phone numbers of the included rows
    pub fn recipients(&self) -> WaResult<Vec<String>> {
        let sheet = self
            .sheet
            .as_ref()
            .ok_or_else(|| WaError::Validation("Please upload a CSV and select recipients".to_string()))?;
        let column = self.phone_column.as_deref().ok_or_else(|| {
            WaError::Validation("Please select the column containing phone numbers".to_string())
        })?;
        sheet.selected_phone_numbers(column)
    }

    /// Run the bulk send for the current selection
    pub async fn send<F>(&self, api: &dyn MessagingApi, on_progress: F) -> WaResult<BulkReport>
    where
        F: FnMut(&Progress<'_>),
    {
        let template = self
            .selected_template
            .as_deref()
            .ok_or_else(|| WaError::Validation("Please select a template first".to_string()))?;
        let sheet = match &self.sheet {
            Some(sheet) if !sheet.is_empty() => sheet,
            _ => {
                return Err(WaError::Validation(
                    "Please upload a CSV and select recipients".to_string(),
                ))
            }
        };

        // The cap applies to included rows, before blank phone cells are dropped
        let selected = sheet.selected_count();
        if selected > self.config.max_recipients {
            return Err(WaError::RecipientLimit {
                selected,
                max: self.config.max_recipients,
            });
        }

        let recipients = self.recipients()?;
        let sender = BulkSender::new(api, &self.config).with_credentials(self.credentials.clone());
        sender
            .send_bulk(&recipients, template, &self.variables(), on_progress)
            .await
    }
}
