//! Template Lister
//!
//! Fetches the business account's templates and keeps the approved ones.

use crate::config::Credentials;
use crate::error::{WaError, WaResult};
use crate::graph::MessagingApi;
use tracing::info;

/// List the names of approved templates, in server order.
///
/// `Ok(vec![])` means the account has nothing approved; a failed call is an
/// `Err`. Missing credentials are rejected without touching the network.
pub async fn list_approved_templates(
    api: &dyn MessagingApi,
    credentials: &Credentials,
) -> WaResult<Vec<String>> {
    if !credentials.has_token() || credentials.waba_id.trim().is_empty() {
        return Err(WaError::Validation(
            "API token and WABA ID are required to fetch templates".to_string(),
        ));
    }

    info!("📥 Fetching message templates via {}...", api.name());
    let templates = api.list_templates(credentials).await?;
    let total = templates.len();

    let approved: Vec<String> = templates
        .into_iter()
        .filter(|t| t.is_approved())
        .map(|t| t.name)
        .collect();

    info!("   -> {} of {} templates approved", approved.len(), total);
    Ok(approved)
}
