use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use todo_core::{AccountId, AppError, AppResult, WebhookId};

use crate::changes::{ChangeTracker, FieldChangeSummary};
use crate::validate_required;

/// HTTP methods a webhook may be delivered with.
const WEBHOOK_METHODS: &[&str] = &["GET", "POST", "PUT", "PATCH", "DELETE"];

/// Outbound notification target owned by an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Webhook {
    /// Row id.
    pub id: WebhookId,
    /// Public identifier assigned at insert.
    pub external_id: String,
    /// Display name.
    pub name: String,
    /// Payload content type.
    pub content_type: String,
    /// Delivery URL.
    pub url: String,
    /// Delivery HTTP method.
    pub method: String,
    /// Subscribed event names.
    pub events: Vec<String>,
    /// Subscribed data types.
    pub data_types: Vec<String>,
    /// Subscribed topics.
    pub topics: Vec<String>,
    /// Creation timestamp.
    pub created_on: DateTime<Utc>,
    /// Last update timestamp.
    pub last_updated_on: Option<DateTime<Utc>>,
    /// Soft-archive timestamp.
    pub archived_on: Option<DateTime<Utc>>,
    /// Owning account.
    pub belongs_to_account: AccountId,
}

impl Webhook {
    /// Applies an update input and returns the fields that changed.
    pub fn update(&mut self, input: WebhookUpdateInput) -> Vec<FieldChangeSummary> {
        let mut tracker = ChangeTracker::new();
        tracker.apply("name", &mut self.name, input.name);
        tracker.apply("content_type", &mut self.content_type, input.content_type);
        tracker.apply("url", &mut self.url, input.url);
        tracker.apply("method", &mut self.method, input.method);
        tracker.apply("events", &mut self.events, input.events);
        tracker.apply("data_types", &mut self.data_types, input.data_types);
        tracker.apply("topics", &mut self.topics, input.topics);
        tracker.finish()
    }
}

/// Input payload for webhook creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookCreationInput {
    /// Display name.
    pub name: String,
    /// Payload content type.
    pub content_type: String,
    /// Delivery URL.
    pub url: String,
    /// Delivery HTTP method.
    pub method: String,
    /// Subscribed event names.
    pub events: Vec<String>,
    /// Subscribed data types.
    pub data_types: Vec<String>,
    /// Subscribed topics.
    pub topics: Vec<String>,
    /// Owning account.
    pub belongs_to_account: AccountId,
}

impl WebhookCreationInput {
    /// Validates the payload before any storage access.
    pub fn validate(&self) -> AppResult<()> {
        validate_required("webhook name", &self.name)?;
        validate_url(&self.url)?;
        validate_method(&self.method)?;
        validate_list("webhook events", &self.events)?;
        validate_list("webhook data types", &self.data_types)?;
        validate_list("webhook topics", &self.topics)
    }
}

/// Partial update for a webhook.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookUpdateInput {
    /// New display name.
    pub name: Option<String>,
    /// New content type.
    pub content_type: Option<String>,
    /// New delivery URL.
    pub url: Option<String>,
    /// New HTTP method.
    pub method: Option<String>,
    /// New event list.
    pub events: Option<Vec<String>>,
    /// New data type list.
    pub data_types: Option<Vec<String>>,
    /// New topic list.
    pub topics: Option<Vec<String>>,
}

impl WebhookUpdateInput {
    /// Validates the payload before any storage access.
    pub fn validate(&self) -> AppResult<()> {
        if let Some(name) = &self.name {
            validate_required("webhook name", name)?;
        }
        if let Some(url) = &self.url {
            validate_url(url)?;
        }
        if let Some(method) = &self.method {
            validate_method(method)?;
        }
        for (label, list) in [
            ("webhook events", &self.events),
            ("webhook data types", &self.data_types),
            ("webhook topics", &self.topics),
        ] {
            if let Some(list) = list {
                validate_list(label, list)?;
            }
        }

        Ok(())
    }
}

fn validate_url(url: &str) -> AppResult<()> {
    if url.starts_with("http://") || url.starts_with("https://") {
        return Ok(());
    }

    Err(AppError::Validation(format!(
        "webhook url '{url}' must use http or https"
    )))
}

fn validate_method(method: &str) -> AppResult<()> {
    if WEBHOOK_METHODS.contains(&method) {
        return Ok(());
    }

    Err(AppError::Validation(format!(
        "unsupported webhook method '{method}'"
    )))
}

// Lists are stored comma-joined.
fn validate_list(label: &str, values: &[String]) -> AppResult<()> {
    if values
        .iter()
        .any(|value| value.is_empty() || value.contains(','))
    {
        return Err(AppError::Validation(format!(
            "{label} must be non-empty and must not contain ','"
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use todo_core::AccountId;

    use super::{WebhookCreationInput, WebhookUpdateInput};

    fn input() -> WebhookCreationInput {
        WebhookCreationInput {
            name: "deploys".to_owned(),
            content_type: "application/json".to_owned(),
            url: "https://hooks.example.com/todo".to_owned(),
            method: "POST".to_owned(),
            events: vec!["item_created".to_owned()],
            data_types: vec!["item".to_owned()],
            topics: Vec::new(),
            belongs_to_account: AccountId::new(1).unwrap_or_else(|_| unreachable!()),
        }
    }

    #[test]
    fn valid_input_passes() {
        assert!(input().validate().is_ok());
    }

    #[test]
    fn comma_in_list_entry_is_rejected() {
        let mut input = input();
        input.events = vec!["a,b".to_owned()];
        assert!(input.validate().is_err());
    }

    #[test]
    fn non_http_url_is_rejected() {
        let update = WebhookUpdateInput {
            url: Some("ftp://example.com".to_owned()),
            ..WebhookUpdateInput::default()
        };
        assert!(update.validate().is_err());
    }
}
