use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tokio::sync::oneshot;

use crate::error::RelayError;
use crate::validation::{ContactForm, Field, FieldErrors};

// Status lines the page shows under the form
pub const SENT_MESSAGE: &str = "Thank you! Your message has been sent successfully.";
pub const BOT_MESSAGE: &str = "Thank you for your message!";
pub const INVALID_MESSAGE: &str = "Please fix the errors above";
pub const RELAY_FAILED_MESSAGE: &str = "Failed to send message. Please try again or email me directly.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Error,
}

// Contact endpoint response format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactResponse {
    pub status: Status,
    pub message: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub errors: BTreeMap<Field, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_after_secs: Option<u64>,
}

impl ContactResponse {
    pub fn success(message: &str) -> Self {
        Self {
            status: Status::Success,
            message: message.to_string(),
            errors: BTreeMap::new(),
            retry_after_secs: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: Status::Error,
            message: message.into(),
            errors: BTreeMap::new(),
            retry_after_secs: None,
        }
    }

    pub fn invalid(errors: &FieldErrors) -> Self {
        Self {
            errors: errors.iter().map(|(field, err)| (*field, err.to_string())).collect(),
            ..Self::error(INVALID_MESSAGE)
        }
    }
}

// Single field check, sent when an input loses focus
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FieldCheckRequest {
    pub field: Field,
    #[serde(default)]
    pub value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldCheckResponse {
    pub valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

// Page-load stamp for the hidden form field
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StampResponse {
    pub timestamp: String,
}

// Relay job - holds accepted form + response channel
pub struct RelayJob {
    pub form: ContactForm,
    pub response_tx: oneshot::Sender<Result<(), RelayError>>,
}
