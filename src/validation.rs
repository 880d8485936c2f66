use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::sanitize::sanitize_input;

pub const NAME_MIN_CHARS: usize = 2;
pub const NAME_MAX_CHARS: usize = 100;
pub const EMAIL_MIN_CHARS: usize = 5;
pub const EMAIL_MAX_CHARS: usize = 254;
pub const MESSAGE_MIN_CHARS: usize = 10;
pub const MESSAGE_MAX_CHARS: usize = 2000;
// More links than this reads as spam
pub const MESSAGE_MAX_LINKS: usize = 3;

lazy_static! {
    static ref NAME_PATTERN: Regex = Regex::new(r"^[a-zA-Z\s\-'.]{2,100}$").unwrap();
    static ref SUSPICIOUS_NAME: Regex =
        Regex::new(r"(?i)<|>|script|javascript|onclick|onerror").unwrap();
    static ref EMAIL_PATTERN: Regex = Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$"
    )
    .unwrap();
    static ref LINK_PATTERN: Regex = Regex::new(r"(?i)https?://").unwrap();
}

/// Letters, spaces, hyphens, apostrophes and periods, 2 to 100 characters,
/// with nothing that looks like markup or a script hook.
pub fn validate_name(name: &str) -> bool {
    !name.trim().is_empty() && NAME_PATTERN.is_match(name) && !SUSPICIOUS_NAME.is_match(name)
}

pub fn validate_email(email: &str) -> bool {
    let len = email.chars().count();
    (EMAIL_MIN_CHARS..=EMAIL_MAX_CHARS).contains(&len) && EMAIL_PATTERN.is_match(email)
}

pub fn validate_message(message: &str) -> bool {
    check_message(message).is_none()
}

fn check_message(message: &str) -> Option<FieldError> {
    let len = message.chars().count();
    if len < MESSAGE_MIN_CHARS {
        Some(FieldError::MessageTooShort)
    } else if len > MESSAGE_MAX_CHARS {
        Some(FieldError::MessageTooLong)
    } else if LINK_PATTERN.find_iter(message).count() > MESSAGE_MAX_LINKS {
        Some(FieldError::TooManyLinks)
    } else {
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Name,
    Email,
    Message,
}

// Per-field failure, the Display text is what the page shows under the input
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldError {
    #[error("Please enter a valid name (letters, spaces, hyphens only)")]
    InvalidName,
    #[error("Please enter a valid email address")]
    InvalidEmail,
    #[error("Message must be at least 10 characters")]
    MessageTooShort,
    #[error("Message must be less than 2000 characters")]
    MessageTooLong,
    #[error("Message contains too many links")]
    TooManyLinks,
}

pub type FieldErrors = BTreeMap<Field, FieldError>;

/// Check a single field as the visitor leaves it. Empty input is not an
/// error yet, the submit pass catches it.
pub fn check_field(field: Field, value: &str) -> Option<FieldError> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    match field {
        Field::Name => (!validate_name(value)).then_some(FieldError::InvalidName),
        Field::Email => (!validate_email(value)).then_some(FieldError::InvalidEmail),
        Field::Message => check_message(value),
    }
}

// The three visitor supplied fields
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub message: String,
}

impl ContactForm {
    pub fn new(name: impl Into<String>, email: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            message: message.into(),
        }
    }

    pub fn trimmed(&self) -> Self {
        Self::new(self.name.trim(), self.email.trim(), self.message.trim())
    }

    // Trimmed and sanitized copy, the form validation looks at
    pub fn sanitized(&self) -> Self {
        Self {
            name: sanitize_input(self.name.trim()),
            email: sanitize_input(self.email.trim()),
            message: sanitize_input(self.message.trim()),
        }
    }

    // Runs every validator and reports all failing fields at once
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        if !validate_name(&self.name) {
            errors.insert(Field::Name, FieldError::InvalidName);
        }
        if !validate_email(&self.email) {
            errors.insert(Field::Email, FieldError::InvalidEmail);
        }
        if let Some(err) = check_message(&self.message) {
            errors.insert(Field::Message, err);
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}
