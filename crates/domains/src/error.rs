//! # AppError
//!
//! Centralized error handling for the maqblog backend.
//! Maps domain-specific failures to actionable error types.

use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;

/// Per-field validation failures, accumulated so a visitor sees every
/// problem with the form at once instead of one at a time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FieldErrors(BTreeMap<&'static str, String>);

impl FieldErrors {
    pub fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.insert(field, message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.0.keys().copied()
    }
}

/// The primary error type for all backend operations.
#[derive(Error, Debug)]
pub enum AppError {
    /// Resource not found (e.g. Post, Category)
    #[error("{0} not found: {1}")]
    NotFound(String, String),

    /// One or more submitted fields failed validation. Blocks the
    /// submission before any storage call.
    #[error("validation failed")]
    Validation(FieldErrors),

    /// Submission cooldown still active for this client context.
    #[error("too many requests: retry in {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    /// The external storage service failed. Surfaced to users as one
    /// generic message; the cause goes to the logs.
    #[error("storage error: {0}")]
    Storage(String),

    /// Anything else that should never happen.
    #[error("internal error: {0}")]
    Internal(String),
}

/// A specialized Result type for backend logic.
pub type Result<T> = std::result::Result<T, AppError>;

/// Failure to parse a closed string enum from its wire form.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown {what}: {value:?}")]
pub struct ParseEnumError {
    what: &'static str,
    value: String,
}

impl ParseEnumError {
    pub fn new(what: &'static str, value: &str) -> Self {
        Self {
            what,
            value: value.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_errors_accumulate_and_serialize_as_a_map() {
        let mut errors = FieldErrors::default();
        errors.push("author_email", "author email is required");
        errors.push("content", "content is required");

        assert_eq!(errors.len(), 2);
        assert_eq!(errors.get("content"), Some("content is required"));
        assert!(errors.get("author_name").is_none());

        let json = serde_json::to_value(&errors).unwrap();
        assert_eq!(json["author_email"], "author email is required");
    }

    #[test]
    fn storage_error_message_is_generic() {
        let err = AppError::Storage("could not save the comment".into());
        assert_eq!(err.to_string(), "storage error: could not save the comment");
    }
}
