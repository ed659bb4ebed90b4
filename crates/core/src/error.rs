//! # Error Module
//!
//! Domain errors for CareSwap, built with thiserror.

use crate::request::{RequestId, RequestStatus};
use thiserror::Error;

/// Core domain errors.
///
/// Business-rule failures only; nothing here knows about storage.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    // === Access errors ===
    #[error("This profile is private.")]
    ProfilePrivate,

    #[error("Access denied: {0}")]
    AccessDenied(String),

    // === Request errors ===
    #[error("Request {id} cannot move from {from} to {to}")]
    InvalidTransition {
        id: RequestId,
        from: RequestStatus,
        to: RequestStatus,
    },

    // === Validation errors ===
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unknown {field}: {value}")]
    UnknownValue { field: String, value: String },
}

/// Result type alias with CoreError
pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    /// Build an UnknownValue error for an unparseable enum label
    pub fn unknown(field: &str, value: &str) -> Self {
        Self::UnknownValue {
            field: field.to_string(),
            value: value.to_string(),
        }
    }

    /// Whether the error denies the caller access to something
    pub fn is_access_error(&self) -> bool {
        matches!(self, CoreError::ProfilePrivate | CoreError::AccessDenied(_))
    }
}
