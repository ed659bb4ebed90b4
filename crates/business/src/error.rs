//! Business layer errors
//!
//! Every service returns [`ServiceResult`]. Core errors are folded into
//! the matching service variant; persistence errors are wrapped and never
//! shown to end users verbatim.

use careswap_core::{CoreError, ModerationAction, Permission, RequestId, RequestStatus};
use careswap_persistence::PersistenceError;
use thiserror::Error;

/// Message shown in place of any storage failure
pub const INTERNAL_ERROR_MESSAGE: &str = "Something went wrong. Please try again.";

/// Business operation errors
#[derive(Debug, Error)]
pub enum ServiceError {
    // === Identity errors ===
    #[error("Please log in to access this page.")]
    AuthenticationRequired,

    #[error("Admin access required.")]
    AdminRequired,

    // === Access errors ===
    #[error("{0}")]
    AccessDenied(String),

    #[error("Permission denied: {action} requires '{permission}'")]
    PermissionDenied {
        action: ModerationAction,
        permission: Permission,
    },

    // === Lookup errors ===
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    // === Input errors ===
    #[error("{0}")]
    Validation(String),

    #[error("Request {id} cannot move from {from} to {to}")]
    InvalidTransition {
        id: RequestId,
        from: RequestStatus,
        to: RequestStatus,
    },

    // === Wrapped errors ===
    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for business operations
pub type ServiceResult<T> = Result<T, ServiceError>;

impl ServiceError {
    pub fn not_found(entity: &str, id: impl ToString) -> Self {
        Self::NotFound {
            entity: entity.to_string(),
            id: id.to_string(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn access_denied(message: impl Into<String>) -> Self {
        Self::AccessDenied(message.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Denied for who the caller is, as opposed to bad input
    pub fn is_access_denied(&self) -> bool {
        matches!(
            self,
            Self::AuthenticationRequired
                | Self::AdminRequired
                | Self::AccessDenied(_)
                | Self::PermissionDenied { .. }
        )
    }

    /// Text safe to show the end user
    pub fn public_message(&self) -> String {
        match self {
            Self::Persistence(_) | Self::Internal(_) => INTERNAL_ERROR_MESSAGE.to_string(),
            other => other.to_string(),
        }
    }
}

impl From<CoreError> for ServiceError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ProfilePrivate => Self::AccessDenied(err.to_string()),
            CoreError::AccessDenied(message) => Self::AccessDenied(message),
            CoreError::InvalidTransition { id, from, to } => Self::InvalidTransition { id, from, to },
            CoreError::Validation(message) => Self::Validation(message),
            CoreError::UnknownValue { .. } => Self::Validation(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_failures_stay_internal() {
        let err = ServiceError::from(PersistenceError::invalid("users.standing", "frozen"));
        assert_eq!(err.public_message(), INTERNAL_ERROR_MESSAGE);
        assert!(err.to_string().contains("frozen"));
    }

    #[test]
    fn test_core_errors_are_classified() {
        let private: ServiceError = CoreError::ProfilePrivate.into();
        assert!(private.is_access_denied());
        assert_eq!(private.public_message(), "This profile is private.");

        let unknown: ServiceError = CoreError::unknown("font_size", "huge").into();
        assert!(unknown.is_validation());
    }

    #[test]
    fn test_permission_denied_message() {
        let err = ServiceError::PermissionDenied {
            action: ModerationAction::Ban,
            permission: Permission::Ban,
        };
        assert!(err.is_access_denied());
        assert_eq!(err.to_string(), "Permission denied: ban requires 'ban'");
    }
}
