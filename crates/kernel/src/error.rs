//! Application error types.

use thiserror::Error;

use crate::permissions::{Action, Role};

/// Application errors.
///
/// Validation failures are not errors; they travel as
/// [`ValidationResult`](crate::publishing::ValidationResult) values.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("internal error")]
    Internal(#[from] anyhow::Error),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("permission denied: role '{role}' may not {action}")]
    PermissionDenied { role: Role, action: Action },

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("conflict: {0}")]
    Conflict(String),
}

impl AppError {
    /// Message suitable for showing to the console user.
    ///
    /// Internal causes are logged and replaced by a vague text.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Internal(e) => {
                tracing::error!(error = %e, "internal error");
                "internal error".to_string()
            }
            AppError::PermissionDenied { role, action } => {
                format!("Your role ({role}) is not allowed to {action}.")
            }
            _ => self.to_string(),
        }
    }

    /// Check whether this is a permission denial.
    pub fn is_permission_denied(&self) -> bool {
        matches!(self, AppError::PermissionDenied { .. })
    }
}

/// Result type alias using AppError.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn denial_message_names_role_and_action() {
        let err = AppError::PermissionDenied {
            role: Role::Viewer,
            action: Action::Publish,
        };
        assert!(err.is_permission_denied());
        assert_eq!(
            err.user_message(),
            "Your role (viewer) is not allowed to publish content."
        );
    }

    #[test]
    fn internal_errors_are_vague() {
        let err = AppError::Internal(anyhow::anyhow!("disk on fire"));
        assert_eq!(err.user_message(), "internal error");
    }
}
