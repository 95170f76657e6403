//! Role-based permission policy.
//!
//! Each role maps to a fixed set of permitted actions. Every mutating
//! service call goes through [`ensure`] before touching storage, so a denied
//! action is reported and never attempted.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{AppError, AppResult};
use crate::models::AuthUser;

/// Console role, as yielded by the authentication provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Editor,
    Viewer,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Editor => "editor",
            Role::Viewer => "viewer",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "editor" => Ok(Role::Editor),
            "viewer" => Ok(Role::Viewer),
            other => Err(AppError::BadRequest(format!("unknown role '{other}'"))),
        }
    }
}

/// Action tags a role may be granted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    View,
    Edit,
    Publish,
    Delete,
    SubmitReview,
    ApproveReview,
    Import,
    Export,
    ManageSettings,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Action::View => "view content",
            Action::Edit => "edit content",
            Action::Publish => "publish content",
            Action::Delete => "delete content",
            Action::SubmitReview => "submit content for review",
            Action::ApproveReview => "approve reviews",
            Action::Import => "import content",
            Action::Export => "export content",
            Action::ManageSettings => "change console settings",
        };
        f.write_str(text)
    }
}

const ADMIN_ACTIONS: &[Action] = &[
    Action::View,
    Action::Edit,
    Action::Publish,
    Action::Delete,
    Action::SubmitReview,
    Action::ApproveReview,
    Action::Import,
    Action::Export,
    Action::ManageSettings,
];

const EDITOR_ACTIONS: &[Action] = &[
    Action::View,
    Action::Edit,
    Action::Publish,
    Action::SubmitReview,
    Action::Import,
    Action::Export,
];

const VIEWER_ACTIONS: &[Action] = &[Action::View];

/// Actions permitted for a role.
pub fn permitted_actions(role: Role) -> &'static [Action] {
    match role {
        Role::Admin => ADMIN_ACTIONS,
        Role::Editor => EDITOR_ACTIONS,
        Role::Viewer => VIEWER_ACTIONS,
    }
}

/// Check whether a role may perform an action.
pub fn can(role: Role, action: Action) -> bool {
    permitted_actions(role).contains(&action)
}

pub fn can_edit(role: Role) -> bool {
    can(role, Action::Edit)
}

pub fn can_publish(role: Role) -> bool {
    can(role, Action::Publish)
}

pub fn can_delete(role: Role) -> bool {
    can(role, Action::Delete)
}

pub fn can_approve_review(role: Role) -> bool {
    can(role, Action::ApproveReview)
}

/// Require that a user may perform an action.
pub fn ensure(user: &AuthUser, action: Action) -> AppResult<()> {
    if can(user.role, action) {
        return Ok(());
    }

    debug!(user_id = %user.id, role = %user.role, action = ?action, "permission denied");
    Err(AppError::PermissionDenied {
        role: user.role,
        action,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn admin_has_everything() {
        assert!(can_edit(Role::Admin));
        assert!(can_publish(Role::Admin));
        assert!(can_delete(Role::Admin));
        assert!(can_approve_review(Role::Admin));
        assert!(can(Role::Admin, Action::ManageSettings));
    }

    #[test]
    fn editor_cannot_delete_or_approve() {
        assert!(can_edit(Role::Editor));
        assert!(can_publish(Role::Editor));
        assert!(!can_delete(Role::Editor));
        assert!(!can_approve_review(Role::Editor));
    }

    #[test]
    fn viewer_is_read_only() {
        assert!(can(Role::Viewer, Action::View));
        assert!(!can_edit(Role::Viewer));
        assert!(!can_publish(Role::Viewer));
        assert!(!can_delete(Role::Viewer));
        assert!(!can_approve_review(Role::Viewer));
    }

    #[test]
    fn ensure_reports_denial() {
        let viewer = AuthUser::new("v@example.com", Role::Viewer);
        let err = ensure(&viewer, Action::Edit).unwrap_err();
        assert!(err.is_permission_denied());

        let editor = AuthUser::new("e@example.com", Role::Editor);
        assert!(ensure(&editor, Action::Edit).is_ok());
    }

    #[test]
    fn role_parsing() {
        assert_eq!("Admin".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!(" editor ".parse::<Role>().unwrap(), Role::Editor);
        assert!("owner".parse::<Role>().is_err());
    }
}
