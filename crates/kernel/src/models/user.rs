//! Authenticated console user.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::permissions::Role;

/// System user id used for console-initiated work (imports, CLI without a login).
pub const SYSTEM_USER_ID: Uuid = Uuid::nil();

/// User as yielded by the authentication provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
}

impl AuthUser {
    /// Create a user with a fresh id.
    pub fn new(email: impl Into<String>, role: Role) -> Self {
        Self {
            id: Uuid::now_v7(),
            email: email.into(),
            role,
        }
    }

    /// The built-in system user.
    pub fn system(role: Role) -> Self {
        Self {
            id: SYSTEM_USER_ID,
            email: "system@localhost".to_string(),
            role,
        }
    }

    /// Check if this is the system user.
    pub fn is_system(&self) -> bool {
        self.id == SYSTEM_USER_ID
    }
}
