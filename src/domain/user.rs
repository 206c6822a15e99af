//! User domain entity and related types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::{ROLE_ADMIN, ROLE_EDITOR, ROLE_USER};
use crate::errors::AppError;

/// Access level embedded in the session token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    User,
    Admin,
    Editor,
}

impl UserRole {
    pub fn is_admin(&self) -> bool {
        matches!(self, UserRole::Admin)
    }

    /// Catalog management is open to admins and editors
    pub fn can_manage_catalog(&self) -> bool {
        matches!(self, UserRole::Admin | UserRole::Editor)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::User => ROLE_USER,
            UserRole::Admin => ROLE_ADMIN,
            UserRole::Editor => ROLE_EDITOR,
        }
    }

    /// Lenient conversion for stored values; unknown roles get no privileges
    pub fn from_stored(value: &str) -> Self {
        value.parse().unwrap_or(UserRole::User)
    }
}

impl std::str::FromStr for UserRole {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            ROLE_USER => Ok(UserRole::User),
            ROLE_ADMIN => Ok(UserRole::Admin),
            ROLE_EDITOR => Ok(UserRole::Editor),
            other => Err(AppError::validation(format!(
                "Invalid role '{}'. Expected one of: user, admin, editor",
                other
            ))),
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User domain entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    /// Absent for accounts created through an OAuth provider
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    pub name: String,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Whether this account can sign in with email and password
    pub fn has_password(&self) -> bool {
        self.password_hash.is_some()
    }
}

/// Authenticated principal decoded from a session token
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct CurrentUser {
    pub id: Uuid,
    pub email: String,
    pub role: UserRole,
}

impl CurrentUser {
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

/// User response (safe to return to client)
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserResponse {
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub id: Uuid,
    #[schema(example = "ada@example.com")]
    pub email: String,
    #[schema(example = "Ada Obi")]
    pub name: String,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            role: user.role,
            created_at: user.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parsing_is_strict() {
        assert_eq!("editor".parse::<UserRole>().unwrap(), UserRole::Editor);
        assert!("Admin".parse::<UserRole>().is_err());
        assert!("root".parse::<UserRole>().is_err());
    }

    #[test]
    fn test_stored_role_falls_back_to_user() {
        assert_eq!(UserRole::from_stored("admin"), UserRole::Admin);
        assert_eq!(UserRole::from_stored("superuser"), UserRole::User);
    }

    #[test]
    fn test_catalog_permissions() {
        assert!(UserRole::Admin.can_manage_catalog());
        assert!(UserRole::Editor.can_manage_catalog());
        assert!(!UserRole::User.can_manage_catalog());
        assert!(!UserRole::Editor.is_admin());
    }

    #[test]
    fn test_response_hides_password() {
        let user = User {
            id: Uuid::new_v4(),
            email: "ada@example.com".to_string(),
            password_hash: Some("hash".to_string()),
            name: "Ada".to_string(),
            role: UserRole::User,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(UserResponse::from(user).role, UserRole::User);
    }
}
