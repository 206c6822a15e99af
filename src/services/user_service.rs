//! User administration service.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{CurrentUser, User, UserRole};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::UnitOfWork;
use crate::types::{Paginated, PaginationParams};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// User service trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UserService: Send + Sync {
    async fn list_users(&self, params: &PaginationParams) -> AppResult<Paginated<User>>;

    /// Change another user's role
    async fn set_role(&self, actor: &CurrentUser, id: Uuid, role: &str) -> AppResult<User>;

    /// Change a role by email, without an acting user (CLI bootstrap)
    async fn set_role_by_email(&self, email: &str, role: &str) -> AppResult<User>;

    /// Delete a user. Their orders are kept.
    async fn delete_user(&self, actor: &CurrentUser, id: Uuid) -> AppResult<()>;
}

/// Concrete implementation of UserService using Unit of Work.
pub struct UserManager {
    uow: Arc<dyn UnitOfWork>,
}

impl UserManager {
    pub fn new(uow: Arc<dyn UnitOfWork>) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl UserService for UserManager {
    async fn list_users(&self, params: &PaginationParams) -> AppResult<Paginated<User>> {
        let (users, total) = self.uow.users().list(params).await?;
        Ok(Paginated::new(users, params, total))
    }

    async fn set_role(&self, actor: &CurrentUser, id: Uuid, role: &str) -> AppResult<User> {
        let role: UserRole = role.parse()?;
        if actor.id == id {
            return Err(AppError::validation("You cannot change your own role"));
        }

        let user = self.uow.users().update_role(id, role).await?;
        tracing::info!(actor = %actor.id, user_id = %id, role = %role, "User role changed");
        Ok(user)
    }

    async fn set_role_by_email(&self, email: &str, role: &str) -> AppResult<User> {
        let role: UserRole = role.parse()?;
        let user = self
            .uow
            .users()
            .find_by_email(&email.trim().to_lowercase())
            .await?
            .ok_or_not_found("User")?;

        self.uow.users().update_role(user.id, role).await
    }

    async fn delete_user(&self, actor: &CurrentUser, id: Uuid) -> AppResult<()> {
        if actor.id == id {
            return Err(AppError::validation("You cannot delete your own account"));
        }

        self.uow.users().delete(id).await?;
        tracing::info!(actor = %actor.id, user_id = %id, "User deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::{MockUnitOfWork, MockUserRepository, UserRepository};
    use chrono::Utc;

    fn admin() -> CurrentUser {
        CurrentUser {
            id: Uuid::new_v4(),
            email: "root@example.com".to_string(),
            role: UserRole::Admin,
        }
    }

    fn service(users: MockUserRepository) -> UserManager {
        let users: Arc<dyn UserRepository> = Arc::new(users);
        let mut uow = MockUnitOfWork::new();
        uow.expect_users().returning(move || users.clone());
        UserManager::new(Arc::new(uow))
    }

    #[tokio::test]
    async fn test_admin_cannot_change_own_role() {
        let actor = admin();
        let mut users = MockUserRepository::new();
        users.expect_update_role().never();

        let result = service(users).set_role(&actor, actor.id, "user").await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_unknown_role_rejected() {
        let mut users = MockUserRepository::new();
        users.expect_update_role().never();

        let result = service(users)
            .set_role(&admin(), Uuid::new_v4(), "superuser")
            .await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_set_role_updates_store() {
        let target = Uuid::new_v4();
        let mut users = MockUserRepository::new();
        users
            .expect_update_role()
            .withf(move |id, role| *id == target && *role == UserRole::Editor)
            .times(1)
            .returning(|id, role| {
                Ok(User {
                    id,
                    email: "ed@example.com".to_string(),
                    password_hash: None,
                    name: "Ed".to_string(),
                    role,
                    created_at: Utc::now(),
                    updated_at: Utc::now(),
                })
            });

        let user = service(users).set_role(&admin(), target, "editor").await.unwrap();
        assert_eq!(user.role, UserRole::Editor);
    }

    #[tokio::test]
    async fn test_set_role_by_unknown_email_is_not_found() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_email().returning(|_| Ok(None));

        let result = service(users)
            .set_role_by_email("ghost@example.com", "admin")
            .await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_passes_through() {
        let target = Uuid::new_v4();
        let mut users = MockUserRepository::new();
        users
            .expect_delete()
            .withf(move |id| *id == target)
            .times(1)
            .returning(|_| Ok(()));

        service(users).delete_user(&admin(), target).await.unwrap();
    }
}
