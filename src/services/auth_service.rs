//! Authentication service - registration, credential checks and session tokens.
//!
//! Passwords are hashed by the domain `Password` value object; repositories
//! are reached through the Unit of Work.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::ValidateEmail;

use crate::config::{Config, MIN_NAME_LENGTH, SECONDS_PER_HOUR, TOKEN_TYPE_BEARER};
use crate::domain::{CurrentUser, Password, User, UserResponse, UserRole};
use crate::errors::{AppError, AppResult};
use crate::infra::{NewUser, UnitOfWork};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// JWT claims payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub role: String,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    /// The principal these claims describe
    pub fn principal(&self) -> CurrentUser {
        CurrentUser {
            id: self.sub,
            email: self.email.clone(),
            role: UserRole::from_stored(&self.role),
        }
    }
}

/// Token response returned after successful credential verification
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TokenResponse {
    #[schema(example = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...")]
    pub access_token: String,
    #[schema(example = "Bearer")]
    pub token_type: String,
    /// Token lifetime in seconds
    #[schema(example = 86400)]
    pub expires_in: i64,
    pub user: UserResponse,
}

/// Authentication service trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Create a password account with the `user` role
    async fn register(&self, email: String, password: String, name: String) -> AppResult<User>;

    /// Check email and password, returning a session token
    async fn verify_credentials(&self, email: String, password: String)
        -> AppResult<TokenResponse>;

    /// Decode and validate a session token
    fn verify_token(&self, token: &str) -> AppResult<Claims>;
}

fn generate_token(user: &User, config: &Config) -> AppResult<TokenResponse> {
    let now = Utc::now();
    let expires_at = now + Duration::hours(config.jwt_expiration_hours);

    let claims = Claims {
        sub: user.id,
        email: user.email.clone(),
        role: user.role.to_string(),
        exp: expires_at.timestamp(),
        iat: now.timestamp(),
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret_bytes()),
    )?;

    Ok(TokenResponse {
        access_token: token,
        token_type: TOKEN_TYPE_BEARER.to_string(),
        expires_in: config.jwt_expiration_hours * SECONDS_PER_HOUR,
        user: UserResponse::from(user.clone()),
    })
}

/// Concrete implementation of AuthService using Unit of Work.
pub struct Authenticator {
    uow: Arc<dyn UnitOfWork>,
    config: Config,
}

impl Authenticator {
    pub fn new(uow: Arc<dyn UnitOfWork>, config: Config) -> Self {
        Self { uow, config }
    }
}

#[async_trait]
impl AuthService for Authenticator {
    async fn register(&self, email: String, password: String, name: String) -> AppResult<User> {
        let email = email.trim().to_lowercase();
        if !email.validate_email() {
            return Err(AppError::validation("Invalid email format"));
        }
        let name = name.trim().to_string();
        if name.chars().count() < MIN_NAME_LENGTH as usize {
            return Err(AppError::validation("Name is required"));
        }

        // Hash before the lookup so a short password never reaches the store
        let password = Password::new(&password)?;

        if self.uow.users().find_by_email(&email).await?.is_some() {
            return Err(AppError::conflict("User"));
        }

        let user = self
            .uow
            .users()
            .create(NewUser {
                email,
                password_hash: Some(password.into_string()),
                name,
                role: UserRole::User,
            })
            .await?;

        tracing::info!(user_id = %user.id, "User registered");
        Ok(user)
    }

    async fn verify_credentials(
        &self,
        email: String,
        password: String,
    ) -> AppResult<TokenResponse> {
        let user = self
            .uow
            .users()
            .find_by_email(&email.trim().to_lowercase())
            .await?;

        // Unknown and password-less accounts verify against a dummy hash so
        // every failure costs one argon2 verification.
        let stored = match user.as_ref().and_then(|u| u.password_hash.clone()) {
            Some(hash) => Password::from_hash(hash),
            None => Password::dummy(),
        };
        let password_valid = stored.verify(&password);

        match user {
            Some(user) if user.has_password() && password_valid => {
                generate_token(&user, &self.config)
            }
            _ => Err(AppError::InvalidCredentials),
        }
    }

    fn verify_token(&self, token: &str) -> AppResult<Claims> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.jwt_secret_bytes()),
            &Validation::default(),
        )?;

        Ok(token_data.claims)
    }
}
