//! Application settings loaded from environment variables.

use std::env;

use super::constants::{
    DEFAULT_DATABASE_URL, DEFAULT_JWT_EXPIRATION_HOURS, DEFAULT_PAYMENT_CURRENCY,
    DEFAULT_PAYMENT_GATEWAY_URL, DEFAULT_REDIS_URL, DEFAULT_SMTP_FROM, DEFAULT_SMTP_PORT,
    DEFAULT_STORE_URL, MIN_JWT_SECRET_LENGTH,
};
use crate::errors::{AppError, AppResult};

/// Application configuration
#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub redis_url: String,
    jwt_secret: String,
    pub jwt_expiration_hours: i64,
    pub store_url: String,
    pub payment: PaymentConfig,
    pub email: EmailConfig,
}

/// Payment gateway settings
#[derive(Clone)]
pub struct PaymentConfig {
    secret_key: Option<String>,
    pub base_url: String,
    pub callback_url: Option<String>,
    pub currency: String,
}

/// SMTP relay settings
#[derive(Clone)]
pub struct EmailConfig {
    pub smtp_host: Option<String>,
    pub smtp_port: u16,
    pub smtp_user: Option<String>,
    smtp_pass: Option<String>,
    pub smtp_from: String,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("database_url", &"[REDACTED]")
            .field("redis_url", &"[REDACTED]")
            .field("jwt_secret", &"[REDACTED]")
            .field("jwt_expiration_hours", &self.jwt_expiration_hours)
            .field("store_url", &self.store_url)
            .field("payment", &self.payment)
            .field("email", &self.email)
            .finish()
    }
}

impl std::fmt::Debug for PaymentConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaymentConfig")
            .field("secret_key", &self.secret_key.as_ref().map(|_| "[REDACTED]"))
            .field("base_url", &self.base_url)
            .field("callback_url", &self.callback_url)
            .field("currency", &self.currency)
            .finish()
    }
}

impl std::fmt::Debug for EmailConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailConfig")
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .field("smtp_user", &self.smtp_user)
            .field("smtp_pass", &self.smtp_pass.as_ref().map(|_| "[REDACTED]"))
            .field("smtp_from", &self.smtp_from)
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    /// Fails if JWT_SECRET is missing in a release build or is too short.
    pub fn from_env() -> AppResult<Self> {
        dotenvy::dotenv().ok();

        let jwt_secret = match env::var("JWT_SECRET") {
            Ok(secret) => secret,
            Err(_) if cfg!(debug_assertions) => {
                tracing::warn!("JWT_SECRET not set, using insecure default for development");
                "dev-secret-key-minimum-32-chars!!".to_string()
            }
            Err(_) => {
                return Err(AppError::misconfigured(
                    "JWT_SECRET environment variable must be set in production",
                ))
            }
        };

        if jwt_secret.len() < MIN_JWT_SECRET_LENGTH {
            return Err(AppError::misconfigured(format!(
                "JWT_SECRET must be at least {} characters long",
                MIN_JWT_SECRET_LENGTH
            )));
        }

        Ok(Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string()),
            redis_url: env::var("REDIS_URL").unwrap_or_else(|_| DEFAULT_REDIS_URL.to_string()),
            jwt_secret,
            jwt_expiration_hours: parse_var("JWT_EXPIRATION_HOURS")
                .unwrap_or(DEFAULT_JWT_EXPIRATION_HOURS),
            store_url: env::var("STORE_URL").unwrap_or_else(|_| DEFAULT_STORE_URL.to_string()),
            payment: PaymentConfig::from_env(),
            email: EmailConfig::from_env(),
        })
    }

    /// Build a configuration directly (tests, embedding).
    pub fn new(jwt_secret: impl Into<String>) -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            redis_url: DEFAULT_REDIS_URL.to_string(),
            jwt_secret: jwt_secret.into(),
            jwt_expiration_hours: DEFAULT_JWT_EXPIRATION_HOURS,
            store_url: DEFAULT_STORE_URL.to_string(),
            payment: PaymentConfig {
                secret_key: None,
                base_url: DEFAULT_PAYMENT_GATEWAY_URL.to_string(),
                callback_url: None,
                currency: DEFAULT_PAYMENT_CURRENCY.to_string(),
            },
            email: EmailConfig {
                smtp_host: None,
                smtp_port: DEFAULT_SMTP_PORT,
                smtp_user: None,
                smtp_pass: None,
                smtp_from: DEFAULT_SMTP_FROM.to_string(),
            },
        }
    }

    /// Get JWT secret bytes for token signing/verification.
    pub fn jwt_secret_bytes(&self) -> &[u8] {
        self.jwt_secret.as_bytes()
    }
}

impl PaymentConfig {
    fn from_env() -> Self {
        Self {
            secret_key: env::var("PAYSTACK_SECRET_KEY").ok().filter(|k| !k.is_empty()),
            base_url: env::var("PAYMENT_GATEWAY_URL")
                .unwrap_or_else(|_| DEFAULT_PAYMENT_GATEWAY_URL.to_string()),
            callback_url: env::var("PAYMENT_CALLBACK_URL").ok(),
            currency: env::var("PAYMENT_CURRENCY")
                .unwrap_or_else(|_| DEFAULT_PAYMENT_CURRENCY.to_string()),
        }
    }

    /// Gateway secret key, if configured.
    pub fn secret_key(&self) -> Option<&str> {
        self.secret_key.as_deref()
    }

    /// Override the secret key.
    pub fn with_secret_key(mut self, key: impl Into<String>) -> Self {
        self.secret_key = Some(key.into());
        self
    }
}

impl EmailConfig {
    fn from_env() -> Self {
        Self {
            smtp_host: env::var("SMTP_HOST").ok().filter(|h| !h.is_empty()),
            smtp_port: parse_var("SMTP_PORT").unwrap_or(DEFAULT_SMTP_PORT),
            smtp_user: env::var("SMTP_USER").ok(),
            smtp_pass: env::var("SMTP_PASS").ok(),
            smtp_from: env::var("SMTP_FROM").unwrap_or_else(|_| DEFAULT_SMTP_FROM.to_string()),
        }
    }

    /// Whether an SMTP relay is configured.
    pub fn is_configured(&self) -> bool {
        self.smtp_host.is_some()
    }

    /// Whether outgoing email can be handled at all.
    ///
    /// Debug builds fall back to logging messages, release builds need SMTP.
    pub fn can_deliver(&self) -> bool {
        self.is_configured() || cfg!(debug_assertions)
    }

    /// SMTP credentials, when both user and password are present.
    pub fn credentials(&self) -> Option<(String, String)> {
        match (&self.smtp_user, &self.smtp_pass) {
            (Some(user), Some(pass)) => Some((user.clone(), pass.clone())),
            _ => None,
        }
    }
}

fn parse_var<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_secrets() {
        let config = Config::new("a-very-long-secret-for-testing-purposes");
        let config = Config {
            payment: config.payment.clone().with_secret_key("sk_test_123"),
            ..config
        };
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("sk_test_123"));
        assert!(!rendered.contains("a-very-long-secret"));
        assert!(rendered.contains("[REDACTED]"));
    }

    #[test]
    fn test_defaults_without_payment_key() {
        let config = Config::new("a-very-long-secret-for-testing-purposes");
        assert!(config.payment.secret_key().is_none());
        assert_eq!(config.payment.currency, "NGN");
        assert_eq!(config.store_url, "http://localhost:3000");
    }

    #[test]
    fn test_email_credentials_require_both_parts() {
        let mut email = Config::new("a-very-long-secret-for-testing-purposes").email;
        assert!(email.credentials().is_none());
        email.smtp_user = Some("mailer".to_string());
        assert!(email.credentials().is_none());
    }
}
