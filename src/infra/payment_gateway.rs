//! Payment gateway client.
//!
//! Speaks the Paystack-style transaction API:
//! - `POST {base}/transaction/initialize`
//! - `GET {base}/transaction/verify/{reference}`
//!
//! Every response is wrapped in `{ status, message, data }`; `status: false`
//! is an error whose message is relayed to the client unchanged.

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::config::PaymentConfig;
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

const SERVICE: &str = "Payment gateway";

/// Transaction initialization request, amount in minor units
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InitializeTransaction {
    pub email: String,
    pub amount: u64,
    pub currency: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callback_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

/// Checkout handle returned by the gateway
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionAuthorization {
    pub authorization_url: String,
    pub access_code: String,
    pub reference: String,
}

/// Verification result as reported by the gateway
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionVerification {
    /// `success`, `failed`, `abandoned`, ...
    pub status: String,
    pub reference: String,
    #[serde(default)]
    pub amount: Option<u64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub gateway_response: Option<String>,
}

impl TransactionVerification {
    pub fn is_successful(&self) -> bool {
        self.status == "success"
    }
}

/// Payment gateway trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn initialize(&self, request: InitializeTransaction)
        -> AppResult<TransactionAuthorization>;

    async fn verify(&self, reference: &str) -> AppResult<TransactionVerification>;
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    status: bool,
    #[serde(default)]
    message: String,
    data: Option<T>,
}

/// reqwest-backed gateway client
#[derive(Clone)]
pub struct PaystackClient {
    client: reqwest::Client,
    base_url: String,
    secret_key: Option<String>,
}

impl PaystackClient {
    pub fn new(config: &PaymentConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            secret_key: config.secret_key().map(str::to_string),
        }
    }

    fn secret_key(&self) -> AppResult<&str> {
        self.secret_key
            .as_deref()
            .ok_or_else(|| AppError::misconfigured("PAYSTACK_SECRET_KEY is not set"))
    }

    /// Base URL plus path segments; each segment is percent-encoded as a whole
    fn endpoint(&self, segments: &[&str]) -> AppResult<reqwest::Url> {
        let mut url = reqwest::Url::parse(&self.base_url)
            .map_err(|e| AppError::misconfigured(format!("Invalid PAYMENT_GATEWAY_URL: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| AppError::misconfigured("PAYMENT_GATEWAY_URL cannot carry a path"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> AppResult<T> {
        let status = response.status();
        let envelope: Envelope<T> = response.json().await.map_err(|e| {
            AppError::upstream(SERVICE, format!("Unreadable gateway response ({}): {}", status, e))
        })?;

        if !envelope.status {
            tracing::warn!(http_status = %status, message = %envelope.message, "Gateway rejected request");
            return Err(AppError::upstream(SERVICE, envelope.message));
        }

        envelope
            .data
            .ok_or_else(|| AppError::upstream(SERVICE, "Gateway response carried no data"))
    }
}

#[async_trait]
impl PaymentGateway for PaystackClient {
    async fn initialize(
        &self,
        request: InitializeTransaction,
    ) -> AppResult<TransactionAuthorization> {
        let url = self.endpoint(&["transaction", "initialize"])?;
        let response = self
            .client
            .post(url)
            .bearer_auth(self.secret_key()?)
            .json(&request)
            .send()
            .await
            .map_err(transport_error)?;

        let authorization: TransactionAuthorization = self.handle_response(response).await?;
        tracing::info!(reference = %authorization.reference, amount = request.amount, "Transaction initialized");
        Ok(authorization)
    }

    async fn verify(&self, reference: &str) -> AppResult<TransactionVerification> {
        let url = self.endpoint(&["transaction", "verify", reference])?;
        let response = self
            .client
            .get(url)
            .bearer_auth(self.secret_key()?)
            .send()
            .await
            .map_err(transport_error)?;

        let verification: TransactionVerification = self.handle_response(response).await?;
        tracing::info!(reference = %reference, status = %verification.status, "Transaction verified");
        Ok(verification)
    }
}

fn transport_error(e: reqwest::Error) -> AppError {
    AppError::upstream(SERVICE, format!("Could not reach payment gateway: {}", e))
}
