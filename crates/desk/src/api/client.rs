//! `reqwest` client for the customer-management API.

use std::sync::Arc;

use refund_desk_core::CustomerRecord;
use reqwest::{Client, Response};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::{debug, error, instrument};
use url::Url;

use super::types::{AuthResponse, Credentials, CustomerListResponse, OutboundMessage, StatusUpdate};
use super::{ApiError, PanelApi};

/// HTTP client for the customer-management API.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Clone)]
pub struct HttpPanelApi {
    inner: Arc<HttpPanelApiInner>,
}

struct HttpPanelApiInner {
    client: Client,
    /// Base URL without a trailing slash.
    base_url: String,
    /// Bearer key for the customer and messaging endpoints.
    api_key: SecretString,
}

impl std::fmt::Debug for HttpPanelApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpPanelApi")
            .field("base_url", &self.inner.base_url)
            .field("api_key", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

impl HttpPanelApi {
    /// Create a client for the API rooted at `base_url`.
    #[must_use]
    pub fn new(base_url: &Url, api_key: SecretString) -> Self {
        Self {
            inner: Arc::new(HttpPanelApiInner {
                client: Client::new(),
                base_url: base_url.as_str().trim_end_matches('/').to_string(),
                api_key,
            }),
        }
    }

    /// Base URL the client talks to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.inner.base_url)
    }

    /// Turn a non-success response into [`ApiError::Status`].
    async fn check_status(response: Response) -> Result<Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = match response.text().await {
            Ok(body) if !body.is_empty() => body,
            _ => status.canonical_reason().unwrap_or("Unknown error").to_string(),
        };
        Err(ApiError::Status {
            status: status.as_u16(),
            message,
        })
    }

    /// Check the status and decode a JSON body.
    async fn handle_json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        Self::check_status(response)
            .await?
            .json()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }
}

impl PanelApi for HttpPanelApi {
    #[instrument(skip(self, credentials), fields(user = %credentials.user))]
    async fn authenticate(&self, credentials: &Credentials) -> Result<Option<String>, ApiError> {
        let response = self
            .inner
            .client
            .post(self.url("/auth/token"))
            .json(credentials)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let body: AuthResponse = Self::handle_json(response).await.inspect_err(|e| {
            error!(error = %e, "Authentication request failed");
        })?;

        debug!(has_token = body.token.is_some(), "Authentication answered");
        Ok(body.token.filter(|token| !token.is_empty()))
    }

    #[instrument(skip(self))]
    async fn list_customers(&self) -> Result<Vec<CustomerRecord>, ApiError> {
        let response = self
            .inner
            .client
            .get(self.url("/process/customers?status="))
            .bearer_auth(self.inner.api_key.expose_secret())
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let body: CustomerListResponse = Self::handle_json(response).await.inspect_err(|e| {
            error!(error = %e, "Failed to list customers");
        })?;

        debug!(count = body.data.len(), "Customers listed");
        Ok(body.data)
    }

    #[instrument(skip(self, update), fields(id = %update.id, status = %update.status))]
    async fn update_status(&self, update: &StatusUpdate) -> Result<(), ApiError> {
        let response = self
            .inner
            .client
            .put(self.url("/process/customers/status"))
            .bearer_auth(self.inner.api_key.expose_secret())
            .json(update)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        Self::check_status(response).await.inspect_err(|e| {
            error!(error = %e, "Failed to update customer status");
        })?;

        debug!("Customer status updated");
        Ok(())
    }

    #[instrument(skip(self, message), fields(number = %message.number))]
    async fn send_message(&self, message: &OutboundMessage) -> Result<(), ApiError> {
        let response = self
            .inner
            .client
            .post(self.url("/evoRoutes/sendMessage"))
            .bearer_auth(self.inner.api_key.expose_secret())
            .json(message)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        Self::check_status(response).await.inspect_err(|e| {
            error!(error = %e, "Failed to dispatch message");
        })?;

        debug!("Message dispatched");
        Ok(())
    }
}
