//! Remote customer-management API.
//!
//! This module provides:
//! - [`PanelApi`], the seam every remote-call component talks through
//! - [`HttpPanelApi`], its `reqwest` implementation
//! - Wire types for the four endpoints
//!
//! # Endpoints
//!
//! | Call | Method / path |
//! |------|---------------|
//! | Authenticate | `POST /auth/token` |
//! | List customers | `GET /process/customers?status=` |
//! | Update status | `PUT /process/customers/status` |
//! | Dispatch message | `POST /evoRoutes/sendMessage` |

mod client;
#[cfg(test)]
pub(crate) mod testing;
mod types;

use std::future::Future;

use refund_desk_core::CustomerRecord;
use thiserror::Error;

pub use client::HttpPanelApi;
pub use types::{AuthResponse, Credentials, CustomerListResponse, OutboundMessage, StatusUpdate};

/// Errors that can occur when calling the remote API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced an HTTP response.
    #[error("network error: {0}")]
    Network(String),

    /// The API answered with a non-success status.
    #[error("API error: {status} - {message}")]
    Status { status: u16, message: String },

    /// The response body could not be decoded.
    #[error("failed to decode response: {0}")]
    Decode(String),
}

/// Calls the panel makes against the remote API.
///
/// Each method is a single attempt: implementations never retry.
pub trait PanelApi: Send + Sync {
    /// Exchange operator credentials for a session token.
    ///
    /// Resolves to `Ok(None)` when the API accepts the call but returns no token.
    fn authenticate(
        &self,
        credentials: &Credentials,
    ) -> impl Future<Output = Result<Option<String>, ApiError>> + Send;

    /// Fetch every customer record.
    fn list_customers(&self) -> impl Future<Output = Result<Vec<CustomerRecord>, ApiError>> + Send;

    /// Write a record's status.
    fn update_status(
        &self,
        update: &StatusUpdate,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;

    /// Dispatch one text message through the messaging bot.
    fn send_message(
        &self,
        message: &OutboundMessage,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;
}
