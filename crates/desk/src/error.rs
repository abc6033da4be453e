//! Unified error handling for front ends.

use thiserror::Error;

use crate::config::ConfigError;
use crate::outreach::OutreachError;
use crate::roster::RosterError;
use crate::session::StoreError;

/// Top-level error for a desk action.
#[derive(Debug, Error)]
pub enum DeskError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The session file could not be read or written.
    #[error("Session storage error: {0}")]
    Store(#[from] StoreError),

    /// Login did not produce a session.
    #[error("Login failed")]
    LoginFailed,

    /// The customer list could not be fetched.
    #[error("Customer list error: {0}")]
    Roster(#[from] RosterError),

    /// A send action failed.
    #[error("Outreach error: {0}")]
    Outreach(#[from] OutreachError),

    /// No stored session.
    #[error("Not logged in. Run `refund-desk login` first.")]
    NotAuthenticated,

    /// No displayed record has this id or code.
    #[error("Not found: {0}")]
    NotFound(String),
}

impl DeskError {
    /// Whether the error points at a fault worth reporting to error tracking,
    /// as opposed to an operator mistake or a rejected login.
    #[must_use]
    pub const fn is_fault(&self) -> bool {
        match self {
            Self::Store(_) => true,
            Self::Roster(e) => matches!(e, RosterError::FetchFailed(_)),
            Self::Outreach(e) => matches!(
                e,
                OutreachError::DispatchFailed { .. } | OutreachError::StatusUpdateFailed { .. }
            ),
            Self::Config(_) | Self::LoginFailed | Self::NotAuthenticated | Self::NotFound(_) => {
                false
            }
        }
    }
}
