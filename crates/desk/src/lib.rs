//! Refund Desk library.
//!
//! This crate provides the operator workflow as a library, allowing it to be
//! tested and driven from any front end:
//!
//! - [`session`] - Operator login, logout and token persistence
//! - [`roster`] - Fetched customer list with status filter and name ordering
//! - [`outreach`] - Refund message composition, dispatch and status update
//! - [`api`] - The remote customer-management API seam and its HTTP client
//!
//! # Security
//!
//! The API key grants write access to customer statuses and to the outbound
//! messaging bot. It is held as a [`secrecy::SecretString`] and never logged.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod config;
pub mod error;
pub mod notify;
pub mod outreach;
pub mod roster;
pub mod session;

pub use api::{ApiError, HttpPanelApi, PanelApi};
pub use config::{ConfigError, DeskConfig};
pub use error::DeskError;
pub use notify::{Notifier, TracingNotifier};
pub use outreach::{Outreach, OutreachError, OutreachSettings, SendOutcome};
pub use roster::{Roster, RosterError};
pub use session::{AuthError, FileTokenStore, Session, SessionManager, StoreError, TokenStore};
