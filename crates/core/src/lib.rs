//! Refund Desk Core - Shared types library.
//!
//! This crate provides the domain types used across all Refund Desk components:
//! - `refund-desk` - Session, roster and outreach workflow over the remote API
//! - `refund-desk-cli` - Command-line panel for the operator
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Customer records, statuses, ids, money formatting and name collation

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
