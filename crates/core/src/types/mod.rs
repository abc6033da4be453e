//! Core types for Refund Desk.
//!
//! This module provides type-safe wrappers for the customer-management domain.

pub mod customer;
pub mod id;
pub mod money;
pub mod name;
pub mod status;

pub use customer::CustomerRecord;
pub use id::*;
pub use money::{Brl, MoneyError};
pub use name::{compare_names, first_name};
pub use status::*;
