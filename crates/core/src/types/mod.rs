//! Core types for Tradepost.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod kind;
pub mod telephone;

pub use email::{Email, EmailError};
pub use id::*;
pub use kind::{AddressKind, OrderChannel};
pub use telephone::{Telephone, TelephoneError};
