//! Tradepost Core - Shared types library.
//!
//! This crate provides the domain types used by the Tradepost CRM service.
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access, no HTTP
//! clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, emails, telephones, and
//!   the order-channel / address-kind tags

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
