//! FutureLabs Core - Shared types library.
//!
//! This crate provides common types used across all FutureLabs components:
//! - `storefront` - Client library for the lab-test booking API
//! - `cli` - Command-line front end over the storefront library
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no storage access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, validated digit codes, prices, catalog entities
//!   and the API response envelope

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
