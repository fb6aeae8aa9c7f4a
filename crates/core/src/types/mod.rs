//! Core types for FutureLabs.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod catalog;
pub mod digits;
pub mod envelope;
pub mod id;
pub mod price;

pub use catalog::{Banner, Category, CategoryKind, IncludedTests, TestItem};
pub use digits::{DigitsError, OtpCode, PhoneNumber, PinCode};
pub use envelope::{Ack, ApiResponse, Envelope, VerifyOtpResponse};
pub use id::*;
pub use price::Price;
