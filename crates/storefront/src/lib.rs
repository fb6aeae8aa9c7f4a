//! FutureLabs storefront client library.
//!
//! Browsing, cart and OTP login for the FutureLabs lab-test booking API.
//! Pages are loaded through [`loader::PageLoader`], which races the live API
//! against a timeout and falls back to bundled fixtures; shopper actions go
//! through [`login::LoginFlow`] and [`cart::CartService`]. [`state::AppState`]
//! ties them together around one persisted key-value store.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod cart;
pub mod config;
pub mod error;
pub mod fixtures;
pub mod loader;
pub mod login;
pub mod serviceability;
pub mod session;
pub mod state;
pub mod storage;

pub use config::StorefrontConfig;
pub use error::AppError;
pub use state::AppState;
