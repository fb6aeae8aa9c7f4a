//! Unified error handling with Sentry integration.
//!
//! Every module has its own error type; `AppError` gathers them for callers
//! that drive several modules at once (the CLI). [`AppError::user_message`]
//! gives the text a shopper should see, and [`AppError::report`] sends the
//! unexpected failures to Sentry.

use futurelabs_core::DigitsError;
use thiserror::Error;

use crate::api::ApiError;
use crate::cart::CartError;
use crate::config::ConfigError;
use crate::login::LoginError;
use crate::storage::StorageError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration could not be loaded.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Booking API call failed.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Local persistence failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Cart action failed.
    #[error("Cart error: {0}")]
    Cart(#[from] CartError),

    /// Login action failed.
    #[error("Login error: {0}")]
    Login(#[from] LoginError),

    /// Malformed phone number, OTP or pin code.
    #[error("Invalid input: {0}")]
    Validation(#[from] DigitsError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),
}

impl AppError {
    /// Whether this error points at a defect or outage rather than at
    /// something the shopper did.
    #[must_use]
    pub const fn is_unexpected(&self) -> bool {
        match self {
            Self::Config(_) | Self::Storage(_) => true,
            Self::Api(err) => !err.is_rejection(),
            Self::Cart(err) => matches!(err, CartError::Request { .. } | CartError::Storage(_)),
            Self::Login(err) => matches!(
                err,
                LoginError::Request { .. } | LoginError::Storage(_) | LoginError::MissingSession
            ),
            Self::Validation(_) | Self::NotFound(_) => false,
        }
    }

    /// Text suitable for showing to the shopper.
    ///
    /// Internal details are never exposed.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Config(_) => "The storefront is misconfigured".to_string(),
            Self::Api(err) => err
                .server_message()
                .map_or_else(|| "Service unavailable. Please try again.".to_string(), str::to_owned),
            Self::Storage(_) => "Could not save your data. Please try again.".to_string(),
            Self::Cart(err) => err.user_message(),
            Self::Login(err) => err.user_message(),
            Self::Validation(err) => err.to_string(),
            Self::NotFound(what) => format!("{what} not found"),
        }
    }

    /// Capture unexpected errors to Sentry and log them.
    pub fn report(&self) {
        if self.is_unexpected() {
            let event_id = sentry::capture_error(self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Storefront error"
            );
        } else {
            tracing::debug!(error = %self, "Storefront error");
        }
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context from a user ID.
///
/// Call this after a successful login to associate errors with the user.
pub fn set_sentry_user(user_id: &impl ToString) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for a shopper action.
pub fn add_breadcrumb(category: &str, message: &str) {
    sentry::add_breadcrumb(sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    });
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use futurelabs_core::OtpCode;

    use super::*;
    use crate::cart::CartOp;

    #[test]
    fn test_rejection_shows_server_message() {
        let err = AppError::from(ApiError::Rejected {
            status: Some(400),
            message: Some("Invalid OTP".to_string()),
        });
        assert_eq!(err.user_message(), "Invalid OTP");
        assert!(!err.is_unexpected());
    }

    #[test]
    fn test_status_error_hides_details() {
        let err = AppError::from(ApiError::Status {
            status: 502,
            body: "<html>bad gateway</html>".to_string(),
        });
        assert!(!err.user_message().contains("html"));
        assert!(err.is_unexpected());
    }

    #[test]
    fn test_validation_message() {
        let err = AppError::from(OtpCode::parse("12").unwrap_err());
        assert_eq!(err.user_message(), "OTP must be exactly 6 digits (got 2)");
    }

    #[test]
    fn test_cart_message_passthrough() {
        let err = AppError::from(CartError::NotLoggedIn(CartOp::Add));
        assert_eq!(err.user_message(), "Please login to add items to cart");
    }
}
