//! HTTP client for the FutureLabs booking API.
//!
//! # Architecture
//!
//! - One `reqwest::Client` shared behind an `Arc`; `ApiClient` is cheap to clone
//! - JSON in, JSON out; every reply is parsed before its status is trusted
//! - Two entry points with different failure semantics:
//!   - [`ApiClient::fetch`] raises only on transport, status and parse
//!     failures, and hands back the raw envelope. Page loaders use this so a
//!     `success: false` reply becomes an empty slice.
//!   - [`ApiClient::request`] additionally raises [`ApiError::Rejected`] when
//!     the envelope reports `success: false`. Action flows (login, cart) use this.
//!
//! # Example
//!
//! ```rust,ignore
//! use futurelabs_storefront::api::ApiClient;
//!
//! let client = ApiClient::new(&config)?;
//! let tests = client.tests_by_category("Exclusive").await?.into_data_or_default();
//! ```

pub mod endpoints;
mod types;

use std::sync::Arc;

use futurelabs_core::{
    Ack, ApiResponse, Banner, Category, CategoryKind, Envelope, OtpCode, PhoneNumber, TestId,
    TestItem, UserId, VerifyOtpResponse,
};
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::config::StorefrontConfig;

pub use endpoints::Endpoint;
pub use types::{CartEntry, CartItemRequest, SendOtpRequest, VerifyOtpRequest};

/// Maximum number of response body characters included in logs and errors.
const BODY_SNIPPET_CHARS: usize = 500;

/// Errors that can occur when talking to the booking API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport failure (unreachable host, reset connection, TLS).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success HTTP status with a body that is not an API envelope.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Response body could not be parsed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The API answered with an envelope reporting failure.
    #[error("Request rejected: {}", .message.as_deref().unwrap_or("no message"))]
    Rejected {
        /// HTTP status when the rejection came with a non-success status.
        status: Option<u16>,
        /// Server-provided message.
        message: Option<String>,
    },
}

impl ApiError {
    /// Whether the API itself refused the request (as opposed to a transport
    /// or parse failure).
    #[must_use]
    pub const fn is_rejection(&self) -> bool {
        matches!(self, Self::Rejected { .. })
    }

    /// Message supplied by the server, if it sent one.
    #[must_use]
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Rejected { message, .. } => message.as_deref(),
            _ => None,
        }
    }
}

// =============================================================================
// ApiClient
// =============================================================================

/// Client for the booking API.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: String,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new(config: &StorefrontConfig) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url: config.base_url.trim_end_matches('/').to_string(),
            }),
        })
    }

    /// Base address every endpoint path is appended to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.inner.base_url
    }

    /// Send a request and parse the reply, without looking at its success flag.
    async fn execute<R, B>(&self, endpoint: &Endpoint, body: Option<&B>) -> Result<R, ApiError>
    where
        R: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let url = format!("{}{}", self.inner.base_url, endpoint.path());

        let mut request = self.inner.client.request(endpoint.method(), &url);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();

        // Get response body as text first for better error diagnostics
        let response_text = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %snippet(&response_text),
                "Booking API returned non-success status"
            );

            // Error replies usually still carry an envelope with a message
            return Err(serde_json::from_str::<Ack>(&response_text).map_or_else(
                |_| ApiError::Status {
                    status: status.as_u16(),
                    body: snippet(&response_text),
                },
                |ack| ApiError::Rejected {
                    status: Some(status.as_u16()),
                    message: ack.message,
                },
            ));
        }

        serde_json::from_str(&response_text).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %snippet(&response_text),
                "Failed to parse booking API response"
            );
            ApiError::Parse(e)
        })
    }

    /// Issue a `GET` and return the raw reply.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, non-success status or an
    /// unparseable body. An envelope with `success: false` is NOT an error.
    #[instrument(skip(self), fields(endpoint = %endpoint))]
    pub async fn fetch<R>(&self, endpoint: &Endpoint) -> Result<R, ApiError>
    where
        R: DeserializeOwned,
    {
        self.execute::<R, ()>(endpoint, None).await
    }

    /// Issue a request and require the envelope to report success.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Rejected`] when the reply has `success: false`, in
    /// addition to every failure [`ApiClient::fetch`] reports.
    #[instrument(skip(self, body), fields(endpoint = %endpoint))]
    pub async fn request<R, B>(&self, endpoint: &Endpoint, body: &B) -> Result<R, ApiError>
    where
        R: DeserializeOwned + ApiResponse,
        B: Serialize + ?Sized,
    {
        let reply: R = self.execute(endpoint, Some(body)).await?;

        if !reply.is_success() {
            debug!(message = ?reply.message(), "Booking API rejected request");
            return Err(ApiError::Rejected {
                status: None,
                message: reply.message().map(str::to_owned),
            });
        }

        Ok(reply)
    }

    // =========================================================================
    // Auth Methods
    // =========================================================================

    /// Ask the API to text a one-time password to `phone`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or is rejected.
    pub async fn send_otp(&self, phone: &PhoneNumber) -> Result<Ack, ApiError> {
        let body = SendOtpRequest {
            phone_number: phone.clone(),
        };
        self.request(&Endpoint::SendOtp, &body).await
    }

    /// Exchange a one-time password for a session token.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the OTP is rejected.
    pub async fn verify_otp(
        &self,
        phone: &PhoneNumber,
        otp: &OtpCode,
    ) -> Result<VerifyOtpResponse, ApiError> {
        let body = VerifyOtpRequest {
            phone_number: phone.clone(),
            otp: otp.clone(),
        };
        self.request(&Endpoint::VerifyOtp, &body).await
    }

    // =========================================================================
    // Catalog Methods
    // =========================================================================

    /// Tests in a category.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn tests_by_category(
        &self,
        category: &str,
    ) -> Result<Envelope<Vec<TestItem>>, ApiError> {
        self.fetch(&Endpoint::tests_by_category(category)).await
    }

    /// A single test by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn test_by_id(&self, id: &TestId) -> Result<Envelope<TestItem>, ApiError> {
        self.fetch(&Endpoint::test_by_id(id.clone())).await
    }

    /// Curated selection of tests (e.g. "Single Test").
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn selected_tests(&self, name: &str) -> Result<Envelope<Vec<TestItem>>, ApiError> {
        self.fetch(&Endpoint::SelectedTests(name.to_owned().into()))
            .await
    }

    /// Free-text test search.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn search_tests(&self, query: &str) -> Result<Envelope<Vec<TestItem>>, ApiError> {
        self.fetch(&Endpoint::SearchTests(query.to_owned())).await
    }

    /// Categories selected for display in a grouping.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn selected_categories(
        &self,
        kind: CategoryKind,
    ) -> Result<Envelope<Vec<Category>>, ApiError> {
        self.fetch(&Endpoint::SelectedCategories(kind)).await
    }

    /// Every category in a grouping.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn categories(&self, kind: CategoryKind) -> Result<Envelope<Vec<Category>>, ApiError> {
        self.fetch(&Endpoint::Categories(kind)).await
    }

    // =========================================================================
    // Banner Methods
    // =========================================================================

    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn main_banners(&self) -> Result<Envelope<Vec<Banner>>, ApiError> {
        self.fetch(&Endpoint::MAIN_BANNERS).await
    }

    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn bottom_banners(&self) -> Result<Envelope<Vec<Banner>>, ApiError> {
        self.fetch(&Endpoint::BOTTOM_BANNERS).await
    }

    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn random_banner(&self) -> Result<Envelope<Banner>, ApiError> {
        self.fetch(&Endpoint::RANDOM_BANNER).await
    }

    // =========================================================================
    // Cart Methods
    // =========================================================================

    /// Server-side cart contents for a user.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn cart(&self, user_id: &UserId) -> Result<Envelope<Vec<CartEntry>>, ApiError> {
        self.fetch(&Endpoint::Cart(user_id.clone())).await
    }

    /// Add a test to the user's server-side cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or is rejected.
    pub async fn add_to_cart(&self, user_id: &UserId, test_id: &TestId) -> Result<Ack, ApiError> {
        let body = CartItemRequest {
            user_id: user_id.clone(),
            test_id: test_id.clone(),
        };
        self.request(&Endpoint::CartAdd, &body).await
    }

    /// Remove a test from the user's server-side cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or is rejected.
    pub async fn remove_from_cart(
        &self,
        user_id: &UserId,
        test_id: &TestId,
    ) -> Result<Ack, ApiError> {
        let body = CartItemRequest {
            user_id: user_id.clone(),
            test_id: test_id.clone(),
        };
        self.request(&Endpoint::CartRemove, &body).await
    }
}

/// First `BODY_SNIPPET_CHARS` characters of a response body.
fn snippet(body: &str) -> String {
    body.chars().take(BODY_SNIPPET_CHARS).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use mockito::{Matcher, Server};

    use super::*;

    fn client_for(server: &Server) -> ApiClient {
        let config = StorefrontConfig::live(&server.url()).unwrap();
        ApiClient::new(&config).unwrap()
    }

    #[test]
    fn test_api_error_display() {
        let err = ApiError::Rejected {
            status: None,
            message: Some("Invalid OTP".to_string()),
        };
        assert_eq!(err.to_string(), "Request rejected: Invalid OTP");
        assert_eq!(err.server_message(), Some("Invalid OTP"));
        assert!(err.is_rejection());
    }

    #[tokio::test]
    async fn test_fetch_returns_failed_envelope_without_error() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/api/v1/tests/category/Exclusive")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"success": false, "message": "maintenance"}"#)
            .create_async()
            .await;

        let envelope = client_for(&server)
            .tests_by_category("Exclusive")
            .await
            .unwrap();

        mock.assert_async().await;
        assert!(!envelope.success);
        assert!(envelope.into_data_or_default().is_empty());
    }

    #[tokio::test]
    async fn test_request_raises_on_failed_envelope() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/api/v1/auth/send-otp")
            .match_header("content-type", "application/json")
            .match_body(Matcher::Json(serde_json::json!({"phoneNumber": "9876543210"})))
            .with_status(200)
            .with_body(r#"{"success": false, "message": "Too many attempts"}"#)
            .create_async()
            .await;

        let phone = PhoneNumber::parse("9876543210").unwrap();
        let err = client_for(&server).send_otp(&phone).await.unwrap_err();

        assert!(err.is_rejection());
        assert_eq!(err.server_message(), Some("Too many attempts"));
    }

    #[tokio::test]
    async fn test_error_status_with_envelope_is_rejection() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/api/v1/auth/verify-otp")
            .with_status(400)
            .with_body(r#"{"success": false, "message": "Invalid OTP"}"#)
            .create_async()
            .await;

        let phone = PhoneNumber::parse("9876543210").unwrap();
        let otp = OtpCode::parse("000000").unwrap();
        let err = client_for(&server)
            .verify_otp(&phone, &otp)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ApiError::Rejected {
                status: Some(400),
                ..
            }
        ));
        assert_eq!(err.server_message(), Some("Invalid OTP"));
    }

    #[tokio::test]
    async fn test_error_status_with_html_body() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/api/v1/bottombanners/get-random")
            .with_status(502)
            .with_body("<html>Bad Gateway</html>")
            .create_async()
            .await;

        let err = client_for(&server).random_banner().await.unwrap_err();
        assert!(matches!(err, ApiError::Status { status: 502, .. }));
        assert!(!err.is_rejection());
    }

    #[tokio::test]
    async fn test_unparseable_body() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/api/v1/mainbanners/get")
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let err = client_for(&server).main_banners().await.unwrap_err();
        assert!(matches!(err, ApiError::Parse(_)));
    }

    #[tokio::test]
    async fn test_remove_from_cart_uses_delete_with_body() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("DELETE", "/api/v1/cart/remove")
            .match_body(Matcher::Json(
                serde_json::json!({"userId": "u1", "testId": "t9"}),
            ))
            .with_status(200)
            .with_body(r#"{"success": true}"#)
            .create_async()
            .await;

        let ack = client_for(&server)
            .remove_from_cart(&UserId::new("u1"), &TestId::new("t9"))
            .await
            .unwrap();

        mock.assert_async().await;
        assert!(ack.success);
    }
}
