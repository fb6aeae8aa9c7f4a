//! The uniform response wrapper around every booking API reply.
//!
//! Every endpoint answers `{ "success": bool, "data": T | null, "message"?: string }`,
//! except verify-OTP which puts `token`/`userId` at the top level.

use serde::{Deserialize, Serialize};

use super::id::UserId;

/// Common view over API reply shapes.
pub trait ApiResponse {
    /// Application-level success flag.
    fn is_success(&self) -> bool;

    /// Server-provided message, if any.
    fn message(&self) -> Option<&str>;
}

/// Standard `{success, data, message}` envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Envelope for endpoints whose `data` is irrelevant (send-OTP, cart mutations).
pub type Ack = Envelope<serde_json::Value>;

impl<T> Envelope<T> {
    /// A successful envelope carrying `data`.
    #[must_use]
    pub const fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }

    /// A failed envelope with a server message.
    #[must_use]
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message.into()),
        }
    }

    /// Take the payload only when the envelope reports success.
    #[must_use]
    pub fn into_data(self) -> Option<T> {
        if self.success { self.data } else { None }
    }

    /// Payload of a successful envelope, or `T::default()` when the envelope
    /// failed or carried no data.
    #[must_use]
    pub fn into_data_or_default(self) -> T
    where
        T: Default,
    {
        self.into_data().unwrap_or_default()
    }
}

impl<T> ApiResponse for Envelope<T> {
    fn is_success(&self) -> bool {
        self.success
    }

    fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

/// Reply to `POST /api/v1/auth/verify-otp`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyOtpResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ApiResponse for VerifyOtpResponse {
    fn is_success(&self) -> bool {
        self.success
    }

    fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_data_is_none() {
        let env: Envelope<Vec<String>> = serde_json::from_str(r#"{"success": true}"#).unwrap();
        assert!(env.data.is_none());
        assert!(env.into_data_or_default().is_empty());
    }

    #[test]
    fn test_null_data_is_none() {
        let env: Envelope<Vec<String>> =
            serde_json::from_str(r#"{"success": true, "data": null}"#).unwrap();
        assert!(env.into_data_or_default().is_empty());
    }

    #[test]
    fn test_failed_envelope_discards_data() {
        let env: Envelope<Vec<String>> =
            serde_json::from_str(r#"{"success": false, "data": ["x"], "message": "nope"}"#)
                .unwrap();
        assert_eq!(env.message(), Some("nope"));
        assert!(env.into_data().is_none());
    }

    #[test]
    fn test_verify_otp_response_shape() {
        let reply: VerifyOtpResponse =
            serde_json::from_str(r#"{"success": true, "token": "t1", "userId": "u1"}"#).unwrap();
        assert!(reply.is_success());
        assert_eq!(reply.token.as_deref(), Some("t1"));
        assert_eq!(reply.user_id, Some(UserId::new("u1")));
    }
}
