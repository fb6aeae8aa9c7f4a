//! Request bodies and reply payloads specific to the HTTP layer.

use futurelabs_core::{OtpCode, PhoneNumber, TestId, TestItem, UserId};
use serde::{Deserialize, Serialize};

/// Body of `POST /api/v1/auth/send-otp`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendOtpRequest {
    pub phone_number: PhoneNumber,
}

/// Body of `POST /api/v1/auth/verify-otp`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyOtpRequest {
    pub phone_number: PhoneNumber,
    pub otp: OtpCode,
}

/// Body of the cart add/remove endpoints.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItemRequest {
    pub user_id: UserId,
    pub test_id: TestId,
}

/// One entry of a server-side cart.
///
/// Depending on the backend version the cart is returned either as bare ids
/// or as populated test documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CartEntry {
    Id(TestId),
    Item(Box<TestItem>),
}

impl CartEntry {
    /// The test id, when one is known.
    #[must_use]
    pub fn test_id(&self) -> Option<&TestId> {
        match self {
            Self::Id(id) => Some(id),
            Self::Item(item) => item.id.as_ref(),
        }
    }
}
