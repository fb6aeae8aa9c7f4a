//! Phone + OTP login flow.
//!
//! A two-step form: the shopper enters a phone number, receives a one-time
//! password, and exchanges it for a session. Every outcome, including
//! transport failures, ends as a message on the flow; nothing is fatal and
//! every state can be retried.
//!
//! ```text
//! PhoneEntry --submit_phone ok--> OtpEntry --submit_otp ok--> Completed
//!     ^                              |
//!     +-------- change_number -------+
//! ```
//!
//! Methods take `&self`. Only one request may be in flight at a time; a second
//! submission while one is pending returns [`LoginError::Busy`] without
//! touching the network.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use futurelabs_core::{DigitsError, OtpCode, PhoneNumber};
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::api::{ApiClient, ApiError};
use crate::config::StorefrontConfig;
use crate::session::{Session, SessionStore};
use crate::storage::StorageError;

/// Country prefix shown in front of the phone number.
const COUNTRY_CODE: &str = "+91";

/// User-visible login messages.
pub mod messages {
    pub const INVALID_PHONE: &str = "Please enter a valid 10-digit phone number";
    pub const OTP_SENT: &str = "OTP sent successfully!";
    pub const SEND_FAILED: &str = "Failed to send OTP";
    pub const SEND_ERROR: &str = "Error sending OTP. Please try again.";
    pub const INVALID_OTP_FORMAT: &str = "Please enter a valid 6-digit OTP";
    pub const LOGIN_OK: &str = "Login successful!";
    pub const INVALID_OTP: &str = "Invalid OTP";
    pub const VERIFY_ERROR: &str = "Error verifying OTP. Please try again.";
    pub const OTP_RESENT: &str = "OTP resent successfully!";
    pub const RESEND_FAILED: &str = "Failed to resend OTP";
    pub const RESEND_ERROR: &str = "Error resending OTP. Please try again.";
}

// =============================================================================
// Types
// =============================================================================

/// Where the flow currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginStep {
    PhoneEntry,
    OtpEntry,
    /// Session established; the form should be hidden.
    Completed,
}

/// How a message should be styled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Success,
    Error,
}

impl MessageKind {
    /// Messages mentioning "success" are positive, everything else is an error.
    #[must_use]
    pub fn of(message: &str) -> Self {
        if message.contains("success") {
            Self::Success
        } else {
            Self::Error
        }
    }
}

/// Errors returned by the flow's actions.
///
/// Apart from [`LoginError::Busy`] and [`LoginError::WrongStep`], the flow's
/// message has already been set to [`LoginError::user_message`] when one of
/// these is returned.
#[derive(Debug, Error)]
pub enum LoginError {
    #[error("another login request is in progress")]
    Busy,

    #[error("action not available in step {0:?}")]
    WrongStep(LoginStep),

    #[error("invalid phone number: {0}")]
    InvalidPhone(DigitsError),

    #[error("invalid OTP: {0}")]
    InvalidOtp(DigitsError),

    /// The API answered `success: false`.
    #[error("login rejected: {}", .message.as_deref().unwrap_or("no message"))]
    Rejected {
        action: LoginAction,
        message: Option<String>,
    },

    /// The request did not complete.
    #[error("login request failed: {source}")]
    Request {
        action: LoginAction,
        #[source]
        source: ApiError,
    },

    /// Verification succeeded but the reply carried no token or user id.
    #[error("verification reply is missing the session")]
    MissingSession,

    #[error("could not persist session: {0}")]
    Storage(#[from] StorageError),

    /// The form was reset while the request was in flight.
    #[error("login flow was reset")]
    Superseded,
}

/// The network-backed actions of the flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginAction {
    SendOtp,
    VerifyOtp,
    ResendOtp,
}

impl LoginAction {
    const fn rejected_message(self) -> &'static str {
        match self {
            Self::SendOtp => messages::SEND_FAILED,
            Self::VerifyOtp => messages::INVALID_OTP,
            Self::ResendOtp => messages::RESEND_FAILED,
        }
    }

    const fn error_message(self) -> &'static str {
        match self {
            Self::SendOtp => messages::SEND_ERROR,
            Self::VerifyOtp => messages::VERIFY_ERROR,
            Self::ResendOtp => messages::RESEND_ERROR,
        }
    }
}

impl LoginError {
    fn from_api(action: LoginAction, err: ApiError) -> Self {
        match err {
            ApiError::Rejected { message, .. } => Self::Rejected { action, message },
            source => Self::Request { action, source },
        }
    }

    /// Text suitable for showing to the shopper.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Busy => "Please wait...".to_string(),
            Self::WrongStep(_) | Self::Superseded => String::new(),
            Self::InvalidPhone(_) => messages::INVALID_PHONE.to_string(),
            Self::InvalidOtp(_) => messages::INVALID_OTP_FORMAT.to_string(),
            Self::Rejected { action, message } => message
                .clone()
                .unwrap_or_else(|| action.rejected_message().to_string()),
            Self::Request { action, .. } => action.error_message().to_string(),
            Self::MissingSession | Self::Storage(_) => messages::VERIFY_ERROR.to_string(),
        }
    }
}

// =============================================================================
// LoginFlow
// =============================================================================

#[derive(Debug)]
struct FlowState {
    step: LoginStep,
    phone: String,
    otp: String,
    message: Option<String>,
    /// Bumped on reset so replies to abandoned requests are ignored.
    epoch: u64,
}

impl FlowState {
    const fn new() -> Self {
        Self {
            step: LoginStep::PhoneEntry,
            phone: String::new(),
            otp: String::new(),
            message: None,
            epoch: 0,
        }
    }
}

/// Clears the busy flag when a request ends, including on cancellation.
struct BusyGuard<'a>(&'a AtomicBool);

impl<'a> BusyGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Result<Self, LoginError> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| LoginError::Busy)?;
        Ok(Self(flag))
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// The OTP login form.
pub struct LoginFlow {
    api: ApiClient,
    sessions: SessionStore,
    completion_delay: Duration,
    state: Mutex<FlowState>,
    busy: AtomicBool,
}

impl std::fmt::Debug for LoginFlow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginFlow")
            .field("step", &self.step())
            .field("busy", &self.is_busy())
            .finish_non_exhaustive()
    }
}

impl LoginFlow {
    /// Create a flow in the phone-entry step.
    #[must_use]
    pub fn new(config: &StorefrontConfig, api: ApiClient, sessions: SessionStore) -> Self {
        Self {
            api,
            sessions,
            completion_delay: config.completion_delay,
            state: Mutex::new(FlowState::new()),
            busy: AtomicBool::new(false),
        }
    }

    fn state(&self) -> MutexGuard<'_, FlowState> {
        // The state is plain data, so a panic elsewhere cannot leave it torn
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    #[must_use]
    pub fn step(&self) -> LoginStep {
        self.state().step
    }

    /// Phone number as last entered.
    #[must_use]
    pub fn phone(&self) -> String {
        self.state().phone.clone()
    }

    /// OTP as last entered.
    #[must_use]
    pub fn otp(&self) -> String {
        self.state().otp.clone()
    }

    #[must_use]
    pub fn message(&self) -> Option<String> {
        self.state().message.clone()
    }

    #[must_use]
    pub fn message_kind(&self) -> Option<MessageKind> {
        self.state().message.as_deref().map(MessageKind::of)
    }

    /// Where the OTP was sent, e.g. `+919876543210`, once in the OTP step.
    #[must_use]
    pub fn otp_destination(&self) -> Option<String> {
        let state = self.state();
        (state.step == LoginStep::OtpEntry).then(|| format!("{COUNTRY_CODE}{}", state.phone))
    }

    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.step() == LoginStep::Completed
    }

    /// How long to keep the success message visible before hiding the form.
    #[must_use]
    pub const fn completion_delay(&self) -> Duration {
        self.completion_delay
    }

    // =========================================================================
    // Actions
    // =========================================================================

    /// Request an OTP for `input`.
    ///
    /// # Errors
    ///
    /// Returns [`LoginError::Busy`] while another request is pending,
    /// [`LoginError::InvalidPhone`] without sending anything when `input` is
    /// not 10 digits, and a rejection or request error otherwise.
    #[instrument(skip(self, input))]
    pub async fn submit_phone(&self, input: &str) -> Result<(), LoginError> {
        let _busy = BusyGuard::acquire(&self.busy)?;

        let (phone, epoch) = {
            let mut state = self.state();
            if state.step != LoginStep::PhoneEntry {
                return Err(LoginError::WrongStep(state.step));
            }
            state.phone = input.to_string();
            match PhoneNumber::parse(input) {
                Ok(phone) => (phone, state.epoch),
                Err(e) => return Err(Self::fail(&mut state, LoginError::InvalidPhone(e))),
            }
        };

        let result = self.api.send_otp(&phone).await;

        let mut state = self.state();
        if state.epoch != epoch {
            return Err(LoginError::Superseded);
        }

        match result {
            Ok(_) => {
                info!("OTP sent");
                state.step = LoginStep::OtpEntry;
                state.message = Some(messages::OTP_SENT.to_string());
                Ok(())
            }
            Err(e) => Err(Self::fail(
                &mut state,
                LoginError::from_api(LoginAction::SendOtp, e),
            )),
        }
    }

    /// Exchange `input` for a session.
    ///
    /// On success the session is persisted and announced through the
    /// [`SessionStore`], and the flow moves to [`LoginStep::Completed`].
    ///
    /// # Errors
    ///
    /// Returns [`LoginError::InvalidOtp`] without sending anything when
    /// `input` is not 6 digits, and a rejection, request or storage error
    /// otherwise. On any error the flow stays in the OTP step.
    #[instrument(skip(self, input))]
    pub async fn submit_otp(&self, input: &str) -> Result<(), LoginError> {
        let _busy = BusyGuard::acquire(&self.busy)?;

        let (phone, otp, epoch) = {
            let mut state = self.state();
            if state.step != LoginStep::OtpEntry {
                return Err(LoginError::WrongStep(state.step));
            }
            state.otp = input.to_string();
            let otp = match OtpCode::parse(input) {
                Ok(otp) => otp,
                Err(e) => return Err(Self::fail(&mut state, LoginError::InvalidOtp(e))),
            };
            let phone = match PhoneNumber::parse(&state.phone) {
                Ok(phone) => phone,
                Err(e) => return Err(Self::fail(&mut state, LoginError::InvalidPhone(e))),
            };
            (phone, otp, state.epoch)
        };

        let result = self.api.verify_otp(&phone, &otp).await;

        let mut state = self.state();
        if state.epoch != epoch {
            return Err(LoginError::Superseded);
        }

        let reply = match result {
            Ok(reply) => reply,
            Err(e) => {
                return Err(Self::fail(
                    &mut state,
                    LoginError::from_api(LoginAction::VerifyOtp, e),
                ));
            }
        };

        let (Some(token), Some(user_id)) = (reply.token, reply.user_id) else {
            warn!("Verification succeeded without token or user id");
            return Err(Self::fail(&mut state, LoginError::MissingSession));
        };

        if let Err(e) = self.sessions.login(&Session::new(token, user_id)) {
            return Err(Self::fail(&mut state, e.into()));
        }

        state.step = LoginStep::Completed;
        state.message = Some(messages::LOGIN_OK.to_string());
        Ok(())
    }

    /// Send the OTP again to the current number. The step does not change.
    ///
    /// # Errors
    ///
    /// Returns [`LoginError::Busy`] while another request is pending, and a
    /// rejection or request error otherwise.
    #[instrument(skip(self))]
    pub async fn resend_otp(&self) -> Result<(), LoginError> {
        let _busy = BusyGuard::acquire(&self.busy)?;

        let (phone, epoch) = {
            let mut state = self.state();
            if state.step != LoginStep::OtpEntry {
                return Err(LoginError::WrongStep(state.step));
            }
            match PhoneNumber::parse(&state.phone) {
                Ok(phone) => (phone, state.epoch),
                Err(e) => return Err(Self::fail(&mut state, LoginError::InvalidPhone(e))),
            }
        };

        let result = self.api.send_otp(&phone).await;

        let mut state = self.state();
        if state.epoch != epoch {
            return Err(LoginError::Superseded);
        }

        match result {
            Ok(_) => {
                info!("OTP resent");
                state.message = Some(messages::OTP_RESENT.to_string());
                Ok(())
            }
            Err(e) => Err(Self::fail(
                &mut state,
                LoginError::from_api(LoginAction::ResendOtp, e),
            )),
        }
    }

    /// Go back to phone entry, clearing the phone, OTP and message.
    ///
    /// Any request still in flight is ignored when it completes.
    pub fn change_number(&self) {
        let mut state = self.state();
        let epoch = state.epoch + 1;
        *state = FlowState {
            epoch,
            ..FlowState::new()
        };
        debug!("Login flow reset to phone entry");
    }

    fn fail(state: &mut FlowState, err: LoginError) -> LoginError {
        debug!(error = %err, "Login step failed");
        state.message = Some(err.user_message());
        err
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_message_kind() {
        assert_eq!(MessageKind::of(messages::OTP_SENT), MessageKind::Success);
        assert_eq!(MessageKind::of(messages::LOGIN_OK), MessageKind::Success);
        assert_eq!(MessageKind::of(messages::OTP_RESENT), MessageKind::Success);
        assert_eq!(MessageKind::of(messages::INVALID_OTP), MessageKind::Error);
        assert_eq!(MessageKind::of(messages::SEND_ERROR), MessageKind::Error);
    }

    #[test]
    fn test_rejection_without_message_uses_action_fallback() {
        let err = LoginError::Rejected {
            action: LoginAction::ResendOtp,
            message: None,
        };
        assert_eq!(err.user_message(), messages::RESEND_FAILED);
    }

    #[test]
    fn test_busy_guard_releases_on_drop() {
        let flag = AtomicBool::new(false);
        let guard = BusyGuard::acquire(&flag).unwrap();
        assert!(matches!(BusyGuard::acquire(&flag), Err(LoginError::Busy)));
        drop(guard);
        assert!(BusyGuard::acquire(&flag).is_ok());
    }
}
