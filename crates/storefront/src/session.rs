//! Authenticated session persistence and change notifications.

use std::sync::Arc;

use futurelabs_core::UserId;
use secrecy::{ExposeSecret, SecretString};
use tokio::sync::broadcast;
use tracing::info;

use crate::storage::{KeyValueStore, StorageError, USER_ID_KEY, USER_TOKEN_KEY};

const EVENT_CAPACITY: usize = 16;

/// The token/user id pair of a logged-in user.
pub struct Session {
    token: SecretString,
    user_id: UserId,
}

impl Session {
    #[must_use]
    pub fn new(token: impl Into<String>, user_id: UserId) -> Self {
        Self {
            token: SecretString::from(token.into()),
            user_id,
        }
    }

    #[must_use]
    pub const fn token(&self) -> &SecretString {
        &self.token
    }

    #[must_use]
    pub const fn user_id(&self) -> &UserId {
        &self.user_id
    }
}

impl Clone for Session {
    fn clone(&self) -> Self {
        Self::new(self.token.expose_secret(), self.user_id.clone())
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("token", &"[REDACTED]")
            .field("user_id", &self.user_id)
            .finish()
    }
}

/// Session lifecycle notifications.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    LoggedIn(UserId),
    LoggedOut,
}

/// Reads and writes the session records and announces changes.
///
/// Cloning shares both the backing store and the event channel.
#[derive(Clone)]
pub struct SessionStore {
    store: Arc<dyn KeyValueStore>,
    events: broadcast::Sender<SessionEvent>,
}

impl SessionStore {
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self { store, events }
    }

    /// The persisted session, if both records are present.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn current(&self) -> Result<Option<Session>, StorageError> {
        let token = self.store.get(USER_TOKEN_KEY)?;
        let user_id = self.store.get(USER_ID_KEY)?;

        Ok(match (token, user_id) {
            (Some(token), Some(user_id)) => Some(Session::new(token, UserId::new(user_id))),
            _ => None,
        })
    }

    /// Persist `session` and announce it.
    ///
    /// The token and user id are written in one batch.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written; neither record is
    /// changed then.
    pub fn login(&self, session: &Session) -> Result<(), StorageError> {
        self.store.write_batch(&[
            (USER_TOKEN_KEY, Some(session.token.expose_secret())),
            (USER_ID_KEY, Some(session.user_id.as_str())),
        ])?;

        info!(user_id = %session.user_id, "Session established");
        self.publish(SessionEvent::LoggedIn(session.user_id.clone()));
        Ok(())
    }

    /// Forget the persisted session.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be written.
    pub fn logout(&self) -> Result<(), StorageError> {
        self.store
            .write_batch(&[(USER_TOKEN_KEY, None), (USER_ID_KEY, None)])?;

        info!("Session cleared");
        self.publish(SessionEvent::LoggedOut);
        Ok(())
    }

    /// Subscribe to session changes made after this call.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    fn publish(&self, event: SessionEvent) {
        // Sending only fails when nobody is listening
        let _ = self.events.send(event);
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("subscribers", &self.events.receiver_count())
            .finish_non_exhaustive()
    }
}
