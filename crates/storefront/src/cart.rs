//! Local cart record, change notifications and the cart badge.
//!
//! The cart is persisted as a JSON array of test ids under the `cart` key.
//! Every mutation made through [`CartStore`] is announced on a broadcast
//! channel, so observers such as [`CartBadge`] stay in sync with changes made
//! anywhere in the process.

use std::fmt;
use std::sync::Arc;

use futurelabs_core::TestId;
use thiserror::Error;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tracing::{debug, info, instrument, warn};

use crate::api::{ApiClient, ApiError};
use crate::session::SessionStore;
use crate::storage::{self, CART_KEY, KeyValueStore, StorageError};

const EVENT_CAPACITY: usize = 32;

/// Shown after a test was added.
pub const ADDED_MESSAGE: &str = "Item added to cart successfully!";
/// Shown after a test was removed.
pub const REMOVED_MESSAGE: &str = "Item removed from cart";

// =============================================================================
// Errors
// =============================================================================

/// A server-side cart operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartOp {
    Add,
    Remove,
}

impl CartOp {
    /// Fallback text when the API rejects without a message.
    #[must_use]
    pub const fn rejected_message(self) -> &'static str {
        match self {
            Self::Add => "Failed to add item to cart",
            Self::Remove => "Failed to remove item from cart",
        }
    }

    /// Text shown when no session is stored.
    #[must_use]
    pub const fn login_message(self) -> &'static str {
        match self {
            Self::Add => "Please login to add items to cart",
            Self::Remove => "Please login to manage your cart",
        }
    }

    /// Text shown when the request itself fails.
    #[must_use]
    pub const fn failed_message(self) -> &'static str {
        match self {
            Self::Add => "Error adding item to cart",
            Self::Remove => "Error removing item from cart",
        }
    }
}

impl fmt::Display for CartOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Add => "cart add",
            Self::Remove => "cart remove",
        })
    }
}

/// Errors from cart operations.
#[derive(Debug, Error)]
pub enum CartError {
    /// No session is stored; nothing was sent.
    #[error("{0} needs a login")]
    NotLoggedIn(CartOp),

    /// The API answered `success: false`.
    #[error("{op} rejected: {}", .message.as_deref().unwrap_or("no message"))]
    Rejected { op: CartOp, message: Option<String> },

    /// The request did not complete.
    #[error("{op} failed: {source}")]
    Request {
        op: CartOp,
        #[source]
        source: ApiError,
    },

    /// The local cart record could not be read or written.
    #[error("cart storage error: {0}")]
    Storage(#[from] StorageError),
}

impl CartError {
    fn from_api(op: CartOp, err: ApiError) -> Self {
        match err {
            ApiError::Rejected { message, .. } => Self::Rejected { op, message },
            source => Self::Request { op, source },
        }
    }

    /// Text suitable for showing to the shopper.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::NotLoggedIn(op) => op.login_message().to_string(),
            Self::Rejected { op, message } => message
                .clone()
                .unwrap_or_else(|| op.rejected_message().to_string()),
            Self::Request { op, .. } => op.failed_message().to_string(),
            Self::Storage(_) => "Could not update your cart. Please try again.".to_string(),
        }
    }
}

// =============================================================================
// CartStore
// =============================================================================

/// A change to the local cart record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartEvent {
    Added(TestId),
    Removed(TestId),
    Cleared,
}

/// The persisted cart record.
///
/// Cloning shares the backing store and the event channel.
#[derive(Clone)]
pub struct CartStore {
    store: Arc<dyn KeyValueStore>,
    events: broadcast::Sender<CartEvent>,
}

impl CartStore {
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self { store, events }
    }

    /// Test ids in the cart, in insertion order. A missing record is empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be read or decoded.
    pub fn items(&self) -> Result<Vec<TestId>, StorageError> {
        Ok(storage::get_json(self.store.as_ref(), CART_KEY)?.unwrap_or_default())
    }

    /// Number of entries in the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be read or decoded.
    pub fn len(&self) -> Result<usize, StorageError> {
        self.items().map(|items| items.len())
    }

    /// # Errors
    ///
    /// Returns an error if the record cannot be read or decoded.
    pub fn is_empty(&self) -> Result<bool, StorageError> {
        self.len().map(|len| len == 0)
    }

    /// Append a test id. Duplicates are kept.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be read or written.
    pub fn add(&self, id: TestId) -> Result<(), StorageError> {
        let mut count = 0;
        storage::update_json(self.store.as_ref(), CART_KEY, |items: &mut Vec<TestId>| {
            items.push(id.clone());
            count = items.len();
        })?;

        debug!(test_id = %id, count, "Cart item added");
        self.publish(CartEvent::Added(id));
        Ok(())
    }

    /// Remove the first occurrence of `id`. Returns whether anything changed.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be read or written.
    pub fn remove(&self, id: &TestId) -> Result<bool, StorageError> {
        let mut removed = false;
        let mut count = 0;
        storage::update_json(self.store.as_ref(), CART_KEY, |items: &mut Vec<TestId>| {
            if let Some(position) = items.iter().position(|item| item == id) {
                items.remove(position);
                removed = true;
            }
            count = items.len();
        })?;

        if !removed {
            return Ok(false);
        }

        debug!(test_id = %id, count, "Cart item removed");
        self.publish(CartEvent::Removed(id.clone()));
        Ok(true)
    }

    /// Empty the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be written.
    pub fn clear(&self) -> Result<(), StorageError> {
        self.store.remove(CART_KEY)?;
        self.publish(CartEvent::Cleared);
        Ok(())
    }

    /// Subscribe to cart changes made after this call.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<CartEvent> {
        self.events.subscribe()
    }

    fn publish(&self, event: CartEvent) {
        // Sending only fails when nobody is listening
        let _ = self.events.send(event);
    }
}

impl fmt::Debug for CartStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CartStore")
            .field("subscribers", &self.events.receiver_count())
            .finish_non_exhaustive()
    }
}

// =============================================================================
// CartBadge
// =============================================================================

/// Item counter shown in the header.
///
/// Reads the cart once on mount, then recomputes on every change
/// notification. Dropping the badge unsubscribes.
#[derive(Debug)]
pub struct CartBadge {
    cart: CartStore,
    events: broadcast::Receiver<CartEvent>,
    count: usize,
}

impl CartBadge {
    /// Read the current count and start listening for changes.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart record cannot be read.
    pub fn mount(cart: &CartStore) -> Result<Self, StorageError> {
        // Subscribe first so no change between the read and the subscription
        // is missed
        let events = cart.subscribe();
        let count = cart.len()?;

        Ok(Self {
            cart: cart.clone(),
            events,
            count,
        })
    }

    /// Current count, after applying any pending notifications.
    pub fn count(&mut self) -> usize {
        let mut stale = false;
        loop {
            match self.events.try_recv() {
                Ok(_) | Err(TryRecvError::Lagged(_)) => stale = true,
                Err(TryRecvError::Empty | TryRecvError::Closed) => break,
            }
        }

        if stale {
            self.refresh();
        }
        self.count
    }

    /// The badge is hidden while the cart is empty.
    pub fn is_visible(&mut self) -> bool {
        self.count() > 0
    }

    /// Wait for the next cart change and return the new count.
    ///
    /// Returns `None` once the cart store has gone away.
    pub async fn changed(&mut self) -> Option<usize> {
        match self.events.recv().await {
            Ok(_) | Err(RecvError::Lagged(_)) => {
                self.refresh();
                Some(self.count())
            }
            Err(RecvError::Closed) => None,
        }
    }

    fn refresh(&mut self) {
        match self.cart.len() {
            Ok(count) => self.count = count,
            Err(e) => warn!(error = %e, "Failed to re-read cart, keeping previous count"),
        }
    }
}

// =============================================================================
// CartService
// =============================================================================

/// Server-side cart actions for the logged-in user.
#[derive(Debug, Clone)]
pub struct CartService {
    api: ApiClient,
    sessions: SessionStore,
    cart: CartStore,
}

impl CartService {
    #[must_use]
    pub fn new(api: ApiClient, sessions: SessionStore, cart: CartStore) -> Self {
        Self {
            api,
            sessions,
            cart,
        }
    }

    /// Add a test to the user's cart.
    ///
    /// On success the id is appended to the local record as well, which
    /// notifies every mounted badge.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::NotLoggedIn`] without sending anything when no
    /// session is stored, and an error when the API rejects or the request
    /// fails.
    #[instrument(skip(self), fields(test_id = %test_id))]
    pub async fn add_to_cart(&self, test_id: &TestId) -> Result<&'static str, CartError> {
        let session = self
            .sessions
            .current()?
            .ok_or(CartError::NotLoggedIn(CartOp::Add))?;

        self.api
            .add_to_cart(session.user_id(), test_id)
            .await
            .map_err(|e| CartError::from_api(CartOp::Add, e))?;

        self.cart.add(test_id.clone())?;
        info!("Added to cart");
        Ok(ADDED_MESSAGE)
    }

    /// Remove a test from the user's cart.
    ///
    /// # Errors
    ///
    /// Same as [`CartService::add_to_cart`].
    #[instrument(skip(self), fields(test_id = %test_id))]
    pub async fn remove_from_cart(&self, test_id: &TestId) -> Result<&'static str, CartError> {
        let session = self
            .sessions
            .current()?
            .ok_or(CartError::NotLoggedIn(CartOp::Remove))?;

        self.api
            .remove_from_cart(session.user_id(), test_id)
            .await
            .map_err(|e| CartError::from_api(CartOp::Remove, e))?;

        if !self.cart.remove(test_id)? {
            debug!("Removed item was not in the local cart");
        }
        info!("Removed from cart");
        Ok(REMOVED_MESSAGE)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn cart_store() -> CartStore {
        CartStore::new(Arc::new(MemoryStore::new()))
    }

    #[test]
    fn test_missing_record_is_empty() {
        let cart = cart_store();
        assert!(cart.is_empty().unwrap());
    }

    #[test]
    fn test_remove_drops_first_match_only() {
        let cart = cart_store();
        cart.add(TestId::new("t1")).unwrap();
        cart.add(TestId::new("t2")).unwrap();
        cart.add(TestId::new("t1")).unwrap();

        assert!(cart.remove(&TestId::new("t1")).unwrap());
        assert_eq!(cart.items().unwrap(), vec![TestId::new("t2"), TestId::new("t1")]);
        assert!(!cart.remove(&TestId::new("t9")).unwrap());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_adds_are_all_kept() {
        let cart = cart_store();

        let writers: Vec<_> = (0..8)
            .map(|task| {
                let cart = cart.clone();
                tokio::spawn(async move {
                    for i in 0..200 {
                        cart.add(TestId::new(format!("t{task}-{i}"))).unwrap();
                        tokio::task::yield_now().await;
                    }
                })
            })
            .collect();
        for writer in writers {
            writer.await.unwrap();
        }

        assert_eq!(cart.len().unwrap(), 1600);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_removes_each_take_one_entry() {
        let cart = cart_store();
        for _ in 0..400 {
            cart.add(TestId::new("t1")).unwrap();
        }

        let removers: Vec<_> = (0..4)
            .map(|_| {
                let cart = cart.clone();
                tokio::spawn(async move {
                    let mut hits = 0;
                    for _ in 0..150 {
                        if cart.remove(&TestId::new("t1")).unwrap() {
                            hits += 1;
                        }
                    }
                    hits
                })
            })
            .collect();

        let mut total = 0;
        for remover in removers {
            total += remover.await.unwrap();
        }

        assert_eq!(total, 400);
        assert!(cart.is_empty().unwrap());
    }

    #[test]
    fn test_badge_follows_local_mutations() {
        let cart = cart_store();
        cart.add(TestId::new("t1")).unwrap();

        let mut badge = CartBadge::mount(&cart).unwrap();
        assert_eq!(badge.count(), 1);

        cart.add(TestId::new("t2")).unwrap();
        assert_eq!(badge.count(), 2);

        cart.clear().unwrap();
        assert_eq!(badge.count(), 0);
        assert!(!badge.is_visible());
    }

    #[test]
    fn test_badge_recovers_from_lag() {
        let cart = cart_store();
        let mut badge = CartBadge::mount(&cart).unwrap();

        for i in 0..(EVENT_CAPACITY * 2) {
            cart.add(TestId::new(format!("t{i}"))).unwrap();
        }
        assert_eq!(badge.count(), EVENT_CAPACITY * 2);
    }

    #[test]
    fn test_dropping_badge_unsubscribes() {
        let cart = cart_store();
        let badge = CartBadge::mount(&cart).unwrap();
        assert_eq!(cart.events.receiver_count(), 1);
        drop(badge);
        assert_eq!(cart.events.receiver_count(), 0);
    }

    #[tokio::test]
    async fn test_badge_changed_wakes_on_add() {
        let cart = cart_store();
        let mut badge = CartBadge::mount(&cart).unwrap();

        let writer = cart.clone();
        tokio::spawn(async move {
            writer.add(TestId::new("t1")).unwrap();
        });

        assert_eq!(badge.changed().await, Some(1));
    }

    #[test]
    fn test_user_messages() {
        assert_eq!(
            CartError::NotLoggedIn(CartOp::Add).user_message(),
            "Please login to add items to cart"
        );
        assert_eq!(
            CartError::NotLoggedIn(CartOp::Remove).user_message(),
            "Please login to manage your cart"
        );
        assert_eq!(
            CartError::Rejected {
                op: CartOp::Add,
                message: None
            }
            .user_message(),
            "Failed to add item to cart"
        );
        assert_eq!(
            CartError::Rejected {
                op: CartOp::Add,
                message: Some("Already in cart".to_string())
            }
            .user_message(),
            "Already in cart"
        );
    }
}
