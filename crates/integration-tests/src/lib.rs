//! Integration tests for the FutureLabs storefront client.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p futurelabs-integration-tests
//! ```
//!
//! Tests run the library against an in-process mock of the booking API
//! (`mockito`) or against bare TCP listeners for the timing cases, so no
//! external services are needed.
//!
//! # Test Categories
//!
//! - `loader_fallback` - Page loading, timeout race and fixture fallback
//! - `login_flow` - OTP login state machine
//! - `cart_sync` - Cart actions and badge updates

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use futurelabs_storefront::storage::MemoryStore;
use futurelabs_storefront::{AppState, StorefrontConfig};
use serde_json::{Value, json};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// State wired to a live API at `base_url`, backed by an inspectable store.
///
/// # Errors
///
/// Returns an error if `base_url` is invalid or the client cannot be built.
pub fn live_state(
    base_url: &str,
) -> Result<(AppState, Arc<MemoryStore>), Box<dyn std::error::Error>> {
    live_state_with(base_url, |_| {})
}

/// Like [`live_state`], with a hook to adjust the configuration.
///
/// # Errors
///
/// Returns an error if `base_url` is invalid or the client cannot be built.
pub fn live_state_with(
    base_url: &str,
    adjust: impl FnOnce(&mut StorefrontConfig),
) -> Result<(AppState, Arc<MemoryStore>), Box<dyn std::error::Error>> {
    let mut config = StorefrontConfig::live(base_url)?;
    adjust(&mut config);

    let store = Arc::new(MemoryStore::new());
    let state = AppState::new(config, store.clone())?;
    Ok((state, store))
}

/// A successful envelope around `data`.
#[must_use]
pub fn envelope(data: Value) -> String {
    json!({"success": true, "data": data}).to_string()
}

/// A failed envelope carrying `message`.
#[must_use]
pub fn rejection(message: &str) -> String {
    json!({"success": false, "message": message}).to_string()
}

/// An address nothing listens on, so connecting fails immediately.
///
/// # Errors
///
/// Returns an error if no local port can be reserved.
pub async fn refused_address() -> io::Result<String> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    drop(listener);
    Ok(format!("http://{addr}"))
}

/// A server that accepts connections but never answers.
///
/// # Errors
///
/// Returns an error if the listener cannot be bound.
pub async fn silent_server() -> io::Result<String> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });

    Ok(format!("http://{addr}"))
}

/// A server that answers every request with `body` after `delay`.
///
/// # Errors
///
/// Returns an error if the listener cannot be bound.
pub async fn delayed_server(delay: Duration, body: String) -> io::Result<String> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr: SocketAddr = listener.local_addr()?;
    let body = Arc::new(body);

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let body = body.clone();
            tokio::spawn(async move {
                let mut buf = [0_u8; 4096];
                let _ = socket.read(&mut buf).await;
                tokio::time::sleep(delay).await;
                let response = format!(
                    "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
            });
        }
    });

    Ok(format!("http://{addr}"))
}
