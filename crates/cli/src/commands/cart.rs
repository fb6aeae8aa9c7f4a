//! Cart commands.

use futurelabs_core::TestId;
use futurelabs_storefront::api::CartEntry;
use futurelabs_storefront::{AppError, AppState, error};
use serde_json::json;

use super::{CommandError, print_json, say};

fn show_badge(state: &AppState) -> Result<(), CommandError> {
    let mut badge = state.cart_badge().map_err(AppError::from)?;
    if badge.is_visible() {
        say(&format!("Cart: {} item(s)", badge.count()))?;
    }
    Ok(())
}

/// Add a test to the cart.
pub async fn add(state: &AppState, id: String) -> Result<(), CommandError> {
    error::add_breadcrumb("cart", "Add to cart");

    match state.cart_service().add_to_cart(&TestId::new(id)).await {
        Ok(message) => {
            say(message)?;
            show_badge(state)
        }
        Err(e) => {
            say(&e.user_message())?;
            let err = AppError::from(e);
            err.report();
            Err(err.into())
        }
    }
}

/// Remove a test from the cart.
pub async fn remove(state: &AppState, id: String) -> Result<(), CommandError> {
    error::add_breadcrumb("cart", "Remove from cart");

    match state.cart_service().remove_from_cart(&TestId::new(id)).await {
        Ok(message) => {
            say(message)?;
            show_badge(state)
        }
        Err(e) => {
            say(&e.user_message())?;
            let err = AppError::from(e);
            err.report();
            Err(err.into())
        }
    }
}

/// Print the cart. With `remote`, the server-side cart is fetched as well.
pub async fn list(state: &AppState, remote: bool) -> Result<(), CommandError> {
    let local = state.cart().items().map_err(AppError::from)?;

    let server = if remote {
        let session = state
            .sessions()
            .current()
            .map_err(AppError::from)?
            .ok_or_else(|| AppError::NotFound("Session".to_string()))?;

        let reply = state
            .api()
            .cart(session.user_id())
            .await
            .map_err(AppError::from)?;
        let ids: Vec<TestId> = reply
            .into_data_or_default()
            .iter()
            .filter_map(CartEntry::test_id)
            .cloned()
            .collect();
        Some(ids)
    } else {
        None
    };

    print_json(&json!({
        "count": local.len(),
        "items": local,
        "server": server,
    }))
}
