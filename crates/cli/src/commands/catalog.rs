//! Page browsing commands.
//!
//! Each command loads one page through the storefront loader and prints it as
//! JSON, tagged with where the data came from.

use futurelabs_core::TestId;
use futurelabs_storefront::AppState;
use futurelabs_storefront::loader::{HomePage, PackagePage, ProductPage, special_offers};
use serde_json::json;

use super::{CommandError, describe_source, print_json};

/// Print the landing page.
pub async fn home(state: &AppState) -> Result<(), CommandError> {
    let loaded = state.load_page(&HomePage).await;
    tracing::info!(source = %describe_source(&loaded.source), "Home page loaded");

    print_json(&json!({
        "source": describe_source(&loaded.source),
        "page": loaded.data,
        "specialOffers": special_offers(),
    }))
}

/// Print the package listing.
pub async fn package(state: &AppState) -> Result<(), CommandError> {
    let loaded = state.load_page(&PackagePage).await;

    print_json(&json!({
        "source": describe_source(&loaded.source),
        "page": loaded.data,
    }))
}

/// Print a product page. Without an id the page is empty.
pub async fn product(state: &AppState, id: Option<String>) -> Result<(), CommandError> {
    let page = ProductPage {
        id: id.map(TestId::new),
    };
    let loaded = state.load_page(&page).await;

    if loaded.data.product.is_none() {
        tracing::warn!(id = ?page.id, "Product not found");
    }

    print_json(&json!({
        "source": describe_source(&loaded.source),
        "page": loaded.data,
    }))
}
