//! Application state shared across the storefront.

use std::sync::Arc;

use crate::api::{ApiClient, ApiError};
use crate::cart::{CartBadge, CartService, CartStore};
use crate::config::StorefrontConfig;
use crate::error::AppError;
use crate::fixtures::FixtureRepository;
use crate::loader::{ImageResolver, Loaded, PageLoader, PageRequest, ResolveImages};
use crate::login::LoginFlow;
use crate::session::SessionStore;
use crate::storage::{FileStore, KeyValueStore, StorageError};

/// Application state shared by every page and action.
///
/// This struct is cheaply cloneable via `Arc`. It owns the only handles to
/// the persisted cart and session, so every change made through it is seen
/// by all subscribers.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    api: ApiClient,
    loader: PageLoader,
    images: ImageResolver,
    sessions: SessionStore,
    cart: CartStore,
    cart_service: CartService,
}

impl AppState {
    /// Create the state with the built-in fixtures.
    ///
    /// # Arguments
    ///
    /// * `config` - Storefront configuration
    /// * `store` - Backing store for the cart and session
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: StorefrontConfig, store: Arc<dyn KeyValueStore>) -> Result<Self, ApiError> {
        Self::with_fixtures(config, store, FixtureRepository::builtin())
    }

    /// Create the state with a custom fixture set.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn with_fixtures(
        config: StorefrontConfig,
        store: Arc<dyn KeyValueStore>,
        fixtures: FixtureRepository,
    ) -> Result<Self, ApiError> {
        let api = ApiClient::new(&config)?;
        let loader = PageLoader::new(&config, api.clone(), Arc::new(fixtures));
        let images = ImageResolver::new(&config);
        let sessions = SessionStore::new(store.clone());
        let cart = CartStore::new(store);
        let cart_service = CartService::new(api.clone(), sessions.clone(), cart.clone());

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                api,
                loader,
                images,
                sessions,
                cart,
                cart_service,
            }),
        })
    }

    /// Create the state persisting to the file named in `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage file is unreadable or the HTTP client
    /// cannot be built.
    pub fn open(config: StorefrontConfig) -> Result<Self, AppError> {
        let store: Arc<dyn KeyValueStore> = Arc::new(
            FileStore::open(&config.storage_path).map_err(AppError::Storage)?,
        );
        Ok(Self::new(config, store)?)
    }

    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    #[must_use]
    pub fn loader(&self) -> &PageLoader {
        &self.inner.loader
    }

    #[must_use]
    pub fn images(&self) -> &ImageResolver {
        &self.inner.images
    }

    #[must_use]
    pub fn sessions(&self) -> &SessionStore {
        &self.inner.sessions
    }

    #[must_use]
    pub fn cart(&self) -> &CartStore {
        &self.inner.cart
    }

    #[must_use]
    pub fn cart_service(&self) -> &CartService {
        &self.inner.cart_service
    }

    /// A fresh login form bound to this state's session store.
    #[must_use]
    pub fn login_flow(&self) -> LoginFlow {
        LoginFlow::new(
            &self.inner.config,
            self.inner.api.clone(),
            self.inner.sessions.clone(),
        )
    }

    /// Mount a cart badge on this state's cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart record cannot be read.
    pub fn cart_badge(&self) -> Result<CartBadge, StorageError> {
        CartBadge::mount(&self.inner.cart)
    }

    /// Load a page and resolve its image references for rendering.
    pub async fn load_page<R>(&self, request: &R) -> Loaded<R::Data>
    where
        R: PageRequest,
        R::Data: ResolveImages,
    {
        let loaded = self.inner.loader.load(request).await;
        Loaded {
            data: loaded.data.resolve_images(&self.inner.images),
            source: loaded.source,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use futurelabs_core::TestId;

    use super::*;
    use crate::loader::{DataSource, PackagePage};
    use crate::storage::MemoryStore;

    fn mock_state() -> AppState {
        AppState::new(StorefrontConfig::mock(), Arc::new(MemoryStore::new())).unwrap()
    }

    #[tokio::test]
    async fn test_load_page_resolves_fixture_images() {
        let state = AppState::new(
            StorefrontConfig {
                static_root: "/public".to_string(),
                ..StorefrontConfig::mock()
            },
            Arc::new(MemoryStore::new()),
        )
        .unwrap();

        let loaded = state.load_page(&PackagePage).await;
        assert_eq!(loaded.source, DataSource::Mock);
        let banner = loaded.data.banner.unwrap();
        assert!(banner.image_url.starts_with("/public/"));
    }

    #[test]
    fn test_clones_share_cart() {
        let state = mock_state();
        let other = state.clone();
        let mut badge = state.cart_badge().unwrap();

        other.cart().add(TestId::new("t1")).unwrap();
        assert_eq!(badge.count(), 1);
    }

    #[test]
    fn test_open_uses_storage_path() {
        let dir = tempfile::tempdir().unwrap();
        let config = StorefrontConfig {
            storage_path: dir.path().join("storage.json"),
            ..StorefrontConfig::mock()
        };

        let state = AppState::open(config.clone()).unwrap();
        state.cart().add(TestId::new("t1")).unwrap();
        drop(state);

        let reopened = AppState::open(config).unwrap();
        assert_eq!(reopened.cart().len().unwrap(), 1);
    }
}
