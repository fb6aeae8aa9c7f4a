//! Page-level data loading with fixture fallback.
//!
//! A page declares the endpoints it needs through [`PageRequest`]. The
//! [`PageLoader`] then decides, once per load, whether to read fixtures or go
//! to the network:
//!
//! - Mock mode: every slice comes from the [`FixtureRepository`]; nothing is
//!   sent over the wire.
//! - Live mode: all of the page's requests run concurrently and the whole
//!   batch is raced against the configured timeout. If the batch wins, each
//!   slice is the `data` of its envelope. If the timeout wins or any single
//!   request fails, the batch future is dropped (cancelling every in-flight
//!   request) and *all* slices are refilled from fixtures.
//!
//! Either way the result is fully populated and the load finishes within the
//! timeout. Failures are logged and absorbed; they never surface as page errors.

pub mod pages;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futurelabs_core::{Banner, Category, TestItem};
use tracing::{debug, info, instrument, warn};

use crate::api::{ApiClient, ApiError};
use crate::config::StorefrontConfig;
use crate::fixtures::FixtureRepository;

pub use pages::{
    HomeData, HomePage, PackageData, PackagePage, ProductData, ProductPage, SpecialOffer,
    special_offers,
};

// =============================================================================
// PageRequest
// =============================================================================

/// The data requirements of one page.
pub trait PageRequest {
    /// View-state populated by a load.
    type Data: Send;

    /// Page name used in logs.
    fn name(&self) -> &'static str;

    /// Fetch every slice from the live API concurrently.
    ///
    /// Must fail as a whole if any member request fails.
    fn fetch_live(
        &self,
        api: &ApiClient,
    ) -> impl Future<Output = Result<Self::Data, ApiError>> + Send;

    /// Build every slice from fixtures.
    fn from_fixtures(&self, fixtures: &FixtureRepository) -> Self::Data;
}

// =============================================================================
// Load results
// =============================================================================

/// Why the live path was abandoned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackReason {
    /// The batch did not settle within the timeout.
    Timeout(Duration),
    /// A member request failed (transport, status or parse).
    Request(String),
}

/// Where a page's data came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    Mock,
    Live,
    Fallback(FallbackReason),
}

impl DataSource {
    /// Whether the data is fixture data.
    #[must_use]
    pub const fn is_fixture(&self) -> bool {
        matches!(self, Self::Mock | Self::Fallback(_))
    }
}

/// Outcome of a single load.
#[derive(Debug, Clone)]
pub struct Loaded<T> {
    pub data: T,
    pub source: DataSource,
}

// =============================================================================
// PageLoader
// =============================================================================

/// Runs page loads against the API or the fixtures.
///
/// Cheaply cloneable; the fixture repository is shared.
#[derive(Clone)]
pub struct PageLoader {
    api: ApiClient,
    fixtures: Arc<FixtureRepository>,
    use_mock_data: bool,
    timeout: Duration,
}

impl PageLoader {
    /// Create a loader using the mode and timeout from `config`.
    #[must_use]
    pub fn new(
        config: &StorefrontConfig,
        api: ApiClient,
        fixtures: Arc<FixtureRepository>,
    ) -> Self {
        Self {
            api,
            fixtures,
            use_mock_data: config.use_mock_data,
            timeout: config.load_timeout,
        }
    }

    /// The fixtures this loader falls back to.
    #[must_use]
    pub fn fixtures(&self) -> &FixtureRepository {
        &self.fixtures
    }

    /// Load a page.
    ///
    /// Never fails: any live-path failure is replaced by fixture data.
    #[instrument(skip_all, fields(page = request.name()))]
    pub async fn load<R: PageRequest>(&self, request: &R) -> Loaded<R::Data> {
        if self.use_mock_data {
            debug!("Using fixture data (mock mode)");
            return Loaded {
                data: request.from_fixtures(&self.fixtures),
                source: DataSource::Mock,
            };
        }

        // Dropping the batch on timeout cancels every member request, so a
        // late reply can never overwrite the fallback.
        let reason = match tokio::time::timeout(self.timeout, request.fetch_live(&self.api)).await
        {
            Ok(Ok(data)) => {
                info!("Page data loaded from API");
                return Loaded {
                    data,
                    source: DataSource::Live,
                };
            }
            Ok(Err(e)) => {
                warn!(error = %e, "Page request failed, using fixture data");
                FallbackReason::Request(e.to_string())
            }
            Err(_) => {
                warn!(timeout = ?self.timeout, "Page load timed out, using fixture data");
                FallbackReason::Timeout(self.timeout)
            }
        };

        Loaded {
            data: request.from_fixtures(&self.fixtures),
            source: DataSource::Fallback(reason),
        }
    }
}

// =============================================================================
// PageState
// =============================================================================

/// Ticket identifying one load of a [`PageState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket(u64);

/// A page's view-state.
///
/// Each load is stamped with a generation; only the result of the most
/// recently started load is committed.
#[derive(Debug)]
pub struct PageState<T> {
    loading: bool,
    data: Option<T>,
    source: Option<DataSource>,
    generation: u64,
}

impl<T> Default for PageState<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> PageState<T> {
    /// A page that has not loaded yet. Pages start in the loading state.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            loading: true,
            data: None,
            source: None,
            generation: 0,
        }
    }

    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.loading
    }

    #[must_use]
    pub const fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    #[must_use]
    pub const fn source(&self) -> Option<&DataSource> {
        self.source.as_ref()
    }

    /// Start a load and return its ticket.
    pub const fn begin(&mut self) -> LoadTicket {
        self.generation += 1;
        self.loading = true;
        LoadTicket(self.generation)
    }

    /// Commit a load result.
    ///
    /// Returns `false` and discards the result when a newer load has started
    /// since `ticket` was issued.
    pub fn commit(&mut self, ticket: LoadTicket, loaded: Loaded<T>) -> bool {
        if ticket.0 != self.generation {
            debug!(
                ticket = ticket.0,
                current = self.generation,
                "Discarding stale page load"
            );
            return false;
        }

        self.data = Some(loaded.data);
        self.source = Some(loaded.source);
        self.loading = false;
        true
    }

    /// Run a full load cycle through `loader`.
    ///
    /// This holds `&mut self` across the await, so nothing can start a newer
    /// load on the same state meanwhile. Callers that keep several loads in
    /// flight (a refresh fired while the first load is still pending) use
    /// [`PageState::begin`] and [`PageState::commit`] directly; only the
    /// newest ticket is committed.
    pub async fn load<R>(&mut self, loader: &PageLoader, request: &R)
    where
        R: PageRequest<Data = T>,
    {
        let ticket = self.begin();
        let loaded = loader.load(request).await;
        self.commit(ticket, loaded);
    }
}

// =============================================================================
// Image resolution
// =============================================================================

/// Turns relative image references into renderable URLs.
#[derive(Debug, Clone)]
pub struct ImageResolver {
    use_mock_data: bool,
    base_url: String,
    static_root: String,
}

impl ImageResolver {
    /// Create a resolver for the mode in `config`.
    #[must_use]
    pub fn new(config: &StorefrontConfig) -> Self {
        Self {
            use_mock_data: config.use_mock_data,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            static_root: config.static_root.trim_end_matches('/').to_string(),
        }
    }

    /// Resolve a raw image path.
    ///
    /// Fixture paths are served from the static asset root (one leading `/` is
    /// stripped); API paths are served by the API itself. Absolute URLs pass
    /// through untouched.
    #[must_use]
    pub fn resolve(&self, raw: &str) -> String {
        if raw.starts_with("http://") || raw.starts_with("https://") {
            return raw.to_string();
        }

        if self.use_mock_data {
            let path = raw.strip_prefix('/').unwrap_or(raw);
            format!("{}/{path}", self.static_root)
        } else {
            format!("{}/{raw}", self.base_url)
        }
    }
}

/// Types holding image references that must be resolved before render.
pub trait ResolveImages {
    /// Rewrite every image reference through `resolver`.
    #[must_use]
    fn resolve_images(self, resolver: &ImageResolver) -> Self;
}

impl ResolveImages for Category {
    fn resolve_images(mut self, resolver: &ImageResolver) -> Self {
        self.image_path = resolver.resolve(&self.image_path);
        self
    }
}

impl ResolveImages for TestItem {
    fn resolve_images(mut self, resolver: &ImageResolver) -> Self {
        self.image_path = self.image_path.map(|path| resolver.resolve(&path));
        self
    }
}

impl ResolveImages for Banner {
    fn resolve_images(mut self, resolver: &ImageResolver) -> Self {
        self.image_url = resolver.resolve(&self.image_url);
        self
    }
}

impl<T: ResolveImages> ResolveImages for Vec<T> {
    fn resolve_images(self, resolver: &ImageResolver) -> Self {
        self.into_iter()
            .map(|item| item.resolve_images(resolver))
            .collect()
    }
}

impl<T: ResolveImages> ResolveImages for Option<T> {
    fn resolve_images(self, resolver: &ImageResolver) -> Self {
        self.map(|item| item.resolve_images(resolver))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn mock_config(static_root: &str) -> StorefrontConfig {
        StorefrontConfig {
            static_root: static_root.to_string(),
            ..StorefrontConfig::mock()
        }
    }

    #[test]
    fn test_resolve_mock_relative_path() {
        let resolver = ImageResolver::new(&mock_config("/public"));
        assert_eq!(resolver.resolve("images/x.png"), "/public/images/x.png");
    }

    #[test]
    fn test_resolve_mock_strips_one_leading_slash() {
        let resolver = ImageResolver::new(&mock_config("/public"));
        assert_eq!(resolver.resolve("/images/x.png"), "/public/images/x.png");
    }

    #[test]
    fn test_resolve_live_prefixes_base_url() {
        let config = StorefrontConfig::live("https://api.futurelabs.in").unwrap();
        let resolver = ImageResolver::new(&config);
        assert_eq!(
            resolver.resolve("images/x.png"),
            "https://api.futurelabs.in/images/x.png"
        );
    }

    #[test]
    fn test_resolve_absolute_url_untouched() {
        let resolver = ImageResolver::new(&mock_config(""));
        assert_eq!(
            resolver.resolve("https://cdn.example.com/a.png"),
            "https://cdn.example.com/a.png"
        );
    }

    #[test]
    fn test_resolve_images_on_collections() {
        let resolver = ImageResolver::new(&mock_config("/static"));
        let banners = vec![Banner {
            id: None,
            title: None,
            image_url: "/ads/a.png".to_string(),
        }];
        let resolved = banners.resolve_images(&resolver);
        assert_eq!(resolved.first().unwrap().image_url, "/static/ads/a.png");
    }

    #[test]
    fn test_page_state_starts_loading() {
        let state: PageState<u32> = PageState::new();
        assert!(state.is_loading());
        assert!(state.data().is_none());
    }

    #[test]
    fn test_stale_commit_is_discarded() {
        let mut state: PageState<&str> = PageState::new();
        let first = state.begin();
        let second = state.begin();

        assert!(state.commit(
            second,
            Loaded {
                data: "fallback",
                source: DataSource::Fallback(FallbackReason::Timeout(Duration::from_secs(10))),
            }
        ));
        assert!(!state.is_loading());

        // A late reply from the abandoned load must not overwrite the fallback
        assert!(!state.commit(
            first,
            Loaded {
                data: "late",
                source: DataSource::Live,
            }
        ));
        assert_eq!(state.data(), Some(&"fallback"));
        assert!(state.source().unwrap().is_fixture());
    }
}
