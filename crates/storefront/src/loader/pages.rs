//! Data requirements of the storefront pages.

use futurelabs_core::{Banner, Category, Envelope, Price, TestId, TestItem};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::{ImageResolver, PageRequest, ResolveImages};
use crate::api::{ApiClient, ApiError, Endpoint};
use crate::fixtures::FixtureRepository;

/// Fetch a list-valued slice; a failed envelope yields an empty list.
async fn slice<T>(api: &ApiClient, endpoint: Endpoint) -> Result<T, ApiError>
where
    T: DeserializeOwned + Default,
{
    Ok(api.fetch::<Envelope<T>>(&endpoint).await?.into_data_or_default())
}

/// Fetch a single-valued slice; a failed envelope yields `None`.
async fn optional<T>(api: &ApiClient, endpoint: Endpoint) -> Result<Option<T>, ApiError>
where
    T: DeserializeOwned,
{
    Ok(api.fetch::<Envelope<T>>(&endpoint).await?.into_data())
}

// =============================================================================
// Home
// =============================================================================

/// The landing page.
#[derive(Debug, Clone, Copy, Default)]
pub struct HomePage;

/// View-state of the landing page.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct HomeData {
    /// Featured low-price categories
    pub categories: Vec<Category>,
    /// Bottom promotional banners
    pub ads: Vec<Banner>,
    pub women_age: Vec<Category>,
    pub women_care: Vec<Category>,
    pub men_age: Vec<Category>,
    pub men_care: Vec<Category>,
    pub lifestyle: Vec<Category>,
    pub special_care: Vec<TestItem>,
    pub single_test: Vec<TestItem>,
}

impl PageRequest for HomePage {
    type Data = HomeData;

    fn name(&self) -> &'static str {
        "home"
    }

    async fn fetch_live(&self, api: &ApiClient) -> Result<HomeData, ApiError> {
        let (
            categories,
            ads,
            women_age,
            women_care,
            men_age,
            men_care,
            lifestyle,
            special_care,
            single_test,
        ): (
            Vec<Category>,
            Vec<Banner>,
            Vec<Category>,
            Vec<Category>,
            Vec<Category>,
            Vec<Category>,
            Vec<Category>,
            Vec<TestItem>,
            Vec<TestItem>,
        ) = tokio::try_join!(
            slice(api, Endpoint::LESS_PRICE),
            slice(api, Endpoint::BOTTOM_BANNERS),
            slice(api, Endpoint::WOMEN_AGE),
            slice(api, Endpoint::WOMEN_CARE),
            slice(api, Endpoint::MEN_AGE),
            slice(api, Endpoint::MEN_CARE),
            slice(api, Endpoint::LIFESTYLE),
            slice(api, Endpoint::SPECIAL_CARE),
            slice(api, Endpoint::SINGLE_TEST),
        )?;

        tracing::debug!(
            categories = categories.len(),
            ads = ads.len(),
            "Home page responses received"
        );

        Ok(HomeData {
            categories,
            ads,
            women_age,
            women_care,
            men_age,
            men_care,
            lifestyle,
            special_care,
            single_test,
        })
    }

    fn from_fixtures(&self, fixtures: &FixtureRepository) -> HomeData {
        HomeData {
            categories: fixtures.categories(&Endpoint::LESS_PRICE),
            ads: fixtures.banners(&Endpoint::BOTTOM_BANNERS),
            women_age: fixtures.categories(&Endpoint::WOMEN_AGE),
            women_care: fixtures.categories(&Endpoint::WOMEN_CARE),
            men_age: fixtures.categories(&Endpoint::MEN_AGE),
            men_care: fixtures.categories(&Endpoint::MEN_CARE),
            lifestyle: fixtures.categories(&Endpoint::LIFESTYLE),
            special_care: fixtures.tests(&Endpoint::SPECIAL_CARE),
            single_test: fixtures.tests(&Endpoint::SINGLE_TEST),
        }
    }
}

impl ResolveImages for HomeData {
    fn resolve_images(self, resolver: &ImageResolver) -> Self {
        Self {
            categories: self.categories.resolve_images(resolver),
            ads: self.ads.resolve_images(resolver),
            women_age: self.women_age.resolve_images(resolver),
            women_care: self.women_care.resolve_images(resolver),
            men_age: self.men_age.resolve_images(resolver),
            men_care: self.men_care.resolve_images(resolver),
            lifestyle: self.lifestyle.resolve_images(resolver),
            special_care: self.special_care.resolve_images(resolver),
            single_test: self.single_test.resolve_images(resolver),
        }
    }
}

/// A static promotional package shown on the landing page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpecialOffer {
    pub id: u32,
    pub title: String,
    pub original_price: Price,
    pub discounted_price: Price,
    /// Whole-percent discount as advertised
    pub discount: u8,
    pub badge: String,
    pub features: Vec<String>,
    pub description: String,
    pub popular: bool,
}

fn offer(
    id: u32,
    title: &str,
    (original, discounted, discount): (i64, i64, u8),
    badge: &str,
    features: &[&str],
    description: &str,
) -> SpecialOffer {
    SpecialOffer {
        id,
        title: title.to_string(),
        original_price: Price::from_rupees(original),
        discounted_price: Price::from_rupees(discounted),
        discount,
        badge: badge.to_string(),
        features: features.iter().map(|f| (*f).to_string()).collect(),
        description: description.to_string(),
        popular: id == 1,
    }
}

/// Special offers advertised on the landing page.
///
/// This is static marketing content, not API data.
#[must_use]
pub fn special_offers() -> Vec<SpecialOffer> {
    vec![
        offer(
            1,
            "Premium Health Package",
            (2999, 1999, 33),
            "PREMIUM",
            &["Complete Blood Count", "Lipid Profile", "Liver Function", "Kidney Function"],
            "Comprehensive health screening for overall wellness",
        ),
        offer(
            2,
            "Women's Wellness Special",
            (3499, 2299, 34),
            "TRENDING",
            &["Hormonal Analysis", "Thyroid Profile", "Vitamin D", "Iron Studies"],
            "Specialized health checkup designed for women's needs",
        ),
        offer(
            3,
            "Cardiac Care Package",
            (2799, 1899, 32),
            "NEW",
            &["ECG", "2D Echo", "Lipid Profile", "Cardiac Risk Markers"],
            "Complete cardiovascular health assessment",
        ),
        offer(
            4,
            "Diabetes Complete",
            (1899, 1299, 32),
            "RECOMMENDED",
            &["HbA1c", "Fasting Glucose", "Post Meal Glucose", "Insulin"],
            "Comprehensive diabetes monitoring package",
        ),
        offer(
            5,
            "Senior Citizen Special",
            (4999, 3499, 30),
            "POPULAR",
            &["Full Body Checkup", "Bone Health", "Cognitive Assessment", "Eye Screening"],
            "Complete health package for seniors above 60",
        ),
        offer(
            6,
            "Executive Health Checkup",
            (5999, 3999, 33),
            "EXCLUSIVE",
            &["Advanced Imaging", "Stress Test", "Nutritional Analysis", "Health Consultation"],
            "Premium executive health screening with consultation",
        ),
    ]
}

// =============================================================================
// Package
// =============================================================================

/// Listing of exclusive health packages.
#[derive(Debug, Clone, Copy, Default)]
pub struct PackagePage;

/// View-state of the package listing.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct PackageData {
    pub tests: Vec<TestItem>,
    pub banner: Option<Banner>,
}

impl PageRequest for PackagePage {
    type Data = PackageData;

    fn name(&self) -> &'static str {
        "package"
    }

    async fn fetch_live(&self, api: &ApiClient) -> Result<PackageData, ApiError> {
        let (tests, banner) = tokio::try_join!(
            slice(api, Endpoint::EXCLUSIVE_TESTS),
            optional(api, Endpoint::RANDOM_BANNER),
        )?;

        Ok(PackageData { tests, banner })
    }

    fn from_fixtures(&self, fixtures: &FixtureRepository) -> PackageData {
        PackageData {
            tests: fixtures.tests(&Endpoint::EXCLUSIVE_TESTS),
            banner: fixtures.banner(&Endpoint::RANDOM_BANNER),
        }
    }
}

impl ResolveImages for PackageData {
    fn resolve_images(self, resolver: &ImageResolver) -> Self {
        Self {
            tests: self.tests.resolve_images(resolver),
            banner: self.banner.resolve_images(resolver),
        }
    }
}

// =============================================================================
// Product
// =============================================================================

/// Detail page of a single test.
#[derive(Debug, Clone, Default)]
pub struct ProductPage {
    /// Test to show. Without one, nothing is loaded.
    pub id: Option<TestId>,
}

impl ProductPage {
    #[must_use]
    pub const fn new(id: TestId) -> Self {
        Self { id: Some(id) }
    }
}

/// View-state of a product page.
///
/// `product` is `None` when the id is missing or the test was not found.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ProductData {
    pub product: Option<TestItem>,
    pub banner: Option<Banner>,
}

impl PageRequest for ProductPage {
    type Data = ProductData;

    fn name(&self) -> &'static str {
        "product"
    }

    async fn fetch_live(&self, api: &ApiClient) -> Result<ProductData, ApiError> {
        let Some(id) = &self.id else {
            return Ok(ProductData::default());
        };

        let (product, banner) = tokio::try_join!(
            optional(api, Endpoint::test_by_id(id.clone())),
            optional(api, Endpoint::RANDOM_BANNER),
        )?;

        Ok(ProductData { product, banner })
    }

    fn from_fixtures(&self, fixtures: &FixtureRepository) -> ProductData {
        let Some(id) = &self.id else {
            return ProductData::default();
        };

        ProductData {
            product: fixtures.test_by_id(id),
            banner: fixtures.banner(&Endpoint::RANDOM_BANNER),
        }
    }
}

impl ResolveImages for ProductData {
    fn resolve_images(self, resolver: &ImageResolver) -> Self {
        Self {
            product: self.product.resolve_images(resolver),
            banner: self.banner.resolve_images(resolver),
        }
    }
}
