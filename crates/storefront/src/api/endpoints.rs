//! Logical endpoint names and their path templates.
//!
//! Every request the storefront makes is named here. Fixed routes are exposed
//! as associated constants; parameterized routes carry their category, name or
//! id and percent-encode it when the path is rendered.

use std::borrow::Cow;
use std::fmt;

use futurelabs_core::{CategoryKind, TestId, UserId};
use reqwest::Method;

/// A booking API endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Endpoint {
    SendOtp,
    VerifyOtp,
    /// `GET /api/v1/tests/category/{category}`
    TestsByCategory(Cow<'static, str>),
    /// `GET /api/v1/tests/{id}`
    TestById(TestId),
    /// `GET /api/v1/tests/selected/{name}`
    SelectedTests(Cow<'static, str>),
    /// `GET /api/v1/tests/search?q={query}`
    SearchTests(String),
    /// `GET /api/v1/category/{type}/selected`
    SelectedCategories(CategoryKind),
    /// `GET /api/v1/category/{type}/get`
    Categories(CategoryKind),
    MainBanners,
    BottomBanners,
    RandomBanner,
    /// `GET /api/v1/cart/{userId}`
    Cart(UserId),
    CartAdd,
    CartRemove,
}

impl Endpoint {
    pub const LESS_PRICE: Self = Self::SelectedCategories(CategoryKind::LessPrice);
    pub const VITAL_ORGANS: Self = Self::SelectedCategories(CategoryKind::Organ);
    pub const WOMEN_AGE: Self = Self::SelectedCategories(CategoryKind::WomenAge);
    pub const WOMEN_CARE: Self = Self::SelectedCategories(CategoryKind::Women);
    pub const MEN_AGE: Self = Self::SelectedCategories(CategoryKind::MenAge);
    pub const MEN_CARE: Self = Self::SelectedCategories(CategoryKind::Men);
    pub const LIFESTYLE: Self = Self::SelectedCategories(CategoryKind::Lifestyle);

    pub const SPECIAL_CARE: Self = Self::SelectedTests(Cow::Borrowed("Special Care Packages"));
    pub const SINGLE_TEST: Self = Self::SelectedTests(Cow::Borrowed("Single Test"));
    pub const EXCLUSIVE_TESTS: Self = Self::TestsByCategory(Cow::Borrowed("Exclusive"));

    pub const MAIN_BANNERS: Self = Self::MainBanners;
    pub const BOTTOM_BANNERS: Self = Self::BottomBanners;
    pub const RANDOM_BANNER: Self = Self::RandomBanner;

    /// Tests in an arbitrary category.
    #[must_use]
    pub fn tests_by_category(category: impl Into<String>) -> Self {
        Self::TestsByCategory(Cow::Owned(category.into()))
    }

    /// A single test by id.
    #[must_use]
    pub fn test_by_id(id: TestId) -> Self {
        Self::TestById(id)
    }

    /// Concrete request path, relative to the API base address.
    #[must_use]
    pub fn path(&self) -> String {
        match self {
            Self::SendOtp => "/api/v1/auth/send-otp".to_string(),
            Self::VerifyOtp => "/api/v1/auth/verify-otp".to_string(),
            Self::TestsByCategory(category) => {
                format!("/api/v1/tests/category/{}", urlencoding::encode(category))
            }
            Self::TestById(id) => format!("/api/v1/tests/{}", urlencoding::encode(id.as_str())),
            Self::SelectedTests(name) => {
                format!("/api/v1/tests/selected/{}", urlencoding::encode(name))
            }
            Self::SearchTests(query) => {
                format!("/api/v1/tests/search?q={}", urlencoding::encode(query))
            }
            Self::SelectedCategories(kind) => format!("/api/v1/category/{kind}/selected"),
            Self::Categories(kind) => format!("/api/v1/category/{kind}/get"),
            Self::MainBanners => "/api/v1/mainbanners/get".to_string(),
            Self::BottomBanners => "/api/v1/bottombanners/get".to_string(),
            Self::RandomBanner => "/api/v1/bottombanners/get-random".to_string(),
            Self::Cart(user_id) => {
                format!("/api/v1/cart/{}", urlencoding::encode(user_id.as_str()))
            }
            Self::CartAdd => "/api/v1/cart/add".to_string(),
            Self::CartRemove => "/api/v1/cart/remove".to_string(),
        }
    }

    /// HTTP method the endpoint expects.
    #[must_use]
    pub fn method(&self) -> Method {
        match self {
            Self::SendOtp | Self::VerifyOtp | Self::CartAdd => Method::POST,
            Self::CartRemove => Method::DELETE,
            _ => Method::GET,
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method(), self.path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_category_paths() {
        assert_eq!(
            Endpoint::LESS_PRICE.path(),
            "/api/v1/category/lessPrice/selected"
        );
        assert_eq!(
            Endpoint::VITAL_ORGANS.path(),
            "/api/v1/category/organ/selected"
        );
        assert_eq!(
            Endpoint::MEN_AGE.path(),
            "/api/v1/category/menage/selected"
        );
    }

    #[test]
    fn test_selected_tests_are_encoded() {
        assert_eq!(
            Endpoint::SPECIAL_CARE.path(),
            "/api/v1/tests/selected/Special%20Care%20Packages"
        );
    }

    #[test]
    fn test_parameterized_paths() {
        assert_eq!(
            Endpoint::tests_by_category("Women Care").path(),
            "/api/v1/tests/category/Women%20Care"
        );
        assert_eq!(
            Endpoint::test_by_id(TestId::new("64f1")).path(),
            "/api/v1/tests/64f1"
        );
        assert_eq!(
            Endpoint::SearchTests("vitamin d".to_string()).path(),
            "/api/v1/tests/search?q=vitamin%20d"
        );
    }

    #[test]
    fn test_methods() {
        assert_eq!(Endpoint::SendOtp.method(), Method::POST);
        assert_eq!(Endpoint::CartRemove.method(), Method::DELETE);
        assert_eq!(Endpoint::RANDOM_BANNER.method(), Method::GET);
    }

    #[test]
    fn test_display() {
        assert_eq!(
            Endpoint::CartAdd.to_string(),
            "POST /api/v1/cart/add"
        );
    }
}
