//! Typed fixture repository.
//!
//! Static substitute payloads for every endpoint the page loaders call, keyed
//! by [`Endpoint`]. The loader reads from here in mock mode and whenever the
//! live path fails, so fixtures and live replies share one shape per endpoint.
//!
//! The built-in set mirrors the development data the storefront has always
//! shipped with. Tests and callers can inject their own entries with
//! [`FixtureRepository::insert`].

use std::collections::HashMap;

use futurelabs_core::{Banner, BannerId, Category, IncludedTests, Price, TestId, TestItem};

use crate::api::Endpoint;

/// Payload stored for one endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FixturePayload {
    Categories(Vec<Category>),
    Tests(Vec<TestItem>),
    Test(Box<TestItem>),
    Banners(Vec<Banner>),
    Banner(Banner),
}

/// Fixture data keyed by logical endpoint.
#[derive(Debug, Clone, Default)]
pub struct FixtureRepository {
    entries: HashMap<Endpoint, FixturePayload>,
}

impl FixtureRepository {
    /// An empty repository. Every lookup yields the empty/default value.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// The built-in development fixtures.
    #[must_use]
    pub fn builtin() -> Self {
        let women_care = women_care();
        let men_care = men_care();

        let mut repo = Self::empty();
        repo.insert(Endpoint::LESS_PRICE, FixturePayload::Categories(categories()));
        repo.insert(Endpoint::VITAL_ORGANS, FixturePayload::Categories(vital_organs()));
        // Age-based groupings reuse the care fixtures
        repo.insert(Endpoint::WOMEN_AGE, FixturePayload::Categories(women_care.clone()));
        repo.insert(Endpoint::WOMEN_CARE, FixturePayload::Categories(women_care));
        repo.insert(Endpoint::MEN_AGE, FixturePayload::Categories(men_care.clone()));
        repo.insert(Endpoint::MEN_CARE, FixturePayload::Categories(men_care));
        repo.insert(Endpoint::LIFESTYLE, FixturePayload::Categories(lifestyle()));
        repo.insert(Endpoint::SPECIAL_CARE, FixturePayload::Tests(special_care()));
        repo.insert(Endpoint::SINGLE_TEST, FixturePayload::Tests(single_tests()));
        repo.insert(Endpoint::EXCLUSIVE_TESTS, FixturePayload::Tests(exclusive_tests()));
        repo.insert(Endpoint::BOTTOM_BANNERS, FixturePayload::Banners(ads()));
        repo.insert(Endpoint::MAIN_BANNERS, FixturePayload::Banners(main_banners()));
        repo.insert(Endpoint::RANDOM_BANNER, FixturePayload::Banner(random_banner()));
        repo
    }

    /// Register (or replace) the payload for an endpoint.
    pub fn insert(&mut self, endpoint: Endpoint, payload: FixturePayload) -> &mut Self {
        self.entries.insert(endpoint, payload);
        self
    }

    /// Category list for an endpoint, empty when none is registered.
    #[must_use]
    pub fn categories(&self, endpoint: &Endpoint) -> Vec<Category> {
        match self.entries.get(endpoint) {
            Some(FixturePayload::Categories(items)) => items.clone(),
            _ => Vec::new(),
        }
    }

    /// Test list for an endpoint, empty when none is registered.
    #[must_use]
    pub fn tests(&self, endpoint: &Endpoint) -> Vec<TestItem> {
        match self.entries.get(endpoint) {
            Some(FixturePayload::Tests(items)) => items.clone(),
            _ => Vec::new(),
        }
    }

    /// Banner list for an endpoint, empty when none is registered.
    #[must_use]
    pub fn banners(&self, endpoint: &Endpoint) -> Vec<Banner> {
        match self.entries.get(endpoint) {
            Some(FixturePayload::Banners(items)) => items.clone(),
            _ => Vec::new(),
        }
    }

    /// Single banner for an endpoint.
    ///
    /// Falls back to the first entry of a banner list registered for the same
    /// endpoint.
    #[must_use]
    pub fn banner(&self, endpoint: &Endpoint) -> Option<Banner> {
        match self.entries.get(endpoint) {
            Some(FixturePayload::Banner(banner)) => Some(banner.clone()),
            Some(FixturePayload::Banners(items)) => items.first().cloned(),
            _ => None,
        }
    }

    /// A single test by id.
    ///
    /// Looks for an explicit `TestById` entry first, then searches every
    /// registered test list.
    #[must_use]
    pub fn test_by_id(&self, id: &TestId) -> Option<TestItem> {
        if let Some(FixturePayload::Test(item)) = self.entries.get(&Endpoint::test_by_id(id.clone()))
        {
            return Some((**item).clone());
        }

        self.entries.values().find_map(|payload| match payload {
            FixturePayload::Tests(items) => items
                .iter()
                .find(|item| item.id.as_ref() == Some(id))
                .cloned(),
            FixturePayload::Test(item) if item.id.as_ref() == Some(id) => Some((**item).clone()),
            _ => None,
        })
    }
}

// =============================================================================
// Built-in data
// =============================================================================

fn category(name: &str, image_path: &str) -> Category {
    Category {
        id: None,
        name: name.to_string(),
        image_path: image_path.to_string(),
    }
}

fn test_item(id: &str, name: &str, price: i64, original_price: Option<i64>) -> TestItem {
    TestItem {
        id: Some(TestId::new(id)),
        name: name.to_string(),
        image_path: None,
        price: Some(Price::from_rupees(price)),
        original_price: original_price.map(Price::from_rupees),
        category: None,
        description: None,
        included_tests: Vec::new(),
        sample_type: None,
        fasting_required: false,
        report_time: None,
    }
}

fn banner(id: &str, title: &str, image_url: &str) -> Banner {
    Banner {
        id: Some(BannerId::new(id)),
        title: Some(title.to_string()),
        image_url: image_url.to_string(),
    }
}

fn categories() -> Vec<Category> {
    vec![
        category("Full Body Checkup", "/images/categories/full-body.png"),
        category("Diabetes", "/images/categories/diabetes.png"),
        category("Heart", "/images/categories/heart.png"),
        category("Thyroid", "/images/categories/thyroid.png"),
    ]
}

fn vital_organs() -> Vec<Category> {
    vec![
        category("Liver", "/images/organs/liver.png"),
        category("Kidney", "/images/organs/kidney.png"),
        category("Lungs", "/images/organs/lungs.png"),
        category("Bones", "/images/organs/bones.png"),
    ]
}

fn women_care() -> Vec<Category> {
    vec![
        category("Women Under 30", "/images/women/under-30.png"),
        category("Women 30-45", "/images/women/30-45.png"),
        category("Women Above 45", "/images/women/above-45.png"),
        category("PCOD Screening", "/images/women/pcod.png"),
    ]
}

fn men_care() -> Vec<Category> {
    vec![
        category("Men Under 30", "/images/men/under-30.png"),
        category("Men 30-45", "/images/men/30-45.png"),
        category("Men Above 45", "/images/men/above-45.png"),
        category("Fitness Profile", "/images/men/fitness.png"),
    ]
}

fn lifestyle() -> Vec<Category> {
    vec![
        category("Fever", "/images/lifestyle/fever.png"),
        category("Vitamins", "/images/lifestyle/vitamins.png"),
        category("Allergy", "/images/lifestyle/allergy.png"),
        category("Hair Fall", "/images/lifestyle/hair-fall.png"),
    ]
}

fn special_care() -> Vec<TestItem> {
    vec![
        TestItem {
            category: Some("Special Care Packages".to_string()),
            image_path: Some("/images/packages/senior-citizen.png".to_string()),
            ..test_item("sc-001", "Senior Citizen Health Package", 3499, Some(4999))
        },
        TestItem {
            category: Some("Special Care Packages".to_string()),
            image_path: Some("/images/packages/cardiac-care.png".to_string()),
            ..test_item("sc-002", "Cardiac Care Package", 1899, Some(2799))
        },
    ]
}

fn single_tests() -> Vec<TestItem> {
    vec![
        TestItem {
            category: Some("Single Test".to_string()),
            ..test_item("st-001", "Complete Blood Count (CBC)", 299, Some(450))
        },
        TestItem {
            category: Some("Single Test".to_string()),
            fasting_required: true,
            ..test_item("st-002", "HbA1c", 399, Some(600))
        },
        TestItem {
            category: Some("Single Test".to_string()),
            ..test_item("st-003", "Vitamin D (25-OH)", 799, Some(1200))
        },
    ]
}

fn exclusive_tests() -> Vec<TestItem> {
    vec![
        TestItem {
            category: Some("Exclusive".to_string()),
            description: Some("Comprehensive health screening for overall wellness".to_string()),
            included_tests: vec![
                IncludedTests {
                    category: "Liver Function".to_string(),
                    tests: vec!["SGOT".to_string(), "SGPT".to_string(), "Bilirubin".to_string()],
                },
                IncludedTests {
                    category: "Lipid Profile".to_string(),
                    tests: vec!["Total Cholesterol".to_string(), "HDL".to_string(), "LDL".to_string()],
                },
            ],
            fasting_required: true,
            report_time: Some("24 hours".to_string()),
            ..test_item("ex-001", "Premium Health Package", 1999, Some(2999))
        },
        TestItem {
            category: Some("Exclusive".to_string()),
            description: Some("Specialized health checkup designed for women's needs".to_string()),
            included_tests: vec![IncludedTests {
                category: "Hormones".to_string(),
                tests: vec!["TSH".to_string(), "Prolactin".to_string(), "FSH".to_string()],
            }],
            ..test_item("ex-002", "Women's Wellness Special", 2299, Some(3499))
        },
    ]
}

fn ads() -> Vec<Banner> {
    vec![
        banner("ad-001", "Flat 30% off on full body checkups", "/images/ads/full-body-offer.png"),
        banner("ad-002", "Free home sample collection", "/images/ads/home-collection.png"),
    ]
}

fn main_banners() -> Vec<Banner> {
    vec![
        banner("mb-001", "Book lab tests from home", "/images/banners/banner1.png"),
        banner("mb-002", "Reports in 24 hours", "/images/banners/banner2.png"),
    ]
}

fn random_banner() -> Banner {
    banner("bb-001", "Save on every package", "/images/banners/bottom-banner.png")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_covers_home_endpoints() {
        let repo = FixtureRepository::builtin();
        for endpoint in [
            Endpoint::LESS_PRICE,
            Endpoint::WOMEN_AGE,
            Endpoint::WOMEN_CARE,
            Endpoint::MEN_AGE,
            Endpoint::MEN_CARE,
            Endpoint::LIFESTYLE,
        ] {
            assert!(!repo.categories(&endpoint).is_empty(), "{endpoint}");
        }
        assert!(!repo.tests(&Endpoint::SPECIAL_CARE).is_empty());
        assert!(!repo.tests(&Endpoint::SINGLE_TEST).is_empty());
        assert!(!repo.banners(&Endpoint::BOTTOM_BANNERS).is_empty());
        assert!(repo.banner(&Endpoint::RANDOM_BANNER).is_some());
    }

    #[test]
    fn test_age_groupings_reuse_care_fixtures() {
        let repo = FixtureRepository::builtin();
        assert_eq!(
            repo.categories(&Endpoint::WOMEN_AGE),
            repo.categories(&Endpoint::WOMEN_CARE)
        );
        assert_eq!(
            repo.categories(&Endpoint::MEN_AGE),
            repo.categories(&Endpoint::MEN_CARE)
        );
    }

    #[test]
    fn test_wrong_shape_yields_empty() {
        let repo = FixtureRepository::builtin();
        // LESS_PRICE holds categories, not tests
        assert!(repo.tests(&Endpoint::LESS_PRICE).is_empty());
    }

    #[test]
    fn test_by_id_searches_lists() {
        let repo = FixtureRepository::builtin();
        let item = repo.test_by_id(&TestId::new("ex-001")).unwrap();
        assert_eq!(item.name, "Premium Health Package");
        assert!(repo.test_by_id(&TestId::new("missing")).is_none());
    }

    #[test]
    fn test_explicit_test_entry_wins() {
        let mut repo = FixtureRepository::builtin();
        let id = TestId::new("ex-001");
        let custom = test_item("ex-001", "Override", 1, None);
        repo.insert(
            Endpoint::test_by_id(id.clone()),
            FixturePayload::Test(Box::new(custom)),
        );
        assert_eq!(repo.test_by_id(&id).unwrap().name, "Override");
    }
}
