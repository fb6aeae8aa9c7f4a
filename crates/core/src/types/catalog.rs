//! Catalog entities returned by the booking API.
//!
//! Field names follow the API's camelCase JSON. Image references
//! (`image_path`, `image_url`) are always relative paths; callers must
//! resolve them against an asset root before rendering.

use serde::{Deserialize, Serialize};

use super::id::{BannerId, CategoryId, TestId};
use super::price::Price;

/// A browsable test category (e.g. "Full Body Checkup").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<CategoryId>,
    pub name: String,
    /// Relative image path, e.g. `images/categories/heart.png`.
    pub image_path: String,
}

/// A bookable lab test or health package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestItem {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<TestId>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Price>,
    /// List price before discount, shown struck through.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_price: Option<Price>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub included_tests: Vec<IncludedTests>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_type: Option<String>,
    #[serde(default)]
    pub fasting_required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_time: Option<String>,
}

impl TestItem {
    /// Sample type shown on the product page ("Blood" when unspecified).
    #[must_use]
    pub fn sample_type_or_default(&self) -> &str {
        self.sample_type.as_deref().unwrap_or("Blood")
    }

    /// Report turnaround shown on the product page ("24 hours" when unspecified).
    #[must_use]
    pub fn report_time_or_default(&self) -> &str {
        self.report_time.as_deref().unwrap_or("24 hours")
    }
}

/// A group of individual tests bundled in a package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncludedTests {
    pub category: String,
    #[serde(default)]
    pub tests: Vec<String>,
}

/// A promotional banner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Banner {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<BannerId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Relative image path.
    pub image_url: String,
}

/// Category groupings exposed by `/api/v1/category/{type}/...`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CategoryKind {
    #[serde(rename = "lessPrice")]
    LessPrice,
    #[serde(rename = "organ")]
    Organ,
    #[serde(rename = "womenage")]
    WomenAge,
    #[serde(rename = "women")]
    Women,
    #[serde(rename = "menage")]
    MenAge,
    #[serde(rename = "men")]
    Men,
    #[serde(rename = "lifestyle")]
    Lifestyle,
}

impl CategoryKind {
    /// Path segment used by the API for this grouping.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::LessPrice => "lessPrice",
            Self::Organ => "organ",
            Self::WomenAge => "womenage",
            Self::Women => "women",
            Self::MenAge => "menage",
            Self::Men => "men",
            Self::Lifestyle => "lifestyle",
        }
    }
}

impl core::fmt::Display for CategoryKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_item_from_api_json() {
        let json = r#"{
            "_id": "64f1",
            "name": "Thyroid Profile",
            "imagePath": "uploads/thyroid.png",
            "price": 499,
            "originalPrice": 899,
            "category": "Exclusive",
            "includedTests": [{"category": "Thyroid", "tests": ["T3", "T4", "TSH"]}],
            "fastingRequired": true
        }"#;

        let item: TestItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.id, Some(TestId::new("64f1")));
        assert_eq!(item.price, Some(Price::from_rupees(499)));
        assert_eq!(item.included_tests.len(), 1);
        assert!(item.fasting_required);
        assert_eq!(item.sample_type_or_default(), "Blood");
        assert_eq!(item.report_time_or_default(), "24 hours");
    }

    #[test]
    fn test_item_minimal_json() {
        let item: TestItem = serde_json::from_str(r#"{"name": "CBC"}"#).unwrap();
        assert!(item.id.is_none());
        assert!(item.included_tests.is_empty());
        assert!(!item.fasting_required);
    }

    #[test]
    fn test_category_requires_image_path() {
        let result: Result<Category, _> = serde_json::from_str(r#"{"name": "Heart"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_category_kind_path_segment() {
        assert_eq!(CategoryKind::LessPrice.as_str(), "lessPrice");
        assert_eq!(CategoryKind::WomenAge.to_string(), "womenage");
    }
}
