//! Type-safe price representation using decimal arithmetic.
//!
//! The booking API quotes every price in Indian rupees as a bare JSON number
//! (`"price": 999`), so the currency is implied rather than carried.

use core::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A price in Indian rupees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// Currency symbol used when displaying prices.
    pub const SYMBOL: &'static str = "₹";

    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Create a price from a whole number of rupees.
    #[must_use]
    pub fn from_rupees(rupees: i64) -> Self {
        Self(Decimal::from(rupees))
    }

    /// The amount in rupees.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", Self::SYMBOL, self.0.normalize())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_display_whole_rupees() {
        assert_eq!(Price::from_rupees(999).to_string(), "₹999");
    }

    #[test]
    fn test_display_drops_trailing_zeros() {
        let price = Price::new(Decimal::new(149_950, 2));
        assert_eq!(price.to_string(), "₹1499.5");
    }

    #[test]
    fn test_deserialize_from_json_number() {
        let price: Price = serde_json::from_str("1299").unwrap();
        assert_eq!(price, Price::from_rupees(1299));

        let price: Price = serde_json::from_str("49.5").unwrap();
        assert_eq!(price.amount(), Decimal::new(495, 1));
    }
}
