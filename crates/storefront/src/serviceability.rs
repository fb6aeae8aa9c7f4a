//! Home sample collection coverage by pin code.

use std::fmt;
use std::time::Duration;

use futurelabs_core::{DigitsError, PinCode};
use tracing::{debug, instrument};

/// Simulated lookup latency.
pub const LOOKUP_DELAY: Duration = Duration::from_secs(1);

/// Pin codes with home sample collection.
const SERVICEABLE_PIN_CODES: &[&str] = &[
    "560001", "560002", "560003", "560004", "560005", "560010", "560020", "560030",
];

/// Shown when the input is not a pin code.
pub const INVALID_PIN_CODE: &str = "Please enter a valid 6-digit pin code";

/// Result of a coverage check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceAvailability {
    Available(PinCode),
    Unavailable(PinCode),
}

impl ServiceAvailability {
    #[must_use]
    pub const fn is_available(&self) -> bool {
        matches!(self, Self::Available(_))
    }

    #[must_use]
    pub const fn pin_code(&self) -> &PinCode {
        match self {
            Self::Available(pin) | Self::Unavailable(pin) => pin,
        }
    }

    /// Short headline for the result.
    #[must_use]
    pub const fn headline(&self) -> &'static str {
        match self {
            Self::Available(_) => "Great! Service Available",
            Self::Unavailable(_) => "Service Not Available",
        }
    }
}

impl fmt::Display for ServiceAvailability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Available(pin) => write!(
                f,
                "We provide home sample collection and lab services in your area (Pin: {pin})"
            ),
            Self::Unavailable(pin) => write!(
                f,
                "Sorry, we don't provide services in this area yet (Pin: {pin}). \
                 Please contact us for more information."
            ),
        }
    }
}

/// Check whether home sample collection covers `input`.
///
/// # Errors
///
/// Returns an error without waiting when `input` is not 6 digits.
#[instrument]
pub async fn check_pin_code(input: &str) -> Result<ServiceAvailability, DigitsError> {
    let pin = PinCode::parse(input)?;

    tokio::time::sleep(LOOKUP_DELAY).await;

    let available = SERVICEABLE_PIN_CODES.contains(&pin.as_str());
    debug!(available, "Pin code checked");

    Ok(if available {
        ServiceAvailability::Available(pin)
    } else {
        ServiceAvailability::Unavailable(pin)
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_serviceable_pin_code() {
        let result = check_pin_code("560010").await.unwrap();
        assert!(result.is_available());
        assert_eq!(result.pin_code().as_str(), "560010");
    }

    #[tokio::test(start_paused = true)]
    async fn test_unserviceable_pin_code() {
        let result = check_pin_code("110001").await.unwrap();
        assert!(!result.is_available());
        assert!(result.to_string().contains("(Pin: 110001)"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_pin_code_rejected_immediately() {
        let started = tokio::time::Instant::now();
        assert!(check_pin_code("5600").await.is_err());
        assert!(check_pin_code("56000a").await.is_err());
        assert_eq!(started.elapsed(), Duration::ZERO);
    }
}
