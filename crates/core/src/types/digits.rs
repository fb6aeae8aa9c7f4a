//! Fixed-length digit codes: phone numbers, one-time passwords, pin codes.
//!
//! These are client-side format checks only. The booking API remains the
//! authority on whether a number can receive an OTP or whether an OTP matches.

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a fixed-length digit code.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DigitsError {
    /// The input string is empty.
    #[error("{label} cannot be empty")]
    Empty {
        /// Human-readable name of the code.
        label: &'static str,
    },
    /// The input has the wrong number of characters.
    #[error("{label} must be exactly {expected} digits (got {actual})")]
    WrongLength {
        /// Human-readable name of the code.
        label: &'static str,
        /// Required number of digits.
        expected: usize,
        /// Number of characters supplied.
        actual: usize,
    },
    /// The input contains something other than ASCII digits.
    #[error("{label} must contain only digits")]
    NonDigit {
        /// Human-readable name of the code.
        label: &'static str,
    },
}

/// Check that `s` is exactly `expected` ASCII digits.
fn validate(s: &str, expected: usize, label: &'static str) -> Result<(), DigitsError> {
    if s.is_empty() {
        return Err(DigitsError::Empty { label });
    }

    let actual = s.chars().count();
    if actual != expected {
        return Err(DigitsError::WrongLength {
            label,
            expected,
            actual,
        });
    }

    if !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(DigitsError::NonDigit { label });
    }

    Ok(())
}

/// Macro to define a validated fixed-length digit code.
///
/// Generates a `String` newtype with `parse()`, `as_str()`, `Display`,
/// `FromStr`, `AsRef<str>` and serde support that re-validates on
/// deserialization.
macro_rules! define_digit_code {
    ($(#[$meta:meta])* $name:ident, $len:expr, $label:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Number of digits in a valid code.
            pub const LENGTH: usize = $len;

            /// Parse a code from a string.
            ///
            /// # Errors
            ///
            /// Returns an error if the input is empty, has the wrong length,
            /// or contains non-digit characters.
            pub fn parse(s: &str) -> Result<Self, DigitsError> {
                validate(s, Self::LENGTH, $label)?;
                Ok(Self(s.to_owned()))
            }

            /// Returns the code as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = DigitsError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl TryFrom<String> for $name {
            type Error = DigitsError;

            fn try_from(s: String) -> Result<Self, Self::Error> {
                validate(&s, Self::LENGTH, $label)?;
                Ok(Self(s))
            }
        }

        impl From<$name> for String {
            fn from(code: $name) -> Self {
                code.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_digit_code!(
    /// A 10-digit mobile number, without country code.
    ///
    /// ## Examples
    ///
    /// ```
    /// use futurelabs_core::PhoneNumber;
    ///
    /// assert!(PhoneNumber::parse("9876543210").is_ok());
    /// assert!(PhoneNumber::parse("123").is_err());        // too short
    /// assert!(PhoneNumber::parse("98765-4321").is_err()); // non-digit
    /// ```
    PhoneNumber,
    10,
    "phone number"
);

define_digit_code!(
    /// A 6-digit one-time password delivered by SMS.
    OtpCode,
    6,
    "OTP"
);

define_digit_code!(
    /// A 6-digit Indian postal pin code.
    PinCode,
    6,
    "pin code"
);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_phone_number_valid() {
        let phone = PhoneNumber::parse("9876543210").unwrap();
        assert_eq!(phone.as_str(), "9876543210");
    }

    #[test]
    fn test_phone_number_too_short() {
        let err = PhoneNumber::parse("123").unwrap_err();
        assert_eq!(
            err,
            DigitsError::WrongLength {
                label: "phone number",
                expected: 10,
                actual: 3
            }
        );
    }

    #[test]
    fn test_phone_number_empty() {
        assert!(matches!(
            PhoneNumber::parse(""),
            Err(DigitsError::Empty { .. })
        ));
    }

    #[test]
    fn test_phone_number_rejects_letters() {
        assert!(matches!(
            PhoneNumber::parse("98765abcde"),
            Err(DigitsError::NonDigit { .. })
        ));
    }

    #[test]
    fn test_otp_length() {
        assert!(OtpCode::parse("123456").is_ok());
        assert!(OtpCode::parse("12345").is_err());
        assert!(OtpCode::parse("1234567").is_err());
    }

    #[test]
    fn test_multibyte_digits_counted_as_chars() {
        // Devanagari digits are not ASCII digits
        let err = PinCode::parse("५६०००१").unwrap_err();
        assert!(matches!(err, DigitsError::NonDigit { .. }));
    }

    #[test]
    fn test_deserialize_validates() {
        let ok: Result<PinCode, _> = serde_json::from_str("\"560001\"");
        assert!(ok.is_ok());

        let bad: Result<PinCode, _> = serde_json::from_str("\"56\"");
        assert!(bad.is_err());
    }

    #[test]
    fn test_error_display() {
        let err = OtpCode::parse("12").unwrap_err();
        assert_eq!(err.to_string(), "OTP must be exactly 6 digits (got 2)");
    }
}
