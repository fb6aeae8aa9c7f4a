//! Service availability lookup.

use futurelabs_core::PinCode;
use futurelabs_storefront::AppError;
use futurelabs_storefront::serviceability::{self, INVALID_PIN_CODE};

use super::{CommandError, say};

/// Check whether home sample collection covers `pin`.
pub async fn check(pin: &str) -> Result<(), CommandError> {
    if let Err(e) = PinCode::parse(pin) {
        say(INVALID_PIN_CODE)?;
        return Err(AppError::from(e).into());
    }

    say("Checking...")?;
    let availability = serviceability::check_pin_code(pin)
        .await
        .map_err(AppError::from)?;

    say(availability.headline())?;
    say(&availability.to_string())?;
    Ok(())
}
