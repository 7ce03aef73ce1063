//! SIREN identifier validation
//!
//! A SIREN is the 9-digit national registry number identifying an
//! organization or local authority. Path parameters are validated here
//! before they reach any query.

use crate::{Error, Result};

/// Check that a string is a well-formed SIREN (exactly 9 ASCII digits).
pub fn validate_siren(siren: &str) -> Result<()> {
    if siren.len() == 9 && siren.bytes().all(|b| b.is_ascii_digit()) {
        Ok(())
    } else {
        Err(Error::InvalidInput(format!("Invalid SIREN: {}", siren)))
    }
}
