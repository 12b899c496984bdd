//! The Netscape password expiration controls.
//!
//! Two response controls predating any RFC: password-expired tells the
//! client its password has already expired, password-expiring warns that it
//! will expire in a given number of seconds. Both carry their payload as a
//! decimal string rather than a BER integer, a quirk kept for
//! interoperability with the original implementations.

use core::fmt;
use bytes::Bytes;
use crate::error::DecodeError;
use super::{Control, ControlDecoder};

/// The OID of the password expired control.
pub const OID_PASSWORD_EXPIRED: &str = "2.16.840.1.113730.3.4.4";

/// The OID of the password expiring control.
pub const OID_PASSWORD_EXPIRING: &str = "2.16.840.1.113730.3.4.5";

//------------ PasswordExpired -----------------------------------------------

/// The password expired control.
///
/// The value is always the string `"0"`.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct PasswordExpired {
    critical: bool,
}

impl PasswordExpired {
    /// Creates a new password expired control.
    #[must_use]
    pub fn new(critical: bool) -> Self {
        PasswordExpired { critical }
    }
}

impl Control for PasswordExpired {
    fn oid(&self) -> &str {
        OID_PASSWORD_EXPIRED
    }

    fn is_critical(&self) -> bool {
        self.critical
    }

    fn value(&self) -> Option<Bytes> {
        Some(Bytes::from_static(b"0"))
    }
}

impl fmt::Display for PasswordExpired {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f, "PasswordExpiredControl(oid={}, criticality={})",
            OID_PASSWORD_EXPIRED, self.critical
        )
    }
}

//------------ PasswordExpiring ----------------------------------------------

/// The password expiring control.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PasswordExpiring {
    critical: bool,
    seconds_until_expiration: u32,
}

impl PasswordExpiring {
    /// Creates a control announcing expiration in the given time.
    #[must_use]
    pub fn new(critical: bool, seconds_until_expiration: u32) -> Self {
        PasswordExpiring { critical, seconds_until_expiration }
    }

    /// Returns the number of seconds until the password expires.
    #[must_use]
    pub fn seconds_until_expiration(&self) -> u32 {
        self.seconds_until_expiration
    }
}

impl Control for PasswordExpiring {
    fn oid(&self) -> &str {
        OID_PASSWORD_EXPIRING
    }

    fn is_critical(&self) -> bool {
        self.critical
    }

    fn value(&self) -> Option<Bytes> {
        Some(Bytes::from(
            self.seconds_until_expiration.to_string().into_bytes(),
        ))
    }
}

impl fmt::Display for PasswordExpiring {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f, "PasswordExpiringControl(oid={}, criticality={}, \
                secondsUntilExpiration={})",
            OID_PASSWORD_EXPIRING, self.critical,
            self.seconds_until_expiration
        )
    }
}

//------------ Decoders ------------------------------------------------------

/// Decoder for the password expired control.
pub struct ExpiredDecoder;

impl ControlDecoder for ExpiredDecoder {
    fn oid(&self) -> &str {
        OID_PASSWORD_EXPIRED
    }

    fn decode(
        &self, is_critical: bool, value: Option<Bytes>,
    ) -> Result<Box<dyn Control>, DecodeError> {
        // Legacy clients omit the value; when present it must at least be
        // an integer string.
        if let Some(value) = value {
            std::str::from_utf8(&value)
                .ok()
                .and_then(|s| s.parse::<i64>().ok())
                .ok_or_else(|| {
                    DecodeError::invalid(
                        OID_PASSWORD_EXPIRED,
                        "value is not an integer string",
                    )
                })?;
        }
        Ok(Box::new(PasswordExpired::new(is_critical)))
    }
}

/// Decoder for the password expiring control.
pub struct ExpiringDecoder;

impl ControlDecoder for ExpiringDecoder {
    fn oid(&self) -> &str {
        OID_PASSWORD_EXPIRING
    }

    fn decode(
        &self, is_critical: bool, value: Option<Bytes>,
    ) -> Result<Box<dyn Control>, DecodeError> {
        let value = value.ok_or(DecodeError::MissingValue {
            oid: OID_PASSWORD_EXPIRING,
        })?;
        let text = std::str::from_utf8(&value).map_err(|err| {
            DecodeError::invalid(OID_PASSWORD_EXPIRING, err)
        })?;
        let seconds = text.parse::<u32>().map_err(|err| {
            DecodeError::invalid(OID_PASSWORD_EXPIRING, err)
        })?;
        Ok(Box::new(PasswordExpiring::new(is_critical, seconds)))
    }
}

//============ Testing =======================================================
