//! The RFC 3829 authorization identity controls.
//!
//! Attached to a bind request, the request control asks the server to
//! report the authorization identity the bind resulted in. The response
//! control carries that identity as an authzId string: `dn:<DN>`,
//! `u:<username>`, or the empty string for an anonymous association.
//!
//! [RFC 3829]: https://tools.ietf.org/html/rfc3829

use core::fmt;
use bytes::Bytes;
use crate::error::DecodeError;
use super::{Control, ControlDecoder};

/// The OID of the authorization identity request control.
pub const OID_AUTHORIZATION_IDENTITY_REQUEST: &str =
    "2.16.840.1.113730.3.4.16";

/// The OID of the authorization identity response control.
pub const OID_AUTHORIZATION_IDENTITY_RESPONSE: &str =
    "2.16.840.1.113730.3.4.15";

//------------ AuthorizationIdentityRequest ----------------------------------

/// The authorization identity request control. Carries no value.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct AuthorizationIdentityRequest {
    critical: bool,
}

impl AuthorizationIdentityRequest {
    /// Creates a new request control.
    #[must_use]
    pub fn new(critical: bool) -> Self {
        AuthorizationIdentityRequest { critical }
    }
}

impl Control for AuthorizationIdentityRequest {
    fn oid(&self) -> &str {
        OID_AUTHORIZATION_IDENTITY_REQUEST
    }

    fn is_critical(&self) -> bool {
        self.critical
    }

    fn value(&self) -> Option<Bytes> {
        None
    }
}

impl fmt::Display for AuthorizationIdentityRequest {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f, "AuthorizationIdentityRequestControl(oid={}, criticality={})",
            OID_AUTHORIZATION_IDENTITY_REQUEST, self.critical
        )
    }
}

//------------ AuthorizationIdentityResponse ---------------------------------

/// The authorization identity response control.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AuthorizationIdentityResponse {
    critical: bool,
    authorization_id: String,
}

impl AuthorizationIdentityResponse {
    /// Creates a response carrying the given authzId string.
    pub fn new(critical: bool, authorization_id: impl Into<String>) -> Self {
        AuthorizationIdentityResponse {
            critical,
            authorization_id: authorization_id.into(),
        }
    }

    /// Creates a response for the given authorization DN.
    pub fn for_dn(critical: bool, dn: impl fmt::Display) -> Self {
        Self::new(critical, format!("dn:{}", dn))
    }

    /// Returns the authorization identity.
    #[must_use]
    pub fn authorization_id(&self) -> &str {
        &self.authorization_id
    }
}

impl Control for AuthorizationIdentityResponse {
    fn oid(&self) -> &str {
        OID_AUTHORIZATION_IDENTITY_RESPONSE
    }

    fn is_critical(&self) -> bool {
        self.critical
    }

    fn value(&self) -> Option<Bytes> {
        Some(Bytes::from(self.authorization_id.clone().into_bytes()))
    }
}

impl fmt::Display for AuthorizationIdentityResponse {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f, "AuthorizationIdentityResponseControl(oid={}, \
                criticality={}, authzID=\"{}\")",
            OID_AUTHORIZATION_IDENTITY_RESPONSE, self.critical,
            self.authorization_id
        )
    }
}

//------------ Decoders ------------------------------------------------------

/// Decoder for the authorization identity request control.
pub struct RequestDecoder;

impl ControlDecoder for RequestDecoder {
    fn oid(&self) -> &str {
        OID_AUTHORIZATION_IDENTITY_REQUEST
    }

    fn decode(
        &self, is_critical: bool, value: Option<Bytes>,
    ) -> Result<Box<dyn Control>, DecodeError> {
        if value.is_some() {
            return Err(DecodeError::UnexpectedValue {
                oid: OID_AUTHORIZATION_IDENTITY_REQUEST,
            });
        }
        Ok(Box::new(AuthorizationIdentityRequest::new(is_critical)))
    }
}

/// Decoder for the authorization identity response control.
pub struct ResponseDecoder;

impl ControlDecoder for ResponseDecoder {
    fn oid(&self) -> &str {
        OID_AUTHORIZATION_IDENTITY_RESPONSE
    }

    fn decode(
        &self, is_critical: bool, value: Option<Bytes>,
    ) -> Result<Box<dyn Control>, DecodeError> {
        let value = value.ok_or(DecodeError::MissingValue {
            oid: OID_AUTHORIZATION_IDENTITY_RESPONSE,
        })?;
        let authorization_id = String::from_utf8(value.into())
            .map_err(|err| {
                DecodeError::invalid(
                    OID_AUTHORIZATION_IDENTITY_RESPONSE, err,
                )
            })?;
        Ok(Box::new(AuthorizationIdentityResponse {
            critical: is_critical,
            authorization_id,
        }))
    }
}

//============ Testing =======================================================

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn request_must_not_have_value() {
        let err = RequestDecoder
            .decode(false, Some(Bytes::from_static(b"oops")))
            .unwrap_err();
        assert_eq!(
            err,
            DecodeError::UnexpectedValue {
                oid: OID_AUTHORIZATION_IDENTITY_REQUEST,
            }
        );
        // The diagnostic names the offending OID.
        assert!(err.to_string().contains("2.16.840.1.113730.3.4.16"));
    }

    #[test]
    fn request_round_trip() {
        let request = AuthorizationIdentityRequest::new(true);
        assert!(!request.has_value());
        let decoded = RequestDecoder
            .decode(request.is_critical(), request.value())
            .unwrap();
        assert!(decoded.is_critical());
        assert_eq!(decoded.oid(), OID_AUTHORIZATION_IDENTITY_REQUEST);
    }

    #[test]
    fn response_round_trip() {
        let response = AuthorizationIdentityResponse::new(
            false, "u:kvaughan",
        );
        let decoded = ResponseDecoder
            .decode(response.is_critical(), response.value())
            .unwrap();
        assert_eq!(decoded.value(), response.value());
        assert_eq!(
            decoded.to_string(),
            "AuthorizationIdentityResponseControl(\
             oid=2.16.840.1.113730.3.4.15, criticality=false, \
             authzID=\"u:kvaughan\")"
        );
    }

    #[test]
    fn response_value_is_mandatory() {
        assert_eq!(
            ResponseDecoder.decode(false, None).unwrap_err(),
            DecodeError::MissingValue {
                oid: OID_AUTHORIZATION_IDENTITY_RESPONSE,
            }
        );
    }

    #[test]
    fn anonymous_response_is_empty_but_present() {
        let response = AuthorizationIdentityResponse::new(false, "");
        assert!(response.has_value());
        assert_eq!(response.value().unwrap().len(), 0);
    }

    #[test]
    fn dn_response() {
        let response = AuthorizationIdentityResponse::for_dn(
            false, "uid=kvaughan,dc=example,dc=com",
        );
        assert_eq!(
            response.authorization_id(),
            "dn:uid=kvaughan,dc=example,dc=com"
        );
    }
}
