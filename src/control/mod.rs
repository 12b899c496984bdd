//! LDAP controls.
//!
//! A control is an OID-identified modifier attached to a request or
//! response. On the wire it is a sequence of the OID, an optional
//! criticality flag and an optional opaque value; what the value means is
//! up to the control type. This module defines the [`Control`] trait every
//! control type implements, the [`ControlDecoder`] capability the registry
//! dispatches on, the generic envelope codec, and an as-received
//! [`RawControl`] for OIDs nobody has registered a decoder for.
//!
//! The concrete control types are arranged in sub-modules according to the
//! document that defined them and re-exported here.

pub mod authz_id;
pub mod password;
pub mod post_read;

pub use self::authz_id::{
    AuthorizationIdentityRequest, AuthorizationIdentityResponse,
};
pub use self::password::{PasswordExpired, PasswordExpiring};
pub use self::post_read::{PostReadRequest, PostReadResponse};

use core::fmt;
use std::sync::Arc;
use bytes::Bytes;
use crate::ber::{Reader, Writer, TAG_BOOLEAN};
use crate::error::DecodeError;
use crate::registry::Registry;

//------------ Control -------------------------------------------------------

/// A typed LDAP control.
///
/// Every control type is identified by an OID, carries a criticality flag
/// and may carry an opaque value. Decoded controls are immutable and can be
/// shared freely between threads.
///
/// [`has_value`] and [`value`] must agree. A present-but-empty value is
/// distinct from an absent one: the post-read request’s value is mandatory
/// even when its attribute list is empty.
///
/// [`has_value`]: Self::has_value
/// [`value`]: Self::value
pub trait Control: fmt::Debug + fmt::Display + Send + Sync {
    /// Returns the OID identifying the control type.
    fn oid(&self) -> &str;

    /// Returns whether a peer that does not understand the control must
    /// reject the operation.
    fn is_critical(&self) -> bool;

    /// Returns the encoded control value, if the control has one.
    fn value(&self) -> Option<Bytes>;

    /// Returns whether the control has a value.
    fn has_value(&self) -> bool {
        self.value().is_some()
    }
}

//------------ ControlDecoder ------------------------------------------------

/// A capability to reconstruct a typed control from its raw value.
pub trait ControlDecoder: Send + Sync {
    /// Returns the OID this decoder handles.
    fn oid(&self) -> &str;

    /// Decodes a control from its criticality and raw value.
    fn decode(
        &self, is_critical: bool, value: Option<Bytes>,
    ) -> Result<Box<dyn Control>, DecodeError>;
}

/// A registry of control decoders.
///
/// Request and response controls live in separate registries since a
/// request control and its response counterpart may share an OID, as the
/// RFC 4527 post-read pair does. The dispatcher picks the registry matching
/// the direction of the message it is decoding.
pub type ControlRegistry = Registry<dyn ControlDecoder>;

/// Creates a registry with the builtin request control decoders.
pub fn builtin_request_registry() -> ControlRegistry {
    let decoders: [Arc<dyn ControlDecoder>; 2] = [
        Arc::new(post_read::RequestDecoder),
        Arc::new(authz_id::RequestDecoder),
    ];
    registry_from(decoders)
}

/// Creates a registry with the builtin response control decoders.
pub fn builtin_response_registry() -> ControlRegistry {
    let decoders: [Arc<dyn ControlDecoder>; 4] = [
        Arc::new(post_read::ResponseDecoder),
        Arc::new(authz_id::ResponseDecoder),
        Arc::new(password::ExpiredDecoder),
        Arc::new(password::ExpiringDecoder),
    ];
    registry_from(decoders)
}

fn registry_from(
    decoders: impl IntoIterator<Item = Arc<dyn ControlDecoder>>,
) -> ControlRegistry {
    let registry = ControlRegistry::new();
    for decoder in decoders {
        let oid = decoder.oid().to_owned();
        registry
            .register(oid, decoder)
            .expect("builtin control OIDs are distinct");
    }
    registry
}

//------------ RawControl ----------------------------------------------------

/// A control as received from the wire, before type dispatch.
///
/// This is what the envelope decoder produces and what unknown OIDs remain
/// as. Whether an unrecognized critical control is fatal to the operation
/// is the dispatcher’s decision, not this type’s.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RawControl {
    oid: String,
    critical: bool,
    value: Option<Bytes>,
}

impl RawControl {
    /// Creates a raw control from its parts.
    pub fn new(
        oid: impl Into<String>, critical: bool, value: Option<Bytes>,
    ) -> Self {
        RawControl { oid: oid.into(), critical, value }
    }

    /// Resolves the control into its typed form via the given registry.
    ///
    /// The registered decoder receives exactly this control’s value
    /// segment. If no decoder is registered for the OID, the control is
    /// passed through unchanged.
    pub fn decode_with(
        self, registry: &ControlRegistry,
    ) -> Result<Box<dyn Control>, DecodeError> {
        match registry.lookup(&self.oid) {
            Some(decoder) => decoder.decode(self.critical, self.value),
            None => Ok(Box::new(self)),
        }
    }
}

impl Control for RawControl {
    fn oid(&self) -> &str {
        &self.oid
    }

    fn is_critical(&self) -> bool {
        self.critical
    }

    fn value(&self) -> Option<Bytes> {
        self.value.clone()
    }
}

impl fmt::Display for RawControl {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f, "Control(oid={}, criticality={})", self.oid, self.critical
        )
    }
}

//------------ Envelope encoding and decoding --------------------------------

/// Appends the wire encoding of a control.
///
/// A criticality of false is the protocol default and is not encoded.
pub fn encode_control(writer: &mut Writer, control: &dyn Control) {
    writer.write_start_sequence();
    writer.write_octet_string(control.oid().as_bytes());
    if control.is_critical() {
        writer.write_boolean(true);
    }
    if let Some(value) = control.value() {
        writer.write_octet_string(&value);
    }
    writer.write_end_sequence();
}

/// Reads the wire encoding of a control.
pub fn decode_control(reader: &mut Reader) -> Result<RawControl, DecodeError> {
    reader.read_start_sequence()?;
    let oid = reader.read_octet_string_as_string()?;
    let mut critical = false;
    if reader.has_next_element() && reader.peek_type()? == TAG_BOOLEAN {
        critical = reader.read_boolean()?;
    }
    let value = if reader.has_next_element() {
        Some(reader.read_octet_string()?)
    }
    else {
        None
    };
    reader.read_end_sequence()?;
    Ok(RawControl { oid, critical, value })
}

//============ Testing =======================================================

#[cfg(test)]
mod test {
    use super::*;
    use crate::ber::{Error, Reader, Writer};

    #[test]
    fn envelope_round_trip() {
        let control = RawControl::new(
            "1.2.840.113556.1.4.319", true,
            Some(Bytes::from_static(b"\x30\x00")),
        );
        let mut writer = Writer::new();
        encode_control(&mut writer, &control);
        let bytes = writer.into_bytes();
        let decoded = decode_control(&mut Reader::new(&bytes)).unwrap();
        assert_eq!(decoded, control);
    }

    #[test]
    fn default_criticality_omitted() {
        let control = RawControl::new("1.2.3", false, None);
        let mut writer = Writer::new();
        encode_control(&mut writer, &control);
        let bytes = writer.into_bytes();
        // Only the sequence header and the OID string.
        assert_eq!(bytes.as_ref(), b"\x30\x07\x04\x051.2.3");
        let decoded = decode_control(&mut Reader::new(&bytes)).unwrap();
        assert!(!decoded.is_critical());
        assert!(!decoded.has_value());
    }

    #[test]
    fn empty_value_is_not_absent() {
        let control = RawControl::new(
            "1.2.3", false, Some(Bytes::new()),
        );
        let mut writer = Writer::new();
        encode_control(&mut writer, &control);
        let bytes = writer.into_bytes();
        let decoded = decode_control(&mut Reader::new(&bytes)).unwrap();
        assert!(decoded.has_value());
        assert_eq!(decoded.value().unwrap().len(), 0);
    }

    #[test]
    fn truncated_envelope() {
        let result = decode_control(&mut Reader::new(b"\x30\x05\x04\x051"));
        assert_eq!(result, Err(DecodeError::Ber(Error::BadLength)));
    }

    #[test]
    fn unknown_oid_passes_through() {
        let registry = builtin_request_registry();
        let raw = RawControl::new("9.9.9.9", true, None);
        let control = raw.clone().decode_with(&registry).unwrap();
        assert_eq!(control.oid(), "9.9.9.9");
        assert!(control.is_critical());
    }

    #[test]
    fn builtin_registries_are_complete() {
        let requests = builtin_request_registry();
        for oid in [
            post_read::OID_POST_READ,
            authz_id::OID_AUTHORIZATION_IDENTITY_REQUEST,
        ] {
            assert!(requests.lookup(oid).is_some(), "missing {oid}");
        }
        let responses = builtin_response_registry();
        for oid in [
            post_read::OID_POST_READ,
            authz_id::OID_AUTHORIZATION_IDENTITY_RESPONSE,
            password::OID_PASSWORD_EXPIRED,
            password::OID_PASSWORD_EXPIRING,
        ] {
            assert!(responses.lookup(oid).is_some(), "missing {oid}");
        }
    }
}
