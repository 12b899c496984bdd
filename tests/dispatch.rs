//! End-to-end dispatch of controls through the registry.
//!
//! Exercises the two call shapes the connection layer uses: raw bytes in,
//! typed elements out via the registry, and typed elements back to bytes.

use std::sync::Arc;
use bytes::Bytes;
use ldap_codec::ber::{Reader, Writer};
use ldap_codec::control::{
    self, decode_control, encode_control, Control, ControlDecoder,
    PasswordExpiring, PostReadRequest, RawControl,
};
use ldap_codec::DecodeError;

/// Encodes a control envelope and decodes it back through a registry.
fn round_trip_via(
    registry: &control::ControlRegistry, control: &dyn Control,
) -> Box<dyn Control> {
    let mut writer = Writer::new();
    encode_control(&mut writer, control);
    let bytes = writer.into_bytes();
    let raw = decode_control(&mut Reader::new(&bytes)).unwrap();
    raw.decode_with(registry).unwrap()
}

#[test]
fn request_control_dispatch() {
    let registry = control::builtin_request_registry();
    let request = PostReadRequest::new(true, ["cn", "sn"]);
    let decoded = round_trip_via(&registry, &request);
    assert_eq!(decoded.oid(), request.oid());
    assert!(decoded.is_critical());
    assert_eq!(decoded.value(), request.value());
    assert_eq!(decoded.to_string(), request.to_string());
}

#[test]
fn response_control_dispatch() {
    let registry = control::builtin_response_registry();
    let control = PasswordExpiring::new(false, 86400);
    let decoded = round_trip_via(&registry, &control);
    assert_eq!(decoded.value().unwrap().as_ref(), b"86400");
    assert!(!decoded.is_critical());
}

#[test]
fn unknown_control_survives_round_trip() {
    let registry = control::builtin_request_registry();
    let raw = RawControl::new(
        "1.2.840.113556.1.4.473", false,
        Some(Bytes::from_static(b"\x30\x00")),
    );
    let decoded = round_trip_via(&registry, &raw);
    assert_eq!(decoded.oid(), "1.2.840.113556.1.4.473");
    assert_eq!(decoded.value(), raw.value());
}

#[test]
fn malformed_value_reports_decode_error() {
    let registry = control::builtin_request_registry();
    // A post-read request whose value is not a sequence.
    let raw = RawControl::new(
        control::post_read::OID_POST_READ, false,
        Some(Bytes::from_static(b"\x02\x01\x07")),
    );
    assert!(matches!(
        raw.decode_with(&registry).unwrap_err(),
        DecodeError::InvalidValue { .. }
    ));
}

#[test]
fn plugin_registration_is_dispatched() {
    struct NoOpDecoder;

    impl ControlDecoder for NoOpDecoder {
        fn oid(&self) -> &str {
            "1.3.6.1.4.1.4203.1.10.1"
        }

        fn decode(
            &self, is_critical: bool, value: Option<Bytes>,
        ) -> Result<Box<dyn Control>, DecodeError> {
            if value.is_some() {
                return Err(DecodeError::UnexpectedValue {
                    oid: "1.3.6.1.4.1.4203.1.10.1",
                });
            }
            Ok(Box::new(RawControl::new(
                "1.3.6.1.4.1.4203.1.10.1", is_critical, None,
            )))
        }
    }

    let registry = control::builtin_request_registry();
    registry
        .register("1.3.6.1.4.1.4203.1.10.1", Arc::new(NoOpDecoder))
        .unwrap();
    let raw = RawControl::new("1.3.6.1.4.1.4203.1.10.1", true, None);
    let decoded = raw.decode_with(&registry).unwrap();
    assert!(decoded.is_critical());
}
