//! The RFC 4527 post-read controls.
//!
//! The post-read request control asks the server to return an entry in the
//! state it held immediately after an add, modify, or modify DN operation,
//! optionally restricted to a set of attributes. The entry comes back in
//! the corresponding response control.
//!
//! [RFC 4527]: https://tools.ietf.org/html/rfc4527

use core::fmt;
use bytes::Bytes;
use crate::ber::{Reader, Writer};
use crate::entry::{decode_entry, encode_entry, Entry};
use crate::error::DecodeError;
use super::{Control, ControlDecoder};

/// The OID of the post-read request and response controls.
pub const OID_POST_READ: &str = "1.3.6.1.1.13.2";

//------------ PostReadRequest -----------------------------------------------

/// The post-read request control.
///
/// An empty attribute list means “all user attributes.”
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PostReadRequest {
    critical: bool,
    attributes: Vec<String>,
}

impl PostReadRequest {
    /// Creates a request for the given attributes.
    pub fn new(
        critical: bool,
        attributes: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        PostReadRequest {
            critical,
            attributes: attributes.into_iter().map(Into::into).collect(),
        }
    }

    /// Adds an attribute to return, builder-style.
    ///
    /// Only available while the application still owns the request; once
    /// handed over for transmission the control is no longer mutated.
    #[must_use]
    pub fn with_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.attributes.push(attribute.into());
        self
    }

    /// Returns the requested attributes.
    #[must_use]
    pub fn attributes(&self) -> &[String] {
        &self.attributes
    }
}

impl Control for PostReadRequest {
    fn oid(&self) -> &str {
        OID_POST_READ
    }

    fn is_critical(&self) -> bool {
        self.critical
    }

    fn value(&self) -> Option<Bytes> {
        let mut writer = Writer::new();
        writer.write_start_sequence();
        for attr in &self.attributes {
            writer.write_octet_string(attr.as_bytes());
        }
        writer.write_end_sequence();
        Some(writer.into_bytes())
    }
}

impl fmt::Display for PostReadRequest {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f, "PostReadRequestControl(oid={}, criticality={}, \
                attributes=[{}])",
            OID_POST_READ, self.critical, self.attributes.join(", ")
        )
    }
}

//------------ PostReadResponse ----------------------------------------------

/// The post-read response control, carrying the post-operation entry.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PostReadResponse {
    critical: bool,
    entry: Entry,
}

impl PostReadResponse {
    /// Creates a response carrying the given entry.
    pub fn new(critical: bool, entry: Entry) -> Self {
        PostReadResponse { critical, entry }
    }

    /// Returns the entry carried by the response.
    #[must_use]
    pub fn entry(&self) -> &Entry {
        &self.entry
    }
}

impl Control for PostReadResponse {
    fn oid(&self) -> &str {
        OID_POST_READ
    }

    fn is_critical(&self) -> bool {
        self.critical
    }

    fn value(&self) -> Option<Bytes> {
        let mut writer = Writer::new();
        encode_entry(&mut writer, &self.entry);
        Some(writer.into_bytes())
    }
}

impl fmt::Display for PostReadResponse {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f, "PostReadResponseControl(oid={}, criticality={}, entry={})",
            OID_POST_READ, self.critical, self.entry
        )
    }
}

//------------ Decoders ------------------------------------------------------

/// Decoder for the post-read request control.
pub struct RequestDecoder;

impl ControlDecoder for RequestDecoder {
    fn oid(&self) -> &str {
        OID_POST_READ
    }

    fn decode(
        &self, is_critical: bool, value: Option<Bytes>,
    ) -> Result<Box<dyn Control>, DecodeError> {
        let value = value
            .ok_or(DecodeError::MissingValue { oid: OID_POST_READ })?;
        let mut reader = Reader::new(&value);
        let mut attributes = Vec::new();
        let result: Result<(), crate::ber::Error> = (|| {
            reader.read_start_sequence()?;
            while reader.has_next_element() {
                attributes.push(reader.read_octet_string_as_string()?);
            }
            reader.read_end_sequence()
        })();
        result.map_err(|err| DecodeError::invalid(OID_POST_READ, err))?;
        Ok(Box::new(PostReadRequest { critical: is_critical, attributes }))
    }
}

/// Decoder for the post-read response control.
pub struct ResponseDecoder;

impl ControlDecoder for ResponseDecoder {
    fn oid(&self) -> &str {
        OID_POST_READ
    }

    fn decode(
        &self, is_critical: bool, value: Option<Bytes>,
    ) -> Result<Box<dyn Control>, DecodeError> {
        let value = value
            .ok_or(DecodeError::MissingValue { oid: OID_POST_READ })?;
        let entry = decode_entry(&mut Reader::new(&value))
            .map_err(|err| DecodeError::invalid(OID_POST_READ, err))?;
        Ok(Box::new(PostReadResponse { critical: is_critical, entry }))
    }
}

//============ Testing =======================================================
