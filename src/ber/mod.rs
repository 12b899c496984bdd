//! Creating and consuming ASN.1 BER encoded data.
//!
//! LDAP transports all of its protocol elements in a small subset of the
//! Basic Encoding Rules: definite-length primitives and constructed
//! sequences. This module provides the two halves of that subset: [`Writer`]
//! appends tag-length-value elements to a growable buffer, [`Reader`] walks
//! a received buffer while keeping track of sequence nesting.
//!
//! Indefinite-length encoding is not supported since LDAP never uses it.

pub use self::reader::{Error, Reader};
pub use self::writer::Writer;

mod reader;
mod writer;

//------------ Universal tags ------------------------------------------------

/// The BER type for a universal BOOLEAN.
pub const TAG_BOOLEAN: u8 = 0x01;

/// The BER type for a universal INTEGER.
pub const TAG_INTEGER: u8 = 0x02;

/// The BER type for a universal OCTET STRING.
pub const TAG_OCTET_STRING: u8 = 0x04;

/// The BER type for a universal ENUMERATED.
pub const TAG_ENUMERATED: u8 = 0x0A;

/// The BER type for a universal constructed SEQUENCE.
pub const TAG_SEQUENCE: u8 = 0x30;

/// The BER type for a universal constructed SET.
pub const TAG_SET: u8 = 0x31;
