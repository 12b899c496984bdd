//! An LDAP protocol element codec library for Rust.
//!
//! This crate provides the extensible framework a directory server uses to
//! encode and decode LDAP controls, extended operations, and search filters
//! to and from their ASN.1 BER wire format. It performs no I/O of its own:
//! encode and decode are pure transformations over in-memory buffers,
//! invoked synchronously by whatever layer owns the connection.
//!
//! # Modules
//!
//! * [ber] implements the small BER subset LDAP uses: a [`ber::Writer`]
//!   appending tag-length-value elements to a buffer and a [`ber::Reader`]
//!   walking one while tracking sequence nesting.
//! * [registry] provides the OID-keyed [`Registry`] through which decoders
//!   for an open-ended set of element types are dispatched. Lookups are
//!   lock-free; new types can be registered while the server is running.
//! * [control] defines the [`control::Control`] trait, the envelope codec,
//!   and the builtin control types: the RFC 4527 post-read pair, the
//!   RFC 3829 authorization identity pair, and the Netscape password
//!   expiration pair.
//! * [extended] defines the extended operation framework with its
//!   singleton operation descriptors, plus the StartTLS operation.
//! * [filter] models search filters as a closed enum with a single
//!   choice-tag codec.
//! * [entry] carries the directory-entry wire format used by the post-read
//!   response control.
//! * [request] holds mutable outbound requests and their frozen, freely
//!   shareable read-only views.
//!
//! Decoded elements are immutable and `Send + Sync`; share them across
//! threads at will. All decode failures surface as [`DecodeError`] values
//! and are recoverable per operation; nothing in this crate panics on
//! malformed wire input.

pub mod ber;
pub mod control;
pub mod entry;
pub mod error;
pub mod extended;
pub mod filter;
pub mod registry;
pub mod request;

pub use self::error::DecodeError;
pub use self::filter::Filter;
pub use self::registry::{Registry, RegistryError};
