//! Mutable requests and their frozen read-only views.
//!
//! Outbound requests are built up by a single thread and are not safe to
//! share while mutable. Before a request is handed to other parts of the
//! server for concurrent processing it is frozen: the frozen view holds an
//! owned copy of every field taken at freeze time, has no mutators at all,
//! and hands out defensive copies of byte-valued fields. Later changes to
//! the original cannot leak through, and the “mutating a shared request”
//! class of bugs cannot be expressed against the frozen type.

use core::fmt;

/// The authentication type octet of a simple bind.
pub const AUTHENTICATION_TYPE_SIMPLE: u8 = 0x80;

/// The authentication type octet of a SASL bind.
pub const AUTHENTICATION_TYPE_SASL: u8 = 0xA3;

//------------ GenericBindRequest --------------------------------------------

/// A mutable bind request with an opaque authentication value.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct GenericBindRequest {
    name: String,
    authentication_type: u8,
    authentication_value: Vec<u8>,
}

impl GenericBindRequest {
    /// Creates a bind request from its parts.
    pub fn new(
        name: impl Into<String>,
        authentication_type: u8,
        authentication_value: impl Into<Vec<u8>>,
    ) -> Self {
        GenericBindRequest {
            name: name.into(),
            authentication_type,
            authentication_value: authentication_value.into(),
        }
    }

    /// Returns the bind name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the authentication type octet.
    #[must_use]
    pub fn authentication_type(&self) -> u8 {
        self.authentication_type
    }

    /// Returns the opaque authentication value.
    #[must_use]
    pub fn authentication_value(&self) -> &[u8] {
        &self.authentication_value
    }

    /// Sets the bind name.
    pub fn set_name(&mut self, name: impl Into<String>) -> &mut Self {
        self.name = name.into();
        self
    }

    /// Sets the authentication type octet.
    pub fn set_authentication_type(&mut self, value: u8) -> &mut Self {
        self.authentication_type = value;
        self
    }

    /// Sets the opaque authentication value.
    pub fn set_authentication_value(
        &mut self, value: impl Into<Vec<u8>>,
    ) -> &mut Self {
        self.authentication_value = value.into();
        self
    }

    /// Produces a read-only view holding a copy of the current state.
    #[must_use]
    pub fn freeze(&self) -> FrozenBindRequest {
        FrozenBindRequest {
            name: self.name.clone(),
            authentication_type: self.authentication_type,
            authentication_value: self.authentication_value.clone(),
        }
    }
}

impl fmt::Display for GenericBindRequest {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f, "GenericBindRequest(name={}, authenticationType={:#04X})",
            self.name, self.authentication_type
        )
    }
}

//------------ FrozenBindRequest ---------------------------------------------

/// A read-only bind request, safe to share between threads.
///
/// There are deliberately no mutators on this type.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FrozenBindRequest {
    name: String,
    authentication_type: u8,
    authentication_value: Vec<u8>,
}

impl FrozenBindRequest {
    /// Returns the bind name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the authentication type octet.
    #[must_use]
    pub fn authentication_type(&self) -> u8 {
        self.authentication_type
    }

    /// Returns a fresh copy of the authentication value.
    ///
    /// Each call allocates its own copy so a caller can never alias the
    /// view’s internal state.
    #[must_use]
    pub fn authentication_value(&self) -> Vec<u8> {
        self.authentication_value.clone()
    }
}

impl fmt::Display for FrozenBindRequest {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f, "GenericBindRequest(name={}, authenticationType={:#04X})",
            self.name, self.authentication_type
        )
    }
}

//============ Testing =======================================================
