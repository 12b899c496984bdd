//! LDAP extended operations.
//!
//! An extended operation is an OID-identified operation outside the base
//! LDAP set, with its own request and response value encodings. Every
//! operation kind is described by a stateless singleton implementing
//! [`ExtendedOperation`]: the descriptor is the single source of truth for
//! the OID and knows how to decode both directions. Request and response
//! objects hold a reference to their descriptor rather than a copy of the
//! OID string, so operation kinds of decoded instances can be compared by
//! identity.

pub mod start_tls;

pub use self::start_tls::{StartTls, START_TLS};

use core::fmt;
use std::sync::Arc;
use bytes::Bytes;
use crate::error::DecodeError;
use crate::registry::Registry;

//------------ ExtendedOperation ---------------------------------------------

/// The descriptor of an extended operation kind.
///
/// Implementations are stateless singletons exposed as a `static` so that
/// every request and response can reference the one canonical descriptor.
pub trait ExtendedOperation: fmt::Debug + Send + Sync {
    /// Returns the OID identifying the operation.
    fn oid(&self) -> &str;

    /// Decodes a request of this operation from its raw value.
    fn decode_request(
        &self, value: Option<Bytes>,
    ) -> Result<Box<dyn ExtendedRequest>, DecodeError>;

    /// Decodes a response of this operation.
    fn decode_response(
        &self,
        result_code: ResultCode,
        matched_dn: String,
        diagnostic_message: String,
        response_name: Option<String>,
        value: Option<Bytes>,
    ) -> Result<Box<dyn ExtendedResponse>, DecodeError>;
}

/// A registry of extended operation descriptors.
pub type ExtendedOperationRegistry = Registry<dyn ExtendedOperation>;

/// Creates a registry with the builtin extended operations.
pub fn builtin_registry() -> ExtendedOperationRegistry {
    let registry = ExtendedOperationRegistry::new();
    registry
        .register(START_TLS.oid().to_owned(), Arc::new(StartTls))
        .expect("builtin extended operation OIDs are distinct");
    registry
}

//------------ ExtendedRequest -----------------------------------------------

/// A typed extended operation request.
pub trait ExtendedRequest: fmt::Debug + fmt::Display + Send + Sync {
    /// Returns the canonical descriptor of the operation kind.
    fn operation(&self) -> &'static dyn ExtendedOperation;

    /// Returns the request name, which is the operation’s OID.
    fn request_name(&self) -> &str {
        self.operation().oid()
    }

    /// Returns the encoded request value, if the operation has one.
    fn request_value(&self) -> Option<Bytes>;
}

//------------ ExtendedResponse ----------------------------------------------

/// A typed extended operation response.
pub trait ExtendedResponse: fmt::Debug + fmt::Display + Send + Sync {
    /// Returns the canonical descriptor of the operation kind.
    fn operation(&self) -> &'static dyn ExtendedOperation;

    /// Returns the result code of the operation.
    fn result_code(&self) -> ResultCode;

    /// Returns the matched DN reported by the server.
    fn matched_dn(&self) -> &str;

    /// Returns the human-readable diagnostic message.
    fn diagnostic_message(&self) -> &str;

    /// Returns the response name, if the response carries one.
    fn response_name(&self) -> Option<&str>;

    /// Returns the encoded response value, if the operation has one.
    fn response_value(&self) -> Option<Bytes>;
}

//------------ ResultCode ----------------------------------------------------

/// An LDAP result code.
///
/// The numeric code space is open, so this is a plain newtype with
/// associated constants for the values this crate needs by name.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ResultCode(u16);

impl ResultCode {
    pub const SUCCESS: ResultCode = ResultCode(0);
    pub const OPERATIONS_ERROR: ResultCode = ResultCode(1);
    pub const PROTOCOL_ERROR: ResultCode = ResultCode(2);
    pub const AUTH_METHOD_NOT_SUPPORTED: ResultCode = ResultCode(7);
    pub const REFERRAL: ResultCode = ResultCode(10);
    pub const UNAVAILABLE_CRITICAL_EXTENSION: ResultCode = ResultCode(12);
    pub const NO_SUCH_OBJECT: ResultCode = ResultCode(32);
    pub const INVALID_CREDENTIALS: ResultCode = ResultCode(49);
    pub const UNAVAILABLE: ResultCode = ResultCode(52);
    pub const UNWILLING_TO_PERFORM: ResultCode = ResultCode(53);
    pub const OTHER: ResultCode = ResultCode(80);

    /// Creates a result code from its numeric value.
    #[must_use]
    pub fn from_int(value: u16) -> Self {
        ResultCode(value)
    }

    /// Returns the numeric value of the code.
    #[must_use]
    pub fn to_int(self) -> u16 {
        self.0
    }
}

//--- Display

impl fmt::Display for ResultCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            ResultCode::SUCCESS => f.write_str("success"),
            ResultCode::OPERATIONS_ERROR => f.write_str("operationsError"),
            ResultCode::PROTOCOL_ERROR => f.write_str("protocolError"),
            ResultCode::AUTH_METHOD_NOT_SUPPORTED => {
                f.write_str("authMethodNotSupported")
            }
            ResultCode::REFERRAL => f.write_str("referral"),
            ResultCode::UNAVAILABLE_CRITICAL_EXTENSION => {
                f.write_str("unavailableCriticalExtension")
            }
            ResultCode::NO_SUCH_OBJECT => f.write_str("noSuchObject"),
            ResultCode::INVALID_CREDENTIALS => {
                f.write_str("invalidCredentials")
            }
            ResultCode::UNAVAILABLE => f.write_str("unavailable"),
            ResultCode::UNWILLING_TO_PERFORM => {
                f.write_str("unwillingToPerform")
            }
            ResultCode::OTHER => f.write_str("other"),
            ResultCode(value) => write!(f, "code {}", value),
        }
    }
}

//============ Testing =======================================================

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn result_code_names() {
        assert_eq!(ResultCode::SUCCESS.to_string(), "success");
        assert_eq!(ResultCode::PROTOCOL_ERROR.to_string(), "protocolError");
        assert_eq!(ResultCode::from_int(123).to_string(), "code 123");
        assert_eq!(ResultCode::from_int(0), ResultCode::SUCCESS);
    }

    #[test]
    fn registry_dispatch() {
        let registry = builtin_registry();
        let operation = registry
            .lookup("1.3.6.1.4.1.1466.20037")
            .expect("StartTLS registered");
        let request = operation.decode_request(None).unwrap();
        assert_eq!(request.request_name(), "1.3.6.1.4.1.1466.20037");
    }
}
