//! Decode failures for protocol elements.

use core::fmt;
use crate::ber;

//------------ DecodeError ---------------------------------------------------

/// An error happened while decoding a protocol element.
///
/// All variants are recoverable at the operation level: the server is
/// expected to answer the offending request with a protocol error and keep
/// serving. None of them should ever terminate the process.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DecodeError {
    /// The byte stream did not match the expected BER structure.
    Ber(ber::Error),

    /// An element requires a value but none was provided.
    MissingValue {
        oid: &'static str,
    },

    /// An element must not have a value but one was provided.
    UnexpectedValue {
        oid: &'static str,
    },

    /// The value was well-formed BER but failed a secondary parse.
    InvalidValue {
        oid: &'static str,
        message: String,
    },
}

impl DecodeError {
    /// Creates a semantic parse failure wrapping the given diagnostic.
    pub fn invalid(oid: &'static str, message: impl fmt::Display) -> Self {
        DecodeError::InvalidValue {
            oid,
            message: message.to_string(),
        }
    }
}

//--- From

impl From<ber::Error> for DecodeError {
    fn from(err: ber::Error) -> Self {
        DecodeError::Ber(err)
    }
}

//--- Display and Error

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            DecodeError::Ber(ref err) => err.fmt(f),
            DecodeError::MissingValue { oid } => {
                write!(f, "element {} requires a value but none was \
                           provided", oid)
            }
            DecodeError::UnexpectedValue { oid } => {
                write!(f, "element {} must not have a value", oid)
            }
            DecodeError::InvalidValue { oid, ref message } => {
                write!(f, "cannot decode value of element {}: {}",
                       oid, message)
            }
        }
    }
}

impl std::error::Error for DecodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match *self {
            DecodeError::Ber(ref err) => Some(err),
            _ => None,
        }
    }
}
