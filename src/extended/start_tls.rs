//! The StartTLS extended operation.
//!
//! StartTLS carries no value in either direction; the response merely
//! echoes the operation OID as its response name. It is the degenerate case
//! of the extended operation framework and decoding it never fails.

use core::fmt;
use bytes::Bytes;
use crate::error::DecodeError;
use super::{
    ExtendedOperation, ExtendedRequest, ExtendedResponse, ResultCode,
};

/// The OID of the StartTLS extended operation.
pub const OID_START_TLS: &str = "1.3.6.1.4.1.1466.20037";

//------------ StartTls ------------------------------------------------------

/// The StartTLS operation descriptor.
///
/// Use the [`START_TLS`] singleton rather than constructing values of this
/// type; identity comparison of operation kinds relies on every element
/// referencing the same descriptor.
#[derive(Debug)]
pub struct StartTls;

/// The canonical StartTLS descriptor.
pub static START_TLS: StartTls = StartTls;

impl ExtendedOperation for StartTls {
    fn oid(&self) -> &str {
        OID_START_TLS
    }

    fn decode_request(
        &self, _value: Option<Bytes>,
    ) -> Result<Box<dyn ExtendedRequest>, DecodeError> {
        Ok(Box::new(StartTlsRequest::new()))
    }

    fn decode_response(
        &self,
        result_code: ResultCode,
        matched_dn: String,
        diagnostic_message: String,
        _response_name: Option<String>,
        _value: Option<Bytes>,
    ) -> Result<Box<dyn ExtendedResponse>, DecodeError> {
        Ok(Box::new(StartTlsResponse::new(
            result_code, matched_dn, diagnostic_message,
        )))
    }
}

//------------ StartTlsRequest -----------------------------------------------

/// A StartTLS request. Carries no value.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct StartTlsRequest;

impl StartTlsRequest {
    /// Creates a new StartTLS request.
    #[must_use]
    pub fn new() -> Self {
        StartTlsRequest
    }
}

impl ExtendedRequest for StartTlsRequest {
    fn operation(&self) -> &'static dyn ExtendedOperation {
        &START_TLS
    }

    fn request_value(&self) -> Option<Bytes> {
        None
    }
}

impl fmt::Display for StartTlsRequest {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "StartTLSExtendedRequest(requestName={})", OID_START_TLS)
    }
}

//------------ StartTlsResponse ----------------------------------------------

/// A StartTLS response.
///
/// Carries no value but always reports the operation OID as its response
/// name.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StartTlsResponse {
    result_code: ResultCode,
    matched_dn: String,
    diagnostic_message: String,
}

impl StartTlsResponse {
    /// Creates a new StartTLS response.
    pub fn new(
        result_code: ResultCode,
        matched_dn: impl Into<String>,
        diagnostic_message: impl Into<String>,
    ) -> Self {
        StartTlsResponse {
            result_code,
            matched_dn: matched_dn.into(),
            diagnostic_message: diagnostic_message.into(),
        }
    }
}

impl ExtendedResponse for StartTlsResponse {
    fn operation(&self) -> &'static dyn ExtendedOperation {
        &START_TLS
    }

    fn result_code(&self) -> ResultCode {
        self.result_code
    }

    fn matched_dn(&self) -> &str {
        &self.matched_dn
    }

    fn diagnostic_message(&self) -> &str {
        &self.diagnostic_message
    }

    fn response_name(&self) -> Option<&str> {
        Some(OID_START_TLS)
    }

    fn response_value(&self) -> Option<Bytes> {
        None
    }
}

impl fmt::Display for StartTlsResponse {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f, "StartTLSExtendedResponse(resultCode={}, matchedDN={}, \
                diagnosticMessage={}, responseName={})",
            self.result_code, self.matched_dn, self.diagnostic_message,
            OID_START_TLS
        )
    }
}

//============ Testing =======================================================
