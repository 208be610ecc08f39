use crate::core::kernel::security::SecurityLevel;
use crate::core::kernel::transport::TransportError;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExchangeError {
    #[error("{method} {path} requires {level:?} credentials but the client has none")]
    MissingCredentials {
        method: String,
        path: String,
        level: SecurityLevel,
    },

    #[error("Authentication error: {0}")]
    AuthError(String),

    #[error("Invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("{method} {path} failed: {source}")]
    Transport {
        method: String,
        path: String,
        #[source]
        source: TransportError,
    },

    #[error("{method} {path} was cancelled")]
    Cancelled { method: String, path: String },

    #[error("{method} {path} exceeded its deadline")]
    DeadlineExceeded { method: String, path: String },

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("unsuccessful response code received: {status}")]
    UnsuccessfulResponse { status: u16 },

    #[error("failed to parse error response (status {status}): {source}")]
    MalformedErrorBody {
        status: u16,
        #[source]
        source: serde_json::Error,
    },

    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("Configuration error: {0}")]
    ConfigError(#[from] crate::core::config::ConfigError),

    #[error("Other error: {0}")]
    Other(String),
}

impl ExchangeError {
    /// The exchange's error payload, if this error carries one.
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            Self::Api(err) => Some(err),
            _ => None,
        }
    }

    /// Whether this is an exchange error with one of `codes`.
    pub fn is_api_code(&self, codes: &[ErrorCode]) -> bool {
        self.api_error().is_some_and(|err| err.is_any(codes))
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }
}

/// Structured error returned by the exchange in the body of a non-2xx
/// response, e.g. `{"code":-1003,"msg":"Too many requests."}`.
///
/// See <https://github.com/binance-exchange/binance-official-api-docs/blob/master/errors.md>.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("{message} (code {code})")]
pub struct ApiError {
    pub code: ErrorCode,
    #[serde(rename = "msg")]
    pub message: String,
}

impl ApiError {
    pub fn is(&self, code: impl Into<ErrorCode>) -> bool {
        self.code == code.into()
    }

    pub fn is_any(&self, codes: &[ErrorCode]) -> bool {
        codes.iter().any(|code| self.is(*code))
    }
}

/// Numeric error code of an [`ApiError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ErrorCode(pub i32);

impl ErrorCode {
    pub const UNKNOWN: Self = Self(-1000);
    pub const DISCONNECTED: Self = Self(-1001);
    pub const UNAUTHORIZED: Self = Self(-1002);
    pub const TOO_MANY_REQUESTS: Self = Self(-1003);
    pub const UNEXPECTED_RESPONSE: Self = Self(-1006);
    pub const TIMEOUT: Self = Self(-1007);
    pub const UNKNOWN_ORDER_COMPOSITION: Self = Self(-1014);
    pub const TOO_MANY_ORDERS: Self = Self(-1015);
    pub const SERVICE_SHUTTING_DOWN: Self = Self(-1016);
    pub const UNSUPPORTED_OPERATION: Self = Self(-1020);
    pub const INVALID_TIMESTAMP: Self = Self(-1021);
    pub const INVALID_SIGNATURE: Self = Self(-1022);
    pub const ILLEGAL_CHARS: Self = Self(-1100);
    pub const TOO_MANY_PARAMS: Self = Self(-1101);
    pub const MANDATORY_PARAM_EMPTY_OR_MALFORMED: Self = Self(-1102);
    pub const UNKNOWN_PARAM: Self = Self(-1103);
    pub const UNREAD_PARAMS: Self = Self(-1104);
    pub const PARAM_EMPTY: Self = Self(-1105);
    pub const PARAM_NOT_REQUIRED: Self = Self(-1106);
    pub const BAD_PRECISION: Self = Self(-1111);
    pub const NO_DEPTH: Self = Self(-1112);
    pub const TIF_NOT_REQUIRED: Self = Self(-1114);
    pub const INVALID_TIF: Self = Self(-1115);
    pub const INVALID_ORDER_TYPE: Self = Self(-1116);
    pub const INVALID_SIDE: Self = Self(-1117);
    pub const EMPTY_NEW_CLIENT_ORDER_ID: Self = Self(-1118);
    pub const EMPTY_ORIGINAL_CLIENT_ORDER_ID: Self = Self(-1119);
    pub const BAD_INTERVAL: Self = Self(-1120);
    pub const BAD_SYMBOL: Self = Self(-1121);
    pub const INVALID_LISTEN_KEY: Self = Self(-1125);
    pub const MORE_THAN_X_HOURS: Self = Self(-1127);
    pub const OPTIONAL_PARAMS_BAD_COMBO: Self = Self(-1128);
    pub const INVALID_PARAM: Self = Self(-1130);
    pub const NEW_ORDER_REJECTED: Self = Self(-2010);
    pub const CANCEL_REJECTED: Self = Self(-2011);
    pub const NO_SUCH_ORDER: Self = Self(-2013);
    pub const API_KEY_FORMAT: Self = Self(-2014);
    pub const REJECTED_MBX_KEY: Self = Self(-2015);
    pub const NO_TRADING_WINDOW: Self = Self(-2016);
}

impl From<i32> for ErrorCode {
    fn from(code: i32) -> Self {
        Self(code)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A response body that is valid JSON but does not have the shape the
/// exchange documents for the requested type.
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("field `{field}`: {value:?} is not a decimal number")]
    InvalidDecimal { field: &'static str, value: String },

    #[error("field `{field}`: {value:?} is not a finite number")]
    NonFiniteDecimal { field: &'static str, value: String },

    #[error("field `{field}`: timestamp {millis}ms is out of range")]
    TimestampOutOfRange { field: &'static str, millis: i64 },

    #[error("expected an array of {expected} elements, got {actual}")]
    ArrayLength { expected: String, actual: usize },

    #[error("index {index} (`{field}`): expected {expected}, found {found}")]
    SlotType {
        index: usize,
        field: &'static str,
        expected: &'static str,
        found: &'static str,
    },

    #[error("element {index}: {source}")]
    Element {
        index: usize,
        #[source]
        source: Box<DecodeError>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn too_many_requests() -> ApiError {
        serde_json::from_str(r#"{"code":-1003,"msg":"Too many requests."}"#).unwrap()
    }

    #[test]
    fn test_api_error_decodes_code_and_message() {
        let err = too_many_requests();
        assert_eq!(err.code, ErrorCode::TOO_MANY_REQUESTS);
        assert_eq!(err.message, "Too many requests.");
    }

    #[test]
    fn test_api_error_code_membership() {
        let err = too_many_requests();
        assert!(err.is(-1003));
        assert!(err.is(ErrorCode::TOO_MANY_REQUESTS));
        assert!(!err.is(ErrorCode::INVALID_SIGNATURE));
        assert!(err.is_any(&[ErrorCode::UNKNOWN, ErrorCode::TOO_MANY_REQUESTS]));
        assert!(!err.is_any(&[ErrorCode::UNKNOWN]));
        assert!(!err.is_any(&[]));
    }

    #[test]
    fn test_exchange_error_exposes_api_code() {
        let err = ExchangeError::from(too_many_requests());
        assert!(err.is_api_code(&[ErrorCode::TOO_MANY_REQUESTS]));
        assert!(!err.is_api_code(&[ErrorCode::INVALID_TIMESTAMP]));

        let other = ExchangeError::UnsuccessfulResponse { status: 502 };
        assert!(other.api_error().is_none());
        assert!(!other.is_api_code(&[ErrorCode::TOO_MANY_REQUESTS]));
    }

    #[test]
    fn test_decode_error_names_offending_slot() {
        let err = DecodeError::SlotType {
            index: 3,
            field: "low",
            expected: "string",
            found: "number",
        };
        assert_eq!(
            err.to_string(),
            "index 3 (`low`): expected string, found number"
        );
    }
}
