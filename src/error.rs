use std::fmt;

/// Numeric RPC error code, following the JSON-RPC convention of negative
/// codes for protocol and server errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ErrorCode(i32);

impl ErrorCode {
    /// Generic server error. Used for all transaction lifecycle failures.
    pub const DEFAULT: ErrorCode = ErrorCode(-32000);
    /// The payload could not be parsed.
    pub const PARSE_ERROR: ErrorCode = ErrorCode(-32700);
    /// The request is not a valid request object.
    pub const INVALID_REQUEST: ErrorCode = ErrorCode(-32600);
    /// The requested method does not exist.
    pub const METHOD_NOT_FOUND: ErrorCode = ErrorCode(-32601);
    /// The method parameters are invalid.
    pub const INVALID_PARAMS: ErrorCode = ErrorCode(-32602);
    /// Internal error while handling the request.
    pub const INTERNAL_ERROR: ErrorCode = ErrorCode(-32603);

    pub const fn new(code: i32) -> Self {
        ErrorCode(code)
    }

    pub const fn as_i32(self) -> i32 {
        self.0
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Uniform error shape surfaced to RPC callers.
///
/// Carries a numeric [`ErrorCode`], a human-readable message and, when the
/// failure originated in a lower layer, the wrapped cause (exposed through
/// [`std::error::Error::source`]).
///
/// Business failures and transaction lifecycle failures share this one shape,
/// so an RPC-layer formatter can turn any of them into a wire response
/// without caring where they came from.
///
/// When a rollback fails after the unit of work has already failed, the
/// rollback error is returned as the primary error and the business error is
/// retained in [`RpcError::superseded`], so no information is dropped.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct RpcError {
    code: ErrorCode,
    message: String,
    #[source]
    cause: Option<Box<dyn std::error::Error + Send + Sync>>,
    superseded: Option<Box<RpcError>>,
}

impl RpcError {
    /// Creates a business error with the given code and message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        RpcError {
            code,
            message: message.into(),
            cause: None,
            superseded: None,
        }
    }

    /// Creates an error wrapping a lower-level cause.
    pub fn with_cause(
        code: ErrorCode,
        message: impl Into<String>,
        cause: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        RpcError {
            code,
            message: message.into(),
            cause: Some(cause.into()),
            superseded: None,
        }
    }

    /// Attaches an error that this one takes priority over.
    pub fn superseding(mut self, superseded: RpcError) -> Self {
        self.superseded = Some(Box::new(superseded));
        self
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// The wrapped lower-level cause, if any.
    pub fn cause(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        self.cause.as_deref()
    }

    /// The error this one superseded, if any.
    pub fn superseded(&self) -> Option<&RpcError> {
        self.superseded.as_deref()
    }
}

/// Result type alias for scoped transaction operations.
pub type Result<T> = std::result::Result<T, RpcError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn display_is_the_message() {
        let err = RpcError::new(ErrorCode::INVALID_PARAMS, "balance must be positive");
        assert_eq!(err.to_string(), "balance must be positive");
        assert_eq!(err.code(), ErrorCode::INVALID_PARAMS);
    }

    #[test]
    fn cause_is_exposed_through_source() {
        let low = sqlx::Error::Protocol("connection reset".into());
        let err = RpcError::with_cause(ErrorCode::DEFAULT, "failed to connect to the state", low);

        let source = err.source().expect("cause should be the source");
        assert!(source.to_string().contains("connection reset"));
        assert!(err.cause().is_some());
    }

    #[test]
    fn superseding_keeps_the_original_error() {
        let business = RpcError::new(ErrorCode::INVALID_REQUEST, "dup-key");
        let err = RpcError::with_cause(
            ErrorCode::DEFAULT,
            "failed to rollback db transaction",
            sqlx::Error::Protocol("conn lost".into()),
        )
        .superseding(business);

        assert_eq!(err.message(), "failed to rollback db transaction");
        let superseded = err.superseded().expect("business error should survive");
        assert_eq!(superseded.code(), ErrorCode::INVALID_REQUEST);
        assert_eq!(superseded.message(), "dup-key");
    }

    #[test]
    fn error_codes_match_the_rpc_catalog() {
        assert_eq!(ErrorCode::DEFAULT.as_i32(), -32000);
        assert_eq!(ErrorCode::INVALID_PARAMS.as_i32(), -32602);
        assert_eq!(ErrorCode::new(-32098).as_i32(), -32098);
        assert_eq!(ErrorCode::INTERNAL_ERROR.to_string(), "-32603");
    }
}
