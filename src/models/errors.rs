//! Centralized Error Handling Module
//!
//! Every failure carries a unique error code so log lines can be grepped and
//! counted in production.
//!
//! Error codes follow pattern: CATEGORY_SPECIFIC_ERROR
//! - ADDR_xxx: Address syntax errors
//! - RPC_xxx: Chain RPC errors
//! - ACCOUNT_xxx / HOLDER_xxx: Chain data errors
//! - CFG_xxx: Configuration errors
//! - DISCORD_xxx: Chat platform errors
//! - API_xxx: Inspection API errors

use std::fmt;

/// Application-wide error type
#[derive(Debug)]
pub struct AppError {
    /// Unique error code for logging/monitoring
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Optional underlying error
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new AppError
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Create AppError with source error
    pub fn with_source(
        code: ErrorCode,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Get error code as string (for logging)
    pub fn code_str(&self) -> &'static str {
        self.code.as_str()
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code.as_str(), self.message)
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Unique error codes for monitoring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // ============================================
    // Address Errors
    // ============================================
    /// String is not a syntactically valid base58 address
    InvalidAddress,

    // ============================================
    // RPC Errors
    // ============================================
    /// Remote lookup failed (JSON-RPC error object or HTTP failure)
    LookupFailure,
    /// RPC connection failed
    RpcConnectionFailed,
    /// RPC request timeout
    RpcTimeout,
    /// Response body could not be decoded
    RpcInvalidResponse,

    // ============================================
    // Chain Data Errors
    // ============================================
    /// Account does not exist on chain
    NotFound,
    /// A holder amount could not be parsed
    ParseFailure,

    // ============================================
    // Configuration Errors
    // ============================================
    /// Bot credential not supplied
    ConfigMissingToken,
    /// Invalid configuration value
    ConfigInvalidValue,

    // ============================================
    // Discord Errors
    // ============================================
    /// Gateway rejected our credentials or intents
    DiscordAuthFailed,
    /// REST request failed
    DiscordRequestFailed,
    /// REST request rate limited (HTTP 429)
    DiscordRateLimited,

    // ============================================
    // API Errors
    // ============================================
    /// Invalid request format
    ApiBadRequest,
    /// Resource not found
    ApiNotFound,
    /// Rate limit exceeded
    ApiRateLimited,
    /// Internal server error
    ApiInternalError,

    // ============================================
    // Generic Errors
    // ============================================
    /// Unknown error
    Unknown,
}

impl ErrorCode {
    /// Get string representation of error code
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidAddress => "ADDR_INVALID",

            Self::LookupFailure => "RPC_LOOKUP_FAILED",
            Self::RpcConnectionFailed => "RPC_CONNECTION_FAILED",
            Self::RpcTimeout => "RPC_TIMEOUT",
            Self::RpcInvalidResponse => "RPC_INVALID_RESPONSE",

            Self::NotFound => "ACCOUNT_NOT_FOUND",
            Self::ParseFailure => "HOLDER_PARSE_FAILED",

            Self::ConfigMissingToken => "CFG_MISSING_TOKEN",
            Self::ConfigInvalidValue => "CFG_INVALID_VALUE",

            Self::DiscordAuthFailed => "DISCORD_AUTH_FAILED",
            Self::DiscordRequestFailed => "DISCORD_REQUEST_FAILED",
            Self::DiscordRateLimited => "DISCORD_RATE_LIMITED",

            Self::ApiBadRequest => "API_BAD_REQUEST",
            Self::ApiNotFound => "API_NOT_FOUND",
            Self::ApiRateLimited => "API_RATE_LIMITED",
            Self::ApiInternalError => "API_INTERNAL_ERROR",

            Self::Unknown => "UNKNOWN_ERROR",
        }
    }

    /// Get HTTP status code for API responses
    pub fn http_status(&self) -> u16 {
        match self {
            Self::ApiBadRequest | Self::InvalidAddress | Self::ConfigInvalidValue => 400,
            Self::ApiNotFound | Self::NotFound => 404,
            Self::ApiRateLimited | Self::DiscordRateLimited => 429,
            Self::LookupFailure
            | Self::RpcConnectionFailed
            | Self::RpcInvalidResponse => 502,
            Self::RpcTimeout => 504,
            _ => 500,
        }
    }

    /// Codes that are swallowed without any user-visible reply
    pub fn is_silent(&self) -> bool {
        matches!(self, Self::InvalidAddress | Self::NotFound)
    }

    /// Any failure talking to the chain endpoint
    pub fn is_lookup_failure(&self) -> bool {
        matches!(
            self,
            Self::LookupFailure
                | Self::RpcConnectionFailed
                | Self::RpcTimeout
                | Self::RpcInvalidResponse
        )
    }
}

// ============================================
// Convenience constructors
// ============================================

impl AppError {
    /// Invalid address
    pub fn invalid_address(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidAddress, msg)
    }

    /// Remote lookup failed
    pub fn lookup_failure(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::LookupFailure, msg)
    }

    /// Account absent on chain
    pub fn not_found(address: &str) -> Self {
        Self::new(ErrorCode::NotFound, format!("Account not found: {}", address))
    }

    /// Malformed holder amount
    pub fn parse_failure(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ParseFailure, msg)
    }

    /// Undecodable RPC body
    pub fn invalid_response(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::RpcInvalidResponse, msg)
    }

    /// Missing bot credential
    pub fn missing_token() -> Self {
        Self::new(
            ErrorCode::ConfigMissingToken,
            "No token provided. Please run with -t <bot token>",
        )
    }

    /// Invalid configuration value
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigInvalidValue, msg)
    }

    /// Discord REST failure
    pub fn discord_failed(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::DiscordRequestFailed, msg)
    }

    /// API bad request
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ApiBadRequest, msg)
    }

    /// API internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ApiInternalError, msg)
    }
}

// ============================================
// Result type alias
// ============================================

/// Application Result type
pub type AppResult<T> = Result<T, AppError>;

// ============================================
// Conversion from common error types
// ============================================

impl From<eyre::Report> for AppError {
    fn from(err: eyre::Report) -> Self {
        Self::new(ErrorCode::Unknown, err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::with_source(ErrorCode::Unknown, "IO error", err)
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::new(ErrorCode::RpcTimeout, "Request timeout")
        } else if err.is_connect() {
            Self::new(ErrorCode::RpcConnectionFailed, "Connection failed")
        } else if err.is_decode() {
            Self::new(ErrorCode::RpcInvalidResponse, err.to_string())
        } else {
            Self::new(ErrorCode::LookupFailure, err.to_string())
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(ErrorCode::RpcInvalidResponse, "JSON parse error", err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = AppError::lookup_failure("connection reset");
        assert_eq!(err.code, ErrorCode::LookupFailure);
        assert_eq!(err.code_str(), "RPC_LOOKUP_FAILED");
        assert_eq!(err.to_string(), "[RPC_LOOKUP_FAILED] connection reset");
    }

    #[test]
    fn test_silent_codes() {
        assert!(ErrorCode::InvalidAddress.is_silent());
        assert!(ErrorCode::NotFound.is_silent());
        assert!(!ErrorCode::LookupFailure.is_silent());
        assert!(!ErrorCode::ParseFailure.is_silent());
    }

    #[test]
    fn test_lookup_failure_family() {
        assert!(ErrorCode::RpcTimeout.is_lookup_failure());
        assert!(ErrorCode::RpcInvalidResponse.is_lookup_failure());
        assert!(!ErrorCode::NotFound.is_lookup_failure());
    }

    #[test]
    fn test_http_status() {
        assert_eq!(ErrorCode::ApiBadRequest.http_status(), 400);
        assert_eq!(ErrorCode::NotFound.http_status(), 404);
        assert_eq!(ErrorCode::LookupFailure.http_status(), 502);
        assert_eq!(ErrorCode::ApiRateLimited.http_status(), 429);
        assert_eq!(ErrorCode::Unknown.http_status(), 500);
    }
}
