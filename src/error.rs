//! Error types for costctl
//!
//! This module defines the error handling strategy for costctl. There are two
//! error types: `CostctlError` (main error enum) and `ConfigError` (configuration-specific).
//!
//! ## Error Handling Philosophy
//!
//! Library code uses `crate::error::Result<T>` which returns `CostctlError`.
//! CLI code uses `anyhow::Result<T>` for top-level error handling. The conversion
//! happens at the CLI boundary using `anyhow::Error::from` to preserve error chains.
//!
//! ## Hard vs Soft Failures
//!
//! Only request-level problems are errors:
//!
//! - `Validation`: missing provider/service family/region, or a service family
//!   outside the supported set. Carries a machine-readable `ErrorCode` and a
//!   correlation identifier.
//! - `RegionMismatch`: the request targets a region this engine instance does
//!   not serve. Carries both regions so the caller can redirect.
//!
//! A missing price or a malformed usage tag is NOT an error. Estimators absorb
//! those into a zero-cost `CostResult` with an explanatory billing detail, and
//! record defaulted inputs in `defaulted_fields`.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Machine-readable error codes surfaced to the RPC layer.
///
/// `as_str` is the only spelling table; serde and `Display` both go through it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "&'static str", try_from = "String")]
pub enum ErrorCode {
    MissingProvider,
    MissingServiceFamily,
    MissingRegion,
    UnsupportedProvider,
    UnsupportedService,
    RegionMismatch,
    InvalidConfig,
}

impl ErrorCode {
    pub const ALL: [ErrorCode; 7] = [
        ErrorCode::MissingProvider,
        ErrorCode::MissingServiceFamily,
        ErrorCode::MissingRegion,
        ErrorCode::UnsupportedProvider,
        ErrorCode::UnsupportedService,
        ErrorCode::RegionMismatch,
        ErrorCode::InvalidConfig,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::MissingProvider => "MISSING_PROVIDER",
            ErrorCode::MissingServiceFamily => "MISSING_SERVICE_FAMILY",
            ErrorCode::MissingRegion => "MISSING_REGION",
            ErrorCode::UnsupportedProvider => "UNSUPPORTED_PROVIDER",
            ErrorCode::UnsupportedService => "UNSUPPORTED_SERVICE",
            ErrorCode::RegionMismatch => "REGION_MISMATCH",
            ErrorCode::InvalidConfig => "INVALID_CONFIG",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<ErrorCode> for &'static str {
    fn from(code: ErrorCode) -> Self {
        code.as_str()
    }
}

/// A code string that names no `ErrorCode`
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown error code: {0}")]
pub struct UnknownErrorCode(pub String);

impl TryFrom<String> for ErrorCode {
    type Error = UnknownErrorCode;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        ErrorCode::ALL
            .into_iter()
            .find(|code| code.as_str() == value)
            .ok_or(UnknownErrorCode(value))
    }
}

/// Main error type for costctl
#[derive(Error, Debug)]
pub enum CostctlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Validation error [{code}]: {field} - {reason} (correlation_id: {correlation_id})")]
    Validation {
        code: ErrorCode,
        field: String,
        reason: String,
        correlation_id: String,
    },

    #[error(
        "Region mismatch: this instance serves {plugin_region}, request targets {requested_region} (correlation_id: {correlation_id})"
    )]
    RegionMismatch {
        plugin_region: String,
        requested_region: String,
        correlation_id: String,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CostctlError {
    /// Machine-readable code for this error
    pub fn code(&self) -> ErrorCode {
        match self {
            CostctlError::Validation { code, .. } => *code,
            CostctlError::RegionMismatch { .. } => ErrorCode::RegionMismatch,
            CostctlError::Config(_) | CostctlError::Io(_) | CostctlError::Json(_) => {
                ErrorCode::InvalidConfig
            }
        }
    }

    /// Correlation identifier for request-level errors
    pub fn correlation_id(&self) -> Option<&str> {
        match self {
            CostctlError::Validation { correlation_id, .. }
            | CostctlError::RegionMismatch { correlation_id, .. } => Some(correlation_id),
            _ => None,
        }
    }
}

/// Configuration-specific errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Failed to parse config: {0}")]
    ParseError(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, CostctlError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_serializes_screaming_snake() {
        let json = serde_json::to_string(&ErrorCode::MissingServiceFamily).unwrap();
        assert_eq!(json, "\"MISSING_SERVICE_FAMILY\"");
        assert_eq!(ErrorCode::RegionMismatch.to_string(), "REGION_MISMATCH");
    }

    #[test]
    fn test_error_code_spellings_agree() {
        for code in ErrorCode::ALL {
            let json = serde_json::to_value(code).unwrap();
            assert_eq!(json, code.as_str());
            assert_eq!(code.to_string(), code.as_str());
            let back: ErrorCode = serde_json::from_value(json).unwrap();
            assert_eq!(back, code);
        }
        assert!(serde_json::from_str::<ErrorCode>("\"NOPE\"").is_err());
    }

    #[test]
    fn test_region_mismatch_carries_both_regions() {
        let err = CostctlError::RegionMismatch {
            plugin_region: "us-east-1".to_string(),
            requested_region: "eu-west-1".to_string(),
            correlation_id: "abc".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("us-east-1"));
        assert!(msg.contains("eu-west-1"));
        assert_eq!(err.code(), ErrorCode::RegionMismatch);
        assert_eq!(err.correlation_id(), Some("abc"));
    }

    #[test]
    fn test_config_error_converts() {
        let err: CostctlError = ConfigError::MissingField("region".to_string()).into();
        assert!(matches!(err, CostctlError::Config(_)));
        assert_eq!(err.correlation_id(), None);
    }
}
