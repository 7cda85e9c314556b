//! Shared error type across dyngauge crates.

use thiserror::Error;

/// Stable error codes (safe to log and match on).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Malformed or out-of-range configuration.
    Config,
    /// Unsupported config schema version.
    UnsupportedVersion,
    /// A gauge factory failed for an identity.
    Creation,
    /// Internal invariant failure.
    Internal,
}

impl ErrorCode {
    /// String representation used in logs and diagnostics.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::Config => "CONFIG",
            ErrorCode::UnsupportedVersion => "UNSUPPORTED_VERSION",
            ErrorCode::Creation => "CREATION_FAILED",
            ErrorCode::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, DynGaugeError>;

/// Unified error type used by core and registry.
#[derive(Debug, Error)]
pub enum DynGaugeError {
    #[error("invalid config: {0}")]
    Config(String),
    #[error("unsupported config version: {0}")]
    UnsupportedVersion(u32),
    #[error("failed to create monitor for {id}: {reason}")]
    Creation { id: String, reason: String },
    #[error("internal: {0}")]
    Internal(String),
}

impl DynGaugeError {
    /// Map the error to a stable code.
    pub fn code(&self) -> ErrorCode {
        match self {
            DynGaugeError::Config(_) => ErrorCode::Config,
            DynGaugeError::UnsupportedVersion(_) => ErrorCode::UnsupportedVersion,
            DynGaugeError::Creation { .. } => ErrorCode::Creation,
            DynGaugeError::Internal(_) => ErrorCode::Internal,
        }
    }
}
