//! Error types for vaultbot.

use thiserror::Error;

/// Common error type for vaultbot.
#[derive(Error, Debug)]
pub enum VaultError {
    /// The caller has no active session.
    #[error("authentication required")]
    AuthRequired,

    /// A command was called with a malformed argument list.
    ///
    /// Carries the usage hint to report back to the user.
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    /// A 1-based file ordinal was out of range for the current listing.
    ///
    /// Carries the raw token, which may not even be numeric.
    #[error("index {0} out of range")]
    IndexOutOfRange(String),

    /// A resolved file no longer exists on disk.
    #[error("{0} not found")]
    NotFound(String),

    /// A file exceeds a configured transfer ceiling.
    #[error("file too large: {size} bytes exceeds the {limit} byte limit")]
    TooLarge {
        /// Actual file size in bytes.
        size: u64,
        /// Applicable ceiling in bytes (upload and download differ).
        limit: u64,
    },

    /// A transfer to or from the chat platform failed.
    #[error("transfer error: {0}")]
    Transfer(#[from] crate::transfer::TransferError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("validation error: {0}")]
    Validation(String),
}

/// Result type alias for vaultbot operations.
pub type Result<T> = std::result::Result<T, VaultError>;
