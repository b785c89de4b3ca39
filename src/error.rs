//! Error types for leases file parsing.
//!
//! All fallible operations in this crate return [`Result<T>`], which uses
//! the [`Error`] enum for error variants. Content problems inside a leases
//! file are recovered field by field; only the variants below ever reach a
//! caller.

/// Errors that can occur while reading leases or loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Reading the underlying stream or a file failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error (config file or output).
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid tool configuration.
    ///
    /// Returned by [`Config::validate`](crate::Config::validate).
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A lease-file time value that does not follow the
    /// `<weekday> <YYYY/MM/DD> <HH:MM:SS> [zone]` grammar.
    ///
    /// Only surfaced by [`timestamp::parse`](crate::timestamp::parse); the
    /// parse driver maps it to an unset field.
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    /// A statement pattern that is not a valid regular expression.
    #[error("Invalid statement pattern: {0}")]
    InvalidPattern(String),

    /// A link-layer address that is not colon, hyphen or dot separated hex.
    #[error("Invalid hardware address: {0}")]
    InvalidMacAddress(String),
}

/// A specialized Result type for leases operations.
pub type Result<T> = std::result::Result<T, Error>;
