//! Unified error types for the card core.
//!
//! Only two things can actually fail: building a configuration from the
//! host's plain object, and an outbound service call.  Everything else
//! (malformed capability lists, missing companion entities, unavailable
//! devices) degrades in place and never surfaces as an `Err`.

use thiserror::Error;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Every fallible operation in the crate funnels into this type.
#[derive(Debug, Error)]
pub enum Error {
    /// The card configuration was rejected at construction time.
    #[error("config: {0}")]
    Config(#[from] ConfigError),
    /// An outbound service call was rejected by the host.
    #[error("service: {0}")]
    Service(#[from] ServiceError),
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The required `entity` option is absent or blank.
    #[error("missing required option `entity`")]
    MissingEntity,
    /// `entity` is present but is not an `<domain>.<object_id>` reference.
    #[error("invalid entity reference `{0}`")]
    InvalidEntity(String),
    /// The configuration object could not be deserialised.
    #[error("malformed configuration: {0}")]
    Malformed(String),
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        Self::Malformed(e.to_string())
    }
}

// ---------------------------------------------------------------------------
// Service-call errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    /// The host accepted the call but the backend refused it.
    #[error("{service} rejected: {reason}")]
    Rejected { service: String, reason: String },
    /// The host could not deliver the call at all.
    #[error("service unavailable: {0}")]
    Unavailable(String),
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
