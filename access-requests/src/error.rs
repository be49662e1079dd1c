//! Error types for the access-request domain.
//!
//! Mutations on requests never fail: stale or malformed input is a no-op.
//! The variants here cover misuse of the surrounding wiring instead.

use thiserror::Error;

/// Errors surfaced by the access-request crate
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AccessError {
    /// An operation ran on a session whose request store was never provided
    #[error("Request store has not been provided to this session")]
    StoreNotProvided,

    /// A configuration value could not be used
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// A status literal outside the known set
    #[error("Unknown status: {0}")]
    UnknownStatus(String),
}
