//! Identity domain errors
//!
//! The error taxonomy of the identity core. None of these are retried; all
//! failures propagate to the caller synchronously.

use thiserror::Error;

use core_kernel::{PortError, TemporalError};

use crate::profile::ProfileKind;

/// Errors that can occur in the identity domain
#[derive(Debug, Error)]
pub enum IdentityError {
    /// Creation requested with a login/code identifier already held by a
    /// currently-valid record of the same kind
    #[error("Duplicate {kind} identifier: {identifier}")]
    DuplicateIdentifier {
        kind: ProfileKind,
        identifier: String,
    },

    /// An explicit identifier was supplied but does not resolve
    ///
    /// Deliberately not "create on missing id": callers must not be able to
    /// fabricate identifiers.
    #[error("Not found: {entity} with id {id}")]
    NotFound {
        entity: &'static str,
        id: String,
    },

    /// Required companion data absent or malformed
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Requested profile kind is not registered in the running deployment
    #[error("Unsupported record kind: {0}")]
    UnsupportedKind(String),

    /// A validity-period operation failed (clock earlier than stored history)
    #[error("Temporal error: {0}")]
    Temporal(#[from] TemporalError),

    /// A store adapter failure, propagated unchanged
    #[error("Store error: {0}")]
    Store(#[from] PortError),
}

impl IdentityError {
    /// Creates a NotFound error from any id type
    pub fn not_found(entity: &'static str, id: impl std::fmt::Display) -> Self {
        IdentityError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Creates an InvalidInput error with a message
    pub fn invalid_input(message: impl Into<String>) -> Self {
        IdentityError::InvalidInput(message.into())
    }

    /// Creates a DuplicateIdentifier error
    pub fn duplicate(kind: ProfileKind, identifier: impl Into<String>) -> Self {
        IdentityError::DuplicateIdentifier {
            kind,
            identifier: identifier.into(),
        }
    }

    /// Returns true if this error indicates a missing entity
    pub fn is_not_found(&self) -> bool {
        matches!(self, IdentityError::NotFound { .. })
    }
}
