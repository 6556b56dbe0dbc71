//! Domain error model.

use thiserror::Error;

use crate::id::DocumentId;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic, business/domain failures (validation,
/// guards, invariants). Persistence concerns belong to the infrastructure layer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A user-correctable input problem (missing field, bad quantity, ...).
    #[error("validation failed: {0}")]
    Validation(String),

    /// A protected, system-generated record was targeted by a direct edit
    /// or delete.
    ///
    /// `document` is the record that owns it; changing or deleting that
    /// document is the only way to touch the protected record.
    #[error("movement {movement} was generated by document {document}; change or delete that document instead")]
    Guard { movement: String, document: DocumentId },

    /// Same as `Guard`, for a system-generated record whose owner is unknown.
    #[error("movement {movement} is system-generated and cannot be changed or deleted directly")]
    OrphanGuard { movement: String },

    /// A domain invariant was violated.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// A requested record was not found (domain-level).
    #[error("not found: {0}")]
    NotFound(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn guard(movement: impl Into<String>, document: DocumentId) -> Self {
        Self::Guard {
            movement: movement.into(),
            document,
        }
    }

    pub fn orphan_guard(movement: impl Into<String>) -> Self {
        Self::OrphanGuard {
            movement: movement.into(),
        }
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound(what.into())
    }

    /// True for errors the user can fix by editing their input.
    pub fn is_user_correctable(&self) -> bool {
        matches!(
            self,
            Self::Validation(_) | Self::Guard { .. } | Self::OrphanGuard { .. }
        )
    }
}
