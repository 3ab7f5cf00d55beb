use thiserror::Error;

use stockroom_core::{DomainError, ItemId, SlipId};

use crate::store::StoreError;

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Error surfaced by engine and catalog operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// A referenced item does not exist.
    #[error("item not found: {0}")]
    ItemNotFound(ItemId),

    /// The target packing slip does not exist.
    #[error("packing slip not found: {0}")]
    SlipNotFound(SlipId),

    /// Missing or malformed input.
    #[error("validation failed: {0}")]
    Validation(String),

    /// The operation would break a domain rule.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    /// Numbering or uniqueness conflict.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The backing store failed; nothing is retried.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<DomainError> for ServiceError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::Validation(msg) => ServiceError::Validation(msg),
            DomainError::InvalidId(msg) => ServiceError::Validation(msg),
            DomainError::InvariantViolation(msg) => ServiceError::InvariantViolation(msg),
            DomainError::Conflict(msg) => ServiceError::Conflict(msg),
        }
    }
}
