//! Errors reported by store adapters.

use thiserror::Error;

/// Errors that can occur inside a store adapter.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write. Nothing was committed.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The write targets an approved timesheet entry. Nothing was committed.
    #[error("Locked: {0}")]
    Locked(String),

    /// A row the write depends on disappeared.
    #[error("Record not found: {0}")]
    NotFound(String),

    /// Any other backend failure.
    #[error("Database error: {0}")]
    Database(String),
}

impl StoreError {
    /// Returns true if the write lost a uniqueness race.
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflict_detection() {
        assert!(StoreError::Conflict("vouchers".into()).is_conflict());
        assert!(!StoreError::Database("down".into()).is_conflict());
        assert_eq!(
            StoreError::Conflict("dup".into()).to_string(),
            "Conflict: dup"
        );
        assert!(!StoreError::Locked("entry 4".into()).is_conflict());
    }
}
