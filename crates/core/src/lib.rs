//! Shared primitives for all Rust crates in the todo service.

#![forbid(unsafe_code)]

/// Validated row identifiers.
pub mod ids;

use std::error::Error as StdError;

use thiserror::Error;

pub use ids::{
    AccountId, AccountSubscriptionPlanId, ApiClientId, AuditLogEntryId, ItemId, MembershipId,
    UserId, WebhookId,
};

/// Result type used across todo crates.
pub type AppResult<T> = Result<T, AppError>;

/// Boxed driver error kept as the source of storage failures.
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Common application error categories.
#[derive(Debug, Error)]
pub enum AppError {
    /// Invalid input or violated invariant. Detected before any I/O.
    #[error("validation error: {0}")]
    Validation(String),

    /// Requested resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Write operation conflicts with existing state.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Caller lacks the capability required by the operation.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// A transaction or connection could not be opened.
    #[error("database unavailable: {context}")]
    DatabaseUnavailable {
        /// Operation that was attempted.
        context: String,
        /// Underlying driver error.
        #[source]
        source: BoxError,
    },

    /// A read query failed for a reason other than "no rows".
    #[error("database read failed: {context}")]
    Read {
        /// Operation that was attempted.
        context: String,
        /// Underlying driver error.
        #[source]
        source: BoxError,
    },

    /// A mutation failed inside a transaction. The transaction was rolled back.
    #[error("write failed: {context}")]
    Write {
        /// Operation that was attempted.
        context: String,
        /// Underlying driver error.
        #[source]
        source: BoxError,
    },

    /// The audit entry for a mutation could not be written. The transaction was rolled back.
    #[error("audit log write failed: {context}")]
    Audit {
        /// Operation that was attempted.
        context: String,
        /// Underlying driver error.
        #[source]
        source: BoxError,
    },

    /// Commit failed after the writes were applied; the outcome is unknown.
    #[error("commit failed: {context}")]
    Commit {
        /// Operation that was attempted.
        context: String,
        /// Underlying driver error.
        #[source]
        source: BoxError,
    },

    /// Internal unexpected error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Wraps a connection or `BEGIN` failure.
    pub fn database_unavailable<E>(context: impl Into<String>, source: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self::DatabaseUnavailable {
            context: context.into(),
            source: Box::new(source),
        }
    }

    /// Wraps a failed read query.
    pub fn read<E>(context: impl Into<String>, source: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self::Read {
            context: context.into(),
            source: Box::new(source),
        }
    }

    /// Wraps a failed mutation.
    pub fn write<E>(context: impl Into<String>, source: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self::Write {
            context: context.into(),
            source: Box::new(source),
        }
    }

    /// Wraps a failed audit log insert.
    pub fn audit<E>(context: impl Into<String>, source: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self::Audit {
            context: context.into(),
            source: Box::new(source),
        }
    }

    /// Wraps a failed `COMMIT`.
    pub fn commit<E>(context: impl Into<String>, source: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self::Commit {
            context: context.into(),
            source: Box::new(source),
        }
    }

    /// Returns true when the caller cannot know whether the writes persisted.
    ///
    /// Such failures must not be retried blindly.
    #[must_use]
    pub fn is_ambiguous_outcome(&self) -> bool {
        matches!(self, Self::Commit { .. })
    }

    /// Returns true for the "no such row" category.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Returns the wrapped driver error when it is of type `E`.
    #[must_use]
    pub fn source_as<E>(&self) -> Option<&E>
    where
        E: StdError + 'static,
    {
        match self {
            Self::DatabaseUnavailable { source, .. }
            | Self::Read { source, .. }
            | Self::Write { source, .. }
            | Self::Audit { source, .. }
            | Self::Commit { source, .. } => source.downcast_ref::<E>(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error as _;
    use std::io;

    use super::AppError;

    #[test]
    fn wrapped_driver_error_is_reachable_by_type() {
        let error = AppError::write(
            "creating item",
            io::Error::new(io::ErrorKind::BrokenPipe, "connection reset"),
        );

        let io_error = error.source_as::<io::Error>();
        assert!(io_error.is_some());
        assert_eq!(
            io_error.map(io::Error::kind),
            Some(io::ErrorKind::BrokenPipe)
        );
        assert!(error.source().is_some());
    }

    #[test]
    fn only_commit_failures_are_ambiguous() {
        let commit = AppError::commit("committing", io::Error::other("timeout"));
        let audit = AppError::audit("auditing", io::Error::other("timeout"));

        assert!(commit.is_ambiguous_outcome());
        assert!(!audit.is_ambiguous_outcome());
        assert!(!AppError::NotFound("item".to_owned()).is_ambiguous_outcome());
    }

    #[test]
    fn string_categories_have_no_driver_source() {
        let error = AppError::Validation("bad id".to_owned());
        assert!(error.source_as::<io::Error>().is_none());
    }
}
