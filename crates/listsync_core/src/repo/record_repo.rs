//! Record repository contract.
//!
//! # Responsibility
//! - Describe fetch-all/create/delete against one remote collection.
//! - Classify failures into transport, decoding, encoding, rejection and
//!   validation errors.

use crate::model::record::{Record, ValidationError};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Remote operation issued by a repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RepoOperation {
    FetchAll,
    Create,
    Delete,
}

impl RepoOperation {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FetchAll => "fetch_all",
            Self::Create => "create",
            Self::Delete => "delete",
        }
    }

    /// HTTP status the backend answers with on success.
    pub fn expected_status(self) -> u16 {
        match self {
            Self::FetchAll => 200,
            Self::Create => 201,
            Self::Delete => 204,
        }
    }

    pub fn http_method(self) -> &'static str {
        match self {
            Self::FetchAll => "GET",
            Self::Create => "POST",
            Self::Delete => "DELETE",
        }
    }
}

impl Display for RepoOperation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Repository failure.
#[derive(Debug)]
pub enum RepoError {
    /// Connection refused, DNS, TLS, timeout or body read failure.
    Transport(String),
    /// Response body does not match the expected record shape.
    Decoding(String),
    /// Record could not be serialized into a request body.
    Encoding(String),
    /// Backend answered with a status other than the expected one.
    ServerRejected { operation: RepoOperation, status: u16 },
    /// Record failed validation; no request was sent.
    Validation(ValidationError),
}

impl RepoError {
    /// Status code carried by `ServerRejected`, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::ServerRejected { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Stable short code for logs and FFI envelopes.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Transport(_) => "transport",
            Self::Decoding(_) => "decoding",
            Self::Encoding(_) => "encoding",
            Self::ServerRejected { .. } => "server_rejected",
            Self::Validation(_) => "validation",
        }
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Transport(message) => write!(f, "transport failure: {message}"),
            Self::Decoding(message) => write!(f, "unexpected response payload: {message}"),
            Self::Encoding(message) => write!(f, "failed to encode request body: {message}"),
            Self::ServerRejected { operation, status } => write!(
                f,
                "server rejected {operation} with status {status} (expected {})",
                operation.expected_status()
            ),
            Self::Validation(err) => write!(f, "{err}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Data access contract for one remote record collection.
///
/// Implementations are shared between threads by stores, so every method
/// takes `&self`.
pub trait RecordRepository<E: Record>: Send + Sync {
    /// Fetches the whole collection in backend order.
    fn fetch_all(&self) -> RepoResult<Vec<E>>;

    /// Creates one record. The backend's copy is not returned.
    fn create(&self, record: &E) -> RepoResult<()>;

    /// Deletes the record identified by `id`.
    fn delete(&self, id: &E::Id) -> RepoResult<()>;
}

#[cfg(test)]
mod tests {
    use super::{RepoError, RepoOperation};
    use crate::model::record::{RecordKind, ValidationError};
    use std::error::Error;

    #[test]
    fn server_rejected_reports_expected_status() {
        let err = RepoError::ServerRejected {
            operation: RepoOperation::Create,
            status: 500,
        };
        assert_eq!(err.status(), Some(500));
        assert_eq!(
            err.to_string(),
            "server rejected create with status 500 (expected 201)"
        );
    }

    #[test]
    fn validation_error_is_exposed_as_source() {
        let err = RepoError::from(ValidationError::BlankField {
            kind: RecordKind::Song,
            field: "title",
        });
        assert_eq!(err.code(), "validation");
        assert!(err.source().is_some());
    }
}
