//! Policy-layer errors
//!
//! Evaluation itself never fails: every proof lookup failure folds into a
//! [`Decision`](crate::Decision). These errors cover the record lifecycle
//! around it (integrity checks, fetching and parsing TXT records).

use dpf_core::{DomainName, DpfError};

/// A TXT record that does not carry a usable policy root.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecordError {
    #[error("record is not tagged {tag}")]
    MissingTag { tag: &'static str },

    #[error("malformed policy root: {reason}")]
    MalformedRoot { reason: String },

    #[error("{count} policy records published for one name")]
    Ambiguous { count: usize },
}

/// Failure reported by a [`RecordSource`](crate::RecordSource).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecordSourceError {
    #[error("record source unavailable: {message}")]
    Unavailable { message: String },
}

impl RecordSourceError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PolicyError {
    /// Internal invariant of a policy record violated
    #[error("policy record corrupt: {reason}")]
    Corrupt { reason: &'static str },

    #[error(transparent)]
    Record(#[from] RecordError),

    #[error(transparent)]
    RecordSource(#[from] RecordSourceError),

    #[error("record lookup for {domain} timed out")]
    RecordTimeout { domain: DomainName },

    #[error("no record source configured")]
    NoRecordSource,
}

pub type PolicyResult<T> = std::result::Result<T, PolicyError>;

impl From<PolicyError> for DpfError {
    fn from(err: PolicyError) -> Self {
        let message = err.to_string();
        match err {
            PolicyError::Corrupt { .. } => DpfError::corrupt(message),
            PolicyError::Record(_) => DpfError::invalid(message),
            PolicyError::RecordSource(_) => DpfError::unavailable(message),
            PolicyError::RecordTimeout { .. } => DpfError::timeout(message),
            PolicyError::NoRecordSource => DpfError::config(message),
        }
    }
}
