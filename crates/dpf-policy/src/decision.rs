//! Allow/deny outcomes with their reasons

use dpf_core::{InvalidInteraction, Leaf, RootHash};
use std::fmt;

/// Outcome of evaluating one interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allowed(Allowance),
    Denied(Denial),
}

/// Why an interaction was allowed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Allowance {
    /// A membership proof for `leaf` verified under `root`
    Matched { root: RootHash, leaf: Leaf },
    /// No domain in the origin's hierarchy publishes a policy
    NoPolicy,
}

/// Why an interaction was denied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Denial {
    /// The request itself is malformed
    InvalidInteraction(InvalidInteraction),
    /// Every proof lookup was answered and none verified
    NoMatchingPattern,
    /// At least one proof lookup timed out and none verified
    SourceTimeout,
    /// At least one proof lookup failed at the source and none verified
    SourceUnavailable { message: String },
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allowed(_))
    }

    pub fn is_denied(&self) -> bool {
        !self.is_allowed()
    }

    pub fn denial(&self) -> Option<&Denial> {
        match self {
            Decision::Denied(denial) => Some(denial),
            Decision::Allowed(_) => None,
        }
    }
}

impl Denial {
    /// The verdict could not be established rather than being an explicit
    /// deny. Callers still block the interaction.
    pub fn is_undeterminable(&self) -> bool {
        matches!(self, Denial::SourceTimeout | Denial::SourceUnavailable { .. })
    }
}

impl From<InvalidInteraction> for Decision {
    fn from(err: InvalidInteraction) -> Self {
        Decision::Denied(Denial::InvalidInteraction(err))
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Decision::Allowed(Allowance::Matched { root, .. }) => {
                write!(f, "allowed by policy root {}", root)
            }
            Decision::Allowed(Allowance::NoPolicy) => write!(f, "allowed, no policy published"),
            Decision::Denied(denial) => write!(f, "denied: {}", denial),
        }
    }
}

impl fmt::Display for Denial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Denial::InvalidInteraction(err) => write!(f, "invalid interaction ({})", err),
            Denial::NoMatchingPattern => write!(f, "no published pattern matches"),
            Denial::SourceTimeout => write!(f, "proof source timed out"),
            Denial::SourceUnavailable { message } => {
                write!(f, "proof source unavailable ({})", message)
            }
        }
    }
}
