//! # DPF Policy - Layer 3: Decisions
//!
//! Turns published commitments into allow/deny decisions for a wallet:
//!
//! - [`expand`]: the `2^k` wildcard candidates covering one interaction
//! - [`PolicyRecord`] / [`PolicyRegistry`]: per-domain roots with a grace
//!   window after every rotation
//! - [`PermissionEvaluator`]: proof fetching and verification
//! - [`parse_txt_record`] / [`RecordSource`]: the `v=dpf1` DNS announcement
//! - [`PermissionService`]: hierarchy resolution and record refresh on top

pub mod decision;
pub mod dns;
pub mod errors;
pub mod evaluator;
pub mod expand;
pub mod record;
pub mod registry;
pub mod service;

pub use decision::{Allowance, Decision, Denial};
pub use dns::{parse_txt_record, select_policy_record, RecordSource, RECORD_TAG};
pub use errors::{PolicyError, PolicyResult, RecordError, RecordSourceError};
pub use evaluator::PermissionEvaluator;
pub use expand::{expand, candidate_patterns, MAX_CANDIDATES};
pub use record::{PolicyRecord, GRACE_WINDOW};
pub use registry::PolicyRegistry;
pub use service::PermissionService;
