//! # DPF Core - Layer 1: Foundation
//!
//! Shared vocabulary for the dApp permission framework: the interaction model
//! and its canonical leaf encoding, hashing, timestamps, domain names, the
//! unified error type and runtime configuration.
//!
//! Nothing here performs I/O or holds mutable state; higher layers build the
//! trie (`dpf-trie`) and the policy evaluator (`dpf-policy`) on top.

pub mod config;
pub mod domain;
pub mod errors;
pub mod hash;
pub mod interaction;
pub mod time;

pub use config::DpfConfig;
pub use domain::{DomainError, DomainName};
pub use errors::{DpfError, Result};
pub use hash::{hash, tagged_hash, Hash32, RootHash};
pub use interaction::{
    canonical_bytes, matches, validate, Address, Amount, Field, Interaction, InvalidInteraction,
    Leaf, Method, Pattern, PatternSet, RawInteraction, Selector, B256,
};
pub use time::Timestamp;
