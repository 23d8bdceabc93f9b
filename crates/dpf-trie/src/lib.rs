//! # DPF Trie - Layer 2: Commitments
//!
//! A Merkle-Patricia trie over permission leaves. Publishers build a trie from
//! their allow-list and announce its root; verifiers check individual
//! membership proofs against that root without ever seeing the full list.
//!
//! - [`build_root`] / [`PatriciaTrie`]: deterministic construction
//! - [`membership_proof`] / [`verify`]: proof generation and checking
//! - [`ProofSource`]: where verifiers fetch proofs from
//! - [`LeafSetStore`]: an in-memory proof source for publishers and tests

pub mod errors;
pub mod key;
pub mod proof;
pub mod source;
pub mod store;
pub mod trie;

pub use errors::{TrieError, TrieResult};
pub use key::LeafKey;
pub use proof::{verify, verify_encoded, MembershipProof, ProofStep};
pub use source::{ProofSource, ProofSourceError};
pub use store::LeafSetStore;
pub use trie::{build_root, membership_proof, PatriciaTrie};
