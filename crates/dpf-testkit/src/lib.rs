//! DPF Testing Infrastructure
//!
//! Shared fixtures, proptest strategies and proof-source doubles for the
//! workspace's test suites.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
//!
//! # Usage
//!
//! ```toml
//! [dev-dependencies]
//! dpf-testkit = { workspace = true }
//! ```
//!
//! ```rust,no_run
//! use dpf_testkit::*;
//!
//! #[tokio::test]
//! async fn my_test() {
//!     init_test_tracing();
//!     let store = dpf_trie::LeafSetStore::new();
//!     let root = store.publish([&seaport_leaf()]).await;
//!     // ... test logic
//! }
//! ```

pub mod fixtures;
pub mod logging;
pub mod sources;
pub mod strategies;

pub use fixtures::*;
pub use logging::init_test_tracing;
pub use sources::{Scripted, ScriptedSource};
