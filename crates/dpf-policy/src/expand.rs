//! Wildcard expansion
//!
//! A publisher's trie holds patterns, some fields of which are wildcards. To
//! decide whether any of them covers a concrete request without downloading
//! the whole list, the verifier looks up every pattern that *could* cover it:
//! each wildcard-capable field is either the requested value or the wildcard.
//! That is `2^k` lookups for a method with `k` such fields: 16 for
//! `SendTransaction`, 4 for `SignTypedData`, 1 for the plain signing methods.

use dpf_core::interaction::{Field, TransactionPattern, TypedDataPattern};
use dpf_core::{Interaction, Leaf, Pattern};
use std::collections::BTreeSet;

/// Largest candidate set any method produces.
pub const MAX_CANDIDATES: usize = 1 << 4;

/// Every pattern that covers `interaction`, one per wildcard subset.
pub fn candidate_patterns(interaction: &Interaction) -> Vec<Pattern> {
    let k = interaction.method().wildcard_fields();
    debug_assert!(1 << k <= MAX_CANDIDATES);
    (0u32..1 << k)
        .map(|mask| substitute(interaction, mask))
        .collect()
}

/// Leaves to look up for `interaction`; exactly `2^k` distinct entries.
pub fn expand(interaction: &Interaction) -> BTreeSet<Leaf> {
    candidate_patterns(interaction)
        .iter()
        .map(Pattern::to_leaf)
        .collect()
}

fn pick<T>(value: T, mask: u32, bit: u32) -> Field<T> {
    if mask & (1 << bit) != 0 {
        Field::Any
    } else {
        Field::Exact(value)
    }
}

/// Bit `i` of `mask` set means field `i` becomes the wildcard.
fn substitute(interaction: &Interaction, mask: u32) -> Pattern {
    match interaction {
        Interaction::SignMessage => Pattern::SignMessage,
        Interaction::SignData => Pattern::SignData,
        Interaction::SendTransaction(tx) => Pattern::SendTransaction(TransactionPattern {
            chain_id: pick(tx.chain_id, mask, 0),
            to: pick(tx.to, mask, 1),
            value: pick(tx.value, mask, 2),
            selector: pick(tx.selector, mask, 3),
        }),
        Interaction::SignTypedData(td) => Pattern::SignTypedData(TypedDataPattern {
            domain_separator: pick(td.domain_separator, mask, 0),
            type_hash: pick(td.type_hash, mask, 1),
        }),
    }
}
