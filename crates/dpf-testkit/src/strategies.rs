//! Property test strategies for DPF types
//!
//! Value domains are small so that independently generated
//! patterns and interactions collide often enough to exercise matching.

use proptest::prelude::*;

// Re-export proptest for convenience
pub use proptest;

use dpf_core::interaction::{
    TransactionPattern, TransactionRequest, TypedDataPattern, TypedDataRequest,
};
use dpf_core::{Address, Amount, Field, Interaction, Pattern, Selector, B256};

pub fn arb_address() -> impl Strategy<Value = Address> {
    (0u8..3).prop_map(|b| Address([b; 20]))
}

pub fn arb_selector() -> impl Strategy<Value = Selector> {
    prop_oneof![
        Just(Selector::Empty),
        (0u8..2).prop_map(|b| Selector::Function([b, 0xab, 0xcd, 0xef])),
    ]
}

pub fn arb_word() -> impl Strategy<Value = B256> {
    (0u8..3).prop_map(|b| B256::new([b; 32]))
}

pub fn arb_interaction() -> impl Strategy<Value = Interaction> {
    prop_oneof![
        Just(Interaction::SignMessage),
        Just(Interaction::SignData),
        (1u64..3, arb_address(), (0u128..3).prop_map(Amount), arb_selector()).prop_map(
            |(chain_id, to, value, selector)| {
                Interaction::SendTransaction(TransactionRequest {
                    chain_id,
                    to,
                    value,
                    selector,
                })
            }
        ),
        (arb_word(), arb_word()).prop_map(|(domain_separator, type_hash)| {
            Interaction::SignTypedData(TypedDataRequest {
                domain_separator,
                type_hash,
            })
        }),
    ]
}

pub fn arb_field<T: std::fmt::Debug + Clone + 'static>(
    value: impl Strategy<Value = T> + 'static,
) -> impl Strategy<Value = Field<T>> {
    prop_oneof![1 => Just(Field::Any), 2 => value.prop_map(Field::Exact)]
}

pub fn arb_pattern() -> impl Strategy<Value = Pattern> {
    prop_oneof![
        Just(Pattern::SignMessage),
        Just(Pattern::SignData),
        (
            arb_field(1u64..3),
            arb_field(arb_address()),
            arb_field((0u128..3).prop_map(Amount)),
            arb_field(arb_selector()),
        )
            .prop_map(|(chain_id, to, value, selector)| {
                Pattern::SendTransaction(TransactionPattern {
                    chain_id,
                    to,
                    value,
                    selector,
                })
            }),
        (arb_field(arb_word()), arb_field(arb_word())).prop_map(|(domain_separator, type_hash)| {
            Pattern::SignTypedData(TypedDataPattern {
                domain_separator,
                type_hash,
            })
        }),
    ]
}

pub fn arb_patterns(max: usize) -> impl Strategy<Value = Vec<Pattern>> {
    prop::collection::vec(arb_pattern(), 0..max)
}
