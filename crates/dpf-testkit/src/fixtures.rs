//! Common fixtures
//!
//! Addresses, requests and configuration used across test suites.

use dpf_core::interaction::{TransactionPattern, TransactionRequest, TypedDataRequest};
use dpf_core::{
    Address, Amount, DomainName, DpfConfig, Field, Interaction, Leaf, Pattern, RootHash, Selector,
    Timestamp, B256,
};

/// Seaport 1.5 on Ethereum mainnet, `0x00000000000000ADc04C56Bf30aC9d3c0aAF14dC`.
pub const SEAPORT: Address = Address([
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xad, 0xc0, 0x4c, 0x56, 0xbf, 0x30, 0xac, 0x9d,
    0x3c, 0x0a, 0xaf, 0x14, 0xdc,
]);

/// `fulfillBasicOrder(...)` selector used by the marketplace scenarios.
pub const FULFILL_SELECTOR: [u8; 4] = [0xab, 0xcd, 0xef, 0x01];

pub const HOUR_MS: u64 = 60 * 60 * 1000;
pub const MINUTE_MS: u64 = 60 * 1000;

pub fn domain(name: &str) -> DomainName {
    DomainName::parse(name).unwrap()
}

pub fn at_ms(ms: u64) -> Timestamp {
    Timestamp::from_millis(ms)
}

/// A root no trie will ever produce.
pub fn fake_root(byte: u8) -> RootHash {
    RootHash::new([byte; 32])
}

/// Default configuration with proof and record timeouts short enough for tests.
pub fn test_config() -> DpfConfig {
    DpfConfig {
        proof_timeout_ms: 50,
        record_timeout_ms: 50,
        ..DpfConfig::default()
    }
}

/// A mainnet call to Seaport carrying `selector` and no value.
pub fn seaport_call(selector: Selector) -> Interaction {
    Interaction::SendTransaction(TransactionRequest {
        chain_id: 1,
        to: SEAPORT,
        value: Amount::ZERO,
        selector,
    })
}

/// Pattern admitting exactly `seaport_call(Selector::Empty)`.
pub fn seaport_plain_pattern() -> Pattern {
    Pattern::exact(&seaport_call(Selector::Empty))
}

/// Leaf of [`seaport_plain_pattern`].
pub fn seaport_leaf() -> Leaf {
    seaport_plain_pattern().to_leaf()
}

/// Pattern admitting any Seaport call on mainnet.
pub fn seaport_any_call_pattern() -> Pattern {
    Pattern::SendTransaction(TransactionPattern {
        chain_id: Field::Exact(1),
        to: Field::Exact(SEAPORT),
        value: Field::Any,
        selector: Field::Any,
    })
}

pub fn typed_data(domain_separator: u8, type_hash: u8) -> Interaction {
    Interaction::SignTypedData(TypedDataRequest {
        domain_separator: B256::new([domain_separator; 32]),
        type_hash: B256::new([type_hash; 32]),
    })
}

/// Leaves of `patterns`, ready to publish.
pub fn leaves_of(patterns: &[Pattern]) -> Vec<Leaf> {
    patterns.iter().map(Pattern::to_leaf).collect()
}
