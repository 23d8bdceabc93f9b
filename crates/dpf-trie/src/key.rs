//! Trie keys and node hashing
//!
//! A leaf's position in the trie is the SHA-256 of its bytes read as 64 hex
//! nibbles. Because the key is derived from content alone, the trie shape for a
//! given leaf set never depends on insertion order.

use dpf_core::hash::{tagged_hash, Hash32, HASH_LEN};
use dpf_core::Leaf;
use std::fmt;

/// Nibbles per key.
pub const KEY_NIBBLES: usize = HASH_LEN * 2;

/// Branch fan-out.
pub const BRANCH_WIDTH: usize = 16;

// Domain separation tags, one per hashed object kind.
const TAG_LEAF_KEY: u8 = 0x00;
const TAG_LEAF_NODE: u8 = 0x01;
const TAG_EXTENSION: u8 = 0x02;
const TAG_BRANCH: u8 = 0x03;

/// Content-derived position of a leaf.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LeafKey([u8; HASH_LEN]);

impl LeafKey {
    /// Key of `leaf`: `H(0x00 || leaf bytes)`.
    pub fn of(leaf: &Leaf) -> Self {
        Self(tagged_hash(TAG_LEAF_KEY, &[leaf.as_bytes()]))
    }

    pub fn as_bytes(&self) -> &[u8; HASH_LEN] {
        &self.0
    }

    /// Nibble at `index`, high nibble of each byte first.
    pub fn nibble(&self, index: usize) -> u8 {
        let byte = self.0[index / 2];
        if index % 2 == 0 {
            byte >> 4
        } else {
            byte & 0x0f
        }
    }

    /// All 64 nibbles.
    pub fn nibbles(&self) -> [u8; KEY_NIBBLES] {
        let mut out = [0u8; KEY_NIBBLES];
        for (index, slot) in out.iter_mut().enumerate() {
            *slot = self.nibble(index);
        }
        out
    }
}

impl fmt::Debug for LeafKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LeafKey({})", hex::encode(&self.0[..6]))
    }
}

/// Hash of a leaf node holding the remaining `path` of `key`.
pub(crate) fn leaf_node_hash(path: &[u8], key: &LeafKey) -> Hash32 {
    Hash32::new(tagged_hash(
        TAG_LEAF_NODE,
        &[&[path_len(path)], path, key.as_bytes()],
    ))
}

/// Hash of an extension node sharing `path` above `child`.
pub(crate) fn extension_hash(path: &[u8], child: &Hash32) -> Hash32 {
    Hash32::new(tagged_hash(
        TAG_EXTENSION,
        &[&[path_len(path)], path, child.as_bytes()],
    ))
}

/// Hash of a branch: occupancy bitmap then the present children in slot order.
pub(crate) fn branch_hash(children: &[Option<Hash32>]) -> Hash32 {
    let mut bitmap: u16 = 0;
    let mut body = Vec::with_capacity(children.len() * HASH_LEN);
    for (slot, child) in children.iter().enumerate() {
        if let Some(hash) = child {
            bitmap |= 1 << slot;
            body.extend_from_slice(hash.as_bytes());
        }
    }
    Hash32::new(tagged_hash(TAG_BRANCH, &[&bitmap.to_be_bytes(), &body]))
}

fn path_len(path: &[u8]) -> u8 {
    // Paths are suffixes of a 64-nibble key
    debug_assert!(path.len() <= KEY_NIBBLES);
    path.len() as u8
}
