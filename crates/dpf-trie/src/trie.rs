//! Patricia trie construction and proof generation
//!
//! The trie is built in one pass from a sorted, de-duplicated key set:
//!
//! - one key left: a leaf node holding the rest of the key
//! - every key shares the next nibbles: an extension over those nibbles
//! - otherwise: a branch, one child per distinct next nibble
//!
//! The result is canonical: the same leaf set always yields the same shape and
//! therefore the same root, whatever order the leaves arrived in.

use dpf_core::hash::Hash32;
use dpf_core::{Leaf, RootHash};
use std::collections::BTreeMap;

use crate::errors::{TrieError, TrieResult};
use crate::key::{branch_hash, extension_hash, leaf_node_hash, LeafKey, BRANCH_WIDTH};
use crate::proof::{MembershipProof, ProofStep};

#[derive(Debug, Clone)]
enum Node {
    Leaf {
        key: LeafKey,
        hash: Hash32,
    },
    Extension {
        path: Vec<u8>,
        child: Box<Node>,
        hash: Hash32,
    },
    Branch {
        children: [Option<Box<Node>>; BRANCH_WIDTH],
        hash: Hash32,
    },
}

impl Node {
    fn hash(&self) -> Hash32 {
        match self {
            Node::Leaf { hash, .. } | Node::Extension { hash, .. } | Node::Branch { hash, .. } => {
                *hash
            }
        }
    }

    /// Build the subtree for `keys` (sorted, distinct, non-empty) below `depth`.
    fn build(keys: &[LeafKey], depth: usize) -> Node {
        let first = &keys[0];
        if keys.len() == 1 {
            let path = first.nibbles()[depth..].to_vec();
            return Node::Leaf {
                key: *first,
                hash: leaf_node_hash(&path, first),
            };
        }

        // Sorted input: the prefix shared by all keys is the one shared by the ends
        let last = &keys[keys.len() - 1];
        let mut shared = 0;
        while first.nibble(depth + shared) == last.nibble(depth + shared) {
            shared += 1;
        }

        if shared > 0 {
            let path = first.nibbles()[depth..depth + shared].to_vec();
            let child = Node::build(keys, depth + shared);
            let hash = extension_hash(&path, &child.hash());
            return Node::Extension {
                path,
                child: Box::new(child),
                hash,
            };
        }

        let mut children: [Option<Box<Node>>; BRANCH_WIDTH] = Default::default();
        let mut start = 0;
        while start < keys.len() {
            let slot = keys[start].nibble(depth);
            let end = start
                + keys[start..]
                    .iter()
                    .take_while(|key| key.nibble(depth) == slot)
                    .count();
            children[slot as usize] = Some(Box::new(Node::build(&keys[start..end], depth + 1)));
            start = end;
        }
        let hashes: Vec<Option<Hash32>> = children
            .iter()
            .map(|child| child.as_ref().map(|node| node.hash()))
            .collect();
        Node::Branch {
            children,
            hash: branch_hash(&hashes),
        }
    }
}

/// An in-memory Patricia trie over a leaf set.
#[derive(Debug, Clone)]
pub struct PatriciaTrie {
    leaves: BTreeMap<LeafKey, Leaf>,
    root: Option<Node>,
}

impl PatriciaTrie {
    /// Build from any collection of leaves; duplicates collapse.
    pub fn from_leaves<'a, I>(leaves: I) -> Self
    where
        I: IntoIterator<Item = &'a Leaf>,
    {
        let leaves: BTreeMap<LeafKey, Leaf> = leaves
            .into_iter()
            .map(|leaf| (LeafKey::of(leaf), leaf.clone()))
            .collect();
        let keys: Vec<LeafKey> = leaves.keys().copied().collect();
        let root = (!keys.is_empty()).then(|| Node::build(&keys, 0));
        Self { leaves, root }
    }

    /// Root digest; all zeroes for an empty trie.
    pub fn root(&self) -> RootHash {
        self.root.as_ref().map_or(Hash32::ZERO, Node::hash)
    }

    pub fn len(&self) -> usize {
        self.leaves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.leaves.is_empty()
    }

    pub fn contains(&self, leaf: &Leaf) -> bool {
        self.leaves.contains_key(&LeafKey::of(leaf))
    }

    /// Leaves in key order.
    pub fn leaves(&self) -> impl Iterator<Item = &Leaf> {
        self.leaves.values()
    }

    /// Path from the root down to `target`.
    pub fn prove(&self, target: &Leaf) -> TrieResult<MembershipProof> {
        let key = LeafKey::of(target);
        let nibbles = key.nibbles();
        let mut node = self.root.as_ref().ok_or(TrieError::NotFound)?;
        let mut depth = 0;
        let mut steps = Vec::new();

        loop {
            match node {
                Node::Leaf { key: found, .. } => {
                    return if *found == key {
                        Ok(MembershipProof::new(steps))
                    } else {
                        Err(TrieError::NotFound)
                    };
                }
                Node::Extension { path, child, .. } => {
                    let end = depth + path.len();
                    if nibbles.get(depth..end) != Some(path.as_slice()) {
                        return Err(TrieError::NotFound);
                    }
                    steps.push(ProofStep::Extension { path: path.clone() });
                    depth = end;
                    node = &**child;
                }
                Node::Branch { children, .. } => {
                    let slot = usize::from(*nibbles.get(depth).ok_or(TrieError::NotFound)?);
                    let next = children[slot].as_deref().ok_or(TrieError::NotFound)?;
                    let siblings = children
                        .iter()
                        .enumerate()
                        .map(|(index, child)| {
                            if index == slot {
                                None
                            } else {
                                child.as_ref().map(|sibling| sibling.hash())
                            }
                        })
                        .collect();
                    steps.push(ProofStep::Branch { siblings });
                    depth += 1;
                    node = next;
                }
            }
        }
    }
}

/// Root of the trie over `leaves`. Order and duplicates do not matter.
pub fn build_root<'a, I>(leaves: I) -> RootHash
where
    I: IntoIterator<Item = &'a Leaf>,
{
    PatriciaTrie::from_leaves(leaves).root()
}

/// Proof that `target` belongs to `leaves`, or [`TrieError::NotFound`].
pub fn membership_proof<'a, I>(leaves: I, target: &Leaf) -> TrieResult<MembershipProof>
where
    I: IntoIterator<Item = &'a Leaf>,
{
    PatriciaTrie::from_leaves(leaves).prove(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proof::verify;
    use dpf_core::interaction::{Field, TypedDataPattern};
    use dpf_core::{Pattern, B256};

    fn typed(n: u8) -> Leaf {
        Pattern::SignTypedData(TypedDataPattern {
            domain_separator: Field::Exact(B256::new([n; 32])),
            type_hash: Field::Any,
        })
        .to_leaf()
    }

    #[test]
    fn empty_trie_has_zero_root_and_no_members() {
        let trie = PatriciaTrie::from_leaves(std::iter::empty::<&Leaf>());
        assert_eq!(trie.root(), Hash32::ZERO);
        assert_eq!(trie.prove(&typed(1)), Err(TrieError::NotFound));
    }

    #[test]
    fn single_leaf_proof_is_empty() {
        let leaf = typed(1);
        let trie = PatriciaTrie::from_leaves([&leaf]);
        let proof = trie.prove(&leaf).unwrap();
        assert!(proof.steps().is_empty());
        assert!(verify(&proof, &leaf, &trie.root()));
    }

    #[test]
    fn duplicates_collapse() {
        let a = typed(1);
        let b = typed(2);
        let with_dupes = PatriciaTrie::from_leaves([&a, &b, &a]);
        assert_eq!(with_dupes.len(), 2);
        assert_eq!(with_dupes.root(), build_root([&b, &a]));
    }

    #[test]
    fn every_member_proves_and_verifies() {
        let leaves: Vec<Leaf> = (0..40).map(typed).collect();
        let trie = PatriciaTrie::from_leaves(&leaves);
        let root = trie.root();
        for leaf in &leaves {
            let proof = trie.prove(leaf).unwrap();
            assert!(verify(&proof, leaf, &root));
        }
    }

    #[test]
    fn absent_leaf_is_not_found() {
        let leaves: Vec<Leaf> = (0..8).map(typed).collect();
        assert_eq!(
            membership_proof(&leaves, &typed(200)),
            Err(TrieError::NotFound)
        );
    }

    #[test]
    fn root_changes_when_a_leaf_is_added() {
        let leaves: Vec<Leaf> = (0..5).map(typed).collect();
        let mut more = leaves.clone();
        more.push(typed(99));
        assert_ne!(build_root(&leaves), build_root(&more));
    }
}
