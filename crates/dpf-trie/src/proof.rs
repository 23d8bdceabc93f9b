//! Membership proofs and their verification
//!
//! Proofs arrive from an external store and may be hostile. Verification is a
//! pure predicate: any shape inconsistency yields `false`, never a panic.

use bincode::Options;
use dpf_core::hash::Hash32;
use dpf_core::{Leaf, RootHash};
use serde::{Deserialize, Serialize};

use crate::errors::{TrieError, TrieResult};
use crate::key::{branch_hash, extension_hash, leaf_node_hash, LeafKey, BRANCH_WIDTH, KEY_NIBBLES};

/// One node on the path from the root towards the leaf.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProofStep {
    /// Nibbles shared by every key below this point
    Extension { path: Vec<u8> },
    /// Sibling hashes of a branch; the slot on the path is `None`
    Branch { siblings: Vec<Option<Hash32>> },
}

/// Root-to-leaf path for one leaf.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MembershipProof {
    steps: Vec<ProofStep>,
}

impl MembershipProof {
    pub fn new(steps: Vec<ProofStep>) -> Self {
        Self { steps }
    }

    pub fn steps(&self) -> &[ProofStep] {
        &self.steps
    }

    /// Wire form.
    pub fn to_bytes(&self) -> TrieResult<Vec<u8>> {
        bincode::DefaultOptions::new()
            .serialize(self)
            .map_err(|e| TrieError::codec(e.to_string()))
    }

    /// Decode the wire form, refusing inputs larger than `max_bytes`.
    pub fn from_bytes(bytes: &[u8], max_bytes: usize) -> TrieResult<Self> {
        if bytes.len() > max_bytes {
            return Err(TrieError::codec(format!(
                "proof of {} bytes exceeds limit of {max_bytes}",
                bytes.len()
            )));
        }
        bincode::DefaultOptions::new()
            .with_limit(max_bytes as u64)
            .deserialize(bytes)
            .map_err(|e| TrieError::codec(e.to_string()))
    }
}

/// Whether `proof` shows `target` under `expected_root`.
///
/// The target's key nibbles are replayed through the steps first. A proof is
/// rejected if a nibble is out of range, an extension is empty or diverges from
/// the key, an extension is not followed by a branch, a branch does not have
/// exactly sixteen slots, fills the on-path slot or has no other child, or the
/// steps consume more than the key. Only then are hashes recomputed bottom-up.
pub fn verify(proof: &MembershipProof, target: &Leaf, expected_root: &RootHash) -> bool {
    let key = LeafKey::of(target);
    let nibbles = key.nibbles();

    // Forward pass: shape checks, and the branch slot taken at each step
    let mut depth = 0;
    let mut slots = Vec::with_capacity(proof.steps.len());
    let mut after_extension = false;
    for step in &proof.steps {
        match step {
            ProofStep::Extension { path } => {
                if after_extension || path.is_empty() {
                    return false;
                }
                let end = depth + path.len();
                if end > KEY_NIBBLES || nibbles[depth..end] != path[..] {
                    return false;
                }
                slots.push(None);
                depth = end;
                after_extension = true;
            }
            ProofStep::Branch { siblings } => {
                if siblings.len() != BRANCH_WIDTH || depth >= KEY_NIBBLES {
                    return false;
                }
                let slot = usize::from(nibbles[depth]);
                if siblings[slot].is_some() || siblings.iter().all(Option::is_none) {
                    return false;
                }
                slots.push(Some(slot));
                depth += 1;
                after_extension = false;
            }
        }
    }
    // An extension always sits directly above a branch
    if after_extension {
        return false;
    }

    // Backward pass: recompute the root
    let mut current = leaf_node_hash(&nibbles[depth..], &key);
    for (step, slot) in proof.steps.iter().zip(slots).rev() {
        current = match (step, slot) {
            (ProofStep::Extension { path }, None) => extension_hash(path, &current),
            (ProofStep::Branch { siblings }, Some(slot)) => {
                let mut children = siblings.clone();
                children[slot] = Some(current);
                branch_hash(&children)
            }
            _ => return false,
        };
    }

    current == *expected_root
}

/// Decode `bytes` and [`verify`] the result; undecodable input is `false`.
pub fn verify_encoded(
    bytes: &[u8],
    target: &Leaf,
    expected_root: &RootHash,
    max_bytes: usize,
) -> bool {
    match MembershipProof::from_bytes(bytes, max_bytes) {
        Ok(proof) => verify(&proof, target, expected_root),
        Err(err) => {
            tracing::debug!(error = %err, "discarding undecodable proof");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trie::PatriciaTrie;
    use dpf_core::interaction::{Field, TransactionPattern};
    use dpf_core::{Address, Pattern};

    const LIMIT: usize = 64 * 1024;

    fn leaf(n: u8) -> Leaf {
        Pattern::SendTransaction(TransactionPattern {
            chain_id: Field::Exact(u64::from(n)),
            to: Field::Exact(Address([n; 20])),
            value: Field::Any,
            selector: Field::Any,
        })
        .to_leaf()
    }

    fn fixture() -> (PatriciaTrie, Vec<Leaf>) {
        let leaves: Vec<Leaf> = (0..64).map(leaf).collect();
        (PatriciaTrie::from_leaves(&leaves), leaves)
    }

    /// First proof in the fixture that contains at least one extension.
    fn proof_with_extension(trie: &PatriciaTrie, leaves: &[Leaf]) -> Option<(Leaf, MembershipProof)> {
        leaves.iter().find_map(|leaf| {
            let proof = trie.prove(leaf).ok()?;
            proof
                .steps()
                .iter()
                .any(|step| matches!(step, ProofStep::Extension { .. }))
                .then(|| (leaf.clone(), proof))
        })
    }

    #[test]
    fn proof_for_other_leaf_fails() {
        let (trie, leaves) = fixture();
        let proof = trie.prove(&leaves[0]).unwrap();
        assert!(!verify(&proof, &leaves[1], &trie.root()));
    }

    #[test]
    fn wrong_root_fails() {
        let (trie, leaves) = fixture();
        let proof = trie.prove(&leaves[3]).unwrap();
        assert!(!verify(&proof, &leaves[3], &Hash32::new([7; 32])));
    }

    #[test]
    fn tampered_sibling_fails() {
        let (trie, leaves) = fixture();
        let mut proof = trie.prove(&leaves[5]).unwrap();
        for step in &mut proof.steps {
            if let ProofStep::Branch { siblings } = step {
                if let Some(slot) = siblings.iter_mut().find(|s| s.is_some()) {
                    *slot = Some(Hash32::new([0xee; 32]));
                    break;
                }
            }
        }
        assert!(!verify(&proof, &leaves[5], &trie.root()));
    }

    #[test]
    fn short_branch_is_rejected() {
        let (trie, leaves) = fixture();
        let mut proof = trie.prove(&leaves[9]).unwrap();
        if let Some(ProofStep::Branch { siblings }) = proof.steps.first_mut() {
            siblings.pop();
        }
        assert!(!verify(&proof, &leaves[9], &trie.root()));
    }

    #[test]
    fn filled_on_path_slot_is_rejected() {
        let (trie, leaves) = fixture();
        let target = &leaves[11];
        let mut proof = trie.prove(target).unwrap();
        let nibbles = LeafKey::of(target).nibbles();
        let mut depth = 0;
        for step in &mut proof.steps {
            match step {
                ProofStep::Extension { path } => depth += path.len(),
                ProofStep::Branch { siblings } => {
                    siblings[usize::from(nibbles[depth])] = Some(Hash32::ZERO);
                    break;
                }
            }
        }
        assert!(!verify(&proof, target, &trie.root()));
    }

    #[test]
    fn overlong_extension_is_rejected() {
        let proof = MembershipProof::new(vec![
            ProofStep::Extension {
                path: vec![0; KEY_NIBBLES + 1],
            },
            ProofStep::Branch {
                siblings: vec![None; BRANCH_WIDTH],
            },
        ]);
        assert!(!verify(&proof, &leaf(1), &Hash32::ZERO));
    }

    #[test]
    fn out_of_range_nibble_is_rejected() {
        let (trie, leaves) = fixture();
        if let Some((target, mut proof)) = proof_with_extension(&trie, &leaves) {
            for step in &mut proof.steps {
                if let ProofStep::Extension { path } = step {
                    path[0] += 16;
                    break;
                }
            }
            assert!(!verify(&proof, &target, &trie.root()));
        }
    }

    #[test]
    fn dangling_extension_is_rejected() {
        let target = leaf(2);
        let nibbles = LeafKey::of(&target).nibbles();
        let proof = MembershipProof::new(vec![ProofStep::Extension {
            path: nibbles[..4].to_vec(),
        }]);
        let forged_root = extension_hash(&nibbles[..4], &leaf_node_hash(&nibbles[4..], &LeafKey::of(&target)));
        assert!(!verify(&proof, &target, &forged_root));
    }

    #[test]
    fn too_many_steps_are_rejected() {
        let steps = (0..=KEY_NIBBLES)
            .map(|_| ProofStep::Branch {
                siblings: {
                    let mut s = vec![Some(Hash32::ZERO); BRANCH_WIDTH];
                    s[0] = None;
                    s
                },
            })
            .collect();
        assert!(!verify(&MembershipProof::new(steps), &leaf(4), &Hash32::ZERO));
    }

    #[test]
    fn wire_form_round_trips() {
        let (trie, leaves) = fixture();
        let proof = trie.prove(&leaves[20]).unwrap();
        let bytes = proof.to_bytes().unwrap();
        assert!(verify_encoded(&bytes, &leaves[20], &trie.root(), LIMIT));
    }

    #[test]
    fn garbage_bytes_are_false() {
        let (trie, leaves) = fixture();
        assert!(!verify_encoded(&[0xff; 40], &leaves[0], &trie.root(), LIMIT));
        assert!(!verify_encoded(&[], &leaves[0], &trie.root(), LIMIT));
    }

    #[test]
    fn truncated_bytes_are_false() {
        let (trie, leaves) = fixture();
        let bytes = trie.prove(&leaves[1]).unwrap().to_bytes().unwrap();
        assert!(!verify_encoded(&bytes[..bytes.len() - 3], &leaves[1], &trie.root(), LIMIT));
    }

    #[test]
    fn oversized_input_is_refused() {
        let (trie, leaves) = fixture();
        let bytes = trie.prove(&leaves[1]).unwrap().to_bytes().unwrap();
        assert!(!verify_encoded(&bytes, &leaves[1], &trie.root(), 4));
    }
}
