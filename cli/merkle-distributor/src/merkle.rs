//! Binary Merkle tree over distribution leaves.
//!
//! Internal nodes: `keccak256(min(a, b) || max(a, b))`, comparing digests as
//! big-endian integers. Sorting the pair makes a proof a plain list of siblings
//! with no left/right flags.
//! Leaves are paired in ascending digest order; an unpaired node at the end of a
//! level is promoted to the next level unchanged.

use tracing::debug;

use crate::common::keccak256;
use crate::error::TreeError;

/// Hash two sibling nodes into their parent.
///
/// Shared by tree construction and proof verification; both sides must agree on it.
pub fn combine(a: &[u8; 32], b: &[u8; 32]) -> [u8; 32] {
    // Lexicographic order on fixed-width big-endian bytes is numeric order.
    if a <= b {
        keccak256(&[a, b])
    } else {
        keccak256(&[b, a])
    }
}

/// A binary Merkle tree.
///
/// Leaves are sorted by digest and deduplicated before pairing, so the root
/// depends only on the set of leaves, not on the order they were supplied in.
#[derive(Debug, Clone)]
pub struct MerkleTree {
    /// Leaves in the order they were supplied; `proof(i)` looks up `leaves[i]`.
    leaves: Vec<[u8; 32]>,
    /// All nodes stored level by level, bottom-up. `layers[0]` = sorted leaves.
    layers: Vec<Vec<[u8; 32]>>,
}

impl MerkleTree {
    /// Build a tree from leaf digests.
    ///
    /// A single leaf is its own root.
    pub fn build(leaves: Vec<[u8; 32]>) -> Result<Self, TreeError> {
        if leaves.is_empty() {
            return Err(TreeError::EmptyTree);
        }

        let mut sorted = leaves.clone();
        sorted.sort_unstable();
        sorted.dedup();

        let mut layers = vec![sorted];
        loop {
            let prev = &layers[layers.len() - 1];
            if prev.len() <= 1 {
                break;
            }
            let next_layer: Vec<[u8; 32]> = prev
                .chunks(2)
                .map(|pair| match pair.get(1) {
                    Some(right) => combine(&pair[0], right),
                    None => pair[0],
                })
                .collect();
            layers.push(next_layer);
        }

        debug!(
            leaf_count = leaves.len(),
            distinct = layers[0].len(),
            depth = layers.len() - 1,
            "built merkle tree"
        );
        Ok(Self { leaves, layers })
    }

    /// Get the Merkle root.
    pub fn root(&self) -> [u8; 32] {
        self.layers[self.layers.len() - 1][0]
    }

    /// Number of leaves supplied to [`build`](Self::build).
    pub fn leaf_count(&self) -> usize {
        self.leaves.len()
    }

    /// Number of levels above the leaves; the longest possible proof.
    pub fn depth(&self) -> usize {
        self.layers.len() - 1
    }

    /// Leaf digest supplied at `leaf_index`, if any.
    pub fn leaf(&self, leaf_index: usize) -> Option<&[u8; 32]> {
        self.leaves.get(leaf_index)
    }

    /// Sibling digests from the leaf supplied at `leaf_index` up to the root.
    ///
    /// Levels where the node is promoted without a sibling contribute nothing, so
    /// the proof may be shorter than [`depth`](Self::depth).
    pub fn proof(&self, leaf_index: usize) -> Result<Vec<[u8; 32]>, TreeError> {
        let leaf_count = self.leaf_count();
        let leaf = self
            .leaves
            .get(leaf_index)
            .ok_or(TreeError::IndexOutOfRange {
                index: leaf_index,
                leaf_count,
            })?;
        self.proof_for(leaf).ok_or(TreeError::IndexOutOfRange {
            index: leaf_index,
            leaf_count,
        })
    }

    /// Proof for a leaf given by its digest, or `None` if it is not in the tree.
    pub fn proof_for(&self, leaf: &[u8; 32]) -> Option<Vec<[u8; 32]>> {
        let position = self.layers[0].binary_search(leaf).ok()?;

        let mut proof = Vec::with_capacity(self.depth());
        let mut current_index = position;
        for level in &self.layers[..self.layers.len() - 1] {
            if let Some(sibling) = level.get(current_index ^ 1) {
                proof.push(*sibling);
            }
            current_index /= 2;
        }

        Some(proof)
    }
}
