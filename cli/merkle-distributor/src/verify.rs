use alloy_primitives::{Address, U256};

use crate::leaf;
use crate::merkle::combine;

/// Checks that `(index, account, amount)` is committed to by `expected_root`.
///
/// Folds the proof over the leaf digest with [`combine`], so it accepts exactly the
/// proofs produced by [`MerkleTree::proof`](crate::merkle::MerkleTree::proof).
pub fn verify_proof(
    index: u64,
    account: &Address,
    amount: U256,
    proof: &[[u8; 32]],
    expected_root: &[u8; 32],
) -> bool {
    let computed = proof
        .iter()
        .fold(leaf::digest(index, account, amount), |node, sibling| {
            combine(&node, sibling)
        });
    computed == *expected_root
}
