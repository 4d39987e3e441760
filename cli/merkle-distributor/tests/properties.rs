use std::collections::BTreeSet;

use alloy_primitives::{Address, U256};
use proptest::prelude::*;
use proptest::sample::Index;

use merkle_distributor::bitmap::ClaimedBitmap;
use merkle_distributor::common::keccak256;
use merkle_distributor::leaf;
use merkle_distributor::{verify_proof, MerkleTree};

fn allocations(count: usize, seed: u64) -> Vec<(Address, U256)> {
    (0..count as u64)
        .map(|i| {
            let digest = keccak256(&[&seed.to_be_bytes(), &i.to_be_bytes()]);
            let amount = U256::from(u64::from_be_bytes([
                digest[0], digest[1], digest[2], digest[3], 0, 0, 0, 0,
            ]) + 1);
            (Address::from_slice(&digest[12..]), amount)
        })
        .collect()
}

fn build(entries: &[(Address, U256)]) -> MerkleTree {
    let leaves = entries
        .iter()
        .enumerate()
        .map(|(i, (account, amount))| leaf::digest(i as u64, account, *amount))
        .collect();
    MerkleTree::build(leaves).unwrap()
}

proptest! {
    /// Property: every generated proof verifies and is no longer than the tree depth.
    #[test]
    fn prop_every_proof_verifies(count in 1usize..=64, seed in any::<u64>()) {
        let entries = allocations(count, seed);
        let tree = build(&entries);
        let root = tree.root();

        for (i, (account, amount)) in entries.iter().enumerate() {
            let proof = tree.proof(i).unwrap();
            prop_assert!(proof.len() <= tree.depth());
            prop_assert!(verify_proof(i as u64, account, *amount, &proof, &root));
        }
    }

    /// Property: changing any claimed field or the proof length breaks verification.
    #[test]
    fn prop_tampered_claims_fail(
        count in 2usize..=64,
        seed in any::<u64>(),
        pick in any::<Index>(),
        extra in any::<[u8; 32]>(),
    ) {
        let entries = allocations(count, seed);
        let tree = build(&entries);
        let root = tree.root();
        let i = pick.index(count);
        let (account, amount) = entries[i];
        let proof = tree.proof(i).unwrap();
        let index = i as u64;

        let other_account = entries[(i + 1) % count].0;
        prop_assume!(other_account != account);
        prop_assert!(!verify_proof(index, &other_account, amount, &proof, &root));
        prop_assert!(!verify_proof(index, &account, amount + U256::from(1u64), &proof, &root));
        prop_assert!(!verify_proof(index + 1, &account, amount, &proof, &root));

        if !proof.is_empty() {
            let truncated = &proof[..proof.len() - 1];
            prop_assert!(!verify_proof(index, &account, amount, truncated, &root));
        }
        let mut extended = proof.clone();
        extended.push(extra);
        prop_assert!(!verify_proof(index, &account, amount, &extended, &root));
    }

    /// Property: the bitmap reports exactly the indices that were set.
    #[test]
    fn prop_bitmap_tracks_set_indices(
        indices in prop::collection::btree_set(0u64..100_000, 0..64),
        probes in prop::collection::vec(0u64..100_000, 0..64),
    ) {
        let mut bitmap = ClaimedBitmap::new();
        for &index in &indices {
            prop_assert!(bitmap.set(index));
            prop_assert!(!bitmap.set(index));
        }

        prop_assert_eq!(bitmap.count(), indices.len() as u64);
        let all: BTreeSet<u64> = indices.iter().copied().chain(probes).collect();
        for index in all {
            prop_assert_eq!(bitmap.is_set(index), indices.contains(&index));
        }
    }
}
