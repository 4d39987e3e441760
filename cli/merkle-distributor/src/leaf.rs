//! Leaf encoding for distribution entries.
//!
//! Encoding: `index (32 bytes BE) || account (20 bytes) || amount (32 bytes BE)`,
//! the same bytes Solidity produces for `abi.encodePacked(uint256, address, uint256)`.
//! Leaf: `keccak256(keccak256(encoding))`.
//!
//! The second hash keeps a 64-byte internal node preimage from ever being accepted
//! as a leaf.

use alloy_primitives::{Address, U256};

use crate::common::keccak256;

/// Width of an encoded allocation in bytes.
pub const ENCODED_LEN: usize = 32 + 20 + 32;

/// Packs an allocation into its fixed-width byte encoding.
pub fn encode(index: u64, account: &Address, amount: U256) -> [u8; ENCODED_LEN] {
    let mut out = [0u8; ENCODED_LEN];
    out[24..32].copy_from_slice(&index.to_be_bytes());
    out[32..52].copy_from_slice(account.as_slice());
    out[52..84].copy_from_slice(&amount.to_be_bytes::<32>());
    out
}

/// Computes the leaf digest of an allocation.
///
/// The outer hash runs over the raw 32 bytes of the inner hash.
pub fn digest(index: u64, account: &Address, amount: U256) -> [u8; 32] {
    let inner = keccak256(&[&encode(index, account, amount)]);
    keccak256(&[&inner])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(byte: u8) -> Address {
        Address::from([byte; 20])
    }

    #[test]
    fn test_encode_layout() {
        let encoded = encode(0x0102, &account(0xaa), U256::from(0x0304u64));
        assert_eq!(encoded.len(), 84);
        assert_eq!(encoded[..30], [0u8; 30]);
        assert_eq!(encoded[30..32], [0x01, 0x02]);
        assert_eq!(encoded[32..52], [0xaa; 20]);
        assert_eq!(encoded[52..82], [0u8; 30]);
        assert_eq!(encoded[82..84], [0x03, 0x04]);
    }

    #[test]
    fn test_encode_max_values() {
        let encoded = encode(u64::MAX, &account(0x11), U256::MAX);
        assert_eq!(encoded[..24], [0u8; 24]);
        assert_eq!(encoded[24..32], [0xff; 8]);
        assert_eq!(encoded[52..84], [0xff; 32]);
    }

    #[test]
    fn test_digest_is_double_hash() {
        let encoded = encode(7, &account(1), U256::from(100u64));
        let once = keccak256(&[&encoded]);
        assert_eq!(digest(7, &account(1), U256::from(100u64)), keccak256(&[&once]));
        assert_ne!(digest(7, &account(1), U256::from(100u64)), once);
    }

    #[test]
    fn test_digest_depends_on_every_field() {
        let base = digest(1, &account(1), U256::from(10u64));
        assert_ne!(base, digest(2, &account(1), U256::from(10u64)));
        assert_ne!(base, digest(1, &account(2), U256::from(10u64)));
        assert_ne!(base, digest(1, &account(1), U256::from(11u64)));
    }

    #[test]
    fn test_digest_deterministic() {
        assert_eq!(
            digest(3, &account(9), U256::from(5u64)),
            digest(3, &account(9), U256::from(5u64))
        );
    }
}
