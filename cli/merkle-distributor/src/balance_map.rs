//! Turns a raw `address -> amount` map into an indexed, provable distribution.

use std::collections::{BTreeMap, HashMap};

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::info;

use crate::common::{
    checksum, hex_digest, hex_digests, hex_encode, hex_u256, parse_address, parse_quantity,
};
use crate::error::IndexError;
use crate::leaf;
use crate::merkle::MerkleTree;

/// Rule used to hand out leaf indices.
///
/// The choice changes every index, proof and the root, never correctness.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum IndexOrder {
    /// Ascending by address value (same as sorting lowercase hex).
    #[default]
    Sorted,
    /// Order of appearance in the input document.
    Insertion,
}

/// One recipient's entry in a distribution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimRecord {
    pub index: u64,
    #[serde(with = "hex_u256")]
    pub amount: U256,
    #[serde(with = "hex_digests")]
    pub proof: Vec<[u8; 32]>,
}

/// Generated airdrop: the root and total that go on-chain, and every claim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Distribution {
    #[serde(with = "hex_digest")]
    pub merkle_root: [u8; 32],
    #[serde(with = "hex_u256")]
    pub token_total: U256,
    #[serde(with = "claims_by_address")]
    pub claims: BTreeMap<Address, ClaimRecord>,
}

impl Distribution {
    /// Claim record for `account`, if it is a recipient.
    pub fn claim(&self, account: &Address) -> Option<&ClaimRecord> {
        self.claims.get(account)
    }

    pub fn len(&self) -> usize {
        self.claims.len()
    }

    pub fn is_empty(&self) -> bool {
        self.claims.is_empty()
    }
}

/// Parses a balance amount: a JSON integer or a decimal / "0x" hex string.
pub fn parse_amount(value: &Value) -> Result<U256, String> {
    match value {
        Value::Number(number) => {
            if let Some(amount) = number.as_u64() {
                Ok(U256::from(amount))
            } else if number.is_i64() {
                Err(format!("negative amount {number}"))
            } else {
                Err(format!(
                    "{number} is not an exact integer; pass large amounts as strings"
                ))
            }
        }
        Value::String(text) => parse_quantity(text)
            .ok_or_else(|| format!("{text:?} is not a non-negative 256-bit integer")),
        other => Err(format!("expected a number or numeric string, got {other}")),
    }
}

/// Builds a distribution from a raw balance map.
///
/// Addresses are normalized before use, so two spellings of one account are a
/// [`IndexError::DuplicateAccount`]. Any error aborts the whole generation.
pub fn parse_balance_map(
    balances: &Map<String, Value>,
    order: IndexOrder,
) -> Result<Distribution, IndexError> {
    let mut seen: HashMap<Address, &str> = HashMap::with_capacity(balances.len());
    let mut entries: Vec<(Address, U256)> = Vec::with_capacity(balances.len());

    for (raw_address, raw_amount) in balances {
        let account = parse_address(raw_address)?;
        if let Some(first) = seen.insert(account, raw_address.as_str()) {
            return Err(IndexError::DuplicateAccount {
                account: checksum(&account),
                first: first.to_string(),
                second: raw_address.clone(),
            });
        }
        let amount = parse_amount(raw_amount).map_err(|reason| IndexError::InvalidAmount {
            account: checksum(&account),
            reason,
        })?;
        entries.push((account, amount));
    }

    if order == IndexOrder::Sorted {
        entries.sort_by(|a, b| a.0.cmp(&b.0));
    }

    let token_total = entries
        .iter()
        .try_fold(U256::ZERO, |total, (_, amount)| total.checked_add(*amount))
        .ok_or(IndexError::TotalOverflow)?;

    let leaves = entries
        .iter()
        .enumerate()
        .map(|(index, (account, amount))| leaf::digest(index as u64, account, *amount))
        .collect();
    let tree = MerkleTree::build(leaves)?;

    let mut claims = BTreeMap::new();
    for (index, (account, amount)) in entries.into_iter().enumerate() {
        let record = ClaimRecord {
            index: index as u64,
            amount,
            proof: tree.proof(index)?,
        };
        claims.insert(account, record);
    }

    let merkle_root = tree.root();
    info!(
        recipients = claims.len(),
        merkle_root = %hex_encode(merkle_root),
        token_total = %token_total,
        ?order,
        "generated distribution"
    );

    Ok(Distribution {
        merkle_root,
        token_total,
        claims,
    })
}

/// Serializes the claims map keyed by lowercase `0x` address; accepts any spelling back.
mod claims_by_address {
    use std::collections::BTreeMap;

    use alloy_primitives::Address;
    use serde::{de, Deserialize, Deserializer, Serializer};

    use super::ClaimRecord;
    use crate::common::{checksum, hex_encode, parse_address};

    pub fn serialize<S: Serializer>(
        claims: &BTreeMap<Address, ClaimRecord>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_map(
            claims
                .iter()
                .map(|(account, claim)| (hex_encode(account.as_slice()), claim)),
        )
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<BTreeMap<Address, ClaimRecord>, D::Error> {
        let raw = BTreeMap::<String, ClaimRecord>::deserialize(deserializer)?;
        let mut claims = BTreeMap::new();
        for (raw_address, claim) in raw {
            let account = parse_address(&raw_address).map_err(de::Error::custom)?;
            if claims.insert(account, claim).is_some() {
                return Err(de::Error::custom(format!(
                    "duplicate claim for {}",
                    checksum(&account)
                )));
            }
        }
        Ok(claims)
    }
}
