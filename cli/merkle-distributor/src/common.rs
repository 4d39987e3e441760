use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use alloy_primitives::{Address, U256};
use anyhow::Context;
use sha3::{Digest, Keccak256};

use crate::error::IndexError;

/// Parses and normalizes an Ethereum address from a hex string.
///
/// Accepts the address with or without a "0x" prefix, in lowercase, uppercase or
/// EIP-55 mixed case. Mixed-case input must carry a valid checksum, so a typo in a
/// checksummed address is caught instead of silently naming another account.
///
/// # Errors
/// Returns [`IndexError::InvalidAddress`] if the address is not 40 hex characters,
/// has a bad checksum, or is the zero address.
pub fn parse_address(addr_str: &str) -> Result<Address, IndexError> {
    let invalid = |reason: String| IndexError::InvalidAddress {
        address: addr_str.to_string(),
        reason,
    };

    let trimmed = addr_str.trim();
    let cleaned = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    if cleaned.len() != 40 {
        return Err(invalid(format!(
            "expected 40 hex chars, got {}",
            cleaned.len()
        )));
    }
    let mut bytes = [0u8; 20];
    hex::decode_to_slice(cleaned, &mut bytes)
        .map_err(|e| invalid(format!("invalid hex encoding: {e}")))?;
    let address = Address::from(bytes);
    if address == Address::ZERO {
        return Err(invalid("zero address not allowed".to_string()));
    }

    let has_lower = cleaned.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = cleaned.chars().any(|c| c.is_ascii_uppercase());
    if has_lower && has_upper {
        let checksummed = address.to_checksum(None);
        if &checksummed[2..] != cleaned {
            return Err(invalid("bad EIP-55 checksum".to_string()));
        }
    }

    Ok(address)
}

/// Canonical textual form of an address (EIP-55 checksummed).
pub fn checksum(address: &Address) -> String {
    address.to_checksum(None)
}

/// Keccak256 over the concatenation of `parts`.
pub fn keccak256(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().into()
}

/// Encodes bytes as a lowercase "0x"-prefixed hex string.
pub fn hex_encode<T: AsRef<[u8]>>(bytes: T) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// Parses a 32-byte digest written as 64 hex chars, with or without "0x".
pub fn parse_digest(hash_str: &str) -> anyhow::Result<[u8; 32]> {
    let trimmed = hash_str.trim();
    let cleaned = trimmed.strip_prefix("0x").unwrap_or(trimmed);
    if cleaned.len() != 64 {
        anyhow::bail!(
            "Invalid digest length: expected 64 hex chars, got {}",
            cleaned.len()
        );
    }
    let mut digest = [0u8; 32];
    hex::decode_to_slice(cleaned, &mut digest)
        .map_err(|e| anyhow::anyhow!("Invalid hex encoding: {}", e))?;
    Ok(digest)
}

/// Formats an integer as a minimal, even-length "0x" hex quantity.
///
/// # Arguments
/// * `value` - The amount to format
///
/// # Returns
/// The big-endian bytes without leading zero bytes, hex encoded. Zero is
/// written as "0x00"; 300 as "0x012c".
pub fn hex_quantity(value: U256) -> String {
    let bytes = value.to_be_bytes::<32>();
    let first = bytes.iter().position(|b| *b != 0).unwrap_or(31);
    hex_encode(&bytes[first..])
}

/// Parses a non-negative integer from a decimal string or a "0x" hex string.
///
/// # Arguments
/// * `text` - Decimal digits, or hex digits after a "0x"/"0X" prefix; surrounding
///   whitespace is ignored
///
/// # Returns
/// The parsed value, or `None` for empty input, stray characters (signs,
/// separators) and values wider than 256 bits
pub fn parse_quantity(text: &str) -> Option<U256> {
    let text = text.trim();
    let (digits, radix) = match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) => (hex, 16),
        None => (text, 10),
    };
    let well_formed = !digits.is_empty()
        && digits.chars().all(|c| match radix {
            16 => c.is_ascii_hexdigit(),
            _ => c.is_ascii_digit(),
        });
    if !well_formed {
        return None;
    }
    U256::from_str_radix(digits, radix).ok()
}

/// Writes `contents` to `path` through a sibling temp file and a rename, so
/// readers never observe a partially written file.
///
/// # Arguments
/// * `path` - Destination file; the temp file is `path` with a `.tmp` extension
/// * `contents` - Full file contents
///
/// # Errors
/// Returns an error if the temp file cannot be created, written or synced, or if
/// the rename fails. An existing file at `path` is left untouched in that case.
pub fn write_file_atomic(path: &Path, contents: &str) -> anyhow::Result<()> {
    let temp_path = path.with_extension("tmp");
    let mut file = File::create(&temp_path).context("Failed to create temp file")?;
    file.write_all(contents.as_bytes())
        .context("Failed to write to temp file")?;
    file.flush().context("Failed to flush temp file")?;
    file.sync_all().context("Failed to sync temp file")?;
    drop(file);
    fs::rename(&temp_path, path).context("Failed to move temp file to output")?;
    Ok(())
}

/// Serde adapter for 256-bit integers stored as hex quantities.
pub mod hex_u256 {
    use alloy_primitives::U256;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &U256, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::hex_quantity(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<U256, D::Error> {
        let text = String::deserialize(deserializer)?;
        super::parse_quantity(&text)
            .ok_or_else(|| de::Error::custom(format!("invalid quantity {text:?}")))
    }
}

/// Serde adapter for a single 32-byte digest stored as "0x" + 64 hex chars.
pub mod hex_digest {
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(digest: &[u8; 32], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::hex_encode(digest))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<[u8; 32], D::Error> {
        let text = String::deserialize(deserializer)?;
        super::parse_digest(&text).map_err(de::Error::custom)
    }
}

/// Serde adapter for an ordered list of digests.
pub mod hex_digests {
    use serde::{de, ser::SerializeSeq, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        digests: &[[u8; 32]],
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(digests.len()))?;
        for digest in digests {
            seq.serialize_element(&super::hex_encode(digest))?;
        }
        seq.end()
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<[u8; 32]>, D::Error> {
        Vec::<String>::deserialize(deserializer)?
            .iter()
            .map(|text| super::parse_digest(text).map_err(de::Error::custom))
            .collect()
    }
}
