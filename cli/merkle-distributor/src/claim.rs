use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;

use merkle_distributor::common::{checksum, hex_quantity};
use merkle_distributor::{
    hex_encode, parse_address, parse_digest, verify_proof, write_file_atomic, Distribution,
};

#[derive(Parser, Debug)]
#[command(name = "claim")]
#[command(about = "Extract one account's claim arguments from a distribution", long_about = None)]
pub struct Cli {
    /// Distribution file written by `generate`
    #[arg(short, long)]
    distribution: PathBuf,

    /// Account to look up (any case)
    #[arg(short, long)]
    account: String,

    /// Expected Merkle root (hex); refuses to proceed if the file commits to another root
    #[arg(short, long)]
    root: Option<String>,

    /// Write the claim JSON here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ClaimOutput {
    merkle_root: String,
    index: u64,
    account: String,
    amount: String,
    proof: Vec<String>,
}

pub fn load_distribution(path: &Path) -> Result<Distribution> {
    let content = fs::read_to_string(path).context("Failed to open distribution file")?;
    serde_json::from_str(&content).context("Failed to parse distribution file")
}

fn build_claim(
    distribution: &Distribution,
    account: &str,
    expected_root: Option<&str>,
) -> Result<ClaimOutput> {
    if let Some(root) = expected_root {
        let root = parse_digest(root).context("Invalid Merkle root")?;
        if root != distribution.merkle_root {
            anyhow::bail!(
                "Distribution root {} does not match expected root {}",
                hex_encode(distribution.merkle_root),
                hex_encode(root)
            );
        }
    }

    let account = parse_address(account).context("Invalid account address")?;
    let claim = distribution
        .claim(&account)
        .context("Address not found in distribution")?;

    if !verify_proof(
        claim.index,
        &account,
        claim.amount,
        &claim.proof,
        &distribution.merkle_root,
    ) {
        anyhow::bail!(
            "Proof for {} does not verify against the distribution root",
            checksum(&account)
        );
    }

    Ok(ClaimOutput {
        merkle_root: hex_encode(distribution.merkle_root),
        index: claim.index,
        account: checksum(&account),
        amount: hex_quantity(claim.amount),
        proof: claim.proof.iter().map(hex_encode).collect(),
    })
}

pub fn run(args: Cli) -> Result<()> {
    let distribution = load_distribution(&args.distribution)?;
    let claim = build_claim(&distribution, &args.account, args.root.as_deref())?;

    let json_output = serde_json::to_string_pretty(&claim).context("Failed to serialize JSON")?;
    match args.output {
        Some(path) => {
            write_file_atomic(&path, &json_output).context("Failed to write claim file")?;
            println!("Claim for {} written to {}", claim.account, path.display());
        }
        None => println!("{json_output}"),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use merkle_distributor::{parse_balance_map, IndexOrder};
    use serde_json::{json, Value};

    const WALLET0: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";
    const WALLET1: &str = "0x70997970C51812dc3A010C7d01b50e0d17dc79C8";

    fn distribution() -> Distribution {
        let Value::Object(balances) = json!({ WALLET0: 100, WALLET1: 101 }) else {
            unreachable!()
        };
        parse_balance_map(&balances, IndexOrder::Sorted).unwrap()
    }

    #[test]
    fn test_build_claim_lowercase_lookup() {
        let distribution = distribution();
        let claim = build_claim(&distribution, &WALLET0.to_lowercase(), None).unwrap();
        assert_eq!(claim.account, WALLET0);
        assert_eq!(claim.index, 1);
        assert_eq!(claim.amount, "0x64");
        assert_eq!(claim.proof.len(), 1);
    }

    #[test]
    fn test_build_claim_unknown_account() {
        let distribution = distribution();
        let unknown = "0x3C44CdDdB6a900fa2b585dd299e03d12FA4293BC";
        assert!(build_claim(&distribution, unknown, None).is_err());
    }

    #[test]
    fn test_build_claim_root_mismatch() {
        let distribution = distribution();
        let wrong_root = format!("0x{}", "11".repeat(32));
        assert!(build_claim(&distribution, WALLET0, Some(&wrong_root)).is_err());

        let right_root = hex_encode(distribution.merkle_root);
        assert!(build_claim(&distribution, WALLET0, Some(&right_root)).is_ok());
    }

    #[test]
    fn test_build_claim_tampered_proof() {
        let mut distribution = distribution();
        let account = parse_address(WALLET1).unwrap();
        if let Some(claim) = distribution.claims.get_mut(&account) {
            claim.proof[0] = [0u8; 32];
        }
        assert!(build_claim(&distribution, WALLET1, None).is_err());
    }
}
