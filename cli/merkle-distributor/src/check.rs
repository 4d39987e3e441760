use std::path::PathBuf;

use alloy_primitives::U256;
use anyhow::Result;
use clap::Parser;
use tracing::{info, warn};

use merkle_distributor::common::checksum;
use merkle_distributor::{hex_encode, verify_proof, Distribution};

use crate::claim::load_distribution;

#[derive(Parser, Debug)]
#[command(name = "verify")]
#[command(about = "Check every proof and the token total of a distribution file", long_about = None)]
pub struct Cli {
    /// Distribution file written by `generate`
    #[arg(short, long)]
    distribution: PathBuf,
}

/// Problems found in a distribution, one message per defect.
fn audit(distribution: &Distribution) -> Vec<String> {
    let mut problems = Vec::new();
    let count = distribution.len() as u64;

    if distribution.is_empty() {
        problems.push("distribution has no claims".to_string());
        return problems;
    }

    let mut index_seen = vec![false; distribution.len()];
    let mut total = Some(U256::ZERO);

    for (account, claim) in &distribution.claims {
        let account_hex = checksum(account);

        if claim.index >= count {
            problems.push(format!(
                "{account_hex}: index {} is outside 0..{count}",
                claim.index
            ));
        } else if std::mem::replace(&mut index_seen[claim.index as usize], true) {
            problems.push(format!(
                "{account_hex}: index {} is assigned twice",
                claim.index
            ));
        }

        if !verify_proof(
            claim.index,
            account,
            claim.amount,
            &claim.proof,
            &distribution.merkle_root,
        ) {
            problems.push(format!("{account_hex}: proof does not verify"));
        }

        total = total.and_then(|sum| sum.checked_add(claim.amount));
    }

    match total {
        Some(sum) if sum == distribution.token_total => {}
        Some(sum) => problems.push(format!(
            "tokenTotal {} does not match the sum of amounts {sum}",
            distribution.token_total
        )),
        None => problems.push("sum of amounts overflows 256 bits".to_string()),
    }

    problems
}

pub fn run(args: &Cli) -> Result<()> {
    let distribution = load_distribution(&args.distribution)?;
    let problems = audit(&distribution);

    if !problems.is_empty() {
        for problem in &problems {
            warn!("{problem}");
        }
        anyhow::bail!(
            "Distribution {} failed verification with {} problem(s)",
            args.distribution.display(),
            problems.len()
        );
    }

    info!(
        recipients = distribution.len(),
        merkle_root = %hex_encode(distribution.merkle_root),
        "distribution verified"
    );
    println!(
        "OK: {} claims verify against {}",
        distribution.len(),
        hex_encode(distribution.merkle_root)
    );

    Ok(())
}
