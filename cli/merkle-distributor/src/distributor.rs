//! Claim ledger for a published Merkle root.
//!
//! Every mutating call is all-or-nothing: on error the claimed bitmap, the token
//! balances and the event log are exactly as they were before the call.
//!
//! Workflow:
//! 1. Deploy with the token, the root and (optionally) a deadline
//! 2. Fund the distributor account with `tokenTotal`
//! 3. Recipients claim with their proofs, once per index
//! 4. After the deadline the owner withdraws whatever is left

use std::sync::Arc;

use alloy_primitives::{Address, U256};
use parking_lot::Mutex;
use tracing::{debug, info};

use crate::bitmap::ClaimedBitmap;
use crate::common::hex_encode;
use crate::error::LedgerError;
use crate::event::{Claimed, DistributorEvent, Withdrawn};
use crate::token::{Ownable, Token};
use crate::verify::verify_proof;

/// Sender and block time of a ledger call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallContext {
    pub caller: Address,
    /// Unix seconds
    pub timestamp: u64,
}

impl CallContext {
    pub fn new(caller: Address, timestamp: u64) -> Self {
        Self { caller, timestamp }
    }
}

/// Whether claims are still accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimWindow {
    Active,
    Expired,
}

/// Distributor without a deadline: claims stay open forever and there is no withdraw.
#[derive(Debug)]
pub struct MerkleDistributor<T> {
    /// Account holding the undistributed tokens
    address: Address,
    token: T,
    merkle_root: [u8; 32],
    end_time: Option<u64>,
    claimed: ClaimedBitmap,
    events: Vec<DistributorEvent>,
}

impl<T: Token> MerkleDistributor<T> {
    pub fn new(address: Address, token: T, merkle_root: [u8; 32]) -> Self {
        Self::deploy(address, token, merkle_root, None)
    }

    fn deploy(address: Address, token: T, merkle_root: [u8; 32], end_time: Option<u64>) -> Self {
        info!(
            distributor = %address,
            merkle_root = %hex_encode(merkle_root),
            end_time = ?end_time,
            "distributor deployed"
        );
        Self {
            address,
            token,
            merkle_root,
            end_time,
            claimed: ClaimedBitmap::new(),
            events: Vec::new(),
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn token(&self) -> &T {
        &self.token
    }

    /// The token is an external collaborator; funding happens through it directly.
    pub fn token_mut(&mut self) -> &mut T {
        &mut self.token
    }

    pub fn merkle_root(&self) -> [u8; 32] {
        self.merkle_root
    }

    /// Claim deadline in unix seconds; `None` when claims never close.
    pub fn end_time(&self) -> Option<u64> {
        self.end_time
    }

    pub fn is_claimed(&self, index: u64) -> bool {
        self.claimed.is_set(index)
    }

    pub fn events(&self) -> &[DistributorEvent] {
        &self.events
    }

    fn window(&self, now: u64) -> ClaimWindow {
        match self.end_time {
            Some(end_time) if now >= end_time => ClaimWindow::Expired,
            _ => ClaimWindow::Active,
        }
    }

    /// Pays `amount` to `account` if the proof matches the root and `index` is unclaimed.
    ///
    /// Checks run in order: proof, claimed bit, claim window, token balance.
    pub fn claim(
        &mut self,
        ctx: &CallContext,
        index: u64,
        account: Address,
        amount: U256,
        proof: &[[u8; 32]],
    ) -> Result<Claimed, LedgerError> {
        self.try_claim(ctx, index, account, amount, proof)
            .inspect_err(|err| {
                debug!(index, account = %account, caller = %ctx.caller, %err, "claim rejected");
            })
    }

    fn try_claim(
        &mut self,
        ctx: &CallContext,
        index: u64,
        account: Address,
        amount: U256,
        proof: &[[u8; 32]],
    ) -> Result<Claimed, LedgerError> {
        // ===== VALIDATION =====
        if !verify_proof(index, &account, amount, proof, &self.merkle_root) {
            return Err(LedgerError::InvalidProof);
        }
        if self.claimed.is_set(index) {
            return Err(LedgerError::AlreadyClaimed);
        }
        if self.window(ctx.timestamp) == ClaimWindow::Expired {
            return Err(LedgerError::ClaimWindowFinished);
        }

        // ===== EFFECTS =====
        // The bit goes up before the transfer so the index is spent while tokens move.
        self.claimed.set(index);

        // ===== INTERACTIONS =====
        if !self.token.transfer(&self.address, &account, amount) {
            self.claimed.revert(index);
            return Err(LedgerError::InsufficientBalance);
        }

        let event = Claimed {
            index,
            account,
            amount,
        };
        self.events.push(DistributorEvent::Claimed(event));
        info!(index, account = %account, amount = %amount, "claimed");
        Ok(event)
    }
}

/// Distributor with a claim deadline; the owner sweeps leftovers once it passes.
#[derive(Debug)]
pub struct MerkleDistributorWithDeadline<T> {
    inner: MerkleDistributor<T>,
    owner: Ownable,
}

impl<T: Token> MerkleDistributorWithDeadline<T> {
    pub fn new(
        address: Address,
        token: T,
        merkle_root: [u8; 32],
        end_time: u64,
        owner: Address,
    ) -> Self {
        Self {
            inner: MerkleDistributor::deploy(address, token, merkle_root, Some(end_time)),
            owner: Ownable::new(owner),
        }
    }

    pub fn address(&self) -> Address {
        self.inner.address()
    }

    pub fn token(&self) -> &T {
        self.inner.token()
    }

    pub fn token_mut(&mut self) -> &mut T {
        self.inner.token_mut()
    }

    pub fn merkle_root(&self) -> [u8; 32] {
        self.inner.merkle_root()
    }

    pub fn end_time(&self) -> u64 {
        // `new` always deploys the inner ledger with a deadline.
        self.inner.end_time().unwrap_or_default()
    }

    pub fn owner(&self) -> Address {
        self.owner.owner()
    }

    pub fn is_claimed(&self, index: u64) -> bool {
        self.inner.is_claimed(index)
    }

    pub fn events(&self) -> &[DistributorEvent] {
        self.inner.events()
    }

    /// Active strictly before `end_time`, expired from `end_time` on.
    pub fn window(&self, now: u64) -> ClaimWindow {
        self.inner.window(now)
    }

    pub fn claim(
        &mut self,
        ctx: &CallContext,
        index: u64,
        account: Address,
        amount: U256,
        proof: &[[u8; 32]],
    ) -> Result<Claimed, LedgerError> {
        self.inner.claim(ctx, index, account, amount, proof)
    }

    /// Sends the distributor's whole remaining balance to the owner.
    ///
    /// Owner only, and only once the claim window has closed.
    pub fn withdraw(&mut self, ctx: &CallContext) -> Result<Withdrawn, LedgerError> {
        self.try_withdraw(ctx).inspect_err(|err| {
            debug!(caller = %ctx.caller, %err, "withdraw rejected");
        })
    }

    fn try_withdraw(&mut self, ctx: &CallContext) -> Result<Withdrawn, LedgerError> {
        self.owner.only_owner(&ctx.caller)?;
        if self.window(ctx.timestamp) == ClaimWindow::Active {
            return Err(LedgerError::NoWithdrawDuringClaim);
        }

        let owner = self.owner.owner();
        let distributor = self.inner.address;
        let remaining = self.inner.token.balance_of(&distributor);
        if !self.inner.token.transfer(&distributor, &owner, remaining) {
            return Err(LedgerError::InsufficientBalance);
        }

        let event = Withdrawn {
            owner,
            amount: remaining,
        };
        self.inner.events.push(DistributorEvent::Withdrawn(event));
        info!(owner = %owner, amount = %remaining, "withdrew remaining tokens");
        Ok(event)
    }
}

/// Thread-safe handle that serializes every call against one distributor.
///
/// Each closure passed to [`with`](Self::with) runs under the lock, as one transaction.
#[derive(Debug)]
pub struct SharedDistributor<D> {
    inner: Arc<Mutex<D>>,
}

impl<D> Clone for SharedDistributor<D> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<D> SharedDistributor<D> {
    pub fn new(distributor: D) -> Self {
        Self {
            inner: Arc::new(Mutex::new(distributor)),
        }
    }

    pub fn with<R>(&self, f: impl FnOnce(&mut D) -> R) -> R {
        let mut guard = self.inner.lock();
        f(&mut guard)
    }
}
