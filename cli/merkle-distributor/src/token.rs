//! Fungible token capability used by the distributor.

use std::collections::HashMap;

use alloy_primitives::{Address, U256};
use tracing::debug;

use crate::error::LedgerError;

/// The slice of a fungible token the distributor relies on.
pub trait Token {
    fn balance_of(&self, owner: &Address) -> U256;

    /// Moves `amount` from `from` (the calling account) to `to`.
    ///
    /// Returns `false`, moving nothing, when `from` holds less than `amount`.
    fn transfer(&mut self, from: &Address, to: &Address, amount: U256) -> bool;
}

/// Single transferable admin role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ownable {
    owner: Address,
}

impl Ownable {
    pub fn new(owner: Address) -> Self {
        Self { owner }
    }

    pub fn owner(&self) -> Address {
        self.owner
    }

    pub fn only_owner(&self, caller: &Address) -> Result<(), LedgerError> {
        if *caller != self.owner {
            return Err(LedgerError::NotOwner);
        }
        Ok(())
    }

    pub fn transfer_ownership(
        &mut self,
        caller: &Address,
        new_owner: Address,
    ) -> Result<(), LedgerError> {
        self.only_owner(caller)?;
        debug!(from = %self.owner, to = %new_owner, "ownership transferred");
        self.owner = new_owner;
        Ok(())
    }
}

/// In-process token ledger; balances are set directly by its admin.
#[derive(Debug, Clone)]
pub struct MemoryToken {
    admin: Ownable,
    balances: HashMap<Address, U256>,
}

impl MemoryToken {
    pub fn new(admin: Address) -> Self {
        Self {
            admin: Ownable::new(admin),
            balances: HashMap::new(),
        }
    }

    pub fn admin(&self) -> Address {
        self.admin.owner()
    }

    pub fn transfer_ownership(
        &mut self,
        caller: &Address,
        new_owner: Address,
    ) -> Result<(), LedgerError> {
        self.admin.transfer_ownership(caller, new_owner)
    }

    /// Overwrites the balance of `account`. Admin only.
    pub fn set_balance(
        &mut self,
        caller: &Address,
        account: Address,
        amount: U256,
    ) -> Result<(), LedgerError> {
        self.admin.only_owner(caller)?;
        if amount.is_zero() {
            self.balances.remove(&account);
        } else {
            self.balances.insert(account, amount);
        }
        Ok(())
    }
}

impl Token for MemoryToken {
    fn balance_of(&self, owner: &Address) -> U256 {
        self.balances.get(owner).copied().unwrap_or_default()
    }

    fn transfer(&mut self, from: &Address, to: &Address, amount: U256) -> bool {
        let from_balance = self.balance_of(from);
        let Some(remaining) = from_balance.checked_sub(amount) else {
            return false;
        };
        if from == to || amount.is_zero() {
            return true;
        }
        let Some(credited) = self.balance_of(to).checked_add(amount) else {
            return false;
        };
        if remaining.is_zero() {
            self.balances.remove(from);
        } else {
            self.balances.insert(*from, remaining);
        }
        self.balances.insert(*to, credited);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ADMIN: Address = Address::new([0xad; 20]);
    const ALICE: Address = Address::new([0xa1; 20]);
    const BOB: Address = Address::new([0xb0; 20]);

    fn funded() -> MemoryToken {
        let mut token = MemoryToken::new(ADMIN);
        token.set_balance(&ADMIN, ALICE, U256::from(100u64)).unwrap();
        token
    }

    #[test]
    fn test_transfer_moves_balance() {
        let mut token = funded();
        assert!(token.transfer(&ALICE, &BOB, U256::from(40u64)));
        assert_eq!(token.balance_of(&ALICE), U256::from(60u64));
        assert_eq!(token.balance_of(&BOB), U256::from(40u64));
    }

    #[test]
    fn test_transfer_exceeding_balance_fails() {
        let mut token = funded();
        assert!(!token.transfer(&ALICE, &BOB, U256::from(101u64)));
        assert_eq!(token.balance_of(&ALICE), U256::from(100u64));
        assert_eq!(token.balance_of(&BOB), U256::ZERO);
    }

    #[test]
    fn test_transfer_zero_and_self() {
        let mut token = funded();
        assert!(token.transfer(&BOB, &ALICE, U256::ZERO));
        assert!(token.transfer(&ALICE, &ALICE, U256::from(100u64)));
        assert_eq!(token.balance_of(&ALICE), U256::from(100u64));
    }

    #[test]
    fn test_set_balance_admin_only() {
        let mut token = funded();
        assert_eq!(
            token.set_balance(&ALICE, ALICE, U256::MAX),
            Err(LedgerError::NotOwner)
        );
        assert_eq!(token.balance_of(&ALICE), U256::from(100u64));
    }

    #[test]
    fn test_transfer_ownership() {
        let mut token = funded();
        assert_eq!(
            token.transfer_ownership(&BOB, BOB),
            Err(LedgerError::NotOwner)
        );
        token.transfer_ownership(&ADMIN, BOB).unwrap();
        assert_eq!(token.admin(), BOB);
        assert_eq!(
            token.set_balance(&ADMIN, ALICE, U256::ZERO),
            Err(LedgerError::NotOwner)
        );
        token.set_balance(&BOB, ALICE, U256::ZERO).unwrap();
        assert_eq!(token.balance_of(&ALICE), U256::ZERO);
    }
}
