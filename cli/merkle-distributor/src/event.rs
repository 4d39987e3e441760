use alloy_primitives::{Address, U256};

/// Emitted when an allocation is paid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Claimed {
    /// Leaf index of the allocation
    pub index: u64,
    /// Recipient of the tokens
    pub account: Address,
    /// Amount transferred
    pub amount: U256,
}

/// Emitted when the owner sweeps the remaining balance after the deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Withdrawn {
    /// Owner who received the tokens
    pub owner: Address,
    /// Amount swept
    pub amount: U256,
}

/// Everything a distributor emits, in emission order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistributorEvent {
    Claimed(Claimed),
    Withdrawn(Withdrawn),
}
