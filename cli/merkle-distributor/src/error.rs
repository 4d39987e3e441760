use thiserror::Error;

/// Failures while building a tree or extracting a proof from it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("Merkle tree is empty")]
    EmptyTree,

    #[error("Leaf index {index} is out of bounds for tree with {leaf_count} leaves")]
    IndexOutOfRange { index: usize, leaf_count: usize },
}

/// Failures while turning a raw balance map into a distribution.
///
/// Every variant aborts generation as a whole; nothing is written.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IndexError {
    #[error("Invalid address {address:?}: {reason}")]
    InvalidAddress { address: String, reason: String },

    #[error("Duplicate account {account} (input {first:?} and {second:?})")]
    DuplicateAccount {
        account: String,
        first: String,
        second: String,
    },

    #[error("Invalid amount for {account}: {reason}")]
    InvalidAmount { account: String, reason: String },

    #[error("Token total overflows 256 bits")]
    TotalOverflow,

    #[error(transparent)]
    Tree(#[from] TreeError),
}

/// Per-call failures of the claim ledger. State is untouched when one is returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("Invalid proof")]
    InvalidProof,

    #[error("Drop already claimed")]
    AlreadyClaimed,

    #[error("Claim window has finished")]
    ClaimWindowFinished,

    #[error("Caller is not the owner")]
    NotOwner,

    #[error("Cannot withdraw during the claim window")]
    NoWithdrawDuringClaim,

    #[error("Transfer amount exceeds balance")]
    InsufficientBalance,
}
