pub mod balance_map;
pub mod bitmap;
pub mod common;
pub mod distributor;
pub mod error;
pub mod event;
pub mod leaf;
pub mod logging;
pub mod merkle;
pub mod token;
pub mod verify;

pub use balance_map::{parse_balance_map, ClaimRecord, Distribution, IndexOrder};
pub use common::{hex_encode, parse_address, parse_digest, write_file_atomic};
pub use distributor::{
    CallContext, ClaimWindow, MerkleDistributor, MerkleDistributorWithDeadline, SharedDistributor,
};
pub use error::{IndexError, LedgerError, TreeError};
pub use event::{Claimed, DistributorEvent, Withdrawn};
pub use merkle::MerkleTree;
pub use token::{MemoryToken, Ownable, Token};
pub use verify::verify_proof;
