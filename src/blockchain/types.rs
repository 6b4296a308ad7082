//! Account-model types and error definitions.

use alloy::primitives::TxHash;
use thiserror::Error;

use crate::chain::ChainError;
use crate::rpc::TransportError;

/// Chain ID type for strong typing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChainId(pub u64);

impl ChainId {
    pub const ETHEREUM: ChainId = ChainId(1);
    pub const BNB_SMART_CHAIN: ChainId = ChainId(56);
}

impl From<u64> for ChainId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl From<ChainId> for u64 {
    fn from(id: ChainId) -> Self {
        id.0
    }
}

/// Transaction as seen by the node; only what confirmation tracking needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeTransaction {
    pub hash: TxHash,
    /// `None` while the transaction is pending.
    pub block_number: Option<u64>,
}

/// Errors that can occur talking to an account-model node.
#[derive(Debug, Error)]
pub enum BlockchainError {
    /// RPC connection or request failed on every provider.
    #[error("RPC error: {0}")]
    Rpc(String),

    /// RPC request timed out.
    #[error("RPC timeout after {0} seconds")]
    Timeout(u64),

    /// The node refused a raw transaction.
    #[error("Broadcast rejected: {0}")]
    Rejected(String),

    /// Chain configuration mismatch.
    #[error("Chain ID mismatch: expected {expected}, got {actual}")]
    ChainMismatch { expected: u64, actual: u64 },
}

/// Result type for account-model node calls.
pub type BlockchainResult<T> = Result<T, BlockchainError>;

impl From<BlockchainError> for ChainError {
    fn from(err: BlockchainError) -> Self {
        match err {
            BlockchainError::Rpc(msg) => ChainError::Transport(TransportError::Http(msg)),
            BlockchainError::Timeout(secs) => ChainError::Transport(TransportError::Timeout(secs)),
            BlockchainError::Rejected(msg) => ChainError::Send(msg),
            other @ BlockchainError::ChainMismatch { .. } => ChainError::Node(other.to_string()),
        }
    }
}
