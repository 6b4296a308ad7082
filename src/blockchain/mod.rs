//! Account-model chain integration.
//!
//! # Data Flow
//! ```text
//! Caller-held key (hex)
//!     → wallet.rs (Account: address formats, signing)
//!     → transaction.rs (EIP-1559, legacy and token-transfer requests)
//!     → client.rs (EvmClient: RPC with failover and timeouts)
//! ```
//!
//! # Security Constraints
//! - Keys come from the caller (or an environment variable in the CLI)
//! - Never log private keys or sensitive data
//! - All RPC calls have configurable timeouts

pub mod client;
pub mod transaction;
pub mod types;
pub mod wallet;

pub use client::EvmClient;
pub use types::{BlockchainError, BlockchainResult, ChainId, NodeTransaction};
pub use wallet::{Account, AddressFormat};
