//! Chain-family providers.
//!
//! # Data Flow
//! ```text
//! coins/* (per-coin constants)
//!     → utxo.rs    (wallet-per-tag / account-label JSON-RPC nodes)
//!     → account.rs (Ether family, native and token transfers)
//!     → tron.rs    (contract-account family, TRC-20 USDT)
//!     → node clients behind RpcTransport / AccountNode / TronNode
//! ```
//!
//! Providers own every node-specific call and the wallet-scope lifecycle.
//! Node clients sit behind traits so each provider can run against an
//! in-memory double.

pub mod account;
pub mod tron;
pub mod utxo;

pub use account::{AccountNode, AccountProvider, EvmFeeModel, TokenContract};
pub use tron::{TronNode, TronProvider};
pub use utxo::{FeeSchedule, UnprocessedIncome, UtxoDialect, UtxoProvider};
