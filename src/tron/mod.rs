//! Tron full-node HTTP API.
//!
//! # Data Flow
//! ```text
//! providers/tron.rs
//!     → client.rs (TronClient: /wallet/* endpoints, API key header)
//!     → types.rs (wire shapes, hex-encoded messages)
//!     → address.rs (base58check ↔ 20-byte account)
//! ```

pub mod address;
pub mod client;
pub mod types;

pub use client::TronClient;
pub use types::{
    BroadcastReceipt, ContractCall, SignedTransaction, TransactionInfo, TronTransaction,
    UnsignedTransaction,
};
