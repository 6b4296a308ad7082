//! Chain-independent domain model.
//!
//! # Data Flow
//! ```text
//! caller → service.rs (ChainService, one calling convention)
//!     → providers (per chain family)
//!     ← types.rs (TransactionRecord, Confirmations, LookupOutcome)
//!     ← classify.rs (ClassifiedTransfer from detail entries)
//! ```
//!
//! # Design Decisions
//! - Records are read-only projections of node state, never persisted here
//! - Deduplication belongs to the caller's ledger (ledger.rs)
//! - Unrecognized transaction shapes classify as `Unknown`, never an error

pub mod classify;
pub mod ledger;
pub mod service;
pub mod types;
pub mod units;

pub use classify::{classify, ClassifiedTransfer};
pub use ledger::{FileLedger, IncomeLedger, LedgerError};
pub use service::{ChainService, CreatedWallet, CreatedWalletView, Source};
pub use types::{
    ChainError, ChainResult, Coin, Confirmations, LookupOutcome, SweepOutcome, TransactionRecord,
    TransferDetail, TransferSummary, WalletTag,
};
