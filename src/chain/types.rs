//! Shared chain types and error definitions.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::chain::classify::ClassifiedTransfer;
use crate::rpc::{RpcResponse, TransportError};

/// Custody wallet tag in production.
pub const CUSTODY_TAG: &str = "main";

/// Custody wallet tag in development mode.
pub const DEV_CUSTODY_TAG: &str = "dev_main";

/// Coins the gateway can serve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Coin {
    Bitcoin,
    Litecoin,
    Dogecoin,
    Ethereum,
    Bnb,
    Tron,
}

impl Coin {
    pub const ALL: [Coin; 6] = [
        Coin::Bitcoin,
        Coin::Litecoin,
        Coin::Dogecoin,
        Coin::Ethereum,
        Coin::Bnb,
        Coin::Tron,
    ];

    pub fn ticker(&self) -> &'static str {
        match self {
            Coin::Bitcoin => "BTC",
            Coin::Litecoin => "LTC",
            Coin::Dogecoin => "DOGE",
            Coin::Ethereum => "ETH",
            Coin::Bnb => "BNB",
            Coin::Tron => "TRX",
        }
    }

    /// Bitcoin-family coins address deposits by wallet tag.
    pub fn uses_wallet_tags(&self) -> bool {
        matches!(self, Coin::Bitcoin | Coin::Litecoin | Coin::Dogecoin)
    }
}

impl fmt::Display for Coin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.ticker())
    }
}

impl FromStr for Coin {
    type Err = ChainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "btc" | "bitcoin" => Ok(Coin::Bitcoin),
            "ltc" | "litecoin" => Ok(Coin::Litecoin),
            "doge" | "dogecoin" => Ok(Coin::Dogecoin),
            "eth" | "ethereum" => Ok(Coin::Ethereum),
            "bnb" | "bsc" => Ok(Coin::Bnb),
            "trx" | "tron" => Ok(Coin::Tron),
            other => Err(ChainError::UnknownCoin(other.to_string())),
        }
    }
}

/// Per-customer wallet (UTXO nodes) or account label.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WalletTag(String);

impl WalletTag {
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    /// The custody wallet for the given mode.
    pub fn custody(dev_mode: bool) -> Self {
        Self::new(if dev_mode { DEV_CUSTODY_TAG } else { CUSTODY_TAG })
    }

    /// Tags containing the custody name are never unloaded.
    pub fn is_custody(&self) -> bool {
        self.0.contains(CUSTODY_TAG)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// A blank tag would address the node's default wallet.
    pub fn validate(&self) -> ChainResult<()> {
        if self.0.trim().is_empty() {
            return Err(ChainError::InvalidTag(self.0.clone()));
        }
        Ok(())
    }
}

impl fmt::Display for WalletTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for WalletTag {
    fn from(tag: &str) -> Self {
        Self::new(tag)
    }
}

/// Errors that can occur during chain operations.
#[derive(Debug, Error)]
pub enum ChainError {
    /// Network or auth failure reaching a node.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The node refused to create the wallet.
    #[error("On-node wallet creation error ({0})")]
    WalletCreation(String),

    /// The node rejected a send.
    #[error("Send rejected by node: {0}")]
    Send(String),

    /// A transfer was rejected or failed on-chain.
    #[error("Transfer failed: {0}")]
    Transfer(String),

    /// The node never reported the transaction within the attempt budget.
    #[error("Transaction {txid} not visible after {attempts} attempts")]
    LookupTimeout { txid: String, attempts: u32 },

    #[error("Transaction not found: {0}")]
    TransactionNotFound(String),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Invalid address '{0}'")]
    InvalidAddress(String),

    #[error("Invalid wallet tag '{0}'")]
    InvalidTag(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Signing failed: {0}")]
    Signing(String),

    /// The node answered with data of an unexpected shape.
    #[error("Unexpected node response: {0}")]
    Node(String),

    #[error("Ledger query failed: {0}")]
    Ledger(String),

    #[error("Unknown coin '{0}'")]
    UnknownCoin(String),

    #[error("{0} is not configured")]
    NotConfigured(Coin),

    #[error("{coin} does not support {operation}")]
    Unsupported { coin: Coin, operation: &'static str },
}

/// Result type for chain operations.
pub type ChainResult<T> = Result<T, ChainError>;

/// Confirmation depth as reported by the node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "depth", rename_all = "lowercase")]
pub enum Confirmations {
    Confirmed(u64),
    /// Unknown transaction, not yet mined, or the node could not be asked.
    Unknown,
}

impl Confirmations {
    /// Numeric form with -1 standing for `Unknown`.
    pub fn as_sentinel(&self) -> i64 {
        match self {
            Confirmations::Confirmed(depth) => i64::try_from(*depth).unwrap_or(i64::MAX),
            Confirmations::Unknown => -1,
        }
    }

    pub fn depth(&self) -> Option<u64> {
        match self {
            Confirmations::Confirmed(depth) => Some(*depth),
            Confirmations::Unknown => None,
        }
    }
}

/// One per-address entry of a wallet transaction.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TransferDetail {
    /// Owning account (account-label nodes) or label (wallet nodes).
    #[serde(default, alias = "label")]
    pub account: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    pub category: String,
    pub amount: Decimal,
}

/// Wallet transaction as returned by `gettransaction`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TransactionRecord {
    pub txid: String,
    pub amount: Decimal,
    #[serde(default)]
    pub confirmations: i64,
    #[serde(default)]
    pub details: Vec<TransferDetail>,
}

/// Result of the tag transaction lookup loop.
#[derive(Debug, Clone, PartialEq)]
pub enum LookupOutcome {
    Found { record: TransactionRecord, attempts: u32 },
    /// The node had not indexed the transaction when attempts ran out.
    NotYetVisible { attempts: u32, last: RpcResponse },
    Cancelled { attempts: u32 },
}

/// What a sweep did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "txid", rename_all = "snake_case")]
pub enum SweepOutcome {
    /// A transaction was broadcast.
    Broadcast(String),
    /// Funds were moved between node accounts without a transaction.
    Moved,
}

/// Amount, address and intent of a tag transaction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransferSummary {
    pub txid: String,
    pub amount: Decimal,
    pub address: Option<String>,
    pub confirmations: i64,
    pub category: Option<String>,
    pub classification: ClassifiedTransfer,
}
