//! The uniform operation set every coin exposes.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Serialize;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::blockchain::Account;
use crate::chain::types::{
    ChainError, ChainResult, Coin, Confirmations, LookupOutcome, SweepOutcome, WalletTag,
};
use crate::lifecycle::CancelSignal;

/// Where funds leave from.
#[derive(Debug, Clone, Copy)]
pub enum Source<'a> {
    /// The operator's custody wallet on a UTXO node.
    Custody,
    /// A per-customer wallet or account label on a UTXO node.
    Tag(&'a WalletTag),
    /// A caller-held signing account. Used for exactly one call.
    Account(&'a Account),
}

impl Source<'_> {
    pub fn describe(&self) -> &'static str {
        match self {
            Source::Custody => "custody",
            Source::Tag(_) => "tag",
            Source::Account(_) => "account",
        }
    }
}

/// Result of `create_wallet`.
#[derive(Debug)]
pub enum CreatedWallet {
    /// A node-side wallet and its receiving address.
    Tagged { tag: WalletTag, address: String },
    /// A locally generated keypair. The caller stores it.
    Account(Account),
}

impl CreatedWallet {
    pub fn address(&self) -> String {
        match self {
            CreatedWallet::Tagged { address, .. } => address.clone(),
            CreatedWallet::Account(account) => account.address(),
        }
    }
}

/// Printable form of a created wallet.
///
/// Contains the private key for account chains; hand it to the caller's key
/// store and nowhere else.
#[derive(Serialize, Zeroize, ZeroizeOnDrop)]
pub struct CreatedWalletView {
    pub address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub private_key: Option<String>,
}

impl From<&CreatedWallet> for CreatedWalletView {
    fn from(wallet: &CreatedWallet) -> Self {
        match wallet {
            CreatedWallet::Tagged { tag, address } => Self {
                address: address.clone(),
                tag: Some(tag.to_string()),
                private_key: None,
            },
            CreatedWallet::Account(account) => Self {
                address: account.address(),
                tag: None,
                private_key: Some(account.private_key_hex().as_str().to_owned()),
            },
        }
    }
}

/// Deposit/withdrawal operations over one coin's node.
///
/// Operations a chain family cannot express return
/// [`ChainError::Unsupported`].
#[async_trait]
pub trait ChainService: Send + Sync {
    fn coin(&self) -> Coin;

    /// Create a receiving wallet. `tag` is ignored by account chains.
    async fn create_wallet(&self, tag: &WalletTag) -> ChainResult<CreatedWallet>;

    /// Balance of an address (or, for UTXO nodes, a wallet name).
    async fn balance_of(&self, address: &str) -> ChainResult<Decimal>;

    /// Balance held in the custody wallet.
    async fn custody_balance(&self) -> ChainResult<Decimal> {
        Err(self.unsupported("custody balance"))
    }

    /// Send `amount` to `to`, returning the transaction id.
    async fn send(&self, to: &str, amount: Decimal, from: Source<'_>) -> ChainResult<String>;

    /// Move `amount` from a transient wallet into custody at `main_address`.
    async fn sweep(
        &self,
        main_address: &str,
        from: Source<'_>,
        amount: Decimal,
    ) -> ChainResult<SweepOutcome>;

    async fn confirmations(&self, txid: &str) -> ChainResult<Confirmations>;

    /// Poll a tag wallet until the node reports `txid`.
    async fn lookup_transaction(
        &self,
        tag: &WalletTag,
        txid: &str,
        cancel: &mut CancelSignal,
    ) -> ChainResult<LookupOutcome> {
        let _ = (tag, txid, cancel);
        Err(self.unsupported("tag transaction lookup"))
    }

    fn unsupported(&self, operation: &'static str) -> ChainError {
        ChainError::Unsupported {
            coin: self.coin(),
            operation,
        }
    }
}
