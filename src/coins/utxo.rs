//! Bitcoin, Litecoin and Dogecoin services.

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::chain::ledger::IncomeLedger;
use crate::chain::{
    ChainResult, ChainService, Coin, Confirmations, CreatedWallet, LookupOutcome, Source,
    SweepOutcome, TransferSummary, WalletTag,
};
use crate::coins::ServiceSettings;
use crate::config::UtxoChainConfig;
use crate::lifecycle::CancelSignal;
use crate::providers::{FeeSchedule, UnprocessedIncome, UtxoDialect, UtxoProvider};
use crate::rpc::{ChainEndpoint, NodeClient, RpcTransport};

/// Coin constants for a Bitcoin-family node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UtxoProfile {
    pub coin: Coin,
    pub protocol_version: &'static str,
    pub dialect: UtxoDialect,
    pub fees: FeeSchedule,
}

pub const BITCOIN: UtxoProfile = UtxoProfile {
    coin: Coin::Bitcoin,
    protocol_version: "1.0",
    dialect: UtxoDialect::WalletPerTag,
    fees: FeeSchedule {
        withdraw_fee_rate: 50,
        sweep_fee_rate: 51,
    },
};

pub const LITECOIN: UtxoProfile = UtxoProfile {
    coin: Coin::Litecoin,
    ..BITCOIN
};

/// Dogecoin nodes still use account labels and JSON-RPC 2.0 envelopes.
pub const DOGECOIN: UtxoProfile = UtxoProfile {
    coin: Coin::Dogecoin,
    protocol_version: "2.0",
    dialect: UtxoDialect::AccountLabels,
    ..BITCOIN
};

/// A Bitcoin-family coin over its node.
#[derive(Debug)]
pub struct UtxoService<T = NodeClient> {
    provider: UtxoProvider<T>,
}

impl UtxoService<NodeClient> {
    /// Connect to the node described by `config`.
    pub fn connect(
        profile: &UtxoProfile,
        config: &UtxoChainConfig,
        settings: &ServiceSettings,
    ) -> ChainResult<Self> {
        let endpoint = ChainEndpoint::from_config(config, profile.protocol_version)?;
        tracing::info!(coin = %profile.coin, endpoint = ?endpoint, "UTXO service configured");
        Ok(Self::with_transport(NodeClient::new(endpoint)?, profile, settings))
    }
}

impl<T: RpcTransport> UtxoService<T> {
    pub fn with_transport(transport: T, profile: &UtxoProfile, settings: &ServiceSettings) -> Self {
        let provider = UtxoProvider::new(transport, profile.coin, profile.dialect, settings.custody.clone())
            .with_fees(profile.fees)
            .with_lookup_policy(settings.lookup)
            .with_retry_policy(settings.retry);
        Self { provider }
    }

    pub fn provider(&self) -> &UtxoProvider<T> {
        &self.provider
    }

    pub async fn load_wallet(&self, tag: &WalletTag) -> ChainResult<()> {
        self.provider.load_wallet(tag).await
    }

    pub async fn unload_wallet(&self, tag: &WalletTag) -> ChainResult<()> {
        self.provider.unload_wallet(tag).await
    }

    /// Amount, address, depth and intent of a tag transaction.
    pub async fn transaction_summary(
        &self,
        tag: &WalletTag,
        txid: &str,
        cancel: &mut CancelSignal,
    ) -> ChainResult<TransferSummary> {
        self.provider.transaction_summary(tag, txid, cancel).await
    }

    pub async fn unprocessed_income(
        &self,
        tag: &WalletTag,
        ledger: &dyn IncomeLedger,
    ) -> ChainResult<UnprocessedIncome> {
        self.provider.unprocessed_income(tag, ledger).await
    }

    pub async fn block_transactions(&self, blockhash: &str) -> ChainResult<Vec<String>> {
        self.provider.block_transactions(blockhash).await
    }

    pub async fn raw_transaction(&self, txid: &str) -> ChainResult<String> {
        self.provider.raw_transaction(txid).await
    }
}

#[async_trait]
impl<T: RpcTransport> ChainService for UtxoService<T> {
    fn coin(&self) -> Coin {
        self.provider.coin()
    }

    async fn create_wallet(&self, tag: &WalletTag) -> ChainResult<CreatedWallet> {
        let address = self.provider.create_wallet(tag).await?;
        Ok(CreatedWallet::Tagged {
            tag: tag.clone(),
            address,
        })
    }

    async fn balance_of(&self, address: &str) -> ChainResult<Decimal> {
        self.provider.balance_of(address).await
    }

    async fn custody_balance(&self) -> ChainResult<Decimal> {
        self.provider.custody_balance().await
    }

    async fn send(&self, to: &str, amount: Decimal, from: Source<'_>) -> ChainResult<String> {
        match from {
            Source::Custody => self.provider.send(to, amount).await,
            Source::Tag(tag) => self.provider.send_from_tag(tag, to, amount).await,
            Source::Account(_) => Err(self.unsupported("account-signed send")),
        }
    }

    async fn sweep(
        &self,
        main_address: &str,
        from: Source<'_>,
        amount: Decimal,
    ) -> ChainResult<SweepOutcome> {
        match from {
            Source::Tag(tag) => self.provider.sweep(main_address, tag, amount).await,
            Source::Custody | Source::Account(_) => Err(self.unsupported("sweep without a wallet tag")),
        }
    }

    async fn confirmations(&self, txid: &str) -> ChainResult<Confirmations> {
        self.provider.confirmations(txid).await
    }

    async fn lookup_transaction(
        &self,
        tag: &WalletTag,
        txid: &str,
        cancel: &mut CancelSignal,
    ) -> ChainResult<LookupOutcome> {
        self.provider.lookup_transaction(tag, txid, cancel).await
    }
}
