//! Tron (TRC-20 USDT) service.

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::chain::{
    ChainResult, ChainService, Coin, Confirmations, CreatedWallet, Source, SweepOutcome,
    WalletTag,
};
use crate::config::TronConfig;
use crate::providers::{TronNode, TronProvider};
use crate::resilience::PollPolicy;
use crate::tron::TronClient;
use std::time::Duration;

#[derive(Debug)]
pub struct TronService<N = TronClient> {
    provider: TronProvider<N>,
}

impl TronService<TronClient> {
    pub fn connect(config: &TronConfig) -> ChainResult<Self> {
        let client = TronClient::new(config)?;
        if config.api_key.is_empty() {
            tracing::warn!("No Tron API key configured; public endpoints are rate limited");
        }
        Self::with_node(client, config)
    }
}

impl<N: TronNode> TronService<N> {
    pub fn with_node(node: N, config: &TronConfig) -> ChainResult<Self> {
        let wait = PollPolicy::fixed(config.wait_attempts, Duration::from_millis(config.wait_interval_ms));
        let provider = TronProvider::new(node, &config.usdt_contract, config.fee_limit_sun, wait)?;
        Ok(Self { provider })
    }

    pub fn provider(&self) -> &TronProvider<N> {
        &self.provider
    }
}

#[async_trait]
impl<N: TronNode> ChainService for TronService<N> {
    fn coin(&self) -> Coin {
        Coin::Tron
    }

    async fn create_wallet(&self, _tag: &WalletTag) -> ChainResult<CreatedWallet> {
        Ok(CreatedWallet::Account(self.provider.create_wallet()))
    }

    async fn balance_of(&self, address: &str) -> ChainResult<Decimal> {
        self.provider.balance_of(address).await
    }

    async fn send(&self, to: &str, amount: Decimal, from: Source<'_>) -> ChainResult<String> {
        match from {
            Source::Account(account) => self.provider.send(to, amount, account).await,
            Source::Custody | Source::Tag(_) => Err(self.unsupported("send without a signing account")),
        }
    }

    async fn sweep(
        &self,
        main_address: &str,
        from: Source<'_>,
        amount: Decimal,
    ) -> ChainResult<SweepOutcome> {
        match from {
            Source::Account(account) => self
                .provider
                .send(main_address, amount, account)
                .await
                .map(SweepOutcome::Broadcast),
            Source::Custody | Source::Tag(_) => Err(self.unsupported("sweep without a signing account")),
        }
    }

    async fn confirmations(&self, txid: &str) -> ChainResult<Confirmations> {
        self.provider.confirmations(txid).await
    }
}
