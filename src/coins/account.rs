//! Ethereum and BNB Smart Chain services.

use alloy::primitives::Address;
use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::blockchain::{Account, ChainId, EvmClient};
use crate::chain::{
    ChainError, ChainResult, ChainService, Coin, Confirmations, CreatedWallet, Source,
    SweepOutcome, WalletTag,
};
use crate::config::AccountChainConfig;
use crate::providers::{AccountNode, AccountProvider, EvmFeeModel, TokenContract};

/// Coin constants for an Ether-family chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvmProfile {
    pub coin: Coin,
    pub chain_id: ChainId,
    pub fees: EvmFeeModel,
}

pub const ETHEREUM: EvmProfile = EvmProfile {
    coin: Coin::Ethereum,
    chain_id: ChainId::ETHEREUM,
    fees: EvmFeeModel::ETHEREUM,
};

pub const BNB: EvmProfile = EvmProfile {
    coin: Coin::Bnb,
    chain_id: ChainId::BNB_SMART_CHAIN,
    fees: EvmFeeModel::LEGACY,
};

/// An Ether-family coin over its node.
#[derive(Debug)]
pub struct EvmService<N = EvmClient> {
    coin: Coin,
    provider: AccountProvider<N>,
}

impl EvmService<EvmClient> {
    /// Connect using `config`; its `chain_id` overrides the profile's.
    pub async fn connect(profile: &EvmProfile, config: &AccountChainConfig) -> ChainResult<Self> {
        let chain_id = config.chain_id.map(ChainId).unwrap_or(profile.chain_id);
        let client = EvmClient::new(config, chain_id).await?;
        let mut service = Self::with_node(client, profile, chain_id);

        if let Some(contract) = &config.token_contract {
            let address: Address = contract
                .parse()
                .map_err(|_| ChainError::InvalidAddress(contract.clone()))?;
            service.provider = service
                .provider
                .with_token(TokenContract::new(address, config.token_decimals));
        }
        Ok(service)
    }
}

impl<N: AccountNode> EvmService<N> {
    pub fn with_node(node: N, profile: &EvmProfile, chain_id: ChainId) -> Self {
        Self {
            coin: profile.coin,
            provider: AccountProvider::new(node, chain_id, profile.fees),
        }
    }

    pub fn provider(&self) -> &AccountProvider<N> {
        &self.provider
    }

    /// Send a token other than the configured default.
    pub async fn send_token(
        &self,
        to: &str,
        amount: Decimal,
        sender: &Account,
        token: TokenContract,
    ) -> ChainResult<String> {
        self.provider.send(to, amount, sender, Some(token)).await
    }
}

#[async_trait]
impl<N: AccountNode> ChainService for EvmService<N> {
    fn coin(&self) -> Coin {
        self.coin
    }

    async fn create_wallet(&self, _tag: &WalletTag) -> ChainResult<CreatedWallet> {
        Ok(CreatedWallet::Account(self.provider.create_wallet()))
    }

    async fn balance_of(&self, address: &str) -> ChainResult<Decimal> {
        self.provider.balance(address).await
    }

    async fn send(&self, to: &str, amount: Decimal, from: Source<'_>) -> ChainResult<String> {
        match from {
            Source::Account(account) => self.provider.send(to, amount, account, None).await,
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
                .transfer_to_main(main_address, amount, account)
                .await
                .map(SweepOutcome::Broadcast),
            Source::Custody | Source::Tag(_) => Err(self.unsupported("sweep without a signing account")),
        }
    }

    /// Never fails: lookup errors are reported as `Unknown`.
    async fn confirmations(&self, txid: &str) -> ChainResult<Confirmations> {
        Ok(self.provider.confirmations(txid).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profiles() {
        assert_eq!(ETHEREUM.chain_id.0, 1);
        assert!(matches!(ETHEREUM.fees, EvmFeeModel::Eip1559 { .. }));
        assert_eq!(BNB.chain_id.0, 56);
        assert_eq!(BNB.fees, EvmFeeModel::Legacy { gas_limit: 21_000 });
    }
}
