//! Per-coin services and the registry that builds them from configuration.
//!
//! # Data Flow
//! ```text
//! GatewayConfig
//!     → ServiceSettings (custody tag, lookup and retry policies)
//!     → utxo.rs / account.rs / tron.rs (provider + coin constants)
//!     → Registry (Coin → dyn ChainService)
//! ```

pub mod account;
pub mod tron;
pub mod utxo;

use std::collections::HashMap;
use std::sync::Arc;

use crate::chain::{ChainError, ChainResult, ChainService, Coin, WalletTag};
use crate::config::GatewayConfig;
use crate::resilience::PollPolicy;

pub use account::{EvmProfile, EvmService};
pub use tron::TronService;
pub use utxo::{UtxoProfile, UtxoService};

/// Settings every service shares, fixed at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceSettings {
    pub custody: WalletTag,
    pub lookup: PollPolicy,
    pub retry: PollPolicy,
}

impl ServiceSettings {
    pub fn from_config(config: &GatewayConfig) -> Self {
        Self {
            custody: WalletTag::custody(config.custody.dev_mode),
            lookup: PollPolicy::from(&config.polling),
            retry: PollPolicy::from(&config.retries),
        }
    }
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self::from_config(&GatewayConfig::default())
    }
}

/// Every configured coin, by ticker.
#[derive(Default)]
pub struct Registry {
    services: HashMap<Coin, Arc<dyn ChainService>>,
    utxo: HashMap<Coin, Arc<UtxoService>>,
}

impl Registry {
    /// Build a service for each chain section present in `config`.
    pub async fn from_config(config: &GatewayConfig) -> ChainResult<Self> {
        let settings = ServiceSettings::from_config(config);
        let mut registry = Self::default();

        let utxo_chains = [
            (&utxo::BITCOIN, &config.bitcoin),
            (&utxo::LITECOIN, &config.litecoin),
            (&utxo::DOGECOIN, &config.dogecoin),
        ];
        for (profile, section) in utxo_chains {
            if let Some(section) = section {
                let service = Arc::new(UtxoService::connect(profile, section, &settings)?);
                registry.utxo.insert(profile.coin, service.clone());
                registry.services.insert(profile.coin, service);
            }
        }

        let account_chains = [(&account::ETHEREUM, &config.ethereum), (&account::BNB, &config.bnb)];
        for (profile, section) in account_chains {
            if let Some(section) = section {
                let service = EvmService::connect(profile, section).await?;
                registry.services.insert(profile.coin, Arc::new(service));
            }
        }

        if let Some(section) = &config.tron {
            registry
                .services
                .insert(Coin::Tron, Arc::new(TronService::connect(section)?));
        }

        tracing::info!(coins = ?registry.coins(), custody = %settings.custody, "Coin registry ready");
        Ok(registry)
    }

    pub fn get(&self, coin: Coin) -> ChainResult<Arc<dyn ChainService>> {
        self.services
            .get(&coin)
            .cloned()
            .ok_or(ChainError::NotConfigured(coin))
    }

    /// The UTXO service for `coin`, for operations outside the uniform set.
    pub fn utxo(&self, coin: Coin) -> ChainResult<Arc<UtxoService>> {
        if let Some(service) = self.utxo.get(&coin) {
            return Ok(service.clone());
        }
        if self.services.contains_key(&coin) {
            return Err(ChainError::Unsupported {
                coin,
                operation: "wallet-tag operations",
            });
        }
        Err(ChainError::NotConfigured(coin))
    }

    /// Configured coins in a stable order.
    pub fn coins(&self) -> Vec<Coin> {
        Coin::ALL
            .into_iter()
            .filter(|coin| self.services.contains_key(coin))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{TronConfig, UtxoChainConfig};
    use std::time::Duration;

    #[test]
    fn test_settings_from_config() {
        let mut config = GatewayConfig::default();
        config.custody.dev_mode = true;
        config.polling.interval_ms = 250;

        let settings = ServiceSettings::from_config(&config);
        assert_eq!(settings.custody.as_str(), "dev_main");
        assert_eq!(settings.lookup, PollPolicy::fixed(20, Duration::from_millis(250)));
        assert_eq!(settings.retry.max_attempts, 3);
    }

    #[tokio::test]
    async fn test_registry_builds_configured_coins() {
        let config = GatewayConfig {
            dogecoin: Some(UtxoChainConfig::default()),
            tron: Some(TronConfig::default()),
            ..GatewayConfig::default()
        };

        let registry = Registry::from_config(&config).await.unwrap();
        assert_eq!(registry.coins(), vec![Coin::Dogecoin, Coin::Tron]);
        assert_eq!(registry.get(Coin::Dogecoin).unwrap().coin(), Coin::Dogecoin);
        assert!(registry.utxo(Coin::Dogecoin).is_ok());
        assert!(matches!(registry.utxo(Coin::Tron), Err(ChainError::Unsupported { .. })));
        assert!(matches!(registry.get(Coin::Bitcoin), Err(ChainError::NotConfigured(Coin::Bitcoin))));
    }
}
