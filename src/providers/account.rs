//! Ether-family provider: local keys, node-reported fees, best-effort
//! confirmations.

use alloy::network::TransactionBuilder;
use alloy::primitives::{Address, TxHash, U256};
use alloy::rpc::types::TransactionRequest;
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::blockchain::transaction::{
    self, TransferFields, MAX_PRIORITY_FEE_WEI, NATIVE_TRANSFER_GAS,
};
use crate::blockchain::{Account, AddressFormat, BlockchainResult, ChainId, NodeTransaction};
use crate::chain::units::{from_base_units, to_base_units, ETHER_DECIMALS};
use crate::chain::{ChainError, ChainResult, Confirmations};

/// The node operations the provider depends on.
#[async_trait]
pub trait AccountNode: Send + Sync {
    async fn get_balance(&self, address: Address) -> BlockchainResult<U256>;
    /// Next nonce for `address`, counting pending transactions.
    async fn get_transaction_count(&self, address: Address) -> BlockchainResult<u64>;
    async fn gas_price(&self) -> BlockchainResult<u128>;
    async fn estimate_gas(&self, tx: &TransactionRequest) -> BlockchainResult<u64>;
    async fn send_raw_transaction(&self, raw: &[u8]) -> BlockchainResult<TxHash>;
    async fn get_transaction(&self, hash: TxHash) -> BlockchainResult<Option<NodeTransaction>>;
    async fn block_number(&self) -> BlockchainResult<u64>;
}

/// How native transfers are priced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvmFeeModel {
    /// Type-2: node-estimated gas, max fee at the gas price, capped tip.
    Eip1559 { priority_fee_cap: u128 },
    /// Legacy: fixed gas limit at the gas price.
    Legacy { gas_limit: u64 },
}

impl EvmFeeModel {
    pub const ETHEREUM: EvmFeeModel = EvmFeeModel::Eip1559 {
        priority_fee_cap: MAX_PRIORITY_FEE_WEI,
    };
    pub const LEGACY: EvmFeeModel = EvmFeeModel::Legacy {
        gas_limit: NATIVE_TRANSFER_GAS,
    };
}

/// Token sent instead of the native coin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenContract {
    pub address: Address,
    pub decimals: u32,
}

impl TokenContract {
    pub fn new(address: Address, decimals: u32) -> Self {
        Self { address, decimals }
    }

    /// BEP-20 tokens on BNB Smart Chain use 18 decimals.
    pub fn bep20(address: Address) -> Self {
        Self::new(address, ETHER_DECIMALS)
    }
}

/// Account-model provider over any [`AccountNode`].
#[derive(Debug)]
pub struct AccountProvider<N> {
    node: N,
    chain_id: ChainId,
    fees: EvmFeeModel,
    token: Option<TokenContract>,
}

impl<N: AccountNode> AccountProvider<N> {
    pub fn new(node: N, chain_id: ChainId, fees: EvmFeeModel) -> Self {
        Self {
            node,
            chain_id,
            fees,
            token: None,
        }
    }

    /// Send this token by default instead of the native coin.
    pub fn with_token(mut self, token: TokenContract) -> Self {
        self.token = Some(token);
        self
    }

    pub fn chain_id(&self) -> ChainId {
        self.chain_id
    }

    pub fn token(&self) -> Option<TokenContract> {
        self.token
    }

    pub fn node(&self) -> &N {
        &self.node
    }

    /// Generate a keypair locally. No node round-trip.
    pub fn create_wallet(&self) -> Account {
        Account::generate(AddressFormat::Evm)
    }

    /// Native balance in display units.
    pub async fn balance(&self, address: &str) -> ChainResult<Decimal> {
        let address = parse_address(address)?;
        let wei = self.node.get_balance(address).await?;
        from_base_units(wei, ETHER_DECIMALS)
    }

    /// Sign and broadcast a transfer from `sender`.
    ///
    /// `token` overrides the provider's default token; with neither set the
    /// native coin is sent.
    pub async fn send(
        &self,
        to: &str,
        amount: Decimal,
        sender: &Account,
        token: Option<TokenContract>,
    ) -> ChainResult<String> {
        let recipient = parse_address(to)?;
        let from = sender.evm_address();
        let token = token.or(self.token);

        let nonce = self.node.get_transaction_count(from).await?;
        let gas_price = self.node.gas_price().await?;

        let tx = match token {
            Some(token) => {
                let fields = TransferFields {
                    from,
                    to: recipient,
                    value: to_base_units(amount, token.decimals)?,
                    nonce,
                    chain_id: self.chain_id.0,
                };
                transaction::token_transfer(&fields, token.address, gas_price)
            }
            None => {
                let fields = TransferFields {
                    from,
                    to: recipient,
                    value: to_base_units(amount, ETHER_DECIMALS)?,
                    nonce,
                    chain_id: self.chain_id.0,
                };
                match self.fees {
                    EvmFeeModel::Eip1559 { priority_fee_cap } => {
                        let probe = TransactionRequest::default()
                            .with_from(from)
                            .with_to(recipient)
                            .with_value(fields.value);
                        let gas = self.node.estimate_gas(&probe).await?;
                        transaction::eip1559_transfer(&fields, gas, gas_price, priority_fee_cap)
                    }
                    EvmFeeModel::Legacy { gas_limit } => {
                        transaction::legacy_transfer(&fields, gas_limit, gas_price)
                    }
                }
            }
        };

        let raw = sender.sign_transaction(tx).await?;
        let hash = self.node.send_raw_transaction(&raw).await?;

        tracing::info!(
            chain_id = self.chain_id.0,
            from = %from,
            to = %recipient,
            nonce = nonce,
            token = token.is_some(),
            tx_hash = %hash,
            "Transfer broadcast"
        );
        Ok(format!("{:#x}", hash))
    }

    /// Move `amount` from a transient account to the custody address.
    pub async fn transfer_to_main(
        &self,
        main_address: &str,
        amount: Decimal,
        account: &Account,
    ) -> ChainResult<String> {
        self.send(main_address, amount, account, None).await
    }

    /// Blocks mined on top of the transaction's block.
    ///
    /// Best effort: unknown, pending and failed lookups all yield `Unknown`.
    pub async fn confirmations(&self, txid: &str) -> Confirmations {
        let Ok(hash) = TxHash::from_str(txid) else {
            return Confirmations::Unknown;
        };

        let included = match self.node.get_transaction(hash).await {
            Ok(Some(NodeTransaction {
                block_number: Some(block),
                ..
            })) => block,
            Ok(_) => return Confirmations::Unknown,
            Err(e) => {
                tracing::debug!(txid = txid, error = %e, "Transaction lookup failed");
                return Confirmations::Unknown;
            }
        };

        match self.node.block_number().await {
            Ok(head) => Confirmations::Confirmed(head.saturating_sub(included)),
            Err(e) => {
                tracing::debug!(txid = txid, error = %e, "Head lookup failed");
                Confirmations::Unknown
            }
        }
    }
}

pub(crate) fn parse_address(address: &str) -> ChainResult<Address> {
    Address::from_str(address.trim()).map_err(|_| ChainError::InvalidAddress(address.to_string()))
}
