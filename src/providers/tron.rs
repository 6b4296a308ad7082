//! Contract-account provider for TRC-20 USDT on Tron.
//!
//! # Responsibilities
//! - Read token balances through constant contract calls
//! - Build, sign and broadcast `transfer` calls with a fixed fee ceiling
//! - Wait for the execution result on a dedicated task
//! - Report a confirmation proxy from the node's contract result

use alloy::primitives::B256;
use async_trait::async_trait;
use rust_decimal::Decimal;
use sha2::{Digest, Sha256};
use std::sync::Arc;

use crate::blockchain::transaction::{
    balance_of_calldata, decode_uint_word, strip_selector, transfer_calldata,
};
use crate::blockchain::{Account, AddressFormat};
use crate::chain::units::{from_base_units, to_base_units};
use crate::chain::{ChainError, ChainResult, Confirmations};
use crate::lifecycle::CancelSignal;
use crate::resilience::{poll_until, PollOutcome, PollPolicy};
use crate::tron::address;
use crate::tron::types::{
    BroadcastReceipt, ContractCall, SignedTransaction, TransactionInfo, TronTransaction,
    UnsignedTransaction,
};

/// Depth reported for transactions the node marks `SUCCESS`.
pub const SAFE_CONFIRMATIONS: u64 = 6;

const TRANSFER_SELECTOR: &str = "transfer(address,uint256)";
const BALANCE_OF_SELECTOR: &str = "balanceOf(address)";
const DECIMALS_SELECTOR: &str = "decimals()";

/// The node operations the provider depends on.
#[async_trait]
pub trait TronNode: Send + Sync + 'static {
    /// Read-only contract call; returns the first result word.
    async fn constant_call(
        &self,
        owner: &str,
        contract: &str,
        function_selector: &str,
        parameter: &str,
    ) -> ChainResult<Vec<u8>>;

    /// Have the node build an unsigned contract-call transaction.
    async fn build_contract_call(&self, call: &ContractCall) -> ChainResult<UnsignedTransaction>;

    async fn broadcast(&self, tx: &SignedTransaction) -> ChainResult<BroadcastReceipt>;

    /// Execution result; `None` until the transaction is in a block.
    async fn transaction_info(&self, txid: &str) -> ChainResult<Option<TransactionInfo>>;

    async fn transaction(&self, txid: &str) -> ChainResult<Option<TronTransaction>>;
}

/// Provider for a fixed TRC-20 contract.
#[derive(Debug)]
pub struct TronProvider<N> {
    node: Arc<N>,
    contract: String,
    fee_limit: u64,
    wait_policy: PollPolicy,
}

impl<N: TronNode> TronProvider<N> {
    pub fn new(node: N, contract: &str, fee_limit: u64, wait_policy: PollPolicy) -> ChainResult<Self> {
        address::decode(contract)?;
        Ok(Self {
            node: Arc::new(node),
            contract: contract.to_string(),
            fee_limit,
            wait_policy,
        })
    }

    pub fn contract(&self) -> &str {
        &self.contract
    }

    pub fn node(&self) -> &N {
        &self.node
    }

    /// Generate a keypair locally.
    pub fn create_wallet(&self) -> Account {
        Account::generate(AddressFormat::Tron)
    }

    /// Token balance of `owner` in display units.
    pub async fn balance_of(&self, owner: &str) -> ChainResult<Decimal> {
        let account = address::decode(owner)?;
        let parameter = hex::encode(strip_selector(&balance_of_calldata(account)));

        let balance = self
            .node
            .constant_call(owner, &self.contract, BALANCE_OF_SELECTOR, &parameter)
            .await?;
        let balance = decode_uint_word(&balance)
            .ok_or_else(|| ChainError::Node("balanceOf returned a short word".to_string()))?;

        let decimals = self.decimals(owner).await?;
        from_base_units(balance, decimals)
    }

    async fn decimals(&self, owner: &str) -> ChainResult<u32> {
        let word = self
            .node
            .constant_call(owner, &self.contract, DECIMALS_SELECTOR, "")
            .await?;
        decode_uint_word(&word)
            .and_then(|d| u32::try_from(d).ok())
            .ok_or_else(|| ChainError::Node("decimals returned an invalid word".to_string()))
    }

    /// Transfer `amount` tokens from `wallet` to `to` and wait for the result.
    ///
    /// The amount is scaled by the contract's own `decimals()`.
    ///
    /// Returns the transaction id once the node reports execution; an
    /// execution failure is a [`ChainError::Transfer`].
    pub async fn send(&self, to: &str, amount: Decimal, wallet: &Account) -> ChainResult<String> {
        let recipient = address::decode(to)?;
        let owner = address::encode(&wallet.evm_address());
        let decimals = self.decimals(&owner).await?;
        let value = to_base_units(amount, decimals)?;

        let call = ContractCall {
            owner_address: owner.clone(),
            contract_address: self.contract.clone(),
            function_selector: TRANSFER_SELECTOR.to_string(),
            parameter: hex::encode(strip_selector(&transfer_calldata(recipient, value))),
            fee_limit: self.fee_limit,
        };
        let unsigned = self.node.build_contract_call(&call).await?;
        let signed = sign(unsigned, wallet)?;
        let txid = signed.tx_id.clone();

        let receipt = self.node.broadcast(&signed).await?;
        if !receipt.result {
            return Err(ChainError::Transfer(receipt.reason()));
        }
        tracing::info!(from = %owner, to = to, amount = %amount, txid = %txid, "TRC-20 transfer broadcast");

        let info = self.wait_for_execution(&txid).await?;
        if info.failed() {
            let reason = info.failure_reason();
            tracing::warn!(txid = %txid, reason = %reason, "TRC-20 transfer failed");
            return Err(ChainError::Transfer(reason));
        }
        Ok(txid)
    }

    /// Poll for the execution result on its own task.
    async fn wait_for_execution(&self, txid: &str) -> ChainResult<TransactionInfo> {
        let node = Arc::clone(&self.node);
        let policy = self.wait_policy;
        let id = txid.to_string();

        let handle = tokio::spawn(async move {
            poll_until(
                &policy,
                "tron_broadcast_wait",
                &mut CancelSignal::never(),
                |_| {
                    let node = Arc::clone(&node);
                    let id = id.clone();
                    async move { node.transaction_info(&id).await }
                },
                |info| info.is_some(),
            )
            .await
        });

        let outcome = handle
            .await
            .map_err(|e| ChainError::Node(format!("broadcast wait task failed: {}", e)))??;

        match outcome {
            PollOutcome::Ready { value: Some(info), .. } => Ok(info),
            other => Err(ChainError::LookupTimeout {
                txid: txid.to_string(),
                attempts: other.attempts(),
            }),
        }
    }

    /// Confirmation proxy: `SUCCESS` counts as safely buried, anything else
    /// as zero. Real block depth is not computed for this chain.
    pub async fn confirmations(&self, txid: &str) -> ChainResult<Confirmations> {
        let Some(tx) = self.node.transaction(txid).await? else {
            return Ok(Confirmations::Unknown);
        };
        Ok(match tx.contract_result() {
            Some("SUCCESS") => Confirmations::Confirmed(SAFE_CONFIRMATIONS),
            _ => Confirmations::Confirmed(0),
        })
    }
}

/// Sign the node-built transaction after checking its id matches its bytes.
fn sign(tx: UnsignedTransaction, wallet: &Account) -> ChainResult<SignedTransaction> {
    let raw = hex::decode(&tx.raw_data_hex)
        .map_err(|e| ChainError::Signing(format!("raw_data_hex: {}", e)))?;
    let digest: [u8; 32] = Sha256::digest(&raw).into();
    if hex::encode(digest) != tx.tx_id.to_lowercase() {
        return Err(ChainError::Signing(format!(
            "node returned txID {} that does not match its raw data",
            tx.tx_id
        )));
    }

    let signature = wallet.sign_hash(&B256::from(digest))?;
    Ok(SignedTransaction::new(tx, hex::encode(signature.as_bytes())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sign_rejects_mismatched_txid() {
        let wallet = Account::generate(AddressFormat::Tron);
        let tx = UnsignedTransaction {
            tx_id: "00".repeat(32),
            raw_data: json!({}),
            raw_data_hex: "0a02".to_string(),
        };
        assert!(matches!(sign(tx, &wallet), Err(ChainError::Signing(_))));
    }

    #[test]
    fn test_sign_produces_recoverable_signature() {
        let wallet = Account::generate(AddressFormat::Tron);
        let raw = vec![0x0a, 0x02, 0x7a, 0x31];
        let digest: [u8; 32] = Sha256::digest(&raw).into();
        let tx = UnsignedTransaction {
            tx_id: hex::encode(digest),
            raw_data: json!({"contract": []}),
            raw_data_hex: hex::encode(&raw),
        };

        let signed = sign(tx, &wallet).unwrap();
        assert_eq!(signed.signature.len(), 1);
        let bytes = hex::decode(&signed.signature[0]).unwrap();
        assert_eq!(bytes.len(), 65);

        let signature = alloy::primitives::Signature::try_from(bytes.as_slice()).unwrap();
        let recovered = signature
            .recover_address_from_prehash(&B256::from(digest))
            .unwrap();
        assert_eq!(recovered, wallet.evm_address());
    }
}
