//! Bitcoin-family provider.
//!
//! # Responsibilities
//! - Translate the uniform operation set into node RPC calls
//! - Scope wallet-per-tag calls: load, operate, unload on every exit path
//! - Poll tag wallets until the node indexes a transaction
//! - Sweep tag wallets into custody, retrying requests the node never saw
//!
//! # Dialects
//! - `WalletPerTag` (Bitcoin, Litecoin): one node-side wallet per tag,
//!   selected through the `/wallet/<tag>` URL suffix
//! - `AccountLabels` (Dogecoin): one wallet, tags are account labels;
//!   there is nothing to load or unload

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::convert::Infallible;
use std::future::Future;

use crate::chain::classify::classify;
use crate::chain::ledger::IncomeLedger;
use crate::chain::units::amount_param;
use crate::chain::{
    ChainError, ChainResult, Coin, Confirmations, LookupOutcome, SweepOutcome, TransactionRecord,
    TransferSummary, WalletTag,
};
use crate::lifecycle::CancelSignal;
use crate::observability::metrics;
use crate::resilience::{poll_until, PollOutcome, PollPolicy};
use crate::rpc::{RpcResponse, RpcTransport};

const WITHDRAW_COMMENT: &str = "withdraw_sended";
const WITHDRAW_COMMENT_TO: &str = "withdraw_received";
const TRANSIT_COMMENT: &str = "transit_from";
const TRANSIT_COMMENT_TO: &str = "transit_to";

/// How the node models per-customer funds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UtxoDialect {
    WalletPerTag,
    AccountLabels,
}

/// Explicit fee rates (sat/vB) passed to `sendtoaddress`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeSchedule {
    pub withdraw_fee_rate: u32,
    pub sweep_fee_rate: u32,
}

impl Default for FeeSchedule {
    fn default() -> Self {
        Self {
            withdraw_fee_rate: 50,
            sweep_fee_rate: 51,
        }
    }
}

/// Which `sendtoaddress` flavour to issue.
#[derive(Debug, Clone, Copy)]
enum Transfer {
    /// Recipient receives the full amount.
    Withdraw,
    /// Fee comes out of the swept amount.
    Transit,
}

/// Latest deposit on a tag that the ledger has not recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnprocessedIncome {
    pub txid: Option<String>,
    pub tag: String,
}

/// One `listtransactions` entry; the rest of the fields are ignored.
///
/// Account-label `move` rows carry no txid.
#[derive(Debug, Deserialize)]
struct ListedTransaction {
    #[serde(default)]
    txid: Option<String>,
    amount: Decimal,
}

/// Provider for Bitcoin-family nodes over any [`RpcTransport`].
#[derive(Debug)]
pub struct UtxoProvider<T> {
    transport: T,
    coin: Coin,
    dialect: UtxoDialect,
    fees: FeeSchedule,
    custody: WalletTag,
    lookup_policy: PollPolicy,
    retry_policy: PollPolicy,
}

impl<T: RpcTransport> UtxoProvider<T> {
    pub fn new(transport: T, coin: Coin, dialect: UtxoDialect, custody: WalletTag) -> Self {
        Self {
            transport,
            coin,
            dialect,
            fees: FeeSchedule::default(),
            custody,
            lookup_policy: PollPolicy::default(),
            retry_policy: PollPolicy::backoff(3, 100, 2000),
        }
    }

    pub fn with_fees(mut self, fees: FeeSchedule) -> Self {
        self.fees = fees;
        self
    }

    /// Attempts and interval of the transaction lookup loop.
    pub fn with_lookup_policy(mut self, policy: PollPolicy) -> Self {
        self.lookup_policy = policy;
        self
    }

    /// Attempts and backoff for sweeps the node never received.
    pub fn with_retry_policy(mut self, policy: PollPolicy) -> Self {
        self.retry_policy = policy;
        self
    }

    pub fn coin(&self) -> Coin {
        self.coin
    }

    pub fn dialect(&self) -> UtxoDialect {
        self.dialect
    }

    pub fn custody(&self) -> &WalletTag {
        &self.custody
    }

    async fn call(&self, method: &str, params: Value, wallet: Option<&str>) -> ChainResult<RpcResponse> {
        Ok(self.transport.call(method, params, wallet).await?)
    }

    /// Wallet scope for a call under this dialect.
    fn scope<'a>(&self, tag: &'a WalletTag) -> Option<&'a str> {
        match self.dialect {
            UtxoDialect::WalletPerTag => Some(tag.as_str()),
            UtxoDialect::AccountLabels => None,
        }
    }

    /// Load `tag`'s wallet into node memory.
    ///
    /// A node-side refusal (typically "already loaded") is logged and
    /// tolerated; only transport failures are returned.
    pub async fn load_wallet(&self, tag: &WalletTag) -> ChainResult<()> {
        tag.validate()?;
        if self.dialect == UtxoDialect::AccountLabels {
            return Ok(());
        }
        let response = self.call("loadwallet", json!([tag.as_str()]), None).await?;
        if !response.error.is_null() {
            tracing::debug!(coin = %self.coin, tag = %tag, reason = %response.error_message(), "loadwallet refused");
        } else {
            tracing::debug!(coin = %self.coin, tag = %tag, "Wallet loaded");
        }
        Ok(())
    }

    /// Unload `tag`'s wallet. A no-op for custody tags.
    pub async fn unload_wallet(&self, tag: &WalletTag) -> ChainResult<()> {
        tag.validate()?;
        if self.dialect == UtxoDialect::AccountLabels || tag.is_custody() {
            return Ok(());
        }
        let response = self.call("unloadwallet", json!([tag.as_str()]), None).await?;
        if !response.error.is_null() {
            tracing::warn!(coin = %self.coin, tag = %tag, reason = %response.error_message(), "unloadwallet refused");
        } else {
            tracing::debug!(coin = %self.coin, tag = %tag, "Wallet unloaded");
        }
        Ok(())
    }

    /// Run `op` with `tag`'s wallet loaded; unload afterwards whatever `op` returned.
    async fn scoped<R, F, Fut>(&self, tag: &WalletTag, op: F) -> ChainResult<R>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = ChainResult<R>>,
    {
        self.load_wallet(tag).await?;
        let result = op().await;
        self.release(tag).await;
        result
    }

    /// Unload, logging instead of failing so the guarded result survives.
    async fn release(&self, tag: &WalletTag) {
        if let Err(e) = self.unload_wallet(tag).await {
            tracing::warn!(coin = %self.coin, tag = %tag, error = %e, "Wallet left loaded; needs reconciliation");
        }
    }

    /// Create the tag's wallet and return a receiving address.
    ///
    /// The wallet is not memory-resident when this returns.
    pub async fn create_wallet(&self, tag: &WalletTag) -> ChainResult<String> {
        tag.validate()?;
        match self.dialect {
            UtxoDialect::WalletPerTag => {
                let response = self
                    .call("createwallet", json!({ "wallet_name": tag.as_str() }), None)
                    .await?;
                if response.result().is_none() {
                    return Err(ChainError::WalletCreation(response.error_message()));
                }
                // createwallet leaves the wallet loaded
                let address = self.receiving_address(tag).await;
                self.release(tag).await;
                let address = address?;
                tracing::info!(coin = %self.coin, tag = %tag, "Wallet created");
                Ok(address)
            }
            UtxoDialect::AccountLabels => {
                let response = self.call("getnewaddress", json!([tag.as_str()]), None).await?;
                if response.result().is_none() {
                    return Err(ChainError::WalletCreation(response.error_message()));
                }
                let address = self.receiving_address(tag).await?;
                tracing::info!(coin = %self.coin, tag = %tag, "Account label created");
                Ok(address)
            }
        }
    }

    /// Receiving address for `tag`, generating one if the node has none.
    ///
    /// Wallet-per-tag nodes must have the wallet loaded.
    pub async fn receiving_address(&self, tag: &WalletTag) -> ChainResult<String> {
        match self.dialect {
            UtxoDialect::WalletPerTag => {
                let scope = Some(tag.as_str());
                self.call("getnewaddress", json!([]), scope).await?;
                let response = self.call("getaddressesbylabel", json!([""]), scope).await?;
                response
                    .result()
                    .and_then(Value::as_object)
                    .and_then(|addresses| addresses.keys().next().cloned())
                    .ok_or_else(|| ChainError::WalletCreation(response.error_message()))
            }
            UtxoDialect::AccountLabels => {
                let response = self.call("getaccountaddress", json!([tag.as_str()]), None).await?;
                string_result(&response).ok_or_else(|| ChainError::WalletCreation(response.error_message()))
            }
        }
    }

    /// Confirmed plus unconfirmed balance of the custody wallet.
    pub async fn custody_balance(&self) -> ChainResult<Decimal> {
        let response = match self.dialect {
            UtxoDialect::WalletPerTag => {
                self.call("getbalance", json!(["*"]), Some(self.custody.as_str())).await?
            }
            UtxoDialect::AccountLabels => {
                self.call("getbalance", json!([self.custody.as_str()]), None).await?
            }
        };
        decimal_result(&response)
    }

    /// Balance the node reports for a wallet name, account label or address.
    pub async fn balance_of(&self, wallet: &str) -> ChainResult<Decimal> {
        let response = self.call("getbalance", json!([wallet]), None).await?;
        decimal_result(&response)
    }

    /// Withdraw from custody to `to`.
    pub async fn send(&self, to: &str, amount: Decimal) -> ChainResult<String> {
        let txid = match self.dialect {
            UtxoDialect::WalletPerTag => {
                self.send_to_address(&self.custody, to, amount, Transfer::Withdraw)
                    .await?
            }
            UtxoDialect::AccountLabels => self.send_from_label(&self.custody, to, amount).await?,
        };
        tracing::info!(coin = %self.coin, to = to, amount = %amount, txid = %txid, "Withdrawal sent");
        Ok(txid)
    }

    /// Send from a tag wallet to `to`.
    pub async fn send_from_tag(&self, tag: &WalletTag, to: &str, amount: Decimal) -> ChainResult<String> {
        tag.validate()?;
        match self.dialect {
            UtxoDialect::WalletPerTag => {
                self.scoped(tag, || self.send_to_address(tag, to, amount, Transfer::Withdraw))
                    .await
            }
            UtxoDialect::AccountLabels => self.send_from_label(tag, to, amount).await,
        }
    }

    async fn send_to_address(
        &self,
        wallet: &WalletTag,
        to: &str,
        amount: Decimal,
        transfer: Transfer,
    ) -> ChainResult<String> {
        let (comment, comment_to, subtract_fee, fee_rate) = match transfer {
            Transfer::Withdraw => (WITHDRAW_COMMENT, WITHDRAW_COMMENT_TO, false, self.fees.withdraw_fee_rate),
            Transfer::Transit => (TRANSIT_COMMENT, TRANSIT_COMMENT_TO, true, self.fees.sweep_fee_rate),
        };
        let params = json!([
            to,
            amount_param(amount)?,
            comment,
            comment_to,
            subtract_fee,
            true,
            null,
            "unset",
            null,
            fee_rate
        ]);
        let response = self.call("sendtoaddress", params, Some(wallet.as_str())).await?;
        string_result(&response).ok_or_else(|| ChainError::Send(response.error_message()))
    }

    async fn send_from_label(&self, label: &WalletTag, to: &str, amount: Decimal) -> ChainResult<String> {
        let params = json!([label.as_str(), to, amount_param(amount)?]);
        let response = self.call("sendfrom", params, None).await?;
        string_result(&response).ok_or_else(|| ChainError::Send(response.error_message()))
    }

    /// Move `amount` from `tag` into custody at `main_address`.
    ///
    /// Only requests the node never received are retried; anything that may
    /// have reached the node is returned to the caller.
    pub async fn sweep(&self, main_address: &str, tag: &WalletTag, amount: Decimal) -> ChainResult<SweepOutcome> {
        tag.validate()?;
        let outcome = poll_until(
            &self.retry_policy,
            "sweep",
            &mut CancelSignal::never(),
            |attempt| async move {
                let result = self.sweep_once(main_address, tag, amount).await;
                if let Err(ChainError::Transport(e)) = &result {
                    tracing::warn!(coin = %self.coin, tag = %tag, attempt = attempt, error = %e, "Sweep attempt failed");
                }
                Ok::<_, Infallible>(result)
            },
            |result| !matches!(result, Err(ChainError::Transport(e)) if e.is_retryable()),
        )
        .await;

        let result = match outcome {
            Ok(PollOutcome::Ready { value, .. }) | Ok(PollOutcome::Exhausted { last: value, .. }) => value,
            Ok(PollOutcome::Cancelled { .. }) => Err(ChainError::Cancelled),
            Err(never) => match never {},
        };

        match &result {
            Ok(swept) => {
                metrics::record_sweep(self.coin.ticker(), "ok");
                tracing::info!(coin = %self.coin, tag = %tag, amount = %amount, outcome = ?swept, "Sweep to custody complete");
            }
            Err(e) => {
                metrics::record_sweep(self.coin.ticker(), "error");
                tracing::warn!(coin = %self.coin, tag = %tag, error = %e, "Sweep to custody failed");
            }
        }
        result
    }

    async fn sweep_once(&self, main_address: &str, tag: &WalletTag, amount: Decimal) -> ChainResult<SweepOutcome> {
        match self.dialect {
            UtxoDialect::WalletPerTag => self
                .scoped(tag, || self.send_to_address(tag, main_address, amount, Transfer::Transit))
                .await
                .map(SweepOutcome::Broadcast),
            UtxoDialect::AccountLabels => {
                let params = json!([tag.as_str(), self.custody.as_str(), amount_param(amount)?]);
                let response = self.call("move", params, None).await?;
                match response.result() {
                    Some(_) => Ok(SweepOutcome::Moved),
                    None => Err(ChainError::Send(response.error_message())),
                }
            }
        }
    }

    /// Poll `tag`'s wallet until the node reports `txid`.
    ///
    /// The wallet is loaded once before the first attempt and unloaded
    /// exactly once afterwards, also on error and cancellation.
    pub async fn lookup_transaction(
        &self,
        tag: &WalletTag,
        txid: &str,
        cancel: &mut CancelSignal,
    ) -> ChainResult<LookupOutcome> {
        tag.validate()?;
        let scope = self.scope(tag);
        self.load_wallet(tag).await?;

        let outcome = poll_until(
            &self.lookup_policy,
            "tag_lookup",
            cancel,
            |_| self.call("gettransaction", json!([txid]), scope),
            |response| response.result().is_some(),
        )
        .await;

        self.release(tag).await;

        match outcome? {
            PollOutcome::Ready { value, attempts } => {
                let record = parse_record(&value)?;
                tracing::debug!(coin = %self.coin, tag = %tag, txid = txid, attempts = attempts, "Transaction visible");
                Ok(LookupOutcome::Found { record, attempts })
            }
            PollOutcome::Exhausted { last, attempts } => {
                tracing::warn!(coin = %self.coin, tag = %tag, txid = txid, attempts = attempts, "Transaction not yet visible");
                Ok(LookupOutcome::NotYetVisible { attempts, last })
            }
            PollOutcome::Cancelled { attempts, .. } => {
                tracing::info!(coin = %self.coin, tag = %tag, txid = txid, attempts = attempts, "Transaction lookup cancelled");
                Ok(LookupOutcome::Cancelled { attempts })
            }
        }
    }

    /// Amount, address and intent of a tag transaction.
    pub async fn transaction_summary(
        &self,
        tag: &WalletTag,
        txid: &str,
        cancel: &mut CancelSignal,
    ) -> ChainResult<TransferSummary> {
        match self.lookup_transaction(tag, txid, cancel).await? {
            LookupOutcome::Found { record, .. } => {
                let first = record.details.first();
                Ok(TransferSummary {
                    address: first.and_then(|d| d.address.clone()),
                    category: first.map(|d| d.category.clone()),
                    classification: classify(&record.details, &self.custody),
                    txid: record.txid,
                    amount: record.amount,
                    confirmations: record.confirmations,
                })
            }
            LookupOutcome::NotYetVisible { attempts, .. } => Err(ChainError::LookupTimeout {
                txid: txid.to_string(),
                attempts,
            }),
            LookupOutcome::Cancelled { .. } => Err(ChainError::Cancelled),
        }
    }

    /// Confirmation depth of a custody-wallet transaction.
    pub async fn confirmations(&self, txid: &str) -> ChainResult<Confirmations> {
        let scope = self.scope(&self.custody);
        let response = self.call("gettransaction", json!([txid]), scope).await?;
        let Some(result) = response.result() else {
            return Err(ChainError::TransactionNotFound(txid.to_string()));
        };
        let depth = result
            .get("confirmations")
            .and_then(Value::as_i64)
            .ok_or_else(|| ChainError::Node(format!("gettransaction {} has no confirmations", txid)))?;
        // Negative depth marks a conflicted transaction
        Ok(u64::try_from(depth).map_or(Confirmations::Unknown, Confirmations::Confirmed))
    }

    /// Most recent incoming transaction on `tag` the ledger has not recorded.
    ///
    /// Scans newest to oldest in node order and stops at the first hit; the
    /// wallet must already be loaded on wallet-per-tag nodes.
    pub async fn find_last_unprocessed_income(
        &self,
        tag: &WalletTag,
        ledger: &dyn IncomeLedger,
    ) -> ChainResult<Option<String>> {
        tag.validate()?;
        let response = match self.dialect {
            UtxoDialect::WalletPerTag => {
                self.call("listtransactions", json!([]), Some(tag.as_str())).await?
            }
            UtxoDialect::AccountLabels => {
                self.call("listtransactions", json!([tag.as_str()]), None).await?
            }
        };
        let Some(result) = response.result() else {
            return Ok(None);
        };
        let listed: Vec<ListedTransaction> = serde_json::from_value(result.clone())
            .map_err(|e| ChainError::Node(format!("listtransactions: {}", e)))?;

        for transaction in listed.iter().rev() {
            if transaction.amount.is_sign_negative() {
                continue;
            }
            let Some(txid) = &transaction.txid else {
                continue;
            };
            let recorded = ledger
                .income_exists(txid)
                .await
                .map_err(|e| ChainError::Ledger(e.to_string()))?;
            if !recorded {
                return Ok(Some(txid.clone()));
            }
        }
        Ok(None)
    }

    /// Load `tag`, find its latest unrecorded deposit, unload.
    pub async fn unprocessed_income(
        &self,
        tag: &WalletTag,
        ledger: &dyn IncomeLedger,
    ) -> ChainResult<UnprocessedIncome> {
        let txid = self
            .scoped(tag, || self.find_last_unprocessed_income(tag, ledger))
            .await?;
        Ok(UnprocessedIncome {
            txid,
            tag: tag.to_string(),
        })
    }

    /// Transaction ids in a block.
    pub async fn block_transactions(&self, blockhash: &str) -> ChainResult<Vec<String>> {
        let response = self.call("getblock", json!([blockhash]), None).await?;
        let txids = response
            .result()
            .and_then(|block| block.get("tx"))
            .and_then(Value::as_array)
            .ok_or_else(|| ChainError::Node(response.error_message()))?;
        Ok(txids
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect())
    }

    /// Serialized transaction as hex.
    pub async fn raw_transaction(&self, txid: &str) -> ChainResult<String> {
        let response = self.call("getrawtransaction", json!([txid]), None).await?;
        string_result(&response).ok_or_else(|| ChainError::TransactionNotFound(txid.to_string()))
    }
}

fn string_result(response: &RpcResponse) -> Option<String> {
    response.result().and_then(Value::as_str).map(str::to_string)
}

fn decimal_result(response: &RpcResponse) -> ChainResult<Decimal> {
    if !response.error.is_null() {
        return Err(ChainError::Node(response.error_message()));
    }
    serde_json::from_value(response.result.clone())
        .map_err(|e| ChainError::Node(format!("unexpected balance {}: {}", response.result, e)))
}

fn parse_record(response: &RpcResponse) -> ChainResult<TransactionRecord> {
    serde_json::from_value(response.result.clone())
        .map_err(|e| ChainError::Node(format!("gettransaction: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rpc::{TransportError, TransportResult};
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Replays canned responses and records every call.
    #[derive(Default)]
    struct Scripted {
        replies: Mutex<VecDeque<TransportResult<RpcResponse>>>,
        calls: Mutex<Vec<(String, Value, Option<String>)>>,
    }

    impl Scripted {
        fn reply(self, response: TransportResult<RpcResponse>) -> Self {
            self.replies.lock().unwrap().push_back(response);
            self
        }

        fn ok(self, result: Value) -> Self {
            self.reply(Ok(RpcResponse::ok(result)))
        }

        fn methods(&self) -> Vec<String> {
            self.calls.lock().unwrap().iter().map(|c| c.0.clone()).collect()
        }
    }

    #[async_trait]
    impl RpcTransport for Scripted {
        async fn call(&self, method: &str, params: Value, wallet: Option<&str>) -> TransportResult<RpcResponse> {
            self.calls
                .lock()
                .unwrap()
                .push((method.to_string(), params, wallet.map(str::to_string)));
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(RpcResponse::ok(json!(true))))
        }
    }

    fn provider(node: Scripted, dialect: UtxoDialect) -> UtxoProvider<Scripted> {
        UtxoProvider::new(node, Coin::Bitcoin, dialect, WalletTag::custody(false))
            .with_lookup_policy(PollPolicy::fixed(20, Duration::from_secs(1)))
            .with_retry_policy(PollPolicy::fixed(3, Duration::from_millis(10)))
    }

    #[tokio::test]
    async fn test_send_params() {
        let node = Scripted::default().ok(json!("txid1"));
        let provider = provider(node, UtxoDialect::WalletPerTag);

        let txid = provider.send("bc1qdest", Decimal::new(15, 1)).await.unwrap();
        assert_eq!(txid, "txid1");

        let calls = provider.transport.calls.lock().unwrap();
        let (method, params, wallet) = &calls[0];
        assert_eq!(method, "sendtoaddress");
        assert_eq!(wallet.as_deref(), Some("main"));
        assert_eq!(
            params,
            &json!(["bc1qdest", 1.5, "withdraw_sended", "withdraw_received", false, true, null, "unset", null, 50])
        );
    }

    #[tokio::test]
    async fn test_send_rejected() {
        let node = Scripted::default().reply(Ok(RpcResponse::err(-6, "Insufficient funds")));
        let provider = provider(node, UtxoDialect::WalletPerTag);

        let result = provider.send("bc1qdest", Decimal::ONE).await;
        assert!(matches!(result, Err(ChainError::Send(ref m)) if m == "Insufficient funds"));
    }

    #[tokio::test]
    async fn test_custody_is_never_unloaded() {
        let provider = provider(Scripted::default(), UtxoDialect::WalletPerTag);
        provider.unload_wallet(&WalletTag::custody(false)).await.unwrap();
        provider.unload_wallet(&WalletTag::custody(true)).await.unwrap();
        assert!(provider.transport.methods().is_empty());
    }

    #[tokio::test]
    async fn test_create_wallet_failure() {
        let node = Scripted::default().reply(Ok(RpcResponse::err(-4, "Database already exists")));
        let provider = provider(node, UtxoDialect::WalletPerTag);

        let result = provider.create_wallet(&WalletTag::new("cust1")).await;
        assert!(matches!(result, Err(ChainError::WalletCreation(ref m)) if m.contains("already exists")));
        assert_eq!(provider.transport.methods(), vec!["createwallet"]);
    }

    #[tokio::test]
    async fn test_create_wallet_unloads_when_address_lookup_fails() {
        let node = Scripted::default()
            .ok(json!({"name": "cust1"}))
            .reply(Err(TransportError::Http("500".into())));
        let provider = provider(node, UtxoDialect::WalletPerTag);

        assert!(provider.create_wallet(&WalletTag::new("cust1")).await.is_err());
        assert_eq!(provider.transport.methods(), vec!["createwallet", "getnewaddress", "unloadwallet"]);
    }

    #[tokio::test]
    async fn test_label_dialect_create_wallet() {
        let node = Scripted::default().ok(json!("DNew")).ok(json!("DAccount"));
        let provider = provider(node, UtxoDialect::AccountLabels);

        let address = provider.create_wallet(&WalletTag::new("cust1")).await.unwrap();
        assert_eq!(address, "DAccount");
        assert_eq!(provider.transport.methods(), vec!["getnewaddress", "getaccountaddress"]);
    }

    #[tokio::test]
    async fn test_label_dialect_sweep_moves() {
        let node = Scripted::default().ok(json!(true));
        let provider = provider(node, UtxoDialect::AccountLabels);

        let outcome = provider
            .sweep("ignored", &WalletTag::new("cust1"), Decimal::new(2, 0))
            .await
            .unwrap();
        assert_eq!(outcome, SweepOutcome::Moved);

        let calls = provider.transport.calls.lock().unwrap();
        assert_eq!(calls[0].0, "move");
        assert_eq!(calls[0].1, json!(["cust1", "main", 2.0]));
    }

    #[tokio::test]
    async fn test_label_dialect_move_refused() {
        let node = Scripted::default().ok(json!(false));
        let provider = provider(node, UtxoDialect::AccountLabels);

        let result = provider.sweep("ignored", &WalletTag::new("cust1"), Decimal::ONE).await;
        assert!(matches!(result, Err(ChainError::Send(_))));
    }

    #[tokio::test]
    async fn test_blank_tag_never_reaches_node() {
        let provider = provider(Scripted::default(), UtxoDialect::WalletPerTag);
        let blank = WalletTag::new("");

        let created = provider.create_wallet(&blank).await;
        assert!(matches!(created, Err(ChainError::InvalidTag(_))));
        let swept = provider.sweep("bc1qmain", &blank, Decimal::ONE).await;
        assert!(matches!(swept, Err(ChainError::InvalidTag(_))));
        let looked_up = provider
            .lookup_transaction(&blank, "tx", &mut CancelSignal::never())
            .await;
        assert!(matches!(looked_up, Err(ChainError::InvalidTag(_))));
        let income = provider.unprocessed_income(&blank, &|_: &str| false).await;
        assert!(matches!(income, Err(ChainError::InvalidTag(_))));

        assert!(provider.transport.methods().is_empty());
    }

    #[tokio::test]
    async fn test_confirmations() {
        let node = Scripted::default()
            .ok(json!({"txid": "a", "confirmations": 4}))
            .ok(json!({"txid": "b", "confirmations": -1}))
            .reply(Ok(RpcResponse::err(-5, "Invalid or non-wallet transaction id")));
        let provider = provider(node, UtxoDialect::WalletPerTag);

        assert_eq!(provider.confirmations("a").await.unwrap(), Confirmations::Confirmed(4));
        assert_eq!(provider.confirmations("b").await.unwrap(), Confirmations::Unknown);
        assert!(matches!(
            provider.confirmations("c").await,
            Err(ChainError::TransactionNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_custody_balance_zero_is_a_value() {
        let node = Scripted::default().ok(json!(0));
        let provider = provider(node, UtxoDialect::WalletPerTag);
        assert_eq!(provider.custody_balance().await.unwrap(), Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_block_transactions() {
        let node = Scripted::default().ok(json!({"hash": "h", "tx": ["t1", "t2"]}));
        let provider = provider(node, UtxoDialect::WalletPerTag);
        assert_eq!(provider.block_transactions("h").await.unwrap(), vec!["t1", "t2"]);
    }
}
