//! HTTP client for a Tron full node (TronGrid compatible).

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::time::Duration;
use uuid::Uuid;

use crate::chain::{ChainError, ChainResult};
use crate::config::TronConfig;
use crate::observability::metrics;
use crate::providers::tron::TronNode;
use crate::rpc::TransportError;
use crate::tron::types::{
    decode_message, BroadcastReceipt, ContractCall, SignedTransaction, TransactionInfo,
    TronTransaction, UnsignedTransaction,
};

/// Header carrying the TronGrid API key.
pub const API_KEY_HEADER: &str = "TRON-PRO-API-KEY";

#[derive(Clone)]
pub struct TronClient {
    http: reqwest::Client,
    api_url: String,
    api_key: String,
    timeout: Duration,
}

impl TronClient {
    pub fn new(config: &TronConfig) -> ChainResult<Self> {
        let timeout = Duration::from_secs(config.request_timeout_secs);
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Http(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self {
            http,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            timeout,
        })
    }

    fn classify(&self, e: reqwest::Error) -> TransportError {
        if e.is_connect() {
            TransportError::Connect(e.to_string())
        } else if e.is_timeout() {
            TransportError::Timeout(self.timeout.as_secs())
        } else if e.is_decode() {
            TransportError::Decode(e.to_string())
        } else {
            TransportError::Http(e.to_string())
        }
    }

    async fn post<R: DeserializeOwned>(&self, endpoint: &str, body: Value) -> ChainResult<R> {
        let request_id = Uuid::new_v4().to_string();
        let url = format!("{}/wallet/{}", self.api_url, endpoint);
        tracing::debug!(request_id = %request_id, endpoint = endpoint, "Tron API call");

        let mut request = self.http.post(&url).json(&body);
        if !self.api_key.is_empty() {
            request = request.header(API_KEY_HEADER, &self.api_key);
        }

        let response = match request.send().await {
            Ok(r) => r,
            Err(e) => {
                let err = self.classify(e);
                tracing::warn!(request_id = %request_id, endpoint = endpoint, error = %err, "Tron node unreachable");
                metrics::record_rpc(endpoint, "transport_error");
                return Err(err.into());
            }
        };

        let status = response.status();
        if !status.is_success() {
            metrics::record_rpc(endpoint, "transport_error");
            return Err(TransportError::Http(status.to_string()).into());
        }

        let value: Value = response.json().await.map_err(|e| self.classify(e))?;
        if let Some(error) = value.get("Error").and_then(Value::as_str) {
            metrics::record_rpc(endpoint, "node_error");
            return Err(ChainError::Node(error.to_string()));
        }
        metrics::record_rpc(endpoint, "ok");
        serde_json::from_value(value).map_err(|e| TransportError::Decode(e.to_string()).into())
    }
}

/// `result` object of contract-call responses.
fn check_call_result(value: &Value) -> ChainResult<()> {
    let result = value.get("result");
    if result.and_then(|r| r.get("result")).and_then(Value::as_bool) == Some(true) {
        return Ok(());
    }
    let message = result
        .and_then(|r| r.get("message"))
        .and_then(Value::as_str)
        .map(decode_message)
        .unwrap_or_else(|| value.to_string());
    Err(ChainError::Node(message))
}

/// Empty objects mean "not found" on lookup endpoints.
fn non_empty(value: Value) -> Option<Value> {
    match &value {
        Value::Object(map) if map.is_empty() => None,
        Value::Null => None,
        _ => Some(value),
    }
}

#[async_trait]
impl TronNode for TronClient {
    async fn constant_call(
        &self,
        owner: &str,
        contract: &str,
        function_selector: &str,
        parameter: &str,
    ) -> ChainResult<Vec<u8>> {
        let body = json!({
            "owner_address": owner,
            "contract_address": contract,
            "function_selector": function_selector,
            "parameter": parameter,
            "visible": true
        });
        let value: Value = self.post("triggerconstantcontract", body).await?;
        check_call_result(&value)?;
        let word = value
            .get("constant_result")
            .and_then(Value::as_array)
            .and_then(|results| results.first())
            .and_then(Value::as_str)
            .ok_or_else(|| ChainError::Node(format!("{} returned no result", function_selector)))?;
        hex::decode(word).map_err(|e| ChainError::Node(format!("constant_result: {}", e)))
    }

    async fn build_contract_call(&self, call: &ContractCall) -> ChainResult<UnsignedTransaction> {
        let mut body = serde_json::to_value(call).map_err(|e| ChainError::Node(e.to_string()))?;
        if let Value::Object(map) = &mut body {
            map.insert("call_value".to_string(), json!(0));
            map.insert("visible".to_string(), json!(true));
        }
        let value: Value = self.post("triggersmartcontract", body).await?;
        check_call_result(&value)?;
        let transaction = value
            .get("transaction")
            .cloned()
            .ok_or_else(|| ChainError::Node("triggersmartcontract returned no transaction".to_string()))?;
        serde_json::from_value(transaction).map_err(|e| ChainError::Node(format!("transaction: {}", e)))
    }

    async fn broadcast(&self, tx: &SignedTransaction) -> ChainResult<BroadcastReceipt> {
        let body = serde_json::to_value(tx).map_err(|e| ChainError::Node(e.to_string()))?;
        self.post("broadcasttransaction", body).await
    }

    async fn transaction_info(&self, txid: &str) -> ChainResult<Option<TransactionInfo>> {
        let value: Value = self.post("gettransactioninfobyid", json!({ "value": txid })).await?;
        non_empty(value)
            .map(|v| serde_json::from_value(v).map_err(|e| ChainError::Node(format!("transaction info: {}", e))))
            .transpose()
    }

    async fn transaction(&self, txid: &str) -> ChainResult<Option<TronTransaction>> {
        let value: Value = self
            .post("gettransactionbyid", json!({ "value": txid, "visible": true }))
            .await?;
        non_empty(value)
            .map(|v| serde_json::from_value(v).map_err(|e| ChainError::Node(format!("transaction: {}", e))))
            .transpose()
    }
}

impl std::fmt::Debug for TronClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TronClient")
            .field("api_url", &self.api_url)
            .field("api_key_set", &!self.api_key.is_empty())
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_call_result_failure_message() {
        let value = json!({"result": {"code": "CONTRACT_VALIDATE_ERROR", "message": hex::encode("No contract")}});
        let err = check_call_result(&value).unwrap_err();
        assert_eq!(err.to_string(), "Unexpected node response: No contract");
        assert!(check_call_result(&json!({"result": {"result": true}})).is_ok());
    }

    #[test]
    fn test_not_found_is_empty_object() {
        assert_eq!(non_empty(json!({})), None);
        assert!(non_empty(json!({"id": "ab"})).is_some());
    }

    #[test]
    fn test_debug_hides_api_key() {
        let config = TronConfig {
            api_key: "secret-key".to_string(),
            ..TronConfig::default()
        };
        let client = TronClient::new(&config).unwrap();
        assert!(!format!("{:?}", client).contains("secret-key"));
    }
}
