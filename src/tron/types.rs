//! Wire shapes of the Tron HTTP API (`visible: true` mode).

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Arguments of `/wallet/triggersmartcontract`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContractCall {
    pub owner_address: String,
    pub contract_address: String,
    pub function_selector: String,
    /// ABI-encoded arguments as hex, without the selector.
    pub parameter: String,
    pub fee_limit: u64,
}

/// Transaction built by the node, not yet signed.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct UnsignedTransaction {
    #[serde(rename = "txID")]
    pub tx_id: String,
    pub raw_data: Value,
    pub raw_data_hex: String,
}

/// Signed transaction ready for `/wallet/broadcasttransaction`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignedTransaction {
    #[serde(rename = "txID")]
    pub tx_id: String,
    pub raw_data: Value,
    pub raw_data_hex: String,
    pub signature: Vec<String>,
    pub visible: bool,
}

impl SignedTransaction {
    pub fn new(tx: UnsignedTransaction, signature: String) -> Self {
        Self {
            tx_id: tx.tx_id,
            raw_data: tx.raw_data,
            raw_data_hex: tx.raw_data_hex,
            signature: vec![signature],
            visible: true,
        }
    }
}

/// Node verdict on a broadcast.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BroadcastReceipt {
    #[serde(default)]
    pub result: bool,
    #[serde(default)]
    pub txid: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    /// Hex-encoded reason.
    #[serde(default)]
    pub message: Option<String>,
}

impl BroadcastReceipt {
    pub fn reason(&self) -> String {
        let message = self.message.as_deref().map(decode_message).unwrap_or_default();
        match &self.code {
            Some(code) => format!("{}: {}", code, message),
            None => message,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ContractReceipt {
    #[serde(default)]
    pub result: Option<String>,
}

/// Execution outcome from `/wallet/gettransactioninfobyid`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TransactionInfo {
    pub id: String,
    #[serde(default, rename = "blockNumber")]
    pub block_number: Option<u64>,
    #[serde(default)]
    pub receipt: ContractReceipt,
    /// Present as `"FAILED"` when execution failed.
    #[serde(default)]
    pub result: Option<String>,
    /// Hex-encoded failure reason.
    #[serde(default, rename = "resMessage")]
    pub res_message: Option<String>,
}

impl TransactionInfo {
    pub fn failed(&self) -> bool {
        self.result.as_deref() == Some("FAILED")
    }

    pub fn failure_reason(&self) -> String {
        match (&self.res_message, &self.receipt.result) {
            (Some(message), _) => decode_message(message),
            (None, Some(result)) => result.clone(),
            (None, None) => "FAILED".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ContractRet {
    #[serde(default, rename = "contractRet")]
    pub contract_ret: Option<String>,
}

/// Transaction from `/wallet/gettransactionbyid`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TronTransaction {
    #[serde(rename = "txID")]
    pub tx_id: String,
    #[serde(default)]
    pub ret: Vec<ContractRet>,
}

impl TronTransaction {
    pub fn contract_result(&self) -> Option<&str> {
        self.ret.first().and_then(|r| r.contract_ret.as_deref())
    }
}

/// Decode a hex-encoded node message, falling back to the raw text.
pub fn decode_message(message: &str) -> String {
    hex::decode(message)
        .ok()
        .and_then(|bytes| String::from_utf8(bytes).ok())
        .unwrap_or_else(|| message.to_string())
}
