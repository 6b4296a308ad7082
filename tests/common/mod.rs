//! Scripted node doubles shared by the integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use alloy::primitives::{Address, TxHash, U256};
use alloy::rpc::types::TransactionRequest;
use async_trait::async_trait;
use serde_json::{json, Value};
use sha2::{Digest, Sha256};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use chain_gateway::blockchain::{BlockchainError, BlockchainResult, NodeTransaction};
use chain_gateway::chain::{ChainError, ChainResult};
use chain_gateway::providers::{AccountNode, TronNode};
use chain_gateway::rpc::{RpcResponse, RpcTransport, TransportError, TransportResult};
use chain_gateway::tron::types::{
    BroadcastReceipt, ContractCall, SignedTransaction, TransactionInfo, TronTransaction,
    UnsignedTransaction,
};

/// One call seen by [`ScriptedNode`].
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub method: String,
    pub params: Value,
    pub wallet: Option<String>,
}

type Responder = dyn Fn(&str, &Value, Option<&str>, usize) -> TransportResult<RpcResponse> + Send + Sync;

/// In-memory JSON-RPC node. Clones share the call log.
///
/// The responder receives the method, params, wallet scope and how many
/// times the method has been called so far, this call included.
#[derive(Clone)]
pub struct ScriptedNode {
    calls: Arc<Mutex<Vec<Call>>>,
    responder: Arc<Responder>,
}

impl ScriptedNode {
    pub fn new<F>(responder: F) -> Self
    where
        F: Fn(&str, &Value, Option<&str>, usize) -> TransportResult<RpcResponse> + Send + Sync + 'static,
    {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            responder: Arc::new(responder),
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn methods(&self) -> Vec<String> {
        self.calls().into_iter().map(|c| c.method).collect()
    }

    pub fn count(&self, method: &str) -> usize {
        self.calls().iter().filter(|c| c.method == method).count()
    }
}

#[async_trait]
impl RpcTransport for ScriptedNode {
    async fn call(
        &self,
        method: &str,
        params: Value,
        wallet: Option<&str>,
    ) -> TransportResult<RpcResponse> {
        let nth = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(Call {
                method: method.to_string(),
                params: params.clone(),
                wallet: wallet.map(str::to_string),
            });
            calls.iter().filter(|c| c.method == method).count()
        };
        (self.responder)(method, &params, wallet, nth)
    }
}

pub fn ok(result: Value) -> TransportResult<RpcResponse> {
    Ok(RpcResponse::ok(result))
}

pub fn node_error(message: &str) -> TransportResult<RpcResponse> {
    Ok(RpcResponse::err(-4, message))
}

pub fn unreachable() -> TransportResult<RpcResponse> {
    Err(TransportError::Connect("connection refused".to_string()))
}

/// A `gettransaction` result with the given details.
pub fn wallet_transaction(txid: &str, amount: f64, confirmations: i64, details: Value) -> Value {
    json!({
        "txid": txid,
        "amount": amount,
        "confirmations": confirmations,
        "details": details,
    })
}

/// Account-model node with fixed answers. Clones share the broadcast log.
#[derive(Clone)]
pub struct MockEvmNode {
    pub nonce: u64,
    pub gas_price: u128,
    pub gas_estimate: u64,
    pub balances: HashMap<Address, U256>,
    pub transaction: Option<NodeTransaction>,
    pub head: u64,
    pub lookups_fail: bool,
    pub broadcasts: Arc<Mutex<Vec<Vec<u8>>>>,
}

impl Default for MockEvmNode {
    fn default() -> Self {
        Self {
            nonce: 0,
            gas_price: 5_000_000_000,
            gas_estimate: 21_000,
            balances: HashMap::new(),
            transaction: None,
            head: 0,
            lookups_fail: false,
            broadcasts: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl MockEvmNode {
    pub fn broadcasts(&self) -> Vec<Vec<u8>> {
        self.broadcasts.lock().unwrap().clone()
    }

    fn lookup<T>(&self, value: T) -> BlockchainResult<T> {
        if self.lookups_fail {
            Err(BlockchainError::Rpc("node unavailable".to_string()))
        } else {
            Ok(value)
        }
    }
}

#[async_trait]
impl AccountNode for MockEvmNode {
    async fn get_balance(&self, address: Address) -> BlockchainResult<U256> {
        Ok(self.balances.get(&address).copied().unwrap_or_default())
    }

    async fn get_transaction_count(&self, _address: Address) -> BlockchainResult<u64> {
        Ok(self.nonce)
    }

    async fn gas_price(&self) -> BlockchainResult<u128> {
        Ok(self.gas_price)
    }

    async fn estimate_gas(&self, _tx: &TransactionRequest) -> BlockchainResult<u64> {
        Ok(self.gas_estimate)
    }

    async fn send_raw_transaction(&self, raw: &[u8]) -> BlockchainResult<TxHash> {
        self.broadcasts.lock().unwrap().push(raw.to_vec());
        Ok(alloy::primitives::keccak256(raw))
    }

    async fn get_transaction(&self, _hash: TxHash) -> BlockchainResult<Option<NodeTransaction>> {
        self.lookup(self.transaction.clone())
    }

    async fn block_number(&self) -> BlockchainResult<u64> {
        self.lookup(self.head)
    }
}

/// Tron node double. Clones share state.
#[derive(Clone, Default)]
pub struct MockTronNode {
    pub balance: u64,
    pub decimals: u64,
    pub receipt: BroadcastReceipt,
    /// Returned by `transaction_info` from the `info_after`-th check on.
    pub info: Option<TransactionInfo>,
    pub info_after: usize,
    pub transaction: Option<TronTransaction>,
    pub info_checks: Arc<Mutex<usize>>,
    pub built: Arc<Mutex<Vec<ContractCall>>>,
    pub broadcast: Arc<Mutex<Vec<SignedTransaction>>>,
}

impl MockTronNode {
    pub fn accepting() -> Self {
        Self {
            decimals: 6,
            receipt: BroadcastReceipt {
                result: true,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    pub fn info_checks(&self) -> usize {
        *self.info_checks.lock().unwrap()
    }
}

fn word(value: u64) -> Vec<u8> {
    U256::from(value).to_be_bytes::<32>().to_vec()
}

#[async_trait]
impl TronNode for MockTronNode {
    async fn constant_call(
        &self,
        _owner: &str,
        _contract: &str,
        function_selector: &str,
        _parameter: &str,
    ) -> ChainResult<Vec<u8>> {
        match function_selector {
            "balanceOf(address)" => Ok(word(self.balance)),
            "decimals()" => Ok(word(self.decimals)),
            other => Err(ChainError::Node(format!("unexpected selector {}", other))),
        }
    }

    async fn build_contract_call(&self, call: &ContractCall) -> ChainResult<UnsignedTransaction> {
        self.built.lock().unwrap().push(call.clone());
        let raw = format!("{}:{}:{}", call.owner_address, call.parameter, call.fee_limit).into_bytes();
        Ok(UnsignedTransaction {
            tx_id: hex::encode(Sha256::digest(&raw)),
            raw_data: json!({ "fee_limit": call.fee_limit }),
            raw_data_hex: hex::encode(&raw),
        })
    }

    async fn broadcast(&self, tx: &SignedTransaction) -> ChainResult<BroadcastReceipt> {
        self.broadcast.lock().unwrap().push(tx.clone());
        Ok(self.receipt.clone())
    }

    async fn transaction_info(&self, txid: &str) -> ChainResult<Option<TransactionInfo>> {
        let mut checks = self.info_checks.lock().unwrap();
        *checks += 1;
        if *checks < self.info_after {
            return Ok(None);
        }
        Ok(self.info.clone().map(|info| TransactionInfo {
            id: txid.to_string(),
            ..info
        }))
    }

    async fn transaction(&self, _txid: &str) -> ChainResult<Option<TronTransaction>> {
        Ok(self.transaction.clone())
    }
}

/// What the HTTP backend saw for one request.
#[derive(Debug, Clone)]
pub struct SeenRequest {
    pub path: String,
    /// Header names lowercased.
    pub headers: HashMap<String, String>,
    pub body: Value,
}

impl SeenRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
    }
}

/// Start a programmable HTTP backend on an ephemeral port.
///
/// `f` maps each decoded request to a status code and body.
pub async fn start_programmable_backend<F>(f: F) -> SocketAddr
where
    F: Fn(&SeenRequest) -> (u16, String) + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let f = Arc::new(f);

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let f = f.clone();
                    tokio::spawn(async move {
                        let Some(request) = read_request(&mut socket).await else {
                            return;
                        };
                        let (status, body) = f(&request);
                        let status_text = match status {
                            200 => "200 OK",
                            401 => "401 Unauthorized",
                            404 => "404 Not Found",
                            500 => "500 Internal Server Error",
                            503 => "503 Service Unavailable",
                            _ => "200 OK",
                        };

                        let response_str = format!(
                            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                            status_text,
                            body.len(),
                            body
                        );
                        let _ = socket.write_all(response_str.as_bytes()).await;
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

async fn read_request(socket: &mut tokio::net::TcpStream) -> Option<SeenRequest> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let mut lines = head.lines();
    let path = lines.next()?.split_whitespace().nth(1)?.to_string();

    let mut headers = HashMap::new();
    for line in lines {
        if let Some((name, value)) = line.split_once(':') {
            headers.insert(name.trim().to_ascii_lowercase(), value.trim().to_string());
        }
    }
    let content_length: usize = match headers.get("content-length") {
        Some(length) => length.parse().ok()?,
        None => 0,
    };

    while buf.len() < header_end + content_length {
        let n = socket.read(&mut chunk).await.ok()?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    let body = serde_json::from_slice(&buf[header_end..]).unwrap_or(Value::Null);
    Some(SeenRequest {
        path,
        headers,
        body,
    })
}
