//! JSON-RPC node client with basic auth and wallet scoping.
//!
//! # Responsibilities
//! - Wrap calls in the JSON-RPC envelope for the node's protocol version
//! - Select a wallet scope through the `/wallet/<tag>` path suffix
//! - Classify network and auth failures as transport errors

use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use url::Url;
use uuid::Uuid;

use crate::config::UtxoChainConfig;
use crate::observability::metrics;
use crate::rpc::types::{RpcRequest, RpcResponse, TransportError, TransportResult};

/// Anything that can carry a JSON-RPC call to a node.
#[async_trait]
pub trait RpcTransport: Send + Sync {
    /// Send `method` with `params`, optionally scoped to a node-side wallet.
    async fn call(
        &self,
        method: &str,
        params: Value,
        wallet: Option<&str>,
    ) -> TransportResult<RpcResponse>;
}

/// Address and credentials of one node. Immutable after construction.
#[derive(Clone)]
pub struct ChainEndpoint {
    url: Url,
    user: String,
    password: String,
    protocol_version: String,
    timeout: Duration,
}

impl ChainEndpoint {
    pub fn new(
        url: &str,
        user: &str,
        password: &str,
        protocol_version: &str,
        timeout: Duration,
    ) -> TransportResult<Self> {
        let url = Url::parse(url).map_err(|_| TransportError::InvalidUrl(url.to_string()))?;
        Ok(Self {
            url,
            user: user.to_string(),
            password: password.to_string(),
            protocol_version: protocol_version.to_string(),
            timeout,
        })
    }

    /// Build an endpoint from chain configuration.
    pub fn from_config(config: &UtxoChainConfig, protocol_version: &str) -> TransportResult<Self> {
        Self::new(
            &config.rpc_url,
            &config.rpc_user,
            &config.rpc_password,
            protocol_version,
            Duration::from_secs(config.rpc_timeout_secs),
        )
    }

    /// URL for a call, with the wallet suffix when scoped.
    ///
    /// The tag is percent-encoded as a single path segment.
    pub fn url_for(&self, wallet: Option<&str>) -> String {
        let mut url = self.url.clone();
        if let Some(tag) = wallet.filter(|tag| !tag.is_empty()) {
            if let Ok(mut segments) = url.path_segments_mut() {
                segments.pop_if_empty().push("wallet").push(tag);
            }
        }
        url.as_str().trim_end_matches('/').to_string()
    }

    pub fn protocol_version(&self) -> &str {
        &self.protocol_version
    }
}

impl std::fmt::Debug for ChainEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainEndpoint")
            .field("url", &self.url.as_str())
            .field("user", &self.user)
            .field("protocol_version", &self.protocol_version)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// HTTP JSON-RPC client for one node.
#[derive(Debug, Clone)]
pub struct NodeClient {
    http: reqwest::Client,
    endpoint: ChainEndpoint,
}

impl NodeClient {
    pub fn new(endpoint: ChainEndpoint) -> TransportResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(endpoint.timeout)
            .build()
            .map_err(|e| TransportError::Http(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { http, endpoint })
    }

    pub fn endpoint(&self) -> &ChainEndpoint {
        &self.endpoint
    }

    fn classify(&self, e: reqwest::Error) -> TransportError {
        if e.is_connect() {
            TransportError::Connect(e.to_string())
        } else if e.is_timeout() {
            TransportError::Timeout(self.endpoint.timeout.as_secs())
        } else {
            TransportError::Http(e.to_string())
        }
    }
}

#[async_trait]
impl RpcTransport for NodeClient {
    async fn call(
        &self,
        method: &str,
        params: Value,
        wallet: Option<&str>,
    ) -> TransportResult<RpcResponse> {
        let request_id = Uuid::new_v4().to_string();
        let request = RpcRequest {
            id: request_id.clone(),
            jsonrpc: &self.endpoint.protocol_version,
            method,
            params: &params,
        };

        tracing::debug!(
            request_id = %request_id,
            method = method,
            wallet = wallet.unwrap_or(""),
            "Node RPC call"
        );

        let sent = self
            .http
            .post(self.endpoint.url_for(wallet))
            .basic_auth(&self.endpoint.user, Some(&self.endpoint.password))
            .json(&request)
            .send()
            .await;

        let response = match sent {
            Ok(r) => r,
            Err(e) => {
                let err = self.classify(e);
                tracing::warn!(request_id = %request_id, method = method, error = %err, "Node unreachable");
                metrics::record_rpc(method, "transport_error");
                return Err(err);
            }
        };

        // Nodes answer RPC-level failures with non-2xx statuses and a JSON body,
        // so the body is decoded before the status is judged.
        let status = response.status();
        let body = response.bytes().await.map_err(|e| self.classify(e))?;
        match serde_json::from_slice::<RpcResponse>(&body) {
            Ok(decoded) => {
                let outcome = if decoded.error.is_null() { "ok" } else { "node_error" };
                metrics::record_rpc(method, outcome);
                Ok(decoded)
            }
            Err(e) if status.is_success() => {
                metrics::record_rpc(method, "transport_error");
                Err(TransportError::Decode(e.to_string()))
            }
            Err(_) => {
                tracing::warn!(request_id = %request_id, method = method, status = %status, "Node rejected request");
                metrics::record_rpc(method, "transport_error");
                Err(TransportError::Http(status.to_string()))
            }
        }
    }
}
