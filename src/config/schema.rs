//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from TOML files.

use serde::{Deserialize, Serialize};

/// Root configuration for the gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Logging settings.
    pub observability: ObservabilityConfig,

    /// Custody wallet selection.
    pub custody: CustodyConfig,

    /// Transaction lookup loop.
    pub polling: PollingConfig,

    /// Sweep retry on undelivered requests.
    pub retries: RetryConfig,

    pub bitcoin: Option<UtxoChainConfig>,
    pub litecoin: Option<UtxoChainConfig>,
    pub dogecoin: Option<UtxoChainConfig>,
    pub ethereum: Option<AccountChainConfig>,
    pub bnb: Option<AccountChainConfig>,
    pub tron: Option<TronConfig>,
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Pretty text for terminals, JSON for log shippers.
    pub log_format: LogFormat,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
        }
    }
}

/// Custody wallet configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct CustodyConfig {
    /// Use `dev_main` instead of `main` as the custody wallet.
    pub dev_mode: bool,
}

/// Transaction lookup loop configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PollingConfig {
    /// Total lookup attempts before giving up.
    pub max_attempts: u32,

    /// Pause between attempts in milliseconds.
    pub interval_ms: u64,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            max_attempts: 20,
            interval_ms: 1000,
        }
    }
}

/// Retry configuration for sweeps.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Maximum number of attempts, first one included.
    pub max_attempts: u32,

    /// Base delay for exponential backoff in milliseconds.
    pub base_delay_ms: u64,

    /// Maximum delay for exponential backoff in milliseconds.
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 100,
            max_delay_ms: 2000,
        }
    }
}

/// Bitcoin-family node connection.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UtxoChainConfig {
    /// JSON-RPC endpoint URL.
    pub rpc_url: String,

    pub rpc_user: String,

    pub rpc_password: String,

    /// RPC request timeout in seconds.
    pub rpc_timeout_secs: u64,
}

impl Default for UtxoChainConfig {
    fn default() -> Self {
        Self {
            rpc_url: "http://127.0.0.1:8332".to_string(),
            rpc_user: String::new(),
            rpc_password: String::new(),
            rpc_timeout_secs: 30,
        }
    }
}

/// Ethereum-family node connection.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AccountChainConfig {
    /// JSON-RPC endpoint URL.
    pub rpc_url: String,

    /// Failover JSON-RPC endpoint URLs.
    pub failover_urls: Vec<String>,

    /// RPC request timeout in seconds.
    pub rpc_timeout_secs: u64,

    /// Overrides the coin's chain ID (e.g. 31337 for a local Anvil).
    pub chain_id: Option<u64>,

    /// Token contract used for transfers instead of the native coin.
    pub token_contract: Option<String>,

    /// Decimal places of `token_contract` (18 for BEP-20 tokens).
    pub token_decimals: u32,
}

impl Default for AccountChainConfig {
    fn default() -> Self {
        Self {
            rpc_url: "http://localhost:8545".to_string(),
            failover_urls: Vec::new(),
            rpc_timeout_secs: 10,
            chain_id: None,
            token_contract: None,
            token_decimals: 18,
        }
    }
}

/// Tron full-node HTTP API.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TronConfig {
    /// Full-node HTTP API base URL.
    pub api_url: String,

    /// TronGrid API key, usually supplied through `TRON_API_KEY`.
    pub api_key: String,

    /// Stablecoin contract used for balances and transfers.
    pub usdt_contract: String,

    /// Energy fee ceiling in sun.
    pub fee_limit_sun: u64,

    /// HTTP request timeout in seconds.
    pub request_timeout_secs: u64,

    /// Checks for the broadcast result before giving up.
    pub wait_attempts: u32,

    /// Pause between broadcast result checks in milliseconds.
    pub wait_interval_ms: u64,
}

impl Default for TronConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.trongrid.io".to_string(),
            api_key: String::new(),
            usdt_contract: "TR7NHqjeKQxGTCi8q8ZY4pL8otSzgjLj6t".to_string(),
            fee_limit_sun: 1_000_000_000,
            request_timeout_secs: 30,
            wait_attempts: 20,
            wait_interval_ms: 1600,
        }
    }
}
