//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse, apply IS_DEV / TRON_API_KEY overrides once)
//!     → validation.rs (semantic checks)
//!     → GatewayConfig (validated, immutable)
//!     → copied into each provider at construction
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; providers never re-read the environment
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    AccountChainConfig, CustodyConfig, GatewayConfig, LogFormat, ObservabilityConfig,
    PollingConfig, RetryConfig, TronConfig, UtxoChainConfig,
};
