//! Multi-chain deposit and withdrawal gateway.
//!
//! Mediates between an exchange back office and the nodes of several
//! blockchains: wallet creation, balances, sends, sweeps into custody,
//! transaction lookup and confirmation tracking.

// Core subsystems
pub mod config;
pub mod rpc;
pub mod chain;

// Chain families
pub mod providers;
pub mod blockchain;
pub mod tron;
pub mod coins;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;
pub mod resilience;

pub use chain::{ChainError, ChainResult, ChainService, Coin, WalletTag};
pub use coins::Registry;
pub use config::GatewayConfig;
pub use lifecycle::Shutdown;
