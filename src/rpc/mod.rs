//! Node client subsystem.
//!
//! # Data Flow
//! ```text
//! provider (method, params, wallet scope)
//!     → client.rs (JSON-RPC envelope, basic auth, /wallet/<tag> suffix)
//!     → node
//!     → types.rs (RpcResponse: result + error, uninterpreted)
//! ```
//!
//! # Design Decisions
//! - The client never inspects the JSON-RPC `error` member; providers do
//! - No retries at this layer
//! - Transport failures say whether the request ever left the process

pub mod client;
pub mod types;

pub use client::{ChainEndpoint, NodeClient, RpcTransport};
pub use types::{RpcRequest, RpcResponse, TransportError, TransportResult};
