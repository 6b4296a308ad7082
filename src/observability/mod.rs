//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Node client, providers, polling engine produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters)
//! ```
//!
//! # Design Decisions
//! - Structured logging, JSON when shipped to an aggregator
//! - Every node call carries a request ID in its log events
//! - Counters go through the `metrics` facade; the embedding process picks the exporter
//! - Key material never reaches a log line

pub mod logging;
pub mod metrics;
