//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Transaction lookup:
//!     → polling.rs (fixed interval, stop when the node has indexed the tx)
//!
//! Sweep:
//!     → polling.rs (backoff.rs delays, stop unless the request never reached the node)
//! ```
//!
//! # Design Decisions
//! - One loop, parameterized by an attempt function and a stop predicate
//! - Every loop is bounded and cancellable
//! - Exhaustion and cancellation are values, not errors

pub mod backoff;
pub mod polling;

pub use polling::{poll_until, Delay, PollOutcome, PollPolicy};
