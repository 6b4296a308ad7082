//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Signals (signals.rs):
//!     SIGINT → Shutdown::trigger
//!
//! Shutdown (shutdown.rs):
//!     trigger → every CancelSignal resolves → polling loops stop
//!     → scoped wallets are still unloaded on the way out
//! ```

pub mod shutdown;
pub mod signals;

pub use shutdown::{CancelSignal, Shutdown};
