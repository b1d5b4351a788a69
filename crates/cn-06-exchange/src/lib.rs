//! # Block Exchange (cn-06)
//!
//! Requests and serves blocks over the swarm for one online session.
//!
//! ## Flow
//!
//! ```text
//! BlockStore miss ──fetch──→ want (shared per id)
//!                               │ every rebroadcast interval
//!                               ↓
//!                   Want(cid) → each connected peer
//!                               │
//!             Have(data) ───────┴── verified → resolves every waiter
//! ```
//!
//! A want ends when a verified block arrives (from a peer or a local put),
//! its timeout expires, the caller cancels, it is unwanted, or the service
//! stops. Inbound wants are answered from local blocks only.

pub mod domain;
pub mod service;

pub use domain::config::ExchangeConfig;
pub use domain::errors::ExchangeError;
pub use domain::messages::{ExchangeRequest, ExchangeResponse, EXCHANGE_PROTOCOL};
pub use domain::stats::ExchangeStat;
pub use service::ExchangeService;
