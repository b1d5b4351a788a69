//! # Cairn Test Suite
//!
//! Unified test crate for flows that span several subsystems.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── benchmarks/       # Criterion benchmarks, run from benches/
//! │   ├── block_store.rs
//! │   └── graph.rs
//! │
//! └── integration/      # Whole-node flows through the public facade
//!     ├── setup_flows.rs
//!     ├── lifecycle_flows.rs
//!     └── exchange_flows.rs
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p cn-tests
//! cargo test -p cn-tests integration::exchange_flows
//! cargo bench -p cn-tests
//! ```

pub mod benchmarks;
pub mod integration;
