//! # Shared Types Crate
//!
//! Domain entities shared by every Cairn subsystem.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: content identifiers, blocks and peer ids are
//!   defined here and nowhere else.
//! - **Self-Certifying Data**: a [`Block`] carries the [`ContentId`] it claims;
//!   anything that persists a block re-derives the id from the payload.
//! - **Cheap Sharing**: block payloads are reference counted so the block
//!   store cache and resolvers can hold the same bytes.

pub mod entities;
pub mod errors;

pub use entities::*;
pub use errors::*;
