//! Nutrifolio Core - Shared domain types.
//!
//! This crate provides the types shared by every Nutrifolio component:
//! - `api` - The marketplace HTTP API (discovery, product lookup, reference data)
//! - `integration-tests` - End-to-end tests over in-memory collaborators
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access, no HTTP clients. This keeps it lightweight and allows it to be used
//! anywhere.
//!
//! # Modules
//!
//! - [`types`] - Type-safe IDs, geographic points, search radius buckets,
//!   sort options and reference entities (tags, menu categories)

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
