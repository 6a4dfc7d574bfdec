//! Nutrifolio API library.
//!
//! Nearby-store product discovery over a `PostGIS` catalog, exposed as an
//! axum router. The binary in `main.rs` wires the production collaborators;
//! integration tests build the same router over in-memory ones.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cache;
pub mod catalog;
pub mod config;
pub mod db;
pub mod discovery;
pub mod error;
pub mod middleware;
pub mod models;
pub mod reference;
pub mod routes;
pub mod state;
