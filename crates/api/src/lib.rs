//! Marketplace API server library.
//!
//! Exposes config, state, error handling, the router and the submission
//! services so integration tests and the binary entrypoint share them.

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod query;
pub mod response;
pub mod router;
pub mod routes;
pub mod services;
pub mod state;
