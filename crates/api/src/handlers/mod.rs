//! Request handlers.
//!
//! Each submodule provides the async handler functions for one resource.
//! Handlers delegate to the repositories in `market_db` (or to a service in
//! [`crate::services`] for multi-step writes) and map errors via
//! [`AppError`](crate::error::AppError).

pub mod account;
pub mod account_fee;
pub mod account_type;
pub mod discount_code;
pub mod field_definition;
pub mod form;
pub mod game;
pub mod role;
pub mod rule;
