//! Domain logic for the game-account marketplace.
//!
//! Pure logic only: no database access and no HTTP types. The persistence
//! layer (`market_db`) and the API server (`market_api`) build on these
//! types.

pub mod account_status;
pub mod error;
pub mod pagination;
pub mod pricing;
pub mod roles;
pub mod rules;
pub mod slug;
pub mod storage;
pub mod submission;
pub mod types;
