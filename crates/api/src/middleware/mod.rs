//! Request extractors.
//!
//! - [`actor::Actor`] -- The acting user, identified by the gateway-set
//!   `x-user-id` header.

pub mod actor;
