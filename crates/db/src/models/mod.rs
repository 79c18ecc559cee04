//! Row structs and write DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts
//! - An update DTO (all `Option` fields) where the entity can be patched

pub mod account;
pub mod account_fee;
pub mod account_type;
pub mod discount_code;
pub mod field_definition;
pub mod game;
pub mod role;
pub mod rule;
pub mod user;
