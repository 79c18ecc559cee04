//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods. Reads
//! take `&PgPool`; writes that take part in a caller's transaction take
//! `&mut PgConnection` so they can run on `&mut *tx`.

pub mod account_fee_repo;
pub mod account_repo;
pub mod account_type_repo;
pub mod discount_code_repo;
pub mod field_definition_repo;
pub mod game_repo;
pub mod role_repo;
pub mod rule_repo;
pub mod user_repo;

pub use account_fee_repo::AccountFeeRepo;
pub use account_repo::{AccountImageRepo, AccountRepo, AccountSearch};
pub use account_type_repo::AccountTypeRepo;
pub use discount_code_repo::DiscountCodeRepo;
pub use field_definition_repo::FieldDefinitionRepo;
pub use game_repo::GameRepo;
pub use role_repo::RoleRepo;
pub use rule_repo::RuleRepo;
pub use user_repo::UserRepo;
