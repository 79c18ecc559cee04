use crate::rules::FieldViolation;
use crate::submission::Scope;
use crate::types::DbId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    /// An entity addressed by a string key (role key, discount code) is missing.
    #[error("Entity not found: {entity} with key '{key}'")]
    KeyNotFound { entity: &'static str, key: String },

    /// The role a submission is made under could not be resolved.
    #[error("Role not found: '{0}'")]
    RoleNotFound(String),

    /// A dynamic-field submission failed validation for one scope.
    #[error("Validation failed for {scope}: {} violation(s)", violations.len())]
    ValidationFailed {
        scope: Scope,
        violations: Vec<FieldViolation>,
    },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Insufficient silver coins: have {balance}, need {price}")]
    InsufficientFunds { balance: i64, price: i64 },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
