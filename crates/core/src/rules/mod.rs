//! Role-scoped dynamic validation rules.
//!
//! A [`Rule`] is the stored definition attached to one account-info,
//! account-action or game-info field. [`generate_rule`] turns it into a
//! [`RuleEvaluation`] for the acting role, and the evaluator applies the
//! resulting expressions to submitted JSON values. Nothing here touches the
//! database.

pub mod engine;
pub mod evaluator;
pub mod expression;
pub mod model;

pub use engine::{effective_required, generate_rule};
pub use evaluator::{check_expression, FieldViolation};
pub use expression::{Constraint, Expression, RuleEvaluation};
pub use model::{validate_rule_definition, Datatype, Rule};
