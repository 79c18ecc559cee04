//! Rule generation: stored [`Rule`] plus acting role to [`RuleEvaluation`].
//!
//! Pure function of its inputs. The role has already been resolved by the
//! caller, so generation cannot fail.

use crate::roles::RoleKey;
use super::expression::{Constraint, Expression, RuleEvaluation};
use super::model::Rule;

/// `rule.required OR role ∈ rule.required_roles`.
///
/// A role can only make a field more required than the stored default.
pub fn effective_required(rule: &Rule, role: &RoleKey) -> bool {
    rule.required || rule.required_roles.contains(role.as_str())
}

/// Build the validation specification for `rule` as seen by `role`.
pub fn generate_rule(rule: &Rule, role: &RoleKey) -> RuleEvaluation {
    let presence = if effective_required(rule, role) {
        Constraint::Required
    } else {
        Constraint::Nullable
    };
    let base = base_constraints(rule);

    if rule.multiple {
        let mut parent = vec![presence, Constraint::Collection];
        if let Some(min) = rule.min {
            parent.push(Constraint::MinItems(min));
        }
        if let Some(max) = rule.max {
            parent.push(Constraint::MaxItems(max));
        }
        RuleEvaluation::Nested {
            parent: parent.into(),
            child: base.into(),
        }
    } else {
        let mut flat = Vec::with_capacity(base.len() + 1);
        flat.push(presence);
        flat.extend(base);
        RuleEvaluation::Flat {
            expression: Expression::new(flat),
        }
    }
}

/// Type check, bounds and membership, without a presence marker.
fn base_constraints(rule: &Rule) -> Vec<Constraint> {
    let mut out = vec![Constraint::Type(rule.datatype)];

    if rule.datatype.is_numeric() {
        if let Some(min) = rule.min {
            out.push(Constraint::Min(min));
        }
        if let Some(max) = rule.max {
            out.push(Constraint::Max(max));
        }
    }

    if rule.datatype.is_textual() || rule.multiple {
        if let Some(min) = rule.minlength {
            out.push(Constraint::MinLength(min));
        }
        if let Some(max) = rule.maxlength {
            out.push(Constraint::MaxLength(max));
        }
    }

    // Attached whatever the datatype; definitions are checked on write.
    if !rule.values.is_empty() {
        out.push(Constraint::In(rule.values.clone()));
    }

    out
}
