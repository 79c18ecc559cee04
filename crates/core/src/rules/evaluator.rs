//! Expression evaluator. Pure logic, no database access.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::expression::{Constraint, Expression};

/// A single field-level violation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldViolation {
    pub field: String,
    pub rule_type: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

/// Evaluate `expression` against the value submitted for `field`.
///
/// `value` is `None` when the key is absent from the payload. Evaluation
/// stops at the first presence, type or collection failure; bound and
/// membership checks all report.
pub fn check_expression(
    field: &str,
    expression: &Expression,
    value: Option<&Value>,
) -> Vec<FieldViolation> {
    let constraints = expression.constraints();
    let is_blank = value.map_or(true, is_empty_value);

    if constraints.contains(&Constraint::Required) && is_blank {
        return vec![violation(
            field,
            &Constraint::Required,
            value,
            format!("The {field} field is required."),
        )];
    }
    if constraints.contains(&Constraint::Nullable) && value.map_or(true, Value::is_null) {
        return Vec::new();
    }

    let value = value.unwrap_or(&Value::Null);
    let mut out = Vec::new();
    for constraint in constraints {
        match constraint {
            Constraint::Required | Constraint::Nullable => {}
            Constraint::Type(datatype) => {
                if !datatype.matches(value) {
                    out.push(violation(
                        field,
                        constraint,
                        Some(value),
                        format!("The {field} must be of type {datatype}."),
                    ));
                    break;
                }
            }
            Constraint::Collection => {
                if !(value.is_array() || value.is_object()) {
                    out.push(violation(
                        field,
                        constraint,
                        Some(value),
                        format!("The {field} must be a list."),
                    ));
                    break;
                }
            }
            Constraint::Min(min) => {
                if value.as_f64().is_some_and(|n| n < *min as f64) {
                    out.push(violation(
                        field,
                        constraint,
                        Some(value),
                        format!("The {field} must be at least {min}."),
                    ));
                }
            }
            Constraint::Max(max) => {
                if value.as_f64().is_some_and(|n| n > *max as f64) {
                    out.push(violation(
                        field,
                        constraint,
                        Some(value),
                        format!("The {field} must not be greater than {max}."),
                    ));
                }
            }
            Constraint::MinLength(min) => {
                if measure_length(value).is_some_and(|len| len < *min) {
                    out.push(violation(
                        field,
                        constraint,
                        Some(value),
                        format!("The {field} must be at least {min} characters."),
                    ));
                }
            }
            Constraint::MaxLength(max) => {
                if measure_length(value).is_some_and(|len| len > *max) {
                    out.push(violation(
                        field,
                        constraint,
                        Some(value),
                        format!("The {field} must not be greater than {max} characters."),
                    ));
                }
            }
            Constraint::MinItems(min) => {
                if item_count(value).is_some_and(|n| n < *min) {
                    out.push(violation(
                        field,
                        constraint,
                        Some(value),
                        format!("The {field} must have at least {min} items."),
                    ));
                }
            }
            Constraint::MaxItems(max) => {
                if item_count(value).is_some_and(|n| n > *max) {
                    out.push(violation(
                        field,
                        constraint,
                        Some(value),
                        format!("The {field} must not have more than {max} items."),
                    ));
                }
            }
            Constraint::In(allowed) => {
                if !allowed.contains(value) {
                    out.push(violation(
                        field,
                        constraint,
                        Some(value),
                        format!("The selected {field} is invalid."),
                    ));
                }
            }
        }
    }
    out
}

fn violation(
    field: &str,
    constraint: &Constraint,
    value: Option<&Value>,
    message: String,
) -> FieldViolation {
    FieldViolation {
        field: field.to_string(),
        rule_type: constraint.name().to_string(),
        message,
        value: value.cloned(),
    }
}

fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

/// Character count for strings, element count for collections.
fn measure_length(value: &Value) -> Option<i64> {
    match value {
        Value::String(s) => Some(s.chars().count() as i64),
        Value::Array(items) => Some(items.len() as i64),
        Value::Object(map) => Some(map.len() as i64),
        _ => None,
    }
}

/// Element count of a list or a keyed mapping.
fn item_count(value: &Value) -> Option<i64> {
    match value {
        Value::Array(items) => Some(items.len() as i64),
        Value::Object(map) => Some(map.len() as i64),
        _ => None,
    }
}
