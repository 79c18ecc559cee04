//! Stored rule definitions.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::CoreError;
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Rule types
// ---------------------------------------------------------------------------

pub const RULE_TYPE_TEXT: &str = "text";
pub const RULE_TYPE_NUMBER: &str = "number";
pub const RULE_TYPE_SELECT: &str = "select";
pub const RULE_TYPE_CHECKBOX: &str = "checkbox";
pub const RULE_TYPE_DATE: &str = "date";
pub const RULE_TYPE_NESTED_LIST: &str = "nested-list";

// ---------------------------------------------------------------------------
// Datatype
// ---------------------------------------------------------------------------

/// Scalar kind a field value must have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Datatype {
    String,
    Integer,
    Numeric,
    Boolean,
    Date,
    Object,
}

impl Datatype {
    /// Parse from the database `datatype` column.
    pub fn from_name(name: &str) -> Result<Self, CoreError> {
        match name {
            "string" => Ok(Self::String),
            "integer" => Ok(Self::Integer),
            "numeric" => Ok(Self::Numeric),
            "boolean" => Ok(Self::Boolean),
            "date" => Ok(Self::Date),
            "object" => Ok(Self::Object),
            other => Err(CoreError::Validation(format!(
                "Unknown datatype '{other}'. Must be one of: string, integer, numeric, boolean, date, object"
            ))),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Numeric => "numeric",
            Self::Boolean => "boolean",
            Self::Date => "date",
            Self::Object => "object",
        }
    }

    /// Numeric bounds (`min`/`max`) apply to these datatypes.
    pub fn is_numeric(self) -> bool {
        matches!(self, Self::Integer | Self::Numeric)
    }

    /// Length bounds (`minlength`/`maxlength`) apply to these datatypes.
    pub fn is_textual(self) -> bool {
        matches!(self, Self::String)
    }

    /// Whether `value` has the JSON shape this datatype requires.
    pub fn matches(self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Integer => value.is_i64() || value.is_u64(),
            Self::Numeric => value.is_number(),
            Self::Boolean => value.is_boolean(),
            Self::Date => value.as_str().is_some_and(is_date_literal),
            Self::Object => value.is_object(),
        }
    }
}

impl std::fmt::Display for Datatype {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accepts RFC 3339 timestamps and plain `YYYY-MM-DD` dates.
fn is_date_literal(s: &str) -> bool {
    chrono::DateTime::parse_from_rfc3339(s).is_ok()
        || chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok()
}

// ---------------------------------------------------------------------------
// Rule
// ---------------------------------------------------------------------------

/// A validation rule loaded from the `rules` table together with its
/// `rule_required_roles` rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub id: DbId,
    #[serde(rename = "type")]
    pub rule_type: String,
    pub datatype: Datatype,
    pub required: bool,
    pub multiple: bool,
    pub min: Option<i64>,
    pub max: Option<i64>,
    pub minlength: Option<i64>,
    pub maxlength: Option<i64>,
    #[serde(default)]
    pub values: Vec<Value>,
    /// Role keys for which the field is always mandatory.
    #[serde(default)]
    pub required_roles: BTreeSet<String>,
}

/// Check a rule definition before it is stored.
///
/// Stored rules are evaluated as-is by the engine; this check only keeps
/// new inconsistent definitions out of the table.
pub fn validate_rule_definition(rule: &Rule) -> Result<(), CoreError> {
    if rule.rule_type.trim().is_empty() {
        return Err(CoreError::Validation("Rule type must not be empty".into()));
    }
    if let (Some(min), Some(max)) = (rule.min, rule.max) {
        if min > max {
            return Err(CoreError::Validation(format!(
                "min ({min}) must not exceed max ({max})"
            )));
        }
    }
    for (name, bound) in [("minlength", rule.minlength), ("maxlength", rule.maxlength)] {
        if bound.is_some_and(|b| b < 0) {
            return Err(CoreError::Validation(format!("{name} must not be negative")));
        }
    }
    if let (Some(min), Some(max)) = (rule.minlength, rule.maxlength) {
        if min > max {
            return Err(CoreError::Validation(format!(
                "minlength ({min}) must not exceed maxlength ({max})"
            )));
        }
    }
    if !rule.values.is_empty() {
        if rule.datatype == Datatype::Object {
            return Err(CoreError::Validation(
                "Allowed values cannot be combined with datatype 'object'".into(),
            ));
        }
        if let Some(bad) = rule.values.iter().find(|v| !rule.datatype.matches(v)) {
            return Err(CoreError::Validation(format!(
                "Allowed value {bad} does not match datatype '{}'",
                rule.datatype
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn rule(datatype: Datatype) -> Rule {
        Rule {
            id: 1,
            rule_type: RULE_TYPE_TEXT.to_string(),
            datatype,
            required: false,
            multiple: false,
            min: None,
            max: None,
            minlength: None,
            maxlength: None,
            values: Vec::new(),
            required_roles: BTreeSet::new(),
        }
    }

    #[test]
    fn datatype_round_trips_through_name() {
        for dt in [
            Datatype::String,
            Datatype::Integer,
            Datatype::Numeric,
            Datatype::Boolean,
            Datatype::Date,
            Datatype::Object,
        ] {
            assert_eq!(Datatype::from_name(dt.as_str()).unwrap(), dt);
        }
        assert!(Datatype::from_name("uuid").is_err());
    }

    #[test]
    fn integer_rejects_fractions() {
        assert!(Datatype::Integer.matches(&json!(3)));
        assert!(!Datatype::Integer.matches(&json!(3.5)));
        assert!(Datatype::Numeric.matches(&json!(3.5)));
    }

    #[test]
    fn date_accepts_plain_and_rfc3339() {
        assert!(Datatype::Date.matches(&json!("2024-02-29")));
        assert!(Datatype::Date.matches(&json!("2024-02-29T10:00:00Z")));
        assert!(!Datatype::Date.matches(&json!("yesterday")));
        assert!(!Datatype::Date.matches(&json!(20240229)));
    }

    #[test]
    fn definition_valid() {
        let mut r = rule(Datatype::String);
        r.minlength = Some(3);
        r.maxlength = Some(50);
        r.values = vec![json!("eu"), json!("na")];
        assert!(validate_rule_definition(&r).is_ok());
    }

    #[test]
    fn definition_rejects_inverted_bounds() {
        let mut r = rule(Datatype::Integer);
        r.min = Some(10);
        r.max = Some(1);
        assert!(validate_rule_definition(&r).is_err());

        let mut r = rule(Datatype::String);
        r.minlength = Some(5);
        r.maxlength = Some(2);
        assert!(validate_rule_definition(&r).is_err());
    }

    #[test]
    fn definition_rejects_values_on_object() {
        let mut r = rule(Datatype::Object);
        r.values = vec![json!({"a": 1})];
        assert!(validate_rule_definition(&r).is_err());
    }

    #[test]
    fn definition_rejects_mismatched_values() {
        let mut r = rule(Datatype::Integer);
        r.values = vec![json!(1), json!("two")];
        assert!(validate_rule_definition(&r).is_err());
    }

    #[test]
    fn definition_rejects_blank_type() {
        let mut r = rule(Datatype::String);
        r.rule_type = "  ".to_string();
        assert!(validate_rule_definition(&r).is_err());
    }
}
