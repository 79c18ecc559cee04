//! Rule entity model and DTOs.

use std::collections::BTreeSet;

use market_core::rules::{Datatype, Rule};
use market_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::types::Json;
use sqlx::FromRow;

/// A row from the `rules` table, without its required roles.
#[derive(Debug, Clone, FromRow)]
pub struct RuleRow {
    pub id: DbId,
    #[sqlx(rename = "type")]
    pub rule_type: String,
    pub datatype: String,
    pub required: bool,
    pub multiple: bool,
    pub min: Option<i64>,
    pub max: Option<i64>,
    pub minlength: Option<i64>,
    pub maxlength: Option<i64>,
    pub allowed_values: Json<Vec<Value>>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl RuleRow {
    /// Combine the row with its required roles into the domain rule.
    ///
    /// A stored datatype the domain does not know surfaces as a decode error.
    pub fn into_rule(self, required_roles: BTreeSet<String>) -> Result<Rule, sqlx::Error> {
        let datatype =
            Datatype::from_name(&self.datatype).map_err(|e| sqlx::Error::Decode(Box::new(e)))?;
        Ok(Rule {
            id: self.id,
            rule_type: self.rule_type,
            datatype,
            required: self.required,
            multiple: self.multiple,
            min: self.min,
            max: self.max,
            minlength: self.minlength,
            maxlength: self.maxlength,
            values: self.allowed_values.0,
            required_roles,
        })
    }
}

/// A rule with its timestamps, as returned by the API.
#[derive(Debug, Clone, Serialize)]
pub struct RuleRecord {
    #[serde(flatten)]
    pub rule: Rule,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating or replacing a rule.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateRule {
    #[serde(rename = "type")]
    pub rule_type: String,
    pub datatype: Datatype,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub multiple: bool,
    pub min: Option<i64>,
    pub max: Option<i64>,
    pub minlength: Option<i64>,
    pub maxlength: Option<i64>,
    #[serde(default)]
    pub values: Vec<Value>,
    #[serde(default)]
    pub required_role_keys: BTreeSet<String>,
}

impl CreateRule {
    /// The rule this DTO describes, with a placeholder id.
    pub fn to_rule(&self) -> Rule {
        Rule {
            id: 0,
            rule_type: self.rule_type.clone(),
            datatype: self.datatype,
            required: self.required,
            multiple: self.multiple,
            min: self.min,
            max: self.max,
            minlength: self.minlength,
            maxlength: self.maxlength,
            values: self.values.clone(),
            required_roles: self.required_role_keys.clone(),
        }
    }
}
