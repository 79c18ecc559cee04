//! Validation of dynamic-field submissions.
//!
//! A submission carries up to three payloads (account infos, account
//! actions, game infos). Each payload is a JSON object keyed by
//! `"id<field id>"`. The field definitions of the account type or game
//! supply one [`Rule`] per field; the rules are generated for the acting
//! role, merged into a [`ValidationSpec`] and applied to the payload.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::CoreError;
use crate::roles::RoleKey;
use crate::rules::{check_expression, generate_rule, Expression, Rule, RuleEvaluation};
use crate::types::DbId;

pub use crate::rules::FieldViolation;

/// Prefix of every payload key.
pub const FIELD_KEY_PREFIX: &str = "id";

/// Suffix marking the per-element expression of a nested field.
const WILDCARD_SUFFIX: &str = ".*";

// ---------------------------------------------------------------------------
// Scope
// ---------------------------------------------------------------------------

/// A family of fields validated together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Scope {
    AccountInfos,
    AccountActions,
    GameInfos,
}

impl Scope {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AccountInfos => "accountInfos",
            Self::AccountActions => "accountActions",
            Self::GameInfos => "gameInfos",
        }
    }

    /// Human-readable failure message for this scope.
    pub fn failure_message(self) -> &'static str {
        match self {
            Self::AccountInfos => "Account information is invalid.",
            Self::AccountActions => "Some actions required for this account are missing.",
            Self::GameInfos => "Some game information is invalid.",
        }
    }
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Keys
// ---------------------------------------------------------------------------

/// Payload key for a field id (`42` -> `"id42"`).
pub fn field_key(id: DbId) -> String {
    format!("{FIELD_KEY_PREFIX}{id}")
}

/// Recover the field id from a payload key. Returns `None` for keys that do
/// not carry the prefix or an integer id.
pub fn parse_field_key(key: &str) -> Option<DbId> {
    key.strip_prefix(FIELD_KEY_PREFIX)?.parse().ok()
}

// ---------------------------------------------------------------------------
// Spec
// ---------------------------------------------------------------------------

/// One field definition and its rule.
#[derive(Debug, Clone)]
pub struct FieldRule {
    pub field_id: DbId,
    pub rule: Rule,
}

/// Combined validation specification for one scope.
///
/// Flat fields map `id<n>` to their expression; nested fields map `id<n>`
/// to the parent expression and `id<n>.*` to the child expression.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValidationSpec {
    entries: BTreeMap<String, Expression>,
}

impl ValidationSpec {
    /// Generate every field's rule for `role` and merge them.
    pub fn build(fields: &[FieldRule], role: &RoleKey) -> Self {
        let mut entries = BTreeMap::new();
        for field in fields {
            let key = field_key(field.field_id);
            match generate_rule(&field.rule, role) {
                RuleEvaluation::Flat { expression } => {
                    entries.insert(key, expression);
                }
                RuleEvaluation::Nested { parent, child } => {
                    entries.insert(format!("{key}{WILDCARD_SUFFIX}"), child);
                    entries.insert(key, parent);
                }
            }
        }
        Self { entries }
    }

    pub fn get(&self, key: &str) -> Option<&Expression> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Check `payload` against these fields. Keys with no field are ignored.
    pub fn check(&self, payload: &Map<String, Value>) -> Vec<FieldViolation> {
        let mut violations = Vec::new();
        for (key, expression) in &self.entries {
            match key.strip_suffix(WILDCARD_SUFFIX) {
                Some(parent_key) => match payload.get(parent_key) {
                    Some(Value::Array(items)) => {
                        for (index, item) in items.iter().enumerate() {
                            violations.extend(check_expression(
                                &format!("{parent_key}.{index}"),
                                expression,
                                Some(item),
                            ));
                        }
                    }
                    Some(Value::Object(items)) => {
                        for (name, item) in items {
                            violations.extend(check_expression(
                                &format!("{parent_key}.{name}"),
                                expression,
                                Some(item),
                            ));
                        }
                    }
                    _ => {}
                },
                None => violations.extend(check_expression(key, expression, payload.get(key))),
            }
        }
        violations
    }
}

// ---------------------------------------------------------------------------
// Submission
// ---------------------------------------------------------------------------

/// How an absent scope payload is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionMode {
    /// Absent payload validates as an empty object.
    Create,
    /// Absent or empty payload is skipped entirely.
    Update,
}

impl SubmissionMode {
    /// The payload a scope is validated and synced with, or `None` when the
    /// scope is left untouched.
    pub fn effective_payload<'a>(
        self,
        payload: Option<&'a Map<String, Value>>,
        empty: &'a Map<String, Value>,
    ) -> Option<&'a Map<String, Value>> {
        match (self, payload) {
            (Self::Create, Some(payload)) => Some(payload),
            (Self::Create, None) => Some(empty),
            (Self::Update, Some(payload)) if !payload.is_empty() => Some(payload),
            (Self::Update, _) => None,
        }
    }
}

/// One scope of a submission.
#[derive(Debug, Clone, Copy)]
pub struct ScopedPayload<'a> {
    pub scope: Scope,
    pub fields: &'a [FieldRule],
    pub payload: Option<&'a Map<String, Value>>,
}

/// Validate one scope; all violations are returned together.
pub fn validate_scope(
    scope: Scope,
    fields: &[FieldRule],
    role: &RoleKey,
    payload: &Map<String, Value>,
) -> Result<(), CoreError> {
    let violations = ValidationSpec::build(fields, role).check(payload);
    if violations.is_empty() {
        Ok(())
    } else {
        Err(CoreError::ValidationFailed { scope, violations })
    }
}

/// Validate every scope of a submission in order, stopping at the first
/// scope that fails.
pub fn validate_submission(
    role: &RoleKey,
    parts: &[ScopedPayload<'_>],
    mode: SubmissionMode,
) -> Result<(), CoreError> {
    let empty = Map::new();
    for part in parts {
        if let Some(payload) = mode.effective_payload(part.payload, &empty) {
            validate_scope(part.scope, part.fields, role, payload)?;
        }
    }
    Ok(())
}

/// Keep only entries whose stripped id is a known field id.
///
/// Unknown or unparsable keys are dropped silently.
pub fn accepted_values(
    payload: &Map<String, Value>,
    known_ids: &BTreeSet<DbId>,
) -> BTreeMap<DbId, Value> {
    payload
        .iter()
        .filter_map(|(key, value)| {
            let id = parse_field_key(key)?;
            known_ids.contains(&id).then(|| (id, value.clone()))
        })
        .collect()
}

/// Read an account-action payload value as its `is_done` flag.
///
/// Booleans are taken as-is; `1`/`0` and `"true"`/`"1"` are accepted too.
pub fn done_flag(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_i64().is_some_and(|n| n != 0),
        Value::String(s) => matches!(s.trim(), "1" | "true"),
        _ => false,
    }
}
