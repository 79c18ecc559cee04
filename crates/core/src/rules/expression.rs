//! Validation expressions produced by the rule engine.

use serde::Serialize;
use serde_json::Value;

use super::model::Datatype;

/// One atomic check inside an [`Expression`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "check", content = "arg", rename_all = "snake_case")]
pub enum Constraint {
    /// Field must be present and non-empty.
    Required,
    /// Field may be absent or null; when present the remaining checks apply.
    Nullable,
    Type(Datatype),
    /// Value must be a JSON array.
    Collection,
    Min(i64),
    Max(i64),
    MinLength(i64),
    MaxLength(i64),
    MinItems(i64),
    MaxItems(i64),
    In(Vec<Value>),
}

impl Constraint {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Required => "required",
            Self::Nullable => "nullable",
            Self::Type(_) => "type",
            Self::Collection => "collection",
            Self::Min(_) => "min",
            Self::Max(_) => "max",
            Self::MinLength(_) => "min_length",
            Self::MaxLength(_) => "max_length",
            Self::MinItems(_) => "min_items",
            Self::MaxItems(_) => "max_items",
            Self::In(_) => "in",
        }
    }

    fn is_presence(&self) -> bool {
        matches!(self, Self::Required | Self::Nullable)
    }
}

/// An ordered list of constraints applied to one value.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Expression(Vec<Constraint>);

impl Expression {
    pub fn new(constraints: Vec<Constraint>) -> Self {
        Self(constraints)
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.0
    }

    pub fn is_required(&self) -> bool {
        self.0.contains(&Constraint::Required)
    }

    pub fn has_presence_marker(&self) -> bool {
        self.0.iter().any(Constraint::is_presence)
    }
}

impl From<Vec<Constraint>> for Expression {
    fn from(constraints: Vec<Constraint>) -> Self {
        Self(constraints)
    }
}

/// The validation specification for one field under one role.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum RuleEvaluation {
    /// Single value.
    Flat { expression: Expression },
    /// Collection: `parent` checks the collection itself, `child` runs
    /// against every element.
    Nested { parent: Expression, child: Expression },
}

impl RuleEvaluation {
    pub fn is_nested(&self) -> bool {
        matches!(self, Self::Nested { .. })
    }

    /// Whether the field must be submitted.
    pub fn is_required(&self) -> bool {
        match self {
            Self::Flat { expression } => expression.is_required(),
            Self::Nested { parent, .. } => parent.is_required(),
        }
    }
}
