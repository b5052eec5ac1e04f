//! Rule data model
//!
//! A rule is an ordered, condition-guarded list of actions. The action type is
//! a parameter so every integration can carry its own vocabulary while sharing
//! matching and ordering.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Condition-guarded list of actions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rule<A> {
    /// Unique identifier
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,

    /// Rule name (shown in debug output and grouped outcomes)
    pub name: String,

    /// Whether all conditions (AND) or any condition (OR) must hold
    #[serde(default)]
    pub condition_type: ConditionType,

    /// Ordered conditions
    #[serde(default)]
    pub conditions: Vec<Condition>,

    /// Stop evaluating further rules once this one matches
    #[serde(default)]
    pub last_match: bool,

    /// Evaluation order, ascending
    #[serde(default)]
    pub sort_order: i32,

    /// Disabled rules are never evaluated
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Ordered actions
    #[serde(default = "Vec::new")]
    pub actions: Vec<A>,
}

fn default_enabled() -> bool {
    true
}

impl<A> Rule<A> {
    /// Create an enabled rule without conditions
    pub fn new(name: impl Into<String>, actions: Vec<A>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            condition_type: ConditionType::All,
            conditions: vec![],
            last_match: false,
            sort_order: 0,
            enabled: true,
            actions,
        }
    }

    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn with_condition_type(mut self, condition_type: ConditionType) -> Self {
        self.condition_type = condition_type;
        self
    }

    pub fn with_sort_order(mut self, sort_order: i32) -> Self {
        self.sort_order = sort_order;
        self
    }

    pub fn last_match(mut self) -> Self {
        self.last_match = true;
        self
    }
}

/// How conditions combine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ConditionType {
    /// All conditions must match (AND)
    #[default]
    #[serde(alias = "all", alias = "match-all")]
    All,
    /// Any condition must match (OR)
    #[serde(alias = "any", alias = "match-any")]
    Any,
}

/// A single test against the host's attributes or hostname
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Condition {
    /// Attribute to test; `None` tests the hostname
    #[serde(default)]
    pub attribute: Option<String>,

    /// Comparison operator
    pub operator: ConditionOperator,

    /// Value to compare against
    #[serde(default)]
    pub value: serde_json::Value,

    /// Invert the result
    #[serde(default)]
    pub negate: bool,
}

impl Condition {
    /// Condition on an attribute
    pub fn attribute(
        name: impl Into<String>,
        operator: ConditionOperator,
        value: serde_json::Value,
    ) -> Self {
        Self {
            attribute: Some(name.into()),
            operator,
            value,
            negate: false,
        }
    }

    /// Condition on the hostname
    pub fn hostname(operator: ConditionOperator, value: serde_json::Value) -> Self {
        Self {
            attribute: None,
            operator,
            value,
            negate: false,
        }
    }

    pub fn negated(mut self) -> Self {
        self.negate = !self.negate;
        self
    }
}

/// Condition comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ConditionOperator {
    /// Equals
    #[default]
    #[serde(rename = "=")]
    Equals,

    /// Not equals
    #[serde(rename = "!=")]
    NotEquals,

    /// Regex match
    #[serde(rename = "~")]
    Regex,

    /// Not regex match
    #[serde(rename = "!~")]
    NotRegex,

    /// Value is in list (or comma separated string)
    #[serde(rename = "in")]
    In,

    /// Value is not in list
    #[serde(rename = "not_in")]
    NotIn,

    /// Substring match
    #[serde(rename = "contains")]
    Contains,

    /// Prefix match
    #[serde(rename = "starts_with")]
    StartsWith,

    /// Suffix match
    #[serde(rename = "ends_with")]
    EndsWith,

    /// Greater than
    #[serde(rename = ">")]
    GreaterThan,

    /// Less than
    #[serde(rename = "<")]
    LessThan,

    /// Attribute is present with a truthy value
    #[serde(rename = "exists")]
    Exists,
}

/// Generic action record: a kind from an integration's vocabulary plus a parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    /// Action kind (e.g. `move_folder`, `custom_attribute`)
    #[serde(alias = "action_kind")]
    pub action: String,

    /// Raw parameter, possibly a template
    #[serde(default, alias = "action_param")]
    pub param: String,
}

impl Action {
    pub fn new(action: impl Into<String>, param: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            param: param.into(),
        }
    }
}
