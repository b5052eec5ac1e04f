//! Rule condition evaluation

use regex::Regex;
use serde_json::Value;

use crate::models::{is_truthy, value_to_string, AttributeBag, Condition, ConditionOperator};

/// Decides whether one condition holds for a host
pub trait ConditionEvaluator: Send + Sync {
    fn evaluate(&self, condition: &Condition, hostname: &str, bag: &AttributeBag) -> bool;
}

/// Default evaluator over the attribute bag
///
/// A condition without attribute tests the hostname. Missing attributes never
/// match (except for negated conditions).
#[derive(Debug, Clone, Copy, Default)]
pub struct AttributeConditionEvaluator;

impl ConditionEvaluator for AttributeConditionEvaluator {
    fn evaluate(&self, condition: &Condition, hostname: &str, bag: &AttributeBag) -> bool {
        let hostname_value;
        let subject = match &condition.attribute {
            None => {
                hostname_value = Value::String(hostname.to_string());
                Some(&hostname_value)
            }
            Some(name) => bag.get(name),
        };

        let matched = match subject {
            Some(value) => match_value(value, condition.operator, &condition.value),
            None => {
                tracing::debug!(
                    "Condition attribute '{}' not found, matched=false",
                    condition.attribute.as_deref().unwrap_or_default()
                );
                false
            }
        };

        matched != condition.negate
    }
}

/// Match an attribute value against a condition value
fn match_value(value: &Value, operator: ConditionOperator, expected: &Value) -> bool {
    match operator {
        ConditionOperator::Equals => loose_eq(value, expected),
        ConditionOperator::NotEquals => !loose_eq(value, expected),
        ConditionOperator::Regex => regex_match(value, expected).unwrap_or(false),
        ConditionOperator::NotRegex => regex_match(value, expected).map(|m| !m).unwrap_or(false),
        ConditionOperator::In => membership(value, expected),
        ConditionOperator::NotIn => !membership(value, expected),
        ConditionOperator::Contains => value_to_string(value).contains(&value_to_string(expected)),
        ConditionOperator::StartsWith => {
            value_to_string(value).starts_with(&value_to_string(expected))
        }
        ConditionOperator::EndsWith => value_to_string(value).ends_with(&value_to_string(expected)),
        ConditionOperator::GreaterThan => compare_values(value, expected) > 0,
        ConditionOperator::LessThan => compare_values(value, expected) < 0,
        ConditionOperator::Exists => is_truthy(value),
    }
}

/// Equality that tolerates labels stored as text (`"8"` equals `8`)
fn loose_eq(a: &Value, b: &Value) -> bool {
    a == b || value_to_string(a) == value_to_string(b)
}

/// `None` when the pattern does not compile; such conditions never match
fn regex_match(value: &Value, pattern: &Value) -> Option<bool> {
    let pattern = pattern.as_str()?;
    match Regex::new(pattern) {
        Ok(re) => Some(re.is_match(&value_to_string(value))),
        Err(e) => {
            tracing::debug!("Invalid condition regex '{}': {}", pattern, e);
            None
        }
    }
}

fn membership(value: &Value, expected: &Value) -> bool {
    match expected {
        Value::Array(items) => items.iter().any(|item| loose_eq(value, item)),
        Value::String(list) => {
            let value = value_to_string(value);
            list.split(',').any(|item| item.trim() == value)
        }
        _ => false,
    }
}

/// Compare two values: numerically when both are numbers (or numeric text)
fn compare_values(a: &Value, b: &Value) -> i32 {
    let as_number = |v: &Value| match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    match (as_number(a), as_number(b)) {
        (Some(af), Some(bf)) => {
            if af > bf {
                1
            } else if af < bf {
                -1
            } else {
                0
            }
        }
        _ => value_to_string(a).cmp(&value_to_string(b)) as i32,
    }
}
