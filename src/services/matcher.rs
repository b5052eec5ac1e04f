//! Ordered rule matching

use std::sync::Arc;

use tracing::debug;

use crate::models::{AttributeBag, ConditionType, Rule};
use crate::services::conditions::{AttributeConditionEvaluator, ConditionEvaluator};

/// Selects the rules that apply to a host, in evaluation order
#[derive(Clone)]
pub struct RuleMatcher {
    evaluator: Arc<dyn ConditionEvaluator>,
}

impl Default for RuleMatcher {
    fn default() -> Self {
        Self::new(Arc::new(AttributeConditionEvaluator))
    }
}

impl RuleMatcher {
    pub fn new(evaluator: Arc<dyn ConditionEvaluator>) -> Self {
        Self { evaluator }
    }

    /// Matching rules in ascending `sort_order`
    ///
    /// Rules with equal `sort_order` keep their list order. A matching rule
    /// flagged `last_match` is returned and ends the evaluation.
    pub fn matches<'r, A>(
        &self,
        rules: &'r [Rule<A>],
        hostname: &str,
        bag: &AttributeBag,
    ) -> Vec<&'r Rule<A>> {
        let mut ordered: Vec<&Rule<A>> = rules.iter().filter(|r| r.enabled).collect();
        ordered.sort_by_key(|r| r.sort_order);

        let mut matched = Vec::new();
        for rule in ordered {
            if !self.rule_matches(rule, hostname, bag) {
                continue;
            }
            debug!("Host '{}' matched rule '{}'", hostname, rule.name);
            matched.push(rule);

            if rule.last_match {
                debug!("Rule '{}' is last match, stopping", rule.name);
                break;
            }
        }
        matched
    }

    /// Whether a single rule's conditions hold
    ///
    /// match-all with no conditions always holds; match-any with none never does.
    pub fn rule_matches<A>(&self, rule: &Rule<A>, hostname: &str, bag: &AttributeBag) -> bool {
        let mut results = rule
            .conditions
            .iter()
            .map(|c| self.evaluator.evaluate(c, hostname, bag));

        match rule.condition_type {
            ConditionType::All => results.all(|m| m),
            ConditionType::Any => results.any(|m| m),
        }
    }
}
