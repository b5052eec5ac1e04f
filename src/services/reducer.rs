//! Outcome reduction
//!
//! A reducer folds the actions of every matched rule into one outcome. The
//! per-call state lives in [`ReduceContext`] so one reducer instance can serve
//! many hosts at once.

use std::collections::BTreeMap;

use tracing::debug;

use crate::models::{Action, AttributeBag, Host, Rule, RulesetAction};
use crate::services::matcher::RuleMatcher;
use crate::services::template::TemplateResolver;
use crate::utils::AppResult;

/// State for one reduction pass over one host
pub struct ReduceContext<'a> {
    pub host: &'a mut Host,
    pub attributes: &'a AttributeBag,
    pub templates: TemplateResolver,
    /// Set once a rule granting a pool folder was seen in this pass
    pub pool_rule_matched: bool,
}

impl<'a> ReduceContext<'a> {
    pub fn new(host: &'a mut Host, attributes: &'a AttributeBag, templates: TemplateResolver) -> Self {
        Self {
            host,
            attributes,
            templates,
            pool_rule_matched: false,
        }
    }

    pub fn hostname(&self) -> &str {
        &self.host.hostname
    }

    /// Render a parameter; render failures are logged and yield `None`
    pub fn render(&self, template: &str) -> Option<String> {
        match self
            .templates
            .render(template, &self.host.hostname, self.attributes)
        {
            Ok(rendered) => Some(rendered),
            Err(e) => {
                debug!(
                    "Skipping action for '{}', template '{}' failed: {}",
                    self.host.hostname, template, e
                );
                None
            }
        }
    }
}

/// Folds matched rules into an integration specific outcome
pub trait OutcomeReducer {
    type Action;
    type Outcome: Default;

    /// Add the actions of one matched rule
    ///
    /// Only domain-fatal conditions are returned as errors; malformed actions
    /// are logged and skipped.
    fn add_outcomes(
        &self,
        rule: &Rule<Self::Action>,
        ctx: &mut ReduceContext<'_>,
        outcome: &mut Self::Outcome,
    ) -> AppResult<()>;

    /// Runs once after all matched rules, even when none matched
    fn finish(&self, outcome: Self::Outcome, _ctx: &mut ReduceContext<'_>) -> AppResult<Self::Outcome> {
        Ok(outcome)
    }
}

/// Matching plus reduction for one rule set
#[derive(Clone, Default)]
pub struct RuleEngine {
    matcher: RuleMatcher,
    templates: TemplateResolver,
}

impl RuleEngine {
    pub fn new(matcher: RuleMatcher, templates: TemplateResolver) -> Self {
        Self { matcher, templates }
    }

    /// Match `rules` against the host and fold the matches with `reducer`
    pub fn get_outcomes<R: OutcomeReducer>(
        &self,
        reducer: &R,
        rules: &[Rule<R::Action>],
        host: &mut Host,
        attributes: &AttributeBag,
    ) -> AppResult<R::Outcome> {
        let matched = self.matcher.matches(rules, &host.hostname, attributes);

        let mut ctx = ReduceContext::new(host, attributes, self.templates);
        let mut outcome = R::Outcome::default();
        for rule in matched {
            reducer.add_outcomes(rule, &mut ctx, &mut outcome)?;
        }
        reducer.finish(outcome, &mut ctx)
    }
}

/// Appends every action of every matched rule to the `default` bucket
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultReducer;

impl OutcomeReducer for DefaultReducer {
    type Action = Action;
    type Outcome = BTreeMap<String, Vec<Action>>;

    fn add_outcomes(
        &self,
        rule: &Rule<Action>,
        _ctx: &mut ReduceContext<'_>,
        outcome: &mut Self::Outcome,
    ) -> AppResult<()> {
        if !rule.actions.is_empty() {
            outcome
                .entry("default".to_string())
                .or_default()
                .extend(rule.actions.iter().cloned());
        }
        Ok(())
    }
}

/// Groups Checkmk ruleset entries by the ruleset they declare
#[derive(Debug, Clone, Copy, Default)]
pub struct RulesetReducer;

impl OutcomeReducer for RulesetReducer {
    type Action = RulesetAction;
    type Outcome = BTreeMap<String, Vec<RulesetAction>>;

    fn add_outcomes(
        &self,
        rule: &Rule<RulesetAction>,
        _ctx: &mut ReduceContext<'_>,
        outcome: &mut Self::Outcome,
    ) -> AppResult<()> {
        for action in &rule.actions {
            outcome
                .entry(action.ruleset.clone())
                .or_default()
                .push(action.clone());
        }
        Ok(())
    }
}
