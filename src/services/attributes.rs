//! Host attribute pipeline
//!
//! Builds the attribute bag a host is matched with: labels, then inventory,
//! then computed custom attributes, then rewrites. Filter rules decide which
//! attributes are exported and whether the host is skipped. The result is
//! cached on the host per integration.

use serde_json::Value;
use tracing::debug;

use crate::models::{
    AttributeBag, CustomAttributeAction, FilterAction, FilterOutcome, Host, HostAttributes,
    RewriteAction, RewriteOutcome, Rule,
};
use crate::services::literal::{parse_custom_attributes, AttributeInstruction};
use crate::services::reducer::{OutcomeReducer, ReduceContext, RuleEngine};
use crate::utils::AppResult;

/// Computed attributes; later rules overwrite earlier ones per name
#[derive(Debug, Clone, Copy, Default)]
pub struct CustomAttributeReducer;

impl OutcomeReducer for CustomAttributeReducer {
    type Action = CustomAttributeAction;
    type Outcome = AttributeBag;

    fn add_outcomes(
        &self,
        rule: &Rule<CustomAttributeAction>,
        ctx: &mut ReduceContext<'_>,
        outcome: &mut AttributeBag,
    ) -> AppResult<()> {
        for action in &rule.actions {
            match action {
                CustomAttributeAction::CustomAttribute(param) => {
                    let Some(rendered) = ctx.render(param) else {
                        continue;
                    };
                    for instruction in parse_custom_attributes(&rendered) {
                        match instruction {
                            AttributeInstruction::Set { name, value } => outcome.insert(name, value),
                            AttributeInstruction::Remove(name) => {
                                outcome.remove(&name);
                            }
                        }
                    }
                }
                CustomAttributeAction::Unknown { action, .. } => {
                    debug!("Rule '{}': unknown action '{}' skipped", rule.name, action);
                }
            }
        }
        Ok(())
    }
}

/// Attribute rewrites
#[derive(Debug, Clone, Copy, Default)]
pub struct RewriteReducer;

impl OutcomeReducer for RewriteReducer {
    type Action = RewriteAction;
    type Outcome = RewriteOutcome;

    fn add_outcomes(
        &self,
        rule: &Rule<RewriteAction>,
        ctx: &mut ReduceContext<'_>,
        outcome: &mut RewriteOutcome,
    ) -> AppResult<()> {
        for action in &rule.actions {
            match action {
                RewriteAction::SetAttribute(param) => {
                    let Some((name, template)) = param.split_once(':') else {
                        debug!("set_attribute '{}' has no ':' separator", param);
                        continue;
                    };
                    let name = name.trim();
                    if name.is_empty() {
                        continue;
                    }
                    if let Some(value) = ctx.render(template) {
                        outcome
                            .add
                            .insert(name.to_string(), Value::String(value.trim().to_string()));
                    }
                }
                RewriteAction::RenameAttribute(param) => {
                    let Some((old, template)) = param.split_once(':') else {
                        debug!("rename_attribute '{}' has no ':' separator", param);
                        continue;
                    };
                    let old = old.trim();
                    let Some(value) = ctx.attributes.get(old) else {
                        continue;
                    };
                    match ctx.render(template).map(|n| n.trim().to_string()) {
                        Some(new_name) if !new_name.is_empty() && new_name != old => {
                            outcome.add.insert(new_name, value.clone());
                            outcome.delete.insert(old.to_string());
                        }
                        _ => debug!("rename_attribute '{}' rendered no new name", param),
                    }
                }
                RewriteAction::DeleteAttribute(name) => {
                    let name = name.trim();
                    if !name.is_empty() {
                        outcome.delete.insert(name.to_string());
                    }
                }
                RewriteAction::Unknown { action, .. } => {
                    debug!("Rule '{}': unknown action '{}' skipped", rule.name, action);
                }
            }
        }
        Ok(())
    }
}

impl RewriteOutcome {
    /// Apply additions, then deletions
    pub fn apply(self, bag: &mut AttributeBag) {
        for (name, value) in self.add {
            bag.insert(name, value);
        }
        for name in &self.delete {
            bag.remove(name);
        }
    }
}

/// Export filter
#[derive(Debug, Clone, Copy, Default)]
pub struct FilterReducer;

impl OutcomeReducer for FilterReducer {
    type Action = FilterAction;
    type Outcome = FilterOutcome;

    fn add_outcomes(
        &self,
        rule: &Rule<FilterAction>,
        _ctx: &mut ReduceContext<'_>,
        outcome: &mut FilterOutcome,
    ) -> AppResult<()> {
        for action in &rule.actions {
            match action {
                FilterAction::WhitelistAttribute(names) => {
                    for name in names.split(',').map(str::trim).filter(|n| !n.is_empty()) {
                        if !outcome.whitelist.iter().any(|w| w == name) {
                            outcome.whitelist.push(name.to_string());
                        }
                    }
                }
                FilterAction::IgnoreHost => outcome.ignore_host = true,
                FilterAction::Unknown { action, .. } => {
                    debug!("Rule '{}': unknown action '{}' skipped", rule.name, action);
                }
            }
        }
        Ok(())
    }
}

impl FilterOutcome {
    /// Attributes allowed by the whitelist; a trailing `*` matches by prefix
    pub fn filter(&self, bag: &AttributeBag) -> AttributeBag {
        bag.iter()
            .filter(|(name, _)| {
                self.whitelist.iter().any(|pattern| match pattern.strip_suffix('*') {
                    Some(prefix) => name.starts_with(prefix),
                    None => *name == pattern,
                })
            })
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect()
    }
}

/// Rule lists that shape one integration's attributes
#[derive(Clone, Copy)]
pub struct AttributePipeline<'a> {
    pub custom_attributes: &'a [Rule<CustomAttributeAction>],
    pub rewrite: &'a [Rule<RewriteAction>],
    pub filter: &'a [Rule<FilterAction>],
}

/// Builds and caches host attributes per integration
#[derive(Clone, Default)]
pub struct HostAttributeCache {
    engine: RuleEngine,
}

impl HostAttributeCache {
    pub fn new(engine: RuleEngine) -> Self {
        Self { engine }
    }

    pub fn cache_key(integration: &str) -> String {
        format!("{}_hostattribute", integration)
    }

    /// Attributes for `host`, or `None` when the filter rules ignore it
    ///
    /// A fresh snapshot is stored in the host's cache; the host is then
    /// marked changed and must be saved by the caller.
    pub fn get_host_attributes(
        &self,
        host: &mut Host,
        integration: &str,
        pipeline: AttributePipeline<'_>,
    ) -> AppResult<Option<HostAttributes>> {
        let key = Self::cache_key(integration);

        if let Some(cached) = host.cache_get(&key) {
            match serde_json::from_value::<HostAttributes>(cached.clone()) {
                Ok(snapshot) => {
                    debug!("Using cached attributes for '{}' ({})", host.hostname, integration);
                    return Ok((!snapshot.ignore_host).then_some(snapshot));
                }
                Err(e) => debug!("Discarding unreadable attribute cache '{}': {}", key, e),
            }
        }

        let snapshot = self.build(host, pipeline)?;
        host.cache_set(key, serde_json::to_value(&snapshot)?);

        Ok((!snapshot.ignore_host).then_some(snapshot))
    }

    /// Run the pipeline without touching the cache
    pub fn build(&self, host: &mut Host, pipeline: AttributePipeline<'_>) -> AppResult<HostAttributes> {
        let mut all = AttributeBag::new();
        all.merge_truthy(&host.labels);
        all.merge_truthy(&host.inventory);

        let custom = self.engine.get_outcomes(
            &CustomAttributeReducer,
            pipeline.custom_attributes,
            host,
            &all,
        )?;
        all.extend(custom);

        let rewrite = self
            .engine
            .get_outcomes(&RewriteReducer, pipeline.rewrite, host, &all)?;
        rewrite.apply(&mut all);

        let filter = self
            .engine
            .get_outcomes(&FilterReducer, pipeline.filter, host, &all)?;

        Ok(HostAttributes {
            filtered: filter.filter(&all),
            ignore_host: filter.ignore_host,
            all,
        })
    }
}
