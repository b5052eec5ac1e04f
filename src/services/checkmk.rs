//! Checkmk host management reducer
//!
//! Scalar fields are taken from the first rule that sets them. Folder actions
//! each contribute sanitized path segments, so several matching rules can
//! compose one destination path. List fields accumulate without duplicates.

use std::sync::Arc;

use tracing::{debug, info};

use crate::models::{
    is_truthy, value_to_string, CheckmkAction, CheckmkOutcome, CustomAttribute, Rule,
};
use crate::services::folder_pool::FolderPool;
use crate::services::literal::{parse_custom_attributes, AttributeInstruction};
use crate::services::reducer::{OutcomeReducer, ReduceContext};
use crate::utils::AppResult;

/// Sanitize a folder path
///
/// Each segment loses its `|options` suffix, spaces become `_`, the segment is
/// lower-cased and anything outside `[a-z0-9_-]` is dropped. Empty segments
/// disappear; a path without segments becomes the empty string.
pub fn sanitize_folder(path: &str) -> String {
    let segments: Vec<String> = path
        .split('/')
        .map(|segment| clean_segment(segment.split('|').next().unwrap_or_default()))
        .filter(|segment| !segment.is_empty())
        .collect();
    join_segments(&segments)
}

/// Like [`sanitize_folder`] but keeps each segment's `|options` suffix
pub fn format_folder_options(path: &str) -> String {
    let segments: Vec<String> = path
        .split('/')
        .filter_map(|segment| {
            let (name, options) = match segment.split_once('|') {
                Some((name, options)) => (name, Some(options)),
                None => (segment, None),
            };
            let name = clean_segment(name);
            if name.is_empty() {
                return None;
            }
            Some(match options {
                Some(options) => format!("{}|{}", name, options),
                None => name,
            })
        })
        .collect();
    join_segments(&segments)
}

fn clean_segment(segment: &str) -> String {
    segment
        .replace(' ', "_")
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '_' || *c == '-')
        .collect()
}

fn join_segments(segments: &[String]) -> String {
    if segments.is_empty() {
        String::new()
    } else {
        format!("/{}", segments.join("/"))
    }
}

fn push_unique<T: PartialEq>(list: &mut Vec<T>, item: T) {
    if !list.contains(&item) {
        list.push(item);
    }
}

fn split_list(param: &str) -> impl Iterator<Item = &str> {
    param.split(',').map(str::trim).filter(|s| !s.is_empty())
}

/// Reducer for the Checkmk export rules
pub struct CheckmkFolderReducer {
    pool: Arc<FolderPool>,
}

impl CheckmkFolderReducer {
    pub fn new(pool: Arc<FolderPool>) -> Self {
        Self { pool }
    }

    fn append_folder(outcome: &mut CheckmkOutcome, raw: &str) {
        let folder = sanitize_folder(raw);
        if folder.is_empty() {
            return;
        }
        outcome
            .move_folder
            .get_or_insert_with(String::new)
            .push_str(&folder);
        outcome
            .extra_folder_options
            .get_or_insert_with(String::new)
            .push_str(&format_folder_options(raw));
    }

    fn pool_folder(
        &self,
        filter: &str,
        ctx: &mut ReduceContext<'_>,
        outcome: &mut CheckmkOutcome,
    ) -> AppResult<()> {
        ctx.pool_rule_matched = true;

        if let Some(folder) = ctx.host.get_folder() {
            let folder = folder.to_string();
            debug!("Host '{}' keeps pool folder '{}'", ctx.hostname(), folder);
            Self::append_folder(outcome, &folder);
            return Ok(());
        }

        let only_pools: Vec<String> = split_list(filter).map(str::to_string).collect();
        let folder = self.pool.acquire(Some(&only_pools)).map_err(|e| {
            tracing::error!("No pool folder left for '{}': {}", ctx.hostname(), e);
            e
        })?;

        info!("Host '{}' locked to pool folder '{}'", ctx.hostname(), folder);
        ctx.host.lock_to_folder(Some(folder.clone()));
        Self::append_folder(outcome, &folder);
        Ok(())
    }

    fn custom_attributes(rendered: &str, outcome: &mut CheckmkOutcome) {
        for instruction in parse_custom_attributes(rendered) {
            match instruction {
                AttributeInstruction::Set { name, value } => {
                    push_unique(&mut outcome.custom_attributes, CustomAttribute { name, value })
                }
                AttributeInstruction::Remove(name) => {
                    push_unique(&mut outcome.remove_attributes, name)
                }
            }
        }
    }
}

impl OutcomeReducer for CheckmkFolderReducer {
    type Action = CheckmkAction;
    type Outcome = CheckmkOutcome;

    fn add_outcomes(
        &self,
        rule: &Rule<CheckmkAction>,
        ctx: &mut ReduceContext<'_>,
        outcome: &mut CheckmkOutcome,
    ) -> AppResult<()> {
        for action in &rule.actions {
            match action {
                CheckmkAction::MoveFolder(param) => {
                    if let Some(rendered) = ctx.render(param) {
                        Self::append_folder(outcome, &rendered);
                    }
                }
                CheckmkAction::ValueAsFolder(name) => match ctx.attributes.get(name) {
                    Some(value) if is_truthy(value) && value_to_string(value) != "null" => {
                        Self::append_folder(outcome, &value_to_string(value));
                    }
                    _ => debug!("value_as_folder: attribute '{}' empty or missing", name),
                },
                CheckmkAction::TagAsFolder(search) => {
                    let tags: Vec<String> = ctx
                        .attributes
                        .iter()
                        .filter(|(_, value)| {
                            is_truthy(value)
                                && value_to_string(value) != "null"
                                && value_to_string(value) == *search
                        })
                        .map(|(tag, _)| tag.clone())
                        .collect();
                    for tag in tags {
                        Self::append_folder(outcome, &tag);
                    }
                }
                CheckmkAction::FolderPool(filter) => self.pool_folder(filter, ctx, outcome)?,
                CheckmkAction::DontMove => outcome.dont_move = true,
                CheckmkAction::DontUpdate => outcome.dont_update = true,
                CheckmkAction::PrefixLabels(prefix) => {
                    if outcome.label_prefix.is_none() {
                        outcome.label_prefix = Some(prefix.clone());
                    }
                }
                CheckmkAction::OnlyUpdatePrefixedLabels(value) => {
                    if outcome.only_update_prefixed_labels.is_none() {
                        outcome.only_update_prefixed_labels = Some(value.clone());
                    }
                }
                CheckmkAction::Attribute(name) => {
                    if !name.is_empty() {
                        push_unique(&mut outcome.attributes, name.clone());
                    }
                }
                CheckmkAction::CustomAttribute(param) => {
                    if let Some(rendered) = ctx.render(param) {
                        Self::custom_attributes(&rendered, outcome);
                    }
                }
                CheckmkAction::SetParent(param) => {
                    if let Some(rendered) = ctx.render(param) {
                        for parent in split_list(&rendered) {
                            push_unique(&mut outcome.parents, parent.to_string());
                        }
                    }
                }
                CheckmkAction::CreateCluster(param) => {
                    for node_tag in split_list(param) {
                        let nodes: Vec<String> = match node_tag.strip_suffix('*') {
                            Some(prefix) => ctx
                                .attributes
                                .iter()
                                .filter(|(tag, value)| tag.starts_with(prefix) && is_truthy(value))
                                .map(|(_, value)| value_to_string(value))
                                .collect(),
                            None => ctx
                                .attributes
                                .get(node_tag)
                                .filter(|value| is_truthy(value))
                                .map(value_to_string)
                                .into_iter()
                                .collect(),
                        };
                        for node in nodes {
                            push_unique(&mut outcome.create_cluster, node);
                        }
                    }
                }
                CheckmkAction::Unknown { action, .. } => {
                    debug!("Rule '{}': unknown action '{}' skipped", rule.name, action);
                }
            }
        }
        Ok(())
    }

    /// Reclaim the host's pool seat when no pool rule matched in this pass
    fn finish(
        &self,
        mut outcome: CheckmkOutcome,
        ctx: &mut ReduceContext<'_>,
    ) -> AppResult<CheckmkOutcome> {
        if !ctx.pool_rule_matched {
            self.pool.reclaim(ctx.host);
        }

        outcome.prune();
        Ok(outcome)
    }
}
