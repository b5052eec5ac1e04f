//! Checkmk export data models

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::Action;

/// Host management actions for the Checkmk export
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Action", into = "Action")]
pub enum CheckmkAction {
    /// Append a (templated) folder to the destination path
    MoveFolder(String),
    /// Append the value of the named attribute as a folder
    ValueAsFolder(String),
    /// Append the name of the attribute holding the given value as a folder
    TagAsFolder(String),
    /// Take a seat from the folder pool; optional comma list of allowed pools
    FolderPool(String),
    /// Never move the host
    DontMove,
    /// Never update the host
    DontUpdate,
    /// Prefix for exported labels
    PrefixLabels(String),
    /// Restrict label updates to prefixed labels
    OnlyUpdatePrefixedLabels(String),
    /// Export an attribute by name
    Attribute(String),
    /// `name:value` pairs, see [`crate::services::literal`]
    CustomAttribute(String),
    /// Comma separated parent hosts
    SetParent(String),
    /// Comma separated attribute names (trailing `*` = prefix) holding cluster nodes
    CreateCluster(String),
    /// Kind outside the vocabulary, skipped by the reducer
    Unknown { action: String, param: String },
}

impl From<Action> for CheckmkAction {
    fn from(action: Action) -> Self {
        let Action { action, param } = action;
        match action.as_str() {
            "move_folder" => Self::MoveFolder(param),
            "value_as_folder" => Self::ValueAsFolder(param),
            "tag_as_folder" => Self::TagAsFolder(param),
            "folder_pool" => Self::FolderPool(param),
            "dont_move" => Self::DontMove,
            "dont_update" => Self::DontUpdate,
            "prefix_labels" => Self::PrefixLabels(param),
            "only_update_prefixed_labels" => Self::OnlyUpdatePrefixedLabels(param),
            "attribute" => Self::Attribute(param),
            "custom_attribute" => Self::CustomAttribute(param),
            "set_parent" => Self::SetParent(param),
            "create_cluster" => Self::CreateCluster(param),
            _ => Self::Unknown { action, param },
        }
    }
}

impl From<CheckmkAction> for Action {
    fn from(action: CheckmkAction) -> Self {
        match action {
            CheckmkAction::MoveFolder(p) => Action::new("move_folder", p),
            CheckmkAction::ValueAsFolder(p) => Action::new("value_as_folder", p),
            CheckmkAction::TagAsFolder(p) => Action::new("tag_as_folder", p),
            CheckmkAction::FolderPool(p) => Action::new("folder_pool", p),
            CheckmkAction::DontMove => Action::new("dont_move", ""),
            CheckmkAction::DontUpdate => Action::new("dont_update", ""),
            CheckmkAction::PrefixLabels(p) => Action::new("prefix_labels", p),
            CheckmkAction::OnlyUpdatePrefixedLabels(p) => {
                Action::new("only_update_prefixed_labels", p)
            }
            CheckmkAction::Attribute(p) => Action::new("attribute", p),
            CheckmkAction::CustomAttribute(p) => Action::new("custom_attribute", p),
            CheckmkAction::SetParent(p) => Action::new("set_parent", p),
            CheckmkAction::CreateCluster(p) => Action::new("create_cluster", p),
            CheckmkAction::Unknown { action, param } => Action { action, param },
        }
    }
}

/// A custom attribute to set on the monitored host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomAttribute {
    pub name: String,
    pub value: Value,
}

/// Composed Checkmk instructions for one host
///
/// Empty fields are not serialized: an absent key means "no instruction".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CheckmkOutcome {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub move_folder: Option<String>,

    /// Destination path with each segment's `|options` suffix kept
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra_folder_options: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub custom_attributes: Vec<CustomAttribute>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub remove_attributes: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parents: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub create_cluster: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label_prefix: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub only_update_prefixed_labels: Option<String>,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub dont_move: bool,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub dont_update: bool,
}

impl CheckmkOutcome {
    /// Drop scalar fields that ended up empty
    pub fn prune(&mut self) {
        for field in [
            &mut self.move_folder,
            &mut self.extra_folder_options,
            &mut self.label_prefix,
            &mut self.only_update_prefixed_labels,
        ] {
            if field.as_deref().is_some_and(str::is_empty) {
                *field = None;
            }
        }
    }

    /// Whether the outcome carries no instruction at all
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// A Checkmk ruleset entry; params are passed through untouched
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RulesetAction {
    pub ruleset: String,

    #[serde(flatten)]
    pub params: BTreeMap<String, Value>,
}
