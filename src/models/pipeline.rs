//! Attribute pipeline models: custom attributes, rewrites, filters and the
//! i-doit export

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::Action;

/// Computed attribute actions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Action", into = "Action")]
pub enum CustomAttributeAction {
    /// `name:value-template` pairs
    CustomAttribute(String),
    Unknown { action: String, param: String },
}

impl From<Action> for CustomAttributeAction {
    fn from(action: Action) -> Self {
        let Action { action, param } = action;
        match action.as_str() {
            "custom_attribute" => Self::CustomAttribute(param),
            _ => Self::Unknown { action, param },
        }
    }
}

impl From<CustomAttributeAction> for Action {
    fn from(action: CustomAttributeAction) -> Self {
        match action {
            CustomAttributeAction::CustomAttribute(p) => Action::new("custom_attribute", p),
            CustomAttributeAction::Unknown { action, param } => Action { action, param },
        }
    }
}

/// Attribute rewrite actions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Action", into = "Action")]
pub enum RewriteAction {
    /// `name:value-template`
    SetAttribute(String),
    /// `old:new-name-template`
    RenameAttribute(String),
    /// Attribute name
    DeleteAttribute(String),
    Unknown { action: String, param: String },
}

impl From<Action> for RewriteAction {
    fn from(action: Action) -> Self {
        let Action { action, param } = action;
        match action.as_str() {
            "set_attribute" => Self::SetAttribute(param),
            "rename_attribute" => Self::RenameAttribute(param),
            "delete_attribute" => Self::DeleteAttribute(param),
            _ => Self::Unknown { action, param },
        }
    }
}

impl From<RewriteAction> for Action {
    fn from(action: RewriteAction) -> Self {
        match action {
            RewriteAction::SetAttribute(p) => Action::new("set_attribute", p),
            RewriteAction::RenameAttribute(p) => Action::new("rename_attribute", p),
            RewriteAction::DeleteAttribute(p) => Action::new("delete_attribute", p),
            RewriteAction::Unknown { action, param } => Action { action, param },
        }
    }
}

/// Additions and deletions applied to the attribute bag
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RewriteOutcome {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub add: BTreeMap<String, Value>,

    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub delete: BTreeSet<String>,
}

/// Attribute filter actions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Action", into = "Action")]
pub enum FilterAction {
    /// Comma separated attribute names to export; trailing `*` = prefix
    WhitelistAttribute(String),
    /// Skip the host for this integration
    IgnoreHost,
    Unknown { action: String, param: String },
}

impl From<Action> for FilterAction {
    fn from(action: Action) -> Self {
        let Action { action, param } = action;
        match action.as_str() {
            "whitelist_attribute" => Self::WhitelistAttribute(param),
            "ignore_host" => Self::IgnoreHost,
            _ => Self::Unknown { action, param },
        }
    }
}

impl From<FilterAction> for Action {
    fn from(action: FilterAction) -> Self {
        match action {
            FilterAction::WhitelistAttribute(p) => Action::new("whitelist_attribute", p),
            FilterAction::IgnoreHost => Action::new("ignore_host", ""),
            FilterAction::Unknown { action, param } => Action { action, param },
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterOutcome {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub whitelist: Vec<String>,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub ignore_host: bool,
}

/// i-doit export actions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Action", into = "Action")]
pub enum IdoitAction {
    /// Attribute holding the i-doit object type
    IdDeviceTypeSync(String),
    IgnoreHost,
    Unknown { action: String, param: String },
}

impl From<Action> for IdoitAction {
    fn from(action: Action) -> Self {
        let Action { action, param } = action;
        match action.as_str() {
            "id_device_type_sync" => Self::IdDeviceTypeSync(param),
            "ignore_host" => Self::IgnoreHost,
            _ => Self::Unknown { action, param },
        }
    }
}

impl From<IdoitAction> for Action {
    fn from(action: IdoitAction) -> Self {
        match action {
            IdoitAction::IdDeviceTypeSync(p) => Action::new("id_device_type_sync", p),
            IdoitAction::IgnoreHost => Action::new("ignore_host", ""),
            IdoitAction::Unknown { action, param } => Action { action, param },
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IdoitOutcome {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_device_type_sync: Option<String>,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub ignore_host: bool,
}
