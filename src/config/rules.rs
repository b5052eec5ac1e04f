//! Rule sets, loaded from a separate YAML file

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::models::{
    CheckmkAction, ContactAction, CustomAttributeAction, DataflowAction, DeviceAction,
    FilterAction, IdoitAction, InterfaceAction, IpAction, RewriteAction, Rule, RulesetAction,
};

/// All rule sets known to the engine
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct RulesConfig {
    /// Computed attributes, shared by every integration
    #[serde(default)]
    pub custom_attributes: Vec<Rule<CustomAttributeAction>>,
    #[serde(default)]
    pub checkmk: CheckmkRules,
    #[serde(default)]
    pub netbox: NetboxRules,
    #[serde(default)]
    pub idoit: IdoitRules,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct CheckmkRules {
    #[serde(default)]
    pub rewrite: Vec<Rule<RewriteAction>>,
    #[serde(default)]
    pub filter: Vec<Rule<FilterAction>>,
    #[serde(default)]
    pub export: Vec<Rule<CheckmkAction>>,
    #[serde(default)]
    pub rulesets: Vec<Rule<RulesetAction>>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct NetboxRules {
    #[serde(default)]
    pub rewrite: Vec<Rule<RewriteAction>>,
    #[serde(default)]
    pub filter: Vec<Rule<FilterAction>>,
    #[serde(default)]
    pub devices: Vec<Rule<DeviceAction>>,
    #[serde(default)]
    pub ip_addresses: Vec<Rule<IpAction>>,
    #[serde(default)]
    pub interfaces: Vec<Rule<InterfaceAction>>,
    #[serde(default)]
    pub contacts: Vec<Rule<ContactAction>>,
    #[serde(default)]
    pub dataflows: Vec<Rule<DataflowAction>>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct IdoitRules {
    #[serde(default)]
    pub rewrite: Vec<Rule<RewriteAction>>,
    #[serde(default)]
    pub filter: Vec<Rule<FilterAction>>,
    #[serde(default)]
    pub export: Vec<Rule<IdoitAction>>,
}

impl RulesConfig {
    /// Load rules from file
    pub fn load(path: &PathBuf) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read rules file: {:?}", path))?;
        serde_norway::from_str(&contents)
            .with_context(|| format!("Failed to parse rules file: {:?}", path))
    }

    /// Find the rules file in standard locations
    pub fn find_config_file() -> Option<PathBuf> {
        let paths = [
            PathBuf::from("rules.yaml"),
            PathBuf::from("config/rules.yaml"),
            PathBuf::from("/etc/hostsync/rules.yaml"),
            dirs::config_dir()
                .map(|p| p.join("hostsync/rules.yaml"))
                .unwrap_or_default(),
        ];

        paths.into_iter().find(|p| p.exists())
    }
}
