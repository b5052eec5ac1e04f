//! Netbox export data models
//!
//! Netbox actions name the target field directly, so every entity type has a
//! handful of kinds with special handling plus an open `Field` variant.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::Action;

/// Single field instruction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldValue {
    pub value: Value,
}

impl FieldValue {
    pub fn new(value: impl Into<Value>) -> Self {
        Self {
            value: value.into(),
        }
    }
}

pub type FieldMap = BTreeMap<String, FieldValue>;

/// Device attribute actions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Action", into = "Action")]
pub enum DeviceAction {
    /// Comma separated keys Netbox must never overwrite
    UpdateOptout(String),
    /// `key:value` custom field
    CustomField(String),
    /// Serial number, truncated to 50 characters
    Serial(String),
    /// Device model, sent as sub field
    Model(String),
    Field { name: String, param: String },
}

impl From<Action> for DeviceAction {
    fn from(action: Action) -> Self {
        let Action { action, param } = action;
        match action.as_str() {
            "update_optout" => Self::UpdateOptout(param),
            "custom_field" => Self::CustomField(param),
            "serial" => Self::Serial(param),
            "model" => Self::Model(param),
            _ => Self::Field {
                name: action,
                param,
            },
        }
    }
}

impl From<DeviceAction> for Action {
    fn from(action: DeviceAction) -> Self {
        match action {
            DeviceAction::UpdateOptout(p) => Action::new("update_optout", p),
            DeviceAction::CustomField(p) => Action::new("custom_field", p),
            DeviceAction::Serial(p) => Action::new("serial", p),
            DeviceAction::Model(p) => Action::new("model", p),
            DeviceAction::Field { name, param } => Action::new(name, param),
        }
    }
}

/// Composed device instructions
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceOutcome {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub fields: FieldMap,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub custom_fields: FieldMap,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub sub_fields: FieldMap,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub do_not_update_keys: Vec<String>,
}

/// IP address actions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Action", into = "Action")]
pub enum IpAction {
    /// Identity field; an empty address discards the record
    Address(String),
    /// Comma separated addresses to drop
    IgnoreIp(String),
    /// `false` (case-insensitive) unassigns, anything else assigns
    Assigned(String),
    Field { name: String, param: String },
}

impl From<Action> for IpAction {
    fn from(action: Action) -> Self {
        let Action { action, param } = action;
        match action.as_str() {
            "address" => Self::Address(param),
            "ignore_ip" => Self::IgnoreIp(param),
            "assigned" => Self::Assigned(param),
            _ => Self::Field {
                name: action,
                param,
            },
        }
    }
}

impl From<IpAction> for Action {
    fn from(action: IpAction) -> Self {
        match action {
            IpAction::Address(p) => Action::new("address", p),
            IpAction::IgnoreIp(p) => Action::new("ignore_ip", p),
            IpAction::Assigned(p) => Action::new("assigned", p),
            IpAction::Field { name, param } => Action::new(name, param),
        }
    }
}

/// Interface actions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Action", into = "Action")]
pub enum InterfaceAction {
    /// Identity field; an empty name discards the record
    Name(String),
    /// Upper-cased MAC address
    MacAddress(String),
    /// Integer MTU
    Mtu(String),
    /// Comma separated interface names to drop
    IgnoreInterface(String),
    /// Sub field: address to attach to the interface
    IpAddress(String),
    /// Sub field: owning device id
    NetboxDeviceId(String),
    Field { name: String, param: String },
}

impl From<Action> for InterfaceAction {
    fn from(action: Action) -> Self {
        let Action { action, param } = action;
        match action.as_str() {
            "name" => Self::Name(param),
            "mac_address" => Self::MacAddress(param),
            "mtu" => Self::Mtu(param),
            "ignore_interface" => Self::IgnoreInterface(param),
            "ip_address" => Self::IpAddress(param),
            "netbox_device_id" => Self::NetboxDeviceId(param),
            _ => Self::Field {
                name: action,
                param,
            },
        }
    }
}

impl From<InterfaceAction> for Action {
    fn from(action: InterfaceAction) -> Self {
        match action {
            InterfaceAction::Name(p) => Action::new("name", p),
            InterfaceAction::MacAddress(p) => Action::new("mac_address", p),
            InterfaceAction::Mtu(p) => Action::new("mtu", p),
            InterfaceAction::IgnoreInterface(p) => Action::new("ignore_interface", p),
            InterfaceAction::IpAddress(p) => Action::new("ip_address", p),
            InterfaceAction::NetboxDeviceId(p) => Action::new("netbox_device_id", p),
            InterfaceAction::Field { name, param } => Action::new(name, param),
        }
    }
}

/// One record produced by one rule application
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NetboxRecord {
    pub fields: FieldMap,

    #[serde(default)]
    pub sub_fields: FieldMap,

    /// Name of the rule that produced the record
    pub by_rule: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IpOutcome {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ips: Vec<NetboxRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InterfaceOutcome {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub interfaces: Vec<NetboxRecord>,
}

/// Contact actions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Action", into = "Action")]
pub enum ContactAction {
    /// Only accepted when it contains `@`
    Email(String),
    Field { name: String, param: String },
}

impl From<Action> for ContactAction {
    fn from(action: Action) -> Self {
        let Action { action, param } = action;
        match action.as_str() {
            "email" => Self::Email(param),
            _ => Self::Field {
                name: action,
                param,
            },
        }
    }
}

impl From<ContactAction> for Action {
    fn from(action: ContactAction) -> Self {
        match action {
            ContactAction::Email(p) => Action::new("email", p),
            ContactAction::Field { name, param } => Action::new(name, param),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContactOutcome {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub fields: FieldMap,
}

/// Dataflow field definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataflowAction {
    pub field_name: String,

    /// Value template
    pub field_value: String,

    #[serde(default)]
    pub use_to_identify: bool,

    /// Split the rendered value on commas, one record per item
    #[serde(default)]
    pub expand_value_as_list: bool,

    /// Target field is a list field in Netbox
    #[serde(default, alias = "is_netbox_list_field")]
    pub is_list: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataflowField {
    pub value: String,
    pub use_to_identify: bool,
    pub expand_value_as_list: bool,
    #[serde(default)]
    pub is_list: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataflowRecord {
    pub rule: String,
    pub fields: BTreeMap<String, DataflowField>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataflowOutcome {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rules: Vec<DataflowRecord>,
}
