//! Netbox reducers
//!
//! Devices and contacts merge into one field map (last rule wins). IP
//! addresses and interfaces produce one record per matched rule. Dataflows can
//! expand one rule into several records.

use std::collections::BTreeMap;

use serde_json::Value;
use tracing::debug;

use crate::models::{
    ContactAction, ContactOutcome, DataflowAction, DataflowField, DataflowOutcome, DataflowRecord,
    DeviceAction, DeviceOutcome, FieldMap, FieldValue, InterfaceAction, InterfaceOutcome, IpAction,
    IpOutcome, NetboxRecord, Rule, value_to_string,
};
use crate::services::reducer::{OutcomeReducer, ReduceContext};
use crate::utils::AppResult;

const MAX_SERIAL_LENGTH: usize = 50;

fn split_list(value: &str) -> impl Iterator<Item = String> + '_ {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn render_trimmed(ctx: &ReduceContext<'_>, param: &str) -> Option<String> {
    ctx.render(param).map(|v| v.trim().to_string())
}

/// Device attributes
#[derive(Debug, Clone, Copy, Default)]
pub struct DeviceReducer;

impl OutcomeReducer for DeviceReducer {
    type Action = DeviceAction;
    type Outcome = DeviceOutcome;

    fn add_outcomes(
        &self,
        rule: &Rule<DeviceAction>,
        ctx: &mut ReduceContext<'_>,
        outcome: &mut DeviceOutcome,
    ) -> AppResult<()> {
        for action in &rule.actions {
            match action {
                DeviceAction::UpdateOptout(keys) => {
                    for key in split_list(keys) {
                        if !outcome.do_not_update_keys.contains(&key) {
                            outcome.do_not_update_keys.push(key);
                        }
                    }
                }
                DeviceAction::CustomField(param) => {
                    let Some(rendered) = ctx.render(param) else {
                        continue;
                    };
                    match rendered.split_once(':') {
                        Some((key, value)) if !key.trim().is_empty() => {
                            outcome
                                .custom_fields
                                .insert(key.trim().to_string(), FieldValue::new(value.trim()));
                        }
                        _ => debug!("Custom field '{}' is not a key:value pair", rendered),
                    }
                }
                DeviceAction::Serial(param) => {
                    if let Some(value) = device_value(ctx, param) {
                        let serial: String = value.chars().take(MAX_SERIAL_LENGTH).collect();
                        outcome
                            .fields
                            .insert("serial".to_string(), FieldValue::new(serial));
                    }
                }
                DeviceAction::Model(param) => {
                    if let Some(value) = device_value(ctx, param) {
                        outcome
                            .sub_fields
                            .insert("model".to_string(), FieldValue::new(value));
                    }
                }
                DeviceAction::Field { name, param } => {
                    if let Some(value) = device_value(ctx, param) {
                        outcome.fields.insert(name.clone(), FieldValue::new(value));
                    }
                }
            }
        }
        Ok(())
    }
}

/// Rendered value, or `None` for empty and `None` renderings
fn device_value(ctx: &ReduceContext<'_>, param: &str) -> Option<String> {
    render_trimmed(ctx, param).filter(|v| !v.is_empty() && v != "None")
}

/// IP addresses, one record per matched rule
#[derive(Debug, Clone, Copy, Default)]
pub struct IpAddressReducer;

impl OutcomeReducer for IpAddressReducer {
    type Action = IpAction;
    type Outcome = IpOutcome;

    fn add_outcomes(
        &self,
        rule: &Rule<IpAction>,
        ctx: &mut ReduceContext<'_>,
        outcome: &mut IpOutcome,
    ) -> AppResult<()> {
        let mut fields = FieldMap::new();
        let mut ignored: Vec<String> = Vec::new();

        for action in &rule.actions {
            match action {
                IpAction::Address(param) => {
                    let address = render_trimmed(ctx, param).unwrap_or_default();
                    if address.is_empty() {
                        debug!("Rule '{}' rendered no address, record dropped", rule.name);
                        return Ok(());
                    }
                    fields.insert("address".to_string(), FieldValue::new(address));
                }
                IpAction::IgnoreIp(param) => {
                    if let Some(rendered) = ctx.render(param) {
                        ignored.extend(split_list(&rendered));
                    }
                }
                IpAction::Assigned(param) => {
                    let assigned = !param.trim().eq_ignore_ascii_case("false");
                    fields.insert("assigned".to_string(), FieldValue::new(assigned));
                }
                IpAction::Field { name, param } => {
                    if let Some(value) = render_trimmed(ctx, param) {
                        fields.insert(name.clone(), FieldValue::new(value));
                    }
                }
            }
        }

        push_record(&mut outcome.ips, rule, "address", fields, FieldMap::new(), &ignored);
        Ok(())
    }
}

/// Interfaces, one record per matched rule
#[derive(Debug, Clone, Copy, Default)]
pub struct InterfaceReducer;

impl OutcomeReducer for InterfaceReducer {
    type Action = InterfaceAction;
    type Outcome = InterfaceOutcome;

    fn add_outcomes(
        &self,
        rule: &Rule<InterfaceAction>,
        ctx: &mut ReduceContext<'_>,
        outcome: &mut InterfaceOutcome,
    ) -> AppResult<()> {
        let mut fields = FieldMap::new();
        let mut sub_fields = FieldMap::new();
        let mut ignored: Vec<String> = Vec::new();

        for action in &rule.actions {
            match action {
                InterfaceAction::Name(param) => {
                    let name = render_trimmed(ctx, param).unwrap_or_default();
                    if name.is_empty() {
                        debug!("Rule '{}' rendered no interface name, record dropped", rule.name);
                        return Ok(());
                    }
                    fields.insert("name".to_string(), FieldValue::new(name));
                }
                InterfaceAction::MacAddress(param) => {
                    match render_trimmed(ctx, param).filter(|v| !v.is_empty()) {
                        Some(mac) => {
                            fields.insert("mac_address".to_string(), FieldValue::new(mac.to_uppercase()));
                        }
                        None => continue,
                    }
                }
                InterfaceAction::Mtu(param) => {
                    let Some(mtu) = render_trimmed(ctx, param).filter(|v| !v.is_empty()) else {
                        continue;
                    };
                    match mtu.parse::<i64>() {
                        Ok(mtu) => {
                            fields.insert("mtu".to_string(), FieldValue::new(mtu));
                        }
                        Err(_) => debug!("Rule '{}': mtu '{}' is not a number", rule.name, mtu),
                    }
                }
                InterfaceAction::IgnoreInterface(param) => {
                    if let Some(rendered) = ctx.render(param) {
                        ignored.extend(split_list(&rendered));
                    }
                }
                InterfaceAction::IpAddress(param) => {
                    if let Some(value) = render_trimmed(ctx, param) {
                        sub_fields.insert("ip_address".to_string(), interface_value(value));
                    }
                }
                InterfaceAction::NetboxDeviceId(param) => {
                    if let Some(value) = render_trimmed(ctx, param) {
                        sub_fields.insert("netbox_device_id".to_string(), interface_value(value));
                    }
                }
                InterfaceAction::Field { name, param } => {
                    if let Some(value) = render_trimmed(ctx, param) {
                        fields.insert(name.clone(), interface_value(value));
                    }
                }
            }
        }

        push_record(&mut outcome.interfaces, rule, "name", fields, sub_fields, &ignored);
        Ok(())
    }
}

/// `None` renders become null so Netbox clears the field
fn interface_value(value: String) -> FieldValue {
    if value == "None" {
        FieldValue::new(Value::Null)
    } else {
        FieldValue::new(value)
    }
}

/// Append a record unless its identity is missing or ignored
fn push_record<A>(
    records: &mut Vec<NetboxRecord>,
    rule: &Rule<A>,
    identity: &str,
    fields: FieldMap,
    sub_fields: FieldMap,
    ignored: &[String],
) {
    let Some(id) = fields.get(identity).map(|f| value_to_string(&f.value)) else {
        debug!("Rule '{}' has no '{}' field, record dropped", rule.name, identity);
        return;
    };
    if ignored.contains(&id) {
        debug!("Rule '{}': '{}' is ignored", rule.name, id);
        return;
    }
    records.push(NetboxRecord {
        fields,
        sub_fields,
        by_rule: rule.name.clone(),
    });
}

/// Contact attributes
#[derive(Debug, Clone, Copy, Default)]
pub struct ContactReducer;

impl OutcomeReducer for ContactReducer {
    type Action = ContactAction;
    type Outcome = ContactOutcome;

    fn add_outcomes(
        &self,
        rule: &Rule<ContactAction>,
        ctx: &mut ReduceContext<'_>,
        outcome: &mut ContactOutcome,
    ) -> AppResult<()> {
        for action in &rule.actions {
            let (name, value) = match action {
                ContactAction::Email(param) => {
                    match render_trimmed(ctx, param).filter(|v| v.contains('@')) {
                        Some(email) => ("email".to_string(), email),
                        None => {
                            debug!("Rule '{}': invalid contact email skipped", rule.name);
                            continue;
                        }
                    }
                }
                ContactAction::Field { name, param } => match render_trimmed(ctx, param) {
                    Some(value) if !value.is_empty() => (name.clone(), value),
                    _ => continue,
                },
            };
            outcome.fields.insert(name, FieldValue::new(value));
        }
        Ok(())
    }
}

/// Dataflow records, expanded per list value
#[derive(Debug, Clone, Copy, Default)]
pub struct DataflowReducer;

impl OutcomeReducer for DataflowReducer {
    type Action = DataflowAction;
    type Outcome = DataflowOutcome;

    fn add_outcomes(
        &self,
        rule: &Rule<DataflowAction>,
        ctx: &mut ReduceContext<'_>,
        outcome: &mut DataflowOutcome,
    ) -> AppResult<()> {
        let mut unique: BTreeMap<String, DataflowField> = BTreeMap::new();
        let mut expanded: Vec<(String, DataflowField)> = Vec::new();

        for action in &rule.actions {
            let Some(value) = render_trimmed(ctx, &action.field_value).filter(|v| !v.is_empty())
            else {
                continue;
            };

            let field = |value: String| DataflowField {
                value,
                use_to_identify: action.use_to_identify,
                expand_value_as_list: action.expand_value_as_list,
                is_list: action.is_list,
            };

            if action.expand_value_as_list {
                for item in split_list(&value) {
                    expanded.push((action.field_name.clone(), field(item)));
                }
            } else {
                unique.insert(action.field_name.clone(), field(value));
            }
        }

        if expanded.is_empty() {
            if !unique.is_empty() {
                outcome.rules.push(DataflowRecord {
                    rule: rule.name.clone(),
                    fields: unique,
                });
            }
            return Ok(());
        }

        for (name, field) in expanded {
            let mut fields = BTreeMap::from([(name, field)]);
            fields.extend(unique.clone());
            outcome.rules.push(DataflowRecord {
                rule: rule.name.clone(),
                fields,
            });
        }
        Ok(())
    }
}
