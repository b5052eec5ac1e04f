//! Test fixtures for common test data
//!
//! Fixtures provide pre-defined test data that can be used across multiple tests.

use serde_json::json;

use hostsync::config::RulesConfig;
use hostsync::models::Host;

/// Rules used by the API and engine tests
pub const RULES_YAML: &str = r#"
custom_attributes:
  - name: location
    conditions:
      - attribute: site
        operator: exists
        value: true
    actions:
      - action: custom_attribute
        param: "location: {{ site }}-dc"
checkmk:
  filter:
    - name: export labels
      actions:
        - action: whitelist_attribute
          param: "os,location,role"
    - name: skip lab
      conditions:
        - attribute: env
          operator: "="
          value: lab
      actions:
        - action: ignore_host
  export:
    - name: site folder
      sort_order: 10
      conditions:
        - attribute: site
          operator: exists
          value: true
      actions:
        - action: value_as_folder
          param: site
    - name: web pool
      sort_order: 20
      conditions:
        - attribute: role
          operator: "="
          value: web
      actions:
        - action: folder_pool
          param: ""
        - action: custom_attribute
          param: "monitored: true, legacy: none"
netbox:
  interfaces:
    - name: primary nic
      actions:
        - action: name
          param: "{{ nic }}"
        - action: mtu
          param: "1500"
idoit:
  export:
    - name: servers
      actions:
        - action: id_device_type_sync
          param: device_type
"#;

/// Host fixtures
pub struct HostFixtures;

impl HostFixtures {
    /// Web host in Berlin, matches the pool rule
    pub fn web() -> Host {
        Host::new("web01.example.com").with_labels(
            [
                ("os".to_string(), json!("linux")),
                ("site".to_string(), json!("Berlin")),
                ("role".to_string(), json!("web")),
                ("nic".to_string(), json!("eth0")),
            ]
            .into_iter()
            .collect(),
        )
    }

    /// Database host, no pool rule
    pub fn db() -> Host {
        Host::new("db01.example.com").with_labels(
            [
                ("os".to_string(), json!("linux")),
                ("site".to_string(), json!("Hamburg")),
                ("role".to_string(), json!("db")),
            ]
            .into_iter()
            .collect(),
        )
    }

    /// Host the checkmk filter ignores
    pub fn lab() -> Host {
        Host::new("lab01.example.com").with_labels(
            [
                ("os".to_string(), json!("linux")),
                ("env".to_string(), json!("lab")),
            ]
            .into_iter()
            .collect(),
        )
    }
}

/// Parsed [`RULES_YAML`]
pub fn test_rules() -> RulesConfig {
    serde_norway::from_str(RULES_YAML).expect("Failed to parse test rules")
}
