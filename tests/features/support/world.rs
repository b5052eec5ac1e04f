//! Test world for Cucumber scenarios

use std::collections::HashMap;
use std::sync::Arc;

use cucumber::World;

use hostsync::models::{AttributeBag, CheckmkAction, CheckmkOutcome, Host, Rule};
use hostsync::services::{AttributeInstruction, CheckmkFolderReducer, FolderPool, RuleEngine};
use hostsync::utils::AppError;

/// Test world that maintains state across scenario steps
#[derive(Debug, Default, World)]
pub struct TestWorld {
    /// Hosts by name
    pub hosts: HashMap<String, Host>,

    /// Checkmk export rules, in declaration order
    pub rules: Vec<Rule<CheckmkAction>>,

    /// Shared folder pool
    pub pool: Arc<FolderPool>,

    /// Outcome of the last successful evaluation
    pub last_outcome: Option<CheckmkOutcome>,

    /// Error of the last failed evaluation
    pub last_error: Option<AppError>,

    /// Parsed custom attribute instructions
    pub instructions: Vec<AttributeInstruction>,
}

impl TestWorld {
    pub fn host_mut(&mut self, hostname: &str) -> &mut Host {
        self.hosts
            .entry(hostname.to_string())
            .or_insert_with(|| Host::new(hostname))
    }

    /// Run the checkmk export rules for one host
    pub fn evaluate(&mut self, hostname: &str) {
        let reducer = CheckmkFolderReducer::new(Arc::clone(&self.pool));
        let host = self
            .hosts
            .get_mut(hostname)
            .unwrap_or_else(|| panic!("Unknown host {}", hostname));

        let mut bag = AttributeBag::new();
        bag.merge_truthy(&host.labels);

        match RuleEngine::default().get_outcomes(&reducer, &self.rules, host, &bag) {
            Ok(outcome) => {
                self.last_outcome = Some(outcome);
                self.last_error = None;
            }
            Err(e) => {
                self.last_outcome = None;
                self.last_error = Some(e);
            }
        }
    }

    pub fn outcome(&self) -> &CheckmkOutcome {
        self.last_outcome
            .as_ref()
            .unwrap_or_else(|| panic!("No outcome, last error: {:?}", self.last_error))
    }
}
