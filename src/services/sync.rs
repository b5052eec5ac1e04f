//! Host evaluation across every integration
//!
//! Each host runs through its integration's attribute pipeline and then
//! through that integration's reducers. Batches run on a bounded set of
//! blocking workers that share one folder pool.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use serde::Serialize;
use tracing::{debug, error, info};

use crate::config::RulesConfig;
use crate::models::{
    AttributeBag, CheckmkOutcome, ContactOutcome, DataflowOutcome, DeviceOutcome, Host,
    HostAttributes, IdoitOutcome, InterfaceOutcome, IpOutcome, RulesetAction,
};
use crate::services::attributes::{AttributePipeline, HostAttributeCache};
use crate::services::checkmk::CheckmkFolderReducer;
use crate::services::folder_pool::FolderPool;
use crate::services::idoit::IdoitReducer;
use crate::services::netbox::{
    ContactReducer, DataflowReducer, DeviceReducer, InterfaceReducer, IpAddressReducer,
};
use crate::services::reducer::{RuleEngine, RulesetReducer};
use crate::utils::{AppError, AppResult};

/// External system a host is synced to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Integration {
    Checkmk,
    Netbox,
    Idoit,
}

impl Integration {
    pub const ALL: [Integration; 3] = [Integration::Checkmk, Integration::Netbox, Integration::Idoit];

    pub fn as_str(&self) -> &'static str {
        match self {
            Integration::Checkmk => "checkmk",
            Integration::Netbox => "netbox",
            Integration::Idoit => "idoit",
        }
    }
}

impl fmt::Display for Integration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Integration {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "checkmk" | "cmk" => Ok(Integration::Checkmk),
            "netbox" => Ok(Integration::Netbox),
            "idoit" | "i-doit" => Ok(Integration::Idoit),
            other => Err(AppError::bad_request(format!("Unknown integration: {}", other))),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CheckmkEvaluation {
    pub labels: AttributeBag,
    pub export: CheckmkOutcome,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub rulesets: BTreeMap<String, Vec<RulesetAction>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NetboxEvaluation {
    pub labels: AttributeBag,
    pub device: DeviceOutcome,
    pub ip_addresses: IpOutcome,
    pub interfaces: InterfaceOutcome,
    pub contacts: ContactOutcome,
    pub dataflows: DataflowOutcome,
}

#[derive(Debug, Clone, Serialize)]
pub struct IdoitEvaluation {
    pub labels: AttributeBag,
    pub export: IdoitOutcome,
}

/// Outcome of one integration for one host
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum IntegrationEvaluation {
    Checkmk(CheckmkEvaluation),
    Netbox(NetboxEvaluation),
    Idoit(IdoitEvaluation),
}

/// Outcomes of every integration for one host
///
/// An integration is absent when its filter rules ignore the host.
#[derive(Debug, Clone, Serialize)]
pub struct HostEvaluation {
    pub hostname: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checkmk: Option<CheckmkEvaluation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub netbox: Option<NetboxEvaluation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub idoit: Option<IdoitEvaluation>,
}

/// What the debug view shows for one host and integration
#[derive(Debug, Clone, Serialize)]
pub struct HostDebug {
    pub hostname: String,
    pub integration: Integration,
    pub attributes: HostAttributes,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<IntegrationEvaluation>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FailedHost {
    pub hostname: String,
    pub error: String,
}

/// Result of a batch; `hosts` carries every host back for persistence
#[derive(Debug, Default)]
pub struct SyncReport {
    pub hosts: Vec<Host>,
    pub evaluations: Vec<HostEvaluation>,
    pub failed: Vec<FailedHost>,
}

/// Runs the rule engine for hosts
#[derive(Clone)]
pub struct SyncService {
    rules: Arc<RulesConfig>,
    engine: RuleEngine,
    attributes: HostAttributeCache,
    pool: Arc<FolderPool>,
    workers: usize,
}

impl SyncService {
    pub fn new(rules: Arc<RulesConfig>, engine: RuleEngine, pool: Arc<FolderPool>, workers: usize) -> Self {
        Self {
            rules,
            attributes: HostAttributeCache::new(engine.clone()),
            engine,
            pool,
            workers: workers.max(1),
        }
    }

    pub fn rules(&self) -> &RulesConfig {
        &self.rules
    }

    pub fn pool(&self) -> &Arc<FolderPool> {
        &self.pool
    }

    fn pipeline(&self, integration: Integration) -> AttributePipeline<'_> {
        let (rewrite, filter) = match integration {
            Integration::Checkmk => (&self.rules.checkmk.rewrite, &self.rules.checkmk.filter),
            Integration::Netbox => (&self.rules.netbox.rewrite, &self.rules.netbox.filter),
            Integration::Idoit => (&self.rules.idoit.rewrite, &self.rules.idoit.filter),
        };
        AttributePipeline {
            custom_attributes: &self.rules.custom_attributes,
            rewrite,
            filter,
        }
    }

    /// Evaluate every integration for one host
    ///
    /// Pool seats are taken or released on the shared pool and the host's
    /// lock and attribute cache are updated in place.
    pub fn evaluate_host(&self, host: &mut Host) -> AppResult<HostEvaluation> {
        let mut evaluation = HostEvaluation {
            hostname: host.hostname.clone(),
            checkmk: None,
            netbox: None,
            idoit: None,
        };

        for integration in Integration::ALL {
            let attributes = match self.attributes.get_host_attributes(
                host,
                integration.as_str(),
                self.pipeline(integration),
            )? {
                Some(attributes) => attributes,
                None => {
                    debug!("Host '{}' ignored for {}", host.hostname, integration);
                    if integration == Integration::Checkmk {
                        self.pool.reclaim(host);
                    }
                    continue;
                }
            };

            match self.evaluate_with(host, integration, attributes, &self.pool)? {
                IntegrationEvaluation::Checkmk(e) => evaluation.checkmk = Some(e),
                IntegrationEvaluation::Netbox(e) => evaluation.netbox = Some(e),
                IntegrationEvaluation::Idoit(e) => evaluation.idoit = Some(e),
            }
        }

        Ok(evaluation)
    }

    /// Evaluate one integration for a copy of the host against a copy of the pool
    ///
    /// The attribute cache is bypassed and nothing is written back.
    pub fn debug_host(&self, host: &Host, integration: Integration) -> AppResult<HostDebug> {
        let mut host = host.clone();
        let attributes = self.attributes.build(&mut host, self.pipeline(integration))?;

        let outcome = if attributes.ignore_host {
            None
        } else {
            let pool = Arc::new(self.pool.dry_run());
            Some(self.evaluate_with(&mut host, integration, attributes.clone(), &pool)?)
        };

        Ok(HostDebug {
            hostname: host.hostname,
            integration,
            attributes,
            outcome,
        })
    }

    fn evaluate_with(
        &self,
        host: &mut Host,
        integration: Integration,
        attributes: HostAttributes,
        pool: &Arc<FolderPool>,
    ) -> AppResult<IntegrationEvaluation> {
        let bag = &attributes.all;
        let evaluation = match integration {
            Integration::Checkmk => {
                let rules = &self.rules.checkmk;
                let reducer = CheckmkFolderReducer::new(Arc::clone(pool));
                IntegrationEvaluation::Checkmk(CheckmkEvaluation {
                    export: self.engine.get_outcomes(&reducer, &rules.export, host, bag)?,
                    rulesets: self
                        .engine
                        .get_outcomes(&RulesetReducer, &rules.rulesets, host, bag)?,
                    labels: attributes.filtered,
                })
            }
            Integration::Netbox => {
                let rules = &self.rules.netbox;
                IntegrationEvaluation::Netbox(NetboxEvaluation {
                    device: self.engine.get_outcomes(&DeviceReducer, &rules.devices, host, bag)?,
                    ip_addresses: self
                        .engine
                        .get_outcomes(&IpAddressReducer, &rules.ip_addresses, host, bag)?,
                    interfaces: self
                        .engine
                        .get_outcomes(&InterfaceReducer, &rules.interfaces, host, bag)?,
                    contacts: self
                        .engine
                        .get_outcomes(&ContactReducer, &rules.contacts, host, bag)?,
                    dataflows: self
                        .engine
                        .get_outcomes(&DataflowReducer, &rules.dataflows, host, bag)?,
                    labels: attributes.filtered,
                })
            }
            Integration::Idoit => IntegrationEvaluation::Idoit(IdoitEvaluation {
                export: self
                    .engine
                    .get_outcomes(&IdoitReducer, &self.rules.idoit.export, host, bag)?,
                labels: attributes.filtered,
            }),
        };
        Ok(evaluation)
    }

    /// Evaluate a batch of hosts on the worker pool
    ///
    /// A failing host is reported in `failed` and does not stop the batch.
    pub async fn evaluate_hosts(&self, hosts: Vec<Host>) -> AppResult<SyncReport> {
        let total = hosts.len();
        info!("Evaluating {} hosts with {} workers", total, self.workers);

        let results: Vec<_> = stream::iter(hosts)
            .map(|mut host| {
                let service = self.clone();
                tokio::task::spawn_blocking(move || {
                    let result = service.evaluate_host(&mut host);
                    (host, result)
                })
            })
            .buffer_unordered(self.workers)
            .collect()
            .await;

        let mut report = SyncReport::default();
        for joined in results {
            let (host, result) =
                joined.map_err(|e| AppError::internal(format!("Host evaluation task failed: {}", e)))?;
            match result {
                Ok(evaluation) => report.evaluations.push(evaluation),
                Err(e) => {
                    error!("Host '{}' flagged: {}", host.hostname, e);
                    report.failed.push(FailedHost {
                        hostname: host.hostname.clone(),
                        error: e.to_string(),
                    });
                }
            }
            report.hosts.push(host);
        }

        report.hosts.sort_by(|a, b| a.hostname.cmp(&b.hostname));
        report.evaluations.sort_by(|a, b| a.hostname.cmp(&b.hostname));
        report.failed.sort_by(|a, b| a.hostname.cmp(&b.hostname));

        info!(
            "Evaluated {} hosts, {} flagged",
            total,
            report.failed.len()
        );
        Ok(report)
    }
}
