//! Business logic services

pub mod attributes;
pub mod checkmk;
pub mod conditions;
pub mod folder_pool;
pub mod idoit;
pub mod literal;
pub mod matcher;
pub mod netbox;
pub mod reducer;
pub mod sync;
pub mod template;

pub use attributes::{
    AttributePipeline, CustomAttributeReducer, FilterReducer, HostAttributeCache, RewriteReducer,
};
pub use checkmk::{format_folder_options, sanitize_folder, CheckmkFolderReducer};
pub use conditions::{AttributeConditionEvaluator, ConditionEvaluator};
pub use folder_pool::FolderPool;
pub use idoit::IdoitReducer;
pub use literal::{parse_custom_attributes, parse_literal, AttributeInstruction};
pub use matcher::RuleMatcher;
pub use netbox::{
    ContactReducer, DataflowReducer, DeviceReducer, InterfaceReducer, IpAddressReducer,
};
pub use reducer::{DefaultReducer, OutcomeReducer, ReduceContext, RuleEngine, RulesetReducer};
pub use sync::{
    CheckmkEvaluation, FailedHost, HostDebug, HostEvaluation, IdoitEvaluation, Integration,
    IntegrationEvaluation, NetboxEvaluation, SyncReport, SyncService,
};
pub use template::TemplateResolver;
