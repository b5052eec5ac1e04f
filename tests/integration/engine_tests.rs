//! Engine integration tests
//!
//! Run whole hosts through the fixture rules without the HTTP layer.

use std::sync::Arc;

use serde_json::json;

use hostsync::models::{
    Action, CheckmkAction, Condition, ConditionOperator, FolderPoolEntry, InterfaceAction, Rule,
};
use hostsync::services::{
    CheckmkFolderReducer, FolderPool, InterfaceReducer, RuleEngine, SyncService,
};
use hostsync::models::AttributeBag;

use crate::common::{test_rules, HostFactory, HostFixtures};

fn service(pool: Arc<FolderPool>) -> SyncService {
    SyncService::new(Arc::new(test_rules()), RuleEngine::default(), pool, 4)
}

fn pool(seats: i64) -> Arc<FolderPool> {
    Arc::new(FolderPool::from_entries(vec![FolderPoolEntry::new("/pool/a", seats)]))
}

fn bag(host: &hostsync::models::Host) -> AttributeBag {
    let mut bag = AttributeBag::new();
    bag.merge_truthy(&host.labels);
    bag
}

#[test]
fn test_last_match_stops_evaluation() {
    let os_linux = || Condition::attribute("os", ConditionOperator::Equals, json!("linux"));
    let rules = vec![
        Rule::new("first", vec![CheckmkAction::MoveFolder("linux".to_string())])
            .with_condition(os_linux())
            .with_sort_order(1),
        Rule::new("sentinel", vec![CheckmkAction::MoveFolder("never".to_string())])
            .with_condition(os_linux())
            .with_sort_order(3),
        Rule::new("final", vec![CheckmkAction::MoveFolder("servers".to_string())])
            .with_condition(os_linux())
            .with_sort_order(2)
            .last_match(),
    ];

    let mut host = HostFixtures::web();
    let attributes = bag(&host);
    let outcome = RuleEngine::default()
        .get_outcomes(
            &CheckmkFolderReducer::new(pool(1)),
            &rules,
            &mut host,
            &attributes,
        )
        .unwrap();

    assert_eq!(outcome.move_folder.as_deref(), Some("/linux/servers"));
}

#[test]
fn test_falsy_outcome_keys_are_absent() {
    let rules = vec![Rule::new(
        "empty",
        vec![
            CheckmkAction::MoveFolder("{{ missing }}".to_string()),
            CheckmkAction::SetParent("{{ missing }}".to_string()),
            CheckmkAction::from(Action::new("prefix_labels", "")),
        ],
    )];

    let mut host = HostFixtures::db();
    let attributes = bag(&host);
    let outcome = RuleEngine::default()
        .get_outcomes(
            &CheckmkFolderReducer::new(pool(1)),
            &rules,
            &mut host,
            &attributes,
        )
        .unwrap();

    let json = serde_json::to_value(&outcome).unwrap();
    assert_eq!(json, json!({}));
}

#[test]
fn test_interface_records_stay_per_rule() {
    let rules: Vec<Rule<InterfaceAction>> = vec![
        Rule::new(
            "eth0",
            vec![
                InterfaceAction::Name("eth0".to_string()),
                InterfaceAction::IpAddress("10.0.0.1".to_string()),
            ],
        ),
        Rule::new(
            "eth1",
            vec![
                InterfaceAction::Name("eth1".to_string()),
                InterfaceAction::MacAddress("aa:bb:cc:dd:ee:ff".to_string()),
            ],
        ),
        Rule::new(
            "unnamed",
            vec![
                InterfaceAction::Name("{{ missing }}".to_string()),
                InterfaceAction::Mtu("9000".to_string()),
            ],
        ),
    ];

    let mut host = HostFixtures::web();
    let attributes = bag(&host);
    let outcome = RuleEngine::default()
        .get_outcomes(&InterfaceReducer, &rules, &mut host, &attributes)
        .unwrap();

    assert_eq!(outcome.interfaces.len(), 2);
    let eth0 = &outcome.interfaces[0];
    let eth1 = &outcome.interfaces[1];
    assert_eq!(eth0.by_rule, "eth0");
    assert!(eth0.sub_fields.contains_key("ip_address"));
    assert!(!eth0.fields.contains_key("mac_address"));
    assert!(eth1.sub_fields.is_empty());
    assert_eq!(eth1.fields["mac_address"].value, json!("AA:BB:CC:DD:EE:FF"));
}

#[test]
fn test_evaluate_host_caches_attributes() {
    let service = service(pool(1));
    let mut host = HostFixtures::web();

    let first = service.evaluate_host(&mut host).unwrap();
    assert!(host.needs_save());
    assert!(host.cache_get("checkmk_hostattribute").is_some());
    assert!(host.cache_get("netbox_hostattribute").is_some());
    host.mark_saved();

    let second = service.evaluate_host(&mut host).unwrap();
    assert!(!host.needs_save());
    assert_eq!(
        first.checkmk.unwrap().export,
        second.checkmk.unwrap().export
    );
}

#[test]
fn test_label_change_invalidates_cache() {
    let service = service(pool(1));
    let mut host = HostFixtures::db();
    service.evaluate_host(&mut host).unwrap();

    let mut labels = host.labels.clone();
    labels.insert("site".to_string(), json!("Munich"));
    host.update_labels(labels);
    assert!(host.cache_get("checkmk_hostattribute").is_none());

    let evaluation = service.evaluate_host(&mut host).unwrap();
    assert_eq!(
        evaluation.checkmk.unwrap().export.move_folder.as_deref(),
        Some("/munich")
    );
}

#[test]
fn test_ignored_host_has_no_checkmk_outcome() {
    let service = service(pool(1));
    let mut host = HostFixtures::lab();

    let evaluation = service.evaluate_host(&mut host).unwrap();
    assert!(evaluation.checkmk.is_none());
    assert!(evaluation.netbox.is_some());
}

#[tokio::test]
async fn test_batch_flags_hosts_beyond_pool_capacity() {
    let pool = pool(2);
    let service = service(Arc::clone(&pool));
    let factory = HostFactory::new();
    let hosts: Vec<_> = (0..5)
        .map(|_| factory.create().with_label("role", "web").build())
        .collect();

    let report = service.evaluate_hosts(hosts).await.unwrap();

    assert_eq!(report.hosts.len(), 5);
    assert_eq!(report.evaluations.len(), 2);
    assert_eq!(report.failed.len(), 3);
    assert_eq!(
        report.hosts.iter().filter(|h| h.get_folder().is_some()).count(),
        2
    );
    assert_eq!(pool.snapshot()[0].taken_seats, 2);
}
