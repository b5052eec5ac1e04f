//! Rule matching step definitions

use cucumber::{given, then, when};
use serde_json::json;

use crate::features::support::TestWorld;
use hostsync::models::{CheckmkAction, Condition, ConditionOperator, Rule};

fn label_condition(attribute: &str, value: &str) -> Condition {
    Condition::attribute(attribute, ConditionOperator::Equals, json!(value))
}

fn set_label(world: &mut TestWorld, hostname: &str, label: String, value: String) {
    let host = world.host_mut(hostname);
    let mut labels = host.labels.clone();
    labels.insert(label, json!(value));
    host.update_labels(labels);
}

#[given(expr = "a host {string} with label {string} set to {string}")]
async fn host_with_label(world: &mut TestWorld, hostname: String, label: String, value: String) {
    set_label(world, &hostname, label, value);
}

#[given(
    expr = "a checkmk rule {string} with sort order {int} moving to folder {string} when {string} equals {string}"
)]
async fn move_folder_rule(
    world: &mut TestWorld,
    name: String,
    sort_order: i32,
    folder: String,
    attribute: String,
    value: String,
) {
    world.rules.push(
        Rule::new(name, vec![CheckmkAction::MoveFolder(folder)])
            .with_condition(label_condition(&attribute, &value))
            .with_sort_order(sort_order),
    );
}

#[given(
    expr = "a last-match checkmk rule {string} with sort order {int} moving to folder {string} when {string} equals {string}"
)]
async fn last_match_rule(
    world: &mut TestWorld,
    name: String,
    sort_order: i32,
    folder: String,
    attribute: String,
    value: String,
) {
    world.rules.push(
        Rule::new(name, vec![CheckmkAction::MoveFolder(folder)])
            .with_condition(label_condition(&attribute, &value))
            .with_sort_order(sort_order)
            .last_match(),
    );
}

#[given(
    expr = "a checkmk rule {string} with sort order {int} taking a pool folder when {string} equals {string}"
)]
async fn pool_rule(
    world: &mut TestWorld,
    name: String,
    sort_order: i32,
    attribute: String,
    value: String,
) {
    world.rules.push(
        Rule::new(name, vec![CheckmkAction::FolderPool(String::new())])
            .with_condition(label_condition(&attribute, &value))
            .with_sort_order(sort_order),
    );
}

#[when(expr = "I evaluate the checkmk rules for {string}")]
async fn evaluate_rules(world: &mut TestWorld, hostname: String) {
    world.evaluate(&hostname);
}

#[when(expr = "the label {string} of host {string} changes to {string}")]
async fn change_label(world: &mut TestWorld, label: String, hostname: String, value: String) {
    set_label(world, &hostname, label, value);
}

#[then(expr = "the outcome folder is {string}")]
async fn outcome_folder(world: &mut TestWorld, folder: String) {
    assert_eq!(world.outcome().move_folder.as_deref(), Some(folder.as_str()));
}

#[then("the outcome has no folder")]
async fn outcome_without_folder(world: &mut TestWorld) {
    let json = serde_json::to_value(world.outcome()).unwrap();
    assert!(json.get("move_folder").is_none());
    assert!(json.get("extra_folder_options").is_none());
}
