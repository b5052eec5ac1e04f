//! Custom attribute parsing step definitions

use cucumber::{then, when};
use serde_json::Value;

use crate::features::support::TestWorld;
use hostsync::services::{parse_custom_attributes, AttributeInstruction};

#[when(expr = "I parse the custom attributes {string}")]
async fn parse_attributes(world: &mut TestWorld, param: String) {
    world.instructions = parse_custom_attributes(&param);
}

#[then(expr = "attribute {string} is set to {string}")]
async fn attribute_set(world: &mut TestWorld, name: String, expected: String) {
    let expected: Value = serde_json::from_str(&expected).expect("expected value must be JSON");
    let found = world.instructions.iter().any(|i| {
        matches!(i, AttributeInstruction::Set { name: n, value } if *n == name && *value == expected)
    });
    assert!(found, "{} not set to {} in {:?}", name, expected, world.instructions);
}

#[then(expr = "attribute {string} is removed")]
async fn attribute_removed(world: &mut TestWorld, name: String) {
    assert!(world
        .instructions
        .contains(&AttributeInstruction::Remove(name)));
}

#[then(expr = "{int} instruction(s) are produced")]
async fn instruction_count(world: &mut TestWorld, count: usize) {
    assert_eq!(world.instructions.len(), count);
}
