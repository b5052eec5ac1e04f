//! Step definitions for Cucumber scenarios

pub mod attribute_steps;
pub mod folder_pool_steps;
pub mod rule_steps;
