//! Shared state for Cucumber scenarios

mod world;

pub use world::TestWorld;
