//! Data models

mod attributes;
mod checkmk;
mod folder_pool;
mod host;
mod netbox;
mod pipeline;
mod rule;

pub use attributes::*;
pub use checkmk::*;
pub use folder_pool::*;
pub use host::*;
pub use netbox::*;
pub use pipeline::*;
pub use rule::*;
