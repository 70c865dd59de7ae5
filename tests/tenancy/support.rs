#[path = "support/fixtures.rs"]
pub mod fixtures;

pub use fixtures::{sealed_cookie, tenant, wait_until};
pub use harness::{
    HarnessOptions, create_factory_harness, create_registry_harness, create_router_harness,
};
