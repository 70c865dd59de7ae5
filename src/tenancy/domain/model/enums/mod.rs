pub mod connection_state;
pub mod registry_entry_phase;
pub mod tenancy_domain_error;
