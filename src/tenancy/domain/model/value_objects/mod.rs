pub mod connection_template;
pub mod tenant_id;
