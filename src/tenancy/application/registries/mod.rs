pub mod tenant_connection_registry_impl;
