pub mod tenant_connection_factory_impl;
