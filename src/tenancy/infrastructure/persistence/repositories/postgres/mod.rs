pub mod sqlx_tenant_database_connector_repository_impl;
pub mod sqlx_tenant_directory_repository_impl;
