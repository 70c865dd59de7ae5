pub mod postgres;
pub mod tenant_database_connector_repository;
pub mod tenant_directory_repository;
