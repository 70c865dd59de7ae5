pub mod tenant_connection_rest_controller;
