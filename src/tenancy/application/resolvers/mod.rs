pub mod aes_gcm_tenant_credential_resolver_impl;
pub mod plain_tenant_credential_resolver_impl;
