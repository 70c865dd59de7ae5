use crate::tenancy::domain::model::{
    enums::tenancy_domain_error::TenancyDomainError, value_objects::tenant_id::TenantId,
};

const TENANT_PLACEHOLDER: &str = "{tenant}";

/// PostgreSQL truncates identifiers past this many bytes (NAMEDATALEN - 1).
const MAX_DATABASE_NAME_LEN: usize = 63;

lazy_static::lazy_static! {
    static ref DATABASE_PREFIX_REGEX: regex::Regex =
        regex::Regex::new(r"^[A-Za-z0-9_-]{0,32}$").expect("valid regex");
}

/// Connection target template, e.g. `postgres://app:secret@db:5432/{tenant}`.
///
/// The placeholder may sit in the database path (one server, one database per
/// tenant) or in the host (one server per tenant).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ConnectionTemplate {
    template: String,
    database_prefix: String,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ConnectionTarget {
    pub database_name: String,
    pub url: String,
}

impl ConnectionTemplate {
    pub fn new(template: String, database_prefix: String) -> Result<Self, TenancyDomainError> {
        if !template.contains(TENANT_PLACEHOLDER) {
            return Err(TenancyDomainError::InvalidConnectionTemplate);
        }
        if !DATABASE_PREFIX_REGEX.is_match(&database_prefix) {
            return Err(TenancyDomainError::InvalidConnectionTemplate);
        }

        Ok(Self {
            template,
            database_prefix,
        })
    }

    /// A name longer than PostgreSQL keeps would be truncated by the server
    /// and could collide with another tenant's database, so no such database
    /// can belong to this tenant.
    pub fn render(&self, tenant_id: &TenantId) -> Result<ConnectionTarget, TenancyDomainError> {
        let database_name = format!("{}{}", self.database_prefix, tenant_id.value());
        if database_name.len() > MAX_DATABASE_NAME_LEN {
            return Err(TenancyDomainError::UnknownTenant);
        }

        Ok(ConnectionTarget {
            url: self.template.replace(TENANT_PLACEHOLDER, &database_name),
            database_name,
        })
    }

    /// Template with credentials masked, safe for logs.
    pub fn redacted(&self) -> String {
        match (self.template.find("://"), self.template.rfind('@')) {
            (Some(scheme_end), Some(at)) if at > scheme_end => {
                format!("{}://***{}", &self.template[..scheme_end], &self.template[at..])
            }
            _ => self.template.clone(),
        }
    }
}
