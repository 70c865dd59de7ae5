use std::fmt;

use crate::tenancy::domain::model::enums::tenancy_domain_error::TenancyDomainError;

lazy_static::lazy_static! {
    static ref TENANT_ID_REGEX: regex::Regex =
        regex::Regex::new(r"^[A-Za-z0-9_-]{1,63}$").expect("valid regex");
}

/// Registry key for a tenant. Equality is an exact string match.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct TenantId(String);

impl TenantId {
    pub fn new(value: String) -> Result<Self, TenancyDomainError> {
        if !TENANT_ID_REGEX.is_match(&value) {
            return Err(TenancyDomainError::InvalidTenantId);
        }

        Ok(Self(value))
    }

    pub fn value(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
