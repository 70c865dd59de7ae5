use aes_gcm::{Aes256Gcm, Key, KeyInit, Nonce, aead::Aead};
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::RngCore;
use sha2::{Digest, Sha256};

use crate::tenancy::domain::{
    model::{enums::tenancy_domain_error::TenancyDomainError, value_objects::tenant_id::TenantId},
    services::tenant_credential_resolver::TenantCredentialResolver,
};

const NONCE_LEN: usize = 12;

/// Cookie mode: the credential is `base64url(nonce || ciphertext)` sealed with
/// AES-256-GCM under a key derived from the process secret.
#[derive(Clone)]
pub struct AesGcmTenantCredentialResolverImpl {
    cipher: Aes256Gcm,
}

impl AesGcmTenantCredentialResolverImpl {
    pub fn new(secret: &str) -> Self {
        let digest = Sha256::digest(secret.as_bytes());
        Self {
            cipher: Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(digest.as_slice())),
        }
    }

    /// Issues a cookie value for the tenant.
    pub fn seal(&self, tenant_id: &TenantId) -> Result<String, TenancyDomainError> {
        let mut nonce_bytes = [0u8; NONCE_LEN];
        rand::thread_rng().fill_bytes(&mut nonce_bytes);

        let ciphertext = self
            .cipher
            .encrypt(Nonce::from_slice(&nonce_bytes), tenant_id.value().as_bytes())
            .map_err(|e| TenancyDomainError::InfrastructureError(e.to_string()))?;

        let mut sealed = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        sealed.extend_from_slice(&nonce_bytes);
        sealed.extend_from_slice(&ciphertext);
        Ok(URL_SAFE_NO_PAD.encode(sealed))
    }
}

impl TenantCredentialResolver for AesGcmTenantCredentialResolverImpl {
    fn resolve(&self, raw_credential: &str) -> Result<TenantId, TenancyDomainError> {
        let sealed = URL_SAFE_NO_PAD
            .decode(raw_credential.trim())
            .map_err(|_| TenancyDomainError::InvalidToken)?;
        if sealed.len() <= NONCE_LEN {
            return Err(TenancyDomainError::InvalidToken);
        }

        let (nonce, ciphertext) = sealed.split_at(NONCE_LEN);
        let plaintext = self
            .cipher
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|_| TenancyDomainError::InvalidToken)?;
        let value = String::from_utf8(plaintext).map_err(|_| TenancyDomainError::InvalidToken)?;

        TenantId::new(value).map_err(|_| TenancyDomainError::InvalidToken)
    }
}
