use crate::domain_port::{CredentialHasher, MutationError};
use argon2::password_hash::rand_core::OsRng;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};

pub struct Argon2PasswordHasher;

#[async_trait::async_trait]
impl CredentialHasher for Argon2PasswordHasher {
    async fn hash_password(&self, password: &str) -> Result<String, MutationError> {
        let salt = argon2::password_hash::SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| MutationError::Service(e.to_string()))?
            .to_string();
        Ok(hash)
    }

    async fn verify_password(
        &self,
        password: &str,
        password_hash: &str,
    ) -> Result<bool, MutationError> {
        let parsed = PasswordHash::new(password_hash)
            .map_err(|e| MutationError::Service(format!("invalid PHC hash: {e}")))?;

        match Argon2::default().verify_password(password.as_bytes(), &parsed) {
            Ok(_) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(MutationError::Service(format!("verify error: {e}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn hash_then_verify() {
        let hasher = Argon2PasswordHasher;
        let hash = hasher.hash_password("digest-a").await.unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(hasher.verify_password("digest-a", &hash).await.unwrap());
        assert!(!hasher.verify_password("digest-b", &hash).await.unwrap());
        assert!(hasher.verify_password("digest-a", "garbage").await.is_err());
    }
}
