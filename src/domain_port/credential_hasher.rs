use super::MutationError;

/// Slow, salted hashing for what actually gets persisted.
#[async_trait::async_trait]
pub trait CredentialHasher: Send + Sync {
    async fn hash_password(&self, password: &str) -> Result<String, MutationError>;
    async fn verify_password(&self, password: &str, password_hash: &str)
    -> Result<bool, MutationError>;
}
