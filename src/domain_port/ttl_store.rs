/// Key-value store whose entries expire on their own.
///
/// Every operation is atomic for its single key; nothing spans keys.
#[async_trait::async_trait]
pub trait TtlStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, TtlStoreError>;

    /// Overwrite `key` and (re)start its expiry.
    async fn set_ex(&self, key: &str, value: &str, ttl_secs: u64) -> Result<(), TtlStoreError>;

    async fn del(&self, key: &str) -> Result<(), TtlStoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum TtlStoreError {
    #[error("infra error: {0}")]
    Store(String),
    #[error("corrupt value under {key}: {reason}")]
    Corrupt { key: String, reason: String },
}
