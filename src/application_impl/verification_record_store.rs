use crate::domain_model::*;
use crate::domain_port::{TtlStore, TtlStoreError};
use std::sync::Arc;

/// Composite per-token record: one key, one JSON value, one TTL.
#[derive(Clone)]
pub struct VerificationRecordStore {
    store: Arc<dyn TtlStore>,
    ttl_secs: u64,
}

impl VerificationRecordStore {
    pub fn new(store: Arc<dyn TtlStore>, ttl_secs: u64) -> Self {
        VerificationRecordStore { store, ttl_secs }
    }

    fn key(token: &PassportToken) -> String {
        build_key(KeyNamespace::Password, token, KeyField::Record)
    }

    pub async fn load(&self, token: &PassportToken) -> Result<Option<VerificationRecord>, TtlStoreError> {
        let key = Self::key(token);
        let Some(raw) = self.store.get(&key).await? else {
            return Ok(None);
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| TtlStoreError::Corrupt {
                key,
                reason: e.to_string(),
            })
    }

    /// Writes the whole record and restarts its expiry.
    pub async fn save(&self, token: &PassportToken, record: &VerificationRecord) -> Result<(), TtlStoreError> {
        let value = serde_json::to_string(record).map_err(|e| TtlStoreError::Corrupt {
            key: Self::key(token),
            reason: e.to_string(),
        })?;
        self.store.set_ex(&Self::key(token), &value, self.ttl_secs).await
    }

    pub async fn clear(&self, token: &PassportToken) -> Result<(), TtlStoreError> {
        self.store.del(&Self::key(token)).await
    }
}
