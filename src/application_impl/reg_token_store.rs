use crate::domain_model::*;
use crate::domain_port::{TtlStore, TtlStoreError};
use std::sync::Arc;

/// The registration keyspace: one independently expiring key per field.
///
/// Holds the send timestamp the throttle reads, plus the code and phone a
/// registration flow may want to remember next to its token.
#[derive(Clone)]
pub struct RegTokenStore {
    store: Arc<dyn TtlStore>,
    ttl_secs: u64,
}

impl RegTokenStore {
    pub fn new(store: Arc<dyn TtlStore>, ttl_secs: u64) -> Self {
        RegTokenStore { store, ttl_secs }
    }

    fn key(token: &PassportToken, field: KeyField) -> String {
        build_key(KeyNamespace::Registration, token, field)
    }

    /// Make a brand-new token known without arming the throttle.
    pub async fn register(&self, token: &PassportToken) -> Result<(), TtlStoreError> {
        self.sign_check_code_send_ok(token, 0).await
    }

    pub async fn last_send_unix(&self, token: &PassportToken) -> Result<Option<i64>, TtlStoreError> {
        let key = Self::key(token, KeyField::LastTime);
        let Some(raw) = self.store.get(&key).await? else {
            return Ok(None);
        };
        raw.trim()
            .parse::<i64>()
            .map(Some)
            .map_err(|e| TtlStoreError::Corrupt {
                key,
                reason: e.to_string(),
            })
    }

    pub async fn sign_check_code_send_ok(
        &self,
        token: &PassportToken,
        unix: i64,
    ) -> Result<(), TtlStoreError> {
        let key = Self::key(token, KeyField::LastTime);
        self.store
            .set_ex(&key, &unix.to_string(), self.ttl_secs)
            .await
    }

    pub async fn check_reg_token(&self, token: &PassportToken) -> Result<bool, TtlStoreError> {
        Ok(self.last_send_unix(token).await?.is_some())
    }

    pub async fn sign_check_token_expires(&self, token: &PassportToken) -> Result<(), TtlStoreError> {
        self.store.del(&Self::key(token, KeyField::LastTime)).await
    }

    pub async fn save_check_code_data(
        &self,
        token: &PassportToken,
        phone: &str,
        code: &str,
    ) -> Result<(), TtlStoreError> {
        self.store
            .set_ex(&Self::key(token, KeyField::CheckCode), code, self.ttl_secs)
            .await?;
        self.store
            .set_ex(&Self::key(token, KeyField::CheckPhone), phone, self.ttl_secs)
            .await
    }

    /// `(phone, code)` if both are still around.
    pub async fn check_code_data(
        &self,
        token: &PassportToken,
    ) -> Result<Option<(String, String)>, TtlStoreError> {
        let code = self.store.get(&Self::key(token, KeyField::CheckCode)).await?;
        let phone = self.store.get(&Self::key(token, KeyField::CheckPhone)).await?;
        Ok(phone.zip(code))
    }
}
