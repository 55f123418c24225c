use crate::domain_port::*;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;

pub struct RedisTtlStore {
    conn: ConnectionManager,
    prefix: String,
}

impl RedisTtlStore {
    pub fn new(conn: ConnectionManager, prefix: impl Into<String>) -> Self {
        RedisTtlStore {
            conn,
            prefix: prefix.into(),
        }
    }

    fn key(&self, key: &str) -> String {
        format!("{}:{}", self.prefix, key)
    }
}

#[async_trait::async_trait]
impl TtlStore for RedisTtlStore {
    async fn get(&self, key: &str) -> Result<Option<String>, TtlStoreError> {
        let key = self.key(key);
        let mut conn = self.conn.clone();
        let val: Option<String> = conn
            .get(&key)
            .await
            .map_err(|e| TtlStoreError::Store(e.to_string()))?;
        Ok(val)
    }

    async fn set_ex(&self, key: &str, value: &str, ttl_secs: u64) -> Result<(), TtlStoreError> {
        let key = self.key(key);
        let mut conn = self.conn.clone();
        let _: () = conn
            .set_ex(&key, value, ttl_secs)
            .await
            .map_err(|e| TtlStoreError::Store(e.to_string()))?;
        Ok(())
    }

    async fn del(&self, key: &str) -> Result<(), TtlStoreError> {
        let key = self.key(key);
        let mut conn = self.conn.clone();
        let _: () = conn
            .del(&key)
            .await
            .map_err(|e| TtlStoreError::Store(e.to_string()))?;
        Ok(())
    }
}
