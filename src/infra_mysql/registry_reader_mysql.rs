use crate::domain_port::*;
use sqlx::{MySql, MySqlPool, QueryBuilder, Row};
use std::collections::HashMap;

pub struct MySqlRegistryReader {
    pool: MySqlPool,
}

impl MySqlRegistryReader {
    pub fn new(pool: MySqlPool) -> Self {
        MySqlRegistryReader { pool }
    }
}

#[async_trait::async_trait]
impl RegistryReader for MySqlRegistryReader {
    async fn get_setting(&self, name: &str) -> Result<String, RegistryError> {
        let value: Option<String> =
            sqlx::query_scalar("SELECT value FROM registry WHERE name = ?")
                .bind(name)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| RegistryError::Service(format!("query registry: {e}")))?;

        value.ok_or_else(|| RegistryError::NotFound(name.to_owned()))
    }

    async fn get_settings(&self, names: &[&str]) -> Result<HashMap<String, String>, RegistryError> {
        if names.is_empty() {
            return Ok(HashMap::new());
        }

        let mut qb: QueryBuilder<MySql> =
            QueryBuilder::new("SELECT name, value FROM registry WHERE name IN (");
        let mut separated = qb.separated(", ");
        for name in names {
            separated.push_bind(*name);
        }
        separated.push_unseparated(")");

        let rows = qb
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RegistryError::Service(format!("query registry: {e}")))?;

        rows.into_iter()
            .map(|row| {
                let name: String = row
                    .try_get("name")
                    .map_err(|e| RegistryError::Service(e.to_string()))?;
                let value: String = row
                    .try_get("value")
                    .map_err(|e| RegistryError::Service(e.to_string()))?;
                Ok((name, value))
            })
            .collect()
    }
}
