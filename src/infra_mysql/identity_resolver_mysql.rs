use crate::domain_model::*;
use crate::domain_port::*;
use sqlx::MySqlPool;

pub struct MySqlIdentityResolver {
    pool: MySqlPool,
}

impl MySqlIdentityResolver {
    pub fn new(pool: MySqlPool) -> Self {
        MySqlIdentityResolver { pool }
    }

    fn lookup_sql(kind: CredentialKind) -> &'static str {
        match kind {
            CredentialKind::User => "SELECT id FROM member WHERE user = ? LIMIT 1",
            CredentialKind::Phone => "SELECT id FROM member WHERE phone = ? LIMIT 1",
            CredentialKind::Email => "SELECT id FROM member WHERE email = ? LIMIT 1",
        }
    }
}

#[async_trait::async_trait]
impl IdentityResolver for MySqlIdentityResolver {
    async fn resolve_member_id(
        &self,
        kind: CredentialKind,
        account: &str,
    ) -> Result<MemberId, IdentityError> {
        let id: Option<i64> = sqlx::query_scalar(Self::lookup_sql(kind))
            .bind(account)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| IdentityError::Service(format!("query member id: {e}")))?;

        Ok(MemberId(id.unwrap_or(0)))
    }
}
