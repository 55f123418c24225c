use crate::domain_model::*;
use crate::domain_port::*;
use sqlx::MySqlPool;
use std::sync::Arc;

#[derive(Debug, Clone, Copy)]
enum PasswordColumn {
    Login,
    Trade,
}

impl PasswordColumn {
    fn select_sql(&self) -> &'static str {
        match self {
            PasswordColumn::Login => "SELECT pwd FROM member WHERE id = ? FOR UPDATE",
            PasswordColumn::Trade => "SELECT trade_pwd FROM member WHERE id = ? FOR UPDATE",
        }
    }

    fn update_sql(&self) -> &'static str {
        match self {
            PasswordColumn::Login => "UPDATE member SET pwd = ? WHERE id = ?",
            PasswordColumn::Trade => "UPDATE member SET trade_pwd = ? WHERE id = ?",
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum OldPasswordCheck<'a> {
    Skip,
    Verify(&'a str),
    Reject,
}

/// Only a trade password that was never set may be changed without proving the old one.
fn old_password_check<'a>(
    column: PasswordColumn,
    old: Option<&PasswordDigest>,
    stored: Option<&'a str>,
) -> OldPasswordCheck<'a> {
    let stored = stored.filter(|s| !s.is_empty());
    match (old, stored, column) {
        (None, _, _) => OldPasswordCheck::Skip,
        (Some(_), Some(stored), _) => OldPasswordCheck::Verify(stored),
        (Some(_), None, PasswordColumn::Trade) => OldPasswordCheck::Skip,
        (Some(_), None, PasswordColumn::Login) => OldPasswordCheck::Reject,
    }
}

/// Stores an Argon2 hash of the submitted digest.
pub struct MySqlPasswordMutator {
    pool: MySqlPool,
    hasher: Arc<dyn CredentialHasher>,
}

impl MySqlPasswordMutator {
    pub fn new(pool: MySqlPool, hasher: Arc<dyn CredentialHasher>) -> Self {
        MySqlPasswordMutator { pool, hasher }
    }

    async fn change(
        &self,
        column: PasswordColumn,
        member_id: MemberId,
        new: &PasswordDigest,
        old: Option<&PasswordDigest>,
    ) -> Result<(), MutationError> {
        // Dropping the transaction on any early return rolls it back.
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| MutationError::Service(e.to_string()))?;

        let stored: Option<Option<String>> = sqlx::query_scalar(column.select_sql())
            .bind(member_id.0)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| MutationError::Service(format!("query password: {e}")))?;
        let Some(stored) = stored else {
            return Err(MutationError::Rejected("no such member".to_string()));
        };

        match (old, old_password_check(column, old, stored.as_deref())) {
            (_, OldPasswordCheck::Skip) => {}
            (Some(old), OldPasswordCheck::Verify(stored)) => {
                if !self.hasher.verify_password(old.as_str(), stored).await? {
                    return Err(MutationError::Rejected("old password not correct".to_string()));
                }
            }
            _ => return Err(MutationError::Rejected("old password not correct".to_string())),
        }

        let hash = self.hasher.hash_password(new.as_str()).await?;
        sqlx::query(column.update_sql())
            .bind(hash)
            .bind(member_id.0)
            .execute(&mut *tx)
            .await
            .map_err(|e| MutationError::Service(format!("update password: {e}")))?;

        tx.commit()
            .await
            .map_err(|e| MutationError::Service(e.to_string()))?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl PasswordMutator for MySqlPasswordMutator {
    async fn change_password(
        &self,
        member_id: MemberId,
        new: &PasswordDigest,
        old: Option<&PasswordDigest>,
    ) -> Result<(), MutationError> {
        self.change(PasswordColumn::Login, member_id, new, old).await
    }

    async fn change_trade_password(
        &self,
        member_id: MemberId,
        new: &PasswordDigest,
        old: Option<&PasswordDigest>,
    ) -> Result<(), MutationError> {
        self.change(PasswordColumn::Trade, member_id, new, old).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_never_checks_old_password() {
        assert_eq!(
            old_password_check(PasswordColumn::Login, None, Some("$argon2id$x")),
            OldPasswordCheck::Skip
        );
        assert_eq!(old_password_check(PasswordColumn::Login, None, None), OldPasswordCheck::Skip);
    }

    #[test]
    fn stored_password_is_verified_for_both_columns() {
        let old = PasswordDigest::of("old");
        for column in [PasswordColumn::Login, PasswordColumn::Trade] {
            assert_eq!(
                old_password_check(column, Some(&old), Some("$argon2id$x")),
                OldPasswordCheck::Verify("$argon2id$x")
            );
        }
    }

    #[test]
    fn only_unset_trade_password_skips_old_check() {
        let old = PasswordDigest::of("old");
        assert_eq!(
            old_password_check(PasswordColumn::Trade, Some(&old), None),
            OldPasswordCheck::Skip
        );
        assert_eq!(
            old_password_check(PasswordColumn::Trade, Some(&old), Some("")),
            OldPasswordCheck::Skip
        );
        assert_eq!(
            old_password_check(PasswordColumn::Login, Some(&old), None),
            OldPasswordCheck::Reject
        );
        assert_eq!(
            old_password_check(PasswordColumn::Login, Some(&old), Some("")),
            OldPasswordCheck::Reject
        );
    }
}
