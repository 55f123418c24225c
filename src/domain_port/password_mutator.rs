use crate::domain_model::{MemberId, PasswordDigest};

#[async_trait::async_trait]
pub trait PasswordMutator: Send + Sync {
    /// `old` is checked against the stored password when present.
    async fn change_password(
        &self,
        member_id: MemberId,
        new: &PasswordDigest,
        old: Option<&PasswordDigest>,
    ) -> Result<(), MutationError>;

    async fn change_trade_password(
        &self,
        member_id: MemberId,
        new: &PasswordDigest,
        old: Option<&PasswordDigest>,
    ) -> Result<(), MutationError>;
}

#[derive(Debug, thiserror::Error)]
pub enum MutationError {
    #[error("{0}")]
    Rejected(String),
    #[error("password service error: {0}")]
    Service(String),
}
