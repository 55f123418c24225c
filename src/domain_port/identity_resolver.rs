use crate::domain_model::{CredentialKind, MemberId};

#[async_trait::async_trait]
pub trait IdentityResolver: Send + Sync {
    /// Map an account string to a member. A non-positive id means no match.
    async fn resolve_member_id(
        &self,
        kind: CredentialKind,
        account: &str,
    ) -> Result<MemberId, IdentityError>;
}

#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("identity service error: {0}")]
    Service(String),
}
