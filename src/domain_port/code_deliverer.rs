use crate::domain_model::{CredentialType, MemberId};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct CodeDelivery {
    pub member_id: MemberId,
    pub channel: CredentialType,
    pub operation: String,
    pub code: String,
}

/// Last hop of a code: hands it to whatever actually talks SMS / email / inbox.
#[async_trait::async_trait]
pub trait CodeDeliverer: Send + Sync {
    async fn deliver(&self, delivery: &CodeDelivery) -> anyhow::Result<()>;
}
