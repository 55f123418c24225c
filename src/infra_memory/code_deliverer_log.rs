use crate::domain_port::{CodeDelivery, CodeDeliverer};
use crate::logger::*;

/// Development deliverer: the code only ends up in the debug log.
#[derive(Debug, Default)]
pub struct LogCodeDeliverer;

#[async_trait::async_trait]
impl CodeDeliverer for LogCodeDeliverer {
    async fn deliver(&self, delivery: &CodeDelivery) -> anyhow::Result<()> {
        debug!(
            member_id = %delivery.member_id,
            channel = %delivery.channel,
            operation = %delivery.operation,
            code = %delivery.code,
            "verification code delivery (log only)"
        );
        Ok(())
    }
}
