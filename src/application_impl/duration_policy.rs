use crate::domain_port::{RegistryReader, SMS_SEND_DURATION};
use crate::logger::*;
use std::sync::Arc;

pub const DEFAULT_RESEND_INTERVAL_SECS: i64 = 120;

/// Minimum resend interval, read from the registry on every call.
pub struct DurationPolicy {
    registry: Arc<dyn RegistryReader>,
    fallback_secs: i64,
}

impl DurationPolicy {
    pub fn new(registry: Arc<dyn RegistryReader>, fallback_secs: i64) -> Self {
        DurationPolicy {
            registry,
            fallback_secs,
        }
    }

    /// Never fails: anything wrong with the registry answer yields the fallback.
    pub async fn resolve_resend_interval(&self) -> i64 {
        let raw = match self.registry.get_setting(SMS_SEND_DURATION).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %e, fallback = self.fallback_secs, "resend interval unavailable");
                return self.fallback_secs;
            }
        };
        match raw.trim().parse::<i64>() {
            Ok(secs) if secs >= 0 => secs,
            Ok(secs) => {
                warn!(secs, fallback = self.fallback_secs, "negative resend interval");
                self.fallback_secs
            }
            Err(e) => {
                warn!(error = %e, value = %raw, fallback = self.fallback_secs, "resend interval parse error");
                self.fallback_secs
            }
        }
    }
}
