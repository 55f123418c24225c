use std::collections::HashMap;

/// Minimum seconds between two code sends for one token.
pub const SMS_SEND_DURATION: &str = "sms_send_duration";
/// When `"true"`, freshly sent codes are echoed back to the client. Test setups only.
pub const ENABLE_DEBUG_MODE: &str = "enable_debug_mode";

#[async_trait::async_trait]
pub trait RegistryReader: Send + Sync {
    async fn get_setting(&self, name: &str) -> Result<String, RegistryError>;

    /// Names without a value are left out of the map.
    async fn get_settings(&self, names: &[&str]) -> Result<HashMap<String, String>, RegistryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("registry entry not found: {0}")]
    NotFound(String),
    #[error("registry service error: {0}")]
    Service(String),
}
