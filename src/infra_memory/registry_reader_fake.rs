use crate::domain_port::{RegistryError, RegistryReader};
use dashmap::DashMap;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug, Default)]
pub struct FakeRegistryReader {
    settings: DashMap<String, String>,
    unavailable: AtomicBool,
}

impl FakeRegistryReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, name: &str, value: &str) {
        self.settings.insert(name.to_owned(), value.to_owned());
    }

    /// Simulate the registry service being unreachable.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), RegistryError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(RegistryError::Service("connection refused".to_string()));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl RegistryReader for FakeRegistryReader {
    async fn get_setting(&self, name: &str) -> Result<String, RegistryError> {
        self.check_available()?;
        self.settings
            .get(name)
            .map(|v| v.clone())
            .ok_or_else(|| RegistryError::NotFound(name.to_owned()))
    }

    async fn get_settings(&self, names: &[&str]) -> Result<HashMap<String, String>, RegistryError> {
        self.check_available()?;
        Ok(names
            .iter()
            .filter_map(|name| {
                self.settings
                    .get(*name)
                    .map(|v| ((*name).to_owned(), v.clone()))
            })
            .collect())
    }
}
