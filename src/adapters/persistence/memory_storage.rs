//! In-memory StoragePort for tests and throwaway sessions.

use crate::domain::DomainError;
use crate::ports::StoragePort;
use std::collections::HashMap;
use std::sync::Mutex;

/// HashMap-backed slot storage. `unavailable()` builds one that fails every
/// call, standing in for disabled client storage.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    slots: Mutex<HashMap<String, String>>,
    unavailable: bool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn unavailable() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
            unavailable: true,
        }
    }

    /// Pre-populated storage, as if left behind by an earlier run.
    pub fn with_slots(entries: &[(&str, &str)]) -> Self {
        Self {
            slots: Mutex::new(
                entries
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
            ),
            unavailable: false,
        }
    }

    /// Current slots. Test helper.
    pub fn snapshot(&self) -> HashMap<String, String> {
        self.slots.lock().map(|s| s.clone()).unwrap_or_default()
    }

    fn guard(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>, DomainError> {
        if self.unavailable {
            return Err(DomainError::Storage("storage disabled".into()));
        }
        self.slots
            .lock()
            .map_err(|_| DomainError::Storage("storage lock poisoned".into()))
    }
}

#[async_trait::async_trait]
impl StoragePort for MemoryStorage {
    async fn load(&self) -> Result<HashMap<String, String>, DomainError> {
        Ok(self.guard()?.clone())
    }

    async fn replace_all(&self, entries: &[(&str, &str)]) -> Result<(), DomainError> {
        let mut slots = self.guard()?;
        slots.clear();
        for (k, v) in entries {
            slots.insert(k.to_string(), v.to_string());
        }
        Ok(())
    }

    async fn clear(&self) -> Result<(), DomainError> {
        self.guard()?.clear();
        Ok(())
    }
}
