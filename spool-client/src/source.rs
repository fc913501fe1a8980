//! Collaborator traits
//!
//! The label engine needs two things from the outside world: entity records
//! and a key/value store for JSON-encoded settings.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use shared::models::{EntityKind, Record};
use tokio::sync::RwLock;

use crate::{ClientError, ClientResult};

/// Source of entity records
#[async_trait]
pub trait EntitySource: Send + Sync {
    /// Fetch one entity by id
    async fn get_entity(&self, kind: EntityKind, id: i64) -> ClientResult<Record>;
}

/// Key/value store of JSON-encoded strings
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// `None` when the key was never set
    async fn get_setting(&self, key: &str) -> ClientResult<Option<String>>;

    async fn set_setting(&self, key: &str, value: &str) -> ClientResult<()>;
}

/// Settings kept in memory
///
/// Reads and writes can be made to fail, to exercise error handling.
#[derive(Debug, Default)]
pub struct InMemorySettings {
    values: RwLock<HashMap<String, String>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl InMemorySettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a value
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.get_mut().insert(key.into(), value.into());
        self
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub async fn raw(&self, key: &str) -> Option<String> {
        self.values.read().await.get(key).cloned()
    }
}

#[async_trait]
impl SettingsStore for InMemorySettings {
    async fn get_setting(&self, key: &str) -> ClientResult<Option<String>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(ClientError::Internal(format!("read of {} refused", key)));
        }
        Ok(self.values.read().await.get(key).cloned())
    }

    async fn set_setting(&self, key: &str, value: &str) -> ClientResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(ClientError::Internal(format!("write to {} refused", key)));
        }
        self.values
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Records kept in memory, keyed by kind and id
#[derive(Debug, Default)]
pub struct InMemoryEntities {
    records: HashMap<(EntityKind, i64), Record>,
}

impl InMemoryEntities {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, kind: EntityKind, id: i64, record: Record) -> Self {
        self.records.insert((kind, id), record);
        self
    }
}

#[async_trait]
impl EntitySource for InMemoryEntities {
    async fn get_entity(&self, kind: EntityKind, id: i64) -> ClientResult<Record> {
        self.records
            .get(&(kind, id))
            .cloned()
            .ok_or_else(|| ClientError::NotFound(format!("{} {}", kind, id)))
    }
}
