use std::collections::HashMap;
use std::sync::RwLock;

use anyhow::{anyhow, Context};
use serde::{de::DeserializeOwned, Serialize};

/// Byte-level key-value access shared by the Spin store and the in-memory store.
pub trait KvStore {
    fn get(&self, key: &str) -> anyhow::Result<Option<Vec<u8>>>;
    fn set(&self, key: &str, value: &[u8]) -> anyhow::Result<()>;
    fn delete(&self, key: &str) -> anyhow::Result<()>;
}

/// JSON documents and id lists on top of any [`KvStore`].
pub trait JsonStore {
    fn get_json<T: DeserializeOwned>(&self, key: &str) -> anyhow::Result<Option<T>>;
    fn set_json<T: Serialize>(&self, key: &str, value: &T) -> anyhow::Result<()>;

    fn get_list(&self, key: &str) -> anyhow::Result<Vec<String>> {
        Ok(self.get_json(key)?.unwrap_or_default())
    }

    fn push_front(&self, key: &str, id: &str) -> anyhow::Result<()> {
        let mut list = self.get_list(key)?;
        list.insert(0, id.to_string());
        self.set_json(key, &list)
    }

    fn push_back(&self, key: &str, id: &str) -> anyhow::Result<()> {
        let mut list = self.get_list(key)?;
        list.push(id.to_string());
        self.set_json(key, &list)
    }

    fn remove_from_list(&self, key: &str, id: &str) -> anyhow::Result<()> {
        let mut list = self.get_list(key)?;
        list.retain(|item| item != id);
        self.set_json(key, &list)
    }
}

impl<S: KvStore + ?Sized> JsonStore for S {
    fn get_json<T: DeserializeOwned>(&self, key: &str) -> anyhow::Result<Option<T>> {
        match self.get(key)? {
            Some(bytes) => {
                let value = serde_json::from_slice(&bytes)
                    .with_context(|| format!("corrupt document at {}", key))?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    fn set_json<T: Serialize>(&self, key: &str, value: &T) -> anyhow::Result<()> {
        let bytes = serde_json::to_vec(value)?;
        self.set(key, &bytes)
    }
}

/// Process-local store used by the native host and the tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KvStore for MemoryStore {
    fn get(&self, key: &str) -> anyhow::Result<Option<Vec<u8>>> {
        let entries = self.entries.read().map_err(|_| anyhow!("memory store poisoned"))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &[u8]) -> anyhow::Result<()> {
        let mut entries = self.entries.write().map_err(|_| anyhow!("memory store poisoned"))?;
        entries.insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn delete(&self, key: &str) -> anyhow::Result<()> {
        let mut entries = self.entries.write().map_err(|_| anyhow!("memory store poisoned"))?;
        entries.remove(key);
        Ok(())
    }
}

impl KvStore for spin_sdk::key_value::Store {
    fn get(&self, key: &str) -> anyhow::Result<Option<Vec<u8>>> {
        spin_sdk::key_value::Store::get(self, key).map_err(|e| anyhow!("kv get {}: {:?}", key, e))
    }

    fn set(&self, key: &str, value: &[u8]) -> anyhow::Result<()> {
        spin_sdk::key_value::Store::set(self, key, value).map_err(|e| anyhow!("kv set {}: {:?}", key, e))
    }

    fn delete(&self, key: &str) -> anyhow::Result<()> {
        spin_sdk::key_value::Store::delete(self, key)
            .map_err(|e| anyhow!("kv delete {}: {:?}", key, e))
    }
}
