//! Short-lived result cache in front of a backend.

use crate::backend::EnsBackend;
use async_trait::async_trait;
use enslookup_sdk::SdkError;
use enslookup_types::{Address, EnsName, TextKey};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};

struct TtlMap<K, V> {
    entries: RwLock<HashMap<K, (V, Instant)>>,
    ttl: Duration,
}

impl<K: Eq + Hash, V: Clone> TtlMap<K, V> {
    fn new(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    fn get(&self, key: &K) -> Option<V> {
        let entries = self.entries.read();
        entries
            .get(key)
            .filter(|(_, stored)| stored.elapsed() < self.ttl)
            .map(|(value, _)| value.clone())
    }

    fn insert(&self, key: K, value: V) {
        let mut entries = self.entries.write();
        entries.retain(|_, (_, stored)| stored.elapsed() < self.ttl);
        entries.insert(key, (value, Instant::now()));
    }

    fn clear(&self) {
        self.entries.write().clear();
    }

    fn len(&self) -> usize {
        self.entries.read().len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum RecordKey {
    Avatar,
    Text(TextKey),
}

/// Backend wrapper that remembers successful answers for `ttl`.
///
/// Failures are never cached, so a resubmission retries them.
pub struct CachedBackend<B> {
    inner: B,
    addresses: TtlMap<EnsName, Option<Address>>,
    names: TtlMap<Address, Option<EnsName>>,
    records: TtlMap<(EnsName, RecordKey), Option<String>>,
}

impl<B: EnsBackend> CachedBackend<B> {
    pub fn new(inner: B, ttl: Duration) -> Self {
        Self {
            inner,
            addresses: TtlMap::new(ttl),
            names: TtlMap::new(ttl),
            records: TtlMap::new(ttl),
        }
    }

    pub fn inner(&self) -> &B {
        &self.inner
    }

    /// Number of live and expired-but-unswept entries.
    pub fn len(&self) -> usize {
        self.addresses.len() + self.names.len() + self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.addresses.clear();
        self.names.clear();
        self.records.clear();
    }
}

#[async_trait]
impl<B: EnsBackend> EnsBackend for CachedBackend<B> {
    async fn resolve_address(&self, name: &EnsName) -> Result<Option<Address>, SdkError> {
        if let Some(hit) = self.addresses.get(name) {
            return Ok(hit);
        }
        let value = self.inner.resolve_address(name).await?;
        self.addresses.insert(name.clone(), value);
        Ok(value)
    }

    async fn lookup_name(&self, address: &Address) -> Result<Option<EnsName>, SdkError> {
        if let Some(hit) = self.names.get(address) {
            return Ok(hit);
        }
        let value = self.inner.lookup_name(address).await?;
        self.names.insert(*address, value.clone());
        Ok(value)
    }

    async fn avatar(&self, name: &EnsName) -> Result<Option<String>, SdkError> {
        let key = (name.clone(), RecordKey::Avatar);
        if let Some(hit) = self.records.get(&key) {
            return Ok(hit);
        }
        let value = self.inner.avatar(name).await?;
        self.records.insert(key, value.clone());
        Ok(value)
    }

    async fn text(&self, name: &EnsName, key: TextKey) -> Result<Option<String>, SdkError> {
        let cache_key = (name.clone(), RecordKey::Text(key));
        if let Some(hit) = self.records.get(&cache_key) {
            return Ok(hit);
        }
        let value = self.inner.text(name, key).await?;
        self.records.insert(cache_key, value.clone());
        Ok(value)
    }
}
