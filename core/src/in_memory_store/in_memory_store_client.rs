// Copyright 2025 The Keyfetch Authors.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::interface::{StoreClient, StoreClientFactory, StoreError};

type HashData = Arc<RwLock<BTreeMap<String, Vec<(String, String)>>>>;

/// In-memory hash-map store shared by every client its factory hands out.
/// Keys enumerate in lexical order.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    data: HashData,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds one hash map, replacing any existing fields under `key`.
    pub async fn seed(&self, key: &str, fields: Vec<(String, String)>) {
        self.data.write().await.insert(key.to_string(), fields);
    }

    pub fn factory(&self) -> Arc<InMemoryStoreFactory> {
        Arc::new(InMemoryStoreFactory {
            data: self.data.clone(),
            available: AtomicBool::new(true),
            connect_count: AtomicUsize::new(0),
        })
    }
}

pub struct InMemoryStoreClient {
    data: HashData,
    open: AtomicBool,
}

#[async_trait]
impl StoreClient for InMemoryStoreClient {
    async fn hash_get_all(&self, key: &str) -> Result<Vec<(String, String)>, StoreError> {
        let data = self.data.read().await;
        Ok(data.get(key).cloned().unwrap_or_default())
    }

    async fn hash_set(&self, key: &str, fields: &[(String, String)]) -> Result<(), StoreError> {
        let mut data = self.data.write().await;
        let entry = data.entry(key.to_string()).or_default();
        for (name, value) in fields {
            match entry.iter_mut().find(|(existing, _)| existing == name) {
                Some(existing) => existing.1 = value.clone(),
                None => entry.push((name.clone(), value.clone())),
            }
        }
        Ok(())
    }

    async fn keys(&self, pattern: &str) -> Result<Vec<String>, StoreError> {
        let data = self.data.read().await;
        Ok(data
            .keys()
            .filter(|key| glob_match(pattern, key))
            .cloned()
            .collect())
    }

    fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }

    async fn quit(&self) -> Result<(), StoreError> {
        self.open.store(false, Ordering::SeqCst);
        Ok(())
    }
}

/// Hands out clients over the shared data set. Tracks how many sessions were
/// established and can be made unavailable to exercise connect failures.
pub struct InMemoryStoreFactory {
    data: HashData,
    available: AtomicBool,
    connect_count: AtomicUsize,
}

impl InMemoryStoreFactory {
    /// Number of sessions established so far.
    pub fn connect_count(&self) -> usize {
        self.connect_count.load(Ordering::SeqCst)
    }

    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }
}

#[async_trait]
impl StoreClientFactory for InMemoryStoreFactory {
    async fn connect(&self) -> Result<Arc<dyn StoreClient>, StoreError> {
        if !self.available.load(Ordering::SeqCst) {
            return Err(StoreError::connection_failed(StoreUnavailable));
        }
        self.connect_count.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(InMemoryStoreClient {
            data: self.data.clone(),
            open: AtomicBool::new(true),
        }))
    }
}

#[derive(Debug)]
struct StoreUnavailable;

impl std::fmt::Display for StoreUnavailable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "store unavailable")
    }
}

impl std::error::Error for StoreUnavailable {}

// `*` is the only wildcard the key patterns use.
fn glob_match(pattern: &str, key: &str) -> bool {
    match pattern.split_once('*') {
        None => pattern == key,
        Some((head, tail)) => {
            if !key.starts_with(head) {
                return false;
            }
            let rest = &key[head.len()..];
            (0..=rest.len())
                .filter(|i| rest.is_char_boundary(*i))
                .any(|i| glob_match(tail, &rest[i..]))
        }
    }
}
