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

use std::sync::Arc;

use async_trait::async_trait;

use super::StoreError;

/// Live session handle to the underlying key-value store.
///
/// One key addresses one hash map of field/value pairs; `keys` enumerates
/// keys matching a glob pattern. Implementations report failures as
/// [`StoreError`] and must never panic.
#[async_trait]
pub trait StoreClient: Send + Sync {
    /// Reads every field of the hash map stored at `key`. A missing key
    /// yields an empty field list.
    async fn hash_get_all(&self, key: &str) -> Result<Vec<(String, String)>, StoreError>;

    /// Writes the given fields into the hash map stored at `key`, leaving
    /// other fields in place.
    async fn hash_set(&self, key: &str, fields: &[(String, String)]) -> Result<(), StoreError>;

    /// Enumerates keys matching a glob pattern. The order is store-defined;
    /// callers must not depend on it beyond stability.
    async fn keys(&self, pattern: &str) -> Result<Vec<String>, StoreError>;

    /// Whether the session is still usable.
    fn is_open(&self) -> bool;

    /// Graceful shutdown of the session.
    async fn quit(&self) -> Result<(), StoreError>;
}

/// Establishes store sessions on behalf of the connection manager.
#[async_trait]
pub trait StoreClientFactory: Send + Sync {
    async fn connect(&self) -> Result<Arc<dyn StoreClient>, StoreError>;
}
