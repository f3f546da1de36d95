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

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use redis::{aio::MultiplexedConnection, AsyncCommands};

use keyfetch_core::interface::{StoreClient, StoreClientFactory, StoreError};

/// Store client over a multiplexed async Redis connection. Each call clones
/// the connection handle, so one client serves concurrent dispatches.
pub struct RedisStoreClient {
    connection: MultiplexedConnection,
    open: AtomicBool,
}

#[async_trait]
impl StoreClient for RedisStoreClient {
    async fn hash_get_all(&self, key: &str) -> Result<Vec<(String, String)>, StoreError> {
        let mut con = self.connection.clone();
        match con.hgetall::<&str, HashMap<String, String>>(key).await {
            Ok(fields) => Ok(fields.into_iter().collect()),
            Err(e) => Err(StoreError::other(e)),
        }
    }

    async fn hash_set(&self, key: &str, fields: &[(String, String)]) -> Result<(), StoreError> {
        let mut con = self.connection.clone();
        match con
            .hset_multiple::<&str, String, String, ()>(key, fields)
            .await
        {
            Ok(()) => Ok(()),
            Err(e) => Err(StoreError::other(e)),
        }
    }

    async fn keys(&self, pattern: &str) -> Result<Vec<String>, StoreError> {
        let mut con = self.connection.clone();
        match con.keys::<&str, Vec<String>>(pattern).await {
            Ok(mut keys) => {
                // KEYS gives no ordering guarantee; sort for a stable contract.
                keys.sort();
                Ok(keys)
            }
            Err(e) => Err(StoreError::other(e)),
        }
    }

    fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }

    async fn quit(&self) -> Result<(), StoreError> {
        self.open.store(false, Ordering::SeqCst);
        let mut con = self.connection.clone();
        match redis::cmd("QUIT")
            .query_async::<MultiplexedConnection, ()>(&mut con)
            .await
        {
            Ok(()) => Ok(()),
            Err(e) => Err(StoreError::other(e)),
        }
    }
}

/// Opens multiplexed sessions against a fixed Redis endpoint.
pub struct RedisClientFactory {
    url: String,
}

impl RedisClientFactory {
    pub fn new(url: &str) -> Self {
        RedisClientFactory {
            url: url.to_string(),
        }
    }
}

#[async_trait]
impl StoreClientFactory for RedisClientFactory {
    async fn connect(&self) -> Result<Arc<dyn StoreClient>, StoreError> {
        let client = match redis::Client::open(self.url.as_str()) {
            Ok(client) => client,
            Err(e) => return Err(StoreError::connection_failed(e)),
        };

        let connection = match client.get_multiplexed_async_connection().await {
            Ok(con) => con,
            Err(e) => return Err(StoreError::connection_failed(e)),
        };

        log::debug!("connected to store at {}", self.url);

        Ok(Arc::new(RedisStoreClient {
            connection,
            open: AtomicBool::new(true),
        }))
    }
}
