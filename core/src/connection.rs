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
use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::interface::{StoreClient, StoreClientFactory};
use crate::models::SourceConfig;

/// Outcome of the last connect attempt. `Error` carries a human-readable
/// reason and no usable client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionStatus {
    Ok,
    Error(String),
}

/// Mutable session state for a single logical store connection.
///
/// The client reference is present exactly while the status is `Ok` and no
/// idle timeout has fired since last use. `Ok` with no client means "needs
/// reconnect", not an error; the next [`connect`] call re-establishes the
/// session on the same `Connection` identity, so callers holding a clone
/// observe the update.
#[derive(Clone)]
pub struct Connection {
    inner: Arc<Mutex<ConnectionInner>>,
}

struct ConnectionInner {
    factory: Arc<dyn StoreClientFactory>,
    idle_timeout: Duration,
    status: ConnectionStatus,
    client: Option<Arc<dyn StoreClient>>,
    last_used_at: Instant,
    expire_task: Option<JoinHandle<()>>,
    // Bumped on every re-arm and teardown. A fired timer whose generation no
    // longer matches lost the race to a re-arm and must not touch the client.
    generation: u64,
}

/// Returns a live connection for `config`, reusing `existing` when its client
/// is still fresh and reconnecting in place when the idle timeout has cleared
/// it. Connect failures never raise; they are recorded on the returned
/// connection's status and surface on the next dispatch.
#[tracing::instrument(skip_all)]
pub async fn connect(
    config: &SourceConfig,
    factory: Arc<dyn StoreClientFactory>,
    existing: Option<Connection>,
) -> Connection {
    let connection = match existing {
        Some(connection) => {
            if connection.is_connected().await {
                return connection;
            }
            connection
        }
        None => Connection::new(factory, config.idle_timeout()),
    };
    connection.establish().await;
    connection
}

impl Connection {
    pub fn new(factory: Arc<dyn StoreClientFactory>, idle_timeout: Duration) -> Self {
        Connection {
            inner: Arc::new(Mutex::new(ConnectionInner {
                factory,
                idle_timeout,
                status: ConnectionStatus::Ok,
                client: None,
                last_used_at: Instant::now(),
                expire_task: None,
                generation: 0,
            })),
        }
    }

    pub async fn status(&self) -> ConnectionStatus {
        self.inner.lock().await.status.clone()
    }

    /// The live client, or `None` when disconnected, timed out, or the last
    /// connect attempt failed.
    pub async fn client(&self) -> Option<Arc<dyn StoreClient>> {
        self.inner.lock().await.client.clone()
    }

    pub async fn is_connected(&self) -> bool {
        match &self.inner.lock().await.client {
            Some(client) => client.is_open(),
            None => false,
        }
    }

    pub async fn last_used_at(&self) -> Instant {
        self.inner.lock().await.last_used_at
    }

    /// Establishes a fresh client session via the factory. No lock is held
    /// across the connect call; a concurrent dispatch sees "no connection"
    /// until the attempt resolves.
    pub(crate) async fn establish(&self) {
        let factory = self.inner.lock().await.factory.clone();
        match factory.connect().await {
            Ok(client) => {
                let mut inner = self.inner.lock().await;
                inner.status = ConnectionStatus::Ok;
                inner.client = Some(client);
                inner.last_used_at = Instant::now();
                arm_expiry(&self.inner, &mut inner);
            }
            Err(e) => {
                log::warn!("store connect failed: {}", e);
                let mut inner = self.inner.lock().await;
                inner.status = ConnectionStatus::Error(format!("store connect failed: {e}"));
                inner.client = None;
            }
        }
    }

    /// Marks the connection as used: updates the last-used timestamp and
    /// re-arms the idle-expiry timer. Called after every successful dispatch.
    pub async fn touch(&self) {
        let mut inner = self.inner.lock().await;
        if inner.client.is_some() {
            inner.last_used_at = Instant::now();
            arm_expiry(&self.inner, &mut inner);
        }
    }

    /// Idempotent teardown. Shutdown errors are swallowed since the client is
    /// discarded either way; the client reference is always cleared. Status
    /// stays `Ok` so a later [`connect`] transparently reconnects.
    pub async fn disconnect(&self) {
        let client = {
            let mut inner = self.inner.lock().await;
            if let Some(task) = inner.expire_task.take() {
                task.abort();
            }
            inner.generation += 1;
            inner.client.take()
        };
        if let Some(client) = client {
            shutdown_client(client.as_ref()).await;
        }
    }
}

/// Re-arms the single idle-expiry task. The generation counter closes the
/// race between a firing timer and a concurrent re-arm: the fired task only
/// clears the client if its generation is still current once it holds the
/// lock, so a freshly-used client is never disconnected by a stale timer.
fn arm_expiry(shared: &Arc<Mutex<ConnectionInner>>, inner: &mut ConnectionInner) {
    if let Some(task) = inner.expire_task.take() {
        task.abort();
    }
    inner.generation += 1;
    let generation = inner.generation;
    let idle_timeout = inner.idle_timeout;
    let shared = shared.clone();
    inner.expire_task = Some(tokio::spawn(async move {
        tokio::time::sleep(idle_timeout).await;
        let client = {
            let mut inner = shared.lock().await;
            if inner.generation != generation {
                return;
            }
            inner.expire_task = None;
            inner.client.take()
        };
        if let Some(client) = client {
            log::debug!("idle timeout elapsed, disconnecting store client");
            shutdown_client(client.as_ref()).await;
        }
    }));
}

async fn shutdown_client(client: &dyn StoreClient) {
    if !client.is_open() {
        return;
    }
    if let Err(e) = client.quit().await {
        log::debug!("ignoring error during store client shutdown: {}", e);
    }
}
