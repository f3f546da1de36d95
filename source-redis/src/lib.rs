mod client;


pub use client::RedisClientFactory;
pub use client::RedisStoreClient;

use std::sync::Arc;

use keyfetch_core::connection::{self, Connection};
use keyfetch_core::models::SourceConfig;

/// Returns a live connection to the Redis endpoint named by `config`, reusing
/// `existing` when it is still fresh and reconnecting in place when its idle
/// timeout has fired. Connect failures are recorded on the returned
/// connection's status, never raised.
pub async fn connect(config: &SourceConfig, existing: Option<Connection>) -> Connection {
    let factory = Arc::new(RedisClientFactory::new(&config.url));
    connection::connect(config, factory, existing).await
}
