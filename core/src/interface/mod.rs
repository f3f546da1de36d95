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

mod store_client;

use std::error::Error;
use std::fmt::Display;

use thiserror::Error;

pub use store_client::StoreClient;
pub use store_client::StoreClientFactory;

/// Errors reported by a store client implementation.
#[derive(Debug)]
pub enum StoreError {
    ConnectionFailed(Box<dyn std::error::Error + Send + Sync>),
    Other(Box<dyn std::error::Error + Send + Sync>),
}

impl StoreError {
    pub fn other<E: std::error::Error + Send + Sync + 'static>(e: E) -> Self {
        StoreError::Other(Box::new(e))
    }

    pub fn connection_failed<E: std::error::Error + Send + Sync + 'static>(e: E) -> Self {
        StoreError::ConnectionFailed(Box::new(e))
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::ConnectionFailed(e) => write!(f, "connection failed: {e}"),
            StoreError::Other(e) => e.fmt(f),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            StoreError::ConnectionFailed(e) | StoreError::Other(e) => Some(e.as_ref()),
        }
    }
}

/// Dispatch-level failure taxonomy. Every variant is converted to a
/// `{status: error}` response at the dispatch boundary; none escape as raised
/// conditions to the external caller.
#[derive(Error, Debug)]
pub enum SourceError {
    /// Dispatch was attempted without a live client. Recoverable by calling
    /// connect again.
    #[error("no connection")]
    NoConnection,

    /// The last connect attempt against the store endpoint failed; the reason
    /// was recorded on the connection and surfaces here on dispatch.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Unsupported action type. Caller error, not retried.
    #[error("unsupported action type: {0}")]
    InvalidAction(String),

    /// A store read failed mid-dispatch.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}
