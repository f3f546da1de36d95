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

use std::time::Duration;

use serde::{Deserialize, Serialize};

mod action;
mod record;
mod response;

pub use action::{Action, ActionKind, ActionMeta, ActionPayload, IdSelector};
pub use record::{Record, RecordValue};
pub use response::{IdRecord, Response, ResponseData, ResponseStatus};

/// Idle time before auto-disconnect when the configuration does not name one.
pub const DEFAULT_CONNECTION_TIMEOUT: Duration = Duration::from_secs(30);

/// Per-call configuration supplied by the host framework.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceConfig {
    /// Namespace prepended to every store key.
    pub prefix: String,
    /// Endpoint descriptor of the underlying store, e.g. `redis://127.0.0.1:6379`.
    pub url: String,
    /// Idle time in milliseconds before the connection is dropped.
    /// [`DEFAULT_CONNECTION_TIMEOUT`] applies when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection_timeout: Option<u64>,
}

impl SourceConfig {
    pub fn new(prefix: &str, url: &str) -> Self {
        SourceConfig {
            prefix: prefix.to_string(),
            url: url.to_string(),
            connection_timeout: None,
        }
    }

    pub fn idle_timeout(&self) -> Duration {
        match self.connection_timeout {
            Some(ms) => Duration::from_millis(ms),
            None => DEFAULT_CONNECTION_TIMEOUT,
        }
    }
}
