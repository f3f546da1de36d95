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

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use super::SourceConfig;

/// Command name carried by an incoming action. Only `get` is dispatched;
/// every other name resolves to an error response, never a raised condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Get,
    #[serde(other)]
    Unknown,
}

impl Display for ActionKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ActionKind::Get => write!(f, "get"),
            ActionKind::Unknown => write!(f, "unknown"),
        }
    }
}

/// Incoming request from the host framework.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    #[serde(rename = "type")]
    pub kind: ActionKind,
    pub payload: ActionPayload,
    pub meta: ActionMeta,
}

impl Action {
    pub fn get(payload: ActionPayload, options: SourceConfig) -> Self {
        Action {
            kind: ActionKind::Get,
            payload,
            meta: ActionMeta { options },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionMeta {
    pub options: SourceConfig,
}

/// Payload shape, decided once at dispatch entry: an explicit id (or ordered
/// id list) scoped to an entity type, or a bare key pattern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ActionPayload {
    ById {
        #[serde(rename = "type")]
        entity_type: String,
        id: IdSelector,
    },
    ByPattern {
        pattern: String,
        #[serde(default, rename = "onlyIds")]
        only_ids: bool,
    },
}

/// A single id or an ordered sequence of ids. The distinction survives into
/// the response shape: one id yields a bare record, a sequence yields an
/// array in request order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IdSelector {
    One(String),
    Many(Vec<String>),
}
